use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::role::Role;

pub const DEFAULT_MIN_PLAYERS: usize = 2;
pub const DEFAULT_MAX_PLAYERS: usize = 12;

/// プレイヤー数 -> 配る役職のリスト。
/// 人数が完全一致するエントリがなければゲームを開始できない（補間はしない）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleTable {
    configurations: BTreeMap<usize, Vec<Role>>,
}

impl RoleTable {
    pub fn new(configurations: BTreeMap<usize, Vec<Role>>) -> Self {
        Self { configurations }
    }

    pub fn empty() -> Self {
        Self::new(BTreeMap::new())
    }

    pub fn with_entry(mut self, player_count: usize, roles: Vec<Role>) -> Self {
        self.configurations.insert(player_count, roles);
        self
    }

    pub fn roles_for(&self, player_count: usize) -> Option<&[Role]> {
        self.configurations
            .get(&player_count)
            .filter(|roles| !roles.is_empty())
            .map(Vec::as_slice)
    }

    pub fn supported_counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.configurations.keys().copied()
    }

    /// `{"5": ["Werewolf", "Seer", ...]}` 形式のJSONから読み込む
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        use Role::*;

        // 2人はフロー確認用。3人と4人は特殊役職を入れると成立しないため用意しない
        let eight = vec![
            Werewolf, Werewolf, Werewolf, Seer, Witch, Hunter, Villager, Villager,
        ];
        let mut nine = eight.clone();
        nine.push(Villager);
        let mut ten = nine.clone();
        ten.push(Villager);
        let mut eleven = ten.clone();
        eleven.push(Werewolf);
        let mut twelve = eleven.clone();
        twelve.push(Villager);

        Self::empty()
            .with_entry(2, vec![Werewolf, Villager])
            .with_entry(5, vec![Werewolf, Werewolf, Seer, Witch, Villager])
            .with_entry(6, vec![Werewolf, Werewolf, Seer, Witch, Villager, Villager])
            .with_entry(
                7,
                vec![Werewolf, Werewolf, Seer, Witch, Hunter, Villager, Villager],
            )
            .with_entry(8, eight)
            .with_entry(9, nine)
            .with_entry(10, ten)
            .with_entry(11, eleven)
            .with_entry(12, twelve)
    }
}
