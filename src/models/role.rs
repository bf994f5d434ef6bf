use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Werewolf, // 人狼
    Villager, // 村人
    Seer,     // 占い師
    Witch,    // 魔女
    Hunter,   // 狩人
}

/// 勝敗判定に使う陣営。人狼以外の役職はすべて村人陣営に数える。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Werewolf,
    Villager,
}

impl Role {
    pub fn faction(&self) -> Faction {
        match self {
            Role::Werewolf => Faction::Werewolf,
            Role::Villager | Role::Seer | Role::Witch | Role::Hunter => Faction::Villager,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Werewolf => write!(f, "Werewolf"),
            Role::Villager => write!(f, "Villager"),
            Role::Seer => write!(f, "Seer"),
            Role::Witch => write!(f, "Witch"),
            Role::Hunter => write!(f, "Hunter"),
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Faction::Werewolf => write!(f, "Werewolves"),
            Faction::Villager => write!(f, "Villagers"),
        }
    }
}
