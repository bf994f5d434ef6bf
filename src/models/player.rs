use serde::{Deserialize, Serialize};

use super::role::{Faction, Role};

/// チャット側のユーザーID
pub type UserId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    Alive,
    Dead,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub id: UserId,
    pub username: Option<String>,
    pub role: Option<Role>, // ゲーム開始まではNone
    pub status: PlayerStatus,
    pub is_game_master: bool,
    pub votes_received: Vec<UserId>, // 今回の投票で自分に投票したプレイヤー
}

impl Player {
    pub fn new(id: UserId, username: Option<String>) -> Self {
        Self {
            id,
            username,
            role: None,
            status: PlayerStatus::Alive,
            is_game_master: false,
            votes_received: Vec::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status == PlayerStatus::Alive
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    pub fn faction(&self) -> Option<Faction> {
        self.role.map(|role| role.faction())
    }

    /// ユーザー名がなければIDを表示名として使う
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.id.to_string(),
        }
    }

    /// 生存 -> 死亡の一方向のみ
    pub fn kill(&mut self) {
        self.status = PlayerStatus::Dead;
    }
}
