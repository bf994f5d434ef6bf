use serde::{Deserialize, Serialize};

use super::{
    game::{Game, GamePhase},
    player::UserId,
    role::Role,
};

/// フェーズ進行の結果。条件未達は失敗ではなくPendingで返す
#[derive(Debug, Clone)]
pub enum AdvanceOutcome {
    Advanced { from: GamePhase, game: Game },
    Pending(PendingReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingReason {
    WerewolvesVoting { remaining: usize },
    SeerChecking,
    DayVoting { remaining: usize },
}

impl std::fmt::Display for PendingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PendingReason::WerewolvesVoting { remaining } => {
                write!(f, "Waiting for {} werewolf vote(s)...", remaining)
            }
            PendingReason::SeerChecking => write!(f, "Waiting for the seer..."),
            PendingReason::DayVoting { remaining } => {
                write!(f, "Waiting for {} player vote(s)...", remaining)
            }
        }
    }
}

impl AdvanceOutcome {
    pub fn game(&self) -> Option<&Game> {
        match self {
            AdvanceOutcome::Advanced { game, .. } => Some(game),
            AdvanceOutcome::Pending(_) => None,
        }
    }

    pub fn into_game(self) -> Option<Game> {
        match self {
            AdvanceOutcome::Advanced { game, .. } => Some(game),
            AdvanceOutcome::Pending(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum LeaveOutcome {
    Left(Game),
    /// 最後のプレイヤーが抜けてゲームが削除された
    Disbanded,
}

#[derive(Debug, Clone)]
pub struct WerewolfVoteResult {
    pub message: String,
    pub all_voted: bool,
    pub remaining: usize,
    pub final_target_id: Option<UserId>,
    pub target_username: String,
    pub game: Game,
}

#[derive(Debug, Clone)]
pub struct SeerActionResult {
    pub message: String,
    /// 占い師本人にだけ送る結果
    pub private_message: String,
    pub target_role: Role,
    pub phase_changed: bool,
    pub game: Game,
}

#[derive(Debug, Clone)]
pub struct DayVoteResult {
    pub message: String,
    pub all_voted: bool,
    pub remaining: usize,
    pub game: Game,
}
