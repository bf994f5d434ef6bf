use crate::models::{game::GamePhase, player::UserId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Game not found: {0}")]
    GameNotFound(String),
    #[error("Player {0} not found in this game")]
    PlayerNotFound(UserId),
    #[error("Player {0} is not in this game")]
    NotInGame(UserId),

    #[error("This action is not allowed during {0}")]
    InvalidPhase(GamePhase),
    #[error("The game has not started yet, start the game first")]
    NotStarted,
    #[error("The game is already over")]
    GameAlreadyOver,

    #[error("Only the game master can do this")]
    NotGameMaster,
    #[error("Player {0} is not an alive werewolf")]
    NotAliveWerewolf(UserId),
    #[error("Player {0} is not an alive seer")]
    NotAliveSeer(UserId),
    #[error("Player {0} cannot vote")]
    VoterNotAlive(UserId),

    #[error("A game already exists in this chat")]
    AlreadyExists,
    #[error("Player {0} has already joined")]
    AlreadyJoined(UserId),
    #[error("The game is full ({max} players)")]
    GameFull { max: usize },
    #[error("Player {0} has already acted this round")]
    AlreadyActed(UserId),
    #[error("Player {0} is not alive")]
    TargetNotAlive(UserId),
    #[error("You cannot target yourself")]
    SelfTarget,
    #[error("At least {min} players are needed to start (currently {current})")]
    TooFewPlayers { min: usize, current: usize },

    #[error("No role configuration for {0} players")]
    NoRoleConfig(usize),
}

/// 呼び出し側が表示や再試行を判断するための分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidPhase,
    PermissionDenied,
    Conflict,
    ConfigurationMissing,
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::GameNotFound(_) | GameError::PlayerNotFound(_) | GameError::NotInGame(_) => {
                ErrorKind::NotFound
            }
            GameError::InvalidPhase(_) | GameError::NotStarted | GameError::GameAlreadyOver => {
                ErrorKind::InvalidPhase
            }
            GameError::NotGameMaster
            | GameError::NotAliveWerewolf(_)
            | GameError::NotAliveSeer(_)
            | GameError::VoterNotAlive(_) => ErrorKind::PermissionDenied,
            GameError::AlreadyExists
            | GameError::AlreadyJoined(_)
            | GameError::GameFull { .. }
            | GameError::AlreadyActed(_)
            | GameError::TargetNotAlive(_)
            | GameError::SelfTarget
            | GameError::TooFewPlayers { .. } => ErrorKind::Conflict,
            GameError::NoRoleConfig(_) => ErrorKind::ConfigurationMissing,
        }
    }
}
