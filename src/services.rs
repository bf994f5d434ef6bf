pub mod action_service;
pub mod error;
pub mod game_service;
pub mod phase_service;

pub use error::{ErrorKind, GameError};
