pub mod action;
pub mod config;
pub mod game;
pub mod game_log;
pub mod player;
pub mod role;
pub mod rule;

pub use action::*;
pub use config::*;
pub use game::*;
pub use game_log::*;
pub use player::*;
pub use role::*;
pub use rule::*;
