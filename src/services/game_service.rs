use rand::seq::SliceRandom;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::{
    models::{
        action::LeaveOutcome,
        game::{Game, GamePhase},
        player::{Player, UserId},
        role::Role,
    },
    services::error::GameError,
    state::AppState,
};

pub async fn create_game(
    state: &AppState,
    game_id: &str,
    master_id: UserId,
    master_username: Option<String>,
) -> Result<Game, GameError> {
    let mut games = state.games.lock().await;
    if games.contains_key(game_id) {
        return Err(GameError::AlreadyExists);
    }

    let mut game = Game::new(game_id.to_string(), master_id, master_username);
    game.log
        .add_system_entry(0, format!("Game created by {}", game.players[0].display_name()));
    info!(
        "[GameService] game created: {} by {}",
        game_id,
        game.players[0].display_name()
    );

    games.insert(game_id.to_string(), game.clone());
    Ok(game)
}

pub async fn join_game(
    state: &AppState,
    game_id: &str,
    player_id: UserId,
    username: Option<String>,
) -> Result<Game, GameError> {
    let mut games = state.games.lock().await;
    let game = games
        .get_mut(game_id)
        .ok_or_else(|| GameError::GameNotFound(game_id.to_string()))?;

    if game.phase != GamePhase::Setup {
        return Err(GameError::InvalidPhase(game.phase));
    }
    if game.player(player_id).is_some() {
        return Err(GameError::AlreadyJoined(player_id));
    }
    let max = state.config.max_players;
    if game.players.len() >= max {
        return Err(GameError::GameFull { max });
    }

    let player = Player::new(player_id, username);
    info!(
        "[GameService] player joined: {} to game {}",
        player.display_name(),
        game_id
    );
    game.players.push(player);
    Ok(game.clone())
}

pub async fn leave_game(
    state: &AppState,
    game_id: &str,
    player_id: UserId,
) -> Result<LeaveOutcome, GameError> {
    let mut games = state.games.lock().await;
    let game = games
        .get_mut(game_id)
        .ok_or_else(|| GameError::GameNotFound(game_id.to_string()))?;

    if game.phase != GamePhase::Setup {
        return Err(GameError::InvalidPhase(game.phase));
    }
    let index = game
        .players
        .iter()
        .position(|p| p.id == player_id)
        .ok_or(GameError::NotInGame(player_id))?;

    let leaving = game.players.remove(index);
    info!(
        "[GameService] player left: {} from game {}",
        leaving.display_name(),
        game_id
    );

    if game.players.is_empty() {
        remove_game(&mut games, game_id, "all players left");
        return Ok(LeaveOutcome::Disbanded);
    }

    if leaving.is_game_master {
        let next_master = &mut game.players[0];
        next_master.is_game_master = true;
        game.game_master = next_master.id;
        info!(
            "[GameService] game master moved to {} in game {}",
            next_master.display_name(),
            game_id
        );
    }

    Ok(LeaveOutcome::Left(game.clone()))
}

pub async fn start_game(
    state: &AppState,
    game_id: &str,
    requester_id: UserId,
) -> Result<Game, GameError> {
    let mut games = state.games.lock().await;
    let game = games
        .get_mut(game_id)
        .ok_or_else(|| GameError::GameNotFound(game_id.to_string()))?;

    if game.game_master != requester_id {
        return Err(GameError::NotGameMaster);
    }
    if game.phase != GamePhase::Setup {
        return Err(GameError::InvalidPhase(game.phase));
    }
    let min = state.config.min_players;
    if game.players.len() < min {
        return Err(GameError::TooFewPlayers {
            min,
            current: game.players.len(),
        });
    }

    let player_count = game.players.len();
    let mut roles: Vec<Role> = match state.config.role_table.roles_for(player_count) {
        Some(roles) => roles.to_vec(),
        None => {
            warn!(
                "[GameService] no role configuration for {} players (game {})",
                player_count, game_id
            );
            return Err(GameError::NoRoleConfig(player_count));
        }
    };

    {
        let mut rng = state.rng.lock().await;
        roles.shuffle(&mut *rng);
    }
    assign_roles(game, roles);

    game.phase = GamePhase::NightStart;
    game.round = 1;
    game.log
        .add_system_entry(game.round, format!("Game started with {} players", player_count));
    info!("[GameService] game started: {}. roles assigned", game_id);

    Ok(game.clone())
}

/// 設定が人数より短い場合は先頭から繰り返して割り当てる
fn assign_roles(game: &mut Game, roles: Vec<Role>) {
    for (index, player) in game.players.iter_mut().enumerate() {
        player.role = Some(roles[index % roles.len()]);
        player.votes_received.clear();
    }
    game.roles_configuration = roles;
}

pub async fn get_game(state: &AppState, game_id: &str) -> Option<Game> {
    state.games.lock().await.get(game_id).cloned()
}

pub async fn end_game(state: &AppState, game_id: &str, reason: &str) -> bool {
    let mut games = state.games.lock().await;
    remove_game(&mut games, game_id, reason)
}

pub async fn get_player_role(
    state: &AppState,
    game_id: &str,
    player_id: UserId,
) -> Result<Option<Role>, GameError> {
    let games = state.games.lock().await;
    let game = games
        .get(game_id)
        .ok_or_else(|| GameError::GameNotFound(game_id.to_string()))?;
    game.player(player_id)
        .map(|p| p.role)
        .ok_or(GameError::NotInGame(player_id))
}

/// 後から編集するためにチャット側のメッセージIDを保存する
pub async fn set_message_id_to_edit(state: &AppState, game_id: &str, message_id: i64) -> bool {
    let mut games = state.games.lock().await;
    match games.get_mut(game_id) {
        Some(game) => {
            game.message_id_to_edit = Some(message_id);
            true
        }
        None => {
            warn!(
                "[GameService] cannot set message id for game {}: game not found",
                game_id
            );
            false
        }
    }
}

pub(crate) fn remove_game(games: &mut HashMap<String, Game>, game_id: &str, reason: &str) -> bool {
    if games.remove(game_id).is_some() {
        info!("[GameService] game ended: {}. reason: {}", game_id, reason);
        true
    } else {
        false
    }
}
