use std::sync::Once;

use crate::{
    models::{
        game::{Game, GamePhase},
        player::UserId,
        role::Role,
    },
    services::game_service,
    state::AppState,
};

static INIT: Once = Once::new();

pub fn setup_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    });
}

/// 1..=N のIDでプレイヤーを参加させたSETUP中のゲームを作る（1がゲームマスター）
pub async fn setup_lobby(state: &AppState, game_id: &str, player_count: usize) -> Game {
    let mut game = game_service::create_game(state, game_id, 1, Some("Player1".to_string()))
        .await
        .expect("create game");
    for id in 2..=player_count as UserId {
        game = game_service::join_game(state, game_id, id, Some(format!("Player{}", id)))
            .await
            .expect("join game");
    }
    game
}

/// 役職を指定してゲームを開始済み（NIGHT_START）の状態にする。
/// 役職配布は乱数なので、開始後に登録済みのゲームを直接書き換える
pub async fn setup_started_game(state: &AppState, game_id: &str, roles: &[Role]) -> Game {
    setup_lobby(state, game_id, roles.len()).await;

    let mut games = state.games.lock().await;
    let game = games.get_mut(game_id).expect("game registered");
    for (player, role) in game.players.iter_mut().zip(roles) {
        player.role = Some(*role);
    }
    game.roles_configuration = roles.to_vec();
    game.phase = GamePhase::NightStart;
    game.round = 1;
    game.clone()
}

pub fn player_with_role(game: &Game, role: Role) -> UserId {
    game.players
        .iter()
        .find(|p| p.has_role(role))
        .map(|p| p.id)
        .expect("role present in game")
}
