use werewolf_engine::{
    models::{
        action::AdvanceOutcome,
        game::{GamePhase, SeerActionDetails},
        game_log::LogEntryType,
        role::Role,
    },
    services::{
        action_service,
        error::{ErrorKind, GameError},
        game_service, phase_service,
    },
    state::AppState,
    utils::test_setup::{setup_started_game, setup_test_env},
};

/// NIGHT_START から人狼の投票フェーズまで進める
async fn to_werewolf_phase(state: &AppState, roles: &[Role]) {
    setup_started_game(state, "g1", roles).await;
    let outcome = phase_service::advance_game_phase(state, "g1").await.unwrap();
    assert_eq!(
        outcome.game().map(|g| g.phase),
        Some(GamePhase::WerewolfAction)
    );
}

async fn force_phase(state: &AppState, phase: GamePhase) {
    let mut games = state.games.lock().await;
    games.get_mut("g1").unwrap().phase = phase;
}

#[tokio::test]
async fn test_werewolf_vote_overwrite_and_all_voted() {
    setup_test_env();
    let state = AppState::new();
    let roles = [
        Role::Werewolf,
        Role::Werewolf,
        Role::Seer,
        Role::Villager,
        Role::Villager,
    ];
    to_werewolf_phase(&state, &roles).await;

    let first = action_service::werewolf_vote_kill(&state, "g1", 1, 4)
        .await
        .unwrap();
    assert!(!first.all_voted);
    assert_eq!(first.remaining, 1);
    assert_eq!(first.final_target_id, None);
    assert_eq!(first.target_username, "Player4");

    // 再投票は上書きされ、まだ全員投票ではない
    let again = action_service::werewolf_vote_kill(&state, "g1", 1, 5)
        .await
        .unwrap();
    assert!(!again.all_voted);
    assert_eq!(again.game.werewolf_choices.len(), 1);
    assert_eq!(again.game.werewolf_choice(1), Some(5));

    let last = action_service::werewolf_vote_kill(&state, "g1", 2, 5)
        .await
        .unwrap();
    assert!(last.all_voted);
    assert_eq!(last.remaining, 0);
    assert_eq!(last.final_target_id, Some(5));
    assert_eq!(last.game.nightly_targeted_player_id, Some(5));
    // 投票だけではフェーズは進まない
    assert_eq!(last.game.phase, GamePhase::WerewolfAction);
    assert!(last.game.player(5).unwrap().is_alive());
}

#[tokio::test]
async fn test_werewolf_tie_picks_latest_leader() {
    setup_test_env();
    let state = AppState::new();
    let roles = [
        Role::Werewolf,
        Role::Werewolf,
        Role::Villager,
        Role::Villager,
        Role::Villager,
        Role::Villager,
    ];
    to_werewolf_phase(&state, &roles).await;

    action_service::werewolf_vote_kill(&state, "g1", 1, 3)
        .await
        .unwrap();
    let result = action_service::werewolf_vote_kill(&state, "g1", 2, 4)
        .await
        .unwrap();
    assert!(result.all_voted);
    assert_eq!(result.final_target_id, Some(4));

    // 1が投票し直すと、最も新しい票を得た3が選ばれる
    let result = action_service::werewolf_vote_kill(&state, "g1", 1, 3)
        .await
        .unwrap();
    assert_eq!(result.final_target_id, Some(3));
}

#[tokio::test]
async fn test_werewolf_vote_validation() {
    setup_test_env();
    let state = AppState::new();
    let roles = [Role::Werewolf, Role::Villager, Role::Villager];
    setup_started_game(&state, "g1", &roles).await;

    // NIGHT_START ではまだ投票できない
    let err = action_service::werewolf_vote_kill(&state, "g1", 1, 2)
        .await
        .unwrap_err();
    assert_eq!(err, GameError::InvalidPhase(GamePhase::NightStart));
    assert_eq!(err.kind(), ErrorKind::InvalidPhase);

    phase_service::advance_game_phase(&state, "g1").await.unwrap();

    let err = action_service::werewolf_vote_kill(&state, "g1", 2, 3)
        .await
        .unwrap_err();
    assert_eq!(err, GameError::NotAliveWerewolf(2));
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    assert_eq!(
        action_service::werewolf_vote_kill(&state, "g1", 1, 42)
            .await
            .unwrap_err(),
        GameError::PlayerNotFound(42)
    );
    assert_eq!(
        action_service::werewolf_vote_kill(&state, "nope", 1, 2)
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn test_seer_reveals_exact_role_and_acts_once() {
    setup_test_env();
    let state = AppState::new();
    let roles = [
        Role::Werewolf,
        Role::Seer,
        Role::Witch,
        Role::Villager,
        Role::Villager,
    ];
    to_werewolf_phase(&state, &roles).await;
    action_service::werewolf_vote_kill(&state, "g1", 1, 4)
        .await
        .unwrap();
    phase_service::advance_game_phase(&state, "g1").await.unwrap();

    // 村人陣営でも陣営ではなく役職そのものを返す
    let check = action_service::seer_action(&state, "g1", 2, 3).await.unwrap();
    assert_eq!(check.target_role, Role::Witch);
    assert_eq!(check.private_message, "The player @Player3 is a Witch.");
    assert!(check.phase_changed);
    assert_eq!(check.game.phase, GamePhase::WitchAction);
    let details = check.game.seer_action_details.unwrap();
    assert_eq!(details.target_id, 3);
    assert_eq!(details.round, check.game.round);
}

#[tokio::test]
async fn test_seer_cannot_act_twice_in_a_round() {
    setup_test_env();
    let state = AppState::new();
    let roles = [Role::Werewolf, Role::Seer, Role::Villager, Role::Villager];
    to_werewolf_phase(&state, &roles).await;
    force_phase(&state, GamePhase::SeerAction).await;

    {
        let mut games = state.games.lock().await;
        let game = games.get_mut("g1").unwrap();
        game.seer_action_details = Some(SeerActionDetails {
            round: game.round,
            seer_id: 2,
            target_id: 3,
            target_role: Role::Villager,
        });
    }

    // 対象に関係なく二度目は拒否される
    for target in [3, 4, 1] {
        assert_eq!(
            action_service::seer_action(&state, "g1", 2, target)
                .await
                .unwrap_err(),
            GameError::AlreadyActed(2)
        );
    }
}

#[tokio::test]
async fn test_seer_action_validation() {
    setup_test_env();
    let state = AppState::new();
    let roles = [Role::Werewolf, Role::Seer, Role::Villager, Role::Villager];
    to_werewolf_phase(&state, &roles).await;

    assert_eq!(
        action_service::seer_action(&state, "g1", 2, 1)
            .await
            .unwrap_err(),
        GameError::InvalidPhase(GamePhase::WerewolfAction)
    );

    force_phase(&state, GamePhase::SeerAction).await;
    {
        let mut games = state.games.lock().await;
        games.get_mut("g1").unwrap().player_mut(4).unwrap().kill();
    }

    assert_eq!(
        action_service::seer_action(&state, "g1", 3, 1)
            .await
            .unwrap_err(),
        GameError::NotAliveSeer(3)
    );
    assert_eq!(
        action_service::seer_action(&state, "g1", 2, 9)
            .await
            .unwrap_err(),
        GameError::PlayerNotFound(9)
    );
    assert_eq!(
        action_service::seer_action(&state, "g1", 2, 4)
            .await
            .unwrap_err(),
        GameError::TargetNotAlive(4)
    );
    assert_eq!(
        action_service::seer_action(&state, "g1", 2, 2)
            .await
            .unwrap_err(),
        GameError::SelfTarget
    );

    // 失敗した試行は記録されない
    let game = game_service::get_game(&state, "g1").await.unwrap();
    assert!(game.seer_action_details.is_none());
}

#[tokio::test]
async fn test_day_vote_validation() {
    setup_test_env();
    let state = AppState::new();
    let roles = [Role::Werewolf, Role::Villager, Role::Villager, Role::Villager];
    setup_started_game(&state, "g1", &roles).await;

    assert_eq!(
        action_service::record_day_vote(&state, "g1", 2, 1)
            .await
            .unwrap_err(),
        GameError::InvalidPhase(GamePhase::NightStart)
    );

    force_phase(&state, GamePhase::Voting).await;
    {
        let mut games = state.games.lock().await;
        games.get_mut("g1").unwrap().player_mut(4).unwrap().kill();
    }

    assert_eq!(
        action_service::record_day_vote(&state, "g1", 4, 1)
            .await
            .unwrap_err(),
        GameError::VoterNotAlive(4)
    );
    assert_eq!(
        action_service::record_day_vote(&state, "g1", 7, 1)
            .await
            .unwrap_err(),
        GameError::VoterNotAlive(7)
    );
    assert_eq!(
        action_service::record_day_vote(&state, "g1", 2, 4)
            .await
            .unwrap_err(),
        GameError::TargetNotAlive(4)
    );
}

#[tokio::test]
async fn test_day_vote_change_and_auto_advance() {
    setup_test_env();
    let state = AppState::new();
    let roles = [
        Role::Werewolf,
        Role::Villager,
        Role::Villager,
        Role::Villager,
        Role::Villager,
    ];
    setup_started_game(&state, "g1", &roles).await;
    force_phase(&state, GamePhase::Voting).await;

    let result = action_service::record_day_vote(&state, "g1", 2, 3)
        .await
        .unwrap();
    assert_eq!(result.remaining, 4);
    assert_eq!(result.game.player(3).unwrap().votes_received, vec![2]);

    // 投票先の変更は票数を増やさない
    let result = action_service::record_day_vote(&state, "g1", 2, 1)
        .await
        .unwrap();
    assert_eq!(result.remaining, 4);
    assert!(result.game.player(3).unwrap().votes_received.is_empty());
    assert_eq!(result.game.player(1).unwrap().votes_received, vec![2]);

    for (voter, target) in [(3, 1), (4, 1), (1, 5)] {
        let result = action_service::record_day_vote(&state, "g1", voter, target)
            .await
            .unwrap();
        assert!(!result.all_voted);
    }
    let result = action_service::record_day_vote(&state, "g1", 5, 2)
        .await
        .unwrap();
    assert!(result.all_voted);
    assert_eq!(result.game.phase, GamePhase::VoteResult);
    assert_eq!(result.game.lynched_player_id, Some(1));

    // 結果フェーズでは投票できない
    assert_eq!(
        action_service::record_day_vote(&state, "g1", 2, 3)
            .await
            .unwrap_err(),
        GameError::InvalidPhase(GamePhase::VoteResult)
    );

    let outcome = phase_service::advance_game_phase(&state, "g1").await.unwrap();
    let AdvanceOutcome::Advanced { from, game } = outcome else {
        panic!("expected game over");
    };
    assert_eq!(from, GamePhase::VoteResult);
    assert_eq!(game.phase, GamePhase::GameOver);
}

#[tokio::test]
async fn test_concurrent_votes_resolve_once() {
    setup_test_env();
    let state = AppState::new();
    let roles = [
        Role::Werewolf,
        Role::Villager,
        Role::Villager,
        Role::Villager,
        Role::Villager,
        Role::Villager,
    ];
    setup_started_game(&state, "g1", &roles).await;
    force_phase(&state, GamePhase::Voting).await;

    let mut handles = Vec::new();
    for voter in 1..=6 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            let target = if voter == 2 { 3 } else { 2 };
            action_service::record_day_vote(&state, "g1", voter, target).await
        }));
    }

    let mut completed = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().all_voted {
            completed += 1;
        }
    }
    // 最後の一票だけが結果フェーズへの遷移を起こす
    assert_eq!(completed, 1);

    let game = game_service::get_game(&state, "g1").await.unwrap();
    assert_eq!(game.phase, GamePhase::VoteResult);
    assert_eq!(game.lynched_player_id, Some(2));
    let lynch_entries = game
        .log
        .entries_of(|t| matches!(t, LogEntryType::Lynch { .. }));
    assert_eq!(lynch_entries.len(), 1);
}
