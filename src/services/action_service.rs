use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::{
    models::{
        action::{AdvanceOutcome, DayVoteResult, SeerActionResult, WerewolfVoteResult},
        game::{Game, GamePhase, SeerActionDetails},
        player::UserId,
        role::Role,
    },
    services::{error::GameError, phase_service::advance_locked},
    state::AppState,
};

/// 人狼の襲撃先投票。全員の投票が揃った時点で襲撃先を確定する（フェーズは進めない）
pub async fn werewolf_vote_kill(
    state: &AppState,
    game_id: &str,
    voter_id: UserId,
    target_id: UserId,
) -> Result<WerewolfVoteResult, GameError> {
    let mut games = state.games.lock().await;
    let game = games
        .get_mut(game_id)
        .ok_or_else(|| GameError::GameNotFound(game_id.to_string()))?;

    if game.phase != GamePhase::WerewolfAction {
        return Err(GameError::InvalidPhase(game.phase));
    }
    match game.player(voter_id) {
        Some(voter) if voter.is_alive() && voter.has_role(Role::Werewolf) => {}
        _ => return Err(GameError::NotAliveWerewolf(voter_id)),
    }
    // 自分や仲間の人狼を選ぶことも許可する
    let target = game
        .player(target_id)
        .ok_or(GameError::PlayerNotFound(target_id))?;
    if !target.is_alive() {
        return Err(GameError::TargetNotAlive(target_id));
    }
    let target_username = target.display_name();

    game.record_werewolf_choice(voter_id, target_id);
    debug!(
        "[GameService] game {}: werewolf {} voted for {} ({} choice(s) recorded)",
        game_id,
        voter_id,
        target_username,
        game.werewolf_choices.len()
    );

    let remaining = game.werewolves_yet_to_vote();
    if remaining > 0 {
        return Ok(WerewolfVoteResult {
            message: format!(
                "Your choice (@{}) is recorded. Waiting for {} more werewolf vote(s)...",
                target_username, remaining
            ),
            all_voted: false,
            remaining,
            final_target_id: None,
            target_username,
            game: game.clone(),
        });
    }

    let tally = game.tally_werewolf_choices();
    if let Some(tally) = tally.filter(|t| t.tie_broken) {
        warn!(
            "[GameService] game {}: werewolf vote tied at {} vote(s), most recently chosen leader {} wins",
            game_id, tally.votes, tally.target_id
        );
    }
    game.nightly_targeted_player_id = tally.map(|t| t.target_id);

    let final_name = game
        .nightly_targeted_player_id
        .and_then(|id| game.player(id))
        .map(|p| p.display_name())
        .unwrap_or_else(|| "nobody".to_string());
    info!(
        "[GameService] game {}: all {} werewolves voted. tonight's target: {}",
        game_id,
        game.alive_werewolf_count(),
        final_name
    );

    Ok(WerewolfVoteResult {
        message: format!(
            "Your choice (@{}) is recorded. All werewolves have voted, the target is @{}.",
            target_username, final_name
        ),
        all_voted: true,
        remaining: 0,
        final_target_id: game.nightly_targeted_player_id,
        target_username,
        game: game.clone(),
    })
}

/// 占い。対象の正確な役職を占い師本人だけに返し、同じロック区間でフェーズ進行を試みる
pub async fn seer_action(
    state: &AppState,
    game_id: &str,
    seer_id: UserId,
    target_id: UserId,
) -> Result<SeerActionResult, GameError> {
    let mut games = state.games.lock().await;
    let game = games
        .get_mut(game_id)
        .ok_or_else(|| GameError::GameNotFound(game_id.to_string()))?;

    if game.phase != GamePhase::SeerAction {
        return Err(GameError::InvalidPhase(game.phase));
    }
    match game.player(seer_id) {
        Some(seer) if seer.is_alive() && seer.has_role(Role::Seer) => {}
        _ => return Err(GameError::NotAliveSeer(seer_id)),
    }
    if game.seer_has_acted(seer_id) {
        return Err(GameError::AlreadyActed(seer_id));
    }
    let target = game
        .player(target_id)
        .ok_or(GameError::PlayerNotFound(target_id))?;
    if !target.is_alive() {
        return Err(GameError::TargetNotAlive(target_id));
    }
    if target_id == seer_id {
        return Err(GameError::SelfTarget);
    }
    let target_role = target.role.ok_or(GameError::NotStarted)?;
    let target_name = target.display_name();

    game.seer_action_details = Some(SeerActionDetails {
        round: game.round,
        seer_id,
        target_id,
        target_role,
    });
    info!(
        "[GameService] game {}: seer {} checked {} (round {})",
        game_id, seer_id, target_id, game.round
    );

    let private_message = format!("The player @{} is a {}.", target_name, target_role);
    let (game, phase_changed) = advance_after_action(&mut games, game_id, GamePhase::SeerAction)?;

    Ok(SeerActionResult {
        message: "Check complete. The result has been sent to you privately.".to_string(),
        private_message,
        target_role,
        phase_changed,
        game,
    })
}

/// 昼の処刑投票。生存者全員の投票が揃えば同じロック区間で結果フェーズへ進める
pub async fn record_day_vote(
    state: &AppState,
    game_id: &str,
    voter_id: UserId,
    target_id: UserId,
) -> Result<DayVoteResult, GameError> {
    let mut games = state.games.lock().await;
    let game = games
        .get_mut(game_id)
        .ok_or_else(|| GameError::GameNotFound(game_id.to_string()))?;

    if game.phase != GamePhase::Voting {
        return Err(GameError::InvalidPhase(game.phase));
    }
    match game.player(voter_id) {
        Some(voter) if voter.is_alive() => {}
        _ => return Err(GameError::VoterNotAlive(voter_id)),
    }
    let target = game
        .player(target_id)
        .ok_or(GameError::PlayerNotFound(target_id))?;
    if !target.is_alive() {
        return Err(GameError::TargetNotAlive(target_id));
    }

    game.record_day_vote(voter_id, target_id);
    debug!(
        "[GameService] game {}: {} voted for {}",
        game_id, voter_id, target_id
    );

    let remaining = game.day_voters_remaining();
    if remaining > 0 {
        return Ok(DayVoteResult {
            message: format!("Vote recorded. Waiting for {} more vote(s).", remaining),
            all_voted: false,
            remaining,
            game: game.clone(),
        });
    }

    let (game, _) = advance_after_action(&mut games, game_id, GamePhase::Voting)?;
    Ok(DayVoteResult {
        message: "Vote recorded. Everyone has voted, moving on to the result.".to_string(),
        all_voted: true,
        remaining: 0,
        game,
    })
}

/// 行動直後のフェーズ進行。進んだ場合は遷移後のスナップショットを返す
fn advance_after_action(
    games: &mut HashMap<String, Game>,
    game_id: &str,
    acting_phase: GamePhase,
) -> Result<(Game, bool), GameError> {
    match advance_locked(games, game_id)? {
        AdvanceOutcome::Advanced { game, .. } => {
            let changed = game.phase != acting_phase;
            Ok((game, changed))
        }
        AdvanceOutcome::Pending(reason) => {
            debug!(
                "[GameService] game {}: action recorded, still waiting ({})",
                game_id, reason
            );
            let game = games
                .get(game_id)
                .cloned()
                .ok_or_else(|| GameError::GameNotFound(game_id.to_string()))?;
            Ok((game, false))
        }
    }
}
