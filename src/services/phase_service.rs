use std::collections::HashMap;
use tracing::{debug, info};

use crate::{
    models::{
        action::{AdvanceOutcome, PendingReason},
        game::{Game, GamePhase},
        game_log::{LogEntry, LogEntryType},
        role::Role,
    },
    services::{error::GameError, game_service::remove_game},
    state::AppState,
};

/// 夜の行動順。役職の生存者がいなければそのフェーズは飛ばす
const NIGHT_ACTIONS: [(Role, GamePhase); 3] = [
    (Role::Werewolf, GamePhase::WerewolfAction),
    (Role::Seer, GamePhase::SeerAction),
    (Role::Witch, GamePhase::WitchAction),
];

enum Step {
    Proceed(GamePhase),
    Pending(PendingReason),
}

pub async fn advance_game_phase(
    state: &AppState,
    game_id: &str,
) -> Result<AdvanceOutcome, GameError> {
    let mut games = state.games.lock().await;
    advance_locked(&mut games, game_id)
}

/// ロック済みのレジストリに対してフェーズを一つ進める。
/// 行動の記録と同じロック区間から呼ぶことで、記録と進行を不可分にする
pub(crate) fn advance_locked(
    games: &mut HashMap<String, Game>,
    game_id: &str,
) -> Result<AdvanceOutcome, GameError> {
    let phase = games
        .get(game_id)
        .map(|g| g.phase)
        .ok_or_else(|| GameError::GameNotFound(game_id.to_string()))?;

    if phase == GamePhase::GameOver {
        remove_game(games, game_id, "game over");
        return Err(GameError::GameAlreadyOver);
    }

    let game = games
        .get_mut(game_id)
        .ok_or_else(|| GameError::GameNotFound(game_id.to_string()))?;

    let next = match resolve_step(game)? {
        Step::Proceed(next) => next,
        Step::Pending(reason) => {
            debug!("[GameService] game {} still in {}: {}", game_id, phase, reason);
            return Ok(AdvanceOutcome::Pending(reason));
        }
    };
    enter_phase(game, next);

    // 夜明けは告知だけのフェーズなので、決着していればそのまま終了まで進める
    if next == GamePhase::DayStart {
        let end = game.check_game_end();
        if end.game_over {
            game.winner = end.winner;
            enter_phase(game, GamePhase::GameOver);
        }
    }

    let snapshot = game.clone();
    if snapshot.phase == GamePhase::GameOver {
        let reason = match snapshot.winner {
            Some(winner) => format!("winner: {}", winner),
            None => "no winner".to_string(),
        };
        remove_game(games, game_id, &reason);
    }

    Ok(AdvanceOutcome::Advanced {
        from: phase,
        game: snapshot,
    })
}

/// 現在のフェーズの条件を確認し、満たしていれば遷移時の処理を行って次のフェーズを返す。
/// 条件未達の場合はゲームを一切変更しない
fn resolve_step(game: &mut Game) -> Result<Step, GameError> {
    let next = match game.phase {
        GamePhase::Setup => return Err(GameError::NotStarted),

        GamePhase::NightStart => {
            game.round += 1;
            game.reset_night_state();
            next_night_phase(game, None)
        }

        GamePhase::WerewolfAction => {
            let remaining = game.werewolves_yet_to_vote();
            if remaining > 0 {
                return Ok(Step::Pending(PendingReason::WerewolvesVoting { remaining }));
            }
            if game.nightly_targeted_player_id.is_none() {
                game.nightly_targeted_player_id =
                    game.tally_werewolf_choices().map(|t| t.target_id);
            }
            if let Some(victim) = game.resolve_night_kill() {
                info!(
                    "[GameService] game {}: player {} was killed by werewolves",
                    game.id, victim
                );
            }
            next_night_phase(game, Some(GamePhase::WerewolfAction))
        }

        GamePhase::SeerAction => {
            if !game.seer_turn_complete() {
                return Ok(Step::Pending(PendingReason::SeerChecking));
            }
            next_night_phase(game, Some(GamePhase::SeerAction))
        }

        // 魔女の行動は未実装。常に完了扱い
        GamePhase::WitchAction => GamePhase::DayStart,

        GamePhase::DayStart => end_or(game, GamePhase::Discussion),

        GamePhase::Discussion => {
            game.reset_day_votes();
            GamePhase::Voting
        }

        GamePhase::Voting => {
            let remaining = game.day_voters_remaining();
            if remaining > 0 {
                return Ok(Step::Pending(PendingReason::DayVoting { remaining }));
            }
            match game.resolve_lynch() {
                Some(lynched) => info!("[GameService] game {}: player {} was lynched", game.id, lynched),
                None => info!("[GameService] game {}: no majority, nobody was lynched", game.id),
            }
            GamePhase::VoteResult
        }

        GamePhase::VoteResult => {
            let after = if game.lynched_player_id.is_some() {
                GamePhase::LastWords
            } else {
                GamePhase::NightStart
            };
            end_or(game, after)
        }

        GamePhase::LastWords => end_or(game, GamePhase::NightStart),

        GamePhase::GameOver => return Err(GameError::GameAlreadyOver),
    };

    Ok(Step::Proceed(next))
}

/// `after` より後の夜フェーズのうち、生存者がいる最初の役職のフェーズ
fn next_night_phase(game: &Game, after: Option<GamePhase>) -> GamePhase {
    let start = after
        .and_then(|phase| NIGHT_ACTIONS.iter().position(|(_, p)| *p == phase))
        .map_or(0, |index| index + 1);

    NIGHT_ACTIONS[start..]
        .iter()
        .find(|(role, _)| game.has_alive_role(*role))
        .map_or(GamePhase::DayStart, |(_, phase)| *phase)
}

fn end_or(game: &mut Game, otherwise: GamePhase) -> GamePhase {
    let end = game.check_game_end();
    if end.game_over {
        game.winner = end.winner;
        GamePhase::GameOver
    } else {
        otherwise
    }
}

fn enter_phase(game: &mut Game, next: GamePhase) {
    let from = game.phase;
    game.log.add_entry(LogEntry::new(
        game.round,
        format!("{} -> {}", from, next),
        LogEntryType::PhaseChange { from, to: next },
    ));
    game.phase = next;
    info!(
        "[GameService] game {} advanced to phase: {} (round {})",
        game.id, next, game.round
    );
}
