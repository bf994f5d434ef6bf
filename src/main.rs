use anyhow::{bail, Context};
use dotenvy::dotenv;
use env_logger::Builder;
use log::LevelFilter;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use structopt::StructOpt;

use werewolf_engine::{
    models::{
        action::{AdvanceOutcome, PendingReason},
        config::EngineConfig,
        game::{Game, GamePhase},
        player::UserId,
        role::Role,
    },
    services::{action_service, game_service, phase_service},
    state::AppState,
};

// 1ゲームあたりのフェーズ進行の上限。進行が止まった場合の保険
const MAX_STEPS: usize = 1000;

#[derive(Debug, StructOpt)]
#[structopt(name = "werewolf-engine", about = "usage of werewolf-engine commands.")]
enum Command {
    /// play complete games with scripted random players
    #[structopt(name = "simulate")]
    Simulate {
        /// number of players per game
        #[structopt(long, default_value = "7")]
        players: usize,
        /// number of games to play
        #[structopt(long, default_value = "1")]
        games: usize,
        /// seed for role dealing and player decisions
        #[structopt(long)]
        seed: Option<u64>,
    },
    /// print the role table in use
    #[structopt(name = "roles")]
    Roles,
}

// ログ設定
fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    Builder::new()
        .filter_level(level)
        .format_timestamp(Some(env_logger::TimestampPrecision::Millis))
        .format_target(true)
        .parse_env("RUST_LOG")
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenv() {
        eprintln!("Warning: failed to load .env file: {}", e);
    }

    let command = Command::from_args();
    let mut config = EngineConfig::from_env().context("invalid engine configuration")?;
    init_logger(config.verbose_logging);

    match command {
        Command::Roles => {
            for count in config.role_table.supported_counts() {
                let roles = config.role_table.roles_for(count).unwrap_or_default();
                let names: Vec<String> = roles.iter().map(Role::to_string).collect();
                println!("{:>2} players: {}", count, names.join(", "));
            }
        }
        Command::Simulate {
            players,
            games,
            seed,
        } => {
            if let Some(seed) = seed {
                config = config.with_role_seed(seed);
            }
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
                None => StdRng::from_entropy(),
            };
            let state = AppState::with_config(config);

            for index in 0..games {
                let game_id = format!("sim-{}", index + 1);
                let finished = play_game(&state, &game_id, players, &mut rng).await?;
                let winner = finished
                    .winner
                    .map(|w| w.to_string())
                    .unwrap_or_else(|| "nobody".to_string());
                println!(
                    "{}: {} won after round {} ({} of {} players alive)",
                    game_id,
                    winner,
                    finished.round,
                    finished.alive_count(),
                    finished.players.len()
                );
            }
        }
    }

    Ok(())
}

async fn play_game(
    state: &AppState,
    game_id: &str,
    player_count: usize,
    rng: &mut StdRng,
) -> anyhow::Result<Game> {
    game_service::create_game(state, game_id, 1, Some("Player1".to_string())).await?;
    for id in 2..=player_count as UserId {
        game_service::join_game(state, game_id, id, Some(format!("Player{}", id))).await?;
    }
    let game = game_service::start_game(state, game_id, 1)
        .await
        .with_context(|| format!("cannot start {} with {} players", game_id, player_count))?;
    for player in &game.players {
        log::debug!("{} is {:?}", player.display_name(), player.role);
    }

    for _ in 0..MAX_STEPS {
        let reason = match phase_service::advance_game_phase(state, game_id).await? {
            AdvanceOutcome::Pending(reason) => reason,
            advanced => match advanced.into_game() {
                Some(game) if game.phase == GamePhase::GameOver => return Ok(game),
                _ => continue,
            },
        };

        let game = game_service::get_game(state, game_id)
            .await
            .context("game disappeared while waiting for players")?;
        if let Some(finished) = act(state, &game, reason, rng).await? {
            return Ok(finished);
        }
    }

    game_service::end_game(state, game_id, "simulation step limit reached").await;
    bail!("{} did not finish within {} steps", game_id, MAX_STEPS)
}

/// 待ち状態に応じて、まだ行動していないプレイヤーにランダムな行動をさせる
async fn act(
    state: &AppState,
    game: &Game,
    reason: PendingReason,
    rng: &mut StdRng,
) -> anyhow::Result<Option<Game>> {
    let alive: Vec<UserId> = game.alive_players().map(|p| p.id).collect();

    match reason {
        PendingReason::WerewolvesVoting { .. } => {
            let villagers: Vec<UserId> = game
                .alive_players()
                .filter(|p| !p.has_role(Role::Werewolf))
                .map(|p| p.id)
                .collect();
            let pool = if villagers.is_empty() { &alive } else { &villagers };
            for werewolf in game
                .alive_players()
                .filter(|p| p.has_role(Role::Werewolf) && game.werewolf_choice(p.id).is_none())
            {
                if let Some(target) = pool.choose(rng) {
                    action_service::werewolf_vote_kill(state, &game.id, werewolf.id, *target)
                        .await?;
                }
            }
        }
        PendingReason::SeerChecking => {
            for seer in game.alive_players().filter(|p| p.has_role(Role::Seer)) {
                let others: Vec<UserId> = alive.iter().copied().filter(|id| *id != seer.id).collect();
                if let Some(target) = others.choose(rng) {
                    let result = action_service::seer_action(state, &game.id, seer.id, *target).await?;
                    log::debug!("{}", result.private_message);
                    if result.game.phase == GamePhase::GameOver {
                        return Ok(Some(result.game));
                    }
                }
            }
        }
        PendingReason::DayVoting { .. } => {
            for voter in game
                .alive_players()
                .filter(|p| !game.day_votes.contains_key(&p.id))
            {
                let others: Vec<UserId> = alive.iter().copied().filter(|id| *id != voter.id).collect();
                let pool = if others.is_empty() { &alive } else { &others };
                if let Some(target) = pool.choose(rng) {
                    action_service::record_day_vote(state, &game.id, voter.id, *target).await?;
                }
            }
        }
    }

    Ok(None)
}
