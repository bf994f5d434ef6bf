use rand::{rngs::StdRng, SeedableRng};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

use crate::{
    models::{config::EngineConfig, game::Game},
    utils::config::CONFIG,
};

/// 進行中の全ゲームを保持するレジストリ。
/// 各操作はロックを一度だけ取り、処理の最後まで保持する（行動記録と自動進行を不可分にするため）
#[derive(Clone)]
pub struct AppState {
    pub games: Arc<Mutex<HashMap<String, Game>>>,
    pub config: Arc<EngineConfig>,
    pub rng: Arc<Mutex<StdRng>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// 環境変数の設定（`CONFIG`）で初期化する
    pub fn from_env() -> Self {
        Self::with_config(CONFIG.clone())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let rng = match config.role_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        AppState {
            games: Arc::new(Mutex::new(HashMap::new())),
            config: Arc::new(config),
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    pub async fn game_count(&self) -> usize {
        self.games.lock().await.len()
    }

    pub async fn game_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.games.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_env()
    }
}
