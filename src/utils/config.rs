use once_cell::sync::Lazy;
use tracing::warn;

use crate::models::config::EngineConfig;

/// 環境変数から読み込んだ設定。不正な値があればデフォルトに戻す
pub static CONFIG: Lazy<EngineConfig> = Lazy::new(|| match EngineConfig::from_env() {
    Ok(config) => config,
    Err(e) => {
        warn!("invalid engine configuration, using defaults: {}", e);
        EngineConfig::default()
    }
});
