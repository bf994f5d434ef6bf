use std::env;

use super::rule::{RoleTable, DEFAULT_MAX_PLAYERS, DEFAULT_MIN_PLAYERS};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is not a valid number: {value}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("WEREWOLF_ROLE_TABLE is not valid JSON: {0}")]
    InvalidRoleTable(#[from] serde_json::Error),
    #[error("player limits are inconsistent: min {min}, max {max}")]
    InvalidPlayerLimits { min: usize, max: usize },
    #[error("role table has no entry for {0} players")]
    MissingRoleEntry(usize),
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    // ゲーム開始に必要な最少人数
    pub min_players: usize,
    // 参加できる最大人数
    pub max_players: usize,
    // 役職配布の乱数シード。Noneならエントロピーから
    pub role_seed: Option<u64>,
    pub verbose_logging: bool,
    pub role_table: RoleTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_players: DEFAULT_MIN_PLAYERS,
            max_players: DEFAULT_MAX_PLAYERS,
            role_seed: None,
            verbose_logging: cfg!(debug_assertions),
            role_table: RoleTable::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let min_players = parse_var("WEREWOLF_MIN_PLAYERS")?.unwrap_or(defaults.min_players);
        let max_players = parse_var("WEREWOLF_MAX_PLAYERS")?.unwrap_or(defaults.max_players);
        let role_seed = parse_var("WEREWOLF_ROLE_SEED")?;
        let verbose_logging = env::var("WEREWOLF_VERBOSE_LOGGING")
            .map(|v| v == "true")
            .unwrap_or(defaults.verbose_logging);
        let role_table = match env::var("WEREWOLF_ROLE_TABLE") {
            Ok(json) if !json.trim().is_empty() => RoleTable::from_json(&json)?,
            _ => defaults.role_table,
        };

        let config = Self {
            min_players,
            max_players,
            role_seed,
            verbose_logging,
            role_table,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_players == 0 || self.min_players > self.max_players {
            return Err(ConfigError::InvalidPlayerLimits {
                min: self.min_players,
                max: self.max_players,
            });
        }
        // 最少人数と満員のどちらでも開始できること
        for count in [self.min_players, self.max_players] {
            if self.role_table.roles_for(count).is_none() {
                return Err(ConfigError::MissingRoleEntry(count));
            }
        }
        Ok(())
    }

    pub fn with_role_table(mut self, role_table: RoleTable) -> Self {
        self.role_table = role_table;
        self
    }

    pub fn with_role_seed(mut self, seed: u64) -> Self {
        self.role_seed = Some(seed);
        self
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        _ => Ok(None),
    }
}
