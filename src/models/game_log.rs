use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{game::GamePhase, player::UserId};

/// ゲームごとのシステムログ。フェーズ遷移や死亡を記録する（表示・監査用）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameLog {
    pub entries: Vec<LogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub entry_id: String,
    pub round: u32,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub entry_type: LogEntryType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LogEntryType {
    PhaseChange { from: GamePhase, to: GamePhase },
    NightKill { player_id: UserId },
    Lynch { player_id: UserId },
    System,
}

impl GameLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn add_system_entry(&mut self, round: u32, content: String) {
        self.add_entry(LogEntry::new(round, content, LogEntryType::System));
    }

    pub fn entries_of(&self, matches: impl Fn(&LogEntryType) -> bool) -> Vec<&LogEntry> {
        self.entries
            .iter()
            .filter(|e| matches(&e.entry_type))
            .collect()
    }
}

impl LogEntry {
    pub fn new(round: u32, content: String, entry_type: LogEntryType) -> Self {
        LogEntry {
            entry_id: uuid::Uuid::new_v4().to_string(),
            round,
            content,
            timestamp: Utc::now(),
            entry_type,
        }
    }
}
