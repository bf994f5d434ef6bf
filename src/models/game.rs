use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{
    game_log::{GameLog, LogEntry, LogEntryType},
    player::{Player, UserId},
    role::{Faction, Role},
};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Game {
    pub id: String, // チャットID。告知の送信先も兼ねる
    pub players: Vec<Player>,
    pub game_master: UserId,
    pub phase: GamePhase,
    pub round: u32,
    pub roles_configuration: Vec<Role>,
    pub nightly_targeted_player_id: Option<UserId>,
    pub werewolf_choices: Vec<WerewolfChoice>, // 投票順。再投票は末尾に移動
    pub seer_action_details: Option<SeerActionDetails>,
    pub day_votes: BTreeMap<UserId, UserId>, // 投票者 -> 対象
    pub lynched_player_id: Option<UserId>,
    pub winner: Option<Faction>,
    pub last_night_killed: Vec<Player>,
    pub message_id_to_edit: Option<i64>,
    pub log: GameLog,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GamePhase {
    Setup,          // 参加者募集中
    NightStart,     // 夜の開始
    WerewolfAction, // 人狼の襲撃先投票
    SeerAction,     // 占い
    WitchAction,    // 魔女（未実装のため常に通過）
    DayStart,       // 夜明け、死亡者の発表
    Discussion,     // 議論
    Voting,         // 処刑投票
    VoteResult,     // 投票結果
    LastWords,      // 遺言
    GameOver,       // 終了
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WerewolfChoice {
    pub werewolf_id: UserId,
    pub target_id: UserId,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeerActionDetails {
    pub round: u32,
    pub seer_id: UserId,
    pub target_id: UserId,
    pub target_role: Role,
}

/// 人狼投票の集計結果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NightTally {
    pub target_id: UserId,
    pub votes: usize,
    pub tie_broken: bool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEnd {
    pub game_over: bool,
    pub winner: Option<Faction>,
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GamePhase::Setup => "SETUP",
            GamePhase::NightStart => "NIGHT_START",
            GamePhase::WerewolfAction => "WEREWOLF_ACTION",
            GamePhase::SeerAction => "SEER_ACTION",
            GamePhase::WitchAction => "WITCH_ACTION",
            GamePhase::DayStart => "DAY_START",
            GamePhase::Discussion => "DISCUSSION",
            GamePhase::Voting => "VOTING",
            GamePhase::VoteResult => "VOTE_RESULT",
            GamePhase::LastWords => "LAST_WORDS",
            GamePhase::GameOver => "GAME_OVER",
        };
        write!(f, "{}", name)
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Game {{ id: {}, phase: {}, round: {}, players: {}, alive: {}, master: {}, winner: {:?} }}",
            self.id,
            self.phase,
            self.round,
            self.players.len(),
            self.alive_count(),
            self.game_master,
            self.winner
        )
    }
}

impl Game {
    pub fn new(id: String, master_id: UserId, master_username: Option<String>) -> Self {
        let mut master = Player::new(master_id, master_username);
        master.is_game_master = true;

        Game {
            id,
            players: vec![master],
            game_master: master_id,
            phase: GamePhase::Setup,
            round: 0,
            roles_configuration: vec![],
            nightly_targeted_player_id: None,
            werewolf_choices: vec![],
            seer_action_details: None,
            day_votes: BTreeMap::new(),
            lynched_player_id: None,
            winner: None,
            last_night_killed: vec![],
            message_id_to_edit: None,
            log: GameLog::new(),
        }
    }

    pub fn player(&self, player_id: UserId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_mut(&mut self, player_id: UserId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive())
    }

    pub fn alive_count(&self) -> usize {
        self.alive_players().count()
    }

    pub fn alive_with_role(&self, role: Role) -> usize {
        self.alive_players().filter(|p| p.has_role(role)).count()
    }

    pub fn has_alive_role(&self, role: Role) -> bool {
        self.alive_players().any(|p| p.has_role(role))
    }

    pub fn alive_werewolf_count(&self) -> usize {
        self.alive_players()
            .filter(|p| p.faction() == Some(Faction::Werewolf))
            .count()
    }

    /// 同じ人狼の再投票は上書き（最後の投票が有効）
    pub fn record_werewolf_choice(&mut self, werewolf_id: UserId, target_id: UserId) {
        self.werewolf_choices.retain(|c| c.werewolf_id != werewolf_id);
        self.werewolf_choices.push(WerewolfChoice {
            werewolf_id,
            target_id,
        });
    }

    pub fn werewolf_choice(&self, werewolf_id: UserId) -> Option<UserId> {
        self.werewolf_choices
            .iter()
            .find(|c| c.werewolf_id == werewolf_id)
            .map(|c| c.target_id)
    }

    /// 投票していない生存人狼の数
    pub fn werewolves_yet_to_vote(&self) -> usize {
        self.alive_players()
            .filter(|p| p.has_role(Role::Werewolf))
            .filter(|w| self.werewolf_choice(w.id).is_none())
            .count()
    }

    pub fn all_werewolves_voted(&self) -> bool {
        self.werewolves_yet_to_vote() == 0
    }

    /// 最多得票の対象を襲撃先とする。同数の場合は、最も新しい票を得た候補を選ぶ
    pub fn tally_werewolf_choices(&self) -> Option<NightTally> {
        // 対象 -> (得票数, 最後に票を得た位置)
        let mut tally: HashMap<UserId, (usize, usize)> = HashMap::new();
        for (position, choice) in self.werewolf_choices.iter().enumerate() {
            let entry = tally.entry(choice.target_id).or_insert((0, position));
            entry.0 += 1;
            entry.1 = position;
        }

        let top_votes = tally.values().map(|(votes, _)| *votes).max()?;
        let leaders = tally
            .values()
            .filter(|(votes, _)| *votes == top_votes)
            .count();

        tally
            .into_iter()
            .max_by_key(|(_, (votes, latest))| (*votes, *latest))
            .map(|(target_id, (votes, _))| NightTally {
                target_id,
                votes,
                tie_broken: leaders > 1,
            })
    }

    /// 夜の襲撃を確定させる。魔女の救助はまだないので対象は必ず死亡する
    pub fn resolve_night_kill(&mut self) -> Option<UserId> {
        let target_id = self.nightly_targeted_player_id?;
        let round = self.round;
        let victim = self.player_mut(target_id)?;
        if !victim.is_alive() {
            return None;
        }
        victim.kill();
        let victim = victim.clone();

        self.log.add_entry(LogEntry::new(
            round,
            format!("{} was killed during the night", victim.display_name()),
            LogEntryType::NightKill {
                player_id: target_id,
            },
        ));
        self.last_night_killed.push(victim);
        Some(target_id)
    }

    pub fn seer_has_acted(&self, seer_id: UserId) -> bool {
        self.seer_action_details
            .as_ref()
            .map_or(false, |d| d.round == self.round && d.seer_id == seer_id)
    }

    /// 今ラウンドの占い結果が記録済みか（誰が占ったかは問わない）
    pub fn seer_checked_this_round(&self) -> bool {
        self.seer_action_details
            .as_ref()
            .map_or(false, |d| d.round == self.round)
    }

    /// 占いフェーズを抜けられるか。占い結果は一件しか持たないので、
    /// 生存中の占い師の誰か一人が占えば完了とする（占い師がいなければtrue）
    pub fn seer_turn_complete(&self) -> bool {
        !self.has_alive_role(Role::Seer) || self.seer_checked_this_round()
    }

    pub fn record_day_vote(&mut self, voter_id: UserId, target_id: UserId) {
        self.day_votes.insert(voter_id, target_id);
        self.refresh_votes_received();
    }

    pub fn day_voters_remaining(&self) -> usize {
        self.alive_players()
            .filter(|p| !self.day_votes.contains_key(&p.id))
            .count()
    }

    pub fn all_day_votes_in(&self) -> bool {
        self.day_voters_remaining() == 0
    }

    fn refresh_votes_received(&mut self) {
        for player in self.players.iter_mut() {
            player.votes_received.clear();
        }
        let votes: Vec<(UserId, UserId)> = self.day_votes.iter().map(|(v, t)| (*v, *t)).collect();
        for (voter_id, target_id) in votes {
            if let Some(target) = self.player_mut(target_id) {
                target.votes_received.push(voter_id);
            }
        }
    }

    /// 単独最多得票者のみ処刑。同数なら処刑なし
    pub fn tally_day_votes(&self) -> Option<UserId> {
        let mut counts: BTreeMap<UserId, usize> = BTreeMap::new();
        for target_id in self.day_votes.values() {
            *counts.entry(*target_id).or_insert(0) += 1;
        }

        let top_votes = counts.values().copied().max()?;
        let mut leaders = counts.iter().filter(|(_, votes)| **votes == top_votes);
        match (leaders.next(), leaders.next()) {
            (Some((target_id, _)), None) => Some(*target_id),
            _ => None,
        }
    }

    pub fn resolve_lynch(&mut self) -> Option<UserId> {
        self.lynched_player_id = self.tally_day_votes();
        let lynched_id = self.lynched_player_id?;
        let round = self.round;
        let player = self.player_mut(lynched_id)?;
        player.kill();
        let name = player.display_name();

        self.log.add_entry(LogEntry::new(
            round,
            format!("{} was lynched by the village", name),
            LogEntryType::Lynch {
                player_id: lynched_id,
            },
        ));
        Some(lynched_id)
    }

    pub fn reset_night_state(&mut self) {
        self.werewolf_choices.clear();
        self.nightly_targeted_player_id = None;
        self.last_night_killed.clear();
    }

    pub fn reset_day_votes(&mut self) {
        self.day_votes.clear();
        self.lynched_player_id = None;
        for player in self.players.iter_mut() {
            player.votes_received.clear();
        }
    }

    /// 人狼が全滅すれば村人陣営、人狼の生存数が村人陣営以上なら人狼陣営の勝利
    pub fn check_game_end(&self) -> GameEnd {
        // 役職未配布のプレイヤーは村人陣営に数える
        let werewolves = self.alive_werewolf_count();
        let villagers = self
            .alive_players()
            .filter(|p| p.faction() != Some(Faction::Werewolf))
            .count();

        let winner = if werewolves == 0 {
            Some(Faction::Villager)
        } else if werewolves >= villagers {
            Some(Faction::Werewolf)
        } else {
            None
        };

        GameEnd {
            game_over: winner.is_some(),
            winner,
        }
    }
}
