mod rotation;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use bisca_bot::{Policy, PolicyContext};
use bisca_core::game::chips::{ChipBonus, chips_by_player};
use bisca_core::game::engine::{MAX_PLAYERS, MIN_PLAYERS};
use bisca_core::game::match_state::{HandSummary, MatchState};
use bisca_core::{GameState, PlayerId, Rejection};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{AgentConfig, AgentKind, BenchmarkConfig, ResolvedOutputs};

use rotation::SeatRotation;

/// Primary entry point for orchestrating benchmark runs.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    rotation: SeatRotation,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub matches_played: usize,
    pub hands_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub standings: Vec<AgentStanding>,
}

impl TournamentRunner {
    /// Construct a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let found = config.agents.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&found) {
            return Err(RunnerError::SeatCount { found });
        }

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            rotation: SeatRotation::new(found),
            config,
            outputs,
        })
    }

    /// Play every configured match, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.deals.seed.unwrap_or(0));
        let mut standings = Standings::new(&self.config.agents);
        let mut rows_written = 0usize;
        let mut hands_played = 0usize;

        for match_index in 0..self.config.deals.matches {
            let match_seed = rng.next_u64();
            let seating = self.rotation.for_match(match_index);
            let outcome = self.play_match(match_index, match_seed, &seating)?;

            for hand in &outcome.hands {
                rows_written += write_hand_rows(&mut writer, &self.config, &outcome, hand)?;
            }
            hands_played += outcome.hands.len();
            standings.record_match(&outcome);
        }

        writer.flush()?;
        standings.write_markdown(&self.outputs.summary_md, &self.config)?;

        Ok(RunSummary {
            matches_played: self.config.deals.matches,
            hands_played,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            standings: standings.into_rows(),
        })
    }

    fn play_match(
        &self,
        match_index: usize,
        match_seed: u64,
        seating: &[usize],
    ) -> Result<MatchOutcome, RunnerError> {
        let mut table = GameState::new();
        let mut seats = Vec::with_capacity(seating.len());
        for (seat, &agent_index) in seating.iter().enumerate() {
            let agent =
                self.config
                    .agents
                    .get(agent_index)
                    .ok_or(RunnerError::InvalidSeating {
                        seat,
                        agent_index,
                    })?;
            let id = PlayerId::new(agent.name.as_str());
            table = table
                .with_player(id.clone(), agent.name.clone())
                .map_err(rejected("seating agents"))?;
            seats.push(SeatState::new(id, agent, match_seed.wrapping_add(seat as u64 + 1)));
        }

        let mut state =
            MatchState::with_seed(table, self.config.deals.hands_per_match, match_seed);
        let mut hands = Vec::new();
        while !state.is_over() {
            state
                .start_next_hand()
                .map_err(rejected("dealing a hand"))?;
            self.play_hand(match_index, &mut state, &mut seats)?;
            let summary = state
                .finish_hand()
                .map_err(rejected("settling a hand"))?
                .clone();
            let decisions = seats
                .iter_mut()
                .map(|seat| std::mem::take(&mut seat.metrics).finalize())
                .collect();

            if self.logging_enabled && tracing::enabled!(Level::INFO) {
                event!(
                    target: "bisca_bench::hand",
                    Level::INFO,
                    run_id = %self.config.run_id,
                    match_index = match_index as u32,
                    hand_number = summary.hand_number,
                    chips_awarded = summary.awards.len() as u32,
                );
            }

            hands.push(HandRecord { summary, decisions });
        }

        Ok(MatchOutcome {
            match_index,
            match_seed,
            seats: seats
                .into_iter()
                .map(|seat| SeatSnapshot {
                    agent: seat.agent_name,
                    kind: seat.kind,
                    player_id: seat.player_id,
                })
                .collect(),
            final_chips: state
                .game()
                .players()
                .iter()
                .map(|p| (p.id.clone(), p.chips))
                .collect(),
            winners: state.winners(),
            hands,
        })
    }

    fn play_hand(
        &self,
        match_index: usize,
        state: &mut MatchState,
        seats: &mut [SeatState],
    ) -> Result<(), RunnerError> {
        loop {
            let game = state.game();
            if game.is_hand_complete() {
                return Ok(());
            }
            if game.is_trick_full() {
                state
                    .apply(GameState::resolve_trick)
                    .map_err(rejected("resolving a trick"))?;
                continue;
            }

            let (player_id, card) = {
                let ctx = PolicyContext::for_current(game).ok_or(RunnerError::Stalled {
                    match_index,
                    hand_number: state.current_hand_number(),
                })?;
                let seat = seats
                    .get_mut(ctx.seat)
                    .ok_or(RunnerError::InvalidSeating {
                        seat: ctx.seat,
                        agent_index: ctx.seat,
                    })?;
                let start = Instant::now();
                let card =
                    seat.policy
                        .choose_play(&ctx)
                        .ok_or_else(|| RunnerError::NoLegalCard {
                            agent: seat.agent_name.clone(),
                        })?;
                let elapsed_ms = seat.metrics.record(start.elapsed());

                if self.logging_enabled && tracing::enabled!(Level::INFO) {
                    event!(
                        target: "bisca_bench::play",
                        Level::INFO,
                        run_id = %self.config.run_id,
                        match_index = match_index as u32,
                        hand_number = state.current_hand_number(),
                        seat = ctx.seat as u32,
                        agent = %seat.agent_name,
                        card = %card,
                        elapsed_ms
                    );
                }

                (ctx.player_id.clone(), card)
            };

            state
                .apply(|game| game.play_card(&player_id, card))
                .map_err(rejected("playing a card"))?;
        }
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_hand_rows(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    outcome: &MatchOutcome,
    hand: &HandRecord,
) -> Result<usize, RunnerError> {
    let deal_id = format!(
        "M{:05}_H{:02}",
        outcome.match_index, hand.summary.hand_number
    );
    let seating: Vec<String> = outcome.seats.iter().map(|s| s.agent.clone()).collect();
    let chips = chips_by_player(&hand.summary.awards);

    let mut rows_written = 0usize;
    for (seat, snapshot) in outcome.seats.iter().enumerate() {
        let points = hand
            .summary
            .scores
            .iter()
            .find(|(id, _)| *id == snapshot.player_id)
            .map(|(_, points)| *points)
            .unwrap_or(0);
        let bonuses = hand
            .summary
            .awards
            .iter()
            .filter(|award| award.player_id == snapshot.player_id)
            .map(|award| award.bonus)
            .collect();
        let decisions = hand.decisions.get(seat).cloned().unwrap_or_default();
        let row = HandLogRow {
            run_id: config.run_id.clone(),
            deal_id: deal_id.clone(),
            match_index: outcome.match_index,
            hand_number: hand.summary.hand_number,
            match_seed: outcome.match_seed,
            seat,
            agent: snapshot.agent.clone(),
            kind: snapshot.kind,
            seating: seating.clone(),
            points,
            chips_earned: chips.get(&snapshot.player_id).copied().unwrap_or(0),
            bonuses,
            speed_ms_turn: decisions.avg_ms_per_decision,
            decisions: decisions.decisions,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }

    Ok(rows_written)
}

struct SeatState {
    player_id: PlayerId,
    agent_name: String,
    kind: AgentKind,
    policy: Box<dyn Policy>,
    metrics: DecisionMetrics,
}

impl SeatState {
    fn new(player_id: PlayerId, agent: &AgentConfig, seed: u64) -> Self {
        Self {
            player_id,
            agent_name: agent.name.clone(),
            kind: agent.kind,
            policy: agent.kind.policy().build(seed),
            metrics: DecisionMetrics::default(),
        }
    }
}

pub struct MatchOutcome {
    pub match_index: usize,
    pub match_seed: u64,
    pub seats: Vec<SeatSnapshot>,
    pub final_chips: Vec<(PlayerId, u32)>,
    pub winners: Vec<PlayerId>,
    pub hands: Vec<HandRecord>,
}

pub struct SeatSnapshot {
    pub agent: String,
    pub kind: AgentKind,
    pub player_id: PlayerId,
}

pub struct HandRecord {
    pub summary: HandSummary,
    /// Indexed by seat.
    pub decisions: Vec<DecisionSummary>,
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) -> f64 {
        self.total += duration;
        self.decisions += 1;
        duration.as_secs_f64() * 1000.0
    }

    fn finalize(self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };
        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Serialize)]
struct HandLogRow {
    run_id: String,
    deal_id: String,
    match_index: usize,
    hand_number: u32,
    match_seed: u64,
    seat: usize,
    agent: String,
    kind: AgentKind,
    seating: Vec<String>,
    points: u32,
    chips_earned: u32,
    bonuses: Vec<ChipBonus>,
    speed_ms_turn: f64,
    decisions: u32,
}

/// Per-agent totals across the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentStanding {
    pub name: String,
    pub kind: AgentKind,
    pub matches: u32,
    pub hands: u32,
    pub points: u64,
    pub chips: u64,
    pub match_wins: u32,
    pub decisions: u64,
    pub total_ms: f64,
}

impl AgentStanding {
    pub fn avg_points(&self) -> f64 {
        ratio(self.points as f64, self.hands)
    }

    pub fn chips_per_hand(&self) -> f64 {
        ratio(self.chips as f64, self.hands)
    }

    pub fn win_rate(&self) -> f64 {
        ratio(f64::from(self.match_wins), self.matches)
    }
}

fn ratio(value: f64, count: u32) -> f64 {
    if count == 0 {
        0.0
    } else {
        value / f64::from(count)
    }
}

struct Standings {
    rows: Vec<AgentStanding>,
}

impl Standings {
    fn new(agents: &[AgentConfig]) -> Self {
        let rows = agents
            .iter()
            .map(|agent| AgentStanding {
                name: agent.name.clone(),
                kind: agent.kind,
                matches: 0,
                hands: 0,
                points: 0,
                chips: 0,
                match_wins: 0,
                decisions: 0,
                total_ms: 0.0,
            })
            .collect();
        Self { rows }
    }

    fn row_mut(&mut self, name: &str) -> Option<&mut AgentStanding> {
        self.rows.iter_mut().find(|row| row.name == name)
    }

    fn record_match(&mut self, outcome: &MatchOutcome) {
        for (seat, snapshot) in outcome.seats.iter().enumerate() {
            let Some(row) = self.row_mut(&snapshot.agent) else {
                continue;
            };
            row.matches += 1;
            if outcome.winners.contains(&snapshot.player_id) {
                row.match_wins += 1;
            }
            if let Some((_, chips)) = outcome
                .final_chips
                .iter()
                .find(|(id, _)| *id == snapshot.player_id)
            {
                row.chips += u64::from(*chips);
            }
            for hand in &outcome.hands {
                row.hands += 1;
                if let Some((_, points)) = hand
                    .summary
                    .scores
                    .iter()
                    .find(|(id, _)| *id == snapshot.player_id)
                {
                    row.points += u64::from(*points);
                }
                if let Some(decisions) = hand.decisions.get(seat) {
                    row.decisions += u64::from(decisions.decisions);
                    row.total_ms += decisions.total_ms;
                }
            }
        }
    }

    fn write_markdown(&self, path: &Path, config: &BenchmarkConfig) -> Result<(), RunnerError> {
        let mut out = String::new();
        out.push_str("# Bisca Benchmark Summary\n\n");
        out.push_str(&format!(
            "Run `{}`: {} matches of {} hands, seed {}\n\n",
            config.run_id,
            config.deals.matches,
            config.deals.hands_per_match,
            config.deals.seed.unwrap_or(0)
        ));
        out.push_str("| Agent | Kind | Matches | Hands | Avg points | Chips | Chips/hand | Match wins | Win % | Avg ms/decision |\n");
        out.push_str("|-------|------|---------|-------|------------|-------|------------|------------|-------|-----------------|\n");

        for row in &self.rows {
            let avg_ms = if row.decisions == 0 {
                0.0
            } else {
                row.total_ms / row.decisions as f64
            };
            out.push_str(&format!(
                "| {name} | {kind:?} | {matches} | {hands} | {avg:.2} | {chips} | {cph:.3} | {wins} | {win:.1}% | {latency:.3} |\n",
                name = row.name,
                kind = row.kind,
                matches = row.matches,
                hands = row.hands,
                avg = row.avg_points(),
                chips = row.chips,
                cph = row.chips_per_hand(),
                wins = row.match_wins,
                win = row.win_rate() * 100.0,
                latency = avg_ms,
            ));
        }

        fs::write(path, out)?;
        Ok(())
    }

    fn into_rows(self) -> Vec<AgentStanding> {
        self.rows
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("engine rejected {context}: {source}")]
    Game {
        context: &'static str,
        #[source]
        source: Rejection,
    },
    #[error("a table seats 2 to 4 agents but found {found}")]
    SeatCount { found: usize },
    #[error("seat {seat} references invalid agent index {agent_index}")]
    InvalidSeating { seat: usize, agent_index: usize },
    #[error("match {match_index} hand {hand_number} has no player to act")]
    Stalled { match_index: usize, hand_number: u32 },
    #[error("agent '{agent}' produced no card")]
    NoLegalCard { agent: String },
}

fn rejected(context: &'static str) -> impl Fn(Rejection) -> RunnerError {
    move |source| RunnerError::Game { context, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DealConfig, LoggingConfig, OutputsConfig};
    use tempfile::tempdir;

    fn config(dir: &Path, kinds: &[AgentKind], matches: usize) -> BenchmarkConfig {
        let cfg = BenchmarkConfig {
            run_id: "unit".to_string(),
            deals: DealConfig {
                seed: Some(9),
                matches,
                hands_per_match: 2,
            },
            agents: kinds
                .iter()
                .enumerate()
                .map(|(i, kind)| AgentConfig {
                    name: format!("agent{i}"),
                    kind: *kind,
                })
                .collect(),
            outputs: OutputsConfig {
                jsonl: dir.join("hands.jsonl").display().to_string(),
                summary_md: dir.join("summary.md").display().to_string(),
            },
            logging: LoggingConfig::default(),
        };
        cfg.validate().expect("valid config");
        cfg
    }

    #[test]
    fn writes_one_row_per_seat_per_hand() {
        let dir = tempdir().unwrap();
        let cfg = config(
            dir.path(),
            &[AgentKind::Greedy, AgentKind::Random, AgentKind::Random],
            2,
        );
        let outputs = cfg.resolved_outputs();
        let summary = TournamentRunner::new(cfg, outputs).unwrap().run().unwrap();

        assert_eq!(summary.matches_played, 2);
        assert_eq!(summary.hands_played, 4);
        assert_eq!(summary.rows_written, 12);

        let jsonl = fs::read_to_string(&summary.jsonl_path).unwrap();
        assert_eq!(jsonl.lines().count(), 12);
        for line in jsonl.lines() {
            let row: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(row["points"].as_u64().unwrap() <= 120);
            let bonuses = row["bonuses"].as_array().unwrap().len() as u64;
            assert_eq!(row["chips_earned"].as_u64().unwrap(), bonuses);
        }
    }

    #[test]
    fn standings_count_matches_and_wins() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path(), &[AgentKind::Greedy, AgentKind::Greedy], 3);
        let outputs = cfg.resolved_outputs();
        let summary = TournamentRunner::new(cfg, outputs).unwrap().run().unwrap();

        for row in &summary.standings {
            assert_eq!(row.matches, 3);
            assert_eq!(row.hands, 6);
        }
        let wins: u32 = summary.standings.iter().map(|r| r.match_wins).sum();
        assert!(wins >= 3, "every match has at least one winner");

        let markdown = fs::read_to_string(&summary.summary_path).unwrap();
        assert!(markdown.contains("| agent0 | Greedy |"));
        assert!(markdown.contains("| agent1 | Greedy |"));
    }

    #[test]
    fn rejects_too_many_agents() {
        let dir = tempdir().unwrap();
        let mut cfg = config(dir.path(), &[AgentKind::Random; 4], 1);
        cfg.agents.push(AgentConfig {
            name: "extra".to_string(),
            kind: AgentKind::Random,
        });
        let outputs = cfg.resolved_outputs();
        assert!(matches!(
            TournamentRunner::new(cfg, outputs),
            Err(RunnerError::SeatCount { found: 5 })
        ));
    }
}
