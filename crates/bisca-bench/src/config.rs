//! YAML run configuration for the match harness.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use bisca_bot::PolicyKind;
use bisca_core::game::engine::{MAX_PLAYERS, MIN_PLAYERS};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;

const DEFAULT_HANDS_PER_MATCH: u32 = 5;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub deals: DealConfig,
    /// One agent per seat; the seating rotates from match to match.
    pub agents: Vec<AgentConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let cfg: Self = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        cfg.validate()
            .map_err(|source| ConfigError::Invalid { path, source })?;
        Ok(cfg)
    }

    /// Checks everything a run needs before any match is dealt.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_identifier(&self.run_id) {
            return Err(ValidationError::RunId(self.run_id.clone()));
        }
        if self.deals.matches == 0 {
            return Err(ValidationError::NoMatches);
        }
        if self.deals.hands_per_match == 0 {
            return Err(ValidationError::NoHands);
        }

        let found = self.agents.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&found) {
            return Err(ValidationError::SeatCount { found });
        }
        let mut names = HashSet::new();
        for agent in &self.agents {
            if !is_identifier(&agent.name) {
                return Err(ValidationError::AgentName(agent.name.clone()));
            }
            if !names.insert(agent.name.as_str()) {
                return Err(ValidationError::DuplicateAgent(agent.name.clone()));
            }
        }

        for (field, template) in [
            ("outputs.jsonl", &self.outputs.jsonl),
            ("outputs.summary_md", &self.outputs.summary_md),
        ] {
            if template.trim().is_empty() {
                return Err(ValidationError::EmptyOutput(field));
            }
        }
        let outputs = self.resolved_outputs();
        if outputs.jsonl == outputs.summary_md {
            return Err(ValidationError::OutputsCollide);
        }

        if self.logging.level().is_none() {
            return Err(ValidationError::UnknownLevel(
                self.logging.tracing_level.clone(),
            ));
        }
        Ok(())
    }

    /// Output paths with every `{run_id}` substituted.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        let resolve = |template: &str| PathBuf::from(template.replace("{run_id}", &self.run_id));
        ResolvedOutputs {
            jsonl: resolve(&self.outputs.jsonl),
            summary_md: resolve(&self.outputs.summary_md),
        }
    }
}

/// Letters, digits, `.`, `_` and `-`; safe inside a path segment.
fn is_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DealConfig {
    /// Master seed; every match draws its own seed from it.
    pub seed: Option<u64>,
    pub matches: usize,
    #[serde(default = "default_hands_per_match")]
    pub hands_per_match: u32,
}

fn default_hands_per_match() -> u32 {
    DEFAULT_HANDS_PER_MATCH
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Random,
    Greedy,
}

impl AgentKind {
    pub fn policy(self) -> PolicyKind {
        match self {
            AgentKind::Random => PolicyKind::Random,
            AgentKind::Greedy => PolicyKind::Greedy,
        }
    }
}

/// Path templates; `{run_id}` is substituted.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

/// Structured trace of bot decisions and hand results. Off unless asked for.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    pub fn level(&self) -> Option<Level> {
        self.tracing_level.trim().parse().ok()
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("run_id {0:?} must be non-empty and use only letters, digits, '.', '_' or '-'")]
    RunId(String),
    #[error("deals.matches must be at least 1")]
    NoMatches,
    #[error("deals.hands_per_match must be at least 1")]
    NoHands,
    #[error("a table seats 2 to 4 agents, found {found}")]
    SeatCount { found: usize },
    #[error("agent name {0:?} must be non-empty and use only letters, digits, '.', '_' or '-'")]
    AgentName(String),
    #[error("agent name {0:?} is defined more than once")]
    DuplicateAgent(String),
    #[error("{0} must not be empty")]
    EmptyOutput(&'static str),
    #[error("outputs.jsonl and outputs.summary_md resolve to the same file")]
    OutputsCollide,
    #[error("unknown tracing level {0:?}")]
    UnknownLevel(String),
}
