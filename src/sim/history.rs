//! Trial history persistence.
//!
//! A run's trial records are written as one self-describing JSON document:
//! run identifier, game, seed, the run configuration, and every trial with
//! its rounds (stakes, bet types, hand values or pocket, winner, running
//! balance). Reading a document back yields field-for-field identical
//! records.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::config::SimConfig;
use crate::sim::trial::TrialRecord;

/// Errors reading or writing a history document.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The sink or source could not be opened, written or read.
    #[error("history i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// The document could not be encoded or decoded.
    #[error("history json failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// The persisted history of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryDocument<B, O> {
    /// Player / run identifier.
    pub run_id: String,
    /// Game the run simulated.
    pub game: String,
    /// Seed the run used.
    pub seed: u64,
    /// Creation time, seconds since the Unix epoch.
    pub created_at_unix: u64,
    /// Run configuration.
    pub config: SimConfig,
    /// Every completed trial in trial order.
    pub trials: Vec<TrialRecord<B, O>>,
}

impl<B, O> HistoryDocument<B, O>
where
    B: Serialize + DeserializeOwned,
    O: Serialize + DeserializeOwned,
{
    /// Wrap a run's trial records, stamped with the current time.
    pub fn new(
        game: impl Into<String>,
        seed: u64,
        config: SimConfig,
        trials: Vec<TrialRecord<B, O>>,
    ) -> Self {
        let created_at_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            run_id: config.player_name.clone(),
            game: game.into(),
            seed,
            created_at_unix,
            config,
            trials,
        }
    }

    /// Total rounds across all trials in the document.
    pub fn num_rounds(&self) -> usize {
        self.trials.iter().map(|t| t.rounds.len()).sum()
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, HistoryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, HistoryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save to JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), HistoryError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Load from JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, HistoryError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
