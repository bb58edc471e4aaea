//! Finish event and the report boundary
//!
//! When a level ends the engine emits exactly one [`FinishEvent`] to the
//! registered [`FinishReporter`]. What happens next (posting the result to a
//! match server, showing an overlay) belongs to the host. Reporter failures
//! are logged by the engine and never reach the simulation.

use std::io::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::HIT_ESTIMATE_RATIO;

/// Why a level ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    /// Bunker destroyed in a hunt level
    Bunker,
    /// Every enemy destroyed
    Clear,
    /// Level clock ran out
    Timeout,
    /// Player ran out of lives
    Death,
}

/// Per-run counters, finalized once at match end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    pub shots: u32,
    pub hits: u32,
    pub elapsed_ms: u64,
}

impl MatchStats {
    /// Freeze the counters; with no counted hits a share of shots is reported
    pub fn finalize(shots: u32, counted_hits: u32, elapsed_sec: f32) -> Self {
        let hits = if counted_hits > 0 {
            counted_hits
        } else {
            (f64::from(shots) * HIT_ESTIMATE_RATIO).floor() as u32
        };
        Self {
            shots,
            hits,
            elapsed_ms: (f64::from(elapsed_sec.max(0.0)) * 1000.0).floor() as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishEvent {
    pub victory: bool,
    pub reason: FinishReason,
    pub stats: MatchStats,
}

impl FinishEvent {
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    /// The receiving side refused the result
    #[error("finish report rejected: {0}")]
    Rejected(String),
    #[error("finish report transport failed: {0}")]
    Transport(#[from] std::io::Error),
    #[error("failed to serialize finish report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Receiver of finish events
pub trait FinishReporter {
    fn report(&mut self, event: &FinishEvent) -> Result<(), ReportError>;
}

impl<F> FinishReporter for F
where
    F: FnMut(&FinishEvent) -> Result<(), ReportError>,
{
    fn report(&mut self, event: &FinishEvent) -> Result<(), ReportError> {
        self(event)
    }
}

/// Writes each event as one JSON line
pub struct JsonLineReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonLineReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FinishReporter for JsonLineReporter<W> {
    fn report(&mut self, event: &FinishEvent) -> Result<(), ReportError> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}
