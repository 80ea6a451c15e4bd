//! Progress event payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    OptimizationStarted,
    LineupGenerated,
    OptimizationComplete,
    SimulationStarted,
    SimulationProgress,
    SimulationComplete,
}

impl ProgressKind {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::OptimizationComplete | Self::SimulationComplete)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub kind: ProgressKind,
    /// Completion fraction in 0..=1.
    pub progress: f64,
    pub message: String,
    pub step: u32,
    pub total_steps: u32,
    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(kind: ProgressKind, step: u32, total_steps: u32, message: impl Into<String>) -> Self {
        let progress = if total_steps == 0 {
            0.0
        } else {
            (step as f64 / total_steps as f64).clamp(0.0, 1.0)
        };
        Self {
            kind,
            progress,
            message: message.into(),
            step,
            total_steps,
            timestamp: Utc::now(),
        }
    }

    /// Terminal event at 100 %.
    pub fn finished(kind: ProgressKind, total_steps: u32, message: impl Into<String>) -> Self {
        let mut event = Self::new(kind, total_steps, total_steps, message);
        event.progress = 1.0;
        event
    }
}
