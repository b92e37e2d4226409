//! Run artifact writer: derived JSON views for inspection tooling.
//!
//! Two files per run directory, both canonical bytes (identical runs write
//! identical files):
//!
//! - `search_graph.json` — the expansion trace (search-backed runs)
//! - `summary.json` — definition digest + outcome rendering

use std::path::{Path, PathBuf};

use parlor_kernel::canon::{canonical_json_bytes, CanonError};
use parlor_kernel::fingerprint::{canonical_hash, HashDomain};

use parlor_search::graph::SearchGraphV1;

use crate::runner::{PuzzleDefinitionV1, SolveReportV1};
use crate::worlds::wumpus_agent::{AgentStepV1, EpisodeOutcomeV1};

/// File name of the expansion-trace artifact.
pub const SEARCH_GRAPH_FILE: &str = "search_graph.json";

/// File name of the run summary artifact.
pub const SUMMARY_FILE: &str = "summary.json";

/// Error writing run artifacts.
#[derive(Debug)]
pub enum ArtifactError {
    /// Filesystem failure.
    Io { detail: String },
    /// Canonical JSON serialization failure.
    Canon(CanonError),
    /// Definition encoding failure.
    Encode { detail: String },
}

impl std::fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "artifact io error: {detail}"),
            Self::Canon(e) => write!(f, "artifact serialization error: {e}"),
            Self::Encode { detail } => write!(f, "definition encoding error: {detail}"),
        }
    }
}

impl std::error::Error for ArtifactError {}

impl From<std::io::Error> for ArtifactError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            detail: e.to_string(),
        }
    }
}

impl From<CanonError> for ArtifactError {
    fn from(e: CanonError) -> Self {
        Self::Canon(e)
    }
}

/// Write `search_graph.json` into `dir` (created if absent).
///
/// # Errors
///
/// Returns [`ArtifactError`] on filesystem or serialization failure.
pub fn write_search_graph(dir: &Path, graph: &SearchGraphV1) -> Result<PathBuf, ArtifactError> {
    std::fs::create_dir_all(dir)?;
    let bytes = graph.to_canonical_json_bytes()?;
    let path = dir.join(SEARCH_GRAPH_FILE);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Write `summary.json` into `dir` (created if absent).
///
/// The summary binds the outcome to a canonical digest of the definition,
/// so a summary can be matched to the exact puzzle that produced it.
///
/// # Errors
///
/// Returns [`ArtifactError`] on filesystem or serialization failure.
pub fn write_summary(
    dir: &Path,
    definition: &PuzzleDefinitionV1,
    report: &SolveReportV1,
) -> Result<PathBuf, ArtifactError> {
    std::fs::create_dir_all(dir)?;
    let bytes = summary_bytes(definition, report)?;
    let path = dir.join(SUMMARY_FILE);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Canonical bytes of the run summary.
///
/// # Errors
///
/// Returns [`ArtifactError`] on serialization failure.
pub fn summary_bytes(
    definition: &PuzzleDefinitionV1,
    report: &SolveReportV1,
) -> Result<Vec<u8>, ArtifactError> {
    let definition_value =
        serde_json::to_value(definition).map_err(|e| ArtifactError::Encode {
            detail: e.to_string(),
        })?;
    let definition_bytes = canonical_json_bytes(&definition_value)?;
    let digest = canonical_hash(HashDomain::PuzzleDefinition, &definition_bytes);

    let summary = serde_json::json!({
        "definition": definition_value,
        "definition_digest": digest.as_str(),
        "report": report_to_json(report),
    });
    Ok(canonical_json_bytes(&summary)?)
}

fn report_to_json(report: &SolveReportV1) -> serde_json::Value {
    match report {
        SolveReportV1::MazeSolved { path, cost } => serde_json::json!({
            "cost": cost,
            "path": path
                .iter()
                .map(|p| serde_json::json!({"col": p.col, "row": p.row}))
                .collect::<Vec<_>>(),
            "type": "maze_solved",
        }),
        SolveReportV1::PotsSolved {
            operations,
            states,
            cost,
        } => serde_json::json!({
            "cost": cost,
            "operations": operations.iter().map(|o| o.label()).collect::<Vec<_>>(),
            "states": states
                .iter()
                .map(|s| serde_json::json!({"left": s.left, "right": s.right}))
                .collect::<Vec<_>>(),
            "type": "pots_solved",
        }),
        SolveReportV1::WumpusFinished {
            outcome,
            transcript,
        } => serde_json::json!({
            "outcome": outcome_to_json(outcome),
            "transcript": transcript.iter().map(agent_step_to_json).collect::<Vec<_>>(),
            "type": "wumpus_finished",
        }),
        SolveReportV1::NotFound { reason } => serde_json::json!({
            "reason": reason.label(),
            "type": "not_found",
        }),
    }
}

fn outcome_to_json(outcome: &EpisodeOutcomeV1) -> serde_json::Value {
    match outcome {
        EpisodeOutcomeV1::ClimbedOut { has_gold } => {
            serde_json::json!({"has_gold": has_gold, "type": "climbed_out"})
        }
        EpisodeOutcomeV1::Dead { hazard, cell } => serde_json::json!({
            "cell": {"col": cell.col, "row": cell.row},
            "hazard": hazard.label(),
            "type": "dead",
        }),
    }
}

fn agent_step_to_json(step: &AgentStepV1) -> serde_json::Value {
    serde_json::json!({
        "action": step.action.label(),
        "calculated_risk": step.calculated_risk,
        "percept": {
            "breeze": step.percept.breeze,
            "bump": step.percept.bump,
            "glitter": step.percept.glitter,
            "scream": step.percept.scream,
            "stench": step.percept.stench,
        },
        "phase": step.phase.label(),
        "position": {"col": step.position.col, "row": step.position.row},
    })
}
