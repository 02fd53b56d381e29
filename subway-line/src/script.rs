//! Replayable scripts of line operations.
//!
//! A script is a JSON document listing operations against named lines.
//! It is the binary's input format and a convenient way to describe
//! end-to-end scenarios in tests.
//!
//! ```json
//! {
//!   "steps": [
//!     { "op": "create_line", "line": "2", "color": "green",
//!       "up": "A", "down": "B", "length": 10 },
//!     { "op": "add_section", "line": "2", "up": "B", "down": "C", "length": 5 },
//!     { "op": "remove_station", "line": "2", "station": "C" },
//!     { "op": "show_stations", "line": "2" }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path as FsPath;

use serde::Deserialize;
use tracing::info;

use crate::domain::{LineId, Placement, Station};
use crate::line::{LineRegistry, RegistryError};

/// Errors that stop a script from loading or running.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Reading the script file failed
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),

    /// The script is not valid JSON or has invalid values
    #[error("invalid script: {0}")]
    Json(#[from] serde_json::Error),

    /// A step names a line that was never created
    #[error("step {step}: unknown line {line:?}")]
    UnknownLine { step: usize, line: String },

    /// A step creates a line whose name is already taken
    #[error("step {step}: line {line:?} already created")]
    DuplicateLine { step: usize, line: String },
}

/// One operation in a script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    CreateLine {
        line: String,
        color: String,
        up: Station,
        down: Station,
        length: i64,
    },
    AddSection {
        line: String,
        up: Station,
        down: Station,
        length: i64,
    },
    RemoveStation {
        line: String,
        station: Station,
    },
    ShowStations {
        line: String,
    },
}

impl Step {
    fn line(&self) -> &str {
        match self {
            Step::CreateLine { line, .. }
            | Step::AddSection { line, .. }
            | Step::RemoveStation { line, .. }
            | Step::ShowStations { line } => line,
        }
    }
}

/// What a step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(LineId),
    Added(Placement),
    Removed,
    Stations(Vec<Station>),
}

/// The result of one step.
///
/// Rejected operations are recorded rather than aborting the script, so a
/// script can demonstrate failures as well as successes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: usize,
    pub line: String,
    pub result: Result<Outcome, RegistryError>,
}

/// A parsed script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse a script from JSON text.
    pub fn parse(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a script file.
    pub fn load(path: impl AsRef<FsPath>) -> Result<Self, ScriptError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Run every step against `registry`.
    ///
    /// Returns one report per step, plus the ids of the lines the script
    /// created, keyed by name.
    pub async fn run(
        &self,
        registry: &LineRegistry,
    ) -> Result<(Vec<StepReport>, HashMap<String, LineId>), ScriptError> {
        let mut lines: HashMap<String, LineId> = HashMap::new();
        let mut reports = Vec::with_capacity(self.steps.len());

        for (index, step) in self.steps.iter().enumerate() {
            let step_no = index + 1;
            let result = match step {
                Step::CreateLine {
                    line,
                    color,
                    up,
                    down,
                    length,
                } => {
                    if lines.contains_key(line) {
                        return Err(ScriptError::DuplicateLine {
                            step: step_no,
                            line: line.clone(),
                        });
                    }
                    let created = registry
                        .create(line, color, up.clone(), down.clone(), *length)
                        .await;
                    if let Ok(id) = &created {
                        lines.insert(line.clone(), *id);
                    }
                    created.map(Outcome::Created)
                }
                Step::AddSection {
                    up, down, length, ..
                } => {
                    let id = lookup(&lines, step_no, step.line())?;
                    registry
                        .add_section(id, up.clone(), down.clone(), *length)
                        .await
                        .map(Outcome::Added)
                }
                Step::RemoveStation { station, .. } => {
                    let id = lookup(&lines, step_no, step.line())?;
                    registry
                        .remove_station(id, station)
                        .await
                        .map(|()| Outcome::Removed)
                }
                Step::ShowStations { .. } => {
                    let id = lookup(&lines, step_no, step.line())?;
                    registry.stations(id).await.map(Outcome::Stations)
                }
            };

            info!(step = step_no, line = step.line(), ok = result.is_ok(), "Ran step");
            reports.push(StepReport {
                step: step_no,
                line: step.line().to_string(),
                result,
            });
        }

        Ok((reports, lines))
    }
}

fn lookup(lines: &HashMap<String, LineId>, step: usize, line: &str) -> Result<LineId, ScriptError> {
    lines
        .get(line)
        .copied()
        .ok_or_else(|| ScriptError::UnknownLine {
            step,
            line: line.to_string(),
        })
}
