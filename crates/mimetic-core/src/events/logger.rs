//! Step Logger
//!
//! Append-only JSONL log of every decision in a run, one line per step.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use mimetic_events::{CascadeReport, CascadeStep, ContagionReport, ContagionStep};

/// One line of the step log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LoggedStep {
    Cascade { event_id: String, step: CascadeStep },
    Contagion { event_id: String, step: ContagionStep },
}

impl LoggedStep {
    pub fn event_id(&self) -> &str {
        match self {
            LoggedStep::Cascade { event_id, .. } | LoggedStep::Contagion { event_id, .. } => {
                event_id
            }
        }
    }
}

/// Writes run steps to a JSONL file
pub struct StepLogger {
    writer: Option<BufWriter<File>>,
    step_count: u64,
    next_event_id: u64,
}

impl StepLogger {
    /// Create a new logger writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            step_count: 0,
            next_event_id: 1,
        })
    }

    /// Create a logger that discards steps (for testing)
    pub fn null() -> Self {
        Self {
            writer: None,
            step_count: 0,
            next_event_id: 1,
        }
    }

    fn next_id(&mut self) -> String {
        let id = format!("evt_{:08}", self.next_event_id);
        self.next_event_id += 1;
        id
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    fn write(&mut self, line: &LoggedStep) -> std::io::Result<()> {
        self.step_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(line)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    pub fn log_cascade_step(&mut self, step: &CascadeStep) -> std::io::Result<()> {
        let line = LoggedStep::Cascade {
            event_id: self.next_id(),
            step: step.clone(),
        };
        self.write(&line)
    }

    pub fn log_contagion_step(&mut self, step: &ContagionStep) -> std::io::Result<()> {
        let line = LoggedStep::Contagion {
            event_id: self.next_id(),
            step: step.clone(),
        };
        self.write(&line)
    }

    /// Log the perturbation (if any) followed by every cascade step
    pub fn log_cascade(&mut self, report: &CascadeReport) -> std::io::Result<()> {
        for step in report.history() {
            self.log_cascade_step(step)?;
        }
        Ok(())
    }

    pub fn log_contagion(&mut self, report: &ContagionReport) -> std::io::Result<()> {
        for step in &report.steps {
            self.log_contagion_step(step)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for StepLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to flush step logger: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimetic_events::{ContagionPhase, Decision};
    use std::io::BufRead;

    fn no_action(actor: &str) -> ContagionStep {
        ContagionStep {
            index: 0,
            phase: ContagionPhase::Propagating,
            decision: Decision::NoAction {
                actor: actor.into(),
                rationale: "nothing to do".into(),
            },
        }
    }

    #[test]
    fn test_step_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("steps.jsonl");

        let mut logger = StepLogger::new(&path).unwrap();
        logger.log_contagion_step(&no_action("Alice")).unwrap();
        logger.log_contagion_step(&no_action("Betty")).unwrap();
        logger.flush().unwrap();

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 2);

        let parsed: LoggedStep = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(parsed.event_id(), "evt_00000002");
        match parsed {
            LoggedStep::Contagion { step, .. } => assert_eq!(step.decision.actor(), "Betty"),
            other => panic!("unexpected line: {:?}", other),
        }
    }

    #[test]
    fn test_null_logger() {
        let mut logger = StepLogger::null();
        logger.log_contagion_step(&no_action("Alice")).unwrap();
        assert_eq!(logger.step_count(), 1);
    }
}
