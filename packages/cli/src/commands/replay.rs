use crate::config::{Config, OutputFormat};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use docsync_common::{properties, PropertyMap};
use docsync_engine::{EventKind, EventLog, LifecycleState, Reference};
use docsync_operations::PropertyOp;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Script to replay (JSON)
    pub script: PathBuf,

    /// Print one JSON object per step (overrides config)
    #[arg(long)]
    pub json: bool,

    /// Do not print emitted events (overrides config)
    #[arg(long)]
    pub quiet_events: bool,
}

/// A reference to create and the steps to drive it through
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub kind: String,
    pub id: String,

    /// Initial canonical snapshot
    #[serde(default)]
    pub seed: Option<PropertyMap>,

    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "lowercase")]
pub enum Step {
    /// Local edit, composed into the buffer
    Local { op: PropertyOp },

    /// Confirmed edit from the authority
    Remote { op: PropertyOp },

    Saving,
    Saved,

    /// Print the snapshots without changing anything
    Show,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Local { .. } => "local",
            Step::Remote { .. } => "remote",
            Step::Saving => "saving",
            Step::Saved => "saved",
            Step::Show => "show",
        }
    }
}

/// What one step left behind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub index: usize,
    pub step: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    pub state: LifecycleState,
    pub events: Vec<EventKind>,
    pub canonical: PropertyMap,
    pub in_flight: PropertyMap,
    pub buffered: PropertyMap,
}

/// Drives one property-map reference through a script
pub struct Replayer {
    reference: Reference<PropertyOp>,
    log: Arc<EventLog<PropertyOp>>,
}

impl Replayer {
    pub fn new(script: &Script) -> Self {
        let log: Arc<EventLog<PropertyOp>> = Arc::new(EventLog::new());
        let seed = properties(script.seed.clone().unwrap_or_default());
        let reference = Reference::with_seed(&script.kind, &script.id, seed)
            .with_notifier(log.clone());

        Self { reference, log }
    }

    pub fn reference(&self) -> &Reference<PropertyOp> {
        &self.reference
    }

    pub fn run(&mut self, index: usize, step: &Step) -> Result<StepReport> {
        let operation = match step {
            Step::Local { op } => {
                self.reference.apply_to_buffer(op.clone())?;
                Some(op.to_string())
            }
            Step::Remote { op } => {
                self.reference.apply_to_canonical(op.clone())?;
                Some(op.to_string())
            }
            Step::Saving => {
                self.reference.saving()?;
                None
            }
            Step::Saved => {
                self.reference.saved()?;
                None
            }
            Step::Show => None,
        };

        let events = self
            .log
            .drain()
            .into_iter()
            .map(|event| event.kind)
            .collect();

        Ok(StepReport {
            index,
            step: step.name(),
            operation,
            state: self.reference.state(),
            events,
            canonical: self.reference.canonical_snapshot().clone(),
            in_flight: self.reference.in_flight_snapshot(),
            buffered: self.reference.buffered_snapshot(),
        })
    }
}

pub fn load_script(path: &Path) -> Result<Script> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;

    serde_json::from_str(&content).with_context(|| format!("Invalid script {}", path.display()))
}

pub fn replay(args: ReplayArgs, config: &Config) -> Result<()> {
    let output = if args.json {
        OutputFormat::Json
    } else {
        config.output
    };
    let show_events = config.show_events && !args.quiet_events;

    let script = load_script(&args.script)?;
    info!(
        kind = %script.kind,
        id = %script.id,
        steps = script.steps.len(),
        "replaying script"
    );

    if output == OutputFormat::Pretty {
        println!(
            "{} {}#{} ({} steps)",
            "▶ Replaying".bright_blue().bold(),
            script.kind,
            script.id,
            script.steps.len()
        );
    }

    let mut replayer = Replayer::new(&script);

    for (index, step) in script.steps.iter().enumerate() {
        debug!(index, step = step.name(), "running step");

        let report = replayer
            .run(index, step)
            .with_context(|| format!("Step {} ({}) failed", index, step.name()))?;

        match output {
            OutputFormat::Pretty => print_pretty(&report, show_events),
            OutputFormat::Json => print_json(&report, show_events)?,
        }
    }

    if output == OutputFormat::Pretty {
        println!();
        println!(
            "{} {} is {}",
            "✅".green(),
            replayer.reference().key(),
            replayer.reference().state()
        );
    }

    Ok(())
}

fn print_pretty(report: &StepReport, show_events: bool) {
    let label = match &report.operation {
        Some(operation) => format!("{} {}", report.step, operation),
        None => report.step.to_string(),
    };

    println!(
        "  {} [{}] {} → {}",
        "✓".green(),
        report.index,
        label,
        report.state.to_string().bright_white()
    );

    if report.step == "show" {
        println!("      canonical: {}", render(&report.canonical));
        println!("      in-flight: {}", render(&report.in_flight));
        println!("      buffered:  {}", render(&report.buffered));
    }

    if show_events && !report.events.is_empty() {
        let events: Vec<&str> = report.events.iter().map(EventKind::as_str).collect();
        println!("      {}", events.join(", ").dimmed());
    }
}

fn print_json(report: &StepReport, show_events: bool) -> Result<()> {
    let mut value = serde_json::to_value(report)?;

    if !show_events {
        if let Some(object) = value.as_object_mut() {
            object.remove("events");
        }
    }

    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}

fn render(snapshot: &PropertyMap) -> String {
    serde_json::to_string(snapshot).unwrap_or_else(|_| format!("{:?}", snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCENARIO: &str = r#"{
        "kind": "person",
        "id": "1",
        "steps": [
            { "step": "local", "op": { "type": "set", "property": "lastName", "new": "Dale" } },
            { "step": "saving" },
            { "step": "local", "op": { "type": "set", "property": "firstName", "new": "Tom" } },
            { "step": "saved" },
            { "step": "saving" },
            { "step": "remote", "op": { "type": "set", "property": "firstName", "new": "Thomas" } },
            { "step": "show" }
        ]
    }"#;

    fn run_all(script: &Script) -> Result<Vec<StepReport>> {
        let mut replayer = Replayer::new(script);
        script
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| replayer.run(index, step))
            .collect()
    }

    #[test]
    fn test_parse_script() {
        let script: Script = serde_json::from_str(SCENARIO).unwrap();

        assert_eq!(script.kind, "person");
        assert_eq!(script.steps.len(), 7);
        assert!(script.seed.is_none());
        assert_eq!(script.steps[1].name(), "saving");
    }

    #[test]
    fn test_replay_scenario() {
        let script: Script = serde_json::from_str(SCENARIO).unwrap();
        let reports = run_all(&script).unwrap();
        let last = reports.last().unwrap();

        assert_eq!(
            last.canonical,
            properties([("firstName", json!("Thomas")), ("lastName", json!("Dale"))])
        );
        assert_eq!(
            last.in_flight,
            properties([("firstName", json!("Tom")), ("lastName", json!("Dale"))])
        );
        assert_eq!(last.state, LifecycleState::Saving);

        assert_eq!(
            reports[3].events,
            vec![EventKind::CanonicalChange, EventKind::LifecycleSaved]
        );
        assert_eq!(
            reports[5].events,
            vec![EventKind::CanonicalChange, EventKind::BufferTransformed]
        );
        assert!(last.events.is_empty());
    }

    #[test]
    fn test_seeded_script() {
        let script: Script = serde_json::from_str(
            r#"{
                "kind": "person",
                "id": "2",
                "seed": { "age": 11 },
                "steps": [
                    { "step": "local", "op": { "type": "set", "property": "age", "old": 11, "new": 12 } }
                ]
            }"#,
        )
        .unwrap();

        let reports = run_all(&script).unwrap();

        assert_eq!(reports[0].canonical, properties([("age", json!(11))]));
        assert_eq!(reports[0].buffered, properties([("age", json!(12))]));
        assert_eq!(reports[0].state, LifecycleState::Dirty);
    }

    #[test]
    fn test_null_seed_values_are_dropped() {
        let script: Script = serde_json::from_str(
            r#"{
                "kind": "person",
                "id": "4",
                "seed": { "nickname": null, "age": 11 },
                "steps": [{ "step": "show" }]
            }"#,
        )
        .unwrap();

        let replayer = Replayer::new(&script);

        assert_eq!(
            replayer.reference().canonical_snapshot(),
            &properties([("age", json!(11))])
        );
        assert!(!replayer
            .reference()
            .canonical_snapshot()
            .contains_key("nickname"));
    }

    #[test]
    fn test_failing_step_is_reported() {
        let script: Script = serde_json::from_str(
            r#"{ "kind": "person", "id": "3", "steps": [{ "step": "saving" }] }"#,
        )
        .unwrap();

        let error = run_all(&script).unwrap_err();

        assert!(error.to_string().contains("the buffer is empty"));
    }

    #[test]
    fn test_load_script_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.json");
        fs::write(&path, SCENARIO).unwrap();

        let script = load_script(&path).unwrap();

        assert_eq!(script.id, "1");
    }

    #[test]
    fn test_load_invalid_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{ "kind": "person" }"#).unwrap();

        let error = load_script(&path).unwrap_err();

        assert!(error.to_string().starts_with("Invalid script"));
    }

    #[test]
    fn test_json_report_shape() {
        let script: Script = serde_json::from_str(SCENARIO).unwrap();
        let reports = run_all(&script).unwrap();

        let value = serde_json::to_value(&reports[0]).unwrap();

        assert_eq!(value["step"], "local");
        assert_eq!(value["state"], "dirty");
        assert_eq!(value["events"], json!(["buffer:change"]));
        assert_eq!(value["inFlight"], json!({}));
    }
}
