//! Replay command: runs a recorded detection stream through a session.
//!
//! The input holds one JSON detection per line, in the same form the web API
//! accepts (`{"landmarks": [...]}` or `{"landmarks": null}`). Frames are
//! replayed at a fixed interval through the regular detection loop, so the
//! feedback windows behave exactly as they would live.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tokio::sync::Notify;
use tracing::info;

use crate::cli::load_config;
use crate::models::{DetectionEvent, DetectionRecord};
use crate::problems::ProblemGenerator;
use crate::session::{
    DetectorError, DetectorOptions, DisplayState, Frame, HandDetector, Session, SessionSummary,
    SyntheticCamera,
};

/// Extra wait after the last frame, on top of the lock duration.
const DRAIN_MARGIN: Duration = Duration::from_millis(50);

/// Replay recorded detections through an exercise session
#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// JSON-lines file with one detection per frame
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Delay between frames in milliseconds
    #[arg(long, default_value = "33")]
    pub frame_interval_ms: u64,

    /// Seed for the problem generator (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Path to a config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print display states as JSON lines
    #[arg(long)]
    pub json: bool,
}

/// One printed display change.
#[derive(Debug, Serialize)]
struct DisplayLine<'a> {
    elapsed_ms: u64,
    #[serde(flatten)]
    display: &'a DisplayState,
}

impl ReplayArgs {
    /// Execute the replay command
    pub async fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let events = read_detections(&self.file)?;
        info!(frames = events.len(), file = %self.file.display(), "Replaying detections");

        let max_attempts = config.session.max_generation_attempts;
        let problems = match self.seed {
            Some(seed) => ProblemGenerator::seeded(seed, max_attempts),
            None => ProblemGenerator::from_entropy(max_attempts),
        };

        let finished = Arc::new(Notify::new());
        let detector = ReplayDetector::new(events, Arc::clone(&finished));
        let camera = SyntheticCamera::new(Duration::from_millis(self.frame_interval_ms));
        let options = config.session_options();

        let (session, handle) = Session::start(camera, detector, problems, options)
            .await
            .context("Failed to start session")?;

        let started = tokio::time::Instant::now();
        let json = self.json;
        let mut sink = |display: &DisplayState| {
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            print_display(elapsed_ms, display, json);
        };

        // Once the recording runs out, let the last feedback window close
        // before stopping.
        let drain = options.settings.lock_duration + DRAIN_MARGIN;
        let stopper = async {
            finished.notified().await;
            tokio::time::sleep(drain).await;
            handle.stop();
        };

        let (summary, ()) = tokio::join!(session.run(&mut sink), stopper);
        print_summary(&summary, json)
    }
}

/// Reads a JSON-lines detection file. Blank lines are skipped.
pub fn read_detections(path: &Path) -> Result<Vec<DetectionEvent>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read detections: {}", path.display()))?;
    parse_detections(&content).with_context(|| format!("Invalid detections in {}", path.display()))
}

fn parse_detections(content: &str) -> Result<Vec<DetectionEvent>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let line_number = index + 1;
            let record: DetectionRecord = serde_json::from_str(line)
                .with_context(|| format!("line {line_number}: malformed JSON"))?;
            record
                .into_event()
                .with_context(|| format!("line {line_number}: invalid detection"))
        })
        .collect()
}

fn print_display(elapsed_ms: u64, display: &DisplayState, json: bool) {
    if json {
        let line = DisplayLine {
            elapsed_ms,
            display,
        };
        if let Ok(text) = serde_json::to_string(&line) {
            println!("{text}");
        }
        return;
    }

    let feedback = if display.success_visible {
        "  CORRECT"
    } else if display.retry_visible {
        "  TRY AGAIN"
    } else {
        ""
    };
    #[allow(clippy::cast_precision_loss)]
    let seconds = elapsed_ms as f64 / 1000.0;
    println!(
        "[{seconds:>8.3}s] {:<10} fingers: {}{feedback}",
        display.problem_text,
        display.finger_count_text()
    );
}

fn print_summary(summary: &SessionSummary, json: bool) -> Result<()> {
    if json {
        let value = serde_json::json!({
            "frames_processed": summary.frames_processed,
            "attempts": summary.attempts,
            "correct": summary.correct,
        });
        println!("{}", serde_json::to_string(&value)?);
    } else {
        println!();
        println!(
            "Frames: {}  Attempts: {}  Correct: {}",
            summary.frames_processed, summary.attempts, summary.correct
        );
    }
    Ok(())
}

/// Detector that hands out recorded events and signals when they run out.
#[derive(Debug)]
struct ReplayDetector {
    events: VecDeque<DetectionEvent>,
    finished: Arc<Notify>,
    configured: bool,
}

impl ReplayDetector {
    fn new(events: Vec<DetectionEvent>, finished: Arc<Notify>) -> Self {
        Self {
            events: events.into(),
            finished,
            configured: false,
        }
    }
}

impl HandDetector for ReplayDetector {
    async fn configure(&mut self, _options: &DetectorOptions) -> Result<(), DetectorError> {
        self.configured = true;
        Ok(())
    }

    async fn process_frame(&mut self, _frame: &Frame) -> Result<DetectionEvent, DetectorError> {
        if !self.configured {
            return Err(DetectorError::Frame("detector was not configured".to_string()));
        }
        let event = self.events.pop_front().unwrap_or(DetectionEvent::NoHand);
        if self.events.is_empty() {
            // Stores a permit if nobody is waiting yet.
            self.finished.notify_one();
        }
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_detections_skips_blank_lines() {
        let content = "{\"landmarks\": null}\n\n{}\n";
        let events = parse_detections(content).unwrap();
        assert_eq!(events, vec![DetectionEvent::NoHand, DetectionEvent::NoHand]);
    }

    #[test]
    fn test_parse_detections_reports_line_number() {
        let content = "{\"landmarks\": null}\n{\"landmarks\": [{\"x\": 0.1, \"y\": 0.2}]}\n";
        let err = parse_detections(content).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));

        let err = parse_detections("{oops").unwrap_err();
        assert!(format!("{err:#}").contains("line 1"));
    }

    #[tokio::test]
    async fn test_replay_detector_signals_end() {
        let finished = Arc::new(Notify::new());
        let mut detector = ReplayDetector::new(vec![DetectionEvent::NoHand], Arc::clone(&finished));
        let frame = Frame::blank(crate::session::CaptureSize {
            width: 2,
            height: 2,
        });

        assert!(detector.process_frame(&frame).await.is_err());
        detector.configure(&DetectorOptions::default()).await.unwrap();
        assert_eq!(detector.process_frame(&frame).await, Ok(DetectionEvent::NoHand));

        // Permit was stored, so this resolves immediately.
        finished.notified().await;
    }
}
