//! Shared test fixtures: synthetic hand poses and problems.
#![allow(dead_code)] // Not every test binary uses every fixture

use fingermath::models::landmark::{FINGERTIPS, PIP_JOINTS};
use fingermath::models::{
    DetectionEvent, DetectionRecord, Landmark, LandmarkSet, Operator, Problem, LANDMARK_COUNT,
};
use fingermath::problems::{ProblemGenerator, ScriptedProblems, DEFAULT_MAX_ATTEMPTS};
use std::fs;
use std::path::{Path, PathBuf};

/// Landmarks with the first `raised` fingers (thumb first) above their joints.
///
/// # Arguments
/// * `raised` - Number of raised fingers, 0..=5
///
/// # Returns
/// A landmark array whose tally reads `raised - 1`.
pub fn hand_landmarks(raised: usize) -> [Landmark; LANDMARK_COUNT] {
    assert!(raised <= FINGERTIPS.len(), "a hand has five fingers");

    let mut points = [Landmark::new(0.5, 0.6, 0.0); LANDMARK_COUNT];
    for finger in 0..FINGERTIPS.len() {
        // Image y grows downwards: a raised tip sits above its joint
        points[FINGERTIPS[finger]].y = if finger < raised { 0.2 } else { 0.8 };
        points[PIP_JOINTS[finger]].y = 0.5;
    }
    points
}

/// Detection of a hand whose tally reads `tally` (-1..=4).
pub fn hand_showing(tally: i8) -> DetectionEvent {
    let raised = usize::try_from(tally + 1).expect("tally must be at least -1");
    DetectionEvent::OneHand(LandmarkSet::new(hand_landmarks(raised)))
}

/// Wire record of a hand whose tally reads `tally`.
pub fn record_showing(tally: i8) -> DetectionRecord {
    DetectionRecord::from(&hand_showing(tally))
}

/// Builds a problem, panicking on invalid input.
pub fn problem(operand1: u8, operator: Operator, operand2: u8) -> Problem {
    Problem::new(operand1, operator, operand2).expect("valid test problem")
}

/// Problem source yielding `problems` first.
pub fn scripted(problems: Vec<Problem>) -> ScriptedProblems {
    ScriptedProblems::new(problems, ProblemGenerator::seeded(11, DEFAULT_MAX_ATTEMPTS))
}

/// Parses a prompt such as `"3 - 1 = ?"` back into a problem.
pub fn parse_prompt(prompt: &str) -> Problem {
    let mut parts = prompt.split_whitespace();
    let operand1 = parts.next().and_then(|s| s.parse().ok()).expect("operand1");
    let operator = match parts.next().expect("operator") {
        "+" => Operator::Add,
        "-" => Operator::Subtract,
        "*" => Operator::Multiply,
        "/" => Operator::Divide,
        other => panic!("unknown operator {other}"),
    };
    let operand2 = parts.next().and_then(|s| s.parse().ok()).expect("operand2");
    problem(operand1, operator, operand2)
}

/// Writes detections as JSON lines and returns the file path.
pub fn write_detections(dir: &Path, name: &str, events: &[DetectionEvent]) -> PathBuf {
    let content: Vec<String> = events
        .iter()
        .map(|event| serde_json::to_string(&DetectionRecord::from(event)).expect("serialize"))
        .collect();
    let path = dir.join(name);
    fs::write(&path, content.join("\n")).expect("write detections");
    path
}

/// Writes a config file with the given lock duration and returns its path.
pub fn write_config(dir: &Path, lock_duration_ms: u64) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(
        &path,
        format!("[session]\nlock_duration_ms = {lock_duration_ms}\nfailure_threshold = 3\n"),
    )
    .expect("write config");
    path
}
