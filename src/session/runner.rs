//! Cooperative detection loop.
//!
//! A [`Session`] owns the camera, the detector and the controller. Each
//! iteration captures one frame, awaits the detector and hands the event to
//! the controller, so exactly one detection is in flight at any time. Frames
//! arriving while the detector is busy are simply never captured.
//!
//! Feedback windows close on their own deadline: while a frame is being
//! processed the loop also waits on the lock deadline, without dropping the
//! in-flight detection. Stopping the session through its [`SessionHandle`]
//! ends the loop and discards any pending deadline, so the controller is
//! never touched after teardown.

use std::future;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::models::DetectionEvent;
use crate::problems::{ProblemGenerator, ProblemSource};
use crate::session::camera::{Camera, CameraError, CaptureSize};
use crate::session::controller::{
    InteractionController, InteractionState, SessionSettings, Verdict,
};
use crate::session::detector::{DetectorError, DetectorOptions, HandDetector};
use crate::session::display::DisplaySink;

/// Reasons a session cannot start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Camera access was denied or the device is unavailable.
    #[error("could not start the camera: {0}")]
    Camera(#[from] CameraError),
    /// The landmark detector failed to initialize.
    #[error("could not start the hand detector: {0}")]
    Detector(#[from] DetectorError),
}

/// Everything needed to start a session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionOptions {
    /// Offscreen buffer size
    pub capture: CaptureSize,
    /// Options passed to the detector
    pub detector: DetectorOptions,
    /// Timing and retry rules
    pub settings: SessionSettings,
}

/// Why the loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// Stopped through the handle (or the handle was dropped).
    Stopped,
    /// The camera stopped delivering frames.
    CameraLost(CameraError),
}

/// Final report of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Frames that went through the detector.
    pub frames_processed: u64,
    /// Scored attempts (correct and wrong).
    pub attempts: u64,
    /// Correct answers.
    pub correct: u64,
    /// State at teardown.
    pub final_state: InteractionState,
    /// Why the loop ended.
    pub end_reason: EndReason,
}

/// Ends a running session.
///
/// Dropping every clone of the handle also ends the session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    stop_tx: Arc<watch::Sender<bool>>,
}

impl SessionHandle {
    /// Asks the session to stop after the current step.
    pub fn stop(&self) {
        // Receiver gone means the session already ended.
        let _ = self.stop_tx.send(true);
    }
}

/// A started session, ready to run its detection loop.
#[derive(Debug)]
pub struct Session<C, D, P = ProblemGenerator> {
    camera: C,
    detector: D,
    controller: InteractionController<P>,
    stop_rx: watch::Receiver<bool>,
}

impl<C: Camera, D: HandDetector, P: ProblemSource> Session<C, D, P> {
    /// Opens the camera, configures the detector and seeds the first problem.
    ///
    /// Fails without starting anything if the camera or the detector cannot
    /// be brought up. There is no automatic retry.
    pub async fn start(
        mut camera: C,
        mut detector: D,
        problems: P,
        options: SessionOptions,
    ) -> Result<(Self, SessionHandle), SessionError> {
        if let Err(err) = camera.open(options.capture).await {
            warn!("Camera could not be started: {err}");
            return Err(err.into());
        }
        if let Err(err) = detector.configure(&options.detector).await {
            warn!("Hand detector could not be initialized: {err}");
            return Err(err.into());
        }

        let controller = InteractionController::new(problems, options.settings);
        let (stop_tx, stop_rx) = watch::channel(false);
        info!(
            width = options.capture.width,
            height = options.capture.height,
            "Session started"
        );

        Ok((
            Self {
                camera,
                detector,
                controller,
                stop_rx,
            },
            SessionHandle {
                stop_tx: Arc::new(stop_tx),
            },
        ))
    }

    /// Controller of this session.
    #[must_use]
    pub const fn controller(&self) -> &InteractionController<P> {
        &self.controller
    }

    /// Runs the detection loop until stopped, pushing display changes to `sink`.
    pub async fn run<S: DisplaySink>(self, sink: &mut S) -> SessionSummary {
        let Self {
            mut camera,
            mut detector,
            mut controller,
            mut stop_rx,
        } = self;

        let mut frames_processed = 0;
        let mut attempts = 0;
        let mut correct = 0;
        sink.render(controller.display());

        let end_reason = 'frames: loop {
            if *stop_rx.borrow() {
                break EndReason::Stopped;
            }

            let detection = next_detection(&mut camera, &mut detector);
            tokio::pin!(detection);

            let event = loop {
                let deadline = controller.lock_deadline();
                tokio::select! {
                    biased;
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break 'frames EndReason::Stopped;
                        }
                    }
                    () = sleep_until(deadline) => {
                        let before = controller.display().clone();
                        controller.tick(now());
                        if controller.display() != &before {
                            sink.render(controller.display());
                        }
                    }
                    result = &mut detection => match result {
                        Ok(event) => break event,
                        Err(err) => break 'frames EndReason::CameraLost(err),
                    },
                }
            };

            frames_processed += 1;
            let before = controller.display().clone();
            if let Some(verdict) = controller.handle_event(&event, now()) {
                attempts += 1;
                if matches!(verdict, Verdict::Correct { .. }) {
                    correct += 1;
                }
            }
            if controller.display() != &before {
                sink.render(controller.display());
            }
        };

        let final_state = controller.state();
        info!(
            frames_processed,
            attempts,
            correct,
            ?end_reason,
            "Session ended"
        );

        SessionSummary {
            frames_processed,
            attempts,
            correct,
            final_state,
            end_reason,
        }
    }
}

/// Captures one frame and runs the detector on it.
///
/// Detector failures on a single frame are logged and reported as no hand;
/// camera failures end the session.
async fn next_detection<C: Camera, D: HandDetector>(
    camera: &mut C,
    detector: &mut D,
) -> Result<DetectionEvent, CameraError> {
    let frame = camera.capture().await?;
    match detector.process_frame(&frame).await {
        Ok(event) => Ok(event),
        Err(err) => {
            warn!("Skipping frame: {err}");
            Ok(DetectionEvent::NoHand)
        }
    }
}

/// Sleeps until `deadline`, or forever when there is none.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
        }
        None => future::pending().await,
    }
}

/// Current time on the runtime clock.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}
