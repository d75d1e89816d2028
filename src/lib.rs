//! FingerMath Library
//!
//! This library provides the core of the FingerMath exercise app: counting
//! raised fingers from hand landmarks, generating small arithmetic problems,
//! gating recognition results and driving the interaction loop that ties
//! them together. The web server exposes the same controller over HTTP.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod models;
pub mod problems;
pub mod recognition;
pub mod session;

#[cfg(feature = "web")]
pub mod web;
