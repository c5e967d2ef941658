//! CLI-specific utilities for onedrive-dl
//!
//! This module contains code specific to the command-line binary,
//! separate from the core library functionality.

pub mod progress;

pub use progress::ProgressManager;
