//! Picsweep - a terminal image triage library
//!
//! This crate provides the core functionality for the picsweep application:
//! depth-limited duplicate-safe image discovery, batch selection with
//! per-image decision state, and a terminal layout engine that fits a batch
//! of images into the character/pixel grid without overflow.

pub mod batch;
pub mod classify;
pub mod cli;
pub mod config;
pub mod discover;
pub mod error;
pub mod input;
pub mod layout;
pub mod metrics;
pub mod render;
pub mod session;

// Re-export primary types for convenience
pub use batch::{Batch, BatchSelector, Decision, DecisionState, BATCH_SIZE};
pub use config::UserConfig;
pub use discover::{discover, DirectoryIdentity, ImageCandidate, TraversalConfig};
pub use error::{PicsweepError, Result};
pub use layout::{compute_layout, ImageDimensions, LayoutMode, LayoutPlan};
pub use metrics::TerminalMetrics;
