//! Exact and near-duplicate image detection.
//!
//! Each image is decoded, converted to grayscale with fixed luminance
//! weights, resized to a small fixed grid, and reduced to a
//! gradient-direction bit fingerprint. Images whose fingerprint digests
//! collide are exact duplicates; remaining pairs are classified as
//! modified copies via normalized Hamming distance, optionally confirmed
//! by mean squared error over the grids.
//!
//! [`detect::DuplicateFinder`] drives the whole pipeline; the other
//! modules are usable on their own.

pub mod classify;
pub mod config;
pub mod detect;
pub mod exact;
pub mod fingerprint;
pub mod index;
pub mod normalize;
pub mod scan;

pub use classify::{MatchReason, ThresholdPolicy};
pub use config::{DetectorConfig, PolicyKind};
pub use detect::{DuplicateFinder, DuplicatePair, Report};
pub use fingerprint::Fingerprint;
pub use normalize::NormalizedGrid;
