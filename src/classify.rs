use crate::config::{DetectorConfig, PolicyKind};
use crate::fingerprint::Fingerprint;
use crate::normalize::NormalizedGrid;
use serde::Serialize;
use thiserror::Error;

/// Broken fixed-grid invariant: everything in one run is produced under a
/// single config, so comparing differently-sized fingerprints or grids is
/// a contract violation, not recoverable user data. Aborts the run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DimensionMismatch {
    #[error("fingerprint lengths differ: {left} != {right}")]
    Fingerprint { left: usize, right: usize },

    #[error("grid shapes differ: {left_height}x{left_width} != {right_height}x{right_width}")]
    Grid {
        left_height: u32,
        left_width: u32,
        right_height: u32,
        right_width: u32,
    },
}

/// Why a pair was reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MatchReason {
    /// Identical fingerprint digests.
    Exact,
    /// Hamming distance under the low cutoff.
    LowHamming { distance: f64 },
    /// Hamming distance under the high cutoff, confirmed by MSE.
    HammingMse { distance: f64, mse: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Modified(MatchReason),
    Distinct,
}

/// Fraction of differing bits, normalized by fingerprint length.
pub fn hamming_distance(a: &Fingerprint, b: &Fingerprint) -> Result<f64, DimensionMismatch> {
    if a.len() != b.len() {
        return Err(DimensionMismatch::Fingerprint {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.is_empty() {
        return Ok(0.0);
    }
    let differing = a
        .bits()
        .iter()
        .zip(b.bits())
        .filter(|(x, y)| x != y)
        .count();
    Ok(differing as f64 / a.len() as f64)
}

/// Mean squared per-pixel intensity difference over two normalized grids.
pub fn mean_squared_error(
    a: &NormalizedGrid,
    b: &NormalizedGrid,
) -> Result<f64, DimensionMismatch> {
    if a.height() != b.height() || a.width() != b.width() {
        return Err(DimensionMismatch::Grid {
            left_height: a.height(),
            left_width: a.width(),
            right_height: b.height(),
            right_width: b.width(),
        });
    }
    let sum: f64 = a
        .row_major()
        .iter()
        .zip(b.row_major())
        .map(|(&x, &y)| (x as f64 - y as f64).powi(2))
        .sum();
    Ok(sum / (a.height() as f64 * a.width() as f64))
}

/// Interchangeable threshold strategy deciding Modified vs Distinct for a
/// pair, given its Hamming distance and MSE.
pub trait ThresholdPolicy: Send + Sync {
    fn classify(&self, distance: f64, mse: f64) -> Verdict;
}

/// Low Hamming accepts outright; otherwise a looser Hamming cutoff needs
/// the MSE confirmation to accept.
#[derive(Debug, Clone)]
pub struct TieredPolicy {
    pub hamming_low: f64,
    pub hamming_high: f64,
    pub mse_high: f64,
}

impl ThresholdPolicy for TieredPolicy {
    fn classify(&self, distance: f64, mse: f64) -> Verdict {
        if distance < self.hamming_low {
            Verdict::Modified(MatchReason::LowHamming { distance })
        } else if distance < self.hamming_high && mse < self.mse_high {
            Verdict::Modified(MatchReason::HammingMse { distance, mse })
        } else {
            Verdict::Distinct
        }
    }
}

/// Hamming distance alone against one cutoff; MSE is ignored.
#[derive(Debug, Clone)]
pub struct SingleSignalPolicy {
    pub hamming_low: f64,
}

impl ThresholdPolicy for SingleSignalPolicy {
    fn classify(&self, distance: f64, _mse: f64) -> Verdict {
        if distance < self.hamming_low {
            Verdict::Modified(MatchReason::LowHamming { distance })
        } else {
            Verdict::Distinct
        }
    }
}

/// Build the policy the config selects, with its thresholds.
pub fn policy_for(config: &DetectorConfig) -> Box<dyn ThresholdPolicy> {
    match config.policy {
        PolicyKind::Tiered => Box::new(TieredPolicy {
            hamming_low: config.hamming_low,
            hamming_high: config.hamming_high,
            mse_high: config.mse_high,
        }),
        PolicyKind::Single => Box::new(SingleSignalPolicy {
            hamming_low: config.hamming_low,
        }),
    }
}
