use serde::{Deserialize, Serialize};

/// Which threshold strategy the classifier applies to a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Two tiers: a low Hamming cutoff accepts outright, a higher one
    /// accepts only with a pixel-level MSE confirmation.
    #[default]
    Tiered,
    /// Hamming distance alone against a single cutoff.
    Single,
}

impl PolicyKind {
    /// Default low Hamming cutoff calibrated for this policy.
    pub fn default_hamming_low(self) -> f64 {
        match self {
            Self::Tiered => 0.05,
            Self::Single => 0.10,
        }
    }
}

/// Tunable knobs for one detection run.
///
/// Fingerprints are only comparable when built under the same grid
/// dimensions, so a config is fixed for the lifetime of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub grid_height: u32,
    pub grid_width: u32,
    pub required_channels: u8,
    pub hamming_low: f64,
    pub hamming_high: f64,
    pub mse_high: f64,
    pub policy: PolicyKind,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::with_policy(PolicyKind::Tiered)
    }
}

impl DetectorConfig {
    /// Defaults for the given policy, including its calibrated low cutoff.
    pub fn with_policy(policy: PolicyKind) -> Self {
        Self {
            grid_height: 30,
            grid_width: 30,
            required_channels: 3,
            hamming_low: policy.default_hamming_low(),
            hamming_high: 0.35,
            mse_high: 2000.0,
            policy,
        }
    }

    /// Bit length of fingerprints produced under this config.
    pub fn fingerprint_len(&self) -> usize {
        2 * (self.grid_height as usize * self.grid_width as usize - 1)
    }
}
