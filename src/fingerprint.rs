use crate::normalize::NormalizedGrid;
use sha2::{Digest, Sha256};

/// Gradient-direction bit signature of a normalized grid.
///
/// Bit i records whether the intensity rises between consecutive elements
/// of the row-major flattening, followed by the same for the column-major
/// flattening: 2·(H·W − 1) bits total. Only the sign of each local
/// gradient is kept, so a uniform brightness or contrast shift leaves the
/// fingerprint untouched while real content changes flip bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    bits: Vec<bool>,
}

impl Fingerprint {
    pub fn from_grid(grid: &NormalizedGrid) -> Self {
        let rows = grid.row_major();
        let cols: Vec<f32> = grid.column_major().collect();

        let mut bits = Vec::with_capacity(2 * rows.len().saturating_sub(1));
        bits.extend(rows.windows(2).map(|w| w[1] > w[0]));
        bits.extend(cols.windows(2).map(|w| w[1] > w[0]));
        Self { bits }
    }

    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// SHA-256 over the fingerprint bytes (one byte per bit), hex-encoded.
    /// Identical fingerprints always produce identical digests, so the
    /// digest doubles as an exact-match key.
    pub fn digest(&self) -> FingerprintDigest {
        let bytes: Vec<u8> = self.bits.iter().map(|&bit| bit as u8).collect();
        FingerprintDigest(format!("{:x}", Sha256::digest(&bytes)))
    }
}

/// Hex-encoded SHA-256 of a fingerprint's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FingerprintDigest(String);

impl FingerprintDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
