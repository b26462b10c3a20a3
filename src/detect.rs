use crate::classify::{self, DimensionMismatch, MatchReason, ThresholdPolicy, Verdict};
use crate::config::DetectorConfig;
use crate::fingerprint::Fingerprint;
use crate::index::ExactIndex;
use crate::normalize::{self, NormalizedGrid};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;

/// A pair of images judged to be copies of one another.
///
/// Exact pairs are oriented (first-seen, newcomer); near-duplicate pairs
/// (earlier, later) in retained-input order.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicatePair {
    pub first: PathBuf,
    pub second: PathBuf,
    pub reason: MatchReason,
}

/// An input image dropped before fingerprinting, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct Exclusion {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one detection run.
///
/// `pairs` lists exact-digest matches first, then near-duplicate matches,
/// each in discovery order. The same unordered pair may appear once per
/// phase; callers deduplicate if they need to.
#[derive(Debug, Serialize)]
pub struct Report {
    pub pairs: Vec<DuplicatePair>,
    pub exclusions: Vec<Exclusion>,
    pub retained: usize,
    pub comparisons: usize,
}

struct Retained {
    path: PathBuf,
    fingerprint: Fingerprint,
    grid: NormalizedGrid,
}

/// Drives the whole pipeline over an input set: normalize and fingerprint
/// every image, flag exact digest collisions, then classify every
/// unordered pair of retained images.
pub struct DuplicateFinder {
    config: DetectorConfig,
    policy: Box<dyn ThresholdPolicy>,
}

impl DuplicateFinder {
    pub fn new(config: DetectorConfig) -> Self {
        let policy = classify::policy_for(&config);
        Self { config, policy }
    }

    /// Swap in a caller-supplied threshold policy.
    pub fn with_policy(config: DetectorConfig, policy: Box<dyn ThresholdPolicy>) -> Self {
        Self { config, policy }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Run detection over `paths` in order.
    ///
    /// Per-image load and validation failures become exclusions in the
    /// report; only a broken fixed-grid invariant aborts the run.
    pub fn run(&self, paths: &[PathBuf]) -> Result<Report, DimensionMismatch> {
        // Per-image phase: independent work, joined before the pairwise
        // phase. The ordered collect keeps input order.
        let prepared: Vec<_> = paths
            .par_iter()
            .map(|path| {
                let outcome = normalize::normalize(path, &self.config).map(|grid| {
                    let fingerprint = Fingerprint::from_grid(&grid);
                    (fingerprint, grid)
                });
                (path.clone(), outcome)
            })
            .collect();

        let mut exclusions = Vec::new();
        let mut retained: Vec<Retained> = Vec::new();
        let mut index = ExactIndex::new();
        let mut pairs = Vec::new();

        for (path, outcome) in prepared {
            match outcome {
                Ok((fingerprint, grid)) => {
                    if let Some(canonical) = index.insert_or_match(&path, fingerprint.digest()) {
                        pairs.push(DuplicatePair {
                            first: canonical.to_path_buf(),
                            second: path.clone(),
                            reason: MatchReason::Exact,
                        });
                    }
                    retained.push(Retained {
                        path,
                        fingerprint,
                        grid,
                    });
                }
                Err(reason) => {
                    log::warn!("excluding {}: {}", path.display(), reason);
                    exclusions.push(Exclusion {
                        path,
                        reason: reason.to_string(),
                    });
                }
            }
        }
        log::debug!(
            "retained {} of {} images, {} exact pair(s)",
            retained.len(),
            paths.len(),
            pairs.len()
        );

        // Pairwise phase: N·(N−1)/2 comparisons over the read-only table,
        // i < j in retained order. Matches accumulate per worker and the
        // ordered collect merges them back in enumeration order.
        let pair_indices: Vec<(usize, usize)> = (0..retained.len())
            .flat_map(|i| ((i + 1)..retained.len()).map(move |j| (i, j)))
            .collect();
        let comparisons = pair_indices.len();

        let near: Vec<Option<DuplicatePair>> = pair_indices
            .par_iter()
            .map(|&(i, j)| {
                let a = &retained[i];
                let b = &retained[j];
                let distance = classify::hamming_distance(&a.fingerprint, &b.fingerprint)?;
                let mse = classify::mean_squared_error(&a.grid, &b.grid)?;
                Ok(match self.policy.classify(distance, mse) {
                    Verdict::Modified(reason) => Some(DuplicatePair {
                        first: a.path.clone(),
                        second: b.path.clone(),
                        reason,
                    }),
                    Verdict::Distinct => None,
                })
            })
            .collect::<Result<_, DimensionMismatch>>()?;
        pairs.extend(near.into_iter().flatten());

        Ok(Report {
            pairs,
            exclusions,
            retained: retained.len(),
            comparisons,
        })
    }
}
