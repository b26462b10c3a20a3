use image::{ImageBuffer, Luma, Rgb};
use pixdup::classify::{MatchReason, ThresholdPolicy, Verdict};
use pixdup::config::DetectorConfig;
use pixdup::detect::DuplicateFinder;
use pixdup::{exact, scan};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_pattern(dir: &Path, name: &str, seed: u32) -> PathBuf {
    let path = dir.join(name);
    let img = ImageBuffer::from_fn(100, 100, |x, y| {
        let v = ((x * (3 + seed) + y * (2 + seed * 5)) % 200 + 20).min(255) as u8;
        Rgb([v, v, v])
    });
    img.save(&path).unwrap();
    path
}

#[test]
fn byte_identical_files_hit_every_detector() {
    let dir = TempDir::new().unwrap();
    let a = write_pattern(dir.path(), "a.png", 0);
    let b = dir.path().join("b.png");
    std::fs::copy(&a, &b).unwrap();

    let images = scan::scan_directory(dir.path());
    assert_eq!(images, vec![a.clone(), b.clone()]);

    // Whole-file hashing groups them.
    let groups = exact::identical_groups(&images);
    assert_eq!(groups, vec![vec![a.clone(), b.clone()]]);

    // The engine reports the pair from both phases, undeduplicated.
    let finder = DuplicateFinder::new(DetectorConfig::default());
    let report = finder.run(&images).unwrap();
    assert_eq!(report.comparisons, 1);
    assert_eq!(report.pairs.len(), 2);
    assert_eq!(report.pairs[0].reason, MatchReason::Exact);
    assert!(matches!(
        report.pairs[1].reason,
        MatchReason::LowHamming { distance } if distance == 0.0
    ));
    for pair in &report.pairs {
        assert_eq!((&pair.first, &pair.second), (&a, &b));
    }
}

#[test]
fn jpeg_reencode_classifies_as_modified() {
    let dir = TempDir::new().unwrap();
    let png = write_pattern(dir.path(), "original.png", 1);
    let jpeg = dir.path().join("reencoded.jpg");
    image::open(&png).unwrap().save(&jpeg).unwrap();

    let finder = DuplicateFinder::new(DetectorConfig::default());
    let report = finder.run(&[png.clone(), jpeg.clone()]).unwrap();

    let modified: Vec<_> = report
        .pairs
        .iter()
        .filter(|pair| pair.reason != MatchReason::Exact)
        .collect();
    assert_eq!(modified.len(), 1);
    assert_eq!(modified[0].first, png);
    assert_eq!(modified[0].second, jpeg);
}

#[test]
fn invalid_channel_images_are_reported_and_ignored() {
    let dir = TempDir::new().unwrap();
    let a = write_pattern(dir.path(), "a.png", 0);
    let b = write_pattern(dir.path(), "b.png", 7);
    let gray = dir.path().join("gray.png");
    let img: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_pixel(100, 100, Luma([99]));
    img.save(&gray).unwrap();
    let broken = dir.path().join("broken.jpg");
    std::fs::write(&broken, b"not a jpeg at all").unwrap();

    let finder = DuplicateFinder::new(DetectorConfig::default());
    let report = finder
        .run(&[a, gray.clone(), b, broken.clone()])
        .unwrap();

    assert_eq!(report.retained, 2);
    assert_eq!(report.comparisons, 1);
    assert_eq!(report.exclusions.len(), 2);
    let excluded: Vec<_> = report.exclusions.iter().map(|e| e.path.clone()).collect();
    assert_eq!(excluded, vec![gray.clone(), broken.clone()]);
    for pair in &report.pairs {
        assert_ne!(pair.first, gray);
        assert_ne!(pair.second, gray);
        assert_ne!(pair.first, broken);
        assert_ne!(pair.second, broken);
    }
}

#[test]
fn reports_are_deterministic_across_runs() {
    let dir = TempDir::new().unwrap();
    let mut images = Vec::new();
    for i in 0..5 {
        images.push(write_pattern(dir.path(), &format!("img{i}.png"), i));
    }
    let copy = dir.path().join("img0_copy.png");
    std::fs::copy(&images[0], &copy).unwrap();
    images.push(copy);

    let finder = DuplicateFinder::new(DetectorConfig::default());
    let first = finder.run(&images).unwrap();
    let second = finder.run(&images).unwrap();

    assert_eq!(first.comparisons, second.comparisons);
    assert_eq!(first.pairs.len(), second.pairs.len());
    for (x, y) in first.pairs.iter().zip(&second.pairs) {
        assert_eq!((&x.first, &x.second, x.reason), (&y.first, &y.second, y.reason));
    }
}

#[test]
fn injected_policy_overrides_thresholds() {
    struct AcceptAll;
    impl ThresholdPolicy for AcceptAll {
        fn classify(&self, distance: f64, _mse: f64) -> Verdict {
            Verdict::Modified(MatchReason::LowHamming { distance })
        }
    }

    let dir = TempDir::new().unwrap();
    let a = write_pattern(dir.path(), "a.png", 0);
    let b = write_pattern(dir.path(), "b.png", 9);

    let finder = DuplicateFinder::with_policy(DetectorConfig::default(), Box::new(AcceptAll));
    let report = finder.run(&[a, b]).unwrap();
    assert_eq!(report.pairs.len(), 1);
}
