//! Scan pipeline
//!
//! preprocess -> classify -> score -> (FAKE only) explain -> persist.
//! Nothing is persisted unless every step before `record_scan` succeeded.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::classifier::{load_and_normalize, Classifier, ClassifierError, PreprocessError};
use crate::forensics;
use crate::models::{NewScan, ScanRecord, ScoreVerdict, Verdict};
use crate::store::{ScanStore, StoreError};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct ScanPipeline {
    store: Arc<ScanStore>,
    classifier: Option<Arc<dyn Classifier>>,
}

impl ScanPipeline {
    pub fn new(store: Arc<ScanStore>, classifier: Option<Arc<dyn Classifier>>) -> Self {
        Self { store, classifier }
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn store(&self) -> &Arc<ScanStore> {
        &self.store
    }

    /// Blocking; call from `spawn_blocking` inside handlers
    pub fn scan(&self, path: &Path, filename: &str) -> Result<ScanRecord, ScanError> {
        self.scan_as(Uuid::new_v4(), path, filename)
    }

    /// `scan` with the record id fixed up front
    pub fn scan_as(&self, id: Uuid, path: &Path, filename: &str) -> Result<ScanRecord, ScanError> {
        let classifier = self
            .classifier
            .as_ref()
            .ok_or_else(|| ClassifierError::Unavailable("Model not loaded".to_string()))?;

        let input = load_and_normalize(path)?;
        let raw_score = checked_score(classifier.classify(&input)?)?;
        let verdict = ScoreVerdict::from_raw_score(raw_score);

        // Genuine notes carry no reasons
        let reasons = match verdict.result {
            Verdict::Fake => forensics::explain(path).into_reasons(),
            Verdict::Real => Vec::new(),
        };

        let record = self.store.record_scan_as(id, NewScan {
            filename: filename.to_string(),
            result: verdict.result,
            confidence: verdict.confidence,
            raw_score: verdict.raw_score,
            reasons,
        })?;

        tracing::info!(
            "Scanned {}: {} ({:.2}%, raw {:.4})",
            record.filename,
            record.result,
            record.confidence,
            record.raw_score
        );

        Ok(record)
    }
}

/// Scores outside [0, 1] (or NaN) would persist as an unreadable history
fn checked_score(raw: f32) -> Result<f64, ClassifierError> {
    if raw.is_finite() && (0.0..=1.0).contains(&raw) {
        Ok(raw as f64)
    } else {
        Err(ClassifierError::Inference(format!("Classifier score {} outside [0, 1]", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use ndarray::Array4;
    use tempfile::{tempdir, TempDir};

    struct FixedScore(f32);

    impl Classifier for FixedScore {
        fn classify(&self, _input: &Array4<f32>) -> Result<f32, ClassifierError> {
            Ok(self.0)
        }

        fn describe(&self) -> String {
            "fixed".to_string()
        }
    }

    fn setup(score: Option<f32>) -> (TempDir, ScanPipeline) {
        let dir = tempdir().unwrap();
        let store = ScanStore::open(dir.path().join("history.json"), dir.path().join("audit.json")).unwrap();
        let classifier = score.map(|s| Arc::new(FixedScore(s)) as Arc<dyn Classifier>);
        (dir, ScanPipeline::new(Arc::new(store), classifier))
    }

    fn write_note(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("note.png");
        RgbImage::from_pixel(40, 40, Rgb([120, 130, 140])).save(&path).unwrap();
        path
    }

    #[test]
    fn test_real_scan_has_no_reasons() {
        let (dir, pipeline) = setup(Some(0.9));
        let record = pipeline.scan(&write_note(&dir), "note.png").unwrap();

        assert_eq!(record.result, Verdict::Real);
        assert!((record.confidence - 90.0).abs() < 1e-3);
        assert!(record.reasons.is_empty());
        assert!(!record.verified_by_admin);
        assert_eq!(pipeline.store().snapshot().len(), 1);
    }

    #[test]
    fn test_fake_scan_gets_reasons() {
        let (dir, pipeline) = setup(Some(0.2));
        let record = pipeline.scan(&write_note(&dir), "note.png").unwrap();

        assert_eq!(record.result, Verdict::Fake);
        assert!((record.confidence - 80.0).abs() < 1e-3);
        assert!(!record.reasons.is_empty());
    }

    #[test]
    fn test_boundary_score_is_fake() {
        let (dir, pipeline) = setup(Some(0.5));
        let record = pipeline.scan(&write_note(&dir), "note.png").unwrap();
        assert_eq!(record.result, Verdict::Fake);
        assert!((record.confidence - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_undecodable_upload_is_not_persisted() {
        let (dir, pipeline) = setup(Some(0.9));
        let path = dir.path().join("junk.jpg");
        std::fs::write(&path, b"junk").unwrap();

        assert!(matches!(pipeline.scan(&path, "junk.jpg"), Err(ScanError::Preprocess(_))));
        assert!(pipeline.store().snapshot().is_empty());
    }

    #[test]
    fn test_invalid_scores_are_rejected_without_touching_history() {
        let (dir, pipeline) = setup(Some(0.9));
        let note = write_note(&dir);
        pipeline.scan(&note, "first.png").unwrap();
        pipeline.scan(&note, "second.png").unwrap();

        for bad in [f32::NAN, f32::INFINITY, 1.7, -0.2] {
            let broken = ScanPipeline::new(pipeline.store().clone(), Some(Arc::new(FixedScore(bad)) as Arc<dyn Classifier>));
            let result = broken.scan(&note, "bad.png");
            assert!(
                matches!(result, Err(ScanError::Classifier(ClassifierError::Inference(_)))),
                "score {} was accepted",
                bad
            );
        }

        pipeline.scan(&note, "third.png").unwrap();
        let names: Vec<String> = pipeline.store().snapshot().into_iter().map(|r| r.filename).collect();
        assert_eq!(names, vec!["third.png", "second.png", "first.png"]);
    }

    #[test]
    fn test_score_bounds_are_accepted() {
        assert_eq!(checked_score(0.0).unwrap(), 0.0);
        assert_eq!(checked_score(1.0).unwrap(), 1.0);
    }

    #[test]
    fn test_scan_as_uses_given_id() {
        let (dir, pipeline) = setup(Some(0.9));
        let id = Uuid::new_v4();
        let record = pipeline.scan_as(id, &write_note(&dir), "note.png").unwrap();
        assert_eq!(record.id, id);
    }

    #[test]
    fn test_missing_classifier_is_unavailable() {
        let (dir, pipeline) = setup(None);
        let result = pipeline.scan(&write_note(&dir), "note.png");

        assert!(matches!(result, Err(ScanError::Classifier(ClassifierError::Unavailable(_)))));
        assert!(pipeline.store().snapshot().is_empty());
    }
}
