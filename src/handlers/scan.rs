use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ClassificationError, ClassificationResult};
use crate::models::{ContaminationLevel, HealthStatus, Prediction};
use crate::services::{estimator, ClassificationService};

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub predictions: Vec<Prediction>,
}

impl ScanOutcome {
    pub fn top(&self) -> Option<&Prediction> {
        self.predictions.first()
    }

    pub fn top_count(&self) -> u32 {
        self.top().and_then(|p| p.microplastics_count).unwrap_or(0)
    }

    pub fn level(&self) -> ContaminationLevel {
        ContaminationLevel::from_count(self.top_count())
    }

    /// "Found N microplastic particle(s) in your food sample."
    pub fn summary(&self) -> String {
        let count = self.top_count();
        format!(
            "Found {} microplastic particle{} in your food sample.",
            count,
            if count != 1 { "s" } else { "" }
        )
    }
}

/// The one alert to show when a health result leaves capture disabled
pub fn health_alert(result: &ClassificationResult<HealthStatus>) -> Option<String> {
    match result {
        Ok(health) if health.model_loaded => None,
        Ok(_) => Some(ClassificationError::ModelNotLoaded.alert_message()),
        Err(e) => Some(format!("Failed to check model status. {}", e.alert_message())),
    }
}

/// Clears the busy flag on every exit path
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Capture flow: health gate → classify → fill in particle counts
pub struct ScanHandler {
    classifier: Arc<dyn ClassificationService>,
    model_ready: AtomicBool,
    busy: AtomicBool,
}

impl ScanHandler {
    pub fn new(classifier: Arc<dyn ClassificationService>) -> Self {
        Self {
            classifier,
            model_ready: AtomicBool::new(false),
            busy: AtomicBool::new(false),
        }
    }

    /// Query the backend; capture stays disabled unless the model is loaded
    pub async fn refresh_health(&self) -> ClassificationResult<HealthStatus> {
        match self.classifier.check_health().await {
            Ok(health) => {
                self.model_ready.store(health.model_loaded, Ordering::SeqCst);
                if !health.model_loaded {
                    log::warn!("⚠️ Classifier is up but the model is not loaded, capture disabled");
                }
                Ok(health)
            }
            Err(e) => {
                self.model_ready.store(false, Ordering::SeqCst);
                log::error!("❌ Health check failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn capture_enabled(&self) -> bool {
        self.model_ready.load(Ordering::SeqCst) && !self.busy.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub async fn scan(&self, image_path: &Path) -> ClassificationResult<ScanOutcome> {
        if !self.model_ready.load(Ordering::SeqCst) {
            return Err(ClassificationError::ModelNotLoaded);
        }
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(ClassificationError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        log::info!("📸 Analyzing food image: {}", image_path.display());
        let mut predictions = self.classifier.classify_food(image_path).await?;

        for prediction in predictions.iter_mut().filter(|p| p.microplastics_count.is_none()) {
            prediction.microplastics_count = Some(estimator::estimate(&prediction.label, prediction.confidence));
        }

        let outcome = ScanOutcome { predictions };
        if let Some(top) = outcome.top() {
            log::info!(
                "✅ Top prediction: {} ({:.1}%) → {} particles",
                top.label,
                top.confidence * 100.0,
                outcome.top_count()
            );
        }
        Ok(outcome)
    }

    /// Run a scan and collapse any failure into the single alert text
    pub async fn scan_or_alert(&self, image_path: &Path) -> Result<ScanOutcome, String> {
        self.scan(image_path).await.map_err(|e| {
            log::error!("❌ Error analyzing food: {}", e);
            e.alert_message()
        })
    }
}
