use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the ranked prediction list (highest confidence first)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,  // 0.0 - 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,  // Class index in the backend label file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microplastics_count: Option<u32>,  // Filled server-side, or locally when missing
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub num_classes: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyRequest {
    pub image: String,  // data:<mime>;base64,<payload>
}

#[derive(Debug, Deserialize)]
pub struct ClassifyResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    #[serde(default)]
    pub top_prediction: Option<Prediction>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Analyzed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLog {
    pub id: u64,
    pub food_item: String,
    pub microplastics_count: u32,
    pub logged_at: DateTime<Utc>,
    pub status: LogStatus,
}

impl FoodLog {
    pub fn date(&self) -> NaiveDate {
        self.logged_at.date_naive()
    }

    pub fn level(&self) -> ContaminationLevel {
        ContaminationLevel::from_count(self.microplastics_count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContaminationLevel {
    Clean,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ContaminationLevel {
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => ContaminationLevel::Clean,
            1..=3 => ContaminationLevel::Low,
            4..=7 => ContaminationLevel::Medium,
            8..=10 => ContaminationLevel::High,
            _ => ContaminationLevel::VeryHigh,
        }
    }

    /// Hex colour used by charts and badges
    pub fn color(&self) -> &'static str {
        match self {
            ContaminationLevel::Clean => "#34C759",
            ContaminationLevel::Low => "#FF9500",
            ContaminationLevel::Medium => "#FF6B35",
            ContaminationLevel::High => "#FF3B30",
            ContaminationLevel::VeryHigh => "#8B0000",
        }
    }
}

impl std::fmt::Display for ContaminationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContaminationLevel::Clean => "Clean",
            ContaminationLevel::Low => "Low",
            ContaminationLevel::Medium => "Medium",
            ContaminationLevel::High => "High",
            ContaminationLevel::VeryHigh => "Very High",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contamination_thresholds() {
        assert_eq!(ContaminationLevel::from_count(0), ContaminationLevel::Clean);
        assert_eq!(ContaminationLevel::from_count(3), ContaminationLevel::Low);
        assert_eq!(ContaminationLevel::from_count(4), ContaminationLevel::Medium);
        assert_eq!(ContaminationLevel::from_count(7), ContaminationLevel::Medium);
        assert_eq!(ContaminationLevel::from_count(10), ContaminationLevel::High);
        assert_eq!(ContaminationLevel::from_count(11), ContaminationLevel::VeryHigh);
        assert_eq!(ContaminationLevel::VeryHigh.to_string(), "Very High");
        assert_eq!(ContaminationLevel::Clean.color(), "#34C759");
    }

    #[test]
    fn test_classify_response_deserialization() {
        let json = r#"{
            "success": true,
            "predictions": [
                {"label": "grilled_salmon", "confidence": 0.91, "index": 50, "microplastics_count": 12},
                {"label": "sushi", "confidence": 0.05, "index": 95, "microplastics_count": 3}
            ],
            "top_prediction": {"label": "grilled_salmon", "confidence": 0.91, "index": 50, "microplastics_count": 12}
        }"#;

        let response: ClassifyResponse = serde_json::from_str(json).unwrap();

        assert!(response.success);
        assert_eq!(response.predictions.len(), 2);
        assert_eq!(response.predictions[0].label, "grilled_salmon");
        assert_eq!(response.predictions[0].microplastics_count, Some(12));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_error_body_deserialization() {
        let json = r#"{"error": "No image data provided"}"#;
        let response: ClassifyResponse = serde_json::from_str(json).unwrap();

        assert!(!response.success);
        assert!(response.predictions.is_empty());
        assert_eq!(response.error.as_deref(), Some("No image data provided"));
    }
}
