use rand::Rng;

/// Food buckets with a known microplastics range (particles per serving)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]  // Salt, Beer and Honey have ranges but no keyword rule
pub enum FoodCategory {
    Seafood,
    Salt,
    Beer,
    Honey,
    Chicken,
    Beef,
    Pork,
    Fruits,
    Vegetables,
    Grains,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleRange {
    pub min: u32,
    pub max: u32,
}

// Checked in order, first match wins
const KEYWORD_RULES: &[(FoodCategory, &[&str])] = &[
    (
        FoodCategory::Seafood,
        &["fish", "seafood", "clam", "crab", "lobster", "oyster", "scallop", "shrimp", "tuna", "salmon"],
    ),
    (
        FoodCategory::Fruits,
        &["apple", "banana", "orange", "grape", "strawberry", "blueberry", "peach", "pear", "mango", "kiwi"],
    ),
    (
        FoodCategory::Vegetables,
        &["carrot", "tomato", "cucumber", "lettuce", "spinach", "broccoli", "cauliflower", "onion", "potato", "corn"],
    ),
    (FoodCategory::Grains, &["bread", "rice", "pasta", "noodle"]),
    (FoodCategory::Chicken, &["chicken"]),
    (FoodCategory::Beef, &["beef", "steak", "burger"]),
    (FoodCategory::Pork, &["pork"]),
];

impl FoodCategory {
    pub fn range(&self) -> ParticleRange {
        let (min, max) = match self {
            FoodCategory::Seafood => (8, 15),
            FoodCategory::Salt => (5, 12),
            FoodCategory::Beer => (4, 10),
            FoodCategory::Honey => (3, 8),
            FoodCategory::Chicken => (2, 6),
            FoodCategory::Beef => (2, 5),
            FoodCategory::Pork => (2, 5),
            FoodCategory::Fruits => (0, 2),
            FoodCategory::Vegetables => (0, 2),
            FoodCategory::Grains => (0, 3),
            FoodCategory::Low => (1, 4),
        };
        ParticleRange { min, max }
    }
}

/// Bucket a classifier label by substring keywords
pub fn categorize(label: &str) -> FoodCategory {
    let label_lower = label.to_lowercase();

    KEYWORD_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|word| label_lower.contains(word)))
        .map(|(category, _)| *category)
        .unwrap_or(FoodCategory::Low)
}

/// Confidence limited to [0, 1]; NaN counts as 0
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Draw from the category range, scaled by `0.5 + 0.5 * confidence`
pub fn estimate_for_category<R: Rng + ?Sized>(rng: &mut R, category: FoodCategory, confidence: f64) -> u32 {
    let range = category.range();
    let confidence = clamp_confidence(confidence);

    let base_estimate = rng.gen_range(range.min as f64..range.max as f64);
    let confidence_multiplier = 0.5 + confidence * 0.5;

    (base_estimate * confidence_multiplier).round() as u32
}

pub fn estimate_with<R: Rng + ?Sized>(rng: &mut R, label: &str, confidence: f64) -> u32 {
    let category = categorize(label);
    let confidence = clamp_confidence(confidence);
    let count = estimate_for_category(rng, category, confidence);
    log::debug!("🔬 Estimated {} particles for '{}' ({:?}, confidence {:.2})", count, label, category, confidence);
    count
}

/// Non-deterministic estimate using the thread-local RNG
pub fn estimate(label: &str, confidence: f64) -> u32 {
    estimate_with(&mut rand::thread_rng(), label, confidence)
}
