pub mod classifier; // Remote /health + /classify client
pub mod estimator; // Label → microplastics particle count heuristic

pub use classifier::{ClassificationService, RemoteClassifier};
