/// Confusion matrix and classification scores
pub mod confusion;
