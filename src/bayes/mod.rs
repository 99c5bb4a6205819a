/// Categorical naive Bayes classifier
pub mod categorical;
