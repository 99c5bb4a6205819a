/// ID3 decision tree classifier
pub mod classifier;
/// Entropy and information gain
pub mod criterion;
/// XML export of built trees
pub mod export;
pub mod node;
pub mod params;
