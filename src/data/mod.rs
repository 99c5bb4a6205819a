/// Categorical datasets and CSV ingestion
pub mod dataset;
