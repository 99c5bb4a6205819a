use crate::{
    data::dataset::Dataset,
    error::{Error, Result},
    metrics::confusion::ClassificationMetrics,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Naive Bayes over categorical attributes with additive smoothing.
#[derive(Clone, Debug)]
pub struct CategoricalNB {
    alpha: f64,
    label_index: usize,
    width: usize,
    attributes: Vec<usize>,
    /// Number of distinct training values per attribute, aligned with `attributes`.
    attribute_cardinality: Vec<usize>,
    label_class_count: BTreeMap<String, usize>,
    /// Per label, per attribute value counts aligned with `attributes`.
    feature_class_count: BTreeMap<String, Vec<BTreeMap<String, usize>>>,
    total: usize,
}

impl Default for CategoricalNB {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassificationMetrics for CategoricalNB {}

impl CategoricalNB {
    pub fn new() -> Self {
        Self {
            alpha: 1.0,
            label_index: 0,
            width: 0,
            attributes: Vec::new(),
            attribute_cardinality: Vec::new(),
            label_class_count: BTreeMap::new(),
            feature_class_count: BTreeMap::new(),
            total: 0,
        }
    }

    /// Creates a model with a custom smoothing strength.
    ///
    /// # Errors
    ///
    /// Fails if `alpha` isn't a finite, positive number.
    pub fn with_alpha(alpha: f64) -> Result<Self> {
        let mut model = Self::new();
        model.set_alpha(alpha)?;
        Ok(model)
    }

    pub fn set_alpha(&mut self, alpha: f64) -> Result<()> {
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(Error::InvalidParameter(
                "The smoothing parameter must be a finite, positive number.".into(),
            ));
        }
        self.alpha = alpha;
        Ok(())
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn label_class_count(&self) -> &BTreeMap<String, usize> {
        &self.label_class_count
    }

    pub fn feature_class_count(&self) -> &BTreeMap<String, Vec<BTreeMap<String, usize>>> {
        &self.feature_class_count
    }

    pub fn fit(&mut self, dataset: &Dataset) -> Result<String> {
        let attributes = dataset.attribute_indices();

        let mut label_class_count = BTreeMap::new();
        let mut feature_class_count: BTreeMap<String, Vec<BTreeMap<String, usize>>> =
            BTreeMap::new();
        let mut values = vec![BTreeSet::new(); attributes.len()];

        for record in dataset.records() {
            let label = &record[dataset.label_index()];
            *label_class_count.entry(label.clone()).or_insert(0) += 1;

            let class_counts = feature_class_count
                .entry(label.clone())
                .or_insert_with(|| vec![BTreeMap::new(); attributes.len()]);
            for (slot, &attribute) in attributes.iter().enumerate() {
                let value = &record[attribute];
                *class_counts[slot].entry(value.clone()).or_insert(0) += 1;
                values[slot].insert(value.as_str());
            }
        }

        self.attribute_cardinality = values.iter().map(BTreeSet::len).collect();
        self.label_index = dataset.label_index();
        self.width = dataset.width();
        self.attributes = attributes;
        self.label_class_count = label_class_count;
        self.feature_class_count = feature_class_count;
        self.total = dataset.nrows();

        info!(
            records = self.total,
            labels = self.label_class_count.len(),
            "Fitted categorical naive Bayes"
        );
        Ok("Finished fitting".into())
    }

    /// Most probable label for one record.
    ///
    /// Accepts full width records or attribute-only records, like
    /// [`crate::trees::classifier::Id3Classifier::classify`].
    pub fn predict_single<S: AsRef<str>>(&self, record: &[S]) -> Result<String> {
        if self.label_class_count.is_empty() {
            return Err(Error::NotFitted);
        }
        let full_width = if record.len() == self.width {
            true
        } else if record.len() + 1 == self.width {
            false
        } else {
            return Err(Error::RecordWidth {
                expected: self.width - 1,
                found: record.len(),
            });
        };

        let mut max_prob = f64::NEG_INFINITY;
        let mut max_class = None;

        for (y_class, &class_count) in &self.label_class_count {
            let feature_counts = self
                .feature_class_count
                .get(y_class)
                .ok_or(Error::NotFitted)?;
            let mut prob = (class_count as f64 / self.total as f64).ln();

            for (slot, &attribute) in self.attributes.iter().enumerate() {
                let position = if full_width || attribute < self.label_index {
                    attribute
                } else {
                    attribute - 1
                };
                let count = feature_counts[slot]
                    .get(record[position].as_ref())
                    .copied()
                    .unwrap_or(0);
                let cardinality = self.attribute_cardinality[slot] as f64;
                prob += ((count as f64 + self.alpha)
                    / (class_count as f64 + self.alpha * cardinality))
                    .ln();
            }

            if prob > max_prob {
                max_prob = prob;
                max_class = Some(y_class);
            }
        }

        max_class.cloned().ok_or(Error::NotFitted)
    }

    pub fn predict<R: AsRef<[String]>>(&self, records: &[R]) -> Result<Vec<String>> {
        records
            .iter()
            .map(|record| self.predict_single(record.as_ref()))
            .collect()
    }
}
