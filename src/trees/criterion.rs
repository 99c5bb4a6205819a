//! Entropy and information gain over categorical labels.
use super::params::EntropyBase;
use std::collections::BTreeMap;

/// Gain reported for a subset whose records all share one label.
///
/// Distinguishes "nothing left to split" from a computed gain of zero.
pub const PURE_GAIN: f64 = 1.0;

/// Counts how often each label occurs at `label_index`.
pub fn label_counts<R: AsRef<[String]>>(records: &[R], label_index: usize) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts
            .entry(record.as_ref()[label_index].as_str())
            .or_insert(0) += 1;
    }
    counts
}

/// `-Σ p·log_base(p)` over label counts summing to `total`.
///
/// Pure subsets, empty subsets and degenerate bases all yield `0.0`.
pub fn entropy_from_counts<I>(counts: I, total: usize, base: f64) -> f64
where
    I: IntoIterator<Item = usize>,
{
    let counts = counts.into_iter().filter(|&count| count > 0).collect::<Vec<_>>();
    if total == 0 || counts.len() <= 1 || base <= 1.0 {
        return 0.0;
    }

    let ln_base = base.ln();
    counts.iter().fold(0.0, |acc, &count| {
        let p = count as f64 / total as f64;
        acc - p * p.ln() / ln_base
    })
}

/// Entropy engine bound to a training set's label alphabet.
#[derive(Clone, Copy, Debug)]
pub struct EntropyCriterion {
    base: EntropyBase,
    training_labels: usize,
}

impl EntropyCriterion {
    pub fn new(base: EntropyBase, training_labels: usize) -> Self {
        Self {
            base,
            training_labels,
        }
    }

    pub fn training_labels(&self) -> usize {
        self.training_labels
    }

    /// Impurity of the records' label distribution.
    pub fn entropy<R: AsRef<[String]>>(&self, records: &[R], label_index: usize) -> f64 {
        let counts = label_counts(records, label_index);
        self.entropy_of_counts(&counts, records.len())
    }

    pub fn entropy_of_counts(&self, counts: &BTreeMap<&str, usize>, total: usize) -> f64 {
        let base = self.base.resolve(self.training_labels, counts.len());
        entropy_from_counts(counts.values().copied(), total, base)
    }

    /// Information gain of splitting `records` on `attribute`.
    ///
    /// Returns [`PURE_GAIN`] when the records carry a single label.
    pub fn gain<R: AsRef<[String]>>(
        &self,
        records: &[R],
        attribute: usize,
        parent_entropy: f64,
        label_index: usize,
    ) -> f64 {
        if label_counts(records, label_index).len() <= 1 {
            return PURE_GAIN;
        }

        let mut partitions: BTreeMap<&str, Vec<&[String]>> = BTreeMap::new();
        for record in records {
            let record = record.as_ref();
            partitions
                .entry(record[attribute].as_str())
                .or_default()
                .push(record);
        }

        let total = records.len() as f64;
        let weighted = partitions.values().fold(0.0, |acc, partition| {
            let weight = partition.len() as f64 / total;
            acc + weight * self.entropy(partition, label_index)
        });

        parent_entropy - weighted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn records(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|value| value.to_string()).collect())
            .collect()
    }

    fn example() -> Vec<Vec<String>> {
        records(&[
            &["A", "X", "yes"],
            &["A", "Y", "no"],
            &["B", "X", "no"],
            &["B", "Y", "no"],
        ])
    }

    #[test]
    fn test_entropy_single_label_is_zero() {
        let criterion = EntropyCriterion::new(EntropyBase::TrainingLabels, 3);
        let data = records(&[&["A", "no"], &["B", "no"], &["C", "no"]]);
        assert_eq!(criterion.entropy(&data, 1), 0.0);
    }

    #[test]
    fn test_entropy_uniform_is_one() {
        let criterion = EntropyCriterion::new(EntropyBase::TrainingLabels, 3);
        let data = records(&[&["a"], &["b"], &["c"], &["a"], &["b"], &["c"]]);
        assert_relative_eq!(criterion.entropy(&data, 0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_entropy_training_base() {
        let criterion = EntropyCriterion::new(EntropyBase::TrainingLabels, 2);
        assert_relative_eq!(criterion.entropy(&example(), 2), 0.811278, epsilon = 1e-6);

        let subset = records(&[&["A", "no"], &["B", "yes"], &["B", "no"]]);
        assert_relative_eq!(criterion.entropy(&subset, 1), 0.918296, epsilon = 1e-6);
    }

    #[test]
    fn test_entropy_training_base_on_unbalanced_subset() {
        // two of the four training labels present
        let training = EntropyCriterion::new(EntropyBase::TrainingLabels, 4);
        let local = EntropyCriterion::new(EntropyBase::NodeLabels, 4);
        let subset = records(&[&["acc"], &["unacc"]]);
        assert_relative_eq!(training.entropy(&subset, 0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(local.entropy(&subset, 0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_entropy_from_counts_edge_cases() {
        assert_eq!(entropy_from_counts(Vec::<usize>::new(), 0, 2.0), 0.0);
        assert_eq!(entropy_from_counts(vec![5, 0], 5, 2.0), 0.0);
        assert_eq!(entropy_from_counts(vec![1, 1], 2, 1.0), 0.0);
        assert_relative_eq!(entropy_from_counts(vec![1, 1], 2, 2.0), 1.0);
    }

    #[test]
    fn test_gain_example() {
        let criterion = EntropyCriterion::new(EntropyBase::TrainingLabels, 2);
        let data = example();
        let parent = criterion.entropy(&data, 2);
        let gain_first = criterion.gain(&data, 0, parent, 2);
        let gain_second = criterion.gain(&data, 1, parent, 2);
        assert_relative_eq!(gain_first, parent - 0.5, epsilon = 1e-12);
        assert!(gain_first >= gain_second);
    }

    #[test]
    fn test_gain_pure_subset_sentinel() {
        let criterion = EntropyCriterion::new(EntropyBase::TrainingLabels, 2);
        let data = records(&[&["A", "no"], &["B", "no"]]);
        assert_eq!(criterion.gain(&data, 0, 0.0, 1), PURE_GAIN);
    }

    #[test]
    fn test_gain_non_negative_when_aligned() {
        let criterion = EntropyCriterion::new(EntropyBase::TrainingLabels, 3);
        let data = records(&[
            &["r", "1", "a"],
            &["r", "2", "a"],
            &["g", "1", "b"],
            &["b", "2", "c"],
            &["b", "1", "c"],
        ]);
        let parent = criterion.entropy(&data, 2);
        for attribute in 0..2 {
            assert!(criterion.gain(&data, attribute, parent, 2) >= 0.0);
        }
        assert_relative_eq!(criterion.gain(&data, 0, parent, 2), parent, epsilon = 1e-12);
    }

    #[test]
    fn test_label_counts() {
        let data = example();
        let counts = label_counts(&data, 2);
        assert_eq!(counts["no"], 3);
        assert_eq!(counts["yes"], 1);
    }
}
