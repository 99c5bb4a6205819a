use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
};

use nalgebra::DMatrix;

use crate::error::{Error, Result};

/// Counts of actual (rows) against predicted (columns) labels.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfusionMatrix {
    /// Labels in sort order, indexing both rows and columns.
    pub classes: Vec<String>,
    pub counts: DMatrix<usize>,
}

impl ConfusionMatrix {
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Number of records counted.
    pub fn total(&self) -> usize {
        self.counts.sum()
    }

    /// Records whose prediction matched the actual label.
    pub fn correct(&self) -> usize {
        self.counts.diagonal().sum()
    }
}

impl Display for ConfusionMatrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(String::len)
            .chain(self.counts.iter().map(|count| count.to_string().len()))
            .chain(std::iter::once("actual\\predicted".len()))
            .max()
            .unwrap_or(0);

        write!(f, "{:>width$}", "actual\\predicted", width = width)?;
        for class in &self.classes {
            write!(f, " {:>width$}", class, width = width)?;
        }
        writeln!(f)?;

        for (row, class) in self.classes.iter().enumerate() {
            write!(f, "{:>width$}", class, width = width)?;
            for col in 0..self.classes.len() {
                write!(f, " {:>width$}", self.counts[(row, col)], width = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub trait ClassificationMetrics {
    /// Computes the confusion matrix based on the true labels and predicted labels.
    ///
    /// # Arguments
    ///
    /// * `y_true` - The true labels.
    /// * `y_pred` - The predicted labels.
    ///
    /// # Returns
    ///
    /// The confusion matrix as a `Result` containing a `ConfusionMatrix` or an error message.
    fn confusion_matrix(&self, y_true: &[String], y_pred: &[String]) -> Result<ConfusionMatrix> {
        if y_true.len() != y_pred.len() {
            return Err(Error::LengthMismatch {
                expected: y_true.len(),
                found: y_pred.len(),
            });
        }

        let classes = y_true
            .iter()
            .chain(y_pred.iter())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();

        let mut counts = DMatrix::zeros(classes.len(), classes.len());

        for (y_t, y_p) in y_true.iter().zip(y_pred.iter()) {
            let (Ok(matrix_row), Ok(matrix_col)) =
                (classes.binary_search(y_t), classes.binary_search(y_p))
            else {
                continue;
            };
            counts[(matrix_row, matrix_col)] += 1;
        }

        Ok(ConfusionMatrix { classes, counts })
    }

    /// Computes the accuracy based on the true labels and predicted labels.
    fn accuracy(&self, y_true: &[String], y_pred: &[String]) -> Result<f64> {
        let matrix = self.confusion_matrix(y_true, y_pred)?;
        if matrix.total() == 0 {
            return Err(Error::UndefinedMetric(
                "Accuracy of an empty prediction set is undefined.".into(),
            ));
        }

        Ok(matrix.correct() as f64 / matrix.total() as f64)
    }

    /// Computes the precision based on the true labels and predicted labels.
    ///
    /// With two classes the one sorting last is the positive class, otherwise
    /// the macro average over all classes is returned.
    fn precision(&self, y_true: &[String], y_pred: &[String]) -> Result<f64> {
        let matrix = self.confusion_matrix(y_true, y_pred)?.counts;

        let num_classes = matrix.nrows();

        if num_classes == 2 {
            let tp = matrix[(1, 1)];
            let fp = matrix[(0, 1)];

            if tp + fp > 0 {
                return Ok(tp as f64 / (tp + fp) as f64);
            }
        }

        let mut precision_total = 0.0;
        for class in 0..num_classes {
            let tp = matrix[(class, class)];
            let fp = matrix.column(class).sum() - tp;

            if tp + fp > 0 {
                precision_total += tp as f64 / (tp + fp) as f64;
            }
        }

        Ok(precision_total / num_classes.max(1) as f64)
    }

    /// Computes the recall based on the true labels and predicted labels.
    ///
    /// Classes are chosen the same way as in [`ClassificationMetrics::precision`].
    fn recall(&self, y_true: &[String], y_pred: &[String]) -> Result<f64> {
        let matrix = self.confusion_matrix(y_true, y_pred)?.counts;

        let num_classes = matrix.nrows();

        if num_classes == 2 {
            let tp = matrix[(1, 1)];
            let fn_ = matrix[(1, 0)];

            if tp + fn_ > 0 {
                return Ok(tp as f64 / (tp + fn_) as f64);
            }
        }

        let mut recall_total = 0.0;
        for class in 0..num_classes {
            let tp = matrix[(class, class)];
            let fn_ = matrix.row(class).sum() - tp;

            if tp + fn_ > 0 {
                recall_total += tp as f64 / (tp + fn_) as f64;
            }
        }

        Ok(recall_total / num_classes.max(1) as f64)
    }

    /// Computes the F1 score based on the true labels and predicted labels.
    fn f1_score(&self, y_true: &[String], y_pred: &[String]) -> Result<f64> {
        let precision = self.precision(y_true, y_pred)?;
        let recall = self.recall(y_true, y_pred)?;

        match (precision + recall).abs() < f64::EPSILON {
            true => Err(Error::UndefinedMetric(
                "Precision and recall are both 0, F1 score undefined.".into(),
            )),
            false => Ok(2.0 * (precision * recall) / (precision + recall)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct MockClassifier;

    impl ClassificationMetrics for MockClassifier {}

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_confusion_matrix() {
        let y_true = labels(&["yes", "no", "yes", "no", "yes"]);
        let y_pred = labels(&["yes", "yes", "no", "no", "yes"]);

        let result = MockClassifier.confusion_matrix(&y_true, &y_pred).unwrap();

        assert_eq!(result.classes, labels(&["no", "yes"]));
        assert_eq!(result.counts, DMatrix::from_row_slice(2, 2, &[1, 1, 1, 2]));
    }

    #[test]
    fn test_confusion_matrix_unequal() {
        let y_true = labels(&["yes", "no", "yes"]);
        let y_pred = labels(&["yes", "no"]);

        let result = MockClassifier.confusion_matrix(&y_true, &y_pred);

        assert!(matches!(
            result,
            Err(Error::LengthMismatch {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_confusion_matrix_multiclass() {
        let y_true = labels(&["acc", "good", "unacc", "good", "acc", "unacc"]);
        let y_pred = labels(&["acc", "unacc", "good", "good", "acc", "unacc"]);

        let result = MockClassifier.confusion_matrix(&y_true, &y_pred).unwrap();
        let expected = DMatrix::from_row_slice(3, 3, &[2, 0, 0, 0, 1, 1, 0, 1, 1]);

        assert_eq!(result.counts, expected);
        assert_eq!(result.correct(), 4);
    }

    #[test]
    fn test_confusion_matrix_display() {
        let y_true = labels(&["yes", "no"]);
        let y_pred = labels(&["yes", "yes"]);

        let result = MockClassifier.confusion_matrix(&y_true, &y_pred).unwrap();
        let rendered = result.to_string();

        assert_eq!(rendered.lines().count(), 3);
        assert!(rendered.lines().nth(1).unwrap().trim_start().starts_with("no"));
    }

    #[test]
    fn test_accuracy() {
        let y_true = labels(&["yes", "no", "yes", "no", "yes"]);
        let y_pred = labels(&["yes", "yes", "no", "no", "yes"]);

        assert_relative_eq!(MockClassifier.accuracy(&y_true, &y_pred).unwrap(), 0.6);
    }

    #[test]
    fn test_accuracy_empty() {
        assert!(MockClassifier.accuracy(&[], &[]).is_err());
    }

    #[test]
    fn test_precision() {
        let y_true = labels(&["yes", "no", "yes", "no", "yes"]);
        let y_pred = labels(&["yes", "yes", "no", "no", "yes"]);

        let result = MockClassifier.precision(&y_true, &y_pred).unwrap();

        assert_relative_eq!(result, 2.0 / 3.0);
    }

    #[test]
    fn test_precision_no_positive_predictions() {
        let y_true = labels(&["yes", "yes", "yes"]);
        let y_pred = labels(&["no", "no", "no"]);

        assert_eq!(MockClassifier.precision(&y_true, &y_pred).unwrap(), 0.0);
    }

    #[test]
    fn test_precision_multiclass() {
        let y_true = labels(&["acc", "good", "unacc", "good", "acc", "unacc"]);
        let y_pred = labels(&["acc", "unacc", "good", "good", "acc", "unacc"]);

        let result = MockClassifier.precision(&y_true, &y_pred).unwrap();
        let expected = (2.0 / 2.0 + 1.0 / 2.0 + 1.0 / 2.0) / 3.0;

        assert_relative_eq!(result, expected, epsilon = f64::EPSILON);
    }

    #[test]
    fn test_recall() {
        let y_true = labels(&["yes", "no", "yes", "no", "yes"]);
        let y_pred = labels(&["yes", "yes", "no", "no", "yes"]);

        assert_relative_eq!(MockClassifier.recall(&y_true, &y_pred).unwrap(), 2.0 / 3.0);
    }

    #[test]
    fn test_recall_no_true_positives() {
        let y_true = labels(&["yes", "yes", "yes"]);
        let y_pred = labels(&["no", "no", "no"]);

        assert_eq!(MockClassifier.recall(&y_true, &y_pred).unwrap(), 0.0);
    }

    #[test]
    fn test_f1_score() {
        let y_true = labels(&["yes", "no", "yes", "no", "yes"]);
        let y_pred = labels(&["yes", "yes", "no", "no", "yes"]);

        assert_relative_eq!(MockClassifier.f1_score(&y_true, &y_pred).unwrap(), 2.0 / 3.0);
    }

    #[test]
    fn test_f1_score_error() {
        let y_true = labels(&["yes", "yes", "yes"]);
        let y_pred = labels(&["no", "no", "no"]);

        assert!(matches!(
            MockClassifier.f1_score(&y_true, &y_pred),
            Err(Error::UndefinedMetric(_))
        ));
    }
}
