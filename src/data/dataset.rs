use crate::error::{Error, Result};
use csv::{ReaderBuilder, Trim};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Debug, Formatter};
use std::io;
use std::path::Path;

/// A single row of categorical values, label included.
pub type Record = Vec<String>;

/// Labeled categorical records sharing one schema.
///
/// Every record has the same number of fields and the label sits at
/// `label_index` in each of them.
#[derive(Clone)]
pub struct Dataset {
    records: Vec<Record>,
    label_index: usize,
    attribute_names: Option<Vec<String>>,
}

impl Debug for Dataset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset {{\n    label_index: {},\n    records: [\n", self.label_index)?;

        for record in &self.records {
            writeln!(f, "        [{}],", record.join(", "))?;
        }

        write!(f, "    ]\n}}")
    }
}

impl Dataset {
    /// Creates a dataset from raw records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDataset`] if there are no records, if the records
    /// differ in width or if `label_index` is outside the records.
    pub fn new(records: Vec<Record>, label_index: usize) -> Result<Self> {
        let width = match records.first() {
            Some(first) => first.len(),
            None => return Err(Error::InvalidDataset("dataset has no records".into())),
        };
        if label_index >= width {
            return Err(Error::InvalidDataset(format!(
                "label index {} is outside records of width {}",
                label_index, width
            )));
        }
        if let Some((row, record)) = records
            .iter()
            .enumerate()
            .find(|(_, record)| record.len() != width)
        {
            return Err(Error::InvalidDataset(format!(
                "record {} has {} fields, expected {}",
                row,
                record.len(),
                width
            )));
        }

        Ok(Self {
            records,
            label_index,
            attribute_names: None,
        })
    }

    /// Attaches column names, one per field (label column included).
    pub fn with_attribute_names(mut self, names: Vec<String>) -> Result<Self> {
        if names.len() != self.width() {
            return Err(Error::InvalidDataset(format!(
                "{} column names given for records of width {}",
                names.len(),
                self.width()
            )));
        }
        self.attribute_names = Some(names);
        Ok(self)
    }

    /// Reads comma separated records.
    ///
    /// When `has_headers` is set the first row names the columns. The label
    /// defaults to the last column. Values are kept verbatim unless `trim` is
    /// set, in which case surrounding whitespace is stripped from every field
    /// and header.
    pub fn from_reader<R: io::Read>(
        reader: R,
        has_headers: bool,
        label_index: Option<usize>,
        trim: bool,
    ) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(has_headers)
            .trim(if trim { Trim::All } else { Trim::None })
            .flexible(true)
            .from_reader(reader);

        let headers = if has_headers {
            Some(
                reader
                    .headers()?
                    .iter()
                    .map(str::to_string)
                    .collect::<Vec<_>>(),
            )
        } else {
            None
        };

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            records.push(record.iter().map(str::to_string).collect::<Record>());
        }

        let width = records.first().map_or(0, Vec::len);
        let label_index = label_index.unwrap_or(width.saturating_sub(1));
        let dataset = Self::new(records, label_index)?;

        match headers {
            Some(names) => dataset.with_attribute_names(names),
            None => Ok(dataset),
        }
    }

    /// Reads a CSV file, see [`Dataset::from_reader`].
    pub fn from_csv_path<P: AsRef<Path>>(
        path: P,
        has_headers: bool,
        label_index: Option<usize>,
        trim: bool,
    ) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(io::BufReader::new(file), has_headers, label_index, trim)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, row: usize) -> &Record {
        &self.records[row]
    }

    pub fn nrows(&self) -> usize {
        self.records.len()
    }

    /// Number of fields in every record, label included.
    pub fn width(&self) -> usize {
        self.records[0].len()
    }

    pub fn label_index(&self) -> usize {
        self.label_index
    }

    /// Positions of every field except the label, ascending.
    pub fn attribute_indices(&self) -> Vec<usize> {
        (0..self.width())
            .filter(|&index| index != self.label_index)
            .collect()
    }

    pub fn label(&self, row: usize) -> &str {
        &self.records[row][self.label_index]
    }

    pub fn labels(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| record[self.label_index].clone())
            .collect()
    }

    /// Distinct label values in sort order.
    pub fn distinct_labels(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| record[self.label_index].as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Column name of a field, `attr<index>` when the data had no header.
    pub fn attribute_name(&self, index: usize) -> String {
        self.attribute_names
            .as_ref()
            .and_then(|names| names.get(index).cloned())
            .unwrap_or_else(|| format!("attr{}", index))
    }

    /// Records without their label field, in schema order.
    pub fn features(&self) -> Vec<Record> {
        self.records
            .iter()
            .map(|record| {
                record
                    .iter()
                    .enumerate()
                    .filter(|&(index, _)| index != self.label_index)
                    .map(|(_, value)| value.clone())
                    .collect()
            })
            .collect()
    }

    /// Groups the given rows by their value at `attribute`.
    pub fn partition(&self, rows: &[usize], attribute: usize) -> BTreeMap<&str, Vec<usize>> {
        let mut partitions: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for &row in rows {
            partitions
                .entry(self.records[row][attribute].as_str())
                .or_default()
                .push(row);
        }
        partitions
    }

    /// Shuffles the records and splits them into a training and a test set.
    ///
    /// # Errors
    ///
    /// Fails if `train_size` is outside `[0, 1]` or if either side ends up empty.
    pub fn train_test_split(&self, train_size: f64, seed: Option<u64>) -> Result<(Self, Self)> {
        if !(0.0..=1.0).contains(&train_size) {
            return Err(Error::InvalidParameter(
                "Train size should be between 0.0 and 1.0".into(),
            ));
        }
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut indices = (0..self.nrows()).collect::<Vec<_>>();
        indices.shuffle(&mut rng);
        let train_size = (self.nrows() as f64 * train_size).floor() as usize;

        let select = |rows: &[usize]| -> Result<Self> {
            let records = rows
                .iter()
                .map(|&row| self.records[row].clone())
                .collect::<Vec<_>>();
            let mut dataset = Self::new(records, self.label_index)?;
            dataset.attribute_names = self.attribute_names.clone();
            Ok(dataset)
        };

        Ok((select(&indices[..train_size])?, select(&indices[train_size..])?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(values: &[&str]) -> Record {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn sample() -> Dataset {
        Dataset::new(
            vec![
                record(&["A", "X", "yes"]),
                record(&["A", "Y", "no"]),
                record(&["B", "X", "no"]),
                record(&["B", "Y", "no"]),
            ],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_dataset_new() {
        let dataset = sample();
        assert_eq!(dataset.nrows(), 4);
        assert_eq!(dataset.width(), 3);
        assert_eq!(dataset.attribute_indices(), vec![0, 1]);
        assert_eq!(dataset.label(0), "yes");
    }

    #[test]
    fn test_dataset_empty() {
        let result = Dataset::new(vec![], 0);
        assert!(matches!(result, Err(Error::InvalidDataset(_))));
    }

    #[test]
    fn test_dataset_inconsistent_width() {
        let result = Dataset::new(vec![record(&["A", "X", "yes"]), record(&["A", "no"])], 2);
        assert!(matches!(result, Err(Error::InvalidDataset(_))));
    }

    #[test]
    fn test_dataset_label_out_of_range() {
        let result = Dataset::new(vec![record(&["A", "yes"])], 2);
        assert!(matches!(result, Err(Error::InvalidDataset(_))));
    }

    #[test]
    fn test_dataset_distinct_labels_sorted() {
        assert_eq!(sample().distinct_labels(), vec!["no", "yes"]);
    }

    #[test]
    fn test_dataset_features_drop_label() {
        let dataset = Dataset::new(vec![record(&["yes", "A", "X"])], 0).unwrap();
        assert_eq!(dataset.features(), vec![record(&["A", "X"])]);
    }

    #[test]
    fn test_dataset_partition() {
        let dataset = sample();
        let partitions = dataset.partition(&[0, 1, 2, 3], 0);
        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions["A"], vec![0, 1]);
        assert_eq!(partitions["B"], vec![2, 3]);
    }

    #[test]
    fn test_dataset_formatting() {
        let dataset = Dataset::new(vec![record(&["A", "yes"])], 1).unwrap();
        let expected = "\
Dataset {
    label_index: 1,
    records: [
        [A, yes],
    ]
}";
        assert_eq!(format!("{:?}", dataset), expected);
    }

    #[test]
    fn test_dataset_from_reader_with_header() {
        let data = "buying,safety,class\nvhigh,low,unacc\n\nlow,high,acc\n";
        let dataset = Dataset::from_reader(data.as_bytes(), true, None, false).unwrap();
        assert_eq!(dataset.nrows(), 2);
        assert_eq!(dataset.label_index(), 2);
        assert_eq!(dataset.record(0), &record(&["vhigh", "low", "unacc"]));
        assert_eq!(dataset.attribute_name(1), "safety");
    }

    #[test]
    fn test_dataset_from_reader_keeps_whitespace() {
        let data = "vhigh, low ,unacc\nlow,low,acc\n";
        let dataset = Dataset::from_reader(data.as_bytes(), false, None, false).unwrap();
        assert_eq!(dataset.record(0), &record(&["vhigh", " low ", "unacc"]));
        assert_eq!(dataset.partition(&[0, 1], 1).len(), 2);
    }

    #[test]
    fn test_dataset_from_reader_trimmed() {
        let data = "buying , safety,class\nvhigh, low ,unacc\nlow,low,acc\n";
        let dataset = Dataset::from_reader(data.as_bytes(), true, None, true).unwrap();
        assert_eq!(dataset.record(0), &record(&["vhigh", "low", "unacc"]));
        assert_eq!(dataset.partition(&[0, 1], 1).len(), 1);
        assert_eq!(dataset.attribute_name(0), "buying");
        assert_eq!(dataset.attribute_name(1), "safety");
    }

    #[test]
    fn test_dataset_from_reader_without_header() {
        let data = "vhigh,low,unacc\nlow,high,acc\n";
        let dataset = Dataset::from_reader(data.as_bytes(), false, None, false).unwrap();
        assert_eq!(dataset.nrows(), 2);
        assert_eq!(dataset.attribute_name(1), "attr1");
    }

    #[test]
    fn test_dataset_from_reader_ragged() {
        let data = "vhigh,low,unacc\nlow,acc\n";
        let result = Dataset::from_reader(data.as_bytes(), false, None, false);
        assert!(matches!(result, Err(Error::InvalidDataset(_))));
    }

    #[test]
    fn test_dataset_train_test_split() {
        let (train, test) = sample().train_test_split(0.75, Some(42)).unwrap();
        assert_eq!(train.nrows(), 3);
        assert_eq!(test.nrows(), 1);
    }

    #[test]
    fn test_dataset_train_test_split_is_seeded() {
        let (first, _) = sample().train_test_split(0.5, Some(7)).unwrap();
        let (second, _) = sample().train_test_split(0.5, Some(7)).unwrap();
        assert_eq!(first.records(), second.records());
    }

    #[test]
    fn test_dataset_train_test_split_invalid_size() {
        assert!(sample().train_test_split(1.5, None).is_err());
    }
}
