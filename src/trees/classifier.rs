//! ID3 Decision Tree Classifier
use super::{
    criterion::{label_counts, EntropyCriterion},
    node::{NodeId, TreeNode},
    params::{EntropyBase, Id3Params, UnseenValuePolicy},
};
use crate::{
    data::dataset::Dataset,
    error::{Error, Result},
    metrics::confusion::ClassificationMetrics,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

const ROOT: NodeId = 0;

/// Decision tree over categorical attributes, grown with information gain.
///
/// Every node lives in an arena owned by the classifier; children are
/// reached through their branch value and parents through a plain index.
#[derive(Clone, Debug, Default)]
pub struct Id3Classifier {
    nodes: Vec<TreeNode>,
    params: Id3Params,
    label_index: usize,
    width: usize,
    attribute_names: Vec<String>,
}

impl ClassificationMetrics for Id3Classifier {}

impl Id3Classifier {
    /// Creates a new classifier with default parameters.
    pub fn new() -> Self {
        Self::with_params(Id3Params::new())
    }

    pub fn with_params(params: Id3Params) -> Self {
        Self {
            nodes: Vec::new(),
            params,
            label_index: 0,
            width: 0,
            attribute_names: Vec::new(),
        }
    }

    pub fn params(&self) -> &Id3Params {
        &self.params
    }

    pub fn set_entropy_base(&mut self, entropy_base: EntropyBase) {
        self.params.set_entropy_base(entropy_base)
    }

    pub fn set_unseen_value(&mut self, unseen_value: UnseenValuePolicy) {
        self.params.set_unseen_value(unseen_value)
    }

    pub fn set_min_gain(&mut self, min_gain: f64) -> Result<()> {
        self.params.set_min_gain(min_gain)
    }

    /// Builds the decision tree from a dataset.
    ///
    /// Any previously built tree is discarded. The tree only replaces the old
    /// one once it is complete. Empty or ragged record sets never get here,
    /// [`Dataset::new`] rejects them with [`Error::InvalidDataset`].
    pub fn fit(&mut self, dataset: &Dataset) -> Result<String> {
        let criterion = EntropyCriterion::new(
            self.params.entropy_base(),
            dataset.distinct_labels().len(),
        );
        let candidates = dataset.attribute_indices();
        info!(
            records = dataset.nrows(),
            attributes = candidates.len(),
            labels = criterion.training_labels(),
            "Building ID3 tree"
        );

        let mut builder = Self::with_params(self.params.clone());
        builder.label_index = dataset.label_index();
        builder.width = dataset.width();
        builder.attribute_names = (0..dataset.width())
            .map(|index| dataset.attribute_name(index))
            .collect();
        builder.build_tree(
            dataset,
            &criterion,
            (0..dataset.nrows()).collect(),
            &candidates,
            None,
            None,
        );
        *self = builder;

        info!(
            nodes = self.n_nodes(),
            leaves = self.n_leaves(),
            depth = self.depth(),
            "Finished building the tree"
        );
        Ok("Finished building the tree.".into())
    }

    fn build_tree(
        &mut self,
        dataset: &Dataset,
        criterion: &EntropyCriterion,
        rows: Vec<usize>,
        candidates: &[usize],
        parent: Option<NodeId>,
        branch_value: Option<String>,
    ) -> NodeId {
        let used = self.ancestor_attributes(parent);
        let depth = parent.map_or(0, |parent| self.nodes[parent].depth + 1);

        let subset = rows.iter().map(|&row| dataset.record(row)).collect::<Vec<_>>();
        let counts = label_counts(&subset, self.label_index);
        let entropy = criterion.entropy_of_counts(&counts, subset.len());
        let owned_counts = counts
            .iter()
            .map(|(&label, &count)| (label.to_string(), count))
            .collect();

        let id = self.nodes.len();
        self.nodes.push(TreeNode::new(
            parent,
            branch_value,
            depth,
            rows.clone(),
            entropy,
            owned_counts,
        ));

        if entropy == 0.0 {
            return self.make_leaf(id);
        }

        let mut best: Option<(usize, f64)> = None;
        for &attribute in candidates.iter().filter(|&&attribute| !used.contains(&attribute)) {
            let gain = criterion.gain(&subset, attribute, entropy, self.label_index);
            if gain <= self.params.min_gain() {
                continue;
            }
            if best.map_or(true, |(_, best_gain)| gain > best_gain + self.params.min_gain()) {
                best = Some((attribute, gain));
            }
        }

        let (attribute, gain) = match best {
            Some(split) => split,
            None => return self.make_leaf(id),
        };
        debug!(
            node = id,
            depth,
            attribute = %self.attribute_names[attribute],
            gain,
            "Splitting node"
        );

        // descendants read this while excluding used attributes
        self.nodes[id].attribute = Some(attribute);

        let mut children = BTreeMap::new();
        for (value, partition) in dataset.partition(&rows, attribute) {
            let child = self.build_tree(
                dataset,
                criterion,
                partition,
                candidates,
                Some(id),
                Some(value.to_string()),
            );
            children.insert(value.to_string(), child);
        }
        self.nodes[id].children = children;

        id
    }

    fn make_leaf(&mut self, id: NodeId) -> NodeId {
        let node = &mut self.nodes[id];
        node.label = Some(node.majority_label.clone());
        debug!(
            node = id,
            depth = node.depth,
            label = %node.majority_label,
            samples = node.samples.len(),
            "Created leaf"
        );
        id
    }

    /// Split attributes on the path from `node` up to the root.
    fn ancestor_attributes(&self, node: Option<NodeId>) -> BTreeSet<usize> {
        let mut used = BTreeSet::new();
        let mut cursor = node;
        while let Some(id) = cursor {
            if let Some(attribute) = self.nodes[id].attribute {
                used.insert(attribute);
            }
            cursor = self.nodes[id].parent;
        }
        used
    }

    /// Walks the tree for one record and returns the predicted label.
    ///
    /// The record may either carry every field of the training schema (the
    /// label field is ignored) or only the attribute fields in schema order.
    ///
    /// # Errors
    ///
    /// * [`Error::NotFitted`] if the tree wasn't built yet.
    /// * [`Error::RecordWidth`] if the record matches neither layout.
    /// * [`Error::UnclassifiableRecord`] if the record holds a value no branch
    ///   was trained on and the unseen value policy is `Error`.
    pub fn classify<S: AsRef<str>>(&self, record: &[S]) -> Result<String> {
        let mut node = self.nodes.get(ROOT).ok_or(Error::NotFitted)?;

        while let Some(attribute) = node.attribute {
            let value = self.value_at(record, attribute)?;
            match node.children.get(value) {
                Some(&child) => node = &self.nodes[child],
                None => {
                    return match self.params.unseen_value() {
                        UnseenValuePolicy::MajorityFallback => Ok(node.majority_label.clone()),
                        UnseenValuePolicy::Error => Err(Error::UnclassifiableRecord {
                            attribute,
                            value: value.to_string(),
                        }),
                    }
                }
            }
        }

        Ok(node
            .label
            .clone()
            .unwrap_or_else(|| node.majority_label.clone()))
    }

    /// Predicts the labels for a batch of records, see [`Self::classify`].
    pub fn predict<R: AsRef<[String]>>(&self, records: &[R]) -> Result<Vec<String>> {
        records
            .iter()
            .map(|record| self.classify(record.as_ref()))
            .collect()
    }

    fn value_at<'r, S: AsRef<str>>(&self, record: &'r [S], attribute: usize) -> Result<&'r str> {
        let position = if record.len() == self.width {
            attribute
        } else if record.len() + 1 == self.width {
            if attribute > self.label_index {
                attribute - 1
            } else {
                attribute
            }
        } else {
            return Err(Error::RecordWidth {
                expected: self.width - 1,
                found: record.len(),
            });
        };
        Ok(record[position].as_ref())
    }

    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.nodes.get(ROOT)
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<&TreeNode> {
        self.node(id)?.parent.and_then(|parent| self.node(parent))
    }

    /// Children of a node keyed by branch value, in sort order.
    pub fn children(&self, id: NodeId) -> Vec<(&str, NodeId)> {
        self.node(id)
            .map(|node| {
                node.children
                    .iter()
                    .map(|(value, &child)| (value.as_str(), child))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Length of the longest root to leaf path.
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    pub fn label_index(&self) -> usize {
        self.label_index
    }

    /// Column name of a schema position, as seen during training.
    pub fn attribute_name(&self, index: usize) -> String {
        self.attribute_names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("attr{}", index))
    }
}
