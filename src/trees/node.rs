use std::collections::BTreeMap;

/// Index of a node inside its tree.
pub type NodeId = usize;

/// Decision tree node
///
/// A node is a leaf iff it has no children. `parent` is a plain index and
/// never owns anything, the tree arena owns every node.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode {
    pub parent: Option<NodeId>,
    /// Value of the parent's split attribute that routes records here.
    pub branch_value: Option<String>,
    pub depth: usize,
    /// Training rows routed to this node.
    pub samples: Vec<usize>,
    pub entropy: f64,
    pub label_counts: BTreeMap<String, usize>,
    /// Most frequent label, lowest in sort order on ties.
    pub majority_label: String,
    pub attribute: Option<usize>,
    pub children: BTreeMap<String, NodeId>,
    pub label: Option<String>,
}

impl TreeNode {
    pub fn new(
        parent: Option<NodeId>,
        branch_value: Option<String>,
        depth: usize,
        samples: Vec<usize>,
        entropy: f64,
        label_counts: BTreeMap<String, usize>,
    ) -> Self {
        let majority_label = majority_label(&label_counts);
        Self {
            parent,
            branch_value,
            depth,
            samples,
            entropy,
            label_counts,
            majority_label,
            attribute: None,
            children: BTreeMap::new(),
            label: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Label counts rendered as `label:count` pairs.
    pub fn classes(&self) -> String {
        self.label_counts
            .iter()
            .map(|(label, count)| format!("{}:{}", label, count))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Most frequent label; ties go to the label that sorts first.
pub fn majority_label(counts: &BTreeMap<String, usize>) -> String {
    let mut best: Option<(&String, usize)> = None;
    for (label, &count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label.clone()).unwrap_or_default()
}
