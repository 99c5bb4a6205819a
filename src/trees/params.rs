use crate::error::{Error, Result};

/// Logarithm base used by the entropy computation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntropyBase {
    /// Number of distinct labels in the whole training set.
    #[default]
    TrainingLabels,
    /// Number of distinct labels in the subset being measured.
    NodeLabels,
    /// Base 2.
    Bits,
}

impl EntropyBase {
    /// Resolves the numeric base for a subset with `node_labels` distinct labels.
    pub fn resolve(&self, training_labels: usize, node_labels: usize) -> f64 {
        match self {
            EntropyBase::TrainingLabels => training_labels as f64,
            EntropyBase::NodeLabels => node_labels as f64,
            EntropyBase::Bits => 2.0,
        }
    }
}

/// What to do when a record reaches a node without a branch for its value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnseenValuePolicy {
    /// Answer with the majority label of the node where the walk stopped.
    #[default]
    MajorityFallback,
    /// Fail with [`Error::UnclassifiableRecord`].
    Error,
}

#[derive(Clone, Debug)]
pub struct Id3Params {
    pub entropy_base: EntropyBase,
    pub unseen_value: UnseenValuePolicy,
    pub min_gain: f64,
}

impl Default for Id3Params {
    fn default() -> Self {
        Self::new()
    }
}

impl Id3Params {
    pub fn new() -> Self {
        Self {
            entropy_base: EntropyBase::default(),
            unseen_value: UnseenValuePolicy::default(),
            min_gain: 1e-12,
        }
    }

    pub fn set_entropy_base(&mut self, entropy_base: EntropyBase) {
        self.entropy_base = entropy_base;
    }

    pub fn set_unseen_value(&mut self, unseen_value: UnseenValuePolicy) {
        self.unseen_value = unseen_value;
    }

    pub fn set_min_gain(&mut self, min_gain: f64) -> Result<()> {
        if !min_gain.is_finite() || min_gain < 0.0 {
            return Err(Error::InvalidParameter(
                "The minimum gain must be a finite, non-negative number.".into(),
            ));
        }
        self.min_gain = min_gain;
        Ok(())
    }

    pub fn entropy_base(&self) -> EntropyBase {
        self.entropy_base
    }

    pub fn unseen_value(&self) -> UnseenValuePolicy {
        self.unseen_value
    }

    pub fn min_gain(&self) -> f64 {
        self.min_gain
    }
}
