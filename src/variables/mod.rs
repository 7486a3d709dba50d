//! The recursive variable taxonomy.
//!
//! A [`Variables`] tree maps short survey codes to descriptive long names,
//! organized into named categories. Children keep insertion order; each
//! child is either a leaf (`short code -> long name`) or a nested category.
//!
//! Two orientations exist. The as-built tree is keyed by short code and is
//! what [`Variables::flatten`] consumes to produce the column-rename
//! mapping. [`Variables::reorient`] re-keys every leaf by its long name so
//! the tree can be navigated by descriptive names, and
//! [`Variables::invert`] swaps code/name roles outright for reverse
//! lookups. All three preserve the leaf set: no leaf is gained or lost.

mod repository;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use repository::VariableRepository;

/// Short codes beginning with this marker are imputation-flag companions
/// to a sibling variable.
pub const IMPUTATION_FLAG_PREFIX: &str = "F_";

/// Long names of imputation flags carry this marker.
pub const IMPUTATION_FLAG_MARKER: &str = "ImputationFlag";

/// A child of a [`Variables`] tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableNode {
    /// `short code -> long name` (or a nested long-name key after
    /// reorientation).
    Leaf(String),
    /// A named category.
    Tree(Variables),
}

/// An insertion-ordered recursive taxonomy of variable names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables {
    entries: IndexMap<String, VariableNode>,
}

impl Variables {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a flat (single-level) tree from `(code, long_name)` records.
    ///
    /// Records whose long name is empty are kept unrenamed (`code ->
    /// code`), so flattening leaves them untouched.
    #[must_use]
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut tree = Self::new();
        for (code, long_name) in records {
            let value = if long_name.is_empty() {
                code.clone()
            } else {
                long_name
            };
            tree.insert_leaf(code, value);
        }
        tree
    }

    /// Inserts a leaf, replacing any previous child under `key`.
    pub fn insert_leaf(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .insert(key.into(), VariableNode::Leaf(value.into()));
    }

    /// Inserts a nested category, replacing any previous child under `key`.
    pub fn insert_tree(&mut self, key: impl Into<String>, subtree: Variables) {
        self.entries.insert(key.into(), VariableNode::Tree(subtree));
    }

    /// The child under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&VariableNode> {
        self.entries.get(key)
    }

    /// The leaf value under `key`, if the child is a leaf.
    #[must_use]
    pub fn leaf(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(VariableNode::Leaf(value)) => Some(value),
            _ => None,
        }
    }

    /// Iterates the immediate children in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &VariableNode)> {
        self.entries.iter()
    }

    /// Number of immediate children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the tree has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of leaves in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.entries
            .values()
            .map(|node| match node {
                VariableNode::Leaf(_) => 1,
                VariableNode::Tree(subtree) => subtree.leaf_count(),
            })
            .sum()
    }

    /// Collapses the tree into a single-level `code -> long name` mapping
    /// for renaming dataset columns.
    ///
    /// A leaf at depth *n* keeps its original short code as the mapping
    /// key; the value is the long name prefixed with the ancestor category
    /// keys joined by `_`. A leaf that was never renamed (`code ==
    /// long_name`) maps to the bare code, avoiding spurious namespacing.
    #[must_use]
    pub fn flatten(&self) -> IndexMap<String, String> {
        let mut flattened = IndexMap::new();
        self.flatten_into("", &mut flattened);
        flattened
    }

    fn flatten_into(&self, val_prefix: &str, out: &mut IndexMap<String, String>) {
        for (key, node) in &self.entries {
            match node {
                VariableNode::Leaf(value) if key == value => {
                    out.insert(key.clone(), key.clone());
                }
                VariableNode::Leaf(value) => {
                    out.insert(key.clone(), format!("{val_prefix}{value}"));
                }
                VariableNode::Tree(subtree) => {
                    subtree.flatten_into(&format!("{val_prefix}{key}_"), out);
                }
            }
        }
    }

    /// Restructures the tree so every leaf is keyed by its long name and
    /// holds its fully-prefixed flattened name, preserving category
    /// structure. This is the orientation `to_dict` serializes.
    #[must_use]
    pub fn reorient(&self) -> Variables {
        self.reorient_with("")
    }

    fn reorient_with(&self, val_prefix: &str) -> Variables {
        let mut reoriented = Variables::new();
        for (key, node) in &self.entries {
            match node {
                VariableNode::Leaf(value) if key == value => {
                    reoriented.insert_leaf(value.clone(), key.clone());
                }
                VariableNode::Leaf(value) => {
                    reoriented.insert_leaf(value.clone(), format!("{val_prefix}{value}"));
                }
                VariableNode::Tree(subtree) => {
                    reoriented.insert_tree(
                        key.clone(),
                        subtree.reorient_with(&format!("{val_prefix}{key}_")),
                    );
                }
            }
        }
        reoriented
    }

    /// Swaps code and name roles at every leaf, for reverse lookups.
    #[must_use]
    pub fn invert(&self) -> Variables {
        let mut inverted = Variables::new();
        for (key, node) in &self.entries {
            match node {
                VariableNode::Leaf(value) => inverted.insert_leaf(value.clone(), key.clone()),
                VariableNode::Tree(subtree) => inverted.insert_tree(key.clone(), subtree.invert()),
            }
        }
        inverted
    }

    /// Serializes the tree as a nested JSON document.
    ///
    /// With `with_imputation_flags` unset, imputation-flag leaves are
    /// omitted; the omission never perturbs sibling leaves or category
    /// structure.
    #[must_use]
    pub fn to_dict(&self, with_imputation_flags: bool) -> serde_json::Value {
        let tree = if with_imputation_flags {
            self.clone()
        } else {
            self.without_imputation_flags()
        };
        serde_json::to_value(&tree).unwrap_or(serde_json::Value::Null)
    }

    /// Serializes the tree as a flat JSON-ready mapping with `_`-joined
    /// key paths.
    #[must_use]
    pub fn to_flat_dict(&self, with_imputation_flags: bool) -> IndexMap<String, String> {
        let mut flat = IndexMap::new();
        self.flat_dict_into("", with_imputation_flags, &mut flat);
        flat
    }

    fn flat_dict_into(
        &self,
        key_prefix: &str,
        with_imputation_flags: bool,
        out: &mut IndexMap<String, String>,
    ) {
        for (key, node) in &self.entries {
            match node {
                VariableNode::Leaf(value) => {
                    if with_imputation_flags || !is_imputation_flag(key) {
                        out.insert(format!("{key_prefix}{key}"), value.clone());
                    }
                }
                VariableNode::Tree(subtree) => {
                    subtree.flat_dict_into(
                        &format!("{key_prefix}{key}_"),
                        with_imputation_flags,
                        out,
                    );
                }
            }
        }
    }

    fn without_imputation_flags(&self) -> Variables {
        let mut filtered = Variables::new();
        for (key, node) in &self.entries {
            match node {
                VariableNode::Leaf(value) => {
                    if !is_imputation_flag(key) {
                        filtered.insert_leaf(key.clone(), value.clone());
                    }
                }
                VariableNode::Tree(subtree) => {
                    filtered.insert_tree(key.clone(), subtree.without_imputation_flags());
                }
            }
        }
        filtered
    }

    /// Deserializes a tree from a nested JSON document.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Serializes the full tree (flags included) to JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        self.to_dict(true)
    }
}

/// True when a leaf key marks an imputation-flag companion, in either
/// orientation (short-code key `F_...` or reoriented long-name key
/// `..._ImputationFlag`).
fn is_imputation_flag(key: &str) -> bool {
    key.starts_with(IMPUTATION_FLAG_PREFIX) || key.ends_with(IMPUTATION_FLAG_MARKER)
}

// Structural, order-independent equality.
impl PartialEq for Variables {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(key, node)| other.entries.get(key) == Some(node))
    }
}

impl<'a> IntoIterator for &'a Variables {
    type Item = (&'a String, &'a VariableNode);
    type IntoIter = indexmap::map::Iter<'a, String, VariableNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
