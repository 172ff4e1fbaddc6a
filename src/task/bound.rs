//! Bound input values
//!
//! [`BoundInputs`] is the resolved value tree of one invocation, keyed by the
//! path components of each input name. [`ArgumentSet`] carries values passed
//! programmatically (or through command-line options) by the caller.

use crate::task::Value;
use std::collections::BTreeMap;

/// Flattened view of bound inputs, keyed by dotted path
pub type FlatInputs = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf(Value),
    Branch(BoundInputs),
}

/// Tree of resolved input values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundInputs {
    entries: BTreeMap<String, Node>,
}

impl BoundInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set the value at `path`, creating intermediate branches
    ///
    /// A leaf sitting where a branch is needed is replaced.
    pub fn set(&mut self, path: &[String], value: Value) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        let mut current = self;
        for key in parents {
            let node = current
                .entries
                .entry(key.clone())
                .or_insert_with(|| Node::Branch(BoundInputs::new()));
            if let Node::Leaf(_) = node {
                *node = Node::Branch(BoundInputs::new());
            }
            current = match node {
                Node::Branch(inner) => inner,
                Node::Leaf(_) => return,
            };
        }
        current.entries.insert(last.clone(), Node::Leaf(value));
    }

    /// Leaf value at `path`, if any
    pub fn get(&self, path: &[String]) -> Option<&Value> {
        let (last, parents) = path.split_last()?;
        let mut current = self;
        for key in parents {
            match current.entries.get(key)? {
                Node::Branch(inner) => current = inner,
                Node::Leaf(_) => return None,
            }
        }
        match current.entries.get(last)? {
            Node::Leaf(value) => Some(value),
            Node::Branch(_) => None,
        }
    }

    /// Convenience lookup by dotted path
    pub fn get_dotted(&self, path: &str) -> Option<&Value> {
        let path: Vec<String> = path.split('.').map(str::to_string).collect();
        self.get(&path)
    }

    /// Deep-merge `other` underneath `self`: existing values win, `other`
    /// only fills paths that are absent here.
    pub fn merge_under(&mut self, other: BoundInputs) {
        for (key, theirs) in other.entries {
            match (self.entries.get_mut(&key), theirs) {
                (None, theirs) => {
                    self.entries.insert(key, theirs);
                }
                (Some(Node::Branch(ours)), Node::Branch(theirs)) => ours.merge_under(theirs),
                (Some(_), _) => {}
            }
        }
    }

    /// Flatten the tree into dotted paths mapped to leaf values
    pub fn flatten(&self) -> FlatInputs {
        let mut flat = FlatInputs::new();
        self.flatten_into("", &mut flat);
        flat
    }

    fn flatten_into(&self, prefix: &str, flat: &mut FlatInputs) {
        for (key, node) in &self.entries {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            match node {
                Node::Leaf(value) => {
                    flat.insert(path, value.clone());
                }
                Node::Branch(inner) => inner.flatten_into(&path, flat),
            }
        }
    }
}

/// Values supplied explicitly by the caller, keyed by input name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentSet {
    values: BTreeMap<String, Value>,
}

impl ArgumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ArgumentSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut set = ArgumentSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}
