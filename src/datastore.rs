//! Named data objects with DashMap storage
//!
//! Dataset-valued properties refer to objects in this store by name. Top-level
//! runs store their outputs here; child runs never do.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::history::AlgorithmHistory;

/// A single x/y series plus the history that produced it
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    name: String,
    x: Vec<f64>,
    y: Vec<f64>,
    history: Vec<Arc<AlgorithmHistory>>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            history: Vec::new(),
        }
    }

    /// Dataset with x = 0, 1, 2, ...
    pub fn from_values(name: impl Into<String>, y: Vec<f64>) -> Self {
        let x = (0..y.len()).map(|i| i as f64).collect();
        Self::new(name, x, y)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Records of every run that contributed to this dataset, oldest first
    pub fn history(&self) -> &[Arc<AlgorithmHistory>] {
        &self.history
    }

    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn with_history(mut self, history: Vec<Arc<AlgorithmHistory>>) -> Self {
        self.history = history;
        self
    }
}

/// An ordered collection of datasets processed member by member
#[derive(Debug, Clone, Default)]
pub struct DatasetGroup {
    name: String,
    members: Vec<Arc<Dataset>>,
}

impl DatasetGroup {
    pub fn new(name: impl Into<String>, members: Vec<Arc<Dataset>>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Arc<Dataset>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Anything a dataset property can hold
#[derive(Debug, Clone)]
pub enum DataObject {
    Dataset(Arc<Dataset>),
    Group(Arc<DatasetGroup>),
}

impl DataObject {
    pub fn name(&self) -> &str {
        match self {
            DataObject::Dataset(d) => d.name(),
            DataObject::Group(g) => g.name(),
        }
    }

    pub fn as_group(&self) -> Option<&Arc<DatasetGroup>> {
        match self {
            DataObject::Group(g) => Some(g),
            DataObject::Dataset(_) => None,
        }
    }

    pub fn as_dataset(&self) -> Option<&Arc<Dataset>> {
        match self {
            DataObject::Dataset(d) => Some(d),
            DataObject::Group(_) => None,
        }
    }

    /// Every history record reachable from this object (group members included)
    pub fn histories(&self) -> Vec<Arc<AlgorithmHistory>> {
        match self {
            DataObject::Dataset(d) => d.history().to_vec(),
            DataObject::Group(g) => g
                .members()
                .iter()
                .flat_map(|m| m.history().iter().cloned())
                .collect(),
        }
    }
}

/// Identity comparison: two values are equal when they share the same object
impl PartialEq for DataObject {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DataObject::Dataset(a), DataObject::Dataset(b)) => Arc::ptr_eq(a, b),
            (DataObject::Group(a), DataObject::Group(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Dataset> for DataObject {
    fn from(d: Dataset) -> Self {
        DataObject::Dataset(Arc::new(d))
    }
}

impl From<Arc<Dataset>> for DataObject {
    fn from(d: Arc<Dataset>) -> Self {
        DataObject::Dataset(d)
    }
}

impl From<DatasetGroup> for DataObject {
    fn from(g: DatasetGroup) -> Self {
        DataObject::Group(Arc::new(g))
    }
}

impl From<Arc<DatasetGroup>> for DataObject {
    fn from(g: Arc<DatasetGroup>) -> Self {
        DataObject::Group(g)
    }
}

/// Thread-safe named object storage (lock-free)
#[derive(Clone, Default)]
pub struct DataStore {
    objects: Arc<DashMap<String, DataObject>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an object; group members live only inside their group
    pub fn add(&self, object: impl Into<DataObject>) -> DataObject {
        let object = object.into();
        self.objects.insert(object.name().to_string(), object.clone());
        object
    }

    pub fn get(&self, name: &str) -> Option<DataObject> {
        self.objects.get(name).map(|o| o.clone())
    }

    pub fn get_dataset(&self, name: &str) -> Option<Arc<Dataset>> {
        self.get(name).and_then(|o| o.as_dataset().cloned())
    }

    pub fn get_group(&self, name: &str) -> Option<Arc<DatasetGroup>> {
        self.get(name).and_then(|o| o.as_group().cloned())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    pub fn remove(&self, name: &str) -> Option<DataObject> {
        self.objects.remove(name).map(|(_, o)| o)
    }

    /// Sorted object names
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.objects.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&self) {
        self.objects.clear();
    }
}

impl fmt::Debug for DataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_get_dataset() {
        let store = DataStore::new();
        store.add(Dataset::from_values("raw", vec![1.0, 2.0, 3.0]));

        let ds = store.get_dataset("raw").unwrap();
        assert_eq!(ds.x(), &[0.0, 1.0, 2.0]);
        assert_eq!(ds.len(), 3);
        assert!(store.get_group("raw").is_none());
    }

    #[test]
    fn group_members_stay_inside_group() {
        let store = DataStore::new();
        let a = Arc::new(Dataset::from_values("run_1", vec![1.0]));
        let b = Arc::new(Dataset::from_values("run_2", vec![2.0]));
        store.add(DatasetGroup::new("runs", vec![a, b]));

        assert_eq!(store.names(), vec!["runs"]);
        let runs = store.get_group("runs").unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs.members()[1].y(), &[2.0]);
        assert!(store.get_dataset("run_2").is_none());
    }

    #[test]
    fn replace_and_remove() {
        let store = DataStore::new();
        store.add(Dataset::from_values("x", vec![1.0]));
        store.add(Dataset::from_values("x", vec![5.0]));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_dataset("x").unwrap().y(), &[5.0]);

        assert!(store.remove("x").is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn object_equality_is_identity() {
        let ds = Arc::new(Dataset::from_values("a", vec![1.0]));
        let same = DataObject::Dataset(Arc::clone(&ds));
        let copy = DataObject::from((*ds).clone());
        assert_eq!(DataObject::Dataset(ds), same);
        assert_ne!(same, copy);
    }

    #[test]
    fn store_is_shared_between_clones() {
        let store = DataStore::new();
        let other = store.clone();
        store.add(Dataset::from_values("a", vec![]));
        assert!(other.contains("a"));
        other.clear();
        assert!(store.is_empty());
    }
}
