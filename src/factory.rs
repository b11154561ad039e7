//! Algorithm registry
//!
//! Maps `(name, version)` to a constructor. Creating without a version picks
//! the highest registered one. Lookups that miss suggest close names.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

use crate::algorithm::Algorithm;
use crate::error::AlgoError;

pub type Constructor = Arc<dyn Fn() -> Box<dyn Algorithm> + Send + Sync>;

#[derive(Clone)]
struct Registration {
    constructor: Constructor,
    category: String,
    summary: String,
}

/// What `list` and `describe` show about a registered algorithm
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct AlgorithmDescriptor {
    pub name: String,
    pub version: u32,
    pub category: String,
    pub summary: String,
}

#[derive(Clone, Default)]
pub struct AlgorithmFactory {
    entries: Arc<DashMap<String, BTreeMap<u32, Registration>>>,
}

impl AlgorithmFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a default-constructible algorithm
    pub fn subscribe<A>(&self) -> Result<(String, u32), AlgoError>
    where
        A: Algorithm + Default + 'static,
    {
        self.subscribe_with(|| Box::new(A::default()))
    }

    /// Register an arbitrary constructor
    pub fn subscribe_with<F>(&self, constructor: F) -> Result<(String, u32), AlgoError>
    where
        F: Fn() -> Box<dyn Algorithm> + Send + Sync + 'static,
    {
        let proto = constructor();
        let name = proto.name().to_string();
        let version = proto.version();
        if name.is_empty() {
            return Err(AlgoError::AbstractMethod {
                what: "name".into(),
            });
        }
        if version == 0 {
            return Err(AlgoError::AbstractMethod {
                what: "version".into(),
            });
        }

        let registration = Registration {
            constructor: Arc::new(constructor),
            category: proto.category().to_string(),
            summary: proto.summary().to_string(),
        };

        let mut versions = self.entries.entry(name.clone()).or_default();
        if versions.contains_key(&version) {
            return Err(AlgoError::AlreadyRegistered { name, version });
        }
        versions.insert(version, registration);
        debug!(name = %name, version, "registered algorithm");
        Ok((name, version))
    }

    /// Remove one version; returns whether it was present
    pub fn unsubscribe(&self, name: &str, version: u32) -> bool {
        match self.entries.entry(name.to_string()) {
            Entry::Occupied(mut e) => {
                let removed = e.get_mut().remove(&version).is_some();
                if e.get().is_empty() {
                    e.remove();
                }
                removed
            }
            Entry::Vacant(_) => false,
        }
    }

    /// Construct a fresh, uninitialized algorithm
    pub fn create(&self, name: &str, version: Option<u32>) -> Result<Box<dyn Algorithm>, AlgoError> {
        let constructor = {
            let Some(versions) = self.entries.get(name) else {
                return Err(AlgoError::UnknownAlgorithm {
                    name: name.to_string(),
                    version,
                    suggestions: self.suggest(name),
                });
            };
            let registration = match version {
                Some(v) => versions.get(&v),
                None => versions.values().next_back(),
            };
            match registration {
                Some(r) => Arc::clone(&r.constructor),
                None => {
                    return Err(AlgoError::UnknownAlgorithm {
                        name: name.to_string(),
                        version,
                        suggestions: Vec::new(),
                    })
                }
            }
        };
        // Map guard released before running user code
        Ok(constructor())
    }

    pub fn contains(&self, name: &str, version: Option<u32>) -> bool {
        self.entries.get(name).is_some_and(|versions| match version {
            Some(v) => versions.contains_key(&v),
            None => !versions.is_empty(),
        })
    }

    pub fn highest_version(&self, name: &str) -> Option<u32> {
        self.entries
            .get(name)
            .and_then(|versions| versions.keys().next_back().copied())
    }

    /// Every registered `(name, version)`, sorted
    pub fn keys(&self) -> Vec<(String, u32)> {
        let mut keys: Vec<(String, u32)> = self
            .entries
            .iter()
            .flat_map(|e| {
                let name = e.key().clone();
                e.value()
                    .keys()
                    .map(move |v| (name.clone(), *v))
                    .collect::<Vec<_>>()
            })
            .collect();
        keys.sort();
        keys
    }

    pub fn descriptors(&self) -> Vec<AlgorithmDescriptor> {
        let mut out: Vec<AlgorithmDescriptor> = self
            .entries
            .iter()
            .flat_map(|e| {
                let name = e.key().clone();
                e.value()
                    .iter()
                    .map(|(version, r)| AlgorithmDescriptor {
                        name: name.clone(),
                        version: *version,
                        category: r.category.clone(),
                        summary: r.summary.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        out.sort();
        out
    }

    pub fn categories(&self) -> BTreeSet<String> {
        self.descriptors().into_iter().map(|d| d.category).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names within edit distance 2, or differing only in case
    fn suggest(&self, name: &str) -> Vec<String> {
        let wanted = name.to_lowercase();
        let mut out: Vec<String> = self
            .entries
            .iter()
            .map(|e| e.key().clone())
            .filter(|candidate| {
                let c = candidate.to_lowercase();
                c == wanted || levenshtein(&c, &wanted) <= 2
            })
            .collect();
        out.sort();
        out
    }
}

impl fmt::Debug for AlgorithmFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmFactory")
            .field("registered", &self.len())
            .finish()
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            let next = (row[j + 1] + 1).min(row[j] + 1).min(prev + cost);
            prev = row[j + 1];
            row[j + 1] = next;
        }
    }
    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecContext;
    use crate::property::PropertyStore;

    struct Versioned(u32);

    impl Algorithm for Versioned {
        fn name(&self) -> &str {
            "Versioned"
        }
        fn version(&self) -> u32 {
            self.0
        }
        fn category(&self) -> &str {
            "Testing"
        }
        fn init(&mut self, _props: &mut PropertyStore) -> Result<(), AlgoError> {
            Ok(())
        }
        fn exec(&mut self, _ctx: &mut ExecContext<'_>) -> Result<(), AlgoError> {
            Ok(())
        }
    }

    fn factory() -> AlgorithmFactory {
        let f = AlgorithmFactory::new();
        f.subscribe_with(|| Box::new(Versioned(1))).unwrap();
        f.subscribe_with(|| Box::new(Versioned(3))).unwrap();
        f
    }

    #[test]
    fn create_picks_highest_version() {
        let f = factory();
        assert_eq!(f.create("Versioned", None).unwrap().version(), 3);
        assert_eq!(f.create("Versioned", Some(1)).unwrap().version(), 1);
        assert_eq!(f.highest_version("Versioned"), Some(3));
    }

    #[test]
    fn duplicate_registration_rejected() {
        let f = factory();
        let err = f.subscribe_with(|| Box::new(Versioned(3))).unwrap_err();
        assert!(matches!(err, AlgoError::AlreadyRegistered { version: 3, .. }));
    }

    #[test]
    fn version_zero_rejected() {
        let f = AlgorithmFactory::new();
        assert!(matches!(
            f.subscribe_with(|| Box::new(Versioned(0))).unwrap_err(),
            AlgoError::AbstractMethod { .. }
        ));
    }

    #[test]
    fn unknown_name_suggests() {
        let f = factory();
        match f.create("Versoined", None) {
            Err(AlgoError::UnknownAlgorithm { suggestions, .. }) => {
                assert_eq!(suggestions, vec!["Versioned".to_string()]);
            }
            other => panic!("expected UnknownAlgorithm, got {:?}", other.map(|a| a.version())),
        }
    }

    #[test]
    fn unknown_version_errors() {
        let f = factory();
        assert!(matches!(
            f.create("Versioned", Some(2)),
            Err(AlgoError::UnknownAlgorithm { version: Some(2), .. })
        ));
    }

    #[test]
    fn unsubscribe_last_version_removes_name() {
        let f = factory();
        assert!(f.unsubscribe("Versioned", 1));
        assert!(!f.unsubscribe("Versioned", 1));
        assert!(f.unsubscribe("Versioned", 3));
        assert!(f.is_empty());
    }

    #[test]
    fn descriptors_sorted() {
        let f = factory();
        let d = f.descriptors();
        assert_eq!(d.len(), 2);
        assert_eq!((d[0].version, d[1].version), (1, 3));
        assert_eq!(d[0].category, "Testing");
        assert_eq!(f.keys(), vec![("Versioned".into(), 1), ("Versioned".into(), 3)]);
    }

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("scale", "scale"), 0);
        assert_eq!(levenshtein("scale", "scle"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
    }
}
