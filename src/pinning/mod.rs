//! Dependency pinning.
//!
//! [`pin`] turns the names a descriptor declares into a [`PinnedDependencySet`] by
//! looking each one up in the [`VersionsTable`]. Names without a pin stay in the set
//! as unpinned; they are still built and still declared, just without a version
//! constraint.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::debug;

use crate::core::PinpackError;
use crate::naming::{NameSchemeTable, PackageName};
use crate::versions::VersionsTable;

/// How a pinned version is expressed in emitted dependency declarations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PinStrategy {
    /// `python-puka >= 0.0.7`
    #[default]
    GreaterOrEqual,
    /// `python-puka = 0.0.7`
    Exact,
}

impl PinStrategy {
    /// Relation operator placed between the package and its version.
    pub fn operator(self) -> &'static str {
        match self {
            Self::GreaterOrEqual => ">=",
            Self::Exact => "=",
        }
    }
}

/// Outcome of adding one entry to a [`PinnedDependencySet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// The name was new
    Added,
    /// The name was already present with the same version
    Duplicate,
    /// The name was already present with another version; the first one was kept
    Conflict {
        kept: Option<String>,
        rejected: Option<String>,
    },
}

/// Package name → pinned version (`None` = declared but unpinned).
///
/// Iteration order is sorted by name, so every run visits packages in the same
/// order regardless of how the set was assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinnedDependencySet {
    entries: BTreeMap<PackageName, Option<String>>,
}

impl PinnedDependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name` unless it is already present. The first version recorded for a
    /// name wins.
    pub fn insert(&mut self, name: PackageName, version: Option<String>) -> Insertion {
        match self.entries.get(&name) {
            None => {
                self.entries.insert(name, version);
                Insertion::Added
            }
            Some(existing) if *existing == version => Insertion::Duplicate,
            Some(existing) => Insertion::Conflict {
                kept: existing.clone(),
                rejected: version,
            },
        }
    }

    /// `Some(pin)` if `name` is in the set, where `pin` is `None` when unpinned.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.entries.get(PackageName::new(name).as_str()).map(Option::as_deref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(PackageName::new(name).as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&PackageName, Option<&str>)> {
        self.entries.iter().map(|(name, version)| (name, version.as_deref()))
    }

    /// Names in order.
    pub fn names(&self) -> impl Iterator<Item = &PackageName> {
        self.entries.keys()
    }

    /// Split the set into the entries `keep` accepts and the names it rejects.
    pub fn partition(self, mut keep: impl FnMut(&PackageName) -> bool) -> (Self, Vec<PackageName>) {
        let mut kept = Self::new();
        let mut rejected = Vec::new();
        for (name, version) in self.entries {
            if keep(&name) {
                kept.entries.insert(name, version);
            } else {
                rejected.push(name);
            }
        }
        (kept, rejected)
    }

    /// Explicit dependency declarations for the packaging tool: a `-d` flag per
    /// entry, naming the OS package that is built for it.
    pub fn dependency_flags(&self, scheme: &NameSchemeTable, strategy: PinStrategy) -> Vec<String> {
        let mut flags = Vec::with_capacity(self.entries.len() * 2);
        for (name, version) in self.iter() {
            let package = scheme.system_package_name(name.as_str());
            flags.push("-d".to_string());
            flags.push(match version {
                Some(version) => format!("{package} {} {version}", strategy.operator()),
                None => package,
            });
        }
        flags
    }
}

impl FromIterator<(PackageName, Option<String>)> for PinnedDependencySet {
    fn from_iter<I: IntoIterator<Item = (PackageName, Option<String>)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, version) in iter {
            set.insert(name, version);
        }
        set
    }
}

/// Pin every name against `table`.
///
/// A name is looked up as declared first and then under its scheme aliases, so a
/// versions file may list `PyYAML` or `yaml` alike.
pub fn pin(names: &[PackageName], table: &VersionsTable, scheme: &NameSchemeTable) -> PinnedDependencySet {
    let set: PinnedDependencySet = names
        .iter()
        .filter(|name| !name.is_empty())
        .map(|name| (name.clone(), lookup_pin(name, table, scheme)))
        .collect();
    debug!("Pinned dependencies: {:?}", set);
    set
}

fn lookup_pin(name: &PackageName, table: &VersionsTable, scheme: &NameSchemeTable) -> Option<String> {
    if let Some(version) = table.lookup(name.as_str()) {
        return Some(version.to_string());
    }
    scheme
        .aliases(name.as_str())
        .iter()
        .find_map(|alias| table.lookup(alias.as_str()))
        .map(str::to_string)
}

/// `--include` patterns restricting which dependencies are built.
///
/// A name is included when any pattern matches somewhere in it. Without patterns
/// everything is included.
#[derive(Debug, Clone, Default)]
pub struct IncludeFilter {
    patterns: Vec<Regex>,
}

impl IncludeFilter {
    /// Compile the patterns.
    ///
    /// # Errors
    ///
    /// [`PinpackError::InvalidArgument`] for a pattern that is not a valid regex.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PinpackError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern.as_ref()).map_err(|e| PinpackError::InvalidArgument {
                    argument: format!("--include {}", pattern.as_ref()),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            patterns,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches(&self, name: &PackageName) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| p.is_match(name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<PackageName> {
        items.iter().map(PackageName::new).collect()
    }

    #[test]
    fn test_pin_keeps_unpinned_names() {
        let table: VersionsTable = [("puka", "0.0.7")].into_iter().collect();
        let set = pin(&names(&["puka", "requests"]), &table, &NameSchemeTable::default());

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("puka"), Some(Some("0.0.7")));
        assert_eq!(set.get("requests"), Some(None));
        assert_eq!(set.get("mock"), None);
    }

    #[test]
    fn test_pin_uses_scheme_aliases() {
        let table: VersionsTable = [("yaml", "3.10"), ("python-dateutil", "2.2")].into_iter().collect();
        let set = pin(&names(&["pyyaml", "dateutil"]), &table, &NameSchemeTable::default());

        assert_eq!(set.get("pyyaml"), Some(Some("3.10")));
        assert_eq!(set.get("dateutil"), Some(Some("2.2")));
    }

    #[test]
    fn test_insert_first_writer_wins() {
        let mut set = PinnedDependencySet::new();
        assert_eq!(set.insert(PackageName::new("six"), Some("1.9".into())), Insertion::Added);
        assert_eq!(set.insert(PackageName::new("six"), Some("1.9".into())), Insertion::Duplicate);
        assert_eq!(
            set.insert(PackageName::new("six"), Some("1.10".into())),
            Insertion::Conflict {
                kept: Some("1.9".into()),
                rejected: Some("1.10".into())
            }
        );
        assert_eq!(set.get("six"), Some(Some("1.9")));
    }

    #[test]
    fn test_dependency_flags() {
        let table: VersionsTable = [("puka", "0.0.7"), ("pyyaml", "3.10")].into_iter().collect();
        let scheme = NameSchemeTable::default();
        let set = pin(&names(&["puka", "pyyaml", "requests"]), &table, &scheme);

        assert_eq!(
            set.dependency_flags(&scheme, PinStrategy::GreaterOrEqual),
            [
                "-d",
                "python-puka >= 0.0.7",
                "-d",
                "python-yaml >= 3.10",
                "-d",
                "python-requests"
            ]
        );
        assert_eq!(
            set.dependency_flags(&scheme, PinStrategy::Exact)[1],
            "python-puka = 0.0.7"
        );
    }

    #[test]
    fn test_partition() {
        let set = pin(&names(&["puka", "other"]), &VersionsTable::empty(), &NameSchemeTable::default());
        let filter = IncludeFilter::new(&["puka"]).unwrap();
        let (kept, skipped) = set.partition(|name| filter.matches(name));

        assert_eq!(kept.names().cloned().collect::<Vec<_>>(), names(&["puka"]));
        assert_eq!(skipped, names(&["other"]));
    }

    #[test]
    fn test_include_filter() {
        let empty = IncludeFilter::new::<&str>(&[]).unwrap();
        assert!(empty.is_empty());
        assert!(empty.matches(&PackageName::new("anything")));

        let filter = IncludeFilter::new(&["^vdt\\.", "puka"]).unwrap();
        assert!(filter.matches(&PackageName::new("vdt.version")));
        assert!(filter.matches(&PackageName::new("puka")));
        assert!(!filter.matches(&PackageName::new("requests")));

        let err = IncludeFilter::new(&["("]).unwrap_err();
        assert!(matches!(err, PinpackError::InvalidArgument { .. }));
    }
}
