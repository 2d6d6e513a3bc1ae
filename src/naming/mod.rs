//! Package names and the broken-scheme name table.
//!
//! Python packages are declared by their index (distribution) name, but OS packages
//! built from them are named `<prefix><import name>`. For most packages the two
//! coincide; for a handful of well-known packages they do not:
//!
//! | Declared as       | Packaged as         |
//! |-------------------|---------------------|
//! | `pyyaml`          | `python-yaml`       |
//! | `pyzmq`           | `python-zmq`        |
//! | `pycrypto`        | `python-crypto`     |
//! | `python-debian`   | `python-debian`     |
//! | `python-dateutil` | `python-dateutil`   |
//!
//! [`NameSchemeTable`] records those pairs and is passed explicitly to every
//! component that emits or interprets package names. It is immutable once built.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

/// A normalized package name: trimmed and lowercased.
///
/// Every table lookup and equality comparison in pinpack goes through this type,
/// so `PyYAML`, `pyyaml` and ` pyyaml ` are the same package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageName(String);

impl PackageName {
    /// Normalize `name` into a package name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_lowercase())
    }

    /// The normalized name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name is empty after normalization.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PackageName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PackageName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PackageName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Built-in broken scheme names. The first three pairs are listed in both directions.
const BROKEN_SCHEME_NAMES: &[(&str, &str)] = &[
    ("pyyaml", "yaml"),
    ("pyzmq", "zmq"),
    ("pycrypto", "crypto"),
    ("yaml", "pyyaml"),
    ("zmq", "pyzmq"),
    ("crypto", "pycrypto"),
    ("python-debian", "debian"),
    ("python-dateutil", "dateutil"),
];

/// Prefix the packaging tool puts in front of Python package names.
pub const DEFAULT_NAMESPACE_PREFIX: &str = "python-";

/// Mapping between declared names and packaging-scheme names.
#[derive(Debug, Clone)]
pub struct NameSchemeTable {
    alternates: HashMap<String, String>,
    namespace_prefix: String,
}

impl Default for NameSchemeTable {
    fn default() -> Self {
        Self::new(BROKEN_SCHEME_NAMES.iter().copied(), DEFAULT_NAMESPACE_PREFIX)
    }
}

impl NameSchemeTable {
    /// Build a table from `(name, alternate)` pairs. Names are normalized.
    pub fn new<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
        namespace_prefix: impl Into<String>,
    ) -> Self {
        let alternates = pairs
            .into_iter()
            .map(|(name, alternate)| {
                (PackageName::new(name).0, PackageName::new(alternate).0)
            })
            .collect();
        Self {
            alternates,
            namespace_prefix: namespace_prefix.into(),
        }
    }

    /// Same table with a different namespace prefix.
    #[must_use]
    pub fn with_namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_prefix = prefix.into();
        self
    }

    /// The namespace prefix for packaged names (e.g. `python-`).
    pub fn namespace_prefix(&self) -> &str {
        &self.namespace_prefix
    }

    /// The alternate scheme name for `name`, if it is a broken scheme name.
    pub fn alternate(&self, name: &str) -> Option<&str> {
        self.alternates.get(PackageName::new(name).as_str()).map(String::as_str)
    }

    /// Map `name` to its alternate scheme name, or return it unchanged.
    pub fn to_canonical(&self, name: &str) -> PackageName {
        match self.alternate(name) {
            Some(alternate) => PackageName::new(alternate),
            None => PackageName::new(name),
        }
    }

    /// Explicit package name override for broken scheme names
    /// (`pyyaml` → `python-yaml`). `None` lets the packaging tool derive the name.
    pub fn package_name_override(&self, name: &str) -> Option<String> {
        self.alternate(name)
            .map(|alternate| format!("{}{alternate}", self.namespace_prefix))
    }

    /// Name of the OS package built for `name`, as used in dependency declarations.
    pub fn system_package_name(&self, name: &str) -> String {
        format!("{}{}", self.namespace_prefix, self.to_canonical(name))
    }

    /// Interpret an OS package name reported by a produced artifact back into the
    /// name the package is declared by.
    ///
    /// Returns `None` for packages outside the namespace (e.g. the `python`
    /// interpreter itself or system libraries).
    pub fn from_system_package_name(&self, system_name: &str) -> Option<PackageName> {
        let system_name = PackageName::new(system_name);
        let stripped = system_name.as_str().strip_prefix(self.namespace_prefix.as_str())?;
        if stripped.is_empty() {
            return None;
        }

        // A declared name whose scheme name is `stripped` wins over the forward table
        let declared = self
            .alternates
            .iter()
            .filter(|(_, alternate)| alternate.as_str() == stripped)
            .map(|(name, _)| name)
            .min();

        Some(match declared {
            Some(name) => PackageName::new(name),
            None => self.to_canonical(stripped),
        })
    }

    /// Names that refer to the same package as `name` in the other scheme, for
    /// lookups in tables keyed by either form.
    pub fn aliases(&self, name: &str) -> Vec<PackageName> {
        let name = PackageName::new(name);
        let mut aliases: Vec<PackageName> = self
            .alternates
            .iter()
            .filter(|(key, alternate)| {
                key.as_str() == name.as_str() || alternate.as_str() == name.as_str()
            })
            .flat_map(|(key, alternate)| [PackageName::new(key), PackageName::new(alternate)])
            .filter(|alias| alias != &name)
            .collect();
        aliases.sort();
        aliases.dedup();
        aliases
    }
}
