// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Namespaced, versioned type identifiers.
//!
//! Normative Types are identified by strings of the form
//! `<namespace>/<Name>:<Major>.<Minor>`, e.g. `epics:nt/NTScalar:1.0`. Both the
//! namespace and the version segment are optional.
//!
//! Two identifiers are *compatible* when they agree on everything but the
//! minor version:
//!
//! ```rust
//! use ntypes::type_id::is_compatible;
//!
//! assert!(is_compatible("epics:nt/NTScalar:1.0", "epics:nt/NTScalar:1.3"));
//! assert!(!is_compatible("epics:nt/NTScalar:1.0", "epics:nt/NTScalar:2.0"));
//! ```

use std::fmt;
use thiserror::Error;

/// Rejections produced by [`TypeId::parse_strict`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeIdError {
    #[error("type id is empty")]
    Empty,
    #[error("ambiguous type id '{id}': {reason}")]
    Ambiguous { id: String, reason: &'static str },
}

/// Parsed type identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeId {
    full_name: String,
    namespace: String,
    name: String,
    version: String,
}

impl TypeId {
    /// Parse a type identifier. Never fails: absent segments are empty.
    pub fn parse(id: &str) -> Self {
        let (namespace, rest) = match id.rfind('/') {
            Some(slash) => (&id[..slash], &id[slash + 1..]),
            None => ("", id),
        };
        let (name, version) = match rest.find(':') {
            Some(colon) => (&rest[..colon], &rest[colon + 1..]),
            None => (rest, ""),
        };
        Self {
            full_name: id.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    /// Parse a type identifier, rejecting inputs whose segments would be
    /// guessed by [`TypeId::parse`].
    pub fn parse_strict(id: &str) -> Result<Self, TypeIdError> {
        if id.trim().is_empty() {
            return Err(TypeIdError::Empty);
        }
        let ambiguous = |reason| TypeIdError::Ambiguous {
            id: id.to_string(),
            reason,
        };
        if id.chars().any(char::is_whitespace) {
            return Err(ambiguous("contains whitespace"));
        }

        let parsed = Self::parse(id);
        if id.contains('/') && parsed.namespace.is_empty() {
            return Err(ambiguous("empty namespace before '/'"));
        }
        if parsed.name.is_empty() {
            return Err(ambiguous("missing type name"));
        }
        if parsed.version.contains(':') {
            return Err(ambiguous("more than one version separator"));
        }
        if id.ends_with(':') {
            return Err(ambiguous("empty version after ':'"));
        }
        if !parsed.version.is_empty() {
            match parsed.version.split_once('.') {
                Some((major, minor)) if major.parse::<u32>().is_ok() && !minor.is_empty() => {}
                _ => return Err(ambiguous("version is not <major>.<minor>")),
            }
        }
        Ok(parsed)
    }

    /// The string this identifier was parsed from.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Namespace, if present (`epics:nt`).
    pub fn namespace(&self) -> Option<&str> {
        (!self.namespace.is_empty()).then_some(self.namespace.as_str())
    }

    /// Unqualified name (`NTScalar`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace and name without version (`epics:nt/NTScalar`).
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }

    /// Raw version segment (`1.0`), if present.
    pub fn version_str(&self) -> Option<&str> {
        (!self.version.is_empty()).then_some(self.version.as_str())
    }

    /// Major version and raw minor segment, if the version starts with a number.
    pub fn version(&self) -> Option<(u32, &str)> {
        let version = self.version_str()?;
        let (major, minor) = version.split_once('.').unwrap_or((version, ""));
        major.parse().ok().map(|major| (major, minor))
    }

    pub fn major(&self) -> Option<u32> {
        self.version().map(|(major, _)| major)
    }

    /// Compatibility with another identifier (minor version ignored).
    pub fn is_compatible_with(&self, other: &TypeId) -> bool {
        is_compatible(&self.full_name, &other.full_name)
    }

    /// Same namespace, name and major version.
    ///
    /// Unlike [`is_compatible`] this compares parsed segments, so ids without
    /// a numeric major version only match an identical id.
    pub fn is_same_major(&self, other: &TypeId) -> bool {
        if self.full_name == other.full_name {
            return true;
        }
        match (self.major(), other.major()) {
            (Some(a), Some(b)) => {
                a == b && self.namespace == other.namespace && self.name == other.name
            }
            _ => false,
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

impl From<&str> for TypeId {
    fn from(id: &str) -> Self {
        Self::parse(id)
    }
}

/// True if both identifiers are equal once their minor version is dropped.
///
/// Everything from the last `.` onwards is stripped. An identifier without
/// any `.` is compared unchanged, so minor-version tolerance only applies to
/// identifiers that carry a version.
pub fn is_compatible(a: &str, b: &str) -> bool {
    strip_minor(a) == strip_minor(b)
}

fn strip_minor(id: &str) -> &str {
    match id.rfind('.') {
        Some(dot) => &id[..dot],
        None => id,
    }
}
