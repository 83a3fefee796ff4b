//! Link model — the value types stored in the traceability graph.
//!
//! All types here have structural equality and hashing: two signatures, links,
//! or edges compare equal iff their fields do. The repository relies on this
//! for deduplication, so none of these types carry interior mutability or
//! identity beyond their data.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MethodSignature
// ---------------------------------------------------------------------------

/// Identity of a method: its name plus the ordered parameter type names.
///
/// An absent name denotes "the whole class" rather than any specific method —
/// class-level edges use such a signature on the side that has no method.
/// Comparison is order- and case-sensitive on both fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MethodSignature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter_types: Vec<String>,
}

impl MethodSignature {
    /// A signature with a name and explicit parameter type names.
    pub fn new(name: impl Into<String>, parameter_types: Vec<String>) -> Self {
        Self {
            name: Some(name.into()),
            parameter_types,
        }
    }

    /// A parameterless signature, as produced by declaration expansion.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            parameter_types: Vec::new(),
        }
    }

    /// The signature that stands for the class itself.
    pub fn whole_class() -> Self {
        Self {
            name: None,
            parameter_types: Vec::new(),
        }
    }

    /// True when this signature denotes the whole class, not a method.
    pub fn is_whole_class(&self) -> bool {
        self.name.is_none()
    }
}

impl std::fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            None => f.write_str("<class>"),
            Some(name) => write!(f, "{}({})", name, self.parameter_types.join(",")),
        }
    }
}

// ---------------------------------------------------------------------------
// LinkStatus
// ---------------------------------------------------------------------------

/// Per-edge status: validity, provenance, and the last observed run result.
///
/// Status is attached to edges, not nodes, and is excluded from edge identity:
/// re-inserting an edge with a new status replaces the stored one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct LinkStatus {
    /// The referenced test class/method is known and recognized as a test.
    pub valid: bool,
    /// Created from a static declaration rather than a runtime observation.
    pub from_declaration: bool,
    /// Created during the most recent build/run pass; cleared on merge.
    pub just_created: bool,
    /// `None` until the linked test has run at least once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed_on_last_run: Option<bool>,
}

impl LinkStatus {
    /// Status for an edge materialized from a declaration by the builder.
    pub fn declared(valid: bool) -> Self {
        Self {
            valid,
            from_declaration: true,
            just_created: false,
            passed_on_last_run: None,
        }
    }

    /// Status for an edge discovered from a live execution observation.
    pub fn observed() -> Self {
        Self {
            valid: true,
            from_declaration: false,
            just_created: true,
            passed_on_last_run: None,
        }
    }

    /// Copy of this status with a recorded run result.
    pub fn with_run_result(mut self, passed: bool) -> Self {
        self.passed_on_last_run = Some(passed);
        self
    }
}

// ---------------------------------------------------------------------------
// ClassLink / MethodLink
// ---------------------------------------------------------------------------

/// One side of a class-granularity edge: a class name plus the edge status.
///
/// Whether the name is a test class or a tested class depends on the query
/// that produced the link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassLink {
    pub class: String,
    pub status: LinkStatus,
}

impl ClassLink {
    pub fn new(class: impl Into<String>, status: LinkStatus) -> Self {
        Self {
            class: class.into(),
            status,
        }
    }
}

/// One side of a method-granularity edge.
///
/// A link whose signature is [`MethodSignature::whole_class`] represents a
/// class-level edge, e.g. a declaration that could not be expanded into
/// concrete test methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodLink {
    pub class: String,
    pub method: MethodSignature,
    pub status: LinkStatus,
}

impl MethodLink {
    pub fn new(class: impl Into<String>, method: MethodSignature, status: LinkStatus) -> Self {
        Self {
            class: class.into(),
            method,
            status,
        }
    }
}

// ---------------------------------------------------------------------------
// Edge
// ---------------------------------------------------------------------------

/// One endpoint of a stored edge: a class and a (possibly whole-class) method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkEndpoint {
    pub class: String,
    pub method: MethodSignature,
}

impl LinkEndpoint {
    pub fn new(class: impl Into<String>, method: MethodSignature) -> Self {
        Self {
            class: class.into(),
            method,
        }
    }
}

/// A full stored edge: tested endpoint, test endpoint, status.
///
/// Edge identity is the two endpoints; status is deliberately excluded so the
/// repository can replace a stale status instead of accumulating duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub tested: LinkEndpoint,
    pub test: LinkEndpoint,
    pub status: LinkStatus,
}

impl Edge {
    /// True when both edges connect the same pair of endpoints.
    pub fn same_identity(&self, other: &Edge) -> bool {
        self.tested == other.tested && self.test == other.test
    }

    /// The test side at class granularity.
    pub fn test_class_link(&self) -> ClassLink {
        ClassLink::new(&self.test.class, self.status)
    }

    /// The test side at method granularity.
    pub fn test_method_link(&self) -> MethodLink {
        MethodLink::new(&self.test.class, self.test.method.clone(), self.status)
    }

    /// The tested side at class granularity.
    pub fn tested_class_link(&self) -> ClassLink {
        ClassLink::new(&self.tested.class, self.status)
    }

    /// The tested side at method granularity.
    pub fn tested_method_link(&self) -> MethodLink {
        MethodLink::new(&self.tested.class, self.tested.method.clone(), self.status)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Append `item` unless an equal one is already present.
///
/// Query results are small; linear dedup keeps insertion order deterministic
/// without requiring `Ord` on link types.
pub(crate) fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
