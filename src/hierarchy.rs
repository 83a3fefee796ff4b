//! Pre-resolved class hierarchy model.
//!
//! The builder never introspects live code. Whatever reflection or parsing
//! facility the host platform provides runs once, up front, and produces
//! [`ClassInfo`] records: name, declared interfaces, superclass, methods, and
//! the pre-parsed link declarations attached to each. A [`ClassCatalog`] holds
//! those records and linearizes hierarchies with an explicit worklist and
//! visited set, so interface diamonds terminate and are visited once.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::MethodSignature;

// ---------------------------------------------------------------------------
// LinkDeclaration
// ---------------------------------------------------------------------------

/// A pre-parsed "tested by" declaration attached to a class or method.
///
/// `test_class` may be unqualified; resolution against the declaring class's
/// package happens at build time. A missing or blank `test_method` means
/// "every recognized test method of the class". List-form declarations are
/// assumed flattened into the ordered declaration vectors on [`ClassInfo`]
/// and [`MethodInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDeclaration {
    pub test_class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_method: Option<String>,
}

impl LinkDeclaration {
    /// Declaration naming a test class and a specific test method.
    pub fn new(test_class: impl Into<String>, test_method: impl Into<String>) -> Self {
        Self {
            test_class: test_class.into(),
            test_method: Some(test_method.into()),
        }
    }

    /// Declaration naming only a test class.
    pub fn class_only(test_class: impl Into<String>) -> Self {
        Self {
            test_class: test_class.into(),
            test_method: None,
        }
    }

    /// The declared method name, with blank treated as absent.
    pub fn declared_method(&self) -> Option<&str> {
        self.test_method
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

// ---------------------------------------------------------------------------
// MethodInfo / ClassInfo
// ---------------------------------------------------------------------------

/// A method declared directly on a class, with its link declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkDeclaration>,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter_types: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn with_parameters(mut self, parameter_types: Vec<String>) -> Self {
        self.parameter_types = parameter_types;
        self
    }

    pub fn with_link(mut self, link: LinkDeclaration) -> Self {
        self.links.push(link);
        self
    }

    pub fn signature(&self) -> MethodSignature {
        MethodSignature::new(&self.name, self.parameter_types.clone())
    }
}

/// A class (or interface) in the analyzed universe.
///
/// `interfaces` and `superclass` refer to other catalog entries by qualified
/// name. `links` holds the class-level declarations in declaration order;
/// `methods` the directly declared methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkDeclaration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodInfo>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interfaces: Vec::new(),
            superclass: None,
            links: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn implementing(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn extending(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_link(mut self, link: LinkDeclaration) -> Self {
        self.links.push(link);
        self
    }

    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    /// The package portion of the qualified name, empty for the root package.
    pub fn package(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[..idx],
            None => "",
        }
    }

    /// The directly declared method with exactly this name and parameter list.
    pub fn method(&self, name: &str, parameter_types: &[String]) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.parameter_types == parameter_types)
    }
}

// ---------------------------------------------------------------------------
// PlatformMatcher
// ---------------------------------------------------------------------------

/// Decides whether an ancestor belongs to the platform standard library.
///
/// Hierarchy walks stop at platform superclasses; the exact namespace is
/// environment-specific, so the boundary is a configurable prefix list. The
/// default covers JVM-style hierarchies, the kind this graph models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformMatcher {
    prefixes: Vec<String>,
}

impl PlatformMatcher {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }

    /// A matcher that treats nothing as platform (walks every superclass).
    pub fn none() -> Self {
        Self {
            prefixes: Vec::new(),
        }
    }

    pub fn is_platform(&self, class_name: &str) -> bool {
        self.prefixes.iter().any(|p| class_name.starts_with(p))
    }
}

impl Default for PlatformMatcher {
    fn default() -> Self {
        Self {
            prefixes: vec!["java.".to_string(), "javax.".to_string()],
        }
    }
}

// ---------------------------------------------------------------------------
// ClassCatalog
// ---------------------------------------------------------------------------

/// The analyzed universe: every known class, keyed by qualified name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCatalog {
    classes: BTreeMap<String, ClassInfo>,
    platform: PlatformMatcher,
}

impl ClassCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform(platform: PlatformMatcher) -> Self {
        Self {
            classes: BTreeMap::new(),
            platform,
        }
    }

    pub fn insert(&mut self, class: ClassInfo) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn get(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn platform(&self) -> &PlatformMatcher {
        &self.platform
    }

    /// The class plus every reachable ancestor, in deterministic preorder:
    /// the class itself, then each declared interface depth-first in
    /// declaration order, then the superclass chain.
    ///
    /// The visited set guarantees termination and a single visit per diamond
    /// ancestor; duplicate *edges* are left to the repository's structural
    /// dedup. Superclasses matching the platform boundary stop the walk on
    /// that branch; interfaces are always followed. Names without a catalog
    /// entry are outside the analyzed universe and are skipped.
    pub fn linearize(&self, name: &str) -> Vec<&ClassInfo> {
        let mut out = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = vec![name];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(class) = self.classes.get(current) else {
                continue;
            };
            out.push(class);
            // Pushed below the interfaces so every interface subtree pops first.
            if let Some(superclass) = &class.superclass {
                if !self.platform.is_platform(superclass) {
                    stack.push(superclass);
                }
            }
            for interface in class.interfaces.iter().rev() {
                stack.push(interface);
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
