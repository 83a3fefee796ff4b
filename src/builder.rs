//! Graph construction from link declarations.
//!
//! [`GraphBuilder::build`] walks each class under test and its linearized
//! hierarchy, resolves every declaration it finds against the candidate test
//! classes, and records the resulting edges — valid or not — into a fresh
//! [`LinkRepository`]. Unresolved references are data, not errors: the only
//! fatal failure is a class name the catalog cannot resolve at all.

use std::collections::BTreeMap;

use crate::error::{Result, TestGraphError};
use crate::hierarchy::{ClassCatalog, ClassInfo, LinkDeclaration, MethodInfo};
use crate::model::{LinkStatus, MethodSignature};
use crate::repository::LinkRepository;

// ---------------------------------------------------------------------------
// TestRecognizer
// ---------------------------------------------------------------------------

/// Injected capability: "is this method of this class a runnable test?"
///
/// The surrounding test framework supplies the real answer (annotations,
/// naming conventions, registration — whatever it uses). The builder consults
/// it both to validate declarations that name a method and to enumerate the
/// methods a class-only declaration expands into.
pub trait TestRecognizer {
    fn is_test_method(&self, class: &ClassInfo, method: &MethodInfo) -> bool;
}

impl<F> TestRecognizer for F
where
    F: Fn(&ClassInfo, &MethodInfo) -> bool,
{
    fn is_test_method(&self, class: &ClassInfo, method: &MethodInfo) -> bool {
        self(class, method)
    }
}

/// Recognizer for frameworks that mark tests by method-name prefix.
#[derive(Debug, Clone)]
pub struct NamePrefixRecognizer {
    prefix: String,
}

impl NamePrefixRecognizer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl TestRecognizer for NamePrefixRecognizer {
    fn is_test_method(&self, _class: &ClassInfo, method: &MethodInfo) -> bool {
        method.name.starts_with(&self.prefix)
    }
}

// ---------------------------------------------------------------------------
// GraphBuilder
// ---------------------------------------------------------------------------

/// Builds a [`LinkRepository`] from the declarations in a [`ClassCatalog`].
///
/// The builder holds only borrowed, immutable collaborators; per-invocation
/// configuration (`only_valid_links`) is threaded through every call as a
/// parameter, so one builder can serve concurrent `build` calls.
pub struct GraphBuilder<'a> {
    catalog: &'a ClassCatalog,
    recognizer: &'a dyn TestRecognizer,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(catalog: &'a ClassCatalog, recognizer: &'a dyn TestRecognizer) -> Self {
        Self {
            catalog,
            recognizer,
        }
    }

    /// Populate a fresh repository from `classes_under_test`.
    ///
    /// `test_classes` are the candidate test classes declarations may
    /// reference; a declaration resolving outside this set yields an edge
    /// with `valid = false`. With `only_valid_links`, invalid edges are
    /// suppressed instead of recorded.
    ///
    /// Fails only when a named class (under test or candidate) is missing
    /// from the catalog.
    pub fn build(
        &self,
        classes_under_test: &[&str],
        test_classes: &[&str],
        only_valid_links: bool,
    ) -> Result<LinkRepository> {
        let mut candidates: BTreeMap<&str, &ClassInfo> = BTreeMap::new();
        for name in test_classes {
            let class = self.lookup(name)?;
            candidates.insert(class.name.as_str(), class);
        }

        let mut repo = LinkRepository::new();
        for name in classes_under_test {
            let class = self.lookup(name)?;
            tracing::debug!(class = %class.name, "collecting declared links");
            self.collect_class_links(class, &candidates, only_valid_links, &mut repo);
            for method in &class.methods {
                self.collect_method_links(class, method, &candidates, only_valid_links, &mut repo);
            }
        }
        Ok(repo)
    }

    fn lookup(&self, name: &str) -> Result<&'a ClassInfo> {
        self.catalog
            .get(name)
            .ok_or_else(|| TestGraphError::UnknownClass(name.to_string()))
    }

    /// Class-level declarations of `class` and every linearized ancestor.
    ///
    /// Each edge's tested endpoint is the ancestor that carried the
    /// declaration, so hierarchy-derived links are owned by their origin and
    /// reachable from the descendant only through hierarchy queries.
    fn collect_class_links(
        &self,
        class: &ClassInfo,
        candidates: &BTreeMap<&str, &ClassInfo>,
        only_valid_links: bool,
        repo: &mut LinkRepository,
    ) {
        for owner in self.catalog.linearize(&class.name) {
            for decl in &owner.links {
                self.record(owner, decl, None, candidates, only_valid_links, repo);
            }
        }
    }

    /// Declarations on `method` and on the same-signature method of every
    /// linearized ancestor; ancestors lacking the signature are skipped.
    fn collect_method_links(
        &self,
        class: &ClassInfo,
        method: &MethodInfo,
        candidates: &BTreeMap<&str, &ClassInfo>,
        only_valid_links: bool,
        repo: &mut LinkRepository,
    ) {
        let signature = method.signature();
        for owner in self.catalog.linearize(&class.name) {
            let Some(owner_method) = owner.method(&method.name, &method.parameter_types) else {
                continue;
            };
            for decl in &owner_method.links {
                self.record(
                    owner,
                    decl,
                    Some(&signature),
                    candidates,
                    only_valid_links,
                    repo,
                );
            }
        }
    }

    /// Resolve one declaration and record the edges it produces.
    fn record(
        &self,
        owner: &ClassInfo,
        decl: &LinkDeclaration,
        tested_method: Option<&MethodSignature>,
        candidates: &BTreeMap<&str, &ClassInfo>,
        only_valid_links: bool,
        repo: &mut LinkRepository,
    ) {
        let test_class = qualify(&decl.test_class, owner.package());
        let resolved = candidates.get(test_class.as_str()).copied();
        let declared_method = decl.declared_method();

        let valid = match (resolved, declared_method) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(tc), Some(name)) => tc
                .methods
                .iter()
                .any(|m| m.name == name && self.recognizer.is_test_method(tc, m)),
        };
        if only_valid_links && !valid {
            tracing::trace!(
                owner = %owner.name,
                test_class = %test_class,
                "suppressed invalid link"
            );
            return;
        }
        let status = LinkStatus::declared(valid);

        // A named declaration stays as declared; a class-only declaration
        // expands into every recognized test method of the resolved class.
        let expansion: Vec<MethodSignature> = match (resolved, declared_method) {
            (None, _) => Vec::new(),
            (Some(_), Some(name)) => vec![MethodSignature::named(name)],
            (Some(tc), None) => tc
                .methods
                .iter()
                .filter(|m| self.recognizer.is_test_method(tc, m))
                .map(|m| MethodSignature::named(&m.name))
                .collect(),
        };

        if expansion.is_empty() {
            repo.add_connection(&test_class, None, &owner.name, tested_method.cloned(), status);
        } else {
            for test_method in expansion {
                repo.add_connection(
                    &test_class,
                    Some(test_method),
                    &owner.name,
                    tested_method.cloned(),
                    status,
                );
            }
        }
    }
}

/// Prefix an unqualified test-class name with the declaring class's package.
///
/// Qualified names (containing a separator) are used verbatim, as are names
/// declared in the root package.
fn qualify(test_class: &str, package: &str) -> String {
    if test_class.is_empty() || test_class.contains('.') || package.is_empty() {
        test_class.to_string()
    } else {
        format!("{package}.{test_class}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
