//! The graph store: bidirectionally indexed link repository.
//!
//! Every edge is held twice — under its tested class and under its test
//! class — so both query directions are a single map lookup. Insertion is a
//! structural upsert: an edge whose endpoints already exist replaces the
//! stored status instead of accumulating a duplicate, which is what makes
//! revisiting a diamond ancestor during the build walk harmless.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hierarchy::ClassCatalog;
use crate::model::{push_unique, ClassLink, Edge, LinkEndpoint, LinkStatus, MethodLink, MethodSignature};

// ---------------------------------------------------------------------------
// LinkRepository
// ---------------------------------------------------------------------------

/// Mutable store of test/tested links with hierarchy-aware queries.
///
/// State changes only through [`add_connection`](Self::add_connection),
/// [`merge`](Self::merge), [`replace`](Self::replace),
/// [`record_run_result`](Self::record_run_result), and
/// [`clear_just_created`](Self::clear_just_created); queries are read-only
/// and reflect the latest insert immediately. The repository itself is not
/// synchronized — concurrent writers must be serialized by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRepository {
    by_tested: BTreeMap<String, Vec<Edge>>,
    by_test: BTreeMap<String, Vec<Edge>>,
}

impl LinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    // -- mutation ----------------------------------------------------------

    /// Idempotent structural upsert of one edge.
    ///
    /// `None` on a method side means the edge is class-level on that side.
    /// Re-inserting an identical edge is a no-op; re-inserting the same
    /// endpoints with a different status replaces the stored status.
    pub fn add_connection(
        &mut self,
        test_class: &str,
        test_method: Option<MethodSignature>,
        tested_class: &str,
        tested_method: Option<MethodSignature>,
        status: LinkStatus,
    ) {
        self.insert_edge(Edge {
            tested: LinkEndpoint::new(
                tested_class,
                tested_method.unwrap_or_else(MethodSignature::whole_class),
            ),
            test: LinkEndpoint::new(
                test_class,
                test_method.unwrap_or_else(MethodSignature::whole_class),
            ),
            status,
        });
    }

    fn insert_edge(&mut self, edge: Edge) {
        upsert(
            self.by_tested.entry(edge.tested.class.clone()).or_default(),
            &edge,
        );
        upsert(
            self.by_test.entry(edge.test.class.clone()).or_default(),
            &edge,
        );
    }

    /// Fold every edge of `other` into this repository.
    ///
    /// Prior edges not present in `other` are retained; on identity collision
    /// the incoming status wins.
    pub fn merge(&mut self, other: &LinkRepository) {
        for edge in other.edges() {
            self.insert_edge(edge.clone());
        }
        tracing::debug!(edges = self.edge_count(), "merged repository");
    }

    /// Whole-graph replacement.
    pub fn replace(&mut self, other: LinkRepository) {
        *self = other;
    }

    /// Record a run result on every edge whose test endpoint matches.
    ///
    /// With `test_method = None` the result applies to every edge of the test
    /// class; otherwise only to edges with exactly that test signature.
    pub fn record_run_result(
        &mut self,
        test_class: &str,
        test_method: Option<&MethodSignature>,
        passed: bool,
    ) {
        if let Some(edges) = self.by_test.get_mut(test_class) {
            for edge in edges.iter_mut() {
                if test_method.map_or(true, |m| edge.test.method == *m) {
                    edge.status.passed_on_last_run = Some(passed);
                }
            }
        }
        for edges in self.by_tested.values_mut() {
            for edge in edges.iter_mut() {
                if edge.test.class == test_class
                    && test_method.map_or(true, |m| edge.test.method == *m)
                {
                    edge.status.passed_on_last_run = Some(passed);
                }
            }
        }
    }

    /// Clear the `just_created` marker graph-wide, the lifecycle step that
    /// follows a successful merge/persist.
    pub fn clear_just_created(&mut self) {
        for edges in self.by_tested.values_mut().chain(self.by_test.values_mut()) {
            for edge in edges.iter_mut() {
                edge.status.just_created = false;
            }
        }
    }

    // -- raw access --------------------------------------------------------

    /// All stored edges, ordered by tested class.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.by_tested.values().flatten()
    }

    /// Edges whose tested side is `tested_class` (direct only).
    pub fn edges_for_tested(&self, tested_class: &str) -> &[Edge] {
        self.by_tested
            .get(tested_class)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Edges whose test side is `test_class`.
    pub fn edges_for_test(&self, test_class: &str) -> &[Edge] {
        self.by_test
            .get(test_class)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn edge_count(&self) -> usize {
        self.by_tested.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tested.is_empty()
    }

    // -- tested-side queries -----------------------------------------------

    /// Test classes linked to `tested_class`.
    ///
    /// With `direct_only` the result covers edges owned by the class itself;
    /// otherwise it is the deduplicated union over the class and every
    /// ancestor interface / non-platform superclass known to `catalog`.
    /// Class-level links are aggregated from method edges, so a test class
    /// referenced only at method granularity still appears here.
    pub fn test_classes_for(
        &self,
        tested_class: &str,
        catalog: &ClassCatalog,
        direct_only: bool,
    ) -> Vec<ClassLink> {
        if direct_only {
            self.direct_test_classes(tested_class)
        } else {
            self.test_classes_hierarchy_of(tested_class, catalog)
        }
    }

    /// Hierarchy-inclusive form of [`test_classes_for`](Self::test_classes_for).
    pub fn test_classes_hierarchy_of(
        &self,
        tested_class: &str,
        catalog: &ClassCatalog,
    ) -> Vec<ClassLink> {
        let mut out = Vec::new();
        for name in hierarchy_scope(tested_class, catalog) {
            for link in self.direct_test_classes(&name) {
                push_unique(&mut out, link);
            }
        }
        out
    }

    /// Test methods linked to `tested_class`, direct or hierarchy-inclusive.
    ///
    /// Only edges with a named test method qualify; class-level edges surface
    /// through [`test_classes_for`](Self::test_classes_for) instead.
    pub fn test_methods_for(
        &self,
        tested_class: &str,
        catalog: &ClassCatalog,
        direct_only: bool,
    ) -> Vec<MethodLink> {
        if direct_only {
            self.direct_test_methods(tested_class)
        } else {
            self.test_methods_hierarchy_of(tested_class, catalog)
        }
    }

    /// Hierarchy-inclusive form of [`test_methods_for`](Self::test_methods_for).
    pub fn test_methods_hierarchy_of(
        &self,
        tested_class: &str,
        catalog: &ClassCatalog,
    ) -> Vec<MethodLink> {
        let mut out = Vec::new();
        for name in hierarchy_scope(tested_class, catalog) {
            for link in self.direct_test_methods(&name) {
                push_unique(&mut out, link);
            }
        }
        out
    }

    /// Test links whose tested endpoint is exactly `tested_class` + `method`.
    pub fn test_methods_for_method(
        &self,
        tested_class: &str,
        method: &MethodSignature,
    ) -> Vec<MethodLink> {
        let mut out = Vec::new();
        for edge in self
            .edges_for_tested(tested_class)
            .iter()
            .filter(|e| e.tested.method == *method)
        {
            push_unique(&mut out, edge.test_method_link());
        }
        out
    }

    fn direct_test_classes(&self, tested_class: &str) -> Vec<ClassLink> {
        let mut out = Vec::new();
        for edge in self.edges_for_tested(tested_class) {
            push_unique(&mut out, edge.test_class_link());
        }
        out
    }

    fn direct_test_methods(&self, tested_class: &str) -> Vec<MethodLink> {
        let mut out = Vec::new();
        for edge in self
            .edges_for_tested(tested_class)
            .iter()
            .filter(|e| !e.test.method.is_whole_class())
        {
            push_unique(&mut out, edge.test_method_link());
        }
        out
    }

    // -- test-side queries -------------------------------------------------

    /// Tested classes exercised by `test_class`.
    pub fn tested_classes_for(&self, test_class: &str) -> Vec<ClassLink> {
        let mut out = Vec::new();
        for edge in self.edges_for_test(test_class) {
            push_unique(&mut out, edge.tested_class_link());
        }
        out
    }

    /// Tested methods exercised by `test_class`.
    pub fn tested_methods_for(&self, test_class: &str) -> Vec<MethodLink> {
        let mut out = Vec::new();
        for edge in self
            .edges_for_test(test_class)
            .iter()
            .filter(|e| !e.tested.method.is_whole_class())
        {
            push_unique(&mut out, edge.tested_method_link());
        }
        out
    }

    // -- global extraction -------------------------------------------------

    pub fn all_test_classes(&self) -> Vec<ClassLink> {
        let mut out = Vec::new();
        for edge in self.by_test.values().flatten() {
            push_unique(&mut out, edge.test_class_link());
        }
        out
    }

    pub fn all_tested_classes(&self) -> Vec<ClassLink> {
        let mut out = Vec::new();
        for edge in self.by_tested.values().flatten() {
            push_unique(&mut out, edge.tested_class_link());
        }
        out
    }

    pub fn all_test_methods(&self) -> Vec<MethodLink> {
        let mut out = Vec::new();
        for edge in self
            .by_test
            .values()
            .flatten()
            .filter(|e| !e.test.method.is_whole_class())
        {
            push_unique(&mut out, edge.test_method_link());
        }
        out
    }

    pub fn all_tested_methods(&self) -> Vec<MethodLink> {
        let mut out = Vec::new();
        for edge in self
            .by_tested
            .values()
            .flatten()
            .filter(|e| !e.tested.method.is_whole_class())
        {
            push_unique(&mut out, edge.tested_method_link());
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Replace the status of an identity-equal edge, or append.
fn upsert(edges: &mut Vec<Edge>, edge: &Edge) {
    match edges.iter_mut().find(|e| e.same_identity(edge)) {
        Some(existing) => existing.status = edge.status,
        None => edges.push(edge.clone()),
    }
}

/// Class names queried by a hierarchy-inclusive operation.
///
/// A class unknown to the catalog still has its own direct links queried —
/// the graph can hold links for classes that were never cataloged (e.g.
/// observed at runtime).
fn hierarchy_scope(class_name: &str, catalog: &ClassCatalog) -> Vec<String> {
    let linear = catalog.linearize(class_name);
    if linear.is_empty() {
        vec![class_name.to_string()]
    } else {
        linear.iter().map(|c| c.name.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{ClassInfo, LinkDeclaration};
    use pretty_assertions::assert_eq;

    fn sig(name: &str) -> MethodSignature {
        MethodSignature::named(name)
    }

    fn valid() -> LinkStatus {
        LinkStatus::declared(true)
    }

    #[test]
    fn double_insert_is_unobservable() {
        let mut repo = LinkRepository::new();
        repo.add_connection("a.T", Some(sig("testX")), "a.C", None, valid());
        repo.add_connection("a.T", Some(sig("testX")), "a.C", None, valid());
        assert_eq!(repo.edge_count(), 1);
        assert_eq!(repo.all_test_methods().len(), 1);
    }

    #[test]
    fn reinsert_with_new_status_replaces() {
        let mut repo = LinkRepository::new();
        repo.add_connection("a.T", Some(sig("testX")), "a.C", None, LinkStatus::declared(false));
        repo.add_connection("a.T", Some(sig("testX")), "a.C", None, valid());
        assert_eq!(repo.edge_count(), 1);
        let links = repo.tested_classes_for("a.T");
        assert_eq!(links.len(), 1);
        assert!(links[0].status.valid);
    }

    #[test]
    fn class_level_links_aggregate_from_method_edges() {
        let mut repo = LinkRepository::new();
        repo.add_connection("a.T", Some(sig("testX")), "a.C", None, valid());
        repo.add_connection("a.T", Some(sig("testY")), "a.C", None, valid());
        let catalog = ClassCatalog::new();
        let classes = repo.test_classes_for("a.C", &catalog, true);
        assert_eq!(classes, vec![ClassLink::new("a.T", valid())]);
        assert_eq!(repo.test_methods_for("a.C", &catalog, true).len(), 2);
    }

    #[test]
    fn whole_class_edges_are_not_method_links() {
        let mut repo = LinkRepository::new();
        repo.add_connection("a.Missing", None, "a.C", None, LinkStatus::declared(false));
        let catalog = ClassCatalog::new();
        assert!(repo.test_methods_for("a.C", &catalog, true).is_empty());
        assert_eq!(repo.test_classes_for("a.C", &catalog, true).len(), 1);
        assert!(repo.all_test_methods().is_empty());
        assert_eq!(repo.all_test_classes().len(), 1);
    }

    #[test]
    fn per_method_query_matches_tested_signature_exactly() {
        let mut repo = LinkRepository::new();
        repo.add_connection("a.T", Some(sig("testX")), "a.C", Some(sig("render")), valid());
        repo.add_connection("a.T", Some(sig("testY")), "a.C", Some(sig("layout")), valid());
        let hits = repo.test_methods_for_method("a.C", &sig("render"));
        assert_eq!(hits, vec![MethodLink::new("a.T", sig("testX"), valid())]);
        assert!(repo.test_methods_for_method("a.C", &sig("paint")).is_empty());
    }

    #[test]
    fn hierarchy_queries_union_over_ancestors() {
        let mut catalog = ClassCatalog::new();
        catalog.insert(ClassInfo::new("a.IBase").with_link(LinkDeclaration::class_only("a.BaseTest")));
        catalog.insert(ClassInfo::new("a.C").implementing("a.IBase"));
        let mut repo = LinkRepository::new();
        repo.add_connection("a.CTest", Some(sig("testX")), "a.C", None, valid());
        repo.add_connection("a.BaseTest", Some(sig("testB")), "a.IBase", None, valid());

        let direct = repo.test_classes_for("a.C", &catalog, true);
        assert_eq!(direct, vec![ClassLink::new("a.CTest", valid())]);

        let full = repo.test_classes_hierarchy_of("a.C", &catalog);
        assert_eq!(
            full,
            vec![
                ClassLink::new("a.CTest", valid()),
                ClassLink::new("a.BaseTest", valid()),
            ]
        );
        assert_eq!(repo.test_methods_hierarchy_of("a.C", &catalog).len(), 2);
    }

    #[test]
    fn hierarchy_query_on_uncataloged_class_falls_back_to_direct() {
        let mut repo = LinkRepository::new();
        repo.add_connection("a.T", Some(sig("testX")), "a.Observed", None, valid());
        let catalog = ClassCatalog::new();
        assert_eq!(repo.test_classes_for("a.Observed", &catalog, false).len(), 1);
    }

    #[test]
    fn reverse_queries_see_the_tested_side() {
        let mut repo = LinkRepository::new();
        repo.add_connection("a.T", Some(sig("testX")), "a.C", Some(sig("render")), valid());
        assert_eq!(repo.tested_classes_for("a.T"), vec![ClassLink::new("a.C", valid())]);
        assert_eq!(
            repo.tested_methods_for("a.T"),
            vec![MethodLink::new("a.C", sig("render"), valid())]
        );
    }

    #[test]
    fn merge_keeps_unaffected_edges_and_adopts_incoming_status() {
        let mut prior = LinkRepository::new();
        prior.add_connection("a.T", Some(sig("testX")), "a.C", None, valid());
        prior.add_connection("a.T", Some(sig("testY")), "a.D", None, valid());

        let mut fresh = LinkRepository::new();
        fresh.add_connection(
            "a.T",
            Some(sig("testX")),
            "a.C",
            None,
            valid().with_run_result(false),
        );
        fresh.add_connection("a.U", Some(sig("testZ")), "a.E", None, LinkStatus::observed());

        prior.merge(&fresh);
        assert_eq!(prior.edge_count(), 3);
        let updated = repo_status(&prior, "a.C");
        assert_eq!(updated.passed_on_last_run, Some(false));
    }

    fn repo_status(repo: &LinkRepository, tested: &str) -> LinkStatus {
        repo.edges_for_tested(tested)[0].status
    }

    #[test]
    fn replace_discards_prior_graph() {
        let mut repo = LinkRepository::new();
        repo.add_connection("a.T", Some(sig("testX")), "a.C", None, valid());
        let mut next = LinkRepository::new();
        next.add_connection("a.U", Some(sig("testZ")), "a.E", None, valid());
        repo.replace(next.clone());
        assert_eq!(repo, next);
    }

    #[test]
    fn record_run_result_updates_both_indexes() {
        let mut repo = LinkRepository::new();
        repo.add_connection("a.T", Some(sig("testX")), "a.C", None, valid());
        repo.add_connection("a.T", Some(sig("testY")), "a.C", None, valid());
        repo.record_run_result("a.T", Some(&sig("testX")), false);

        let by_tested: Vec<_> = repo
            .edges_for_tested("a.C")
            .iter()
            .map(|e| (e.test.method.clone(), e.status.passed_on_last_run))
            .collect();
        assert_eq!(
            by_tested,
            vec![(sig("testX"), Some(false)), (sig("testY"), None)]
        );
        let by_test: Vec<_> = repo
            .edges_for_test("a.T")
            .iter()
            .map(|e| e.status.passed_on_last_run)
            .collect();
        assert_eq!(by_test, vec![Some(false), None]);
    }

    #[test]
    fn record_run_result_without_method_covers_the_class() {
        let mut repo = LinkRepository::new();
        repo.add_connection("a.T", Some(sig("testX")), "a.C", None, valid());
        repo.add_connection("a.T", Some(sig("testY")), "a.D", None, valid());
        repo.record_run_result("a.T", None, true);
        assert!(repo
            .edges()
            .all(|e| e.status.passed_on_last_run == Some(true)));
    }

    #[test]
    fn clear_just_created_settles_the_graph() {
        let mut repo = LinkRepository::new();
        repo.add_connection("a.T", Some(sig("testX")), "a.C", None, LinkStatus::observed());
        assert!(repo.edges().all(|e| e.status.just_created));
        repo.clear_just_created();
        assert!(repo.edges().all(|e| !e.status.just_created));
        assert!(repo
            .edges_for_test("a.T")
            .iter()
            .all(|e| !e.status.just_created));
    }

    #[test]
    fn empty_repository_queries() {
        let repo = LinkRepository::new();
        let catalog = ClassCatalog::new();
        assert!(repo.is_empty());
        assert_eq!(repo.edge_count(), 0);
        assert!(repo.test_classes_for("a.C", &catalog, false).is_empty());
        assert!(repo.all_test_classes().is_empty());
        assert!(repo.all_tested_methods().is_empty());
    }
}
