//! Runner boundary: the contract for executing affected tests.
//!
//! Execution itself (process spawning, instrumentation, framework glue) lives
//! outside this crate. What lives here is the contract an implementation must
//! satisfy and the selection logic both sides share: given the changed units,
//! which test links does the graph say are affected?

use crate::error::Result;
use crate::hierarchy::ClassCatalog;
use crate::model::{push_unique, MethodLink};
use crate::repository::LinkRepository;

// ---------------------------------------------------------------------------
// TestRunner
// ---------------------------------------------------------------------------

/// External collaborator that executes affected tests and reports back.
///
/// Contract:
/// - execute exactly the tests connected (directly or through hierarchy) to a
///   changed tested unit, plus every test of a directly changed test class;
/// - merge freshly observed status into `prior` without discarding unaffected
///   links (see [`LinkRepository::merge`] and
///   [`LinkRepository::record_run_result`]);
/// - record failure status on the corresponding links and keep processing
///   unrelated links when an individual test fails;
/// - return `Err` only for environment-level failure (unable to execute tests
///   at all), never for a failing test.
pub trait TestRunner {
    fn run(
        &mut self,
        changed_tested: &[String],
        changed_tests: &[String],
        prior: LinkRepository,
    ) -> Result<LinkRepository>;
}

// ---------------------------------------------------------------------------
// Affected-test selection
// ---------------------------------------------------------------------------

/// The test links affected by a change set.
///
/// Unions, per changed tested class, every link reachable through its
/// hierarchy, then every link owned by a directly changed test class.
/// Whole-class links (no test method named) are included — they tell the
/// runner to execute the entire class. Invalid links are included as well;
/// callers filter on `status.valid` before execution.
pub fn affected_tests(
    repo: &LinkRepository,
    catalog: &ClassCatalog,
    changed_tested: &[String],
    changed_tests: &[String],
) -> Vec<MethodLink> {
    let mut out = Vec::new();
    for tested in changed_tested {
        let linear = catalog.linearize(tested);
        let scope: Vec<&str> = if linear.is_empty() {
            vec![tested.as_str()]
        } else {
            linear.iter().map(|c| c.name.as_str()).collect()
        };
        for name in scope {
            for edge in repo.edges_for_tested(name) {
                push_unique(&mut out, edge.test_method_link());
            }
        }
    }
    for test_class in changed_tests {
        for edge in repo.edges_for_test(test_class) {
            push_unique(&mut out, edge.test_method_link());
        }
    }
    tracing::debug!(
        affected = out.len(),
        tested = changed_tested.len(),
        tests = changed_tests.len(),
        "selected affected tests"
    );
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
