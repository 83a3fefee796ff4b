//! TestGraph — test-to-code traceability graph library.
//!
//! Builds and maintains a bipartite graph linking production classes and
//! methods to the test classes and methods declared (or observed) to exercise
//! them, so that after a code change only the affected tests need to run.
//! Declarations are resolved through interface and superclass hierarchies;
//! unresolvable references stay in the graph as invalid links rather than
//! becoming errors.

pub mod builder;
pub mod error;
pub mod hierarchy;
pub mod model;
pub mod observability;
pub mod repository;
pub mod runner;
pub mod snapshot;
