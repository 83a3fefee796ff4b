//! Snapshot persistence for the link repository.
//!
//! The graph is the single artifact shared between build time and run time,
//! so it must survive process boundaries. The snapshot is JSON produced by
//! serde; the round-trip contract is structural equality across every edge
//! and status, including the empty repository.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::repository::LinkRepository;

/// Serialize a repository to its JSON snapshot form.
pub fn to_json(repo: &LinkRepository) -> Result<String> {
    Ok(serde_json::to_string_pretty(repo)?)
}

/// Rebuild a repository from a JSON snapshot.
pub fn from_json(json: &str) -> Result<LinkRepository> {
    Ok(serde_json::from_str(json)?)
}

/// Write a snapshot file at `path`, replacing any previous one.
pub fn save(repo: &LinkRepository, path: &Path) -> Result<()> {
    fs::write(path, to_json(repo)?)?;
    tracing::debug!(path = %path.display(), edges = repo.edge_count(), "saved snapshot");
    Ok(())
}

/// Load a snapshot file from `path`.
pub fn load(path: &Path) -> Result<LinkRepository> {
    from_json(&fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinkStatus, MethodSignature};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_repository_roundtrips() {
        let repo = LinkRepository::new();
        let back = from_json(&to_json(&repo).unwrap()).unwrap();
        assert_eq!(back, repo);
    }

    #[test]
    fn statuses_survive_the_roundtrip() {
        let mut repo = LinkRepository::new();
        repo.add_connection(
            "a.T",
            Some(MethodSignature::named("testX")),
            "a.C",
            None,
            LinkStatus::declared(false).with_run_result(true),
        );
        repo.add_connection("a.U", None, "a.C", None, LinkStatus::observed());
        let back = from_json(&to_json(&repo).unwrap()).unwrap();
        assert_eq!(back, repo);
    }

    #[test]
    fn malformed_snapshot_is_a_serialize_error() {
        let err = from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::error::TestGraphError::Serialize(_)));
    }
}
