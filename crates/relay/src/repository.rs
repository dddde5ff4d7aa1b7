//! Derives the GitHub `owner/repo` from a CodePipeline revision URL.
//!
//! Two URL shapes are recognised:
//!
//! | Source action | Revision URL |
//! |---------------|--------------|
//! | CodeStar connection | `https://{region}.console.aws.amazon.com/codesuite/settings/connections/redirect?connectionArn=...&referenceType=COMMIT&FullRepositoryId=acme/widgets&Commit=deadbeef` |
//! | GitHub (OAuth) | `https://github.com/acme/widgets/commit/deadbeef` |
//!
//! The second shape is matched positionally: the whole URL is split on `/`
//! and segments 3 and 4 are taken. That assumes the repository sits directly
//! under the host, which is what GitHub revision URLs look like today. Any
//! other layout yields a wrong but well-formed identifier, so the fixture in
//! the tests below must be refreshed if the provider changes its URL format.

use crate::{RelayError, RepositoryId};

const FULL_REPOSITORY_ID_MARKER: &str = "FullRepositoryId=";
const OWNER_SEGMENT: usize = 3;
const REPO_SEGMENT: usize = 4;

/// Extracts the `owner/repo` identifier from `revision_url`.
pub fn extract_repository_id(revision_url: &str) -> Result<RepositoryId, RelayError> {
    let malformed = || RelayError::MalformedRevisionUrl {
        url: revision_url.to_string(),
    };

    if let Some((_, rest)) = revision_url.split_once(FULL_REPOSITORY_ID_MARKER) {
        let repo = rest.split('&').next().unwrap_or_default();
        return RepositoryId::new(repo).ok_or_else(malformed);
    }

    let segments: Vec<&str> = revision_url.split('/').collect();
    match (segments.get(OWNER_SEGMENT), segments.get(REPO_SEGMENT)) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
            RepositoryId::new(format!("{owner}/{repo}")).ok_or_else(malformed)
        }
        _ => Err(malformed()),
    }
}
