//! Git operations: repository discovery, commit listing, and changed files.

pub mod commit;
pub mod repository;

pub use commit::{AnnotatedCommit, Commit};
pub use repository::GitRepository;

/// Number of hex characters to show in abbreviated commit hashes.
pub const SHORT_HASH_LEN: usize = 8;

/// Returns the abbreviated form of a commit hash.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..SHORT_HASH_LEN).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hash_truncates_full_hashes() {
        assert_eq!(
            short_hash("0123456789abcdef0123456789abcdef01234567"),
            "01234567"
        );
    }

    #[test]
    fn short_hash_keeps_short_identifiers() {
        assert_eq!(short_hash("h1"), "h1");
    }
}
