//! Per-run index identities.

use rand::Rng;
use serde::Serialize;
use std::fmt;

pub const INDEX_NAME_PREFIX: &str = "test-index-";
/// Suffixes are drawn from `0..INDEX_SUFFIX_RANGE`.
pub const INDEX_SUFFIX_RANGE: u32 = 10_000;

/// `{owner, name}` of an index that lives for one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct IndexHandle {
    pub owner: String,
    pub name: String,
}

impl IndexHandle {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Mint a fresh handle for `owner` with a name drawn from `rng`.
    pub fn mint<R: Rng + ?Sized>(owner: &str, rng: &mut R) -> Self {
        Self::new(owner, index_name(rng))
    }

    /// `owner:name`, as the service addresses the index.
    pub fn id(&self) -> String {
        blackcheck_http::index_id(&self.owner, &self.name)
    }
}

impl fmt::Display for IndexHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner, self.name)
    }
}

/// `test-index-<n>` with `n` drawn from `rng`.
pub fn index_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{}{}", INDEX_NAME_PREFIX, rng.gen_range(0..INDEX_SUFFIX_RANGE))
}

/// Owner-qualified format id: `owner:format-name`.
pub fn format_id(owner: &str, format_name: &str) -> String {
    blackcheck_http::index_id(owner, format_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_index_name_is_deterministic_for_seeded_rng() {
        let a = index_name(&mut StdRng::seed_from_u64(7));
        let b = index_name(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(a.starts_with(INDEX_NAME_PREFIX));
        let suffix: u32 = a[INDEX_NAME_PREFIX.len()..].parse().unwrap();
        assert!(suffix < INDEX_SUFFIX_RANGE);
    }

    #[test]
    fn test_mint_uses_owner() {
        let mut rng = StdRng::seed_from_u64(1);
        let handle = IndexHandle::mint("user", &mut rng);
        assert_eq!(handle.owner, "user");
        assert_eq!(handle.id(), format!("user:{}", handle.name));
        assert_eq!(handle.to_string(), handle.id());
    }

    #[test]
    fn test_consecutive_draws_vary() {
        let mut rng = StdRng::seed_from_u64(42);
        let names: std::collections::HashSet<_> = (0..20).map(|_| index_name(&mut rng)).collect();
        assert!(names.len() > 1);
    }

    #[test]
    fn test_format_id() {
        assert_eq!(format_id("user", "test-input-format"), "user:test-input-format");
    }
}
