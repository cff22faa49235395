use std::cmp::Ordering;

use super::context::Context;
use super::pool::{ItemId, Pool};

/// Policy for ordering candidate providers.
///
/// When several items can satisfy a requirement, the policy determines
/// which alternative is tried first. The first alternative is processed
/// right away, the others are deferred.
#[derive(Debug, Clone)]
pub struct Policy {
    /// Try installed providers before available ones
    pub prefer_installed: bool,
    /// Prefer lowest editions (for testing)
    pub prefer_lowest: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy {
    /// Create a new policy with default settings
    pub fn new() -> Self {
        Self {
            prefer_installed: true,
            prefer_lowest: false,
        }
    }

    /// Set preference for installed providers
    pub fn prefer_installed(mut self, prefer: bool) -> Self {
        self.prefer_installed = prefer;
        self
    }

    /// Set preference for lowest editions
    pub fn prefer_lowest(mut self, prefer: bool) -> Self {
        self.prefer_lowest = prefer;
        self
    }

    /// Sort candidates by preference (best first):
    /// 1. Installed providers
    /// 2. Providers built for exactly the system architecture
    /// 3. Newest edition (oldest with `prefer_lowest`)
    /// 4. Pool order
    pub fn sort_providers(&self, pool: &Pool, context: &Context, candidates: &[ItemId]) -> Vec<ItemId> {
        let mut sorted = candidates.to_vec();
        sorted.sort_by(|&a, &b| self.compare_by_priority(pool, context, a, b));
        sorted.dedup();
        sorted
    }

    /// Select the single best candidate
    pub fn select_best(&self, pool: &Pool, context: &Context, candidates: &[ItemId]) -> Option<ItemId> {
        self.sort_providers(pool, context, candidates).into_iter().next()
    }

    /// Compare two candidates by priority.
    /// Returns Ordering::Less if a is better than b.
    pub fn compare_by_priority(&self, pool: &Pool, context: &Context, a: ItemId, b: ItemId) -> Ordering {
        if self.prefer_installed {
            let a_installed = pool.status(a).is_installed();
            let b_installed = pool.status(b).is_installed();
            if a_installed != b_installed {
                return if a_installed { Ordering::Less } else { Ordering::Greater };
            }
        }

        let system = context.system_arch();
        let a_exact = pool[a].arch == *system;
        let b_exact = pool[b].arch == *system;
        if a_exact != b_exact {
            return if a_exact { Ordering::Less } else { Ordering::Greater };
        }

        let edition_cmp = pool[a].edition.compare(&pool[b].edition);
        let edition_cmp = if self.prefer_lowest {
            edition_cmp
        } else {
            edition_cmp.reverse()
        };
        if edition_cmp != Ordering::Equal {
            return edition_cmp;
        }

        a.cmp(&b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Arch, Item};

    fn context() -> Context {
        Context::new(Arch::new("x86_64"))
    }

    #[test]
    fn test_policy_prefer_newest() {
        let mut pool = Pool::new();
        let id1 = pool.add(Item::package("libfoo", "1.0"));
        let id2 = pool.add(Item::package("libfoo", "2.0"));

        let policy = Policy::new();
        assert_eq!(policy.sort_providers(&pool, &context(), &[id1, id2]), vec![id2, id1]);
        assert_eq!(policy.select_best(&pool, &context(), &[id1, id2]), Some(id2));

        let policy = Policy::new().prefer_lowest(true);
        assert_eq!(policy.select_best(&pool, &context(), &[id1, id2]), Some(id1));
    }

    #[test]
    fn test_policy_prefer_installed() {
        let mut pool = Pool::new();
        let installed = pool.add_installed(Item::package("libfoo", "1.0"));
        let newer = pool.add(Item::package("libfoo", "2.0"));

        let policy = Policy::new();
        assert_eq!(policy.select_best(&pool, &context(), &[newer, installed]), Some(installed));

        let policy = Policy::new().prefer_installed(false);
        assert_eq!(policy.select_best(&pool, &context(), &[newer, installed]), Some(newer));
    }

    #[test]
    fn test_policy_prefer_exact_arch() {
        let mut pool = Pool::new();
        let i586 = pool.add(Item::package("libfoo", "2.0").with_arch("i586"));
        let x86_64 = pool.add(Item::package("libfoo", "1.0").with_arch("x86_64"));

        let policy = Policy::new();
        assert_eq!(policy.sort_providers(&pool, &context(), &[i586, x86_64]), vec![x86_64, i586]);
    }

    #[test]
    fn test_policy_pool_order_breaks_ties() {
        let mut pool = Pool::new();
        let first = pool.add(Item::package("foo", "1.0"));
        let second = pool.add(Item::package("bar", "1.0"));

        let policy = Policy::new();
        assert_eq!(policy.sort_providers(&pool, &context(), &[second, first]), vec![first, second]);
    }
}
