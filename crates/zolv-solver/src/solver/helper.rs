//! Lookups by name and kind used when seeding requests and by the
//! single-step transaction.

use std::cmp::Ordering;

use super::pool::{ItemId, Pool};
use crate::item::Kind;

/// Find the installed item with the given name and kind.
pub fn find_installed_by_name_and_kind(pool: &Pool, name: &str, kind: Kind) -> Option<ItemId> {
    pool.by_name(kind, name)
        .iter()
        .copied()
        .find(|&id| pool.status(id).is_installed())
}

/// Find the best available item with the given name and kind: the newest
/// edition, the first one in pool order on ties.
pub fn find_uninstalled_by_name_and_kind(pool: &Pool, name: &str, kind: Kind) -> Option<ItemId> {
    let mut best: Option<ItemId> = None;
    for &id in pool.by_name(kind, name) {
        if pool.status(id).is_installed() {
            continue;
        }
        match best {
            Some(current) if pool[id].edition.compare(&pool[current].edition) != Ordering::Greater => {}
            _ => best = Some(id),
        }
    }
    best
}

/// Find an available item that can replace an installed one: the same
/// edition and architecture if offered, otherwise the newest available
/// edition of the same name and kind.
pub fn find_reinstall_item(pool: &Pool, installed: ItemId) -> Option<ItemId> {
    let item = &pool[installed];

    let exact = pool.by_name(item.kind, &item.name).iter().copied().find(|&id| {
        id != installed
            && !pool.status(id).is_installed()
            && pool[id].edition == item.edition
            && pool[id].arch == item.arch
    });

    exact.or_else(|| find_uninstalled_by_name_and_kind(pool, &item.name, item.kind))
}
