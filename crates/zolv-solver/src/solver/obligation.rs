use std::cmp::Ordering;
use std::fmt;

use super::context::Context;
use super::helper::find_reinstall_item;
use super::info::{InfoKind, ResolverInfo};
use super::policy::Policy;
use super::pool::{ItemId, Pool};
use crate::item::{Capability, Dep};

/// One pending unit of resolver work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Obligation {
    /// Install an item. Soft installs are dropped silently when impossible.
    Install { item: ItemId, soft: bool },
    /// Remove an installed item. In remove-only mode items requiring it are
    /// only checked, never satisfied by installing something else.
    Remove {
        item: ItemId,
        remove_only: bool,
        due_to_upgrade: bool,
    },
    /// Re-check an installed item
    Verify { item: ItemId },
    /// Establish the state of an item (satisfied, incomplete or unneeded)
    Establish { item: ItemId },
    /// A capability the request demands
    ExtraCapability { cap: Capability },
    /// A capability no present item may provide
    ExtraConflict { cap: Capability },
    /// A requirement of `origin` (or of the request if `None`)
    Require {
        origin: Option<ItemId>,
        cap: Capability,
        soft: bool,
        allow_install: bool,
    },
    /// A conflict of `origin` (or of the request if `None`)
    Conflict {
        origin: Option<ItemId>,
        cap: Capability,
    },
}

/// One branch of a fork: the decision committed into the copied path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alternative {
    /// Install `item`, ruling out the candidates tried before it
    Install { item: ItemId, exclude: Vec<ItemId> },
    /// Install `item` softly; a failure leaves the sibling `Skip` path
    TryInstall { item: ItemId },
    /// Install none of the candidates
    Skip { exclude: Vec<ItemId> },
}

impl Alternative {
    /// Alternatives that must be searched next to the first one rather than
    /// parked: skipping a recommendation competes with installing it.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Alternative::Skip { .. })
    }
}

/// Result of advancing an obligation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The context was updated; follow-up obligations were queued
    Done,
    /// Several outcomes are possible; the path must be split
    Fork(Vec<Alternative>),
    /// The obligation cannot be fulfilled on this path
    Unsatisfiable,
}

impl Obligation {
    /// Processing priority, lower is processed first. Branching
    /// requirements come last so every deterministic consequence is known
    /// before the search tree grows.
    pub fn priority(&self) -> u8 {
        match self {
            Obligation::Remove { .. } => 0,
            Obligation::Install { .. } | Obligation::Conflict { .. } | Obligation::ExtraConflict { .. } => 1,
            Obligation::Verify { .. } | Obligation::Establish { .. } => 2,
            Obligation::ExtraCapability { .. } => 3,
            Obligation::Require { soft: false, .. } => 4,
            Obligation::Require { soft: true, .. } => 5,
        }
    }

    /// Compare two obligations by priority.
    /// Returns Ordering::Less if a is processed before b.
    pub fn compare_by_priority(a: &Obligation, b: &Obligation) -> Ordering {
        a.priority().cmp(&b.priority())
    }

    /// Advance this obligation on `context`, appending follow-up obligations
    /// to `queue`.
    pub fn advance(
        self,
        pool: &Pool,
        policy: &Policy,
        context: &mut Context,
        queue: &mut Vec<Obligation>,
    ) -> Advance {
        match self {
            Obligation::Install { item, soft } => install(pool, context, queue, item, soft),
            Obligation::Remove {
                item,
                remove_only,
                due_to_upgrade,
            } => remove(pool, context, queue, item, remove_only, due_to_upgrade),
            Obligation::Verify { item } => verify(pool, context, queue, item),
            Obligation::Establish { item } => establish(pool, context, queue, item),
            Obligation::ExtraCapability { cap } => require(pool, policy, context, queue, None, cap, false, true),
            Obligation::ExtraConflict { cap } => conflict(pool, context, queue, None, cap),
            Obligation::Require {
                origin,
                cap,
                soft,
                allow_install,
            } => require(pool, policy, context, queue, origin, cap, soft, allow_install),
            Obligation::Conflict { origin, cap } => conflict(pool, context, queue, origin, cap),
        }
    }
}

impl fmt::Display for Obligation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Obligation::Install { item, soft } => {
                write!(f, "{}Install #{}", if *soft { "Soft" } else { "" }, item)
            }
            Obligation::Remove {
                item,
                remove_only,
                due_to_upgrade,
            } => {
                write!(f, "Remove #{}", item)?;
                if *remove_only {
                    write!(f, " (remove-only)")?;
                }
                if *due_to_upgrade {
                    write!(f, " (upgrade)")?;
                }
                Ok(())
            }
            Obligation::Verify { item } => write!(f, "Verify #{}", item),
            Obligation::Establish { item } => write!(f, "Establish #{}", item),
            Obligation::ExtraCapability { cap } => write!(f, "ExtraCapability {}", cap),
            Obligation::ExtraConflict { cap } => write!(f, "ExtraConflict {}", cap),
            Obligation::Require {
                origin, cap, soft, ..
            } => {
                write!(f, "{}Require {}", if *soft { "Soft" } else { "" }, cap)?;
                if let Some(origin) = origin {
                    write!(f, " by #{}", origin)?;
                }
                Ok(())
            }
            Obligation::Conflict { origin, cap } => {
                write!(f, "Conflict {}", cap)?;
                if let Some(origin) = origin {
                    write!(f, " by #{}", origin)?;
                }
                Ok(())
            }
        }
    }
}

/// Report an obligation that cannot be fulfilled.
///
/// Soft obligations only leave a note. When resolving is forced the
/// obligation is skipped and counted against the context; otherwise the
/// path becomes invalid.
fn fail(context: &mut Context, info: ResolverInfo, soft: bool) -> Advance {
    if soft {
        context.add_info(info);
        return Advance::Done;
    }
    if context.force_resolve() {
        context.add_unresolved(info.affected, info.capability.clone());
        return Advance::Done;
    }
    context.add_info(info.as_error());
    Advance::Unsatisfiable
}

/// Whether an available item may still be installed on this path
fn is_installable(pool: &Pool, context: &Context, id: ItemId) -> bool {
    let status = pool.status(id);
    if status.is_installed() || status.is_locked() || context.is_excluded(id) {
        return false;
    }
    if context.decision(id).map(|s| s.is_transact()).unwrap_or(false) {
        return false;
    }
    let item = &pool[id];
    if !context.arch_allowed(&item.arch) {
        return false;
    }
    // Another edition of the same item already chosen, or a locked one installed
    !pool.by_name(item.kind, &item.name).iter().any(|&other| {
        other != id
            && (context.is_to_be_installed(other)
                || (pool.status(other).is_locked() && pool.status(other).is_installed()))
    })
}

fn install(pool: &Pool, context: &mut Context, queue: &mut Vec<Obligation>, item: ItemId, soft: bool) -> Advance {
    if context.is_to_be_installed(item) {
        return Advance::Done;
    }

    let status = pool.status(item);
    if status.is_installed() {
        if context.is_to_be_uninstalled(item) {
            return fail(context, ResolverInfo::new(InfoKind::Contradiction, Some(item)), soft);
        }
        return Advance::Done;
    }

    let target = &pool[item];
    if status.is_locked() {
        return fail(context, ResolverInfo::new(InfoKind::Locked, Some(item)), soft);
    }
    if context.is_excluded(item) {
        return fail(context, ResolverInfo::new(InfoKind::Contradiction, Some(item)), soft);
    }
    if !context.arch_allowed(&target.arch) {
        return fail(context, ResolverInfo::new(InfoKind::IncompatibleArch, Some(item)), soft);
    }

    let mut upgrades = Vec::new();
    for &other in pool.by_name(target.kind, &target.name) {
        if other == item {
            continue;
        }
        let other_status = pool.status(other);
        if !other_status.is_installed() {
            if context.is_to_be_installed(other) {
                let info = ResolverInfo::new(InfoKind::Contradiction, Some(item)).with_other(other);
                return fail(context, info, soft);
            }
            continue;
        }
        if !context.is_present(pool, other) {
            continue;
        }
        if other_status.is_locked() {
            let info = ResolverInfo::new(InfoKind::Locked, Some(other)).with_other(item);
            return fail(context, info, soft);
        }
        upgrades.push(other);
    }

    if !context.install(pool, item) {
        return fail(context, ResolverInfo::new(InfoKind::Contradiction, Some(item)), soft);
    }

    for other in upgrades {
        if pool[other].edition.compare(&target.edition) == Ordering::Greater {
            log::debug!("Downgrading {} to {}", pool[other], target);
            context.count_downgrade();
        }
        queue.push(Obligation::Remove {
            item: other,
            remove_only: false,
            due_to_upgrade: true,
        });
    }

    for cap in target.dep(Dep::Requires) {
        queue.push(Obligation::Require {
            origin: Some(item),
            cap: cap.clone(),
            soft: false,
            allow_install: true,
        });
    }
    for cap in target.dep(Dep::Recommends) {
        queue.push(Obligation::Require {
            origin: Some(item),
            cap: cap.clone(),
            soft: true,
            allow_install: true,
        });
    }
    for cap in target.dep(Dep::Conflicts) {
        queue.push(Obligation::Conflict {
            origin: Some(item),
            cap: cap.clone(),
        });
    }

    for cap in target.dep(Dep::Obsoletes) {
        if context.obsoletes_ignored(item, cap) {
            continue;
        }
        for obsoleted in pool.installed_providers(cap) {
            if obsoleted == item
                || pool[obsoleted].same_name_and_kind(target)
                || !context.is_present(pool, obsoleted)
            {
                continue;
            }
            if pool.status(obsoleted).is_locked() {
                let info = ResolverInfo::new(InfoKind::Locked, Some(obsoleted)).with_other(item);
                return fail(context, info, soft);
            }
            context.add_info(ResolverInfo::new(InfoKind::Obsoletes, Some(obsoleted)).with_other(item));
            queue.push(Obligation::Remove {
                item: obsoleted,
                remove_only: false,
                due_to_upgrade: true,
            });
        }
    }

    for (conflicter, cap) in pool.conflicters_of(item) {
        if conflicter != item && context.is_present(pool, conflicter) {
            queue.push(Obligation::Conflict {
                origin: Some(conflicter),
                cap,
            });
        }
    }

    Advance::Done
}

fn remove(
    pool: &Pool,
    context: &mut Context,
    queue: &mut Vec<Obligation>,
    item: ItemId,
    remove_only: bool,
    due_to_upgrade: bool,
) -> Advance {
    let status = pool.status(item);
    if !status.is_installed() {
        if context.is_to_be_installed(item) {
            return fail(context, ResolverInfo::new(InfoKind::Contradiction, Some(item)), false);
        }
        context.exclude(item);
        return Advance::Done;
    }
    if context.is_to_be_uninstalled(item) {
        return Advance::Done;
    }
    if status.is_locked() {
        return fail(context, ResolverInfo::new(InfoKind::Locked, Some(item)), false);
    }
    if !context.uninstall(pool, item, due_to_upgrade) {
        return fail(context, ResolverInfo::new(InfoKind::Contradiction, Some(item)), false);
    }

    for (requirer, cap) in pool.requirers_of(item) {
        if requirer == item || !context.is_present(pool, requirer) || context.installed_ignored(requirer) {
            continue;
        }
        queue.push(Obligation::Require {
            origin: Some(requirer),
            cap,
            soft: false,
            allow_install: !remove_only,
        });
    }

    Advance::Done
}

fn verify(pool: &Pool, context: &mut Context, queue: &mut Vec<Obligation>, item: ItemId) -> Advance {
    if !context.is_present(pool, item) {
        return Advance::Done;
    }

    if pool.status(item).is_incomplete() {
        match find_reinstall_item(pool, item) {
            Some(reinstall) => {
                log::info!("Reinstall {} for incomplete {}", pool[reinstall], pool[item]);
                queue.push(Obligation::Install {
                    item: reinstall,
                    soft: false,
                });
            }
            None => {
                log::warn!("Can't find {} for re-installation", pool[item]);
                context.add_info(ResolverInfo::new(InfoKind::ReinstallMissing, Some(item)));
            }
        }
        return Advance::Done;
    }

    let target = &pool[item];
    for cap in target.dep(Dep::Requires) {
        queue.push(Obligation::Require {
            origin: Some(item),
            cap: cap.clone(),
            soft: false,
            allow_install: true,
        });
    }
    for cap in target.dep(Dep::Conflicts) {
        queue.push(Obligation::Conflict {
            origin: Some(item),
            cap: cap.clone(),
        });
    }

    Advance::Done
}

fn establish(pool: &Pool, context: &mut Context, queue: &mut Vec<Obligation>, item: ItemId) -> Advance {
    let status = pool.status(item);
    if status.is_locked() || status.transacts() || context.status(item).is_transact() {
        return Advance::Done;
    }

    let target = &pool[item];
    let is_provided = |ctx: &Context, cap: &Capability| !ctx.present_providers(pool, cap).is_empty();

    let freshened = {
        let ctx: &Context = context;
        !target.has_dep(Dep::Freshens) || target.dep(Dep::Freshens).any(|cap| is_provided(ctx, cap))
    };
    if !freshened {
        context.unneeded(pool, item);
        return Advance::Done;
    }

    let missing = {
        let ctx: &Context = context;
        target
            .dep(Dep::Requires)
            .find(|cap| !ctx.requires_ignored(item, cap) && !is_provided(ctx, cap))
            .cloned()
    };
    match missing {
        None => {
            context.satisfied(pool, item);
        }
        Some(cap) => {
            if context.incomplete(pool, item) {
                context.add_info(ResolverInfo::new(InfoKind::Incomplete, Some(item)).with_capability(cap));
            }
        }
    }

    // Only establish passes select items on their own
    let supplemented = {
        let ctx: &Context = context;
        ctx.establishing()
            && !ctx.is_present(pool, item)
            && target.dep(Dep::Supplements).any(|cap| is_provided(ctx, cap))
    };
    if supplemented {
        log::debug!("Supplements of {} are present, selecting it", target);
        queue.push(Obligation::Install { item, soft: true });
    }

    Advance::Done
}

#[allow(clippy::too_many_arguments)]
fn require(
    pool: &Pool,
    policy: &Policy,
    context: &mut Context,
    queue: &mut Vec<Obligation>,
    origin: Option<ItemId>,
    cap: Capability,
    soft: bool,
    allow_install: bool,
) -> Advance {
    if let Some(origin) = origin {
        if !context.is_present(pool, origin) || context.requires_ignored(origin, &cap) {
            return Advance::Done;
        }
    }

    if !context.present_providers(pool, &cap).is_empty() {
        return Advance::Done;
    }

    let candidates: Vec<ItemId> = if allow_install {
        pool.uninstalled_providers(&cap)
            .into_iter()
            .filter(|&id| is_installable(pool, context, id))
            .collect()
    } else {
        Vec::new()
    };

    if candidates.is_empty() {
        if soft {
            let info = ResolverInfo::new(InfoKind::RecommendedUnavailable, origin).with_capability(cap);
            context.add_info(info);
            return Advance::Done;
        }
        if let Some(origin) = origin {
            if context.verifying() && pool.status(origin).is_installed() {
                if context.incomplete(pool, origin) {
                    let info = ResolverInfo::new(InfoKind::Incomplete, Some(origin)).with_capability(cap);
                    context.add_info(info);
                }
                return Advance::Done;
            }
        }
        let info = ResolverInfo::new(InfoKind::MissingProvider, origin).with_capability(cap);
        return fail(context, info, false);
    }

    if soft {
        let Some(best) = policy.select_best(pool, context, &candidates) else {
            return Advance::Done;
        };
        return Advance::Fork(vec![
            Alternative::TryInstall { item: best },
            Alternative::Skip { exclude: vec![best] },
        ]);
    }

    let sorted = policy.sort_providers(pool, context, &candidates);

    if sorted.len() == 1 {
        let provider = sorted[0];
        if let Some(origin) = origin {
            context.add_info(ResolverInfo::new(InfoKind::NeededBy, Some(provider)).with_other(origin));
        }
        queue.push(Obligation::Install {
            item: provider,
            soft: false,
        });
        return Advance::Done;
    }

    let alternatives = sorted
        .iter()
        .enumerate()
        .map(|(i, &item)| Alternative::Install {
            item,
            exclude: sorted[..i].to_vec(),
        })
        .collect();
    Advance::Fork(alternatives)
}

fn conflict(
    pool: &Pool,
    context: &mut Context,
    queue: &mut Vec<Obligation>,
    origin: Option<ItemId>,
    cap: Capability,
) -> Advance {
    if let Some(origin) = origin {
        if !context.is_present(pool, origin) || context.conflict_ignored(origin, &cap) {
            return Advance::Done;
        }
    }

    let remove_only = !context.upgrade_mode();
    for provider in pool.what_provides(&cap) {
        if Some(provider) == origin {
            continue;
        }
        if !context.is_present(pool, provider) {
            // A conflict of the request rules out installing the provider
            if origin.is_none() && !pool.status(provider).is_installed() {
                context.exclude(provider);
            }
            continue;
        }
        if context.installed_ignored(provider) {
            continue;
        }

        let mut info = ResolverInfo::new(InfoKind::ConflictsWith, Some(provider)).with_capability(cap.clone());
        if let Some(origin) = origin {
            info = info.with_other(origin);
        }

        if context.is_removable(pool, provider) {
            context.add_info(info);
            queue.push(Obligation::Remove {
                item: provider,
                remove_only,
                due_to_upgrade: false,
            });
            continue;
        }

        // The provider stays, so the item declaring the conflict has to go
        if let Some(origin) = origin {
            if context.is_removable(pool, origin) {
                let info = ResolverInfo::new(InfoKind::ConflictsWith, Some(origin))
                    .with_other(provider)
                    .with_capability(cap.clone());
                context.add_info(info);
                queue.push(Obligation::Remove {
                    item: origin,
                    remove_only,
                    due_to_upgrade: false,
                });
                return Advance::Done;
            }
        }

        return fail(context, info, false);
    }

    Advance::Done
}
