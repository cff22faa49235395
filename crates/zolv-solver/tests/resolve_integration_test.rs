/// Integration tests for resolving a pool end to end
///
/// These tests drive the resolver through the public API only: build a
/// pool, mark transactions, resolve and read the result back from the pool.

use zolv_solver::{Arch, Capability, Dep, Item, Kind, Origin, Outcome, Pool, Resolver, Status};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn resolver() -> Resolver {
    let mut resolver = Resolver::new();
    resolver.set_architecture(Arch::new("x86_64"));
    resolver
}

/// A small distribution: a web server stack on top of an installed base
fn distribution() -> Pool {
    let mut pool = Pool::new();

    pool.add_installed(Item::package("glibc", "2.31").with_arch("x86_64"));
    pool.add_installed(
        Item::package("openssl", "1.1.1")
            .with_arch("x86_64")
            .with_dep(Dep::Provides, Capability::new("libssl")),
    );
    pool.add_installed(
        Item::package("curl", "7.68")
            .with_arch("x86_64")
            .with_dep(Dep::Requires, Capability::new("libssl")),
    );

    pool.add(
        Item::package("openssl", "3.0.2")
            .with_arch("x86_64")
            .with_dep(Dep::Provides, Capability::new("libssl"))
            .with_dep(Dep::Requires, Capability::parse("glibc >= 2.34").unwrap()),
    );
    pool.add(Item::package("glibc", "2.35").with_arch("x86_64"));
    pool.add(
        Item::package("nginx", "1.22")
            .with_arch("x86_64")
            .with_dep(Dep::Requires, Capability::new("libssl"))
            .with_dep(Dep::Requires, Capability::new("pcre"))
            .with_dep(Dep::Recommends, Capability::new("nginx-doc")),
    );
    pool.add(Item::package("pcre", "8.45").with_arch("x86_64"));
    pool.add(Item::package("pcre", "8.44").with_arch("i586"));
    pool.add(Item::package("nginx-doc", "1.22"));
    pool.add(
        Item::new(Kind::Pattern, "webserver", "1")
            .with_dep(Dep::Requires, Capability::new("nginx")),
    );

    pool
}

fn find(pool: &Pool, name: &str, edition: &str) -> usize {
    pool.iter()
        .find(|(_, item, _)| item.name == name && item.edition.to_string() == edition)
        .map(|(id, _, _)| id)
        .unwrap()
}

#[test]
fn test_install_stack_into_pool() {
    init_logging();
    let mut pool = distribution();
    let nginx = find(&pool, "nginx", "1.22");
    pool.status_mut(nginx).set_to_be_installed(Origin::User);

    let mut resolver = resolver();
    assert!(resolver.resolve_pool(&mut pool));

    assert!(pool.status(nginx).is_by_user());
    assert!(pool.status(find(&pool, "pcre", "8.45")).is_to_be_installed());
    assert!(!pool.status(find(&pool, "pcre", "8.44")).transacts());
    assert!(pool.status(find(&pool, "nginx-doc", "1.22")).is_to_be_installed());

    // libssl is already provided by the installed openssl
    assert!(!pool.status(find(&pool, "openssl", "3.0.2")).transacts());
    assert!(!pool.status(find(&pool, "openssl", "1.1.1")).transacts());
}

#[test]
fn test_upgrade_pulls_dependencies() {
    init_logging();
    let mut pool = distribution();
    let openssl3 = find(&pool, "openssl", "3.0.2");
    pool.status_mut(openssl3).set_to_be_installed(Origin::User);

    let mut resolver = resolver();
    assert!(resolver.resolve_pool(&mut pool));

    assert!(pool
        .status(find(&pool, "openssl", "1.1.1"))
        .is_to_be_uninstalled_due_to_upgrade());
    assert!(pool.status(find(&pool, "glibc", "2.35")).is_to_be_installed());
    assert!(pool
        .status(find(&pool, "glibc", "2.31"))
        .is_to_be_uninstalled_due_to_upgrade());
    assert!(!pool.status(find(&pool, "curl", "7.68")).transacts());
}

#[test]
fn test_remove_needed_library_fails() {
    init_logging();
    let mut pool = distribution();
    let openssl = find(&pool, "openssl", "1.1.1");
    pool.status_mut(openssl).set_to_be_uninstalled(Origin::User);

    let mut resolver = resolver();
    assert!(!resolver.resolve_pool(&mut pool));
    assert!(matches!(resolver.outcome(), Outcome::NoSolution));

    let context = resolver.context().unwrap();
    let messages: Vec<String> = context
        .infos()
        .iter()
        .filter(|info| info.error)
        .map(|info| info.describe(&pool))
        .collect();
    assert_eq!(messages, vec!["Nothing provides libssl needed by curl-7.68.x86_64"]);
}

#[test]
fn test_remove_with_upgrade_mode_finds_replacement() {
    init_logging();
    let mut pool = distribution();
    let openssl = find(&pool, "openssl", "1.1.1");

    let mut resolver = resolver();
    resolver.set_upgrade_mode(true);
    resolver.request_remove(openssl);

    assert!(resolver.resolve(&pool, None));
    let context = resolver.best_context().unwrap();
    assert_eq!(context.status(openssl), Status::ToBeUninstalled);
    assert!(context.is_to_be_installed(find(&pool, "openssl", "3.0.2")));
    assert!(context.is_to_be_installed(find(&pool, "glibc", "2.35")));
}

#[test]
fn test_establish_then_resolve() {
    init_logging();
    let mut pool = distribution();
    let webserver = find(&pool, "webserver", "1");

    let mut resolver = resolver();
    assert!(resolver.establish_pool(&mut pool));
    assert!(pool.status(webserver).is_incomplete());

    // Selecting the pattern pulls in what it requires
    pool.status_mut(webserver).set_to_be_installed(Origin::User);
    assert!(resolver.resolve_pool(&mut pool));
    assert!(pool.status(find(&pool, "nginx", "1.22")).is_to_be_installed());

    resolver.undo(&mut pool);
    assert!(pool.status(webserver).is_to_be_installed());
    assert!(!pool.status(find(&pool, "nginx", "1.22")).transacts());
}
