#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn fs() -> FsResolver {
    FsResolver::new("/work/config")
}

fn from(path: &str) -> ModulePath {
    ModulePath::new(path)
}

#[test]
fn entry_resolves_against_root() {
    let path = fs().resolve("main.sky", None).unwrap();
    assert_eq!(path.as_str(), "/work/config/main.sky");
}

#[test]
fn names_resolve_against_the_root_from_any_module() {
    let path = fs()
        .resolve("lib/x.sky", Some(&from("/work/config/lib/y.sky")))
        .unwrap();
    assert_eq!(path.as_str(), "/work/config/lib/x.sky");
}

#[test]
fn double_slash_is_root_relative() {
    let path = fs()
        .resolve("//lib/util.sky", Some(&from("/work/config/apps/deep/x.sky")))
        .unwrap();
    assert_eq!(path.as_str(), "/work/config/lib/util.sky");
}

#[test]
fn dot_segments_inside_the_root_are_folded() {
    let path = fs()
        .resolve("apps/../lib/./util.sky", Some(&from("/work/config/apps/web.sky")))
        .unwrap();
    assert_eq!(path.as_str(), "/work/config/lib/util.sky");
}

#[test]
fn absolute_names_are_rejected() {
    let main = from("/work/config/main.sky");
    assert_eq!(
        fs().resolve("/etc/passwd", Some(&main)).unwrap_err(),
        ResolveError::Absolute("/etc/passwd".to_string())
    );
    assert_eq!(
        fs().resolve("///etc/passwd", Some(&main)).unwrap_err(),
        ResolveError::Absolute("///etc/passwd".to_string())
    );
}

#[test]
fn names_cannot_leave_the_root() {
    let main = from("/work/config/lib/y.sky");
    for name in ["../../../etc/passwd", "../config-other/x.sky", "lib/..", "."] {
        assert_eq!(
            fs().resolve(name, Some(&main)).unwrap_err(),
            ResolveError::OutsideRoot(name.to_string()),
            "{name}"
        );
    }
}

#[test]
fn equivalent_spellings_share_a_path() {
    let r = fs();
    let a = r.resolve("lib/util.sky", None).unwrap();
    let b = r
        .resolve("./lib/util.sky", Some(&from("/work/config/lib/other.sky")))
        .unwrap();
    let c = r.resolve("//lib/util.sky", None).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, c);
}

#[test]
fn rejects_backslash_and_empty() {
    assert_eq!(
        fs().resolve("lib\\util.sky", None).unwrap_err(),
        ResolveError::Separator("lib\\util.sky".to_string())
    );
    assert_eq!(fs().resolve("", None).unwrap_err(), ResolveError::Empty);
}

#[test]
fn parent_of_root_stays_at_root() {
    assert_eq!(
        normalize_path(Path::new("/a/../../b.sky")),
        PathBuf::from("/b.sky")
    );
}

#[test]
fn for_entry_roots_at_the_entry_directory() {
    let (resolver, entry) = FsResolver::for_entry(Path::new("/srv/app/./main.sky")).unwrap();
    assert_eq!(resolver.root(), Path::new("/srv/app"));
    assert_eq!(entry, "main.sky");
    assert_eq!(
        resolver.resolve(&entry, None).unwrap().as_str(),
        "/srv/app/main.sky"
    );
}

#[test]
fn fs_read_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = FsResolver::new(dir.path());
    let path = resolver.resolve("missing.sky", None).unwrap();
    let err = resolver.read(&path).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}

#[test]
fn memory_resolver_round_trip() {
    let resolver = MemoryResolver::new()
        .with_module("main.sky", "x = 1\n")
        .with_module("/lib/util.sky", "y = 2\n");
    assert_eq!(resolver.len(), 2);

    let main = resolver.resolve("main.sky", None).unwrap();
    assert_eq!(main.as_str(), "/main.sky");
    let util = resolver.resolve("lib/util.sky", Some(&main)).unwrap();
    assert_eq!(util.as_str(), "/lib/util.sky");
    assert_eq!(resolver.read(&util).unwrap(), "y = 2\n");

    // Relative to the root, not to the requesting module.
    let sibling = resolver.resolve("main.sky", Some(&util)).unwrap();
    assert_eq!(sibling, main);
    assert_eq!(
        resolver.resolve("../main.sky", Some(&util)).unwrap_err(),
        ResolveError::OutsideRoot("../main.sky".to_string())
    );
}

#[test]
fn memory_resolver_missing_module() {
    let resolver = MemoryResolver::new();
    let path = resolver.resolve("nope.sky", None).unwrap();
    assert_eq!(
        resolver.read(&path).unwrap_err().kind(),
        io::ErrorKind::NotFound
    );
}

proptest! {
    #[test]
    fn memory_paths_are_canonical(parts in prop::collection::vec("[a-z]{1,4}|\\.|\\.\\.", 1..8)) {
        let name = parts.join("/");
        let resolver = MemoryResolver::new();
        match resolver.resolve(&name, None) {
            Ok(path) => {
                let text = path.as_str();
                prop_assert!(text.starts_with('/'));
                prop_assert!(!text.split('/').any(|p| p == "." || p == ".."));
                // Resolving a canonical path again is the identity.
                prop_assert_eq!(resolver.resolve(text, None).unwrap(), path.clone());
            }
            Err(err) => prop_assert_eq!(err, ResolveError::OutsideRoot(name.clone())),
        }
    }
}
