//! Words the dialect reserves but does not implement.
//!
//! Scripts are frequently written by people used to Python; these produce a
//! pointed error instead of a confusing parse failure later on.

/// Sorted by keyword for binary search.
const RESERVED: &[(&str, &str)] = &[
    ("as", "use `load(\"file\", alias=\"name\")` to rename imports"),
    ("assert", "use `fail(msg)` or the `assert` helpers in tests"),
    ("async", "scripts run synchronously"),
    ("await", "scripts run synchronously"),
    ("class", "use `struct(...)` or a typed record"),
    ("del", "build a new value instead of deleting"),
    ("except", "exceptions are not supported; use `fail(msg)`"),
    ("finally", "exceptions are not supported; use `fail(msg)`"),
    ("from", "use `load(\"file\", \"name\")`"),
    ("global", "top-level bindings are only assigned at top level"),
    ("import", "use `load(\"file\", \"name\")`"),
    ("is", "use `==` for comparison"),
    ("nonlocal", "nested functions cannot rebind enclosing variables"),
    ("raise", "use `fail(msg)`"),
    ("try", "exceptions are not supported; use `fail(msg)`"),
    ("while", "use `for x in range(n)`"),
    ("with", "context managers are not supported"),
    ("yield", "generators are not supported; return a list"),
];

/// Look up a reserved word and return its hint.
pub fn lookup_reserved(ident: &str) -> Option<(&'static str, &'static str)> {
    RESERVED
        .binary_search_by_key(&ident, |&(kw, _)| kw)
        .ok()
        .map(|idx| RESERVED[idx])
}
