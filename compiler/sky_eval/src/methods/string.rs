use std::rc::Rc;

use super::method_name;
use crate::args::{arg, bool_or, expect_str, int_or};
use crate::errors::{invalid_argument, EvalError};
use crate::format::format_method;
use crate::value::Value;
use crate::{Arguments, EvalResult};

pub(super) const METHODS: &[&str] = &[
    "capitalize",
    "count",
    "elems",
    "endswith",
    "find",
    "format",
    "index",
    "isalnum",
    "isalpha",
    "isdigit",
    "islower",
    "isspace",
    "isupper",
    "join",
    "lower",
    "lstrip",
    "partition",
    "removeprefix",
    "removesuffix",
    "replace",
    "rfind",
    "rindex",
    "rpartition",
    "rsplit",
    "rstrip",
    "split",
    "splitlines",
    "startswith",
    "strip",
    "title",
    "upper",
];

pub(super) fn call(s: &Rc<str>, qualified: &str, args: Arguments) -> EvalResult {
    let f = qualified;
    match method_name(qualified) {
        "capitalize" => {
            args.no_args(f)?;
            let mut chars = s.chars();
            Ok(Value::from(match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }))
        }
        "count" => {
            let (sub, hay) = substring_args(f, s, args)?;
            if sub.is_empty() {
                return Ok(int(hay.chars().count() + 1));
            }
            Ok(int(hay.matches(&*sub).count()))
        }
        "elems" => {
            args.no_args(f)?;
            Ok(Value::list(s.chars().map(|c| Value::from(c.to_string())).collect()))
        }
        "endswith" | "startswith" => {
            let [affix] = args.bind(f, ["x"])?;
            let affixes = affix_list(f, &arg(affix))?;
            let hit = if method_name(f) == "endswith" {
                affixes.iter().any(|a| s.ends_with(&**a))
            } else {
                affixes.iter().any(|a| s.starts_with(&**a))
            };
            Ok(Value::Bool(hit))
        }
        "find" | "index" | "rfind" | "rindex" => {
            let method = method_name(f);
            let (sub, offset, hay) = find_args(f, s, args)?;
            let found = if method.starts_with('r') {
                hay.rfind(&*sub)
            } else {
                hay.find(&*sub)
            };
            match found {
                Some(byte) => Ok(int(offset + hay[..byte].chars().count())),
                None if method.ends_with("index") => Err(EvalError::new(format!("{f}: substring not found"))),
                None => Ok(Value::Int(-1)),
            }
        }
        "format" => format_method(s, &args).map(Value::from),
        "isalnum" => predicate(f, args, s, char::is_alphanumeric),
        "isalpha" => predicate(f, args, s, char::is_alphabetic),
        "isdigit" => predicate(f, args, s, |c| c.is_ascii_digit()),
        "isspace" => predicate(f, args, s, char::is_whitespace),
        "islower" => {
            args.no_args(f)?;
            Ok(Value::Bool(s.chars().any(char::is_lowercase) && !s.chars().any(char::is_uppercase)))
        }
        "isupper" => {
            args.no_args(f)?;
            Ok(Value::Bool(s.chars().any(char::is_uppercase) && !s.chars().any(char::is_lowercase)))
        }
        "join" => {
            let [items] = args.bind(f, ["iterable"])?;
            let items = arg(items).iterate()?;
            let mut parts = Vec::with_capacity(items.len());
            for item in &items {
                match item {
                    Value::Str(part) => parts.push(&**part),
                    other => {
                        return Err(invalid_argument(f, "iterable", &format!("{} element", other.type_name()), "string"));
                    }
                }
            }
            Ok(Value::from(parts.join(&**s)))
        }
        "lower" => {
            args.no_args(f)?;
            Ok(Value::from(s.to_lowercase()))
        }
        "upper" => {
            args.no_args(f)?;
            Ok(Value::from(s.to_uppercase()))
        }
        "title" => {
            args.no_args(f)?;
            let mut out = String::with_capacity(s.len());
            let mut prev_letter = false;
            for c in s.chars() {
                if prev_letter {
                    out.extend(c.to_lowercase());
                } else {
                    out.extend(c.to_uppercase());
                }
                prev_letter = c.is_alphabetic();
            }
            Ok(Value::from(out))
        }
        "strip" | "lstrip" | "rstrip" => {
            let [chars] = args.bind(f, ["cutset?"])?;
            let cutset = match arg(chars) {
                Value::None => None,
                other => Some(expect_str(f, "cutset", &other)?),
            };
            let matches = |c: char| match &cutset {
                Some(set) => set.contains(c),
                None => c.is_whitespace(),
            };
            let out = match method_name(f) {
                "lstrip" => s.trim_start_matches(matches),
                "rstrip" => s.trim_end_matches(matches),
                _ => s.trim_matches(matches),
            };
            Ok(Value::str(out))
        }
        "partition" | "rpartition" => {
            let [sep] = args.bind(f, ["sep"])?;
            let sep = expect_str(f, "sep", &arg(sep))?;
            if sep.is_empty() {
                return Err(EvalError::new(format!("{f}: empty separator")));
            }
            let split = if method_name(f) == "rpartition" {
                s.rsplit_once(&*sep)
            } else {
                s.split_once(&*sep)
            };
            Ok(match split {
                Some((head, tail)) => Value::tuple(vec![Value::str(head), Value::Str(sep), Value::str(tail)]),
                None if method_name(f) == "rpartition" => {
                    Value::tuple(vec![Value::str(""), Value::str(""), Value::Str(Rc::clone(s))])
                }
                None => Value::tuple(vec![Value::Str(Rc::clone(s)), Value::str(""), Value::str("")]),
            })
        }
        "removeprefix" => {
            let [prefix] = args.bind(f, ["prefix"])?;
            let prefix = expect_str(f, "prefix", &arg(prefix))?;
            Ok(Value::str(s.strip_prefix(&*prefix).unwrap_or(&**s)))
        }
        "removesuffix" => {
            let [suffix] = args.bind(f, ["suffix"])?;
            let suffix = expect_str(f, "suffix", &arg(suffix))?;
            Ok(Value::str(s.strip_suffix(&*suffix).unwrap_or(&**s)))
        }
        "replace" => {
            let [old, new, count] = args.bind(f, ["old", "new", "count?"])?;
            let old = expect_str(f, "old", &arg(old))?;
            let new = expect_str(f, "new", &arg(new))?;
            let count = int_or(f, "count", count, -1)?;
            Ok(Value::from(match usize::try_from(count) {
                Ok(n) => s.replacen(&*old, &new, n),
                Err(_) => s.replace(&*old, &new),
            }))
        }
        "split" | "rsplit" => {
            let [sep, maxsplit] = args.bind(f, ["sep?", "maxsplit?"])?;
            let limit = usize::try_from(int_or(f, "maxsplit", maxsplit, -1)?).ok();
            let from_right = method_name(f) == "rsplit";
            let parts: Vec<String> = match arg(sep) {
                Value::None => split_whitespace(s, limit, from_right),
                other => {
                    let sep = expect_str(f, "sep", &other)?;
                    if sep.is_empty() {
                        return Err(EvalError::new(format!("{f}: empty separator")));
                    }
                    match (limit, from_right) {
                        (Some(n), false) => s.splitn(n + 1, &*sep).map(str::to_string).collect(),
                        (Some(n), true) => {
                            let mut parts: Vec<String> = s.rsplitn(n + 1, &*sep).map(str::to_string).collect();
                            parts.reverse();
                            parts
                        }
                        (None, _) => s.split(&*sep).map(str::to_string).collect(),
                    }
                }
            };
            Ok(Value::list(parts.into_iter().map(Value::from).collect()))
        }
        "splitlines" => {
            let [keepends] = args.bind(f, ["keepends?"])?;
            let keepends = bool_or(f, "keepends", keepends, false)?;
            let lines: Vec<Value> = if keepends {
                s.split_inclusive('\n').map(Value::str).collect()
            } else {
                s.lines().map(Value::str).collect()
            };
            Ok(Value::list(lines))
        }
        other => Err(EvalError::new(format!("string has no .{other} method"))),
    }
}

fn int(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

fn predicate(f: &str, args: Arguments, s: &str, test: fn(char) -> bool) -> EvalResult {
    args.no_args(f)?;
    Ok(Value::Bool(!s.is_empty() && s.chars().all(test)))
}

fn affix_list(f: &str, value: &Value) -> Result<Vec<Rc<str>>, EvalError> {
    match value {
        Value::Str(s) => Ok(vec![Rc::clone(s)]),
        Value::Tuple(items) => items.iter().map(|item| expect_str(f, "x", item)).collect(),
        other => Err(invalid_argument(f, "x", &other.type_name(), "string or tuple")),
    }
}

/// `(sub, start?, end?)`: the needle and the character window searched.
fn find_args(f: &str, s: &str, args: Arguments) -> Result<(Rc<str>, usize, String), EvalError> {
    let [sub, start, end] = args.bind(f, ["sub", "start?", "end?"])?;
    let sub = expect_str(f, "sub", &arg(sub))?;
    let len = i64::try_from(s.chars().count()).unwrap_or(i64::MAX);
    let clamp = |n: i64| usize::try_from(if n < 0 { (n + len).max(0) } else { n.min(len) }).unwrap_or(0);
    let start = clamp(int_or(f, "start", start, 0)?);
    let end = clamp(int_or(f, "end", end, len)?);
    let window: String = s.chars().skip(start).take(end.saturating_sub(start)).collect();
    Ok((sub, start, window))
}

fn substring_args(f: &str, s: &str, args: Arguments) -> Result<(Rc<str>, String), EvalError> {
    find_args(f, s, args).map(|(sub, _, window)| (sub, window))
}

fn split_whitespace(s: &str, limit: Option<usize>, from_right: bool) -> Vec<String> {
    let words: Vec<&str> = s.split_whitespace().collect();
    let Some(n) = limit.filter(|&n| n < words.len()) else {
        return words.into_iter().map(str::to_string).collect();
    };
    if from_right {
        let trimmed = s.trim_end();
        let mut rest = trimmed;
        let mut tail = Vec::with_capacity(n);
        for _ in 0..n {
            let cut = rest.rfind(char::is_whitespace).map_or(0, |i| i + 1);
            tail.push(rest[cut..].to_string());
            rest = rest[..cut].trim_end();
        }
        let mut out = vec![rest.to_string()];
        out.extend(tail.into_iter().rev());
        out
    } else {
        let mut rest = s.trim_start();
        let mut out = Vec::with_capacity(n + 1);
        for _ in 0..n {
            let cut = rest.find(char::is_whitespace).unwrap_or(rest.len());
            out.push(rest[..cut].to_string());
            rest = rest[cut..].trim_start();
        }
        out.push(rest.to_string());
        out
    }
}
