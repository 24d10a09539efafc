//! Regular expression matching.
//!
//! Compiled patterns are cached process-wide, keyed by the exact pattern
//! text; compilation happens lazily on first use. The cache is behind a
//! mutex so the family stays sound if the crate is embedded in a threaded
//! host.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use regex::Regex;

use sift_core::{Error, Type};
use sift_lang::Functions;
use sift_vm::{Object, obj};

static PATTERNS: OnceLock<Mutex<HashMap<String, Regex>>> = OnceLock::new();

fn pattern(text: &str) -> Result<Regex, Error> {
    let cache = PATTERNS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = match cache.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    if let Some(re) = cache.get(text) {
        return Ok(re.clone());
    }

    let re = Regex::new(text)
        .map_err(|e| Error::Regex(format!("Invalid regex '{}': {}", text, e)))?;
    cache.insert(text.to_string(), re.clone());
    Ok(re)
}

fn str_args<'a>(
    name: &str,
    arg: &'a Object,
) -> Result<(std::cell::Ref<'a, Object>, std::cell::Ref<'a, Object>), Error> {
    let fields = arg
        .as_tuple()
        .ok_or_else(|| Error::internal(format!("{}: argument is not a tuple", name)))?;
    Ok((fields[0].borrow(), fields[1].borrow()))
}

/// All matches of the pattern. With no capture groups each full match is
/// one element; with groups, every group of every match is an element, in
/// order. A group that did not participate yields an empty string.
fn grep(arg: &Object, out: &mut Object) -> Result<(), Error> {
    let (text, pat) = str_args("grep", arg)?;
    let text = text
        .as_str()
        .ok_or_else(|| Error::internal("grep: first argument is not a string"))?;
    let pat = pat
        .as_str()
        .ok_or_else(|| Error::internal("grep: second argument is not a string"))?;

    let re = pattern(pat)?;
    let mut matches = Vec::new();

    for caps in re.captures_iter(text) {
        if caps.len() == 1 {
            matches.push(obj(Object::Str(caps[0].to_string())));
        } else {
            for group in 1..caps.len() {
                let piece = caps.get(group).map(|m| m.as_str()).unwrap_or("");
                matches.push(obj(Object::Str(piece.to_string())));
            }
        }
    }

    *out = Object::Array(matches);
    Ok(())
}

/// 1 if the pattern matches anywhere in the string, else 0.
fn grepif(arg: &Object, out: &mut Object) -> Result<(), Error> {
    let (text, pat) = str_args("grepif", arg)?;
    let text = text
        .as_str()
        .ok_or_else(|| Error::internal("grepif: first argument is not a string"))?;
    let pat = pat
        .as_str()
        .ok_or_else(|| Error::internal("grepif: second argument is not a string"))?;

    let re = pattern(pat)?;
    *out = Object::UInt(if re.is_match(text) { 1 } else { 0 });
    Ok(())
}

pub(crate) fn register(funcs: &mut Functions) {
    funcs.add(
        "grep",
        Type::tup(vec![Type::str(), Type::str()]),
        Type::arr(Type::str()),
        grep,
    );

    funcs.add(
        "grepif",
        Type::tup(vec![Type::str(), Type::str()]),
        Type::uint(),
        grepif,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(text: &str, pat: &str) -> Object {
        Object::Tuple(vec![
            obj(Object::Str(text.to_string())),
            obj(Object::Str(pat.to_string())),
        ])
    }

    fn matches(text: &str, pat: &str) -> Vec<String> {
        let mut out = Object::Array(Vec::new());
        grep(&args(text, pat), &mut out).unwrap();
        match out {
            Object::Array(items) => items
                .iter()
                .map(|v| v.borrow().as_str().unwrap().to_string())
                .collect(),
            other => panic!("expected array, got {:?}", other),
        }
    }

    fn found(text: &str, pat: &str) -> u64 {
        let mut out = Object::UInt(0);
        grepif(&args(text, pat), &mut out).unwrap();
        match out {
            Object::UInt(v) => v,
            other => panic!("expected uint, got {:?}", other),
        }
    }

    #[test]
    fn full_matches_without_groups() {
        assert_eq!(matches("a1 b2 c3", "[a-z][0-9]"), vec!["a1", "b2", "c3"]);
    }

    #[test]
    fn groups_yield_each_capture_in_order() {
        assert_eq!(
            matches("x=1 y=2", "([a-z])=([0-9])"),
            vec!["x", "1", "y", "2"]
        );
    }

    #[test]
    fn no_match_yields_an_empty_array() {
        assert_eq!(matches("abc", "[0-9]"), Vec::<String>::new());
    }

    #[test]
    fn grepif_agrees_with_grep() {
        for (text, pat) in [("a1", "[0-9]"), ("abc", "[0-9]"), ("x=1", "([a-z])=")] {
            let hit = found(text, pat);
            let any = !matches(text, pat).is_empty();
            assert_eq!(hit == 1, any, "disagreement for {:?} {:?}", text, pat);
        }
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let mut out = Object::Array(Vec::new());
        let err = grep(&args("abc", "("), &mut out).unwrap_err();
        assert!(err.to_string().contains("Invalid regex"));
    }

    #[test]
    fn cache_returns_the_same_compilation() {
        // Two uses of one pattern hit the cache; behavior must not change.
        assert_eq!(found("abc", "b"), 1);
        assert_eq!(found("xyz", "b"), 0);
    }
}
