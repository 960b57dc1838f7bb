//! `${name}` placeholder substitution.
//!
//! Resolution is a two-outcome operation made explicit in the return type:
//! every placeholder whose name is bound in the scope is replaced with the
//! binding's text form, every unbound placeholder is left as literal text
//! and reported by name in the result. Resolution itself never fails; the
//! caller decides what to do with the unresolved names (the orchestrator
//! logs them as warnings).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::variables::{Value, Variables};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^{}]+)\}").expect("placeholder pattern is valid"));

/// Result of resolving one piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The best-effort substituted text.
    pub text: String,
    /// Names referenced in the input that had no binding, in order of first
    /// appearance, deduplicated.
    pub unresolved: Vec<String>,
}

/// Result of resolving a list of text elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResolution {
    pub items: Vec<String>,
    pub unresolved: Vec<String>,
}

/// Replace every bound `${name}` in `text` with its value's text form.
pub fn resolve_scalar(text: &str, vars: &Variables) -> Resolution {
    let mut unresolved = Vec::new();
    let text = substitute(text, vars, &mut unresolved);
    Resolution { text, unresolved }
}

/// Element-wise [`resolve_scalar`], with one list-aware extra: an element
/// that is exactly one placeholder bound to a list value splices that list's
/// elements into the result.
pub fn resolve_list(items: &[String], vars: &Variables) -> ListResolution {
    let mut unresolved = Vec::new();
    let mut out = Vec::with_capacity(items.len());

    for item in items {
        if let Some(name) = lone_placeholder(item) {
            if let Some(Value::List(elements)) = vars.get(name) {
                out.extend(elements.iter().cloned());
                continue;
            }
        }
        out.push(substitute(item, vars, &mut unresolved));
    }

    ListResolution {
        items: out,
        unresolved,
    }
}

// Core substitution pass shared by the scalar and list entry points.
fn substitute(text: &str, vars: &Variables, unresolved: &mut Vec<String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(text) {
        let whole = caps.get(0).expect("capture 0 always present");
        let name = &caps[1];
        out.push_str(&text[last..whole.start()]);
        match vars.get(name) {
            Some(value) => out.push_str(&value.as_text()),
            None => {
                out.push_str(whole.as_str());
                note_unresolved(name, unresolved);
            }
        }
        last = whole.end();
    }
    out.push_str(&text[last..]);
    out
}

// Returns the placeholder name when the entire text is a single `${name}`.
fn lone_placeholder(text: &str) -> Option<&str> {
    let m = PLACEHOLDER.find(text)?;
    if m.start() == 0 && m.end() == text.len() {
        PLACEHOLDER
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|g| g.as_str())
    } else {
        None
    }
}

fn note_unresolved(name: &str, unresolved: &mut Vec<String>) {
    if !unresolved.iter().any(|seen| seen == name) {
        unresolved.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars_with(entries: &[(&str, &str)]) -> Variables {
        let mut vars = Variables::new();
        for (name, value) in entries {
            vars.set(*name, *value);
        }
        vars
    }

    #[test]
    fn substitutes_bound_placeholders() {
        let vars = vars_with(&[("name", "Joe"), ("where_welcome", "the world!")]);
        let res = resolve_scalar("Hi ${name}, ${where_welcome}", &vars);
        assert_eq!(res.text, "Hi Joe, the world!");
        assert!(res.unresolved.is_empty());
    }

    #[test]
    fn unresolved_placeholder_stays_literal_and_is_reported() {
        let vars = vars_with(&[("name", "Joe")]);
        let res = resolve_scalar("Hi ${name}, ${undefined_var}", &vars);
        assert_eq!(res.text, "Hi Joe, ${undefined_var}");
        assert_eq!(res.unresolved, vec!["undefined_var".to_string()]);
    }

    #[test]
    fn repeated_unresolved_name_reported_once() {
        let vars = Variables::new();
        let res = resolve_scalar("${x} and ${x} and ${y}", &vars);
        assert_eq!(res.unresolved, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn text_without_placeholders_passes_through() {
        let vars = Variables::new();
        let res = resolve_scalar("plain text", &vars);
        assert_eq!(res.text, "plain text");
        assert!(res.unresolved.is_empty());
    }

    #[test]
    fn list_resolution_is_element_wise() {
        let vars = vars_with(&[("a", "1"), ("b", "2")]);
        let res = resolve_list(&["${a}".into(), "${b}${a}".into(), "c".into()], &vars);
        assert_eq!(res.items, vec!["1", "21", "c"]);
        assert!(res.unresolved.is_empty());
    }

    #[test]
    fn lone_list_placeholder_splices() {
        let mut vars = Variables::new();
        vars.set("names", vec!["Joe".to_string(), "Arthur".to_string()]);
        let res = resolve_list(&["${names}".into(), "tail".into()], &vars);
        assert_eq!(res.items, vec!["Joe", "Arthur", "tail"]);
    }

    #[test]
    fn embedded_list_placeholder_stringifies() {
        let mut vars = Variables::new();
        vars.set("names", vec!["Joe".to_string(), "Arthur".to_string()]);
        let res = resolve_scalar("all: ${names}", &vars);
        assert_eq!(res.text, "all: [Joe, Arthur]");
    }
}
