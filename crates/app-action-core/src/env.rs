//! Environment lookup and `$VAR` / `${VAR}` expansion.

use std::collections::HashMap;

/// Source of environment variables.
///
/// Production code reads the process environment via [`ProcessEnv`]; tests
/// hand in a `HashMap` so they never touch global state.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

/// How references inside a spec file are expanded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Expansion {
    /// Every reference is replaced by its value, unset variables by "".
    #[default]
    Plain,
    /// Unset references that look like platform bindables are kept verbatim.
    RetainBindables,
}

/// Variables the platform injects into every component at runtime.
const APP_WIDE_VARIABLES: &[&str] = &["APP_DOMAIN", "APP_URL", "APP_NAME"];

/// Expand `$NAME` and `${NAME}` references in `input`.
///
/// Follows shell conventions: `$` not followed by a name is kept, `${}` and
/// an unterminated `${` are dropped, and single-character special names
/// (`$1`, `$?`, ...) are looked up like any other.
pub fn expand(input: &str, env: &impl Environment, expansion: Expansion) -> String {
    let lookup = |name: &str| -> String {
        let value = env.var(name).unwrap_or_default();
        if value.is_empty() && expansion == Expansion::RetainBindables && is_bindable(name) {
            return format!("${{{name}}}");
        }
        value
    };

    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' || i + 1 >= bytes.len() {
            i += 1;
            continue;
        }

        out.push_str(&input[copied..i]);
        let (name, width) = shell_name(&input[i + 1..]);
        match name {
            Some(name) => out.push_str(&lookup(name)),
            None if width == 0 => out.push('$'),
            None => {}
        }
        i += 1 + width;
        copied = i;
    }

    out.push_str(&input[copied..]);
    out
}

/// Returns the referenced name (if any) and how many bytes after `$` it spans.
fn shell_name(rest: &str) -> (Option<&str>, usize) {
    let bytes = rest.as_bytes();

    if bytes[0] == b'{' {
        if bytes.len() > 2 && is_special(bytes[1]) && bytes[2] == b'}' {
            return (Some(&rest[1..2]), 3);
        }
        return match rest[1..].find('}') {
            Some(0) => (None, 2),
            Some(end) => (Some(&rest[1..=end]), end + 2),
            None => (None, 1),
        };
    }

    if is_special(bytes[0]) {
        return (Some(&rest[..1]), 1);
    }

    let len = bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    if len == 0 {
        (None, 0)
    } else {
        (Some(&rest[..len]), len)
    }
}

fn is_special(b: u8) -> bool {
    matches!(b, b'*' | b'#' | b'$' | b'@' | b'!' | b'?' | b'-') || b.is_ascii_digit()
}

/// Real environment variables can't contain dots, so `${web.HOSTNAME}` is a
/// component bindable.
fn is_bindable(name: &str) -> bool {
    APP_WIDE_VARIABLES.contains(&name) || name.contains('.')
}
