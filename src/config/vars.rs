//! Environment variable interpolation for config files.
//!
//! - `${VAR}` or `$VAR` - substitute, error if unset
//! - `${VAR:-default}` - use default if VAR is unset or empty
//! - `$$` - literal `$`

use regex::{Captures, Regex};
use std::env;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \$\$
        |
        \$\{ ([A-Za-z_][A-Za-z0-9_]*) (?: :- ([^}]*) )? \}
        |
        \$([A-Za-z_][A-Za-z0-9_]*)
        ",
    )
    .expect("Invalid regex pattern")
});

/// Interpolated text plus every variable that could not be resolved.
#[derive(Debug)]
pub struct InterpolationResult {
    pub text: String,
    pub errors: Vec<String>,
}

impl InterpolationResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Interpolate environment variables in `input`.
///
/// All unresolved variables are reported, not just the first.
pub fn interpolate(input: &str) -> InterpolationResult {
    interpolate_with(input, |name| env::var(name).ok())
}

fn interpolate_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> InterpolationResult {
    let mut errors = Vec::new();

    let text = ENV_VAR_PATTERN
        .replace_all(input, |caps: &Captures| {
            let Some(name) = caps.get(1).or_else(|| caps.get(3)) else {
                return "$".to_string();
            };
            let name = name.as_str();
            let default = caps.get(2).map(|m| m.as_str());

            match (lookup(name), default) {
                (Some(value), _) if value.contains(['\n', '\r']) => {
                    errors.push(format!("environment variable '{name}' contains newlines"));
                    caps[0].to_string()
                }
                (Some(value), Some(default)) if value.is_empty() => default.to_string(),
                (Some(value), _) => value,
                (None, Some(default)) => default.to_string(),
                (None, None) => {
                    errors.push(format!("environment variable '{name}' is not set"));
                    caps[0].to_string()
                }
            }
        })
        .into_owned();

    InterpolationResult { text, errors }
}
