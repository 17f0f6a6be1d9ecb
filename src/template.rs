//! Template variable detection and interpolation.
//!
//! Dashboard variables show up in query fields as `$name`, `${name}`,
//! `${name:format}` or the deprecated `[[name]]`. The query core never
//! rejects a field because it holds one of these placeholders; it only needs
//! to know what a label *would* look like after interpolation in order to
//! decide whether it must be quoted.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static VARIABLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(\w+)|\[\[(\w+?)(?::(\w+))?\]\]|\$\{(\w+)(?:\.([^:^\}]+))?(?::([^\}]+))?\}")
        .expect("variable pattern is valid")
});

/// Whether `value` contains a template variable reference.
pub fn is_template_variable(value: &str) -> bool {
    VARIABLE_REGEX.is_match(value)
}

fn variable_name<'h>(caps: &Captures<'h>) -> Option<&'h str> {
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(4))
        .map(|m| m.as_str())
}

/// Source of template variable values.
pub trait TemplateVariables: std::fmt::Debug {
    /// Interpolate every known variable in `target`.
    ///
    /// Unknown variables are left untouched.
    fn replace(&self, target: &str) -> String;
}

/// Performs no interpolation: placeholders stay opaque.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVariables;

impl TemplateVariables for NoVariables {
    fn replace(&self, target: &str) -> String {
        target.to_string()
    }
}

/// Variables resolved from an explicit name → value map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableMap {
    values: HashMap<String, String>,
}

impl VariableMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

impl From<HashMap<String, String>> for VariableMap {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl TemplateVariables for VariableMap {
    fn replace(&self, target: &str) -> String {
        VARIABLE_REGEX
            .replace_all(target, |caps: &Captures<'_>| {
                match variable_name(caps).and_then(|name| self.get(name)) {
                    Some(value) => value.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}
