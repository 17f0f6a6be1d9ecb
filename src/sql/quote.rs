//! Quoting rules for Metrics Insights labels and literals.
//!
//! Metrics Insights accepts bare labels (`CPUUtilization`, `InstanceId`) but
//! requires double quotes around anything containing a slash, whitespace, a
//! dot or a dash (`"AWS/EC2"`, `"Instance-Type"`). String values are always
//! single-quoted.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::template::TemplateVariables;

// Only these force quoting; quotes, parentheses and commas in a label are emitted as typed.
static SPECIAL_CHARACTERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[/\s.\-]").expect("special character pattern is valid"));

/// Whether a label must be double-quoted.
pub fn needs_quoting(label: &str) -> bool {
    SPECIAL_CHARACTERS.is_match(label)
}

/// Quote with double quotes, escaping embedded quotes by doubling.
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a string literal with single quotes, escaping by doubling.
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Render a label, quoting it if its interpolated form needs quoting.
///
/// The decision is made on the interpolated value but the original text is
/// what gets emitted, so `$namespace` resolving to `AWS/EC2` renders as
/// `"$namespace"` and is still interpolated later by the query executor.
pub fn quote_label(label: &str, variables: &dyn TemplateVariables) -> String {
    let interpolated = variables.replace(label);
    if needs_quoting(&interpolated) {
        quote_double(label)
    } else {
        label.to_string()
    }
}
