//! Statistic and aggregation names.
//!
//! These checks back the editors' pickers. Generation and the completeness
//! checks never call them, so an unrecognized name still reaches the backend.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::template::is_template_variable;

/// Aggregations accepted by Metrics Insights `SELECT`.
pub const AGGREGATIONS: &[&str] = &["AVG", "SUM", "MIN", "MAX", "COUNT"];

/// Statistics accepted by `GetMetricData`.
pub const STANDARD_STATISTICS: &[&str] =
    &["Average", "Sum", "Minimum", "Maximum", "SampleCount", "IQM"];

static PERCENTILE_AGGREGATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^p\d{1,2}(\.\d+)?$").expect("valid regex"));

/// `p99`, `tm90`, `wm99.5` ...
static EXTENDED_SHORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(p|tm|tc|ts|wm)\d{1,2}(\.\d{1,2})?$").expect("valid regex"));

/// `TM(10%:90%)`, `TC(:0.5)`, `PR(100:2000)` ...
static EXTENDED_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(PR|TM|TC|TS|WM)\((\d+(\.\d+)?%?)?:(\d+(\.\d+)?%?)?\)$").expect("valid regex")
});

pub fn is_valid_aggregation(name: &str) -> bool {
    AGGREGATIONS.contains(&name)
        || PERCENTILE_AGGREGATION.is_match(name)
        || is_template_variable(name)
}

pub fn is_valid_statistic(stat: &str) -> bool {
    STANDARD_STATISTICS.contains(&stat)
        || EXTENDED_SHORT.is_match(stat)
        || EXTENDED_RANGE.is_match(stat)
        || is_template_variable(stat)
}
