//! Query records as stored by the CloudWatch datasource.
//!
//! - [`query`] - Metrics queries (search and Metrics Insights)
//! - [`annotation`] - Annotation queries and their legacy migration
//! - [`dimensions`] - Dimension maps and their row/SQL representations

pub mod annotation;
pub mod dimensions;
pub mod query;

pub use annotation::{
    prepare_annotation, prepare_query, AnnotationQuery, AnnotationTarget, LegacyAnnotationFields,
};
pub use dimensions::{
    from_filter_conditions, from_keys, from_sql_filters, to_filter_conditions, to_sql_filters,
    without_key, DimensionValue, Dimensions, FilterCondition,
};
pub use query::{MetricEditorMode, MetricQueryType, MetricsQuery, QueryMode};
