//! Validation stages: type coercion, schema conformance, and
//! business-rule filtering.
//!
//! Each stage consumes a table and returns a [`dq_model::Partition`], so
//! ownership of the data moves forward through the pipeline instead of
//! being shared and mutated behind the caller's back.

pub mod coerce;
pub mod rules;
pub mod schema;

pub use coerce::coerce_column;
pub use rules::validate_rules;
pub use schema::validate_schema;
