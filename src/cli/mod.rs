//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand.

mod license;
mod query;
mod schema;
mod table;
mod validate;

pub use license::{run_license_list, run_license_policy};
pub use query::{run_query, QueryOptions};
pub use schema::run_schema_list;
pub use table::TableData;
pub use validate::{run_validate, ValidateOptions};
