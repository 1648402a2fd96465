//! Pipeline orchestration for SBOM validation.
//!
//! This module provides shared orchestration logic for the load, detect,
//! conformance, rules, report workflow, reducing duplication across CLI
//! command handlers.

mod output;
mod validate;

pub use output::{auto_detect_format, should_use_color, write_output, OutputTarget};
pub use validate::ValidationPipeline;

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success - every input was valid
    pub const SUCCESS: i32 = 0;
    /// An application error occurred (bad configuration, bad arguments)
    pub const ERROR: i32 = 1;
    /// Validation findings: invalid, unrecognized, or unreadable inputs
    pub const FINDINGS: i32 = 2;
}
