//! Shared, version-pinned protocol identifiers.
//!
//! These constants are the single source of truth for schema/version strings that
//! appear in machine-readable I/O of the SCD toolchain.

pub const SCD_LANG_ID: &str = "smartc-scd@0.1.0";

pub const SCD_DIAG_SCHEMA_VERSION: &str = "scdc.diag@0.1.0";
pub const SCDC_REPORT_SCHEMA_VERSION: &str = "scdc.report@0.1.0";
pub const SCD_LAYOUT_SCHEMA_VERSION: &str = "scdc.layout@0.1.0";
