use std::sync::OnceLock;

use jsonschema::{Draft, Validator};
use serde_json::Value;

use crate::diagnostics::Stage;
use crate::validate::{codes, ScdError, ValidationError};

pub const SCD_SCHEMA_BYTES: &[u8] = include_bytes!("../../../spec/scd.schema.json");

static VALIDATOR: OnceLock<Result<Validator, String>> = OnceLock::new();

fn build_validator() -> Result<Validator, String> {
    let schema: Value = serde_json::from_slice(SCD_SCHEMA_BYTES)
        .map_err(|err| format!("parse embedded SCD schema: {err}"))?;
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .map_err(|err| format!("build SCD schema validator: {err}"))
}

fn validator() -> Result<&'static Validator, ScdError> {
    VALIDATOR
        .get_or_init(build_validator)
        .as_ref()
        .map_err(|msg| ScdError::Invariant(msg.clone()))
}

/// Every schema violation in `doc`, in validator order.
pub fn schema_errors(doc: &Value) -> Result<Vec<ValidationError>, ScdError> {
    let validator = validator()?;
    Ok(validator
        .iter_errors(doc)
        .map(|err| ValidationError {
            code: codes::SCHEMA,
            stage: Stage::Schema,
            ptr: err.instance_path().to_string(),
            message: err.to_string(),
        })
        .collect())
}

pub fn schema_text() -> Result<&'static str, ScdError> {
    std::str::from_utf8(SCD_SCHEMA_BYTES)
        .map_err(|err| ScdError::Invariant(format!("embedded SCD schema is not UTF-8: {err}")))
}
