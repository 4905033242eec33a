//! Starter description written by `scdc init`.

use serde_json::{json, Value};

use crate::validate::validate_identifier;

/// 0.5 Signa, in planck.
pub const DEFAULT_ACTIVATION_AMOUNT: u64 = 50_000_000;
pub const DEFAULT_MAX_AUX_VARS: u8 = 3;
pub const DEFAULT_OPTIMIZATION_LEVEL: u8 = 3;
pub const DEFAULT_COMPILER_VERSION: &str = "2.3.0";

/// Returns an error message when `name` is not a usable contract name.
pub fn starter_description(name: &str) -> Result<Value, String> {
    validate_identifier(name)?;
    Ok(json!({
        "contractName": name,
        "activationAmount": DEFAULT_ACTIVATION_AMOUNT.to_string(),
        "pragmas": {
            "maxAuxVars": DEFAULT_MAX_AUX_VARS,
            "optimizationLevel": DEFAULT_OPTIMIZATION_LEVEL,
            "verboseAssembly": false,
            "version": DEFAULT_COMPILER_VERSION,
        },
        "methods": [],
        "variables": [],
        "maps": [],
        "transactions": [],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_description_is_valid() {
        let doc = starter_description("MyContract").expect("valid name");
        let desc = crate::validate::validate(&doc).expect("starter validates");
        let model = crate::model::ContractModel::from_validated(desc);
        assert_eq!(model.contract_info().activation_amount, 50_000_000);
        assert!(model.methods().is_empty());
    }

    #[test]
    fn starter_description_rejects_bad_names() {
        assert!(starter_description("my contract").is_err());
        assert!(starter_description("").is_err());
    }
}
