//! Wire format of a SmartC Contract Description (SCD).
//!
//! These structs mirror the JSON document one to one, numeric literals included (they are
//! carried as decimal strings so they never pass through a float; the small pragma integers
//! stay raw [`Number`]s so `3.0` reaches the checker). They are only ever built
//! from a value that already passed the embedded schema; `validate` lowers them into the typed
//! [`crate::model`].

use serde::Deserialize;
use serde_json::Number;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct ScdFile {
    pub(crate) contract_name: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    pub(crate) activation_amount: String,
    pub(crate) pragmas: ScdPragmas,
    pub(crate) methods: Vec<ScdMethod>,
    pub(crate) variables: Vec<ScdVariable>,
    pub(crate) maps: Vec<ScdMap>,
    pub(crate) transactions: Vec<ScdTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct ScdPragmas {
    pub(crate) max_aux_vars: Number,
    pub(crate) optimization_level: Number,
    pub(crate) verbose_assembly: bool,
    pub(crate) version: String,
    #[serde(default)]
    pub(crate) code_stack_pages: Option<Number>,
    #[serde(default)]
    pub(crate) user_stack_pages: Option<Number>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScdValue {
    pub(crate) name: String,
    #[serde(rename = "type")]
    pub(crate) ty: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScdMethod {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    pub(crate) code: String,
    pub(crate) args: Vec<ScdValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScdVariable {
    pub(crate) name: String,
    #[serde(rename = "type")]
    pub(crate) ty: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) constant: bool,
    #[serde(default)]
    pub(crate) initializable: bool,
    #[serde(default)]
    pub(crate) value: Option<String>,
    #[serde(default)]
    pub(crate) fields: Option<Vec<ScdValue>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScdEnumEntry {
    pub(crate) name: String,
    pub(crate) value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct ScdMapItem {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default, rename = "type")]
    pub(crate) ty: Option<String>,
    #[serde(default)]
    pub(crate) constant: bool,
    #[serde(default)]
    pub(crate) value: Option<String>,
    #[serde(default)]
    pub(crate) one_of: Option<Vec<ScdEnumEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScdMap {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    pub(crate) key1: ScdMapItem,
    pub(crate) key2: ScdMapItem,
    pub(crate) value: ScdMapItem,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScdTransaction {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    pub(crate) kind: String,
}
