//! Typed, read-only view of a validated contract description.
//!
//! A [`ContractDescription`] can only be produced by [`crate::validate`]; it has no public
//! constructor and is not `Deserialize`, so every [`ContractModel`] in existence wraps input
//! that passed both the schema and the semantic rules.

use std::fmt::Display;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Address,
    Boolean,
    String,
    Long,
    Amount,
    TxId,
}

impl ScalarType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "address" => Some(ScalarType::Address),
            "boolean" => Some(ScalarType::Boolean),
            "string" => Some(ScalarType::String),
            "long" => Some(ScalarType::Long),
            "amount" => Some(ScalarType::Amount),
            "txId" => Some(ScalarType::TxId),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScalarType::Address => "address",
            ScalarType::Boolean => "boolean",
            ScalarType::String => "string",
            ScalarType::Long => "long",
            ScalarType::Amount => "amount",
            ScalarType::TxId => "txId",
        }
    }
}

/// Type of a method argument, struct field or scalar state variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueType {
    pub scalar: ScalarType,
    pub array: bool,
}

impl ValueType {
    pub const fn scalar(scalar: ScalarType) -> Self {
        Self {
            scalar,
            array: false,
        }
    }

    pub const fn array_of(scalar: ScalarType) -> Self {
        Self {
            scalar,
            array: true,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.strip_suffix("[]") {
            Some(elem) => ScalarType::parse(elem).map(Self::array_of),
            None => ScalarType::parse(name).map(Self::scalar),
        }
    }

    pub fn as_str(self) -> &'static str {
        if !self.array {
            return self.scalar.as_str();
        }
        match self.scalar {
            ScalarType::Address => "address[]",
            ScalarType::Boolean => "boolean[]",
            ScalarType::String => "string[]",
            ScalarType::Long => "long[]",
            ScalarType::Amount => "amount[]",
            ScalarType::TxId => "txId[]",
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ValueType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pragmas {
    pub max_aux_vars: u8,
    pub optimization_level: u8,
    pub verbose_assembly: bool,
    pub version: String,
    pub code_stack_pages: Option<u8>,
    pub user_stack_pages: Option<u8>,
}

impl Pragmas {
    /// Pragma key/value pairs in emission order; unset optional pragmas are skipped.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            ("maxAuxVars", self.max_aux_vars.to_string()),
            ("verboseAssembly", self.verbose_assembly.to_string()),
            ("optimizationLevel", self.optimization_level.to_string()),
            ("version", self.version.clone()),
        ];
        if let Some(pages) = self.code_stack_pages {
            out.push(("codeStackPages", pages.to_string()));
        }
        if let Some(pages) = self.user_stack_pages {
            out.push(("userStackPages", pages.to_string()));
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueDefinition {
    pub name: String,
    pub ty: ValueType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDefinition {
    pub name: String,
    pub description: Option<String>,
    /// Dispatch code carried in the first word of an inbound message.
    pub code: u64,
    pub args: Vec<ValueDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableKind {
    Value(ValueType),
    Struct(Vec<ValueDefinition>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDefinition {
    pub name: String,
    pub kind: VariableKind,
    pub description: Option<String>,
    pub constant: bool,
    pub initializable: bool,
    pub value: Option<String>,
}

impl VariableDefinition {
    pub fn is_struct(&self) -> bool {
        matches!(self.kind, VariableKind::Struct(_))
    }

    pub fn value_type(&self) -> Option<ValueType> {
        match self.kind {
            VariableKind::Value(ty) => Some(ty),
            VariableKind::Struct(_) => None,
        }
    }

    pub fn fields(&self) -> &[ValueDefinition] {
        match &self.kind {
            VariableKind::Value(_) => &[],
            VariableKind::Struct(fields) => fields,
        }
    }

    /// Literal initializer of a constant that cannot be set at deployment.
    pub fn literal(&self) -> Option<&str> {
        if self.constant && !self.initializable {
            self.value.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapItemType {
    Scalar(ScalarType),
    Enum(Vec<EnumEntry>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapItem {
    pub name: String,
    pub description: Option<String>,
    pub ty: Option<MapItemType>,
    pub constant: bool,
    pub value: Option<u64>,
}

impl MapItem {
    pub fn enum_entries(&self) -> &[EnumEntry] {
        match &self.ty {
            Some(MapItemType::Enum(entries)) => entries,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDefinition {
    pub name: String,
    pub description: Option<String>,
    pub key1: MapItem,
    pub key2: MapItem,
    pub value: MapItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    SendAmount,
    SendAmountAndMessage,
    SendMessage,
    SendQuantity,
    SendQuantityAndAmount,
}

impl TransactionKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "sendAmount" => Some(TransactionKind::SendAmount),
            "sendAmountAndMessage" => Some(TransactionKind::SendAmountAndMessage),
            "sendMessage" => Some(TransactionKind::SendMessage),
            "sendQuantity" => Some(TransactionKind::SendQuantity),
            "sendQuantityAndAmount" => Some(TransactionKind::SendQuantityAndAmount),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::SendAmount => "sendAmount",
            TransactionKind::SendAmountAndMessage => "sendAmountAndMessage",
            TransactionKind::SendMessage => "sendMessage",
            TransactionKind::SendQuantity => "sendQuantity",
            TransactionKind::SendQuantityAndAmount => "sendQuantityAndAmount",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDefinition {
    pub name: String,
    pub description: Option<String>,
    pub kind: TransactionKind,
}

/// A description that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDescription {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) activation_amount: u64,
    pub(crate) pragmas: Pragmas,
    pub(crate) methods: Vec<MethodDefinition>,
    pub(crate) variables: Vec<VariableDefinition>,
    pub(crate) maps: Vec<MapDefinition>,
    pub(crate) transactions: Vec<TransactionDefinition>,
}

impl ContractDescription {
    /// Wire-format JSON of this description. Keys come out sorted and numeric literals as
    /// decimal strings, so re-validating the result yields an equal description.
    pub fn to_json_value(&self) -> Value {
        let mut root = Map::new();
        root.insert("contractName".to_string(), Value::String(self.name.clone()));
        insert_opt_str(&mut root, "description", self.description.as_deref());
        root.insert(
            "activationAmount".to_string(),
            Value::String(self.activation_amount.to_string()),
        );
        root.insert("pragmas".to_string(), pragmas_to_value(&self.pragmas));
        root.insert(
            "methods".to_string(),
            Value::Array(self.methods.iter().map(method_to_value).collect()),
        );
        root.insert(
            "variables".to_string(),
            Value::Array(self.variables.iter().map(variable_to_value).collect()),
        );
        root.insert(
            "maps".to_string(),
            Value::Array(self.maps.iter().map(map_to_value).collect()),
        );
        root.insert(
            "transactions".to_string(),
            Value::Array(self.transactions.iter().map(transaction_to_value).collect()),
        );
        Value::Object(root)
    }
}

impl Serialize for ContractDescription {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_value().serialize(serializer)
    }
}

fn insert_opt_str(obj: &mut Map<String, Value>, key: &str, v: Option<&str>) {
    if let Some(v) = v {
        obj.insert(key.to_string(), Value::String(v.to_string()));
    }
}

fn pragmas_to_value(p: &Pragmas) -> Value {
    let mut obj = Map::new();
    obj.insert("maxAuxVars".to_string(), Value::from(p.max_aux_vars));
    obj.insert(
        "optimizationLevel".to_string(),
        Value::from(p.optimization_level),
    );
    obj.insert("verboseAssembly".to_string(), Value::Bool(p.verbose_assembly));
    obj.insert("version".to_string(), Value::String(p.version.clone()));
    if let Some(pages) = p.code_stack_pages {
        obj.insert("codeStackPages".to_string(), Value::from(pages));
    }
    if let Some(pages) = p.user_stack_pages {
        obj.insert("userStackPages".to_string(), Value::from(pages));
    }
    Value::Object(obj)
}

fn value_def_to_value(v: &ValueDefinition) -> Value {
    serde_json::json!({ "name": v.name, "type": v.ty.as_str() })
}

fn method_to_value(m: &MethodDefinition) -> Value {
    let mut obj = Map::new();
    obj.insert("name".to_string(), Value::String(m.name.clone()));
    insert_opt_str(&mut obj, "description", m.description.as_deref());
    obj.insert("code".to_string(), Value::String(m.code.to_string()));
    obj.insert(
        "args".to_string(),
        Value::Array(m.args.iter().map(value_def_to_value).collect()),
    );
    Value::Object(obj)
}

fn variable_to_value(v: &VariableDefinition) -> Value {
    let mut obj = Map::new();
    obj.insert("name".to_string(), Value::String(v.name.clone()));
    match &v.kind {
        VariableKind::Value(ty) => {
            obj.insert("type".to_string(), Value::String(ty.as_str().to_string()));
        }
        VariableKind::Struct(fields) => {
            obj.insert("type".to_string(), Value::String("struct".to_string()));
            obj.insert(
                "fields".to_string(),
                Value::Array(fields.iter().map(value_def_to_value).collect()),
            );
        }
    }
    insert_opt_str(&mut obj, "description", v.description.as_deref());
    obj.insert("constant".to_string(), Value::Bool(v.constant));
    obj.insert("initializable".to_string(), Value::Bool(v.initializable));
    insert_opt_str(&mut obj, "value", v.value.as_deref());
    Value::Object(obj)
}

fn map_item_to_value(item: &MapItem) -> Value {
    let mut obj = Map::new();
    obj.insert("name".to_string(), Value::String(item.name.clone()));
    insert_opt_str(&mut obj, "description", item.description.as_deref());
    match &item.ty {
        None => {}
        Some(MapItemType::Scalar(s)) => {
            obj.insert("type".to_string(), Value::String(s.as_str().to_string()));
        }
        Some(MapItemType::Enum(entries)) => {
            obj.insert("type".to_string(), Value::String("enum".to_string()));
            obj.insert(
                "oneOf".to_string(),
                Value::Array(
                    entries
                        .iter()
                        .map(|e| serde_json::json!({ "name": e.name, "value": e.value.to_string() }))
                        .collect(),
                ),
            );
        }
    }
    obj.insert("constant".to_string(), Value::Bool(item.constant));
    if let Some(v) = item.value {
        obj.insert("value".to_string(), Value::String(v.to_string()));
    }
    Value::Object(obj)
}

fn map_to_value(m: &MapDefinition) -> Value {
    let mut obj = Map::new();
    obj.insert("name".to_string(), Value::String(m.name.clone()));
    insert_opt_str(&mut obj, "description", m.description.as_deref());
    obj.insert("key1".to_string(), map_item_to_value(&m.key1));
    obj.insert("key2".to_string(), map_item_to_value(&m.key2));
    obj.insert("value".to_string(), map_item_to_value(&m.value));
    Value::Object(obj)
}

fn transaction_to_value(t: &TransactionDefinition) -> Value {
    let mut obj = Map::new();
    obj.insert("name".to_string(), Value::String(t.name.clone()));
    insert_opt_str(&mut obj, "description", t.description.as_deref());
    obj.insert("kind".to_string(), Value::String(t.kind.as_str().to_string()));
    Value::Object(obj)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractInfo<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub activation_amount: u64,
    pub pragmas: &'a Pragmas,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractModel {
    desc: ContractDescription,
}

impl ContractModel {
    pub fn from_validated(desc: ContractDescription) -> Self {
        Self { desc }
    }

    pub fn description(&self) -> &ContractDescription {
        &self.desc
    }

    pub fn contract_info(&self) -> ContractInfo<'_> {
        ContractInfo {
            name: &self.desc.name,
            description: self.desc.description.as_deref(),
            activation_amount: self.desc.activation_amount,
            pragmas: &self.desc.pragmas,
        }
    }

    pub fn pragmas(&self) -> &Pragmas {
        &self.desc.pragmas
    }

    pub fn methods(&self) -> &[MethodDefinition] {
        &self.desc.methods
    }

    /// Every state variable, scalars and structs interleaved in declaration order.
    pub fn state(&self) -> &[VariableDefinition] {
        &self.desc.variables
    }

    pub fn variables(&self) -> impl Iterator<Item = &VariableDefinition> + '_ {
        self.desc.variables.iter().filter(|v| !v.is_struct())
    }

    pub fn structs(&self) -> impl Iterator<Item = &VariableDefinition> + '_ {
        self.desc.variables.iter().filter(|v| v.is_struct())
    }

    pub fn maps(&self) -> &[MapDefinition] {
        &self.desc.maps
    }

    pub fn transactions(&self) -> &[TransactionDefinition] {
        &self.desc.transactions
    }
}
