use std::collections::BTreeMap;
use std::fmt::Display;

use serde_json::{Number, Value};

use crate::diagnostics::{Diagnostic, Location, Position, Span, Stage};
use crate::language::{self, limits};
use crate::model::{
    ContractDescription, ContractModel, EnumEntry, MapDefinition, MapItem, MapItemType,
    MethodDefinition, Pragmas, ScalarType, TransactionDefinition, TransactionKind,
    ValueDefinition, ValueType, VariableDefinition, VariableKind,
};
use crate::scd::{ScdFile, ScdMap, ScdMapItem, ScdMethod, ScdTransaction, ScdValue, ScdVariable};
use crate::schema;

pub mod codes {
    pub const PARSE: &str = "SCD-PARSE-0001";
    pub const SCHEMA: &str = "SCD-SCHEMA-0001";
    pub const DECODE: &str = "SCD-SCHEMA-0002";
    pub const NAME_INVALID: &str = "SCD-NAME-0001";
    pub const NAME_RESERVED: &str = "SCD-NAME-0002";
    pub const DUP_NAME: &str = "SCD-DUP-0001";
    pub const DUP_CODE: &str = "SCD-DUP-0002";
    pub const DUP_SYMBOL: &str = "SCD-DUP-0003";
    pub const INT_RANGE: &str = "SCD-INT-0001";
    pub const STRUCT_FIELDS: &str = "SCD-STRUCT-0001";
    pub const STRUCT_NESTED: &str = "SCD-STRUCT-0002";
    pub const VAR_MISSING_VALUE: &str = "SCD-VAR-0001";
    pub const VAR_BAD_LITERAL: &str = "SCD-VAR-0002";
    pub const MAP_MISSING_VALUE: &str = "SCD-MAP-0001";
    pub const MAP_ENUM: &str = "SCD-MAP-0002";
    pub const METHOD_ARGS: &str = "SCD-METHOD-0001";
    pub const TEXT_MULTILINE: &str = "SCD-TEXT-0001";
    pub const ADV_NO_MAP_CONSTANT: &str = "SCD-ADV-0001";
    pub const ADV_UNUSED_VALUE: &str = "SCD-ADV-0002";
    pub const ADV_ARRAY_AS_LONG: &str = "SCD-ADV-0003";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: u32,
    pub col: u32,
}

impl std::error::Error for ParseError {}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid JSON: {} (line {}, col {})", self.message, self.line, self.col)
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            message: err.to_string(),
            line: u32::try_from(err.line()).unwrap_or(u32::MAX),
            col: u32::try_from(err.column()).unwrap_or(u32::MAX),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub code: &'static str,
    pub stage: Stage,
    /// JSON pointer into the input document; empty for the root.
    pub ptr: String,
    pub message: String,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ptr = if self.ptr.is_empty() { "/" } else { &self.ptr };
        write!(f, "{ptr}: {}", self.message)
    }
}

impl ValidationError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code, self.stage, self.message.clone()).at_ptr(self.ptr.clone())
    }
}

#[derive(Debug, Clone)]
pub enum ScdError {
    /// The input text is not JSON at all.
    Parse(ParseError),
    /// The complete batch of schema/semantic violations.
    Invalid(Vec<ValidationError>),
    /// A toolchain bug, never a property of the input.
    Invariant(String),
}

impl std::error::Error for ScdError {}

impl Display for ScdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScdError::Parse(err) => write!(f, "{err}"),
            ScdError::Invalid(errors) => {
                write!(f, "invalid SCD ({} error(s))", errors.len())?;
                for err in errors {
                    write!(f, "\n  {err}")?;
                }
                Ok(())
            }
            ScdError::Invariant(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl ScdError {
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            ScdError::Parse(err) => {
                let pos = Position {
                    line: err.line,
                    col: err.col,
                };
                let mut d = Diagnostic::error(codes::PARSE, Stage::Parse, err.message.clone());
                d.loc = Some(Location::Text {
                    span: Span {
                        start: pos.clone(),
                        end: pos,
                    },
                });
                vec![d]
            }
            ScdError::Invalid(errors) => errors.iter().map(ValidationError::to_diagnostic).collect(),
            ScdError::Invariant(msg) => vec![Diagnostic::error(
                "SCD-INTERNAL-0001",
                Stage::Schema,
                msg.clone(),
            )],
        }
    }
}

/// Raw input accepted by [`validate`].
#[derive(Debug, Clone, Copy)]
pub enum ScdInput<'a> {
    Text(&'a str),
    Value(&'a Value),
}

impl<'a> From<&'a str> for ScdInput<'a> {
    fn from(text: &'a str) -> Self {
        ScdInput::Text(text)
    }
}

impl<'a> From<&'a Value> for ScdInput<'a> {
    fn from(value: &'a Value) -> Self {
        ScdInput::Value(value)
    }
}

pub fn validate<'a>(input: impl Into<ScdInput<'a>>) -> Result<ContractDescription, ScdError> {
    match input.into() {
        ScdInput::Text(text) => validate_scd_json(text.as_bytes()),
        ScdInput::Value(doc) => validate_scd_value(doc),
    }
}

pub fn parse_scd_json(bytes: &[u8]) -> Result<Value, ParseError> {
    Ok(serde_json::from_slice(bytes)?)
}

pub fn validate_scd_json(bytes: &[u8]) -> Result<ContractDescription, ScdError> {
    let doc = parse_scd_json(bytes).map_err(ScdError::Parse)?;
    validate_scd_value(&doc)
}

pub fn validate_scd_value(doc: &Value) -> Result<ContractDescription, ScdError> {
    let mut errors = schema::schema_errors(doc)?;
    if !errors.is_empty() {
        let mut checker = Checker::default();
        checker.check_raw_names(doc);
        errors.append(&mut checker.errors);
        sort_errors(&mut errors);
        return Err(ScdError::Invalid(errors));
    }

    let file: ScdFile = serde_json::from_value(doc.clone()).map_err(|err| {
        ScdError::Invalid(vec![ValidationError {
            code: codes::DECODE,
            stage: Stage::Schema,
            ptr: String::new(),
            message: format!("decode: {err}"),
        }])
    })?;

    let mut checker = Checker::default();
    let desc = checker.lower_file(&file);
    if checker.errors.is_empty() {
        Ok(desc)
    } else {
        sort_errors(&mut checker.errors);
        Err(ScdError::Invalid(checker.errors))
    }
}

pub fn load_model(bytes: &[u8]) -> Result<ContractModel, ScdError> {
    validate_scd_json(bytes).map(ContractModel::from_validated)
}

fn sort_errors(errors: &mut [ValidationError]) {
    errors.sort_by(|a, b| {
        a.ptr
            .cmp(&b.ptr)
            .then_with(|| a.code.cmp(b.code))
            .then_with(|| a.message.cmp(&b.message))
    });
}

pub fn validate_identifier(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name must be non-empty".to_string());
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap_or('_');
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(format!("invalid name start (must be [A-Za-z_]): {name:?}"));
    }
    for c in chars {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!("invalid name char (allowed [A-Za-z0-9_]): {name:?}"));
        }
    }
    Ok(())
}

/// Name of the preprocessor constant a map's first key is exposed under.
pub fn map_constant_name(map: &str, key1: &str) -> String {
    format!("MAP_{}_{}", map.to_ascii_uppercase(), key1.to_ascii_uppercase())
}

#[derive(Default)]
struct Checker {
    errors: Vec<ValidationError>,
    /// C-level identifiers at file scope (methods, variables).
    globals: BTreeMap<String, String>,
    /// Preprocessor constants and struct tags the generator emits.
    symbols: BTreeMap<String, String>,
    /// The `#define` subset of `symbols`; these rewrite any matching token.
    macros: BTreeMap<String, String>,
    /// Every identifier that ends up in generated code, checked against `macros` last.
    emitted_names: Vec<(String, String)>,
}

impl Checker {
    fn push(&mut self, code: &'static str, ptr: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError {
            code,
            stage: Stage::Semantic,
            ptr: ptr.into(),
            message: message.into(),
        });
    }

    fn ident(&mut self, name: &str, ptr: &str) -> String {
        if let Err(msg) = validate_identifier(name) {
            self.push(codes::NAME_INVALID, ptr, msg);
        }
        name.to_string()
    }

    /// An identifier that appears verbatim in generated SmartC.
    fn c_ident(&mut self, name: &str, ptr: &str) -> String {
        let name = self.ident(name, ptr);
        if language::is_reserved(&name) {
            self.push(
                codes::NAME_RESERVED,
                ptr,
                format!("{name:?} is reserved in SmartC or by the generated skeleton"),
            );
        }
        self.emitted_names.push((name.clone(), ptr.to_string()));
        name
    }

    fn unique(
        &mut self,
        seen: &mut BTreeMap<String, String>,
        code: &'static str,
        what: &str,
        key: String,
        ptr: &str,
    ) {
        if let Some(first) = seen.get(&key) {
            let message = format!("duplicate {what} {key:?} (first declared at {first})");
            self.push(code, ptr, message);
        } else {
            seen.insert(key, ptr.to_string());
        }
    }

    fn global(&mut self, what: &str, name: &str, ptr: &str) {
        let mut seen = std::mem::take(&mut self.globals);
        self.unique(&mut seen, codes::DUP_NAME, what, name.to_string(), ptr);
        self.globals = seen;
    }

    fn symbol(&mut self, what: &str, name: String, ptr: &str, is_macro: bool) {
        if is_macro && !self.symbols.contains_key(&name) {
            self.macros.insert(name.clone(), ptr.to_string());
        }
        let mut seen = std::mem::take(&mut self.symbols);
        self.unique(&mut seen, codes::DUP_SYMBOL, what, name, ptr);
        self.symbols = seen;
    }

    fn uint(&mut self, text: &str, ptr: &str) -> u64 {
        match text.parse::<u64>() {
            Ok(v) => v,
            Err(_) => {
                self.push(
                    codes::INT_RANGE,
                    ptr,
                    format!("integer literal out of range [0,{}]: {text:?}", u64::MAX),
                );
                0
            }
        }
    }

    fn bounded(&mut self, v: u64, max: u64, ptr: &str) -> u8 {
        match u8::try_from(v) {
            Ok(b) if v <= max => b,
            _ => {
                self.push(codes::INT_RANGE, ptr, format!("expected integer in [0,{max}]"));
                0
            }
        }
    }

    /// Pragma integers; the schema lets integral floats such as `3.0` through.
    fn pragma_int(&mut self, n: &Number, max: u64, ptr: &str) -> u8 {
        let v = n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && (0.0..=max as f64).contains(f))
                .map(|f| f as u64)
        });
        match v {
            Some(v) => self.bounded(v, max, ptr),
            None => {
                self.push(codes::INT_RANGE, ptr, format!("expected integer in [0,{max}], got {n}"));
                0
            }
        }
    }

    fn value_type(&mut self, name: &str, ptr: &str) -> ValueType {
        ValueType::parse(name).unwrap_or_else(|| {
            self.push(codes::DECODE, ptr, format!("unknown value type {name:?}"));
            ValueType::scalar(ScalarType::Long)
        })
    }

    /// Name and uniqueness rules over a document the schema rejected, so one report carries
    /// both kinds of violation. Names that are missing, empty or not strings are left to the
    /// schema errors.
    fn check_raw_names(&mut self, doc: &Value) {
        if let Some(name) = raw_name(doc, "contractName") {
            self.ident(name, "/contractName");
        }
        for (i, m) in raw_items(doc, "methods") {
            let ptr = format!("/methods/{i}");
            if let Some(name) = raw_name(m, "name") {
                let name_ptr = format!("{ptr}/name");
                self.c_ident(name, &name_ptr);
                self.global("method/variable name", name, &name_ptr);
            }
            let mut arg_names = BTreeMap::new();
            self.raw_members(m, "args", &ptr, &mut arg_names, "argument name", true);
        }
        for (i, v) in raw_items(doc, "variables") {
            let ptr = format!("/variables/{i}");
            if let Some(name) = raw_name(v, "name") {
                let name_ptr = format!("{ptr}/name");
                self.c_ident(name, &name_ptr);
                self.global("method/variable name", name, &name_ptr);
            }
            let mut field_names = BTreeMap::new();
            self.raw_members(v, "fields", &ptr, &mut field_names, "field name", true);
        }
        let mut map_names = BTreeMap::new();
        for (i, m) in raw_items(doc, "maps") {
            let ptr = format!("/maps/{i}");
            if let Some(name) = raw_name(m, "name") {
                let name_ptr = format!("{ptr}/name");
                self.ident(name, &name_ptr);
                let key = name.to_string();
                self.unique(&mut map_names, codes::DUP_NAME, "map name", key, &name_ptr);
            }
            for key in ["key1", "key2", "value"] {
                let Some(item) = m.get(key) else { continue };
                let item_ptr = format!("{ptr}/{key}");
                if let Some(name) = raw_name(item, "name") {
                    self.ident(name, &format!("{item_ptr}/name"));
                }
                let mut entries = BTreeMap::new();
                self.raw_members(item, "oneOf", &item_ptr, &mut entries, "enum entry name", false);
            }
        }
        let mut tx_names = BTreeMap::new();
        for (i, t) in raw_items(doc, "transactions") {
            if let Some(name) = raw_name(t, "name") {
                let name_ptr = format!("/transactions/{i}/name");
                self.ident(name, &name_ptr);
                let key = name.to_string();
                self.unique(&mut tx_names, codes::DUP_NAME, "transaction name", key, &name_ptr);
            }
        }
    }

    fn raw_members(
        &mut self,
        parent: &Value,
        key: &str,
        ptr: &str,
        seen: &mut BTreeMap<String, String>,
        what: &str,
        emitted: bool,
    ) {
        for (j, member) in raw_items(parent, key) {
            let Some(name) = raw_name(member, "name") else { continue };
            let name_ptr = format!("{ptr}/{key}/{j}/name");
            if emitted {
                self.c_ident(name, &name_ptr);
            } else {
                self.ident(name, &name_ptr);
            }
            self.unique(seen, codes::DUP_NAME, what, name.to_string(), &name_ptr);
        }
    }

    fn lower_file(&mut self, file: &ScdFile) -> ContractDescription {
        self.symbol(
            "generated struct tag",
            language::TX_STRUCT_TAG.to_string(),
            "(generated)",
            false,
        );

        let name = self.ident(&file.contract_name, "/contractName");
        if let Some(desc) = &file.description {
            if desc.contains(['\n', '\r']) {
                self.push(
                    codes::TEXT_MULTILINE,
                    "/description",
                    "contract description must be a single line",
                );
            }
        }
        let activation_amount = self.uint(&file.activation_amount, "/activationAmount");
        let pragmas = self.lower_pragmas(file);

        let mut codes_seen: BTreeMap<u64, String> = BTreeMap::new();
        let methods = file
            .methods
            .iter()
            .enumerate()
            .map(|(i, m)| self.lower_method(m, &format!("/methods/{i}"), &mut codes_seen))
            .collect();
        let variables = file
            .variables
            .iter()
            .enumerate()
            .map(|(i, v)| self.lower_variable(v, &format!("/variables/{i}")))
            .collect();

        let mut map_names = BTreeMap::new();
        let maps = file
            .maps
            .iter()
            .enumerate()
            .map(|(i, m)| self.lower_map(m, &format!("/maps/{i}"), &mut map_names))
            .collect();

        let mut tx_names = BTreeMap::new();
        let transactions = file
            .transactions
            .iter()
            .enumerate()
            .map(|(i, t)| self.lower_transaction(t, &format!("/transactions/{i}"), &mut tx_names))
            .collect();

        for (name, ptr) in std::mem::take(&mut self.emitted_names) {
            if let Some(first) = self.macros.get(&name).cloned() {
                self.push(
                    codes::DUP_SYMBOL,
                    ptr,
                    format!("{name:?} collides with a generated constant (declared at {first})"),
                );
            }
        }

        ContractDescription {
            name,
            description: file.description.clone(),
            activation_amount,
            pragmas,
            methods,
            variables,
            maps,
            transactions,
        }
    }

    fn lower_pragmas(&mut self, file: &ScdFile) -> Pragmas {
        let p = &file.pragmas;
        let max_aux_vars =
            self.pragma_int(&p.max_aux_vars, limits::MAX_AUX_VARS, "/pragmas/maxAuxVars");
        let optimization_level = self.pragma_int(
            &p.optimization_level,
            limits::MAX_OPTIMIZATION_LEVEL,
            "/pragmas/optimizationLevel",
        );
        let code_stack_pages = p
            .code_stack_pages
            .as_ref()
            .map(|v| self.pragma_int(v, limits::MAX_STACK_PAGES, "/pragmas/codeStackPages"));
        let user_stack_pages = p
            .user_stack_pages
            .as_ref()
            .map(|v| self.pragma_int(v, limits::MAX_STACK_PAGES, "/pragmas/userStackPages"));
        Pragmas {
            max_aux_vars,
            optimization_level,
            verbose_assembly: p.verbose_assembly,
            version: p.version.clone(),
            code_stack_pages,
            user_stack_pages,
        }
    }

    fn lower_method(
        &mut self,
        m: &ScdMethod,
        ptr: &str,
        codes_seen: &mut BTreeMap<u64, String>,
    ) -> MethodDefinition {
        let name_ptr = format!("{ptr}/name");
        let name = self.c_ident(&m.name, &name_ptr);
        self.global("method/variable name", &name, &name_ptr);
        self.symbol("method constant", name.to_ascii_uppercase(), &name_ptr, true);

        let code_ptr = format!("{ptr}/code");
        let code = self.uint(&m.code, &code_ptr);
        if code == 0 || code > i64::MAX as u64 {
            self.push(
                codes::INT_RANGE,
                &code_ptr,
                format!("method code must be in [1,{}]", i64::MAX),
            );
        } else if let Some(first) = codes_seen.get(&code) {
            let message = format!("duplicate method code {code} (first declared at {first})");
            self.push(codes::DUP_CODE, &code_ptr, message);
        } else {
            codes_seen.insert(code, code_ptr.clone());
        }

        if m.args.len() > limits::MAX_METHOD_ARGS {
            self.push(
                codes::METHOD_ARGS,
                format!("{ptr}/args"),
                format!(
                    "method takes {} args, at most {} fit into one message page",
                    m.args.len(),
                    limits::MAX_METHOD_ARGS
                ),
            );
        }
        let mut arg_names = BTreeMap::new();
        let args = m
            .args
            .iter()
            .enumerate()
            .map(|(j, a)| {
                let arg_ptr = format!("{ptr}/args/{j}");
                let def = self.lower_value(a, &arg_ptr);
                self.unique(
                    &mut arg_names,
                    codes::DUP_NAME,
                    "argument name",
                    def.name.clone(),
                    &format!("{arg_ptr}/name"),
                );
                def
            })
            .collect();

        MethodDefinition {
            name,
            description: m.description.clone(),
            code,
            args,
        }
    }

    fn lower_value(&mut self, v: &ScdValue, ptr: &str) -> ValueDefinition {
        let name = self.c_ident(&v.name, &format!("{ptr}/name"));
        let ty = self.value_type(&v.ty, &format!("{ptr}/type"));
        ValueDefinition { name, ty }
    }

    fn lower_variable(&mut self, v: &ScdVariable, ptr: &str) -> VariableDefinition {
        let name_ptr = format!("{ptr}/name");
        let name = self.c_ident(&v.name, &name_ptr);
        self.global("method/variable name", &name, &name_ptr);

        let kind = if v.ty == "struct" {
            self.symbol("struct tag", name.to_ascii_uppercase(), &name_ptr, false);
            VariableKind::Struct(self.lower_fields(v, ptr))
        } else {
            if v.fields.is_some() {
                self.push(
                    codes::STRUCT_FIELDS,
                    format!("{ptr}/fields"),
                    "fields are only allowed on struct variables",
                );
            }
            VariableKind::Value(self.value_type(&v.ty, &format!("{ptr}/type")))
        };

        let def = VariableDefinition {
            name,
            kind,
            description: v.description.clone(),
            constant: v.constant,
            initializable: v.initializable,
            value: v.value.clone(),
        };
        if def.constant && !def.initializable {
            self.check_literal(&def, ptr);
        }
        def
    }

    fn lower_fields(&mut self, v: &ScdVariable, ptr: &str) -> Vec<ValueDefinition> {
        let fields = v.fields.as_deref().unwrap_or_default();
        if fields.is_empty() {
            self.push(
                codes::STRUCT_FIELDS,
                ptr,
                "struct variables must declare at least one field",
            );
        }
        let mut field_names = BTreeMap::new();
        let mut out = Vec::with_capacity(fields.len());
        for (j, f) in fields.iter().enumerate() {
            let field_ptr = format!("{ptr}/fields/{j}");
            if f.ty == "struct" {
                self.push(
                    codes::STRUCT_NESTED,
                    format!("{field_ptr}/type"),
                    "nested structs are not allowed; struct fields must be value types",
                );
                continue;
            }
            let def = self.lower_value(f, &field_ptr);
            self.unique(
                &mut field_names,
                codes::DUP_NAME,
                "field name",
                def.name.clone(),
                &format!("{field_ptr}/name"),
            );
            out.push(def);
        }
        out
    }

    fn check_literal(&mut self, def: &VariableDefinition, ptr: &str) {
        let value_ptr = format!("{ptr}/value");
        let Some(ty) = def.value_type().filter(|ty| !ty.array) else {
            self.push(
                codes::VAR_BAD_LITERAL,
                ptr,
                "only scalar non-array variables can be constant literals",
            );
            return;
        };
        let Some(value) = def.value.as_deref() else {
            self.push(
                codes::VAR_MISSING_VALUE,
                ptr,
                "constant non-initializable variables must carry a literal value",
            );
            return;
        };
        let ok = match ty.scalar {
            ScalarType::Boolean => value == "true" || value == "false",
            ScalarType::String => {
                value.len() <= limits::MAX_STRING_LITERAL_BYTES
                    && value
                        .chars()
                        .all(|c| c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\')
            }
            ScalarType::Address | ScalarType::Long | ScalarType::Amount | ScalarType::TxId => {
                !value.is_empty() && value.parse::<u64>().is_ok()
            }
        };
        if !ok {
            let expected = match ty.scalar {
                ScalarType::Boolean => "true or false".to_string(),
                ScalarType::String => format!(
                    "at most {} printable ASCII chars without quotes or backslashes",
                    limits::MAX_STRING_LITERAL_BYTES
                ),
                _ => "an unsigned 64-bit integer".to_string(),
            };
            self.push(
                codes::VAR_BAD_LITERAL,
                value_ptr,
                format!("literal {value:?} for {ty} variable must be {expected}"),
            );
        }
    }

    fn lower_map(
        &mut self,
        m: &ScdMap,
        ptr: &str,
        map_names: &mut BTreeMap<String, String>,
    ) -> MapDefinition {
        let name_ptr = format!("{ptr}/name");
        let name = self.ident(&m.name, &name_ptr);
        self.unique(map_names, codes::DUP_NAME, "map name", name.clone(), &name_ptr);

        let key1 = self.lower_map_item(&m.key1, &format!("{ptr}/key1"));
        let key2 = self.lower_map_item(&m.key2, &format!("{ptr}/key2"));
        let value = self.lower_map_item(&m.value, &format!("{ptr}/value"));
        if key1.value.is_some() {
            self.symbol(
                "map constant",
                map_constant_name(&name, &key1.name),
                &format!("{ptr}/key1/name"),
                true,
            );
        }

        MapDefinition {
            name,
            description: m.description.clone(),
            key1,
            key2,
            value,
        }
    }

    fn lower_map_item(&mut self, item: &ScdMapItem, ptr: &str) -> MapItem {
        let name = self.ident(&item.name, &format!("{ptr}/name"));
        let type_ptr = format!("{ptr}/type");

        let ty = match (item.ty.as_deref(), item.one_of.as_deref()) {
            (None, None) => None,
            (Some("enum"), None) | (Some("enum"), Some([])) | (None, Some([])) => {
                self.push(
                    codes::MAP_ENUM,
                    ptr,
                    "enum map items must list their values in a non-empty oneOf",
                );
                Some(MapItemType::Enum(Vec::new()))
            }
            (Some("enum") | None, Some(entries)) => {
                Some(MapItemType::Enum(self.lower_enum(entries, ptr)))
            }
            (Some(scalar), one_of) => {
                if one_of.is_some() {
                    self.push(
                        codes::MAP_ENUM,
                        format!("{ptr}/oneOf"),
                        "oneOf is only allowed on enum map items",
                    );
                }
                let scalar = ScalarType::parse(scalar).unwrap_or_else(|| {
                    self.push(codes::DECODE, &type_ptr, format!("unknown map item type {scalar:?}"));
                    ScalarType::Long
                });
                Some(MapItemType::Scalar(scalar))
            }
        };

        let value = item
            .value
            .as_deref()
            .map(|v| self.uint(v, &format!("{ptr}/value")));
        if item.constant && value.is_none() {
            self.push(
                codes::MAP_MISSING_VALUE,
                ptr,
                "constant map items must carry a literal value",
            );
        }

        MapItem {
            name,
            description: item.description.clone(),
            ty,
            constant: item.constant,
            value,
        }
    }

    fn lower_enum(&mut self, entries: &[crate::scd::ScdEnumEntry], ptr: &str) -> Vec<EnumEntry> {
        if entries.len() > limits::MAX_ENUM_ENTRIES {
            self.push(
                codes::MAP_ENUM,
                format!("{ptr}/oneOf"),
                format!("at most {} enum entries are allowed", limits::MAX_ENUM_ENTRIES),
            );
        }
        let mut names = BTreeMap::new();
        entries
            .iter()
            .enumerate()
            .map(|(k, e)| {
                let entry_ptr = format!("{ptr}/oneOf/{k}");
                let name = self.ident(&e.name, &format!("{entry_ptr}/name"));
                self.unique(
                    &mut names,
                    codes::DUP_NAME,
                    "enum entry name",
                    name.clone(),
                    &format!("{entry_ptr}/name"),
                );
                let value = self.uint(&e.value, &format!("{entry_ptr}/value"));
                EnumEntry { name, value }
            })
            .collect()
    }

    fn lower_transaction(
        &mut self,
        t: &ScdTransaction,
        ptr: &str,
        tx_names: &mut BTreeMap<String, String>,
    ) -> TransactionDefinition {
        let name_ptr = format!("{ptr}/name");
        let name = self.ident(&t.name, &name_ptr);
        self.unique(tx_names, codes::DUP_NAME, "transaction name", name.clone(), &name_ptr);
        let kind = TransactionKind::parse(&t.kind).unwrap_or_else(|| {
            self.push(
                codes::DECODE,
                format!("{ptr}/kind"),
                format!("unknown transaction kind {:?}", t.kind),
            );
            TransactionKind::SendMessage
        });
        TransactionDefinition {
            name,
            description: t.description.clone(),
            kind,
        }
    }
}

fn raw_name<'a>(v: &'a Value, key: &str) -> Option<&'a str> {
    v.get(key).and_then(Value::as_str).filter(|name| !name.is_empty())
}

fn raw_items<'a>(v: &'a Value, key: &str) -> impl Iterator<Item = (usize, &'a Value)> {
    v.get(key).and_then(Value::as_array).into_iter().flatten().enumerate()
}

/// Non-blocking findings about a valid description: places where the generated skeleton
/// carries less than the description says.
pub fn advisories(model: &ContractModel) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    for (i, map) in model.maps().iter().enumerate() {
        if map.key1.value.is_none() {
            out.push(
                Diagnostic::warning(
                    codes::ADV_NO_MAP_CONSTANT,
                    Stage::Codegen,
                    format!(
                        "map {:?} has no key1 value; no {} constant is generated",
                        map.name,
                        map_constant_name(&map.name, &map.key1.name)
                    ),
                )
                .at_ptr(format!("/maps/{i}/key1")),
            );
        }
    }

    for (i, v) in model.state().iter().enumerate() {
        if v.value.is_some() && v.literal().is_none() {
            out.push(
                Diagnostic::warning(
                    codes::ADV_UNUSED_VALUE,
                    Stage::Codegen,
                    format!(
                        "value of {:?} is only emitted for constant, non-initializable variables",
                        v.name
                    ),
                )
                .at_ptr(format!("/variables/{i}/value")),
            );
        }
        if v.value_type().is_some_and(|ty| ty.array) {
            out.push(array_advisory(&v.name, format!("/variables/{i}/type")));
        }
        for (j, f) in v.fields().iter().enumerate() {
            if f.ty.array {
                out.push(array_advisory(
                    &format!("{}.{}", v.name, f.name),
                    format!("/variables/{i}/fields/{j}/type"),
                ));
            }
        }
    }

    for (i, m) in model.methods().iter().enumerate() {
        for (j, a) in m.args.iter().enumerate() {
            if a.ty.array {
                out.push(array_advisory(
                    &format!("{}({})", m.name, a.name),
                    format!("/methods/{i}/args/{j}/type"),
                ));
            }
        }
    }

    out
}

fn array_advisory(what: &str, ptr: String) -> Diagnostic {
    Diagnostic::warning(
        codes::ADV_ARRAY_AS_LONG,
        Stage::Codegen,
        format!("{what} has an array type; it is declared as a single long in generated code"),
    )
    .at_ptr(ptr)
}
