//! SmartC skeleton emitter.
//!
//! Output depends on nothing but the model: regenerating from an unchanged description is
//! byte-identical, which `scdc gen --check` relies on.

use crate::language::{CURRENT_TX, MESSAGE_WORDS, TX_STRUCT_TAG};
use crate::model::{ContractModel, MethodDefinition, ScalarType, VariableDefinition};
use crate::validate::map_constant_name;

/// SmartC storage type every declared value is normalized to.
const STORAGE_TY: &str = "long";
const INDENT: &str = "    ";

pub fn generate_contract(model: &ContractModel) -> String {
    let mut emitter = Emitter::new(model);
    emitter.emit_contract();
    emitter.out
}

struct Emitter<'a> {
    model: &'a ContractModel,
    out: String,
    indent: usize,
}

impl<'a> Emitter<'a> {
    fn new(model: &'a ContractModel) -> Self {
        Self {
            model,
            out: String::new(),
            indent: 0,
        }
    }

    fn line(&mut self, s: &str) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
        self.out.push_str(s);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn open_block(&mut self, head: &str) {
        self.line(&format!("{head} {{"));
        self.indent += 1;
    }

    fn close_block(&mut self, tail: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(&format!("}}{tail}"));
    }

    fn emit_contract(&mut self) {
        self.emit_header();
        self.emit_pragmas();
        self.emit_method_codes();
        self.emit_map_keys();
        self.emit_state_variables();
        self.emit_structs();
        self.emit_tx_struct();
        self.emit_main();
        self.emit_method_stubs();
    }

    fn emit_header(&mut self) {
        let info = self.model.contract_info();
        self.line(&format!("#program name {}", info.name));
        if let Some(desc) = info.description.filter(|d| !d.trim().is_empty()) {
            self.line(&format!("#program description {}", desc.trim()));
        }
        self.line(&format!(
            "#program activationAmount {}",
            info.activation_amount
        ));
        self.blank();
    }

    fn emit_pragmas(&mut self) {
        for (key, value) in self.model.pragmas().entries() {
            self.line(&format!("#pragma {key} {value}"));
        }
        self.blank();
    }

    fn emit_method_codes(&mut self) {
        let methods = self.model.methods();
        if methods.is_empty() {
            return;
        }
        self.line("// Magic codes for methods");
        for m in methods {
            self.line(&format!("#define {} {}", method_constant(m), m.code));
        }
        self.blank();
    }

    fn emit_map_keys(&mut self) {
        let defines: Vec<String> = self
            .model
            .maps()
            .iter()
            .filter_map(|map| {
                let value = map.key1.value?;
                Some(format!(
                    "#define {} {value}",
                    map_constant_name(&map.name, &map.key1.name)
                ))
            })
            .collect();
        if defines.is_empty() {
            return;
        }
        self.line("// Map keys");
        for d in &defines {
            self.line(d);
        }
        self.blank();
    }

    fn emit_state_variables(&mut self) {
        let vars: Vec<&VariableDefinition> = self.model.variables().collect();
        if vars.is_empty() {
            return;
        }
        self.line("// State variables");
        for v in vars {
            let mut decl = match v.literal() {
                Some(lit) => format!("{STORAGE_TY} {} = {};", v.name, c_literal(v, lit)),
                None => format!("{STORAGE_TY} {};", v.name),
            };
            if let Some(desc) = v.description.as_deref().map(one_line) {
                if !desc.is_empty() {
                    decl.push_str(&format!(" // {desc}"));
                }
            }
            self.line(&decl);
        }
        self.blank();
    }

    fn emit_structs(&mut self) {
        let structs: Vec<&VariableDefinition> = self.model.structs().collect();
        if structs.is_empty() {
            return;
        }
        self.line("// Structs");
        for s in structs {
            if let Some(desc) = s.description.as_deref().map(one_line) {
                if !desc.is_empty() {
                    self.line(&format!("// {desc}"));
                }
            }
            self.open_block(&format!("struct {}", s.name.to_ascii_uppercase()));
            for field in s.fields() {
                self.line(&format!("{STORAGE_TY} {};", field.name));
            }
            self.close_block(&format!(" {};", s.name));
        }
        self.blank();
    }

    fn emit_tx_struct(&mut self) {
        self.line("// Current transaction");
        self.open_block(&format!("struct {TX_STRUCT_TAG}"));
        self.line(&format!("{STORAGE_TY} txId;"));
        self.line(&format!("{STORAGE_TY} sender;"));
        self.line(&format!("{STORAGE_TY} message[{MESSAGE_WORDS}];"));
        self.close_block(&format!(" {CURRENT_TX};"));
        self.blank();
    }

    fn emit_main(&mut self) {
        self.open_block("void main()");
        self.open_block(&format!(
            "while (({CURRENT_TX}.txId = getNextTx()) != 0)"
        ));
        self.line(&format!(
            "{CURRENT_TX}.sender = getSender({CURRENT_TX}.txId);"
        ));
        self.line(&format!(
            "readMessage({CURRENT_TX}.txId, 0, {CURRENT_TX}.message);"
        ));

        let methods = self.model.methods();
        if !methods.is_empty() {
            self.blank();
            self.open_block(&format!("switch ({CURRENT_TX}.message[0])"));
            for m in methods {
                self.line(&format!("case {}:", method_constant(m)));
                self.indent += 1;
                let args: Vec<String> = (1..=m.args.len())
                    .map(|word| format!("{CURRENT_TX}.message[{word}]"))
                    .collect();
                self.line(&format!("{}({});", m.name, args.join(", ")));
                self.line("break;");
                self.indent -= 1;
            }
            self.close_block("");
        }

        self.close_block("");
        self.close_block("");
    }

    fn emit_method_stubs(&mut self) {
        let methods = self.model.methods();
        if methods.is_empty() {
            return;
        }
        self.blank();
        self.line("// Method stubs");
        for (i, m) in methods.iter().enumerate() {
            if i > 0 {
                self.blank();
            }
            if let Some(desc) = m.description.as_deref() {
                for l in desc.lines().map(str::trim).filter(|l| !l.is_empty()) {
                    self.line(&format!("// {l}"));
                }
            }
            let params: Vec<String> = m
                .args
                .iter()
                .map(|a| format!("{STORAGE_TY} {}", a.name))
                .collect();
            self.open_block(&format!("void {}({})", m.name, params.join(", ")));
            self.line(&format!("// Implement {} here", m.name));
            self.close_block("");
        }
    }
}

pub fn method_constant(m: &MethodDefinition) -> String {
    m.name.to_ascii_uppercase()
}

fn c_literal(v: &VariableDefinition, lit: &str) -> String {
    match v.value_type().map(|ty| ty.scalar) {
        Some(ScalarType::String) => format!("\"{lit}\""),
        _ => lit.to_string(),
    }
}

fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
