//! Slot assignment for contract state.
//!
//! Slots `0..=maxAuxVars` are reserved for the compiler's auxiliary registers. User state
//! starts right after them and is assigned in declaration order: one slot per scalar
//! variable, one slot per struct field (the struct itself takes none).

use serde::Serialize;

use crate::model::{ContractModel, ValueType, VariableKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutEntry {
    /// Variable name, or `variable.field` for struct fields.
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ValueType,
    pub index: u32,
}

pub fn first_user_slot(model: &ContractModel) -> u32 {
    u32::from(model.pragmas().max_aux_vars) + 1
}

pub fn resolve_layout(model: &ContractModel) -> Vec<LayoutEntry> {
    let mut index = first_user_slot(model);
    let mut layout = Vec::new();
    for var in model.state() {
        match &var.kind {
            VariableKind::Value(ty) => {
                layout.push(LayoutEntry {
                    name: var.name.clone(),
                    ty: *ty,
                    index,
                });
                index += 1;
            }
            VariableKind::Struct(fields) => {
                for field in fields {
                    layout.push(LayoutEntry {
                        name: format!("{}.{}", var.name, field.name),
                        ty: field.ty,
                        index,
                    });
                    index += 1;
                }
            }
        }
    }
    layout
}

pub fn find_slot(layout: &[LayoutEntry], name: &str) -> Option<u32> {
    layout.iter().find(|e| e.name == name).map(|e| e.index)
}
