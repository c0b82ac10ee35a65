//! ABI type to Rust type mapping

use std::collections::BTreeMap;

use crate::domain::abi::{AbiType, TupleField};

use super::naming::to_pascal_case;

/// A named tuple that becomes a generated struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<TupleField>,
}

/// Rust spelling of an ABI type
pub fn rust_type(ty: &AbiType) -> String {
    match ty {
        AbiType::Uint(bits) => match bits {
            0..=8 => "u8".to_string(),
            9..=16 => "u16".to_string(),
            17..=32 => "u32".to_string(),
            33..=64 => "u64".to_string(),
            65..=128 => "u128".to_string(),
            _ => "U256".to_string(),
        },
        AbiType::Int(bits) => match bits {
            0..=8 => "i8".to_string(),
            9..=16 => "i16".to_string(),
            17..=32 => "i32".to_string(),
            33..=64 => "i64".to_string(),
            65..=128 => "i128".to_string(),
            _ => "I256".to_string(),
        },
        AbiType::Bool => "bool".to_string(),
        AbiType::Address => "Address".to_string(),
        AbiType::FixedBytes(32) => "B256".to_string(),
        AbiType::FixedBytes(size) => format!("FixedBytes<{size}>"),
        AbiType::Bytes => "Bytes".to_string(),
        AbiType::String => "String".to_string(),
        AbiType::Array(inner) => format!("Vec<{}>", rust_type(inner)),
        AbiType::FixedArray(inner, len) => format!("[{}; {len}]", rust_type(inner)),
        AbiType::Tuple {
            struct_name: Some(name),
            ..
        } => to_pascal_case(name),
        AbiType::Tuple {
            fields,
            struct_name: None,
        } => tuple_type(fields.iter().map(|f| rust_type(&f.ty)).collect()),
    }
}

/// Rust tuple spelling; one-element tuples keep their trailing comma
pub fn tuple_type(items: Vec<String>) -> String {
    match items.len() {
        0 => "()".to_string(),
        1 => format!("({},)", items[0]),
        _ => format!("({})", items.join(", ")),
    }
}

/// Rust type of an event parameter: indexed non-value types are only
/// available as their topic hash
pub fn event_field_type(ty: &AbiType, indexed: bool) -> String {
    if indexed && !ty.is_value_type() {
        "B256".to_string()
    } else {
        rust_type(ty)
    }
}

/// Named tuples found in a contract, keyed by generated struct name
#[derive(Debug, Default)]
pub struct StructRegistry {
    structs: BTreeMap<String, StructDef>,
}

/// Two different tuples share a struct name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictingStruct(pub String);

impl StructRegistry {
    /// Record every named tuple reachable from `ty`
    pub fn collect(&mut self, ty: &AbiType) -> Result<(), ConflictingStruct> {
        match ty {
            AbiType::Array(inner) | AbiType::FixedArray(inner, _) => self.collect(inner),
            AbiType::Tuple {
                fields,
                struct_name,
            } => {
                for field in fields {
                    self.collect(&field.ty)?;
                }
                if let Some(name) = struct_name {
                    let name = to_pascal_case(name);
                    let def = StructDef {
                        name: name.clone(),
                        fields: fields.clone(),
                    };
                    match self.structs.get(&name) {
                        Some(existing) if *existing != def => return Err(ConflictingStruct(name)),
                        Some(_) => {}
                        None => {
                            self.structs.insert(name, def);
                        }
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &StructDef> {
        self.structs.values()
    }
}
