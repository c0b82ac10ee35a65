//! ABI type vocabulary
//!
//! Every parameter type in an interface description must parse into an
//! [`AbiType`]. Anything outside this vocabulary is rejected at generation
//! time so that generated bindings never meet an unknown type at runtime.

use std::fmt;

use alloy_json_abi::Param;

/// Maximum number of components an unnamed tuple may have
/// (the runtime implements value conversions for tuples up to this arity).
pub const MAX_TUPLE_ARITY: usize = 12;

/// A named component of a tuple type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleField {
    /// Component name as written in the ABI (may be empty)
    pub name: String,
    pub ty: AbiType,
}

/// A parsed Solidity ABI type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    Uint(usize),
    Int(usize),
    Bool,
    Address,
    FixedBytes(usize),
    Bytes,
    String,
    Array(Box<AbiType>),
    FixedArray(Box<AbiType>, usize),
    Tuple {
        fields: Vec<TupleField>,
        /// Struct name taken from `internalType` (`struct Lib.Order` -> `Order`)
        struct_name: Option<String>,
    },
}

/// Why a type string was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// Not part of the supported vocabulary
    Unknown(String),
    /// Syntactically valid but cannot be bound
    Unsupported(String),
}

impl AbiType {
    /// Parse a function/constructor/error parameter
    pub fn from_param(param: &Param) -> Result<Self, TypeError> {
        let internal_type = param.internal_type.as_ref().map(|t| t.to_string());
        Self::parse(&param.ty, &param.components, internal_type.as_deref())
    }

    /// Parse a type string, resolving `tuple` against `components`
    pub fn parse(
        ty: &str,
        components: &[Param],
        internal_type: Option<&str>,
    ) -> Result<Self, TypeError> {
        let ty = ty.trim();
        let (base, suffixes) = split_array_suffixes(ty)?;

        let mut parsed = match base {
            "tuple" => {
                if components.is_empty() {
                    return Err(TypeError::Unsupported(format!(
                        "`{ty}` has no components"
                    )));
                }
                let fields = components
                    .iter()
                    .map(|component| {
                        Ok(TupleField {
                            name: component.name.clone(),
                            ty: Self::from_param(component)?,
                        })
                    })
                    .collect::<Result<Vec<_>, TypeError>>()?;
                let struct_name = internal_type.and_then(struct_name_from_internal);
                if struct_name.is_none() && fields.len() > MAX_TUPLE_ARITY {
                    return Err(TypeError::Unsupported(format!(
                        "unnamed tuple with {} components (max {})",
                        fields.len(),
                        MAX_TUPLE_ARITY
                    )));
                }
                AbiType::Tuple {
                    fields,
                    struct_name,
                }
            }
            other => parse_elementary(other)?,
        };

        // Suffixes were collected outermost-first; apply innermost-first.
        for suffix in suffixes.into_iter().rev() {
            parsed = match suffix {
                None => AbiType::Array(Box::new(parsed)),
                Some(len) => AbiType::FixedArray(Box::new(parsed), len),
            };
        }

        Ok(parsed)
    }

    /// Canonical type string as used in selectors (e.g. `(uint8,address)[]`)
    pub fn canonical(&self) -> String {
        match self {
            AbiType::Uint(bits) => format!("uint{bits}"),
            AbiType::Int(bits) => format!("int{bits}"),
            AbiType::Bool => "bool".to_string(),
            AbiType::Address => "address".to_string(),
            AbiType::FixedBytes(size) => format!("bytes{size}"),
            AbiType::Bytes => "bytes".to_string(),
            AbiType::String => "string".to_string(),
            AbiType::Array(inner) => format!("{}[]", inner.canonical()),
            AbiType::FixedArray(inner, len) => format!("{}[{len}]", inner.canonical()),
            AbiType::Tuple { fields, .. } => {
                let inner: Vec<String> = fields.iter().map(|f| f.ty.canonical()).collect();
                format!("({})", inner.join(","))
            }
        }
    }

    /// True for types that fit in a single 32-byte word and are stored
    /// verbatim in event topics when indexed
    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            AbiType::Uint(_)
                | AbiType::Int(_)
                | AbiType::Bool
                | AbiType::Address
                | AbiType::FixedBytes(_)
        )
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

fn parse_elementary(ty: &str) -> Result<AbiType, TypeError> {
    match ty {
        "bool" => return Ok(AbiType::Bool),
        "address" => return Ok(AbiType::Address),
        "string" => return Ok(AbiType::String),
        "bytes" => return Ok(AbiType::Bytes),
        "uint" => return Ok(AbiType::Uint(256)),
        "int" => return Ok(AbiType::Int(256)),
        _ => {}
    }

    if let Some(bits) = ty.strip_prefix("uint") {
        return parse_int_bits(ty, bits).map(AbiType::Uint);
    }
    if let Some(bits) = ty.strip_prefix("int") {
        return parse_int_bits(ty, bits).map(AbiType::Int);
    }
    if let Some(size) = ty.strip_prefix("bytes") {
        let size: usize = parse_number(size).ok_or_else(|| TypeError::Unknown(ty.to_string()))?;
        if (1..=32).contains(&size) {
            return Ok(AbiType::FixedBytes(size));
        }
    }

    Err(TypeError::Unknown(ty.to_string()))
}

fn parse_int_bits(ty: &str, bits: &str) -> Result<usize, TypeError> {
    match parse_number(bits) {
        Some(bits) if bits % 8 == 0 && (8..=256).contains(&bits) => Ok(bits),
        _ => Err(TypeError::Unknown(ty.to_string())),
    }
}

/// Digits only, no sign, no leading zero
fn parse_number(s: &str) -> Option<usize> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) || s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

/// Split `T[2][]` into (`T`, [None, Some(2)]) - suffixes outermost first
fn split_array_suffixes(ty: &str) -> Result<(&str, Vec<Option<usize>>), TypeError> {
    let mut rest = ty;
    let mut suffixes = Vec::new();

    while let Some(stripped) = rest.strip_suffix(']') {
        let open = stripped
            .rfind('[')
            .ok_or_else(|| TypeError::Unknown(ty.to_string()))?;
        let len = &stripped[open + 1..];
        if len.is_empty() {
            suffixes.push(None);
        } else {
            let len = parse_number(len).ok_or_else(|| TypeError::Unknown(ty.to_string()))?;
            suffixes.push(Some(len));
        }
        rest = &stripped[..open];
    }

    if rest.is_empty() {
        return Err(TypeError::Unknown(ty.to_string()));
    }

    Ok((rest, suffixes))
}

/// `struct Lib.Order[]` -> `Order`
fn struct_name_from_internal(internal: &str) -> Option<String> {
    let rest = internal.trim().strip_prefix("struct ")?;
    let rest = rest.split('[').next().unwrap_or(rest);
    let name = rest.rsplit('.').next().unwrap_or(rest).trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
