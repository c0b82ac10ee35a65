//! Human-readable rendering of ABI values for error messages

use alloy_dyn_abi::DynSolValue;

const MAX_ITEMS: usize = 10;
const MAX_BYTES: usize = 32;
const MAX_CHARS: usize = 64;

/// Format a DynSolValue for display
pub fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => {
            let s = u.to_string();
            // very large numbers read better as hex
            if s.len() > 20 {
                format!("0x{:x}", u)
            } else {
                s
            }
        }
        DynSolValue::FixedBytes(word, size) => {
            let bytes = &word.as_slice()[..(*size).min(32)];
            format!("0x{}", hex::encode(bytes))
        }
        DynSolValue::Address(addr) => addr.to_checksum(None),
        DynSolValue::Function(func) => format!("0x{}", hex::encode(func.as_slice())),
        DynSolValue::Bytes(bytes) => {
            if bytes.len() <= MAX_BYTES {
                format!("0x{}", hex::encode(bytes))
            } else {
                format!(
                    "0x{}… ({} bytes)",
                    hex::encode(&bytes[..MAX_BYTES]),
                    bytes.len()
                )
            }
        }
        DynSolValue::String(s) => {
            let count = s.chars().count();
            if count <= MAX_CHARS {
                format!("\"{}\"", s)
            } else {
                let head: String = s.chars().take(MAX_CHARS).collect();
                format!("\"{}…\" ({} chars)", head, count)
            }
        }
        DynSolValue::Array(arr) | DynSolValue::FixedArray(arr) => {
            let items: Vec<String> = arr.iter().take(MAX_ITEMS).map(format_value).collect();
            if arr.len() > MAX_ITEMS {
                format!("[{}, …] ({} items)", items.join(", "), arr.len())
            } else {
                format!("[{}]", items.join(", "))
            }
        }
        DynSolValue::Tuple(fields) => {
            let items: Vec<String> = fields.iter().map(format_value).collect();
            format!("({})", items.join(", "))
        }
    }
}
