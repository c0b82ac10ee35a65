//! Identifier rules for generated code

use std::collections::BTreeSet;

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Methods every generated accessor already has
pub const ACCESSOR_METHODS: &[&str] = &[
    "new",
    "attach",
    "address",
    "instance",
    "connect",
    "from_instance",
];

/// Type and value names a generated module brings into scope
pub const SCOPE_NAMES: &[&str] = &[
    "ABI_JSON",
    "BYTECODE",
    "CONTRACT_ABI",
    "Address",
    "Arc",
    "B256",
    "BindingError",
    "Bytes",
    "ChainClient",
    "ContractAbi",
    "ContractCall",
    "ContractEvent",
    "ContractFactory",
    "ContractInstance",
    "DecodedLog",
    "DynSolValue",
    "Err",
    "EventFilter",
    "FixedBytes",
    "FromSolValue",
    "I256",
    "IntoSolValue",
    "NonPayable",
    "None",
    "Ok",
    "OnceLock",
    "Option",
    "Overrides",
    "Payable",
    "Result",
    "Some",
    "String",
    "TransactionRequest",
    "U256",
    "Vec",
    "View",
];

const UNNAMED_ITEM: &str = "unnamed";
const UNNAMED_TYPE: &str = "Unnamed";

pub fn is_keyword(ident: &str) -> bool {
    RUST_KEYWORDS.contains(&ident)
}

/// `getPaymentToken` -> `get_payment_token`, `IERC721Enumerable` ->
/// `ierc721_enumerable`, `_owner` -> `owner`
pub fn to_snake_case(name: &str) -> String {
    let trimmed = name.trim_start_matches('_');
    let chars: Vec<char> = trimmed.chars().collect();
    let mut out = String::with_capacity(trimmed.len() + 4);

    for (idx, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && idx > 0 {
            let prev = chars[idx - 1];
            let next_is_lower = chars.get(idx + 1).is_some_and(|n| n.is_ascii_lowercase());
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c.to_ascii_lowercase());
        }
    }

    finish_ident(out)
}

/// `order_book` -> `OrderBook`; existing capitals are kept
///
/// Names with no alphanumeric characters (`_`, `$`) become `Unnamed`.
pub fn to_pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for segment in name.split('_').filter(|s| !s.is_empty()) {
        let mut chars = segment.chars().filter(|c| c.is_ascii_alphanumeric());
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }
    if out.is_empty() {
        return UNNAMED_TYPE.to_string();
    }
    finish_ident(out)
}

/// Snake-case item name that is never empty
///
/// Solidity accepts `_` and `$` as identifiers; both map to `unnamed`.
pub fn item_name(name: &str) -> String {
    let ident = to_snake_case(name);
    if ident.is_empty() {
        UNNAMED_ITEM.to_string()
    } else {
        ident
    }
}

fn finish_ident(mut ident: String) -> String {
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if is_keyword(&ident) {
        ident.push('_');
    }
    ident
}

/// Snake-case names for a parameter list
///
/// Empty names and names already taken become `arg{i}`; names in
/// `reserved` get a trailing underscore.
pub fn param_names<'a>(
    names: impl IntoIterator<Item = &'a str>,
    reserved: &[&str],
) -> Vec<String> {
    let mut taken: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::new();

    for (idx, raw) in names.into_iter().enumerate() {
        let mut candidate = to_snake_case(raw);
        if candidate.is_empty() || taken.contains(&candidate) {
            candidate = format!("arg{idx}");
        }
        while reserved.contains(&candidate.as_str()) || taken.contains(&candidate) {
            candidate.push('_');
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }

    out
}

/// Method names for items sorted by signature: the first of each name keeps
/// it, later overloads get `_1`, `_2`, ...
pub fn overload_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<(&str, usize)> = Vec::new();
    let mut out = Vec::new();

    for name in names {
        let base = item_name(name);
        match seen.iter_mut().find(|(n, _)| *n == name) {
            Some((_, count)) => {
                *count += 1;
                out.push(format!("{base}_{count}"));
            }
            None => {
                seen.push((name, 0));
                out.push(base);
            }
        }
    }

    out
}

/// Module file stem for a contract
pub fn module_name(contract: &str) -> String {
    item_name(contract)
}
