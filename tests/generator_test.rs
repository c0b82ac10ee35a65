//! Binding generation from ABI documents and artifacts

mod common;

use std::fs;

use abibind::codegen::{BindingGenerator, GeneratorOptions, INDEX_FILE};
use abibind::domain::abi::ContractDescription;
use abibind::domain::GenerationError;
use abibind::infrastructure::AbiScanner;
use serde_json::{json, Value};

fn resolver() -> ContractDescription {
    AbiScanner::load_file(&common::fixture("Resolver.json"))
        .unwrap()
        .expect("fixture has an ABI")
        .describe()
        .unwrap()
}

fn describe(name: &str, abi: Value, bytecode: Option<&str>) -> ContractDescription {
    ContractDescription::from_json(name, &abi, bytecode).unwrap()
}

fn generate(desc: &ContractDescription) -> Result<String, GenerationError> {
    BindingGenerator::new(GeneratorOptions::default())
        .generate(desc)
        .map(|g| g.source)
}

/// Everything from the given marker line on
fn from_line<'a>(source: &'a str, marker: &str) -> &'a str {
    let start = source.find(marker).expect("marker present");
    &source[start..]
}

#[test]
fn test_resolver_matches_checked_in_bindings() {
    let bindings = BindingGenerator::new(GeneratorOptions::default())
        .generate_all(&[resolver()])
        .unwrap();
    let contract = &bindings.contracts[0];
    assert_eq!(contract.module, "resolver");
    assert_eq!(contract.file_name(), "resolver.rs");
    assert_eq!(contract.accessor, "Resolver");
    assert_eq!(contract.factory, "ResolverFactory");

    let checked_in = include_str!("bindings/resolver.rs");
    let (head, _) = contract.source.split_once("pub const ABI_JSON").unwrap();
    let (expected_head, _) = checked_in.split_once("pub const ABI_JSON").unwrap();
    assert_eq!(head, expected_head);
    assert_eq!(
        from_line(&contract.source, "/// Deployment bytecode"),
        from_line(checked_in, "/// Deployment bytecode")
    );

    assert_eq!(bindings.index, include_str!("bindings/mod.rs"));
}

#[test]
fn test_embedded_abi_round_trips() {
    let desc = resolver();
    let source = generate(&desc).unwrap();
    let start = source.find("r#\"").unwrap() + 3;
    let end = source.find("\"#;").unwrap();
    let embedded: Value = serde_json::from_str(&source[start..end]).unwrap();
    assert_eq!(embedded.as_array().unwrap().len(), 6);
    assert_eq!(source[start..end], desc.abi_json);
}

#[test]
fn test_interface_has_no_deploy() {
    let desc = describe(
        "IERC20",
        json!([{
            "type": "function",
            "name": "balanceOf",
            "inputs": [{ "name": "account", "type": "address" }],
            "outputs": [{ "name": "", "type": "uint256" }],
            "stateMutability": "view"
        }]),
        None,
    );
    let source = generate(&desc).unwrap();

    assert!(source.contains("pub struct IERC20Factory {"));
    assert!(source.contains("pub const BYTECODE: &str = \"0x\";"));
    assert!(source.contains("cannot be deployed"));
    assert!(!source.contains("pub async fn deploy"));
    assert!(!source.contains("pub fn deploy_transaction"));
    assert!(source.contains("pub fn connect_at("));
    assert!(source.contains("-> ContractCall<U256, View> {"));
}

#[test]
fn test_constructor_arguments_and_payable_functions() {
    let desc = describe(
        "Vault",
        json!([
            {
                "type": "constructor",
                "inputs": [
                    { "name": "_token", "type": "address" },
                    { "name": "overrides", "type": "uint64" }
                ],
                "stateMutability": "payable"
            },
            {
                "type": "function",
                "name": "deposit",
                "inputs": [],
                "outputs": [],
                "stateMutability": "payable"
            }
        ]),
        Some("0x6080604052"),
    );
    let source = generate(&desc).unwrap();

    assert!(source.contains(
        "pub async fn deploy(&self, token: Address, overrides_: u64) -> Result<Vault, BindingError> {"
    ));
    assert!(source.contains("self.deploy_with(token, overrides_, Overrides::default()).await"));
    assert!(source.contains("self.inner.deploy(vec![token.into_sol_value(), overrides_.into_sol_value()], overrides).await?;"));
    assert!(source.contains("pub fn deposit(&self) -> ContractCall<(), Payable> {"));
}

#[test]
fn test_overloads_and_reserved_names() {
    let desc = describe(
        "Token",
        json!([
            {
                "type": "function",
                "name": "transfer",
                "inputs": [
                    { "name": "to", "type": "address" },
                    { "name": "amount", "type": "uint256" }
                ],
                "outputs": [{ "name": "", "type": "bool" }],
                "stateMutability": "nonpayable"
            },
            {
                "type": "function",
                "name": "transfer",
                "inputs": [
                    { "name": "to", "type": "address" },
                    { "name": "amount", "type": "uint256" },
                    { "name": "data", "type": "bytes" }
                ],
                "outputs": [{ "name": "", "type": "bool" }],
                "stateMutability": "nonpayable"
            },
            {
                "type": "function",
                "name": "connect",
                "inputs": [{ "name": "type", "type": "uint8" }],
                "outputs": [],
                "stateMutability": "nonpayable"
            }
        ]),
        None,
    );
    let source = generate(&desc).unwrap();

    assert!(source.contains(
        "pub fn transfer(&self, to: Address, amount: U256) -> ContractCall<bool, NonPayable> {"
    ));
    assert!(source.contains("    pub fn transfer_1(\n"));
    assert!(source.contains("        data: Bytes,\n"));
    assert!(source.contains("pub fn connect_call(&self, type_: u8) -> ContractCall<(), NonPayable> {"));
    assert!(source.contains("\"transfer(address,uint256,bytes)\","));
}

#[test]
fn test_structs_tuples_and_arrays() {
    let desc = describe(
        "Market",
        json!([
            {
                "type": "function",
                "name": "getOrder",
                "inputs": [{ "name": "id", "type": "uint256" }],
                "outputs": [{
                    "name": "",
                    "type": "tuple",
                    "internalType": "struct Market.Order",
                    "components": [
                        { "name": "maker", "type": "address" },
                        { "name": "amounts", "type": "uint128[2]" },
                        { "name": "tags", "type": "bytes32[]" }
                    ]
                }],
                "stateMutability": "view"
            },
            {
                "type": "function",
                "name": "stats",
                "inputs": [],
                "outputs": [
                    { "name": "count", "type": "uint32" },
                    { "name": "volume", "type": "int256" }
                ],
                "stateMutability": "view"
            }
        ]),
        None,
    );
    let source = generate(&desc).unwrap();

    assert!(source.contains("pub struct Order {"));
    assert!(source.contains("    pub maker: Address,"));
    assert!(source.contains("    pub amounts: [u128; 2],"));
    assert!(source.contains("    pub tags: Vec<B256>,"));
    assert!(source.contains("impl FromSolValue for Order {"));
    assert!(source.contains("-> ContractCall<Order, View> {"));
    assert!(source.contains("-> ContractCall<(u32, I256), View> {"));
    assert!(source.contains("decode_tuple::<(u32, I256)>,"));
}

#[test]
fn test_indexed_dynamic_event_fields_are_hashes() {
    let desc = describe(
        "Registry",
        json!([{
            "type": "event",
            "name": "Registered",
            "inputs": [
                { "name": "name", "type": "string", "indexed": true },
                { "name": "owner", "type": "address", "indexed": true },
                { "name": "note", "type": "string", "indexed": false }
            ],
            "anonymous": false
        }]),
        None,
    );
    let source = generate(&desc).unwrap();

    assert!(source.contains("pub struct RegisteredEvent {"));
    assert!(source.contains("    pub name: B256,"));
    assert!(source.contains("    pub owner: Address,"));
    assert!(source.contains("    pub note: String,"));
    assert!(source.contains("        name: Option<B256>,"));
    assert!(source.contains("pub fn registered_filter("));
    assert!(source.contains("            note: next_value(&mut body)?,"));
}

#[test]
fn test_name_collision_is_rejected() {
    let desc = describe(
        "Clash",
        json!([
            {
                "type": "function",
                "name": "setValue",
                "inputs": [],
                "outputs": [],
                "stateMutability": "nonpayable"
            },
            {
                "type": "function",
                "name": "set_value",
                "inputs": [{ "name": "x", "type": "uint8" }],
                "outputs": [],
                "stateMutability": "nonpayable"
            }
        ]),
        None,
    );
    let err = generate(&desc).unwrap_err();
    assert!(matches!(err, GenerationError::NameCollision { .. }));
}

#[test]
fn test_too_many_return_values() {
    let outputs: Vec<Value> = (0..13)
        .map(|i| json!({ "name": format!("v{i}"), "type": "uint8" }))
        .collect();
    let desc = describe(
        "Wide",
        json!([{
            "type": "function",
            "name": "all",
            "inputs": [],
            "outputs": outputs,
            "stateMutability": "view"
        }]),
        None,
    );
    let err = generate(&desc).unwrap_err();
    assert!(matches!(err, GenerationError::UnsupportedType { .. }));
}

#[test]
fn test_duplicate_contracts_fail_the_whole_set() {
    let generator = BindingGenerator::new(GeneratorOptions::default());
    let err = generator.generate_all(&[resolver(), resolver()]).unwrap_err();
    assert!(matches!(err, GenerationError::DuplicateContract { .. }));
}

#[test]
fn test_exported_names_must_be_unique_across_contracts() {
    let vault = describe("Vault", json!([]), None);
    let vault_factory = describe("VaultFactory", json!([]), None);

    let err = BindingGenerator::new(GeneratorOptions::default())
        .generate_all(&[vault_factory, vault])
        .unwrap_err();
    match err {
        GenerationError::NameCollision { contract, name } => {
            assert_eq!(contract, "VaultFactory");
            assert_eq!(name, "VaultFactory");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_symbol_only_names_get_identifiers() {
    let desc = describe(
        "Odd",
        json!([
            {
                "type": "function",
                "name": "_",
                "inputs": [{ "name": "_", "type": "uint8" }],
                "outputs": [],
                "stateMutability": "view"
            },
            {
                "type": "event",
                "name": "$",
                "inputs": [{ "name": "who", "type": "address", "indexed": true }],
                "anonymous": false
            }
        ]),
        None,
    );
    let source = generate(&desc).unwrap();

    assert!(source.contains("pub fn unnamed(&self, arg0: u8) -> ContractCall<(), View> {"));
    assert!(source.contains("pub struct UnnamedEvent {"));
    assert!(source.contains("pub fn unnamed_filter("));
    assert!(!source.contains("pub fn ("));
}

#[test]
fn test_custom_runtime_crate() {
    let generator = BindingGenerator::new(GeneratorOptions {
        runtime_crate: "crate".to_string(),
    });
    let source = generator.generate(&resolver()).unwrap().source;
    assert!(source.contains("use crate::runtime::prelude::*;"));
}

#[test]
fn test_generation_is_deterministic() {
    let a = generate(&resolver()).unwrap();
    let b = generate(&resolver()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_write_then_check() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("bindings");
    let bindings = BindingGenerator::new(GeneratorOptions::default())
        .generate_all(&[resolver()])
        .unwrap();

    let stale = bindings.check(&out).unwrap();
    assert_eq!(stale.len(), 2);

    // Files outside the generated set are left alone
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("keep.rs"), "// mine").unwrap();

    let written = bindings.write_to(&out).unwrap();
    assert_eq!(written.len(), 2);
    assert!(out.join("resolver.rs").is_file());
    assert!(out.join(INDEX_FILE).is_file());
    assert_eq!(fs::read_to_string(out.join("keep.rs")).unwrap(), "// mine");
    assert!(bindings.check(&out).unwrap().is_empty());

    let leftovers: Vec<_> = fs::read_dir(&out)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());

    fs::write(out.join("resolver.rs"), "// edited").unwrap();
    assert_eq!(bindings.check(&out).unwrap(), vec![out.join("resolver.rs")]);
}
