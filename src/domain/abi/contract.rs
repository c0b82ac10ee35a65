//! Validated contract interface description

use std::collections::HashMap;

use alloy_json_abi::{EventParam, JsonAbi, Param, StateMutability};
use alloy_primitives::{keccak256, B256};
use serde::Serialize;

use super::types::{AbiType, TypeError};
use super::Bytecode;
use crate::domain::GenerationError;

/// Entry kinds accepted in an ABI document
const KNOWN_ENTRY_KINDS: &[&str] = &["function", "event", "constructor", "error", "fallback", "receive"];

/// Function state mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Mutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl Mutability {
    /// Whether calling the function requires a submitted transaction
    pub fn is_state_mutating(self) -> bool {
        matches!(self, Mutability::NonPayable | Mutability::Payable)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mutability::Pure => "pure",
            Mutability::View => "view",
            Mutability::NonPayable => "nonpayable",
            Mutability::Payable => "payable",
        }
    }
}

impl From<StateMutability> for Mutability {
    fn from(value: StateMutability) -> Self {
        match value {
            StateMutability::Pure => Mutability::Pure,
            StateMutability::View => Mutability::View,
            StateMutability::NonPayable => Mutability::NonPayable,
            StateMutability::Payable => Mutability::Payable,
        }
    }
}

/// A function/constructor/error parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name (may be empty)
    pub name: String,
    pub ty: AbiType,
}

/// An event parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventParamSpec {
    pub name: String,
    pub ty: AbiType,
    /// Indexed parameters are stored in topics and are filterable
    pub indexed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: String,
    /// Canonical signature (e.g. `setPaymentToken(uint8,address)`)
    pub signature: String,
    pub selector: [u8; 4],
    pub inputs: Vec<ParamSpec>,
    pub outputs: Vec<ParamSpec>,
    pub mutability: Mutability,
}

impl FunctionSpec {
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSpec {
    pub name: String,
    pub signature: String,
    /// keccak256 of the signature (topic0 unless anonymous)
    pub topic: B256,
    pub anonymous: bool,
    pub inputs: Vec<EventParamSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorSpec {
    pub inputs: Vec<ParamSpec>,
    pub mutability: Mutability,
}

/// A custom error declared by the contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSpec {
    pub name: String,
    pub signature: String,
    pub selector: [u8; 4],
    pub inputs: Vec<ParamSpec>,
}

/// A fully validated interface description for one contract
#[derive(Debug, Clone)]
pub struct ContractDescription {
    pub name: String,
    /// Functions ordered by signature
    pub functions: Vec<FunctionSpec>,
    /// Events ordered by signature
    pub events: Vec<EventSpec>,
    pub constructor: Option<ConstructorSpec>,
    pub errors: Vec<ErrorSpec>,
    /// Deployment artifact; `None` for interfaces and abstract contracts
    pub bytecode: Option<Bytecode>,
    /// Canonical JSON of the ABI, embedded in generated bindings
    pub abi_json: String,
}

impl ContractDescription {
    /// Validate an ABI document (a JSON array) and optional hex bytecode
    pub fn from_json(
        name: &str,
        abi: &serde_json::Value,
        bytecode: Option<&str>,
    ) -> Result<Self, GenerationError> {
        let malformed = |reason: String| GenerationError::Malformed {
            contract: name.to_string(),
            reason,
        };

        let entries = abi
            .as_array()
            .ok_or_else(|| malformed("ABI must be a JSON array".to_string()))?;
        for (idx, entry) in entries.iter().enumerate() {
            let object = entry
                .as_object()
                .ok_or_else(|| malformed(format!("entry {idx} is not an object")))?;
            // The ABI spec lets `type` default to "function"
            let kind = object.get("type").and_then(|v| v.as_str()).unwrap_or("function");
            if !KNOWN_ENTRY_KINDS.contains(&kind) {
                return Err(malformed(format!("entry {idx} has unknown kind `{kind}`")));
            }
        }

        check_duplicate_entries(name, entries)?;

        let json_abi: JsonAbi =
            serde_json::from_value(abi.clone()).map_err(|e| malformed(e.to_string()))?;

        let functions = describe_functions(name, &json_abi)?;
        let events = describe_events(name, &json_abi)?;
        let errors = describe_errors(name, &json_abi)?;

        let constructor = match json_abi.constructor() {
            Some(ctor) => Some(ConstructorSpec {
                inputs: describe_params(name, "constructor", &ctor.inputs)?,
                mutability: ctor.state_mutability.into(),
            }),
            None => None,
        };

        let bytecode = match bytecode {
            Some(hex) => {
                let code = Bytecode::parse(hex).map_err(|reason| GenerationError::InvalidBytecode {
                    contract: name.to_string(),
                    reason,
                })?;
                (!code.is_empty()).then_some(code)
            }
            None => None,
        };

        let abi_json =
            serde_json::to_string_pretty(&json_abi).map_err(|e| malformed(e.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            functions,
            events,
            constructor,
            errors,
            bytecode,
            abi_json,
        })
    }

    /// Whether a factory can deploy new instances
    pub fn is_deployable(&self) -> bool {
        self.bytecode.is_some()
    }

    pub fn function(&self, signature: &str) -> Option<&FunctionSpec> {
        self.functions.iter().find(|f| f.signature == signature)
    }

    pub fn event(&self, signature: &str) -> Option<&EventSpec> {
        self.events.iter().find(|e| e.signature == signature)
    }
}

/// Reject repeated function or event declarations in the raw document,
/// before any deduplication the JSON model might apply
fn check_duplicate_entries(
    contract: &str,
    entries: &[serde_json::Value],
) -> Result<(), GenerationError> {
    let mut functions: HashMap<[u8; 4], String> = HashMap::new();
    let mut events: Vec<String> = Vec::new();

    for entry in entries {
        let kind = entry.get("type").and_then(|v| v.as_str()).unwrap_or("function");
        if kind != "function" && kind != "event" {
            continue;
        }
        let Some(name) = entry.get("name").and_then(|v| v.as_str()) else {
            continue;
        };
        let location = format!("{kind} `{name}`");
        let inputs = entry.get("inputs").cloned().unwrap_or(serde_json::Value::Array(Vec::new()));

        let types = if kind == "function" {
            let params: Vec<Param> = serde_json::from_value(inputs).map_err(|e| {
                GenerationError::Malformed {
                    contract: contract.to_string(),
                    reason: format!("{location}: {e}"),
                }
            })?;
            describe_params(contract, &location, &params)?
                .iter()
                .map(|p| p.ty.canonical())
                .collect::<Vec<_>>()
        } else {
            let params: Vec<EventParam> = serde_json::from_value(inputs).map_err(|e| {
                GenerationError::Malformed {
                    contract: contract.to_string(),
                    reason: format!("{location}: {e}"),
                }
            })?;
            params
                .iter()
                .enumerate()
                .map(|(idx, p)| describe_event_param(contract, &location, idx, p).map(|p| p.ty.canonical()))
                .collect::<Result<Vec<_>, _>>()?
        };
        let signature = format!("{}({})", name, types.join(","));

        if kind == "function" {
            let selector = selector_of(&signature);
            if let Some(first) = functions.insert(selector, signature.clone()) {
                return Err(GenerationError::DuplicateSelector {
                    contract: contract.to_string(),
                    selector: format!("0x{}", hex::encode(selector)),
                    first,
                    second: signature,
                });
            }
        } else if events.contains(&signature) {
            return Err(GenerationError::DuplicateEvent {
                contract: contract.to_string(),
                signature,
            });
        } else {
            events.push(signature);
        }
    }

    Ok(())
}

fn describe_functions(contract: &str, abi: &JsonAbi) -> Result<Vec<FunctionSpec>, GenerationError> {
    let mut seen: HashMap<[u8; 4], String> = HashMap::new();
    let mut functions = Vec::new();

    for function in abi.functions() {
        let location = format!("function `{}`", function.name);
        let inputs = describe_params(contract, &location, &function.inputs)?;
        let outputs = describe_params(contract, &format!("{location} outputs"), &function.outputs)?;
        let signature = signature_of(&function.name, &inputs);
        let selector = selector_of(&signature);

        if let Some(first) = seen.insert(selector, signature.clone()) {
            return Err(GenerationError::DuplicateSelector {
                contract: contract.to_string(),
                selector: format!("0x{}", hex::encode(selector)),
                first,
                second: signature,
            });
        }

        functions.push(FunctionSpec {
            name: function.name.clone(),
            signature,
            selector,
            inputs,
            outputs,
            mutability: function.state_mutability.into(),
        });
    }

    functions.sort_by(|a, b| a.signature.cmp(&b.signature));
    Ok(functions)
}

fn describe_events(contract: &str, abi: &JsonAbi) -> Result<Vec<EventSpec>, GenerationError> {
    let mut events: Vec<EventSpec> = Vec::new();

    for event in abi.events() {
        let location = format!("event `{}`", event.name);
        let inputs = event
            .inputs
            .iter()
            .enumerate()
            .map(|(idx, param)| describe_event_param(contract, &location, idx, param))
            .collect::<Result<Vec<_>, _>>()?;

        let types: Vec<String> = inputs.iter().map(|p| p.ty.canonical()).collect();
        let signature = format!("{}({})", event.name, types.join(","));

        if events.iter().any(|e| e.signature == signature) {
            return Err(GenerationError::DuplicateEvent {
                contract: contract.to_string(),
                signature,
            });
        }

        events.push(EventSpec {
            name: event.name.clone(),
            topic: keccak256(signature.as_bytes()),
            signature,
            anonymous: event.anonymous,
            inputs,
        });
    }

    events.sort_by(|a, b| a.signature.cmp(&b.signature));
    Ok(events)
}

fn describe_errors(contract: &str, abi: &JsonAbi) -> Result<Vec<ErrorSpec>, GenerationError> {
    let mut errors = Vec::new();
    for error in abi.errors() {
        let inputs = describe_params(contract, &format!("error `{}`", error.name), &error.inputs)?;
        let signature = signature_of(&error.name, &inputs);
        errors.push(ErrorSpec {
            name: error.name.clone(),
            selector: selector_of(&signature),
            signature,
            inputs,
        });
    }
    errors.sort_by(|a, b| a.signature.cmp(&b.signature));
    Ok(errors)
}

fn describe_params(
    contract: &str,
    location: &str,
    params: &[Param],
) -> Result<Vec<ParamSpec>, GenerationError> {
    params
        .iter()
        .enumerate()
        .map(|(idx, param)| {
            let ty = AbiType::from_param(param)
                .map_err(|e| type_error(contract, &format!("{location} parameter {idx}"), e))?;
            Ok(ParamSpec {
                name: param.name.clone(),
                ty,
            })
        })
        .collect()
}

fn describe_event_param(
    contract: &str,
    location: &str,
    idx: usize,
    param: &EventParam,
) -> Result<EventParamSpec, GenerationError> {
    let internal_type = param.internal_type.as_ref().map(|t| t.to_string());
    let ty = AbiType::parse(&param.ty, &param.components, internal_type.as_deref())
        .map_err(|e| type_error(contract, &format!("{location} parameter {idx}"), e))?;
    Ok(EventParamSpec {
        name: param.name.clone(),
        ty,
        indexed: param.indexed,
    })
}

fn type_error(contract: &str, location: &str, err: TypeError) -> GenerationError {
    match err {
        TypeError::Unknown(ty) => GenerationError::UnknownType {
            contract: contract.to_string(),
            location: location.to_string(),
            ty,
        },
        TypeError::Unsupported(reason) => GenerationError::UnsupportedType {
            contract: contract.to_string(),
            location: location.to_string(),
            reason,
        },
    }
}

fn signature_of(name: &str, params: &[ParamSpec]) -> String {
    let types: Vec<String> = params.iter().map(|p| p.ty.canonical()).collect();
    format!("{}({})", name, types.join(","))
}

/// First 4 bytes of keccak256(signature)
pub fn selector_of(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}
