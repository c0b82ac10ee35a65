//! Parsed, immutable per-contract ABI shared by accessors and factories

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use alloy_dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy_json_abi::{Error as AbiError, Event, Function, JsonAbi, StateMutability};
use alloy_primitives::{Bytes, B256, I256, U256};
use alloy_sol_types::{Panic, Revert, SolError};

use super::client::RawLog;
use super::format::format_value;
use super::{BindingError, ClientError};

#[derive(Debug)]
struct FunctionEntry {
    function: Function,
    inputs: Vec<DynSolType>,
    outputs: Vec<DynSolType>,
}

#[derive(Debug)]
struct EventEntry {
    event: Event,
    /// (type, indexed) in declaration order
    params: Vec<(DynSolType, bool)>,
}

#[derive(Debug)]
struct ErrorEntry {
    error: AbiError,
    inputs: Vec<DynSolType>,
}

/// Event values split the way they were logged
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedParts {
    /// Indexed parameters, from topics. Non-value types stay as their
    /// 32-byte topic hash.
    pub indexed: Vec<DynSolValue>,
    /// Non-indexed parameters, from the log data
    pub body: Vec<DynSolValue>,
}

/// ABI plus deployment bytecode of one contract
#[derive(Debug)]
pub struct ContractAbi {
    abi: JsonAbi,
    bytecode: Option<Bytes>,
    functions: BTreeMap<String, FunctionEntry>,
    events: BTreeMap<String, EventEntry>,
    errors: Vec<ErrorEntry>,
    constructor_inputs: Vec<DynSolType>,
    constructor_payable: bool,
}

fn resolve_all<S: Specifier<DynSolType>>(
    params: &[S],
    owner: &str,
) -> Result<Vec<DynSolType>, BindingError> {
    params
        .iter()
        .map(|p| {
            p.resolve()
                .map_err(|e| BindingError::Abi(format!("{owner}: {e}")))
        })
        .collect()
}

impl ContractAbi {
    /// Parse an ABI JSON array and hex bytecode (`"0x"` for none)
    pub fn parse(abi_json: &str, bytecode: &str) -> Result<Self, BindingError> {
        let abi: JsonAbi =
            serde_json::from_str(abi_json).map_err(|e| BindingError::Abi(e.to_string()))?;

        let hex_body = bytecode.strip_prefix("0x").unwrap_or(bytecode);
        let bytecode = if hex_body.is_empty() {
            None
        } else {
            let raw = hex::decode(hex_body)
                .map_err(|e| BindingError::Abi(format!("invalid bytecode: {e}")))?;
            Some(Bytes::from(raw))
        };

        let mut functions = BTreeMap::new();
        for function in abi.functions() {
            let signature = function.signature();
            let entry = FunctionEntry {
                inputs: resolve_all(&function.inputs, &signature)?,
                outputs: resolve_all(&function.outputs, &signature)?,
                function: function.clone(),
            };
            functions.insert(signature, entry);
        }

        let mut events = BTreeMap::new();
        for event in abi.events() {
            let signature = event.signature();
            let params = event
                .inputs
                .iter()
                .map(|p| {
                    p.resolve()
                        .map(|ty| (ty, p.indexed))
                        .map_err(|e| BindingError::Abi(format!("{signature}: {e}")))
                })
                .collect::<Result<Vec<_>, _>>()?;
            events.insert(
                signature,
                EventEntry {
                    event: event.clone(),
                    params,
                },
            );
        }

        let mut errors = Vec::new();
        for error in abi.errors() {
            errors.push(ErrorEntry {
                inputs: resolve_all(&error.inputs, &error.signature())?,
                error: error.clone(),
            });
        }

        let (constructor_inputs, constructor_payable) = match &abi.constructor {
            Some(ctor) => (
                resolve_all(&ctor.inputs, "constructor")?,
                ctor.state_mutability == StateMutability::Payable,
            ),
            None => (Vec::new(), false),
        };

        Ok(Self {
            abi,
            bytecode,
            functions,
            events,
            errors,
            constructor_inputs,
            constructor_payable,
        })
    }

    /// Parse once into `cell` and hand out shared copies afterwards
    pub fn cached(
        cell: &'static OnceLock<Arc<ContractAbi>>,
        abi_json: &str,
        bytecode: &str,
    ) -> Result<Arc<Self>, BindingError> {
        if let Some(abi) = cell.get() {
            return Ok(abi.clone());
        }
        let parsed = Arc::new(Self::parse(abi_json, bytecode)?);
        Ok(cell.get_or_init(|| parsed).clone())
    }

    pub fn json_abi(&self) -> &JsonAbi {
        &self.abi
    }

    pub fn bytecode(&self) -> Option<&Bytes> {
        self.bytecode.as_ref()
    }

    pub fn is_deployable(&self) -> bool {
        self.bytecode.is_some()
    }

    pub fn constructor_is_payable(&self) -> bool {
        self.constructor_payable
    }

    /// Look up a function by canonical signature, e.g. `owner()`
    pub fn function(&self, signature: &str) -> Result<&Function, BindingError> {
        self.function_entry(signature).map(|e| &e.function)
    }

    /// Look up an event by canonical signature
    pub fn event(&self, signature: &str) -> Result<&Event, BindingError> {
        self.event_entry(signature).map(|e| &e.event)
    }

    fn function_entry(&self, signature: &str) -> Result<&FunctionEntry, BindingError> {
        self.functions
            .get(signature)
            .ok_or_else(|| BindingError::UnknownFunction(signature.to_string()))
    }

    fn event_entry(&self, signature: &str) -> Result<&EventEntry, BindingError> {
        self.events
            .get(signature)
            .ok_or_else(|| BindingError::UnknownEvent(signature.to_string()))
    }

    /// Selector followed by the encoded arguments
    pub fn encode_call(
        &self,
        signature: &str,
        args: Vec<DynSolValue>,
    ) -> Result<Bytes, BindingError> {
        let entry = self.function_entry(signature)?;
        let encoded = encode_params(&entry.inputs, args)?;

        let mut data = entry.function.selector().to_vec();
        data.extend_from_slice(&encoded);
        Ok(Bytes::from(data))
    }

    /// Decode the return data of `signature`
    pub fn decode_output(
        &self,
        signature: &str,
        data: &[u8],
    ) -> Result<Vec<DynSolValue>, BindingError> {
        let entry = self.function_entry(signature)?;
        if entry.outputs.is_empty() {
            return Ok(Vec::new());
        }
        let decoded = DynSolType::Tuple(entry.outputs.clone())
            .abi_decode_params(data)
            .map_err(|e| BindingError::Decode(format!("{signature} output: {e}")))?;
        match decoded {
            DynSolValue::Tuple(values) => Ok(values),
            other => Ok(vec![other]),
        }
    }

    /// Deployment bytecode followed by the encoded constructor arguments
    pub fn encode_deploy(&self, args: Vec<DynSolValue>) -> Result<Bytes, BindingError> {
        let bytecode = self.bytecode.as_ref().ok_or(BindingError::NotDeployable)?;
        let encoded = encode_params(&self.constructor_inputs, args)?;

        let mut data = bytecode.to_vec();
        data.extend_from_slice(&encoded);
        Ok(Bytes::from(data))
    }

    /// Topic0 of a non-anonymous event
    pub fn event_topic(&self, signature: &str) -> Result<Option<B256>, BindingError> {
        let entry = self.event_entry(signature)?;
        Ok((!entry.event.anonymous).then(|| entry.event.selector()))
    }

    /// Decode a log emitted by `signature`
    pub fn decode_log(&self, signature: &str, log: &RawLog) -> Result<DecodedParts, BindingError> {
        let entry = self.event_entry(signature)?;

        let mut topics = log.topics.iter();
        if !entry.event.anonymous {
            let expected = entry.event.selector();
            match topics.next() {
                Some(topic0) if *topic0 == expected => {}
                _ => {
                    return Err(BindingError::Decode(format!(
                        "log is not a {signature} event"
                    )))
                }
            }
        }

        let mut indexed = Vec::new();
        let mut body_types = Vec::new();
        for (ty, is_indexed) in &entry.params {
            if !*is_indexed {
                body_types.push(ty.clone());
                continue;
            }
            let topic = topics.next().ok_or_else(|| {
                BindingError::Decode(format!("{signature}: missing indexed topic"))
            })?;
            let value = if is_word_type(ty) {
                ty.abi_decode(topic.as_slice())
                    .map_err(|e| BindingError::Decode(format!("{signature} topic: {e}")))?
            } else {
                DynSolValue::FixedBytes(*topic, 32)
            };
            indexed.push(value);
        }

        let body = if body_types.is_empty() {
            Vec::new()
        } else {
            match DynSolType::Tuple(body_types)
                .abi_decode_params(&log.data)
                .map_err(|e| BindingError::Decode(format!("{signature} data: {e}")))?
            {
                DynSolValue::Tuple(values) => values,
                other => vec![other],
            }
        };

        Ok(DecodedParts { indexed, body })
    }

    /// Human-readable reason for a revert payload
    ///
    /// Understands `Error(string)`, `Panic(uint256)` and the contract's own
    /// custom errors. Returns `None` for empty or unrecognized data.
    pub fn describe_revert(&self, data: &[u8]) -> Option<String> {
        if data.len() < 4 {
            return None;
        }
        let (selector, payload) = data.split_at(4);

        if selector == Revert::SELECTOR {
            let decoded = DynSolType::Tuple(vec![DynSolType::String])
                .abi_decode_params(payload)
                .ok()?;
            if let DynSolValue::Tuple(mut values) = decoded {
                if let Some(DynSolValue::String(reason)) = values.pop() {
                    return Some(reason);
                }
            }
            return None;
        }

        if selector == Panic::SELECTOR {
            let decoded = DynSolType::Uint(256).abi_decode(payload).ok()?;
            let code = match decoded {
                DynSolValue::Uint(code, _) => code,
                _ => return None,
            };
            return Some(describe_panic(code));
        }

        self.errors.iter().find_map(|entry| {
            if entry.error.selector().as_slice() != selector {
                return None;
            }
            let values = if entry.inputs.is_empty() {
                Vec::new()
            } else {
                match DynSolType::Tuple(entry.inputs.clone())
                    .abi_decode_params(payload)
                    .ok()?
                {
                    DynSolValue::Tuple(values) => values,
                    other => vec![other],
                }
            };
            let args: Vec<String> = values.iter().map(format_value).collect();
            Some(format!("{}({})", entry.error.name, args.join(", ")))
        })
    }
}

impl ContractAbi {
    /// Turn a client failure into a binding error, decoding revert data
    ///
    /// Reverts become [`BindingError::Reverted`]; anything else is wrapped
    /// with `wrap` (submission or query).
    pub fn map_client_error(
        &self,
        err: ClientError,
        wrap: fn(ClientError) -> BindingError,
    ) -> BindingError {
        match err {
            ClientError::Reverted { data, message } => BindingError::Reverted {
                tx_hash: None,
                reason: self
                    .describe_revert(&data)
                    .or_else(|| (!message.is_empty()).then_some(message)),
            },
            other => wrap(other),
        }
    }
}

fn is_word_type(ty: &DynSolType) -> bool {
    matches!(
        ty,
        DynSolType::Bool
            | DynSolType::Int(_)
            | DynSolType::Uint(_)
            | DynSolType::FixedBytes(_)
            | DynSolType::Address
            | DynSolType::Function
    )
}

fn describe_panic(code: U256) -> String {
    let code = u64::try_from(code).unwrap_or(u64::MAX);
    let text = match code {
        0x01 => "assertion failed",
        0x11 => "arithmetic overflow or underflow",
        0x12 => "division or modulo by zero",
        0x21 => "invalid enum value",
        0x22 => "invalid storage byte array encoding",
        0x31 => "pop on empty array",
        0x32 => "array index out of bounds",
        0x41 => "out of memory",
        0x51 => "call to uninitialized function",
        _ => "unknown panic",
    };
    format!("panic 0x{code:02x}: {text}")
}

fn encode_params(types: &[DynSolType], args: Vec<DynSolValue>) -> Result<Vec<u8>, BindingError> {
    if types.len() != args.len() {
        return Err(BindingError::Encode(format!(
            "argument count mismatch: expected {}, got {}",
            types.len(),
            args.len()
        )));
    }
    let values = types
        .iter()
        .zip(args)
        .enumerate()
        .map(|(idx, (ty, value))| {
            coerce(ty, value).map_err(|e| BindingError::Encode(format!("argument {idx}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DynSolValue::Tuple(values).abi_encode_params())
}

/// Check `value` against `ty`, adjusting integer widths to the declared ones
fn coerce(ty: &DynSolType, value: DynSolValue) -> Result<DynSolValue, String> {
    match (ty, value) {
        (DynSolType::Uint(bits), DynSolValue::Uint(v, _)) => {
            if *bits < 256 && v >= (U256::from(1u8) << *bits) {
                return Err(format!("{v} does not fit in uint{bits}"));
            }
            Ok(DynSolValue::Uint(v, *bits))
        }
        (DynSolType::Int(bits), DynSolValue::Int(v, _)) => {
            if *bits < 256 {
                let bound = I256::from_raw(U256::from(1u8) << (*bits - 1));
                if v >= bound || v < -bound {
                    return Err(format!("{v} does not fit in int{bits}"));
                }
            }
            Ok(DynSolValue::Int(v, *bits))
        }
        (DynSolType::Bool, v @ DynSolValue::Bool(_))
        | (DynSolType::Address, v @ DynSolValue::Address(_))
        | (DynSolType::String, v @ DynSolValue::String(_))
        | (DynSolType::Bytes, v @ DynSolValue::Bytes(_)) => Ok(v),
        (DynSolType::FixedBytes(n), DynSolValue::FixedBytes(word, m)) if *n == m => {
            Ok(DynSolValue::FixedBytes(word, m))
        }
        (DynSolType::Array(inner), DynSolValue::Array(values)) => Ok(DynSolValue::Array(
            values
                .into_iter()
                .map(|v| coerce(inner, v))
                .collect::<Result<_, _>>()?,
        )),
        (DynSolType::FixedArray(inner, len), DynSolValue::FixedArray(values)) => {
            if values.len() != *len {
                return Err(format!("expected {len} elements, got {}", values.len()));
            }
            Ok(DynSolValue::FixedArray(
                values
                    .into_iter()
                    .map(|v| coerce(inner, v))
                    .collect::<Result<_, _>>()?,
            ))
        }
        (DynSolType::Tuple(types), DynSolValue::Tuple(values)) => {
            if values.len() != types.len() {
                return Err(format!(
                    "expected tuple of {}, got {}",
                    types.len(),
                    values.len()
                ));
            }
            Ok(DynSolValue::Tuple(
                types
                    .iter()
                    .zip(values)
                    .map(|(t, v)| coerce(t, v))
                    .collect::<Result<_, _>>()?,
            ))
        }
        (ty, value) => Err(format!(
            "expected {}, got {}",
            ty.sol_type_name(),
            value
                .as_type()
                .map(|t| t.sol_type_name().into_owned())
                .unwrap_or_else(|| "unknown".to_string())
        )),
    }
}
