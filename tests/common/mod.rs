//! In-memory chain that executes the `Resolver` contract
//!
//! Supports calls, gas estimation, submissions with receipts and log
//! queries. Several [`FakeChain`] handles can share one state, each acting
//! as a different account.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use abibind::runtime::{ChainClient, ClientError, LogQuery, RawLog, Receipt};
use alloy::rpc::types::TransactionRequest;
use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{keccak256, Address, Bytes, TxKind, B256};
use alloy_sol_types::{Revert, SolError};
use tokio::sync::mpsc;

pub const NOT_OWNER: &str = "Ownable: caller is not the owner";
pub const ZERO_OWNER: &str = "Ownable: new owner is the zero address";

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn account(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// Type-erased handle for bindings
pub fn client(chain: &Arc<FakeChain>) -> Arc<dyn ChainClient> {
    chain.clone()
}

pub fn ownership_topic() -> B256 {
    keccak256("OwnershipTransferred(address,address)")
}

fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature);
    [hash[0], hash[1], hash[2], hash[3]]
}

#[derive(Debug, Clone, Default)]
struct ResolverState {
    owner: Address,
    tokens: HashMap<u8, Address>,
}

#[derive(Debug, Default)]
struct State {
    block: u64,
    nonce: u64,
    contracts: HashMap<Address, ResolverState>,
    receipts: HashMap<B256, Receipt>,
    logs: Vec<RawLog>,
    submitted: Vec<TransactionRequest>,
    withhold_receipts: bool,
    fail_queries: bool,
    /// `None` when the chain only supports polling
    subscribers: Option<Vec<(LogQuery, mpsc::Sender<RawLog>)>>,
}

/// Outcome of executing one message
struct Execution {
    output: Bytes,
    logs: Vec<(Address, Vec<B256>)>,
}

pub struct FakeChain {
    sender: Option<Address>,
    state: Arc<Mutex<State>>,
}

impl FakeChain {
    /// A fresh chain with `sender` as the signing account
    pub fn new(sender: Option<Address>) -> Arc<Self> {
        Arc::new(Self {
            sender,
            state: Arc::new(Mutex::new(State::default())),
        })
    }

    /// A fresh chain that also pushes logs to subscribers
    pub fn with_pubsub(sender: Option<Address>) -> Arc<Self> {
        let chain = Self::new(sender);
        chain.state.lock().unwrap().subscribers = Some(Vec::new());
        chain
    }

    /// Another handle on the same chain, signing as `sender`
    pub fn as_account(&self, sender: Option<Address>) -> Arc<Self> {
        Arc::new(Self {
            sender,
            state: self.state.clone(),
        })
    }

    pub fn mine_empty_block(&self) {
        self.state.lock().unwrap().block += 1;
    }

    /// Keep accepting transactions but never report receipts
    pub fn withhold_receipts(&self, withhold: bool) {
        self.state.lock().unwrap().withhold_receipts = withhold;
    }

    /// Make block number and log queries fail with a transport error
    pub fn fail_queries(&self, fail: bool) {
        self.state.lock().unwrap().fail_queries = fail;
    }

    pub fn submitted(&self) -> Vec<TransactionRequest> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn has_code(&self, address: Address) -> bool {
        self.state.lock().unwrap().contracts.contains_key(&address)
    }

    fn input(request: &TransactionRequest) -> Bytes {
        request.input.input().cloned().unwrap_or_default()
    }

    fn revert(reason: &str) -> ClientError {
        ClientError::Reverted {
            data: Revert {
                reason: reason.to_string(),
            }
            .abi_encode()
            .into(),
            message: format!("execution reverted: {reason}"),
        }
    }
}

/// Run `input` against `contract` as `from`; mutates `contract`
fn execute(
    address: Address,
    contract: &mut ResolverState,
    from: Address,
    input: &[u8],
) -> Result<Execution, ClientError> {
    if input.len() < 4 {
        return Err(ClientError::Reverted {
            data: Bytes::new(),
            message: "execution reverted".to_string(),
        });
    }
    let (sel, args) = input.split_at(4);
    let decode = |types: Vec<DynSolType>| -> Result<Vec<DynSolValue>, ClientError> {
        match DynSolType::Tuple(types).abi_decode_params(args) {
            Ok(DynSolValue::Tuple(values)) => Ok(values),
            _ => Err(ClientError::Reverted {
                data: Bytes::new(),
                message: "execution reverted".to_string(),
            }),
        }
    };
    let transferred = |previous: Address, new: Address| {
        (
            address,
            vec![ownership_topic(), previous.into_word(), new.into_word()],
        )
    };
    let done = |output: Vec<u8>, logs| Execution {
        output: output.into(),
        logs,
    };

    if sel == selector("owner()") {
        return Ok(done(DynSolValue::Address(contract.owner).abi_encode(), vec![]));
    }
    if sel == selector("getPaymentToken(uint8)") {
        let values = decode(vec![DynSolType::Uint(8)])?;
        let token = values[0].as_uint().map(|(v, _)| v.to::<u8>()).unwrap_or(0);
        let addr = contract.tokens.get(&token).copied().unwrap_or_default();
        return Ok(done(DynSolValue::Address(addr).abi_encode(), vec![]));
    }

    let only_owner = |contract: &ResolverState| {
        if contract.owner != from {
            Err(FakeChain::revert(NOT_OWNER))
        } else {
            Ok(())
        }
    };

    if sel == selector("setPaymentToken(uint8,address)") {
        only_owner(&*contract)?;
        let values = decode(vec![DynSolType::Uint(8), DynSolType::Address])?;
        let token = values[0].as_uint().map(|(v, _)| v.to::<u8>()).unwrap_or(0);
        let addr = values[1].as_address().unwrap_or_default();
        contract.tokens.insert(token, addr);
        return Ok(done(Vec::new(), vec![]));
    }
    if sel == selector("renounceOwnership()") {
        only_owner(&*contract)?;
        let previous = contract.owner;
        contract.owner = Address::ZERO;
        return Ok(done(Vec::new(), vec![transferred(previous, Address::ZERO)]));
    }
    if sel == selector("transferOwnership(address)") {
        only_owner(&*contract)?;
        let values = decode(vec![DynSolType::Address])?;
        let new_owner = values[0].as_address().unwrap_or_default();
        if new_owner.is_zero() {
            return Err(FakeChain::revert(ZERO_OWNER));
        }
        let previous = contract.owner;
        contract.owner = new_owner;
        return Ok(done(Vec::new(), vec![transferred(previous, new_owner)]));
    }

    Err(ClientError::Reverted {
        data: Bytes::new(),
        message: "execution reverted".to_string(),
    })
}

impl State {
    /// Run a message without persisting anything
    fn dry_run(&self, request: &TransactionRequest) -> Result<Execution, ClientError> {
        let from = request.from.unwrap_or_default();
        match request.to {
            Some(TxKind::Call(to)) => match self.contracts.get(&to) {
                Some(contract) => {
                    let mut scratch = contract.clone();
                    execute(to, &mut scratch, from, &FakeChain::input(request))
                }
                // No code: calls succeed with empty output
                None => Ok(Execution {
                    output: Bytes::new(),
                    logs: Vec::new(),
                }),
            },
            _ => Ok(Execution {
                output: Bytes::new(),
                logs: Vec::new(),
            }),
        }
    }
}

#[async_trait::async_trait]
impl ChainClient for FakeChain {
    fn sender(&self) -> Option<Address> {
        self.sender
    }

    async fn block_number(&self) -> Result<u64, ClientError> {
        let state = self.state.lock().unwrap();
        if state.fail_queries {
            return Err(ClientError::Transport("connection refused".to_string()));
        }
        Ok(state.block)
    }

    async fn call(&self, request: TransactionRequest) -> Result<Bytes, ClientError> {
        let state = self.state.lock().unwrap();
        state.dry_run(&request).map(|exec| exec.output)
    }

    async fn estimate_gas(&self, request: TransactionRequest) -> Result<u64, ClientError> {
        let state = self.state.lock().unwrap();
        state.dry_run(&request)?;
        Ok(21_000 + 16 * FakeChain::input(&request).len() as u64)
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<B256, ClientError> {
        let Some(sender) = self.sender else {
            return Err(ClientError::Rejected {
                code: -32000,
                message: "unknown account".to_string(),
            });
        };
        if request.from != Some(sender) {
            return Err(ClientError::Rejected {
                code: -32000,
                message: "from does not match the signing account".to_string(),
            });
        }

        let mut state = self.state.lock().unwrap();
        // Without an explicit gas limit the node estimates first, so
        // failing executions are refused at submission
        if request.gas.is_none() {
            state.dry_run(&request)?;
        }

        state.submitted.push(request.clone());
        state.nonce += 1;
        state.block += 1;
        let nonce = state.nonce;
        let block = state.block;
        let tx_hash = keccak256([sender.as_slice(), &nonce.to_be_bytes()].concat());

        let (status, contract_address, emitted) = match request.to {
            Some(TxKind::Call(to)) => match state.contracts.get_mut(&to) {
                Some(contract) => {
                    match execute(to, contract, sender, &FakeChain::input(&request)) {
                        Ok(exec) => (true, None, exec.logs),
                        Err(_) => (false, None, Vec::new()),
                    }
                }
                None => (true, None, Vec::new()),
            },
            _ => {
                let address = sender.create(nonce);
                state.contracts.insert(
                    address,
                    ResolverState {
                        owner: sender,
                        tokens: HashMap::new(),
                    },
                );
                let log = (
                    address,
                    vec![
                        ownership_topic(),
                        Address::ZERO.into_word(),
                        sender.into_word(),
                    ],
                );
                (true, Some(address), vec![log])
            }
        };

        let logs: Vec<RawLog> = emitted
            .into_iter()
            .enumerate()
            .map(|(idx, (address, topics))| RawLog {
                address,
                topics,
                data: Bytes::new(),
                block_number: Some(block),
                tx_hash: Some(tx_hash),
                log_index: Some(idx as u64),
            })
            .collect();
        state.logs.extend(logs.iter().cloned());
        if let Some(subscribers) = state.subscribers.as_mut() {
            subscribers.retain(|(_, tx)| !tx.is_closed());
            for log in &logs {
                for (query, tx) in subscribers.iter() {
                    if query.matches(log) {
                        let _ = tx.try_send(log.clone());
                    }
                }
            }
        }
        state.receipts.insert(
            tx_hash,
            Receipt {
                tx_hash,
                block_number: Some(block),
                contract_address,
                status,
                gas_used: 50_000,
                logs,
            },
        );
        Ok(tx_hash)
    }

    async fn get_receipt(&self, tx_hash: B256) -> Result<Option<Receipt>, ClientError> {
        let state = self.state.lock().unwrap();
        if state.withhold_receipts {
            return Ok(None);
        }
        Ok(state.receipts.get(&tx_hash).cloned())
    }

    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<RawLog>, ClientError> {
        let state = self.state.lock().unwrap();
        if state.fail_queries {
            return Err(ClientError::Transport("connection refused".to_string()));
        }
        Ok(state
            .logs
            .iter()
            .filter(|log| query.matches(log))
            .cloned()
            .collect())
    }

    async fn subscribe_logs(
        &self,
        query: &LogQuery,
    ) -> Result<Option<mpsc::Receiver<RawLog>>, ClientError> {
        let mut state = self.state.lock().unwrap();
        let Some(subscribers) = state.subscribers.as_mut() else {
            return Ok(None);
        };
        let (tx, rx) = mpsc::channel(16);
        subscribers.push((query.clone(), tx));
        Ok(Some(rx))
    }

    fn endpoint_name(&self) -> String {
        "fake".to_string()
    }
}
