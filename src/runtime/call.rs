//! Typed, lazily executed contract function calls

use std::fmt;
use std::marker::PhantomData;

use alloy::rpc::types::{TransactionInput, TransactionRequest};
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, TxKind, U256};
use tracing::debug;

use super::instance::ContractInstance;
use super::pending::PendingTransaction;
use super::BindingError;

/// Marker for functions that cannot change state (`view` and `pure`)
#[derive(Debug, Clone, Copy)]
pub struct View;

/// Marker for state-changing functions that reject attached value
#[derive(Debug, Clone, Copy)]
pub struct NonPayable;

/// Marker for state-changing functions that accept attached value
#[derive(Debug, Clone, Copy)]
pub struct Payable;

/// Mutability class of a call
pub trait CallKind: Send + Sync + 'static {
    const STATE_MUTATING: bool;
}

/// Call kinds that are submitted as transactions
pub trait StateMutating: CallKind {}

impl CallKind for View {
    const STATE_MUTATING: bool = false;
}

impl CallKind for NonPayable {
    const STATE_MUTATING: bool = true;
}

impl CallKind for Payable {
    const STATE_MUTATING: bool = true;
}

impl StateMutating for NonPayable {}
impl StateMutating for Payable {}

/// Per-call transaction overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Native value attached to the transaction
    pub value: Option<U256>,
    pub gas_limit: Option<u64>,
    pub nonce: Option<u64>,
}

impl Overrides {
    /// Build a transaction request carrying these overrides
    pub fn to_request(&self, from: Option<Address>, to: TxKind, data: Bytes) -> TransactionRequest {
        TransactionRequest {
            from,
            to: Some(to),
            value: self.value,
            gas: self.gas_limit,
            nonce: self.nonce,
            input: TransactionInput::new(data),
            ..Default::default()
        }
    }

    pub(crate) fn carries_value(&self) -> bool {
        self.value.is_some_and(|v| !v.is_zero())
    }
}

type Decoder<R> = fn(Vec<DynSolValue>) -> Result<R, BindingError>;

/// A contract function call with typed result `R` and mutability `M`
///
/// Nothing touches the network until [`call`](Self::call),
/// [`send`](Self::send) or [`estimate_gas`](Self::estimate_gas) is awaited.
pub struct ContractCall<R, M> {
    instance: ContractInstance,
    signature: &'static str,
    args: Vec<DynSolValue>,
    overrides: Overrides,
    decode: Decoder<R>,
    _kind: PhantomData<fn() -> M>,
}

impl<R, M> Clone for ContractCall<R, M> {
    fn clone(&self) -> Self {
        Self {
            instance: self.instance.clone(),
            signature: self.signature,
            args: self.args.clone(),
            overrides: self.overrides.clone(),
            decode: self.decode,
            _kind: PhantomData,
        }
    }
}

impl<R, M> fmt::Debug for ContractCall<R, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractCall")
            .field("address", &self.instance.address())
            .field("signature", &self.signature)
            .field("args", &self.args)
            .field("overrides", &self.overrides)
            .finish()
    }
}

impl<R, M: CallKind> ContractCall<R, M> {
    pub(crate) fn new(
        instance: ContractInstance,
        signature: &'static str,
        args: Vec<DynSolValue>,
        decode: Decoder<R>,
    ) -> Self {
        Self {
            instance,
            signature,
            args,
            overrides: Overrides::default(),
            decode,
            _kind: PhantomData,
        }
    }

    /// Canonical signature of the called function
    pub fn signature(&self) -> &'static str {
        self.signature
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    pub fn gas_limit(mut self, gas: u64) -> Self {
        self.overrides.gas_limit = Some(gas);
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.overrides.nonce = Some(nonce);
        self
    }

    /// Encoded calldata (selector + arguments)
    pub fn calldata(&self) -> Result<Bytes, BindingError> {
        self.instance
            .abi()
            .encode_call(self.signature, self.args.clone())
    }

    /// Populated transaction request, without submitting it
    pub fn request(&self) -> Result<TransactionRequest, BindingError> {
        let data = self.calldata()?;
        let from = self.instance.client().ok().and_then(|c| c.sender());
        Ok(self
            .overrides
            .to_request(from, TxKind::Call(self.instance.address()), data))
    }

    /// Execute against current chain state without submitting a transaction
    ///
    /// For state-changing functions this is a static call: the result is
    /// what the function would return, nothing is persisted.
    pub async fn call(&self) -> Result<R, BindingError> {
        let client = self.instance.client()?;
        let request = self.request()?;
        debug!(
            address = %self.instance.address(),
            function = self.signature,
            endpoint = %client.endpoint_name(),
            "eth_call"
        );
        let abi = self.instance.abi();
        let output = client
            .call(request)
            .await
            .map_err(|e| abi.map_client_error(e, BindingError::Query))?;
        let values = abi.decode_output(self.signature, &output)?;
        (self.decode)(values)
    }
}

impl<R, M: StateMutating> ContractCall<R, M> {
    /// Sign and submit the call as a transaction
    pub async fn send(&self) -> Result<PendingTransaction, BindingError> {
        let client = self.instance.client()?;
        if client.sender().is_none() {
            return Err(BindingError::MissingSigner);
        }
        let request = self.request()?;
        let abi = self.instance.abi();
        let tx_hash = client
            .send_transaction(request)
            .await
            .map_err(|e| abi.map_client_error(e, BindingError::Submission))?;
        debug!(
            address = %self.instance.address(),
            function = self.signature,
            %tx_hash,
            "transaction submitted"
        );
        Ok(PendingTransaction::new(client.clone(), tx_hash).with_policy(self.instance.policy()))
    }

    pub async fn estimate_gas(&self) -> Result<u64, BindingError> {
        let client = self.instance.client()?;
        let request = self.request()?;
        let abi = self.instance.abi();
        client
            .estimate_gas(request)
            .await
            .map_err(|e| abi.map_client_error(e, BindingError::Query))
    }
}

impl<R> ContractCall<R, Payable> {
    /// Attach native value to the call
    pub fn value(mut self, value: U256) -> Self {
        self.overrides.value = Some(value);
        self
    }
}
