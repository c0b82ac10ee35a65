//! A deployed contract: address + ABI + optional client

use std::fmt;
use std::sync::Arc;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256};
use tracing::debug;

use super::abi::ContractAbi;
use super::address::parse_address;
use super::call::{CallKind, ContractCall};
use super::client::{ChainClient, RawLog, Receipt};
use super::event::{ContractEvent, DecodedLog, EventFilter};
use super::pending::ConfirmationPolicy;
use super::BindingError;

/// Untyped handle on a contract at one address
///
/// Generated accessors wrap this and add one typed method per function.
#[derive(Clone)]
pub struct ContractInstance {
    address: Address,
    abi: Arc<ContractAbi>,
    client: Option<Arc<dyn ChainClient>>,
    policy: ConfirmationPolicy,
}

impl fmt::Debug for ContractInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractInstance")
            .field("address", &self.address)
            .field(
                "client",
                &self.client.as_ref().map(|c| c.endpoint_name()),
            )
            .finish()
    }
}

impl ContractInstance {
    pub fn new(address: Address, abi: Arc<ContractAbi>, client: Option<Arc<dyn ChainClient>>) -> Self {
        Self {
            address,
            abi,
            client,
            policy: ConfirmationPolicy::default(),
        }
    }

    /// Bind to `address` without any network interaction
    ///
    /// Only the address syntax is checked; whether code exists there is
    /// discovered by the first call.
    pub fn attach(
        address: &str,
        abi: Arc<ContractAbi>,
        client: Option<Arc<dyn ChainClient>>,
    ) -> Result<Self, BindingError> {
        let address = parse_address(address)?;
        Ok(Self::new(address, abi, client))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &Arc<ContractAbi> {
        &self.abi
    }

    /// Connected client, or [`BindingError::MissingClient`]
    pub fn client(&self) -> Result<&Arc<dyn ChainClient>, BindingError> {
        self.client.as_ref().ok_or(BindingError::MissingClient)
    }

    pub fn policy(&self) -> ConfirmationPolicy {
        self.policy
    }

    pub fn with_policy(mut self, policy: ConfirmationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Same contract and address, different client
    pub fn connect(&self, client: Arc<dyn ChainClient>) -> Self {
        Self {
            client: Some(client),
            ..self.clone()
        }
    }

    /// Prepare a call of the function with canonical `signature`
    pub fn method<R, M: CallKind>(
        &self,
        signature: &'static str,
        args: Vec<DynSolValue>,
        decode: fn(Vec<DynSolValue>) -> Result<R, BindingError>,
    ) -> ContractCall<R, M> {
        ContractCall::new(self.clone(), signature, args, decode)
    }

    /// Filter for event `E`, with `topics` constraining the indexed
    /// parameters in declaration order
    pub fn event_filter<E: ContractEvent>(&self, topics: Vec<Option<B256>>) -> EventFilter<E> {
        EventFilter::new(self.clone(), topics)
    }

    /// Decode every `E` emitted by this contract in `receipt`
    ///
    /// Logs of this contract that do not decode as `E` are skipped; for
    /// anonymous events there is no topic to tell them apart up front.
    pub fn decode_logs<E: ContractEvent>(
        &self,
        receipt: &Receipt,
    ) -> Result<Vec<DecodedLog<E>>, BindingError> {
        let topic0 = self.abi.event_topic(E::SIGNATURE)?;
        let decoded = receipt
            .logs
            .iter()
            .filter(|log| log.address == self.address)
            .filter(|log| match topic0 {
                Some(topic) => log.topics.first() == Some(&topic),
                None => true,
            })
            .filter_map(|log| match self.decode_log::<E>(log) {
                Ok(event) => Some(event),
                Err(e) => {
                    debug!(event = E::SIGNATURE, error = %e, "skipping log");
                    None
                }
            })
            .collect();
        Ok(decoded)
    }

    fn decode_log<E: ContractEvent>(&self, log: &RawLog) -> Result<DecodedLog<E>, BindingError> {
        let parts = self.abi.decode_log(E::SIGNATURE, log)?;
        Ok(DecodedLog {
            event: E::decode_parts(parts.indexed, parts.body)?,
            log: log.clone(),
        })
    }
}
