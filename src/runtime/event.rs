//! Typed event filters, queries and subscriptions

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{keccak256, B256};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::client::{LogQuery, RawLog};
use super::instance::ContractInstance;
use super::value::IntoSolValue;
use super::BindingError;

/// Capacity of the channel behind [`EventFilter::watch`]
const WATCH_CHANNEL_CAPACITY: usize = 100;

/// A typed contract event
pub trait ContractEvent: Sized + Send + 'static {
    /// Canonical signature, e.g. `Transfer(address,address,uint256)`
    const SIGNATURE: &'static str;

    /// Build the event from its indexed and non-indexed values, each in
    /// declaration order
    fn decode_parts(
        indexed: Vec<DynSolValue>,
        body: Vec<DynSolValue>,
    ) -> Result<Self, BindingError>;
}

/// A decoded event together with the log it came from
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLog<E> {
    pub event: E,
    pub log: RawLog,
}

/// Topic of an indexed filter value
///
/// Value types are their ABI word; anything else is hashed the way the
/// EVM hashes dynamic indexed values.
pub fn value_topic<T: IntoSolValue>(value: T) -> B256 {
    let value = value.into_sol_value();
    value
        .as_word()
        .unwrap_or_else(|| keccak256(value.abi_encode_packed()))
}

/// Filter over one event of one contract
pub struct EventFilter<E> {
    instance: ContractInstance,
    /// Constraints on indexed parameters (topics 1..)
    topics: Vec<Option<B256>>,
    from_block: Option<u64>,
    to_block: Option<u64>,
    _event: PhantomData<fn() -> E>,
}

impl<E> Clone for EventFilter<E> {
    fn clone(&self) -> Self {
        Self {
            instance: self.instance.clone(),
            topics: self.topics.clone(),
            from_block: self.from_block,
            to_block: self.to_block,
            _event: PhantomData,
        }
    }
}

impl<E> fmt::Debug for EventFilter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFilter")
            .field("address", &self.instance.address())
            .field("topics", &self.topics)
            .field("from_block", &self.from_block)
            .field("to_block", &self.to_block)
            .finish()
    }
}

impl<E: ContractEvent> EventFilter<E> {
    pub(crate) fn new(instance: ContractInstance, topics: Vec<Option<B256>>) -> Self {
        Self {
            instance,
            topics,
            from_block: None,
            to_block: None,
            _event: PhantomData,
        }
    }

    pub fn from_block(mut self, block: u64) -> Self {
        self.from_block = Some(block);
        self
    }

    pub fn to_block(mut self, block: u64) -> Self {
        self.to_block = Some(block);
        self
    }

    /// The node-level log query this filter stands for
    pub fn log_query(&self) -> Result<LogQuery, BindingError> {
        let mut topics = Vec::with_capacity(self.topics.len() + 1);
        if let Some(topic0) = self.instance.abi().event_topic(E::SIGNATURE)? {
            topics.push(Some(topic0));
        }
        topics.extend(self.topics.iter().copied());
        while matches!(topics.last(), Some(None)) {
            topics.pop();
        }

        Ok(LogQuery {
            address: Some(self.instance.address()),
            topics,
            from_block: self.from_block,
            to_block: self.to_block,
        })
    }

    /// Decode one log as this event
    pub fn decode(&self, log: &RawLog) -> Result<DecodedLog<E>, BindingError> {
        let parts = self.instance.abi().decode_log(E::SIGNATURE, log)?;
        Ok(DecodedLog {
            event: E::decode_parts(parts.indexed, parts.body)?,
            log: log.clone(),
        })
    }

    /// Fetch matching historical events
    pub async fn query(&self) -> Result<Vec<DecodedLog<E>>, BindingError> {
        let client = self.instance.client()?;
        let query = self.log_query()?;
        debug!(event = E::SIGNATURE, ?query, "querying logs");
        let logs = client
            .get_logs(&query)
            .await
            .map_err(BindingError::Query)?;
        logs.iter().map(|log| self.decode(log)).collect()
    }

    /// Subscribe to new events
    ///
    /// Open-ended filters use the client's log subscription when it has
    /// one. Otherwise the node is polled every `poll_interval`, starting at
    /// `from_block` if set, else after the current head. Errors are
    /// delivered on the channel and watching continues; the task ends once
    /// `to_block` is passed or the receiver is dropped.
    pub async fn watch(
        &self,
        poll_interval: Duration,
    ) -> Result<mpsc::Receiver<Result<DecodedLog<E>, BindingError>>, BindingError> {
        let client = self.instance.client()?.clone();

        if self.from_block.is_none() && self.to_block.is_none() {
            let subscription = client
                .subscribe_logs(&self.log_query()?)
                .await
                .map_err(BindingError::Query)?;
            if let Some(logs) = subscription {
                return Ok(self.forward(logs));
            }
        }

        let mut next_block = match self.from_block {
            Some(block) => block,
            None => client
                .block_number()
                .await
                .map_err(BindingError::Query)?
                + 1,
        };

        let (tx, rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
        let filter = self.clone();

        tokio::spawn(async move {
            loop {
                if tx.is_closed() {
                    break;
                }
                if let Some(end) = filter.to_block {
                    if next_block > end {
                        break;
                    }
                }

                let head = match client.block_number().await {
                    Ok(head) => head,
                    Err(e) => {
                        warn!(event = E::SIGNATURE, error = %e, "block number poll failed");
                        if tx.send(Err(BindingError::Query(e))).await.is_err() {
                            break;
                        }
                        tokio::time::sleep(poll_interval).await;
                        continue;
                    }
                };

                if head >= next_block {
                    let upto = filter.to_block.map_or(head, |end| end.min(head));
                    let window = filter.clone().from_block(next_block).to_block(upto);
                    match window.query().await {
                        Ok(events) => {
                            for event in events {
                                if tx.send(Ok(event)).await.is_err() {
                                    return;
                                }
                            }
                            next_block = upto + 1;
                        }
                        Err(e) => {
                            if tx.send(Err(e)).await.is_err() {
                                break;
                            }
                        }
                    }
                }

                tokio::time::sleep(poll_interval).await;
            }
            debug!(event = E::SIGNATURE, "event watch stopped");
        });

        Ok(rx)
    }

    /// Decode pushed logs onto a fresh channel
    fn forward(
        &self,
        mut logs: mpsc::Receiver<RawLog>,
    ) -> mpsc::Receiver<Result<DecodedLog<E>, BindingError>> {
        let (tx, rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
        let filter = self.clone();

        tokio::spawn(async move {
            while let Some(log) = logs.recv().await {
                if tx.send(filter.decode(&log)).await.is_err() {
                    break;
                }
            }
            debug!(event = E::SIGNATURE, "event subscription closed");
        });

        rx
    }
}
