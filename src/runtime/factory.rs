//! Deploying and binding contracts

use std::fmt;
use std::sync::Arc;

use alloy::rpc::types::TransactionRequest;
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::TxKind;
use tracing::{debug, info};

use super::abi::ContractAbi;
use super::call::Overrides;
use super::client::ChainClient;
use super::instance::ContractInstance;
use super::pending::{ConfirmationPolicy, PendingTransaction};
use super::BindingError;

/// Deploy/attach/connect over one contract's ABI and bytecode
#[derive(Clone)]
pub struct ContractFactory {
    abi: Arc<ContractAbi>,
    client: Option<Arc<dyn ChainClient>>,
    policy: ConfirmationPolicy,
}

impl fmt::Debug for ContractFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractFactory")
            .field("deployable", &self.abi.is_deployable())
            .field(
                "client",
                &self.client.as_ref().map(|c| c.endpoint_name()),
            )
            .finish()
    }
}

impl ContractFactory {
    pub fn new(abi: Arc<ContractAbi>, client: Option<Arc<dyn ChainClient>>) -> Self {
        Self {
            abi,
            client,
            policy: ConfirmationPolicy::default(),
        }
    }

    pub fn abi(&self) -> &Arc<ContractAbi> {
        &self.abi
    }

    pub fn client(&self) -> Option<&Arc<dyn ChainClient>> {
        self.client.as_ref()
    }

    pub fn with_policy(mut self, policy: ConfirmationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Same contract, different client
    pub fn connect(&self, client: Arc<dyn ChainClient>) -> Self {
        Self {
            client: Some(client),
            ..self.clone()
        }
    }

    /// Bind to an existing deployment; no network interaction
    pub fn attach(&self, address: &str) -> Result<ContractInstance, BindingError> {
        Ok(ContractInstance::attach(address, self.abi.clone(), self.client.clone())?
            .with_policy(self.policy))
    }

    /// Bind to an existing deployment with the given client
    ///
    /// There is no factory here, so the instance starts with the default
    /// [`ConfirmationPolicy`]; use [`ContractFactory::attach`] on a
    /// configured factory to keep its policy.
    pub fn connect_at(
        abi: Arc<ContractAbi>,
        address: &str,
        client: Arc<dyn ChainClient>,
    ) -> Result<ContractInstance, BindingError> {
        ContractInstance::attach(address, abi, Some(client))
    }

    /// Build the creation transaction without submitting it
    pub fn deploy_transaction(
        &self,
        args: Vec<DynSolValue>,
        overrides: &Overrides,
    ) -> Result<TransactionRequest, BindingError> {
        if !self.abi.is_deployable() {
            return Err(BindingError::NotDeployable);
        }
        if overrides.carries_value() && !self.abi.constructor_is_payable() {
            return Err(BindingError::ValueNotAccepted);
        }
        let data = self.abi.encode_deploy(args)?;
        let from = self.client.as_ref().and_then(|c| c.sender());
        Ok(overrides.to_request(from, TxKind::Create, data))
    }

    /// Submit the creation transaction and wait for the new address
    pub async fn deploy(
        &self,
        args: Vec<DynSolValue>,
        overrides: Overrides,
    ) -> Result<ContractInstance, BindingError> {
        let client = self.client.as_ref().ok_or(BindingError::MissingClient)?;
        if client.sender().is_none() {
            return Err(BindingError::MissingSigner);
        }
        let request = self.deploy_transaction(args, &overrides)?;

        let tx_hash = client
            .send_transaction(request)
            .await
            .map_err(|e| self.abi.map_client_error(e, BindingError::Submission))?;
        debug!(%tx_hash, endpoint = %client.endpoint_name(), "deployment submitted");

        let receipt = PendingTransaction::new(client.clone(), tx_hash)
            .with_policy(self.policy)
            .confirm()
            .await?;
        let address = receipt
            .contract_address
            .ok_or_else(|| BindingError::Confirmation {
                tx_hash,
                reason: "receipt carries no contract address".to_string(),
            })?;
        info!(%address, %tx_hash, "contract deployed");

        Ok(ContractInstance::new(address, self.abi.clone(), Some(client.clone()))
            .with_policy(self.policy))
    }
}
