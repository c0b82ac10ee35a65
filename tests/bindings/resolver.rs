//! Autogenerated by abibind. Do not edit manually.
//!
//! Bindings for the `Resolver` contract.
#![allow(clippy::all, dead_code, unused_imports, unused_mut, unused_variables)]

use std::sync::{Arc, OnceLock};

use abibind::runtime::prelude::*;

/// Contract ABI as JSON
pub const ABI_JSON: &str = r#"[
  {
    "type": "function",
    "name": "getPaymentToken",
    "inputs": [
      {
        "name": "_pt",
        "type": "uint8",
        "internalType": "uint8"
      }
    ],
    "outputs": [
      {
        "name": "",
        "type": "address",
        "internalType": "contract IERC20"
      }
    ],
    "stateMutability": "view"
  },
  {
    "type": "function",
    "name": "owner",
    "inputs": [],
    "outputs": [
      {
        "name": "",
        "type": "address",
        "internalType": "address"
      }
    ],
    "stateMutability": "view"
  },
  {
    "type": "function",
    "name": "renounceOwnership",
    "inputs": [],
    "outputs": [],
    "stateMutability": "nonpayable"
  },
  {
    "type": "function",
    "name": "setPaymentToken",
    "inputs": [
      {
        "name": "_pt",
        "type": "uint8",
        "internalType": "uint8"
      },
      {
        "name": "_v",
        "type": "address",
        "internalType": "contract IERC20"
      }
    ],
    "outputs": [],
    "stateMutability": "nonpayable"
  },
  {
    "type": "function",
    "name": "transferOwnership",
    "inputs": [
      {
        "name": "newOwner",
        "type": "address",
        "internalType": "address"
      }
    ],
    "outputs": [],
    "stateMutability": "nonpayable"
  },
  {
    "type": "event",
    "name": "OwnershipTransferred",
    "inputs": [
      {
        "name": "previousOwner",
        "type": "address",
        "indexed": true,
        "internalType": "address"
      },
      {
        "name": "newOwner",
        "type": "address",
        "indexed": true,
        "internalType": "address"
      }
    ],
    "anonymous": false
  }
]"#;

/// Deployment bytecode
pub const BYTECODE: &str = "0x608060405234801561001057600080fd5b50600061001b61006a565b600080546001600160a01b0319166001600160a01b0383169081178255604051929350917f8be0079c531659141344cd1fd0a4f28419497f9722a3daafe3b4186f6b6457e0908290a35061006e565b3390565b6103f98061007d6000396000f3fe608060405234801561001057600080fd5b50600436106100575760003560e01c8063321c6aea1461005c578063715018a6146100715780638da5cb5b14610079578063c6ee427f14610097578063f2fde38b146100aa575b600080fd5b61006f61006a3660046102e6565b6100bd565b005b61006f61012e565b6100816101ad565b60405161008e919061031c565b60405180910390f35b6100816100a53660046102cc565b6101bc565b61006f6100b83660046102a9565b6101de565b6100c5610294565b6000546001600160a01b039081169116146100fb5760405162461bcd60e51b81526004016100f290610376565b60405180910390fd5b60ff91909116600090815260016020526040902080546001600160a01b0319166001600160a01b03909216919091179055565b610136610294565b6000546001600160a01b039081169116146101635760405162461bcd60e51b81526004016100f290610376565b600080546040516001600160a01b03909116907f8be0079c531659141344cd1fd0a4f28419497f9722a3daafe3b4186f6b6457e0908390a3600080546001600160a01b0319169055565b6000546001600160a01b031690565b60ff81166000908152600160205260409020546001600160a01b03165b919050565b6101e6610294565b6000546001600160a01b039081169116146102135760405162461bcd60e51b81526004016100f290610376565b6001600160a01b0381166102395760405162461bcd60e51b81526004016100f290610330565b600080546040516001600160a01b03808516939216917f8be0079c531659141344cd1fd0a4f28419497f9722a3daafe3b4186f6b6457e091a3600080546001600160a01b0319166001600160a01b0392909216919091179055565b3390565b803560ff811681146101d957600080fd5b6000602082840312156102ba578081fd5b81356102c5816103ab565b9392505050565b6000602082840312156102dd578081fd5b6102c582610298565b600080604083850312156102f8578081fd5b61030183610298565b91506020830135610311816103ab565b809150509250929050565b6001600160a01b0391909116815260200190565b60208082526026908201527f4f776e61626c653a206e6577206f776e657220697320746865207a65726f206160408201526564647265737360d01b606082015260800190565b6020808252818101527f4f776e61626c653a2063616c6c6572206973206e6f7420746865206f776e6572604082015260600190565b6001600160a01b03811681146103c057600080fd5b5056fea26469706673582212201b03da70ce3fedc4fdf699cc609927652acd197073175af55f4fdccea100888464736f6c63430008000033";

static CONTRACT_ABI: OnceLock<Arc<ContractAbi>> = OnceLock::new();

/// Parsed ABI and bytecode, shared by every accessor and factory
pub fn contract_abi() -> Result<Arc<ContractAbi>, BindingError> {
    ContractAbi::cached(&CONTRACT_ABI, ABI_JSON, BYTECODE)
}

/// `OwnershipTransferred(address,address)` event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipTransferredEvent {
    pub previous_owner: Address,
    pub new_owner: Address,
}

impl ContractEvent for OwnershipTransferredEvent {
    const SIGNATURE: &'static str = "OwnershipTransferred(address,address)";

    fn decode_parts(indexed: Vec<DynSolValue>, body: Vec<DynSolValue>) -> Result<Self, BindingError> {
        let mut indexed = indexed.into_iter();
        let mut body = body.into_iter();
        Ok(Self {
            previous_owner: next_value(&mut indexed)?,
            new_owner: next_value(&mut indexed)?,
        })
    }
}

/// Typed accessor for a deployed `Resolver`
#[derive(Debug, Clone)]
pub struct Resolver {
    inner: ContractInstance,
}

impl Resolver {
    /// Bind to `address`; only its syntax is checked
    pub fn attach(address: &str, client: Option<Arc<dyn ChainClient>>) -> Result<Self, BindingError> {
        Ok(Self::from_instance(ContractInstance::attach(address, contract_abi()?, client)?))
    }

    pub fn from_instance(inner: ContractInstance) -> Self {
        Self { inner }
    }

    pub fn address(&self) -> Address {
        self.inner.address()
    }

    pub fn instance(&self) -> &ContractInstance {
        &self.inner
    }

    /// Same address, different signer or provider
    pub fn connect(&self, client: Arc<dyn ChainClient>) -> Self {
        Self::from_instance(self.inner.connect(client))
    }

    /// `getPaymentToken(uint8)` (view, selector `0xc6ee427f`)
    pub fn get_payment_token(&self, pt: u8) -> ContractCall<Address, View> {
        self.inner.method(
            "getPaymentToken(uint8)",
            vec![pt.into_sol_value()],
            decode_single::<Address>,
        )
    }

    /// `owner()` (view, selector `0x8da5cb5b`)
    pub fn owner(&self) -> ContractCall<Address, View> {
        self.inner.method(
            "owner()",
            Vec::new(),
            decode_single::<Address>,
        )
    }

    /// `renounceOwnership()` (nonpayable, selector `0x715018a6`)
    pub fn renounce_ownership(&self) -> ContractCall<(), NonPayable> {
        self.inner.method(
            "renounceOwnership()",
            Vec::new(),
            decode_unit,
        )
    }

    /// `setPaymentToken(uint8,address)` (nonpayable, selector `0x321c6aea`)
    pub fn set_payment_token(&self, pt: u8, v: Address) -> ContractCall<(), NonPayable> {
        self.inner.method(
            "setPaymentToken(uint8,address)",
            vec![pt.into_sol_value(), v.into_sol_value()],
            decode_unit,
        )
    }

    /// `transferOwnership(address)` (nonpayable, selector `0xf2fde38b`)
    pub fn transfer_ownership(&self, new_owner: Address) -> ContractCall<(), NonPayable> {
        self.inner.method(
            "transferOwnership(address)",
            vec![new_owner.into_sol_value()],
            decode_unit,
        )
    }

    /// Filter for `OwnershipTransferred(address,address)`; `None` matches any value
    pub fn ownership_transferred_filter(
        &self,
        previous_owner: Option<Address>,
        new_owner: Option<Address>,
    ) -> EventFilter<OwnershipTransferredEvent> {
        self.inner.event_filter(vec![
            previous_owner.map(value_topic),
            new_owner.map(value_topic),
        ])
    }
}

/// Deploys `Resolver` or binds to existing deployments
#[derive(Debug, Clone)]
pub struct ResolverFactory {
    inner: ContractFactory,
}

impl ResolverFactory {
    pub fn new(client: Option<Arc<dyn ChainClient>>) -> Result<Self, BindingError> {
        Ok(Self {
            inner: ContractFactory::new(contract_abi()?, client),
        })
    }

    pub fn inner(&self) -> &ContractFactory {
        &self.inner
    }

    /// Bind to an existing deployment; no network interaction
    pub fn attach(&self, address: &str) -> Result<Resolver, BindingError> {
        Ok(Resolver::from_instance(self.inner.attach(address)?))
    }

    /// Same factory, different signer or provider
    pub fn connect(&self, client: Arc<dyn ChainClient>) -> Self {
        Self {
            inner: self.inner.connect(client),
        }
    }

    /// Bind to an existing deployment with the given client
    pub fn connect_at(address: &str, client: Arc<dyn ChainClient>) -> Result<Resolver, BindingError> {
        let instance = ContractFactory::connect_at(contract_abi()?, address, client)?;
        Ok(Resolver::from_instance(instance))
    }

    /// Deploy a new instance and wait for it to be mined
    pub async fn deploy(&self) -> Result<Resolver, BindingError> {
        self.deploy_with(Overrides::default()).await
    }

    /// Like `deploy`, with explicit value, gas limit or nonce
    pub async fn deploy_with(&self, overrides: Overrides) -> Result<Resolver, BindingError> {
        let instance = self.inner.deploy(Vec::new(), overrides).await?;
        Ok(Resolver::from_instance(instance))
    }

    /// Creation transaction for a new instance; nothing is submitted
    pub fn deploy_transaction(&self) -> Result<TransactionRequest, BindingError> {
        self.inner.deploy_transaction(Vec::new(), &Overrides::default())
    }
}
