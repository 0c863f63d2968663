//! Detects the wallet provider and assembles the runtime used by front-ends.
use std::sync::Arc;

use anyhow::{Context, Result};
use client_blockchain_core::{Address, ProviderContract, RpsContract, WalletProvider};
use client_blockchain_evm::HttpWalletProvider;
use runtime::Runtime;

use crate::config::ClientConfig;

/// Builder that assembles the provider, contract and runtime for clients.
pub struct RuntimeBuilder {
    config: ClientConfig,
    provider: Option<Arc<dyn WalletProvider>>,
    contract_address: Option<Address>,
}

impl RuntimeBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            provider: None,
            contract_address: None,
        }
    }

    /// Use an already constructed provider instead of the configured endpoint.
    pub fn provider(mut self, provider: Arc<dyn WalletProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Override the contract address from the endpoint configuration.
    pub fn contract_address(mut self, address: Address) -> Self {
        self.contract_address = Some(address);
        self
    }

    pub async fn build(self) -> Result<RuntimeSetup> {
        let network = self.config.evm.as_ref().map(|evm| evm.network.clone());
        let contract_address = self.contract_address.or_else(|| {
            self.config
                .evm
                .as_ref()
                .and_then(|evm| evm.contract_address.clone())
        });

        let provider = match self.provider {
            Some(provider) => Some(provider),
            None => detect_provider(&self.config)?,
        };

        let mut builder = Runtime::builder().config(self.config.runtime.clone());

        match &provider {
            Some(provider) => {
                tracing::info!(provider = provider.name(), "Wallet provider detected");
                builder = builder.provider(Arc::clone(provider));
            }
            None => tracing::info!("No wallet provider configured"),
        }

        match (&provider, contract_address) {
            (Some(provider), Some(address)) => {
                tracing::info!(contract = %address, "Using game contract");
                let contract = ProviderContract::new(Arc::clone(provider), address)
                    .with_poll_interval(self.config.receipt_poll_interval);
                builder = builder.contract(Arc::new(contract) as Arc<dyn RpsContract>);
            }
            (Some(_), None) => {
                tracing::warn!("RPS_CONTRACT_ADDRESS not set; rounds cannot be submitted");
            }
            (None, _) => {}
        }

        let runtime = builder.build().await.context("failed to build runtime")?;

        Ok(RuntimeSetup {
            config: self.config,
            network,
            runtime,
        })
    }
}

fn detect_provider(config: &ClientConfig) -> Result<Option<Arc<dyn WalletProvider>>> {
    let Some(evm) = config.evm.clone() else {
        return Ok(None);
    };

    let provider = HttpWalletProvider::new(evm).context("failed to create JSON-RPC provider")?;
    Ok(Some(Arc::new(provider)))
}

pub struct RuntimeSetup {
    pub config: ClientConfig,
    /// Display name of the connected network, if any.
    pub network: Option<String>,
    pub runtime: Runtime,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use client_blockchain_core::MockWalletProvider;

    use super::*;

    #[tokio::test]
    async fn without_endpoint_runtime_has_no_provider() {
        let setup = RuntimeBuilder::new(ClientConfig::default())
            .build()
            .await
            .unwrap();
        let handle = setup.runtime.handle();

        assert!(!handle.has_provider());
        assert!(handle.contract_address().is_none());
        assert!(setup.network.is_none());

        setup.runtime.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn injected_provider_and_contract_are_wired() {
        let mock = Arc::new(MockWalletProvider::new());
        let address = mock.contract_address().clone();
        let mut config = ClientConfig::default();
        config.receipt_poll_interval = Duration::from_millis(50);

        let setup = RuntimeBuilder::new(config)
            .provider(mock.clone())
            .contract_address(address.clone())
            .build()
            .await
            .unwrap();
        let handle = setup.runtime.handle();

        assert!(handle.has_provider());
        assert_eq!(handle.contract_address(), Some(address));
        let session = handle.connect().await.unwrap();
        assert_eq!(session.account, mock.accounts()[0]);

        setup.runtime.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn provider_without_contract_is_still_connectable() {
        let mock = Arc::new(MockWalletProvider::new());

        let setup = RuntimeBuilder::new(ClientConfig::default())
            .provider(mock)
            .build()
            .await
            .unwrap();
        let handle = setup.runtime.handle();

        assert!(handle.contract_address().is_none());
        assert!(handle.connect().await.is_ok());

        setup.runtime.shutdown().await.unwrap();
    }
}
