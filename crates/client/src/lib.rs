//! Top-level client composing the Runtime and a Frontend.
//!
//! # Architecture
//!
//! ```text
//! Client (Top-level container)
//!   ├─→ Runtime (wallet session, round state machine, contract adapter)
//!   └─→ Frontend (UI layer - CLI, GUI, etc.)
//! ```
//!
//! The frontend talks to the runtime only through a `RuntimeHandle`; the
//! runtime reaches the chain only through the wallet provider it was built
//! with.

mod builder;

pub use builder::ClientBuilder;

// Re-export Frontend trait from client-frontend-core
pub use client_frontend_core::Frontend;

use anyhow::Result;

/// Top-level client container.
///
/// # Lifecycle
///
/// 1. Client::builder() receives an already built runtime and a frontend
/// 2. Client::run() transfers control to the frontend (blocking)
/// 3. On frontend exit, the runtime is shut down: balance polling stops and
///    any round in flight is abandoned
pub struct Client {
    runtime: runtime::Runtime,
    frontend: Box<dyn Frontend>,
}

impl Client {
    /// Create a new ClientBuilder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Run the frontend until the user quits, then shut the runtime down.
    ///
    /// # Errors
    ///
    /// Returns the frontend's error if it failed, otherwise any error from
    /// shutting down the runtime.
    pub async fn run(self) -> Result<()> {
        let handle = self.runtime.handle();

        let mut frontend = self.frontend;
        let frontend_result = frontend.run(handle).await;

        let shutdown_result = self.runtime.shutdown().await;
        if let Err(error) = &shutdown_result {
            tracing::error!("Runtime shutdown error: {}", error);
        }

        frontend_result?;
        shutdown_result?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use client_blockchain_core::MockWalletProvider;
    use runtime::RuntimeHandle;

    use super::*;

    /// Frontend that connects, records what it saw and quits.
    struct ScriptedFrontend {
        connected: Arc<std::sync::Mutex<Option<bool>>>,
    }

    #[async_trait]
    impl Frontend for ScriptedFrontend {
        async fn run(&mut self, handle: RuntimeHandle) -> Result<()> {
            let ok = handle.connect().await.is_ok();
            *self.connected.lock().unwrap() = Some(ok);
            Ok(())
        }
    }

    #[tokio::test]
    async fn runs_frontend_then_shuts_down_runtime() {
        let provider = Arc::new(MockWalletProvider::new());
        let runtime = runtime::Runtime::builder()
            .provider(provider)
            .build()
            .await
            .unwrap();
        let connected = Arc::new(std::sync::Mutex::new(None));

        let client = Client::builder()
            .runtime(runtime)
            .frontend(ScriptedFrontend {
                connected: Arc::clone(&connected),
            })
            .build()
            .unwrap();
        client.run().await.unwrap();

        assert_eq!(*connected.lock().unwrap(), Some(true));
    }

    #[test]
    fn build_requires_runtime_and_frontend() {
        assert!(Client::builder().build().is_err());
    }
}
