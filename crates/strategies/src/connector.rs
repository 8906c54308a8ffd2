//! 网络连接
//!
//! 运行器只通过 `NetworkConnector` 拿到链上客户端，实盘由 `EthersConnector`
//! 建立 `Provider<Http>` 并为每个私钥包一层 `SignerMiddleware`

use anyhow::{Context, Result};
use async_trait::async_trait;
use config_crate::NetworkConfig;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use executor::{ChainClient, EthersChainClient};
use models::NetworkEndpoint;
use std::sync::Arc;

/// 已连接的网络及其账户客户端 (按私钥顺序)
pub struct ConnectedNetwork {
    pub endpoint: NetworkEndpoint,
    pub accounts: Vec<(Address, Arc<dyn ChainClient>)>,
}

#[async_trait]
pub trait NetworkConnector: Send + Sync {
    /// 连接网络并读取 chain id，失败时终止整个运行
    async fn connect(&self, network: &NetworkConfig) -> Result<ConnectedNetwork>;
}

/// 基于 ethers HTTP provider 的连接器
pub struct EthersConnector {
    wallets: Vec<LocalWallet>,
    confirmation_timeout_secs: u64,
}

impl EthersConnector {
    pub fn new(wallets: Vec<LocalWallet>, confirmation_timeout_secs: u64) -> Self {
        Self {
            wallets,
            confirmation_timeout_secs,
        }
    }
}

#[async_trait]
impl NetworkConnector for EthersConnector {
    async fn connect(&self, network: &NetworkConfig) -> Result<ConnectedNetwork> {
        let provider = Provider::<Http>::try_from(network.rpc_url.as_str())
            .with_context(|| format!("无效的 RPC 地址: {}", network.name))?;
        let chain_id = provider
            .get_chainid()
            .await
            .with_context(|| format!("连接网络 {} 失败", network.name))?
            .as_u64();

        let accounts = self
            .wallets
            .iter()
            .map(|wallet| {
                let wallet = wallet.clone().with_chain_id(chain_id);
                let account = wallet.address();
                let signer = Arc::new(SignerMiddleware::new(provider.clone(), wallet));
                let client: Arc<dyn ChainClient> =
                    Arc::new(EthersChainClient::new(signer, self.confirmation_timeout_secs));
                (account, client)
            })
            .collect();

        Ok(ConnectedNetwork {
            endpoint: NetworkEndpoint::new(&network.name, &network.rpc_url, chain_id),
            accounts,
        })
    }
}
