use anyhow::{Context, Result};
use config_crate::AppConfig;
use dex::{parse_pair, RouteRequest};
use ethers::signers::LocalWallet;
use ethers::types::Address;
use ethers::utils::format_ether;
use executor::{ChainClient, ExecutorConfig};
use models::NetworkEndpoint;
use services::{GeckoTerminalOracle, PriceQuoter};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::connector::{EthersConnector, NetworkConnector};
use crate::network_filter::eligible_networks;
use crate::swap_pipeline::{SwapContext, SwapPipeline};

/// 运行统计
///
/// 每个账户在每个网络上恰好计入 swapped / skipped / failed 之一
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// 成功连接的网络数
    pub networks: usize,
    /// 通过配置校验、真正进入报价与兑换的账户数
    pub attempted: usize,
    pub swapped: usize,
    /// 余额为 0 或配置不匹配而跳过
    pub skipped: usize,
    /// 查询余额、报价、授权或兑换失败
    pub failed: usize,
}

impl RunReport {
    /// 已处理的账户总数
    pub fn accounts(&self) -> usize {
        self.swapped + self.skipped + self.failed
    }
}

/// 多网络、多账户兑换驱动
///
/// 严格顺序执行: 网络按声明顺序，账户按私钥顺序，每个账户最多一次兑换
pub struct SwapRunner {
    config: AppConfig,
    pipeline: SwapPipeline,
}

impl SwapRunner {
    pub fn new(config: AppConfig) -> Self {
        let oracle = Arc::new(GeckoTerminalOracle::new(
            &config.oracle.api_url,
            config.oracle.timeout_secs,
        ));
        let quoter = PriceQuoter::new(oracle, config.swap.slippage);
        let pipeline = SwapPipeline::new(quoter, ExecutorConfig::from(&config.swap));
        Self::with_pipeline(config, pipeline)
    }

    pub fn with_pipeline(config: AppConfig, pipeline: SwapPipeline) -> Self {
        Self { config, pipeline }
    }

    /// 遍历所有可用网络执行兑换
    ///
    /// 连接网络失败 (RPC 不可用) 会终止整个运行
    pub async fn run(&self, request: &RouteRequest) -> Result<RunReport> {
        let wallets = self.load_wallets()?;
        if wallets.is_empty() {
            warn!("未配置任何账户 (PRIVATE_KEYS 为空)");
        }
        let connector = EthersConnector::new(wallets, self.config.swap.confirmation_timeout_secs);
        self.run_with(&connector, request).await
    }

    /// 使用给定连接器遍历网络
    pub async fn run_with(&self, connector: &dyn NetworkConnector, request: &RouteRequest) -> Result<RunReport> {
        let mut report = RunReport::default();

        // DEX 名称和代币符号与网络无关，不合法时不连接任何网络
        if let Err(e) = parse_pair(request) {
            warn!("兑换请求无效，放弃运行: {}", e);
            return Ok(report);
        }

        for network in eligible_networks(&self.config.networks) {
            let connected = connector.connect(network).await?;
            let endpoint = connected.endpoint;
            info!("*************** 网络 {} | Chain ID {} ***************", endpoint.name, endpoint.chain_id);
            report.networks += 1;

            for (account, client) in &connected.accounts {
                self.process_account(client.as_ref(), &endpoint, *account, request, &mut report)
                    .await;
            }
        }

        Ok(report)
    }

    /// 处理单个账户: 余额为 0 跳过，否则执行一次兑换
    pub async fn process_account(
        &self,
        client: &dyn ChainClient,
        endpoint: &NetworkEndpoint,
        account: Address,
        request: &RouteRequest,
        report: &mut RunReport,
    ) {
        let balance = match client.native_balance(account).await {
            Ok(balance) => balance,
            Err(e) => {
                error!("查询账户 {:?} 余额失败: {}", account, e);
                report.failed += 1;
                return;
            }
        };

        info!("账户 {:?} 在 {} ({}) 的余额: {} ETH",
            account, endpoint.name, endpoint.chain_id, format_ether(balance));

        if balance.is_zero() {
            warn!("账户 {:?} 没有足够的 ETH 余额，跳过", account);
            report.skipped += 1;
            return;
        }

        let network = endpoint.name.as_str();
        let ctx = SwapContext {
            network,
            chain_id: endpoint.chain_id,
            account,
            dex_config: self.config.dex_for_chain(endpoint.chain_id),
        };

        match self.pipeline.run(client, &ctx, request).await {
            Ok(outcome) => {
                info!("✅ [{}] 账户 {:?} 兑换完成: {:?}", network, account, outcome.tx_hash);
                report.attempted += 1;
                report.swapped += 1;
            }
            Err(e) if e.is_skip() => {
                warn!("[{}] 账户 {:?} 跳过: {}", network, account, e);
                report.skipped += 1;
            }
            Err(e) => {
                error!("❌ [{}] 账户 {:?} 兑换失败: {}", network, account, e);
                report.attempted += 1;
                report.failed += 1;
            }
        }
    }

    fn load_wallets(&self) -> Result<Vec<LocalWallet>> {
        self.config
            .wallet
            .private_keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                LocalWallet::from_str(key.trim_start_matches("0x"))
                    .with_context(|| format!("第 {} 个私钥格式无效", i + 1))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::ConnectedNetwork;
    use crate::swap_pipeline::tests::pipeline;
    use anyhow::bail;
    use async_trait::async_trait;
    use config_crate::{DexConfig, LogConfig, NetworkConfig, OracleConfig, SwapConfig, WalletConfig};
    use ethers::utils::parse_ether;
    use executor::testing::{MockChain, RecordedCall};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 每次连接都返回同一组内存链账户
    struct StaticConnector {
        chain_id: u64,
        accounts: Vec<(Address, Arc<MockChain>)>,
        offline: bool,
        connects: AtomicUsize,
    }

    impl StaticConnector {
        fn new(chain_id: u64, accounts: Vec<(Address, Arc<MockChain>)>) -> Self {
            Self {
                chain_id,
                accounts,
                offline: false,
                connects: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl NetworkConnector for StaticConnector {
        async fn connect(&self, network: &NetworkConfig) -> Result<ConnectedNetwork> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if self.offline {
                bail!("连接网络 {} 失败", network.name);
            }
            let accounts = self
                .accounts
                .iter()
                .map(|(account, chain)| (*account, chain.clone() as Arc<dyn ChainClient>))
                .collect();
            Ok(ConnectedNetwork {
                endpoint: NetworkEndpoint::new(&network.name, &network.rpc_url, self.chain_id),
                accounts,
            })
        }
    }

    fn funded_chain(account: Address) -> Arc<MockChain> {
        let chain = Arc::new(MockChain::default());
        chain.set_native_balance(account, parse_ether(1u64).unwrap());
        chain
    }

    fn zksync_network() -> Vec<NetworkConfig> {
        vec![NetworkConfig::new("zkSync", "https://mainnet.era.zksync.io".to_string())]
    }

    fn app_config(private_keys: Vec<String>) -> AppConfig {
        let mut dexes = HashMap::new();
        dexes.insert(324, DexConfig::sync_swap_zksync().unwrap());
        AppConfig {
            networks: Vec::new(),
            wallet: WalletConfig { private_keys },
            dexes,
            swap: SwapConfig::default(),
            oracle: OracleConfig::default(),
            log: LogConfig {
                dir: "logs".to_string(),
            },
        }
    }

    fn zksync() -> NetworkEndpoint {
        NetworkEndpoint::new("zkSync", "https://mainnet.era.zksync.io", 324)
    }

    fn request(input: &str, output: &str) -> RouteRequest {
        RouteRequest {
            dex_name: "SyncSwap".to_string(),
            input: input.to_string(),
            output: output.to_string(),
        }
    }

    #[tokio::test]
    async fn test_funded_account_swaps_once() {
        let runner = SwapRunner::with_pipeline(app_config(Vec::new()), pipeline(Some(0.0004)));
        let account = Address::repeat_byte(0x0a);
        let chain = MockChain::default();
        chain.set_native_balance(account, parse_ether(1u64).unwrap());
        let mut report = RunReport::default();

        runner
            .process_account(&chain, &zksync(), account, &request("ETH", "USDC"), &mut report)
            .await;

        assert_eq!(report.attempted, 1);
        assert_eq!(report.swapped, 1);
        assert!(chain.approvals().is_empty());
        let swaps = chain.swaps();
        assert_eq!(swaps.len(), 1);
        match &swaps[0] {
            RecordedCall::Swap { value, .. } => {
                assert_eq!(*value, Some(parse_ether("0.001").unwrap()));
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_balance_is_skipped() {
        let runner = SwapRunner::with_pipeline(app_config(Vec::new()), pipeline(Some(0.0004)));
        let chain = MockChain::default();
        let mut report = RunReport::default();

        runner
            .process_account(&chain, &zksync(), Address::repeat_byte(0x0b), &request("ETH", "USDC"), &mut report)
            .await;

        assert_eq!(report, RunReport { skipped: 1, ..Default::default() });
        assert!(chain.swaps().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_chain_is_skipped() {
        let runner = SwapRunner::with_pipeline(app_config(Vec::new()), pipeline(Some(0.0004)));
        let account = Address::repeat_byte(0x0a);
        let chain = MockChain::default();
        chain.set_native_balance(account, parse_ether(1u64).unwrap());
        let mut report = RunReport::default();

        let mainnet = NetworkEndpoint::new("mainnet", "https://rpc.example.org", 1);

        runner
            .process_account(&chain, &mainnet, account, &request("ETH", "USDC"), &mut report)
            .await;

        assert_eq!(report, RunReport { skipped: 1, ..Default::default() });
        assert!(chain.calls().iter().all(|c| matches!(c, RecordedCall::NativeBalance { .. })));
    }

    #[tokio::test]
    async fn test_transport_failure_counts_as_failed() {
        let runner = SwapRunner::with_pipeline(app_config(Vec::new()), pipeline(Some(0.0004)));
        let chain = MockChain::default();
        chain.set_transport_down(true);
        let mut report = RunReport::default();

        runner
            .process_account(&chain, &zksync(), Address::repeat_byte(0x0a), &request("ETH", "USDC"), &mut report)
            .await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.attempted, 0);
    }

    #[tokio::test]
    async fn test_failed_account_does_not_stop_next() {
        let mut config = app_config(Vec::new());
        config.networks = zksync_network();
        let runner = SwapRunner::with_pipeline(config, pipeline(Some(0.0004)));

        let (first, second, third) = (Address::repeat_byte(0x01), Address::repeat_byte(0x02), Address::repeat_byte(0x03));
        let failing = funded_chain(first);
        failing.set_swap_success(false);
        let healthy = funded_chain(second);
        let empty = Arc::new(MockChain::default());
        let connector = StaticConnector::new(
            324,
            vec![(first, failing.clone()), (second, healthy.clone()), (third, empty.clone())],
        );

        let report = runner.run_with(&connector, &request("ETH", "USDC")).await.unwrap();

        assert_eq!(
            report,
            RunReport { networks: 1, attempted: 2, swapped: 1, skipped: 1, failed: 1 }
        );
        assert_eq!(report.accounts(), 3);
        assert_eq!(failing.swaps().len(), 1);
        assert_eq!(healthy.swaps().len(), 1);
        assert!(empty.swaps().is_empty());
    }

    #[tokio::test]
    async fn test_connect_failure_aborts_run() {
        let mut config = app_config(Vec::new());
        config.networks = zksync_network();
        let runner = SwapRunner::with_pipeline(config, pipeline(Some(0.0004)));
        let account = Address::repeat_byte(0x01);
        let chain = funded_chain(account);
        let mut connector = StaticConnector::new(324, vec![(account, chain.clone())]);
        connector.offline = true;

        assert!(runner.run_with(&connector, &request("ETH", "USDC")).await.is_err());
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_request_connects_nothing() {
        let mut config = app_config(Vec::new());
        config.networks = zksync_network();
        let runner = SwapRunner::with_pipeline(config, pipeline(Some(0.0004)));
        let account = Address::repeat_byte(0x01);
        let connector = StaticConnector::new(324, vec![(account, funded_chain(account))]);

        for req in [request("DOGE", "USDC"), request("ETH", "PEPE")] {
            let report = runner.run_with(&connector, &req).await.unwrap();
            assert_eq!(report, RunReport::default());
        }
        let mut uniswap = request("ETH", "USDC");
        uniswap.dex_name = "Uniswap".to_string();
        assert_eq!(runner.run_with(&connector, &uniswap).await.unwrap(), RunReport::default());

        assert_eq!(connector.connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_mismatch_counts_once() {
        let mut config = app_config(Vec::new());
        config.networks = zksync_network();
        let runner = SwapRunner::with_pipeline(config, pipeline(Some(0.0004)));
        let account = Address::repeat_byte(0x01);
        let chain = funded_chain(account);
        let connector = StaticConnector::new(324, vec![(account, chain.clone())]);

        let report = runner.run_with(&connector, &request("USDC", "USDT")).await.unwrap();

        assert_eq!(report, RunReport { networks: 1, skipped: 1, ..Default::default() });
        assert_eq!(report.accounts(), 1);
        assert!(chain.swaps().is_empty());
    }

    #[test]
    fn test_invalid_private_key_rejected() {
        let runner = SwapRunner::with_pipeline(
            app_config(vec!["not-a-key".to_string()]),
            pipeline(None),
        );
        assert!(runner.load_wallets().is_err());

        let runner = SwapRunner::with_pipeline(
            app_config(vec![
                "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318".to_string(),
            ]),
            pipeline(None),
        );
        assert_eq!(runner.load_wallets().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_eligible_networks() {
        let mut config = app_config(Vec::new());
        config.networks = vec![config_crate::NetworkConfig::new(
            "hardhat",
            "http://127.0.0.1:8545".to_string(),
        )];
        let runner = SwapRunner::with_pipeline(config, pipeline(None));
        let report = runner.run(&request("ETH", "USDC")).await.unwrap();
        assert_eq!(report, RunReport::default());
    }
}
