use anyhow::{bail, Context, Result};
use ethers::types::{Address, Bytes, U256};
use models::{DexType, SwapPath, SwapStep, TokenConfig, TokenSymbol};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 按声明顺序排列的网络列表
    pub networks: Vec<NetworkConfig>,
    pub wallet: WalletConfig,
    /// chain_id -> SyncSwap 配置
    pub dexes: HashMap<u64, DexConfig>,
    pub swap: SwapConfig,
    pub oracle: OracleConfig,
    pub log: LogConfig,
}

/// 网络连接描述 (来自配置，连接前不知道 chain_id)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: String,
    pub rpc_url: String,
}

impl NetworkConfig {
    pub fn new(name: &str, rpc_url: String) -> Self {
        Self {
            name: name.to_string(),
            rpc_url,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WalletConfig {
    /// 账户私钥列表 (空格分隔)
    pub private_keys: Vec<String>,
}

/// 兑换执行参数
#[derive(Debug, Clone, Deserialize)]
pub struct SwapConfig {
    /// 滑点 (0.05 = 5%)
    pub slippage: f64,
    /// 交易截止时间偏移量 (秒)
    pub deadline_offset_secs: u64,
    /// approve 交易等待的确认数
    pub approve_confirmations: usize,
    /// swap 交易等待的确认数
    pub swap_confirmations: usize,
    /// 单笔交易确认的超时时间 (秒)
    pub confirmation_timeout_secs: u64,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            slippage: 0.05,
            deadline_offset_secs: 300, // 5 分钟
            approve_confirmations: 2,
            swap_confirmations: 1,
            confirmation_timeout_secs: 180,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.geckoterminal.com/api/v2".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志目录 (控制台级别由 RUST_LOG 控制)
    pub dir: String,
}

/// 单条链上单个 DEX 的配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexConfig {
    pub dex: DexType,
    /// 预言机使用的网络名 (GeckoTerminal: zksync / scroll)
    pub network_name: String,
    pub router: Address,
    /// 报价使用的池子
    pub pool: Address,
    /// 链原生币 (锚定资产)
    pub native_token: TokenSymbol,
    pub tokens: HashMap<TokenSymbol, TokenConfig>,
}

impl DexConfig {
    /// zkSync Era 主网 SyncSwap
    pub fn sync_swap_zksync() -> Result<Self> {
        let pool_eth_usdc = parse_address("0x80115c708E12eDd42E504c1cD52Aea96C547c05c")?;

        let mut tokens = HashMap::new();
        tokens.insert(
            TokenSymbol::Eth,
            TokenConfig {
                symbol: TokenSymbol::Eth,
                address: parse_address("0x5AEa5775959fBC2557Cc8789bC1bf90A239D9a91")?, // WETH
                decimals: 18,
                amount: Decimal::new(1, 3),
                withdraw_mode: 1,
                paths: vec![single_hop_path(pool_eth_usdc)],
            },
        );
        tokens.insert(
            TokenSymbol::Usdc,
            TokenConfig {
                symbol: TokenSymbol::Usdc,
                address: parse_address("0x3355df6D4c9C3035724Fd0e3914dE96A5a83aaf4")?,
                decimals: 6,
                amount: Decimal::ONE,
                withdraw_mode: 1,
                paths: vec![single_hop_path(pool_eth_usdc)],
            },
        );

        Ok(Self {
            dex: DexType::SyncSwap,
            network_name: "zksync".to_string(),
            router: parse_address("0x2da10A1e27bF85cEdD8FFb1AbBe97e53391C0295")?,
            pool: pool_eth_usdc,
            native_token: TokenSymbol::Eth,
            tokens,
        })
    }

    /// Scroll 主网 SyncSwap
    pub fn sync_swap_scroll() -> Result<Self> {
        let pool_eth_usdc = parse_address("0x814A23B053FD0f102AEEda0459215C2444799C70")?;

        let mut tokens = HashMap::new();
        tokens.insert(
            TokenSymbol::Eth,
            TokenConfig {
                symbol: TokenSymbol::Eth,
                address: parse_address("0x5300000000000000000000000000000000000004")?, // WETH
                decimals: 18,
                amount: Decimal::new(1, 3),
                withdraw_mode: 1,
                paths: vec![single_hop_path(pool_eth_usdc)],
            },
        );
        tokens.insert(
            TokenSymbol::Usdc,
            TokenConfig {
                symbol: TokenSymbol::Usdc,
                address: parse_address("0x06eFdBFf2a14a7c8E15944D1F4A48F9F95F663A4")?,
                decimals: 6,
                amount: Decimal::ONE,
                withdraw_mode: 1,
                paths: vec![single_hop_path(pool_eth_usdc)],
            },
        );

        Ok(Self {
            dex: DexType::SyncSwap,
            network_name: "scroll".to_string(),
            router: parse_address("0x80e38291e06339d10AAB483C65695D004dBD5C69")?,
            pool: pool_eth_usdc,
            native_token: TokenSymbol::Eth,
            tokens,
        })
    }

    /// 根据 chain_id 获取 DEX 配置
    pub fn for_chain(chain_id: u64) -> Result<Option<Self>> {
        match chain_id {
            324 => Ok(Some(Self::sync_swap_zksync()?)),
            534352 => Ok(Some(Self::sync_swap_scroll()?)),
            _ => Ok(None),
        }
    }

    pub fn token(&self, symbol: TokenSymbol) -> Option<&TokenConfig> {
        self.tokens.get(&symbol)
    }

    /// 覆盖所有代币的兑换数量
    pub fn apply_amount_overrides(&mut self, overrides: &HashMap<TokenSymbol, Decimal>) {
        for (symbol, amount) in overrides {
            if let Some(token) = self.tokens.get_mut(symbol) {
                token.amount = *amount;
            }
        }
    }
}

/// 已部署 SyncSwap 的链
pub const SYNC_SWAP_CHAINS: [u64; 2] = [324, 534352];

/// 单跳路径模板: 原生币输入，call data 在每次兑换前重新编码
fn single_hop_path(pool: Address) -> SwapPath {
    SwapPath {
        steps: vec![SwapStep {
            pool,
            data: Bytes::default(),
            callback: Address::zero(),
            callback_data: Bytes::default(),
        }],
        token_in: Address::zero(),
        amount_in: U256::zero(),
    }
}

fn parse_address(s: &str) -> Result<Address> {
    Address::from_str(s).with_context(|| format!("Invalid address: {}", s))
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // 加载 .env 文件
        dotenv::dotenv().ok();

        // 网络列表 (声明顺序即遍历顺序)
        let networks = vec![
            NetworkConfig::new("mainnet", env::var("MAINNET_RPC_URL").unwrap_or_default()),
            NetworkConfig::new(
                "zkSync",
                env::var("ZKSYNC_RPC_URL")
                    .unwrap_or_else(|_| "https://mainnet.era.zksync.io".to_string()),
            ),
            NetworkConfig::new(
                "scroll",
                env::var("SCROLL_RPC_URL").unwrap_or_else(|_| "https://rpc.scroll.io/".to_string()),
            ),
        ];

        // 钱包配置
        let wallet = WalletConfig {
            private_keys: parse_private_keys(&env::var("PRIVATE_KEYS").unwrap_or_default()),
        };

        // 兑换数量覆盖 (SWAP_AMOUNT_ETH=0.002)
        let mut amount_overrides = HashMap::new();
        for symbol in TokenSymbol::ALL {
            let key = format!("SWAP_AMOUNT_{}", symbol.as_str());
            if let Ok(raw) = env::var(&key) {
                let amount = Decimal::from_str(raw.trim())
                    .with_context(|| format!("Invalid {}", key))?;
                amount_overrides.insert(symbol, amount);
            }
        }

        let mut dexes = HashMap::new();
        for chain_id in SYNC_SWAP_CHAINS {
            if let Some(mut dex) = DexConfig::for_chain(chain_id)? {
                dex.apply_amount_overrides(&amount_overrides);
                dexes.insert(chain_id, dex);
            }
        }

        let defaults = SwapConfig::default();
        let swap = SwapConfig {
            slippage: parse_slippage(env::var("SLIPPAGE").ok().as_deref(), defaults.slippage)?,
            deadline_offset_secs: env::var("DEADLINE_OFFSET_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.deadline_offset_secs),
            approve_confirmations: env::var("APPROVE_CONFIRMATIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.approve_confirmations),
            swap_confirmations: env::var("SWAP_CONFIRMATIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.swap_confirmations),
            confirmation_timeout_secs: env::var("CONFIRMATION_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.confirmation_timeout_secs),
        };

        let oracle_defaults = OracleConfig::default();
        let oracle = OracleConfig {
            api_url: env::var("ORACLE_API_URL").unwrap_or(oracle_defaults.api_url),
            timeout_secs: env::var("ORACLE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(oracle_defaults.timeout_secs),
        };

        // 日志配置
        let log = LogConfig {
            dir: env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs".to_string()),
        };

        Ok(Self {
            networks,
            wallet,
            dexes,
            swap,
            oracle,
            log,
        })
    }

    pub fn dex_for_chain(&self, chain_id: u64) -> Option<&DexConfig> {
        self.dexes.get(&chain_id)
    }
}

/// 滑点必须落在 [0, 1) 内，否则所有报价都会失效
fn parse_slippage(raw: Option<&str>, default: f64) -> Result<f64> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let slippage: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("Invalid SLIPPAGE: {}", raw))?;
    if !(0.0..1.0).contains(&slippage) {
        bail!("SLIPPAGE must be within [0, 1), got {}", slippage);
    }
    Ok(slippage)
}

fn parse_private_keys(raw: &str) -> Vec<String> {
    raw.split_whitespace()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
