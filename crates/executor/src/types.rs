//! 执行器类型定义

use dex::RouteError;
use ethers::types::{H256, U256};
use models::TokenSymbol;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 兑换流程错误分类
///
/// 所有错误只终止当前账户的这一次兑换，遍历继续下一个账户 / 网络
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("Configuration mismatch: {0}")]
    ConfigurationMismatch(#[from] RouteError),

    #[error("Quote unavailable for {input}/{output}")]
    QuoteUnavailable { input: TokenSymbol, output: TokenSymbol },

    #[error("Insufficient {token} balance: have {balance}, need {required}")]
    InsufficientFunds {
        token: TokenSymbol,
        balance: U256,
        required: U256,
    },

    #[error("Approve transaction failed: {0:?}")]
    ApprovalFailed(H256),

    #[error("Swap transaction failed: {0:?}")]
    SwapFailed(H256),

    #[error("Timeout waiting for transaction {0:?}")]
    Timeout(H256),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl SwapError {
    /// 是否属于配置层面的跳过 (非失败)
    pub fn is_skip(&self) -> bool {
        matches!(self, SwapError::ConfigurationMismatch(_))
    }
}

/// 交易回执结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutcome {
    pub tx_hash: H256,
    pub block_number: Option<u64>,
    /// 回执 status == 1
    pub success: bool,
}

/// 授权状态机的终态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowanceState {
    /// 已有授权足够
    Sufficient { allowance: U256 },
    /// 授权不足，已提交 approve 并成功
    InsufficientRaised { tx_hash: H256 },
    /// 授权不足，approve 回执失败
    InsufficientFailed { tx_hash: H256 },
}

impl AllowanceState {
    /// 是否可以继续兑换
    pub fn can_swap(&self) -> bool {
        !matches!(self, AllowanceState::InsufficientFailed { .. })
    }
}

/// 执行参数
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// 交易截止时间偏移量 (秒)
    pub deadline_offset_secs: u64,
    /// approve 需要的确认数
    pub approve_confirmations: usize,
    /// swap 需要的确认数
    pub swap_confirmations: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            deadline_offset_secs: 300, // 5 分钟
            approve_confirmations: 2,
            swap_confirmations: 1,
        }
    }
}

impl From<&config_crate::SwapConfig> for ExecutorConfig {
    fn from(cfg: &config_crate::SwapConfig) -> Self {
        Self {
            deadline_offset_secs: cfg.deadline_offset_secs,
            approve_confirmations: cfg.approve_confirmations,
            swap_confirmations: cfg.swap_confirmations,
        }
    }
}
