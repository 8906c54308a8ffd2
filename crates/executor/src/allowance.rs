//! ERC20 授权管理
//!
//! 状态流转: Unknown -> Checked -> {Sufficient, InsufficientRaised, InsufficientFailed}
//! 只在输入资产不是原生币时使用

use ethers::types::{Address, U256};
use models::TokenConfig;
use tracing::{error, info};
use utils::TRADE_TARGET;

use crate::chain::ChainClient;
use crate::types::{AllowanceState, SwapError};

/// 授权管理器
pub struct AllowanceManager {
    /// approve 交易等待的确认数
    confirmations: usize,
}

impl AllowanceManager {
    pub fn new(confirmations: usize) -> Self {
        Self { confirmations }
    }

    /// 检查余额与授权，不足时按所需数量精确授权
    ///
    /// - 余额不足: 返回 InsufficientFunds，不重试
    /// - 授权足够: Sufficient
    /// - 授权不足: approve(spender, required)，按回执状态得到 InsufficientRaised / InsufficientFailed
    pub async fn ensure_allowance(
        &self,
        client: &dyn ChainClient,
        token: &TokenConfig,
        owner: Address,
        spender: Address,
    ) -> Result<AllowanceState, SwapError> {
        let required = token.amount_in_smallest_unit();

        let balance = client.token_balance(token.address, owner).await?;
        if balance < required {
            return Err(SwapError::InsufficientFunds {
                token: token.symbol,
                balance,
                required,
            });
        }

        let allowance = client.allowance(token.address, owner, spender).await?;
        if allowance >= required {
            info!(target: TRADE_TARGET, "{} 授权充足: {} >= {}", token.symbol, allowance, required);
            return Ok(AllowanceState::Sufficient { allowance });
        }

        info!(target: TRADE_TARGET, "{} 授权不足 ({} < {})，发送 approve", token.symbol, allowance, required);
        self.raise_allowance(client, token, spender, required).await
    }

    async fn raise_allowance(
        &self,
        client: &dyn ChainClient,
        token: &TokenConfig,
        spender: Address,
        required: U256,
    ) -> Result<AllowanceState, SwapError> {
        let outcome = client
            .approve(token.address, spender, required, self.confirmations)
            .await?;

        if outcome.success {
            info!(target: TRADE_TARGET, "✅ Approve 交易执行成功: {:?}", outcome.tx_hash);
            Ok(AllowanceState::InsufficientRaised { tx_hash: outcome.tx_hash })
        } else {
            error!(target: TRADE_TARGET, "❌ Approve 交易失败: {:?}", outcome.tx_hash);
            Ok(AllowanceState::InsufficientFailed { tx_hash: outcome.tx_hash })
        }
    }
}
