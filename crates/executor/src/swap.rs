//! SyncSwap 兑换执行

use dex::build_swap_paths;
use ethers::types::U256;
use models::SwapAttempt;
use tracing::{error, info};
use utils::TRADE_TARGET;

use crate::chain::ChainClient;
use crate::types::{ExecutorConfig, SwapError, TxOutcome};

/// 兑换执行器
pub struct SwapExecutor {
    config: ExecutorConfig,
}

impl SwapExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// 当前时间 + 偏移量
    fn deadline(&self) -> U256 {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        U256::from(now + self.config.deadline_offset_secs)
    }

    /// 构建路径并提交 router.swap，等待确认
    ///
    /// 调用前授权 (ERC20 输入) 必须已经处理完毕
    pub async fn execute(
        &self,
        client: &dyn ChainClient,
        attempt: &SwapAttempt,
    ) -> Result<TxOutcome, SwapError> {
        let paths = build_swap_paths(
            &attempt.input_token,
            &attempt.output_token,
            attempt.account,
            &attempt.input,
        )?;

        let deadline = self.deadline();
        let value = attempt.input.value();

        info!(target: TRADE_TARGET, "🚀 [{} #{}] {} -> {} | 账户={:?} amountIn={} minOut={} deadline={}",
            attempt.network,
            attempt.chain_id,
            attempt.input_token.symbol,
            attempt.output_token.symbol,
            attempt.account,
            attempt.quote.amount_in,
            attempt.quote.min_amount_out,
            deadline);

        let outcome = client
            .swap(
                attempt.router,
                paths,
                attempt.quote.min_amount_out,
                deadline,
                value,
                self.config.swap_confirmations,
            )
            .await?;

        if !outcome.success {
            error!(target: TRADE_TARGET, "❌ [{} #{}] 兑换交易失败: {:?} (区块 {:?})",
                attempt.network, attempt.chain_id, outcome.tx_hash, outcome.block_number);
            return Err(SwapError::SwapFailed(outcome.tx_hash));
        }

        info!(target: TRADE_TARGET, "✅ [{} #{}] 兑换成功: {:?} (区块 {:?})",
            attempt.network, attempt.chain_id, outcome.tx_hash, outcome.block_number);
        Ok(outcome)
    }
}
