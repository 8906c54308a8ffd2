//! 链上交互接口
//!
//! 兑换流程只依赖 `ChainClient`，实盘使用基于 ethers 的 `EthersChainClient`

use async_trait::async_trait;
use dex::{Erc20Token, SyncSwapRouter};
use ethers::providers::{Middleware, PendingTransaction};
use ethers::types::{Address, TransactionReceipt, H256, U256, U64};
use models::SwapPath;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use utils::TRADE_TARGET;

use crate::types::{SwapError, TxOutcome};

/// 兑换流程需要的链上操作
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// 原生币余额
    async fn native_balance(&self, account: Address) -> Result<U256, SwapError>;

    /// ERC20 余额
    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, SwapError>;

    /// ERC20 授权额度
    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256, SwapError>;

    /// 发送 approve 并等待确认
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        confirmations: usize,
    ) -> Result<TxOutcome, SwapError>;

    /// 发送 router.swap 并等待确认
    ///
    /// `value` 仅在原生币输入时存在
    async fn swap(
        &self,
        router: Address,
        paths: Vec<SwapPath>,
        amount_out_min: U256,
        deadline: U256,
        value: Option<U256>,
        confirmations: usize,
    ) -> Result<TxOutcome, SwapError>;
}

/// 基于 ethers 的链上客户端
pub struct EthersChainClient<M: Middleware + 'static> {
    client: Arc<M>,
    /// 单笔交易确认的超时时间
    confirmation_timeout: Duration,
}

impl<M: Middleware + 'static> EthersChainClient<M> {
    pub fn new(client: Arc<M>, confirmation_timeout_secs: u64) -> Self {
        Self {
            client,
            confirmation_timeout: Duration::from_secs(confirmation_timeout_secs),
        }
    }

    /// 等待交易确认，超时后放弃等待 (交易本身可能仍会上链)
    async fn wait_for_receipt(
        &self,
        pending_tx: PendingTransaction<'_, M::Provider>,
        confirmations: usize,
    ) -> Result<TxOutcome, SwapError> {
        let tx_hash = pending_tx.tx_hash();
        debug!(target: TRADE_TARGET, "等待交易确认: {:?} ({} 个确认)", tx_hash, confirmations);

        let receipt = tokio::time::timeout(
            self.confirmation_timeout,
            pending_tx.confirmations(confirmations),
        )
        .await
        .map_err(|_| SwapError::Timeout(tx_hash))?
        .map_err(|e| SwapError::Transport(format!("{:?}", e)))?;

        match receipt {
            Some(receipt) => Ok(receipt_outcome(tx_hash, &receipt)),
            None => Err(SwapError::Transport(format!("Transaction dropped from mempool: {:?}", tx_hash))),
        }
    }
}

/// 从回执提取结果 (status == 1 视为成功)
pub fn receipt_outcome(tx_hash: H256, receipt: &TransactionReceipt) -> TxOutcome {
    TxOutcome {
        tx_hash,
        block_number: receipt.block_number.map(|n| n.as_u64()),
        success: receipt.status == Some(U64::from(1)),
    }
}

#[async_trait]
impl<M: Middleware + 'static> ChainClient for EthersChainClient<M> {
    async fn native_balance(&self, account: Address) -> Result<U256, SwapError> {
        self.client
            .get_balance(account, None)
            .await
            .map_err(|e| SwapError::Transport(format!("{:?}", e)))
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, SwapError> {
        let erc20 = Erc20Token::new(token, self.client.clone());
        erc20
            .balance_of(owner)
            .call()
            .await
            .map_err(|e| SwapError::Transport(format!("{:?}", e)))
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256, SwapError> {
        let erc20 = Erc20Token::new(token, self.client.clone());
        erc20
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| SwapError::Transport(format!("{:?}", e)))
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        confirmations: usize,
    ) -> Result<TxOutcome, SwapError> {
        let erc20 = Erc20Token::new(token, self.client.clone());
        let call = erc20.approve(spender, amount);

        let pending_tx = call
            .send()
            .await
            .map_err(|e| SwapError::Transport(format!("{:?}", e)))?;
        info!(target: TRADE_TARGET, "approve 已发送: {:?} | token={:?} spender={:?} amount={}",
            pending_tx.tx_hash(), token, spender, amount);

        self.wait_for_receipt(pending_tx, confirmations).await
    }

    async fn swap(
        &self,
        router: Address,
        paths: Vec<SwapPath>,
        amount_out_min: U256,
        deadline: U256,
        value: Option<U256>,
        confirmations: usize,
    ) -> Result<TxOutcome, SwapError> {
        let router_contract = SyncSwapRouter::new(router, self.client.clone());
        let paths = paths.into_iter().map(SwapPath::into_tuple).collect::<Vec<_>>();

        let call = router_contract.swap(paths, amount_out_min, deadline);
        let call = match value {
            Some(value) => call.value(value),
            None => call,
        };

        let pending_tx = call
            .send()
            .await
            .map_err(|e| SwapError::Transport(format!("{:?}", e)))?;
        info!(target: TRADE_TARGET, "swap 已发送: {:?} | router={:?} value={:?}",
            pending_tx.tx_hash(), router, value);

        self.wait_for_receipt(pending_tx, confirmations).await
    }
}
