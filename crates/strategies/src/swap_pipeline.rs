//! 单账户兑换流程
//!
//! 路由解析 -> 报价 -> (ERC20 输入) 授权 -> 提交兑换
//! 每一步失败都只终止当前账户的这一次兑换

use config_crate::DexConfig;
use dex::{resolve_route, ResolvedRoute, RouteRequest};
use ethers::types::Address;
use executor::{
    AllowanceManager, AllowanceState, ChainClient, ExecutorConfig, SwapError, SwapExecutor, TxOutcome,
};
use models::{SwapAttempt, SwapInput, SwapQuote};
use rust_decimal::prelude::ToPrimitive;
use services::{PriceQuoter, QuoteRequest};
use tracing::{info, warn};
use utils::TRADE_TARGET;

/// 单次兑换的链上上下文
#[derive(Debug, Clone, Copy)]
pub struct SwapContext<'a> {
    /// 配置中的网络名称 (仅用于日志)
    pub network: &'a str,
    pub chain_id: u64,
    pub account: Address,
    /// 当前链的 DEX 配置，未部署时为 None
    pub dex_config: Option<&'a DexConfig>,
}

/// 兑换流程
pub struct SwapPipeline {
    quoter: PriceQuoter,
    allowance: AllowanceManager,
    executor: SwapExecutor,
}

impl SwapPipeline {
    pub fn new(quoter: PriceQuoter, config: ExecutorConfig) -> Self {
        Self {
            quoter,
            allowance: AllowanceManager::new(config.approve_confirmations),
            executor: SwapExecutor::new(config),
        }
    }

    pub async fn run(
        &self,
        client: &dyn ChainClient,
        ctx: &SwapContext<'_>,
        request: &RouteRequest,
    ) -> Result<TxOutcome, SwapError> {
        // 配置校验在任何链上调用之前完成
        let route = resolve_route(request, ctx.chain_id, ctx.dex_config)?;

        let quote = self.quote(&route).await?;

        if let SwapInput::Token { .. } = route.input {
            let state = self
                .allowance
                .ensure_allowance(client, &route.input_token, ctx.account, route.router)
                .await?;
            if let AllowanceState::InsufficientFailed { tx_hash } = state {
                return Err(SwapError::ApprovalFailed(tx_hash));
            }
        }

        let attempt = SwapAttempt {
            network: ctx.network.to_string(),
            chain_id: ctx.chain_id,
            account: ctx.account,
            router: route.router,
            input_token: route.input_token,
            output_token: route.output_token,
            input: route.input,
            quote,
        };

        self.executor.execute(client, &attempt).await
    }

    /// 最小输出为 0 视为没有可用报价
    async fn quote(&self, route: &ResolvedRoute) -> Result<SwapQuote, SwapError> {
        let amount_in = route.input_token.amount.to_f64().unwrap_or_default();

        let min_amount_out = self
            .quoter
            .min_amount_out(QuoteRequest {
                network_name: &route.network_name,
                pool: route.pool,
                amount_in,
                input_decimals: route.input_token.decimals,
                output_decimals: route.output_token.decimals,
                input_token: route.input_token.address,
            })
            .await;

        if min_amount_out.is_zero() {
            warn!(target: TRADE_TARGET, "{}/{} 报价不可用，放弃兑换",
                route.input_token.symbol, route.output_token.symbol);
            return Err(SwapError::QuoteUnavailable {
                input: route.input_token.symbol,
                output: route.output_token.symbol,
            });
        }

        info!(target: TRADE_TARGET, "{} {} -> 至少 {} (最小单位) {}",
            route.input_token.amount, route.input_token.symbol, min_amount_out, route.output_token.symbol);

        Ok(SwapQuote {
            amount_in: route.input.amount_in(),
            min_amount_out,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use dex::RouteError;
    use ethers::types::U256;
    use executor::testing::{MockChain, RecordedCall};
    use models::{PoolSnapshot, TokenSymbol};
    use services::{PriceOracle, DEFAULT_SLIPPAGE};
    use std::sync::Arc;

    /// 固定价格预言机，base 代币为 zkSync WETH
    pub(crate) struct FixedOracle {
        pub ratio: Option<f64>,
    }

    #[async_trait]
    impl PriceOracle for FixedOracle {
        async fn pool_snapshot(&self, network_name: &str, pool: Address) -> Result<PoolSnapshot> {
            let ratio = self.ratio.ok_or_else(|| anyhow!("oracle offline"))?;
            let cfg = DexConfig::sync_swap_zksync()?;
            let weth = cfg.token(TokenSymbol::Eth).ok_or_else(|| anyhow!("no weth"))?;
            Ok(PoolSnapshot {
                pool,
                quote_price_in_base: ratio,
                base_token_id: format!("{}_{:?}", network_name, weth.address),
            })
        }
    }

    pub(crate) fn pipeline(ratio: Option<f64>) -> SwapPipeline {
        let quoter = PriceQuoter::new(Arc::new(FixedOracle { ratio }), DEFAULT_SLIPPAGE);
        SwapPipeline::new(quoter, ExecutorConfig::default())
    }

    fn request(dex: &str, input: &str, output: &str) -> RouteRequest {
        RouteRequest {
            dex_name: dex.to_string(),
            input: input.to_string(),
            output: output.to_string(),
        }
    }

    fn account() -> Address {
        Address::repeat_byte(0x0a)
    }

    #[tokio::test]
    async fn test_native_input_swaps_without_approval() {
        let cfg = DexConfig::sync_swap_zksync().unwrap();
        let chain = MockChain::default();
        let ctx = SwapContext { network: "zkSync", chain_id: 324, account: account(), dex_config: Some(&cfg) };

        let outcome = pipeline(Some(0.0004))
            .run(&chain, &ctx, &request("SyncSwap", "ETH", "USDC"))
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(chain.approvals().is_empty());
        let swaps = chain.swaps();
        assert_eq!(swaps.len(), 1);
        match &swaps[0] {
            RecordedCall::Swap { value, amount_out_min, .. } => {
                assert_eq!(*value, Some(U256::from(1_000_000_000_000_000u64)));
                assert!(!amount_out_min.is_zero());
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_token_input_approves_then_swaps() {
        let cfg = DexConfig::sync_swap_zksync().unwrap();
        let usdc = cfg.token(TokenSymbol::Usdc).unwrap().clone();
        let chain = MockChain::default();
        chain.set_token_balance(U256::from(5_000_000u64));
        chain.set_allowance(U256::zero());
        let ctx = SwapContext { network: "zkSync", chain_id: 324, account: account(), dex_config: Some(&cfg) };

        pipeline(Some(0.0004))
            .run(&chain, &ctx, &request("SyncSwap", "usdc", "eth"))
            .await
            .unwrap();

        assert_eq!(
            chain.approvals(),
            vec![RecordedCall::Approve {
                token: usdc.address,
                spender: cfg.router,
                amount: U256::from(1_000_000u64),
                confirmations: 2,
            }]
        );
        match &chain.swaps()[0] {
            RecordedCall::Swap { value, .. } => assert_eq!(*value, None),
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejected_pair_makes_no_chain_calls() {
        let cfg = DexConfig::sync_swap_zksync().unwrap();
        let chain = MockChain::default();
        let ctx = SwapContext { network: "zkSync", chain_id: 324, account: account(), dex_config: Some(&cfg) };

        let err = pipeline(Some(0.0004))
            .run(&chain, &ctx, &request("SyncSwap", "USDC", "USDT"))
            .await
            .unwrap_err();

        assert!(err.is_skip());
        assert!(matches!(
            err,
            SwapError::ConfigurationMismatch(RouteError::UnsupportedPairShape { .. })
        ));
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_quote_stops_before_chain_calls() {
        let cfg = DexConfig::sync_swap_zksync().unwrap();
        let chain = MockChain::default();
        let ctx = SwapContext { network: "zkSync", chain_id: 324, account: account(), dex_config: Some(&cfg) };

        let err = pipeline(None)
            .run(&chain, &ctx, &request("SyncSwap", "ETH", "USDC"))
            .await
            .unwrap_err();

        assert!(matches!(err, SwapError::QuoteUnavailable { .. }));
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_approval_skips_swap() {
        let cfg = DexConfig::sync_swap_zksync().unwrap();
        let chain = MockChain::default();
        chain.set_token_balance(U256::from(5_000_000u64));
        chain.set_approve_success(false);
        let ctx = SwapContext { network: "zkSync", chain_id: 324, account: account(), dex_config: Some(&cfg) };

        let err = pipeline(Some(0.0004))
            .run(&chain, &ctx, &request("SyncSwap", "USDC", "ETH"))
            .await
            .unwrap_err();

        assert!(matches!(err, SwapError::ApprovalFailed(_)));
        assert!(chain.swaps().is_empty());
    }
}
