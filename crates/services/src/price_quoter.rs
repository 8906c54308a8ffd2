use ethers::types::{Address, U256};
use models::PoolSnapshot;
use std::sync::Arc;
use tracing::{info, warn};
use utils::ORACLE_TARGET;

use crate::price_oracle::PriceOracle;

/// 默认滑点 5%
pub const DEFAULT_SLIPPAGE: f64 = 0.05;

/// 报价请求
#[derive(Debug, Clone, Copy)]
pub struct QuoteRequest<'a> {
    pub network_name: &'a str,
    pub pool: Address,
    /// 输入数量 (人类可读单位)
    pub amount_in: f64,
    pub input_decimals: u8,
    pub output_decimals: u8,
    pub input_token: Address,
}

/// 价格报价器: 预言机价格 + 固定滑点 -> 最小输出
pub struct PriceQuoter {
    oracle: Arc<dyn PriceOracle>,
    slippage: f64,
}

impl PriceQuoter {
    pub fn new(oracle: Arc<dyn PriceOracle>, slippage: f64) -> Self {
        Self { oracle, slippage }
    }

    /// 计算最小输出 (输出代币最小单位)
    ///
    /// 任何失败都返回 0，表示没有可用报价，由调用方终止本次兑换
    pub async fn min_amount_out(&self, request: QuoteRequest<'_>) -> U256 {
        let snapshot = match self
            .oracle
            .pool_snapshot(request.network_name, request.pool)
            .await
        {
            Ok(s) => s,
            Err(e) => {
                warn!(target: ORACLE_TARGET, "获取池子价格失败 [{}] {:?}: {:?}", request.network_name, request.pool, e);
                return U256::zero();
            }
        };

        let amount_out = compute_min_amount_out(&snapshot, &request, self.slippage);
        info!(
            target: ORACLE_TARGET,
            "报价: 池子 {:?} 价格比 {} -> 最小输出 {}",
            snapshot.pool, snapshot.quote_price_in_base, amount_out
        );
        amount_out
    }
}

/// 根据池子快照计算滑点保护后的最小输出
///
/// 两个分支的换算公式保持与线上行为逐位一致 (f64 运算):
/// - 输入为 base: q = amount * 10^quote / (ratio * 10^base)，结果 q * 10^base
/// - 输入为 quote: b = amount * ratio / 10^(quote - base)，结果 b * 10^quote
pub fn compute_min_amount_out(snapshot: &PoolSnapshot, request: &QuoteRequest<'_>, slippage: f64) -> U256 {
    let ratio = snapshot.quote_price_in_base;
    if !ratio.is_finite() || ratio <= 0.0 {
        return U256::zero();
    }

    let amount_in = request.amount_in;
    let raw = if snapshot.is_base_token(request.network_name, request.input_token) {
        let base_decimals = request.input_decimals as i32;
        let quote_decimals = request.output_decimals as i32;
        let quantity_in_quote =
            (amount_in * 10f64.powi(quote_decimals)) / (ratio * 10f64.powi(base_decimals));
        quantity_in_quote * 10f64.powi(base_decimals) * (1.0 - slippage)
    } else {
        let base_decimals = request.output_decimals as i32;
        let quote_decimals = request.input_decimals as i32;
        let quantity_in_base = (amount_in * ratio) / 10f64.powi(quote_decimals - base_decimals);
        quantity_in_base * 10f64.powi(quote_decimals) * (1.0 - slippage)
    };

    let floored = raw.floor();
    if !floored.is_finite() || floored <= 0.0 {
        return U256::zero();
    }
    // f64 的十进制展开不含指数，可以直接按整数解析；超出 256 位视为无报价
    U256::from_dec_str(&format!("{:.0}", floored)).unwrap_or_default()
}
