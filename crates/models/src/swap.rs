use ethers::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::token::TokenConfig;

/// SyncSwap 路由中的单跳
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapStep {
    pub pool: Address,
    /// 池子 swap 调用数据: abi.encode(tokenIn, to, withdrawMode)
    pub data: Bytes,
    pub callback: Address,
    pub callback_data: Bytes,
}

/// SyncSwap 路由中的一条路径
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapPath {
    pub steps: Vec<SwapStep>,
    /// 输入代币，Address::zero() 表示原生币
    pub token_in: Address,
    pub amount_in: U256,
}

/// abigen 生成的 swap 函数期望的路径元组格式
pub type SwapStepTuple = (Address, Bytes, Address, Bytes);
pub type SwapPathTuple = (Vec<SwapStepTuple>, Address, U256);

impl SwapStep {
    pub fn into_tuple(self) -> SwapStepTuple {
        (self.pool, self.data, self.callback, self.callback_data)
    }
}

impl SwapPath {
    /// 转换为 abigen 生成的元组格式
    pub fn into_tuple(self) -> SwapPathTuple {
        (
            self.steps.into_iter().map(SwapStep::into_tuple).collect(),
            self.token_in,
            self.amount_in,
        )
    }
}

/// 价格报价结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    /// 输入数量 (最小单位)
    pub amount_in: U256,
    /// 滑点保护后的最小输出 (输出代币最小单位)
    pub min_amount_out: U256,
}

/// 输入资产类型，在构造兑换尝试时确定一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapInput {
    /// 原生币输入: 交易附带 value
    Native { amount_in: U256 },
    /// ERC20 输入: 需要授权，路径第一跳改写为该代币自己的池子
    Token {
        token: Address,
        pool: Address,
        amount_in: U256,
    },
}

impl SwapInput {
    pub fn amount_in(&self) -> U256 {
        match self {
            SwapInput::Native { amount_in } => *amount_in,
            SwapInput::Token { amount_in, .. } => *amount_in,
        }
    }

    /// 交易需要附带的原生币数量
    pub fn value(&self) -> Option<U256> {
        match self {
            SwapInput::Native { amount_in } => Some(*amount_in),
            SwapInput::Token { .. } => None,
        }
    }
}

/// 单次兑换尝试 (仅在一次兑换期间存在，不重试)
#[derive(Debug, Clone)]
pub struct SwapAttempt {
    pub network: String,
    pub chain_id: u64,
    pub account: Address,
    pub router: Address,
    pub input_token: TokenConfig,
    pub output_token: TokenConfig,
    pub input: SwapInput,
    pub quote: SwapQuote,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_only_for_native() {
        let native = SwapInput::Native { amount_in: U256::from(7u64) };
        let token = SwapInput::Token {
            token: Address::repeat_byte(0x11),
            pool: Address::repeat_byte(0x22),
            amount_in: U256::from(7u64),
        };
        assert_eq!(native.value(), Some(U256::from(7u64)));
        assert_eq!(token.value(), None);
        assert_eq!(native.amount_in(), token.amount_in());
    }

    #[test]
    fn test_path_into_tuple_keeps_order() {
        let path = SwapPath {
            steps: vec![
                SwapStep { pool: Address::repeat_byte(1), ..Default::default() },
                SwapStep { pool: Address::repeat_byte(2), ..Default::default() },
            ],
            token_in: Address::zero(),
            amount_in: U256::from(5u64),
        };
        let (steps, token_in, amount_in) = path.into_tuple();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].0, Address::repeat_byte(1));
        assert_eq!(steps[1].0, Address::repeat_byte(2));
        assert_eq!(token_in, Address::zero());
        assert_eq!(amount_in, U256::from(5u64));
    }
}
