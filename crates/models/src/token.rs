use ethers::types::{Address, U256};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::swap::SwapPath;

/// 支持的代币符号 (封闭白名单)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenSymbol {
    #[serde(rename = "ETH")]
    Eth,
    #[serde(rename = "USDC")]
    Usdc,
    #[serde(rename = "USDT")]
    Usdt,
    #[serde(rename = "WBTC")]
    Wbtc,
}

impl TokenSymbol {
    pub const ALL: [TokenSymbol; 4] = [
        TokenSymbol::Eth,
        TokenSymbol::Usdc,
        TokenSymbol::Usdt,
        TokenSymbol::Wbtc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenSymbol::Eth => "ETH",
            TokenSymbol::Usdc => "USDC",
            TokenSymbol::Usdt => "USDT",
            TokenSymbol::Wbtc => "WBTC",
        }
    }

    /// 大小写不敏感解析，统一转为大写后匹配
    pub fn parse(symbol: &str) -> Option<Self> {
        let upper = symbol.trim().to_uppercase();
        Self::ALL.iter().copied().find(|s| s.as_str() == upper)
    }
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenSymbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown token symbol: {}", s))
    }
}

/// 单个代币在某条链某个 DEX 下的配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub symbol: TokenSymbol,
    pub address: Address,
    pub decimals: u8,
    /// 每次兑换的数量 (人类可读单位，如 0.001 ETH)
    pub amount: Decimal,
    /// SyncSwap 提现模式 (0=vault 内部, 1=提取并解包原生币, 2=提取 wrapped)
    pub withdraw_mode: u8,
    /// 路径模板 (以原生币输入为前提构建)
    pub paths: Vec<SwapPath>,
}

impl TokenConfig {
    /// 配置数量换算为最小单位: floor(amount * 10^decimals)
    pub fn amount_in_smallest_unit(&self) -> U256 {
        to_smallest_unit(self.amount, self.decimals)
    }

    /// 路径模板中第一跳的池子地址
    pub fn first_pool(&self) -> Option<Address> {
        self.paths
            .first()
            .and_then(|p| p.steps.first())
            .map(|s| s.pool)
    }
}

/// 十进制数量转最小单位整数，向下取整
pub fn to_smallest_unit(amount: Decimal, decimals: u8) -> U256 {
    if amount.is_sign_negative() {
        return U256::zero();
    }
    // Decimal 只有 28 位有效数字，超过 18 位精度的部分用 U256 补齐
    let head = decimals.min(18);
    let scaled = amount
        .checked_mul(Decimal::from(10u64.pow(head as u32)))
        .and_then(|d| d.floor().to_u128())
        .unwrap_or(0);
    U256::from(scaled) * U256::exp10((decimals - head) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_symbol_parse_case_insensitive() {
        assert_eq!(TokenSymbol::parse("eth"), Some(TokenSymbol::Eth));
        assert_eq!(TokenSymbol::parse("UsDc"), Some(TokenSymbol::Usdc));
        assert_eq!(TokenSymbol::parse(" wbtc "), Some(TokenSymbol::Wbtc));
        assert_eq!(TokenSymbol::parse("DOGE"), None);
        assert_eq!(TokenSymbol::parse(""), None);
    }

    #[test]
    fn test_smallest_unit_floor() {
        assert_eq!(
            to_smallest_unit(dec!(0.001), 18),
            U256::from(1_000_000_000_000_000u64)
        );
        assert_eq!(to_smallest_unit(dec!(1.5), 6), U256::from(1_500_000u64));
        // 超出精度的部分被截断
        assert_eq!(to_smallest_unit(dec!(0.0000015), 6), U256::from(1u64));
        assert_eq!(to_smallest_unit(dec!(100), 0), U256::from(100u64));
        assert_eq!(to_smallest_unit(dec!(-1), 18), U256::zero());
    }
}
