use ethers::types::Address;
use serde::{Deserialize, Serialize};

/// DEX 类型 (当前只接入 SyncSwap)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DexType {
    SyncSwap,
}

impl DexType {
    pub fn name(&self) -> &'static str {
        match self {
            DexType::SyncSwap => "SyncSwap",
        }
    }

    /// 按名称精确匹配 (区分大小写)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SyncSwap" => Some(DexType::SyncSwap),
            _ => None,
        }
    }
}

/// 预言机返回的池子价格快照
#[derive(Debug, Clone, PartialEq)]
pub struct PoolSnapshot {
    pub pool: Address,
    /// quote 代币以 base 代币计价的价格
    pub quote_price_in_base: f64,
    /// base 代币的组合标识: "{network}_{address}"
    pub base_token_id: String,
}

impl PoolSnapshot {
    /// 判断给定代币是否为池子的 base 代币
    pub fn is_base_token(&self, network_name: &str, token: Address) -> bool {
        let expected = format!("{}_{:?}", network_name, token);
        self.base_token_id.eq_ignore_ascii_case(&expected)
    }
}
