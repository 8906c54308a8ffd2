//! 兑换执行器模块
//!
//! 负责调用链上合约完成授权与兑换
//!
//! ## 模块结构
//!
//! - `chain`: 链上交互接口 `ChainClient` 及其 ethers 实现
//! - `allowance`: ERC20 授权检查与补足
//! - `swap`: 构建路径并提交 router.swap
//! - `types`: 错误与结果类型

mod allowance;
mod chain;
mod swap;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use allowance::AllowanceManager;
pub use chain::{receipt_outcome, ChainClient, EthersChainClient};
pub use swap::SwapExecutor;
pub use types::{AllowanceState, ExecutorConfig, SwapError, TxOutcome};
