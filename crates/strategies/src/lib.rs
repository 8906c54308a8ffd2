//! 兑换运行器
//!
//! - `connector`: 网络连接与账户客户端
//! - `network_filter`: 可用网络筛选
//! - `swap_pipeline`: 单账户兑换流程
//! - `swap_runner`: 网络 / 账户遍历与统计

pub mod connector;
pub mod network_filter;
pub mod swap_pipeline;
pub mod swap_runner;

pub use connector::{ConnectedNetwork, EthersConnector, NetworkConnector};
pub use network_filter::{eligible_networks, is_remote_endpoint};
pub use swap_pipeline::{SwapContext, SwapPipeline};
pub use swap_runner::{RunReport, SwapRunner};
