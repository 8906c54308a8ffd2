//! 网络筛选: 只在远程 HTTP(S) 节点上执行兑换

use config_crate::NetworkConfig;
use url::Url;

/// 被排除的 RPC 地址片段 (本地节点 / 主网)
const EXCLUDED_PATTERNS: [&str; 3] = ["127.0.0.1", "localhost", "eth-mainnet."];

/// 判断 RPC 地址是否可用于兑换
pub fn is_remote_endpoint(rpc_url: &str) -> bool {
    let rpc_url = rpc_url.trim();
    if rpc_url.is_empty() {
        return false;
    }

    let lowered = rpc_url.to_ascii_lowercase();
    if EXCLUDED_PATTERNS.iter().any(|p| lowered.contains(p)) {
        return false;
    }

    match Url::parse(rpc_url) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// 按声明顺序返回可用网络
pub fn eligible_networks(networks: &[NetworkConfig]) -> Vec<&NetworkConfig> {
    networks
        .iter()
        .filter(|n| is_remote_endpoint(&n.rpc_url))
        .collect()
}
