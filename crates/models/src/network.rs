use serde::{Deserialize, Serialize};

/// 已连接的网络端点 (连接成功后 chain_id 才确定)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEndpoint {
    /// 配置中的网络名 (如 zkSync)
    pub name: String,
    pub rpc_url: String,
    pub chain_id: u64,
}

impl NetworkEndpoint {
    pub fn new(name: impl Into<String>, rpc_url: impl Into<String>, chain_id: u64) -> Self {
        Self {
            name: name.into(),
            rpc_url: rpc_url.into(),
            chain_id,
        }
    }
}
