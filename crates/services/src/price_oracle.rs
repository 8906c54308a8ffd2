use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ethers::types::Address;
use models::PoolSnapshot;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use utils::ORACLE_TARGET;

/// 池子价格预言机
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// 获取池子当前价格快照
    async fn pool_snapshot(&self, network_name: &str, pool: Address) -> Result<PoolSnapshot>;
}

/// GeckoTerminal 池子响应
#[derive(Debug, Deserialize)]
struct PoolResponse {
    data: PoolData,
}

#[derive(Debug, Deserialize)]
struct PoolData {
    attributes: PoolAttributes,
    relationships: PoolRelationships,
}

#[derive(Debug, Deserialize)]
struct PoolAttributes {
    quote_token_price_base_token: String,
}

#[derive(Debug, Deserialize)]
struct PoolRelationships {
    base_token: RelationshipRef,
}

#[derive(Debug, Deserialize)]
struct RelationshipRef {
    data: RelationshipData,
}

#[derive(Debug, Deserialize)]
struct RelationshipData {
    id: String,
}

/// GeckoTerminal 预言机客户端
pub struct GeckoTerminalOracle {
    base_url: String,
    http_client: reqwest::Client,
}

impl GeckoTerminalOracle {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }

    fn pool_url(&self, network_name: &str, pool: Address) -> String {
        format!("{}/networks/{}/pools/{:?}", self.base_url, network_name, pool)
    }
}

#[async_trait]
impl PriceOracle for GeckoTerminalOracle {
    async fn pool_snapshot(&self, network_name: &str, pool: Address) -> Result<PoolSnapshot> {
        let url = self.pool_url(network_name, pool);
        debug!(target: ORACLE_TARGET, "请求池子价格: {}", url);

        let response = self
            .http_client
            .get(&url)
            .header("accept", "application/json")
            .send()
            .await?
            .error_for_status()?;
        let body: PoolResponse = response.json().await?;

        parse_snapshot(pool, body)
    }
}

fn parse_snapshot(pool: Address, body: PoolResponse) -> Result<PoolSnapshot> {
    let raw_price = body.data.attributes.quote_token_price_base_token;
    let quote_price_in_base: f64 = raw_price
        .trim()
        .parse()
        .with_context(|| format!("Invalid quote_token_price_base_token: {}", raw_price))?;
    if !quote_price_in_base.is_finite() {
        return Err(anyhow!("Non-finite price ratio: {}", raw_price));
    }

    Ok(PoolSnapshot {
        pool,
        quote_price_in_base,
        base_token_id: body.data.relationships.base_token.data.id,
    })
}
