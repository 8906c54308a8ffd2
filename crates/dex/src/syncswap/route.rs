use config_crate::DexConfig;
use ethers::types::Address;
use models::{DexType, SwapInput, TokenConfig, TokenSymbol};
use thiserror::Error;

/// 路由解析失败原因 (均在任何链上调用之前返回)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Unsupported dex: {0}")]
    UnsupportedDex(String),

    #[error("Unknown token symbol: {0}")]
    UnknownToken(String),

    #[error("Unsupported pair shape {input}/{output}: one side must be the native asset")]
    UnsupportedPairShape { input: TokenSymbol, output: TokenSymbol },

    #[error("Dex {dex} is not deployed on chain {chain_id}")]
    NetworkNotConfigured { dex: String, chain_id: u64 },

    #[error("Token {0} is not configured on this network")]
    PairNotConfigured(TokenSymbol),

    #[error("Token {0} has an empty swap path template")]
    EmptyPath(TokenSymbol),
}

/// 兑换请求 (命令行参数)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub dex_name: String,
    pub input: String,
    pub output: String,
}

/// 已校验的交易对
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedPair {
    pub dex: DexType,
    pub input: TokenSymbol,
    pub output: TokenSymbol,
}

/// 解析完成的路由
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub dex: DexType,
    pub network_name: String,
    pub router: Address,
    pub pool: Address,
    pub input_token: TokenConfig,
    pub output_token: TokenConfig,
    pub input: SwapInput,
}

/// 校验 DEX 名称与代币白名单 (不依赖网络)
pub fn parse_pair(request: &RouteRequest) -> Result<ValidatedPair, RouteError> {
    let dex = DexType::from_name(&request.dex_name)
        .ok_or_else(|| RouteError::UnsupportedDex(request.dex_name.clone()))?;

    let input = TokenSymbol::parse(&request.input)
        .ok_or_else(|| RouteError::UnknownToken(request.input.clone()))?;
    let output = TokenSymbol::parse(&request.output)
        .ok_or_else(|| RouteError::UnknownToken(request.output.clone()))?;

    Ok(ValidatedPair { dex, input, output })
}

/// 交易对必须有一边是锚定资产 (链原生币)
pub fn validate_pair(request: &RouteRequest, native: TokenSymbol) -> Result<ValidatedPair, RouteError> {
    let pair = parse_pair(request)?;
    if pair.input != native && pair.output != native {
        return Err(RouteError::UnsupportedPairShape {
            input: pair.input,
            output: pair.output,
        });
    }
    Ok(pair)
}

/// 解析某条链上的兑换路由
///
/// 纯函数: 只读配置，相同输入总是得到相同结果
pub fn resolve_route(
    request: &RouteRequest,
    chain_id: u64,
    dex_config: Option<&DexConfig>,
) -> Result<ResolvedRoute, RouteError> {
    let pair = parse_pair(request)?;

    let dex_config = dex_config
        .filter(|cfg| cfg.dex == pair.dex)
        .ok_or_else(|| RouteError::NetworkNotConfigured {
            dex: request.dex_name.clone(),
            chain_id,
        })?;

    let pair = validate_pair(request, dex_config.native_token)?;

    let input_token = dex_config
        .token(pair.input)
        .cloned()
        .ok_or(RouteError::PairNotConfigured(pair.input))?;
    let output_token = dex_config
        .token(pair.output)
        .cloned()
        .ok_or(RouteError::PairNotConfigured(pair.output))?;

    if output_token.first_pool().is_none() {
        return Err(RouteError::EmptyPath(pair.output));
    }

    let amount_in = input_token.amount_in_smallest_unit();
    let input = if pair.input == dex_config.native_token {
        SwapInput::Native { amount_in }
    } else {
        let pool = input_token
            .first_pool()
            .ok_or(RouteError::EmptyPath(pair.input))?;
        SwapInput::Token {
            token: input_token.address,
            pool,
            amount_in,
        }
    };

    Ok(ResolvedRoute {
        dex: pair.dex,
        network_name: dex_config.network_name.clone(),
        router: dex_config.router,
        pool: dex_config.pool,
        input_token,
        output_token,
        input,
    })
}
