use ethers::abi::{encode, Token};
use ethers::types::{Address, Bytes, U256};
use models::{SwapInput, SwapPath, TokenConfig};

use super::route::RouteError;

/// 编码池子 swap 调用数据: abi.encode(address tokenIn, address to, uint8 withdrawMode)
pub fn encode_step_data(token_in: Address, recipient: Address, withdraw_mode: u8) -> Bytes {
    Bytes::from(encode(&[
        Token::Address(token_in),
        Token::Address(recipient),
        Token::Uint(U256::from(withdraw_mode)),
    ]))
}

/// 根据输出代币的路径模板构建本次兑换的路径
///
/// 模板本身不被修改，每次都返回新构建的路径:
/// - 第一条路径第一跳的 data 按 (输入代币, 接收地址, 提现模式) 重新编码
/// - ERC20 输入时，第一跳池子改为输入代币自己的池子，tokenIn 改为输入代币地址
/// - 第一条路径的 amountIn 设为输入数量 (最小单位)
pub fn build_swap_paths(
    input_token: &TokenConfig,
    output_token: &TokenConfig,
    recipient: Address,
    input: &SwapInput,
) -> Result<Vec<SwapPath>, RouteError> {
    let mut paths = output_token.paths.clone();

    let first_path = paths
        .first_mut()
        .ok_or(RouteError::EmptyPath(output_token.symbol))?;
    let first_step = first_path
        .steps
        .first_mut()
        .ok_or(RouteError::EmptyPath(output_token.symbol))?;

    first_step.data = encode_step_data(input_token.address, recipient, output_token.withdraw_mode);

    if let SwapInput::Token { token, pool, .. } = input {
        first_step.pool = *pool;
        first_path.token_in = *token;
    }

    first_path.amount_in = input.amount_in();

    Ok(paths)
}
