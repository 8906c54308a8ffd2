//! SyncSwap Router 与 ERC20 合约 ABI 绑定

use ethers::prelude::*;

// SyncSwap Router - swap(SwapPath[] paths, uint amountOutMin, uint deadline)
abigen!(
    SyncSwapRouter,
    r#"[
        {
            "inputs": [
                {
                    "components": [
                        {
                            "components": [
                                {"name": "pool", "type": "address"},
                                {"name": "data", "type": "bytes"},
                                {"name": "callback", "type": "address"},
                                {"name": "callbackData", "type": "bytes"}
                            ],
                            "name": "steps",
                            "type": "tuple[]"
                        },
                        {"name": "tokenIn", "type": "address"},
                        {"name": "amountIn", "type": "uint256"}
                    ],
                    "name": "paths",
                    "type": "tuple[]"
                },
                {"name": "amountOutMin", "type": "uint256"},
                {"name": "deadline", "type": "uint256"}
            ],
            "name": "swap",
            "outputs": [
                {
                    "components": [
                        {"name": "token", "type": "address"},
                        {"name": "amount", "type": "uint256"}
                    ],
                    "name": "amountOut",
                    "type": "tuple"
                }
            ],
            "stateMutability": "payable",
            "type": "function"
        },
        {
            "inputs": [],
            "name": "vault",
            "outputs": [{"name": "", "type": "address"}],
            "stateMutability": "view",
            "type": "function"
        }
    ]"#
);

// ERC20 ABI
abigen!(
    Erc20Token,
    r#"[
        function approve(address spender, uint256 amount) external returns (bool)
        function allowance(address owner, address spender) external view returns (uint256)
        function balanceOf(address account) external view returns (uint256)
    ]"#
);
