//! 内存版链上客户端，记录所有调用，用于测试兑换流程

use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use models::SwapPath;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::chain::ChainClient;
use crate::types::{SwapError, TxOutcome};

/// 记录下来的链上调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    NativeBalance {
        account: Address,
    },
    TokenBalance {
        token: Address,
        owner: Address,
    },
    Allowance {
        token: Address,
        owner: Address,
        spender: Address,
    },
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
        confirmations: usize,
    },
    Swap {
        router: Address,
        paths: Vec<SwapPath>,
        amount_out_min: U256,
        deadline: U256,
        value: Option<U256>,
        confirmations: usize,
    },
}

#[derive(Debug)]
struct MockState {
    native_balances: HashMap<Address, U256>,
    token_balance: U256,
    allowance: U256,
    approve_success: bool,
    swap_success: bool,
    transport_down: bool,
    next_tx: u64,
    calls: Vec<RecordedCall>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            native_balances: HashMap::new(),
            token_balance: U256::zero(),
            allowance: U256::zero(),
            approve_success: true,
            swap_success: true,
            transport_down: false,
            next_tx: 1,
            calls: Vec::new(),
        }
    }
}

/// 内存链
#[derive(Debug, Default)]
pub struct MockChain {
    state: Mutex<MockState>,
}

impl MockChain {
    pub fn set_native_balance(&self, account: Address, balance: U256) {
        self.state.lock().native_balances.insert(account, balance);
    }

    pub fn set_token_balance(&self, balance: U256) {
        self.state.lock().token_balance = balance;
    }

    pub fn set_allowance(&self, allowance: U256) {
        self.state.lock().allowance = allowance;
    }

    pub fn set_approve_success(&self, success: bool) {
        self.state.lock().approve_success = success;
    }

    pub fn set_swap_success(&self, success: bool) {
        self.state.lock().swap_success = success;
    }

    /// 模拟 RPC 不可用
    pub fn set_transport_down(&self, down: bool) {
        self.state.lock().transport_down = down;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    pub fn approvals(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, RecordedCall::Approve { .. }))
            .collect()
    }

    pub fn swaps(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, RecordedCall::Swap { .. }))
            .collect()
    }

    fn record(&self, call: RecordedCall) -> Result<(), SwapError> {
        let mut state = self.state.lock();
        state.calls.push(call);
        if state.transport_down {
            return Err(SwapError::Transport("rpc unavailable".to_string()));
        }
        Ok(())
    }

    fn next_outcome(&self, success: bool) -> TxOutcome {
        let mut state = self.state.lock();
        let n = state.next_tx;
        state.next_tx += 1;
        TxOutcome {
            tx_hash: H256::from_low_u64_be(n),
            block_number: Some(n),
            success,
        }
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn native_balance(&self, account: Address) -> Result<U256, SwapError> {
        self.record(RecordedCall::NativeBalance { account })?;
        Ok(self
            .state
            .lock()
            .native_balances
            .get(&account)
            .copied()
            .unwrap_or_default())
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, SwapError> {
        self.record(RecordedCall::TokenBalance { token, owner })?;
        Ok(self.state.lock().token_balance)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256, SwapError> {
        self.record(RecordedCall::Allowance { token, owner, spender })?;
        Ok(self.state.lock().allowance)
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        confirmations: usize,
    ) -> Result<TxOutcome, SwapError> {
        self.record(RecordedCall::Approve { token, spender, amount, confirmations })?;
        let success = self.state.lock().approve_success;
        if success {
            self.state.lock().allowance = amount;
        }
        Ok(self.next_outcome(success))
    }

    async fn swap(
        &self,
        router: Address,
        paths: Vec<SwapPath>,
        amount_out_min: U256,
        deadline: U256,
        value: Option<U256>,
        confirmations: usize,
    ) -> Result<TxOutcome, SwapError> {
        self.record(RecordedCall::Swap {
            router,
            paths,
            amount_out_min,
            deadline,
            value,
            confirmations,
        })?;
        let success = self.state.lock().swap_success;
        Ok(self.next_outcome(success))
    }
}
