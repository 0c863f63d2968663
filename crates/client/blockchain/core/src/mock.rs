//! Mock wallet provider for testing.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use game_core::{Choice, Outcome, Settlement, Wei};
use serde_json::{Value, json};

use crate::abi::{self, MIN_BET_SIGNATURE, RECIPIENT_SIGNATURE};
use crate::traits::{ProviderError, WalletProvider};
use crate::types::{
    Address, LogEntry, RpcRequest, TransactionRequest, TxHash, parse_block_number, parse_quantity,
    to_quantity,
};

const ONE_ETHER: u128 = 1_000_000_000_000_000_000;
const MIN_BET: u128 = 1_000_000_000_000_000;

/// Mock wallet provider backed by an in-memory chain.
///
/// Simulates the rock-paper-scissors contract: every accepted `play` mines a
/// block, settles the wager and emits a `GamePlayed` log. Bot choices are
/// scripted with [`MockWalletProvider::push_bot_choice`] (rock by default).
#[derive(Clone)]
pub struct MockWalletProvider {
    contract: Address,
    recipient: Address,
    state: Arc<Mutex<MockChain>>,
}

#[derive(Default)]
struct MockChain {
    accounts: Vec<Address>,
    balances: HashMap<Address, u128>,
    block: u64,
    tx_counter: u64,
    receipts: HashMap<TxHash, (u64, bool)>,
    logs: Vec<LogEntry>,
    sent: Vec<TransactionRequest>,
    requests: HashMap<String, usize>,
    bot_choices: VecDeque<Choice>,
    failing_methods: HashSet<String>,
    reject_accounts: bool,
    reject_signing: bool,
    withhold_events: bool,
    receipt_delay: u32,
    pending_polls: HashMap<TxHash, u32>,
}

impl MockWalletProvider {
    /// One funded account (10 ether) and a contract with a 0.001 minimum bet.
    pub fn new() -> Self {
        let player = mock_address(0xaa);
        let mut chain = MockChain {
            accounts: vec![player.clone()],
            block: 1,
            ..MockChain::default()
        };
        chain.balances.insert(player, 10 * ONE_ETHER);

        Self {
            contract: mock_address(0xc0),
            recipient: mock_address(0xee),
            state: Arc::new(Mutex::new(chain)),
        }
    }

    fn chain(&self) -> MutexGuard<'_, MockChain> {
        self.state.lock().unwrap()
    }

    pub fn contract_address(&self) -> &Address {
        &self.contract
    }

    pub fn recipient(&self) -> &Address {
        &self.recipient
    }

    pub fn accounts(&self) -> Vec<Address> {
        self.chain().accounts.clone()
    }

    /// Replaces the authorized accounts, as a wallet account switch would.
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        let mut chain = self.chain();
        for account in &accounts {
            chain.balances.entry(account.clone()).or_insert(0);
        }
        chain.accounts = accounts;
    }

    pub fn set_balance(&self, account: &Address, wei: u128) {
        self.chain().balances.insert(account.clone(), wei);
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.chain().balances.get(account).copied().unwrap_or(0)
    }

    pub fn set_reject_accounts(&self, reject: bool) {
        self.chain().reject_accounts = reject;
    }

    pub fn set_reject_signing(&self, reject: bool) {
        self.chain().reject_signing = reject;
    }

    /// Mined plays produce no `GamePlayed` log while set.
    pub fn set_withhold_events(&self, withhold: bool) {
        self.chain().withhold_events = withhold;
    }

    /// Receipt queries return `null` this many times per transaction.
    pub fn set_receipt_delay(&self, polls: u32) {
        self.chain().receipt_delay = polls;
    }

    /// Makes every request for `method` fail with a network error.
    pub fn fail_method(&self, method: &str, fail: bool) {
        let mut chain = self.chain();
        if fail {
            chain.failing_methods.insert(method.to_string());
        } else {
            chain.failing_methods.remove(method);
        }
    }

    pub fn push_bot_choice(&self, choice: Choice) {
        self.chain().bot_choices.push_back(choice);
    }

    pub fn current_block(&self) -> u64 {
        self.chain().block
    }

    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.chain().sent.clone()
    }

    pub fn request_count(&self, method: &str) -> usize {
        self.chain().requests.get(method).copied().unwrap_or(0)
    }

    /// Mines a block holding a `GamePlayed` log from an unrelated
    /// transaction and returns that transaction's hash.
    pub fn emit_game_played(
        &self,
        player: &Address,
        bet: Wei,
        player_choice: Choice,
        bot_choice: Choice,
        outcome: Outcome,
    ) -> TxHash {
        let mut chain = self.chain();
        let hash = chain.next_hash();
        chain.block += 1;
        let block = chain.block;
        chain.receipts.insert(hash.clone(), (block, true));
        let log = LogEntry {
            address: self.contract.clone(),
            topics: vec![abi::game_played_topic()],
            data: abi::encode_game_played(player, bet, player_choice, bot_choice, outcome),
            block_number: to_quantity(u128::from(block)),
            transaction_hash: hash.to_string(),
            log_index: Some("0x0".to_string()),
        };
        chain.logs.push(log);
        hash
    }

    fn handle(&self, request: &RpcRequest) -> Result<Value, ProviderError> {
        let mut chain = self.chain();
        *chain.requests.entry(request.method.clone()).or_insert(0) += 1;
        if chain.failing_methods.contains(&request.method) {
            return Err(ProviderError::Network(format!("{} unavailable", request.method)));
        }

        match request.method.as_str() {
            "eth_requestAccounts" | "eth_accounts" => {
                if chain.reject_accounts {
                    return Err(ProviderError::UserRejected);
                }
                Ok(json!(chain.accounts))
            }
            "eth_getBalance" => {
                let address = address_param(request, 0)?;
                let balance = chain.balances.get(&address).copied().unwrap_or(0);
                Ok(json!(to_quantity(balance)))
            }
            "eth_blockNumber" => Ok(json!(to_quantity(u128::from(chain.block)))),
            "eth_sendTransaction" => {
                let tx: TransactionRequest = serde_json::from_value(param(request, 0)?.clone())
                    .map_err(|e| ProviderError::invalid_response(&request.method, e))?;
                self.mine(&mut chain, tx).map(|hash| json!(hash.as_str()))
            }
            "eth_getTransactionReceipt" => {
                let hash = TxHash::new(str_param(request, 0)?);
                let Some(&(block, success)) = chain.receipts.get(&hash) else {
                    return Ok(Value::Null);
                };
                let remaining = chain.pending_polls.get(&hash).copied().unwrap_or(0);
                if remaining > 0 {
                    chain.pending_polls.insert(hash, remaining - 1);
                    return Ok(Value::Null);
                }
                Ok(json!({
                    "transactionHash": hash.as_str(),
                    "blockNumber": to_quantity(u128::from(block)),
                    "status": if success { "0x1" } else { "0x0" },
                }))
            }
            "eth_getLogs" => {
                let filter = param(request, 0)?;
                let block_of = |key: &str| {
                    filter
                        .get(key)
                        .and_then(Value::as_str)
                        .and_then(|q| parse_block_number(q).ok())
                };
                let from = block_of("fromBlock").unwrap_or(0);
                let to = block_of("toBlock").unwrap_or(chain.block);
                let logs: Vec<&LogEntry> = chain
                    .logs
                    .iter()
                    .filter(|log| {
                        let block = parse_block_number(&log.block_number).unwrap_or(0);
                        log.address == self.contract && block >= from && block <= to
                    })
                    .collect();
                Ok(json!(logs))
            }
            "eth_call" => {
                let data = param(request, 0)?
                    .get("data")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                if data == abi::encode_call(MIN_BET_SIGNATURE) {
                    Ok(json!(format!("0x{}", hex::encode(abi::uint_word(MIN_BET)))))
                } else if data == abi::encode_call(RECIPIENT_SIGNATURE) {
                    Ok(json!(format!(
                        "0x{}",
                        hex::encode(abi::address_word(&self.recipient))
                    )))
                } else {
                    Err(ProviderError::from_rpc(-32000, "execution reverted"))
                }
            }
            other => Err(ProviderError::from_rpc(
                -32601,
                format!("method {other} not supported"),
            )),
        }
    }

    fn mine(&self, chain: &mut MockChain, tx: TransactionRequest) -> Result<TxHash, ProviderError> {
        if chain.reject_signing {
            return Err(ProviderError::UserRejected);
        }
        let value = parse_quantity(&tx.value)
            .map_err(|e| ProviderError::invalid_response("eth_sendTransaction", e))?;
        let balance = chain.balances.get(&tx.from).copied().unwrap_or(0);
        if balance < value {
            return Err(ProviderError::from_rpc(
                -32000,
                "insufficient funds for gas * price + value",
            ));
        }

        let hash = chain.next_hash();
        chain.block += 1;
        let block = chain.block;
        chain.sent.push(tx.clone());
        if chain.receipt_delay > 0 {
            chain.pending_polls.insert(hash.clone(), chain.receipt_delay);
        }

        let play = (tx.to == self.contract)
            .then(|| abi::decode_play(&tx.data).ok())
            .flatten();
        let Some(player_choice) = play else {
            chain.receipts.insert(hash.clone(), (block, tx.to != self.contract));
            return Ok(hash);
        };
        if value < MIN_BET {
            chain.receipts.insert(hash.clone(), (block, false));
            return Ok(hash);
        }

        let bot_choice = chain.bot_choices.pop_front().unwrap_or(Choice::Rock);
        let outcome = judge(player_choice, bot_choice);
        let balance = chain.balances.entry(tx.from.clone()).or_insert(0);
        *balance -= value;
        if outcome != Outcome::Lose {
            *balance += Settlement::for_outcome(outcome, Wei(value)).amount().get();
        }
        chain.receipts.insert(hash.clone(), (block, true));

        if !chain.withhold_events {
            chain.logs.push(LogEntry {
                address: self.contract.clone(),
                topics: vec![abi::game_played_topic()],
                data: abi::encode_game_played(
                    &tx.from,
                    Wei(value),
                    player_choice,
                    bot_choice,
                    outcome,
                ),
                block_number: to_quantity(u128::from(block)),
                transaction_hash: hash.to_string(),
                log_index: Some("0x0".to_string()),
            });
        }
        Ok(hash)
    }
}

impl Default for MockWalletProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    async fn request(&self, request: RpcRequest) -> Result<Value, ProviderError> {
        self.handle(&request)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

impl MockChain {
    fn next_hash(&mut self) -> TxHash {
        self.tx_counter += 1;
        TxHash::new(format!("0x{:064x}", self.tx_counter))
    }
}

/// Contract rules: rock beats scissors, scissors beats paper, paper beats rock.
fn judge(player: Choice, bot: Choice) -> Outcome {
    use Choice::*;
    match (player, bot) {
        (a, b) if a == b => Outcome::Draw,
        (Rock, Scissors) | (Scissors, Paper) | (Paper, Rock) => Outcome::Win,
        _ => Outcome::Lose,
    }
}

pub fn mock_address(last_byte: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = last_byte;
    Address::from_bytes(bytes)
}

fn param<'a>(request: &'a RpcRequest, index: usize) -> Result<&'a Value, ProviderError> {
    request
        .params
        .get(index)
        .ok_or_else(|| ProviderError::from_rpc(-32602, format!("missing param {index}")))
}

fn str_param<'a>(request: &'a RpcRequest, index: usize) -> Result<&'a str, ProviderError> {
    param(request, index)?
        .as_str()
        .ok_or_else(|| ProviderError::from_rpc(-32602, format!("param {index} is not a string")))
}

fn address_param(request: &RpcRequest, index: usize) -> Result<Address, ProviderError> {
    Address::parse(str_param(request, index)?)
        .map_err(|e| ProviderError::from_rpc(-32602, e.to_string()))
}
