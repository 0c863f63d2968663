//! Common types for wallet provider and contract interactions.

use std::fmt;
use std::str::FromStr;

use game_core::{Choice, Outcome, Wei};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::abi::AbiError;

/// 20-byte account or contract address, stored as lowercase `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub const ZERO: &'static str = "0x0000000000000000000000000000000000000000";

    pub fn parse(input: &str) -> Result<Self, AbiError> {
        let hex_str = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .unwrap_or(input);
        let bytes = hex::decode(hex_str).map_err(|_| AbiError::InvalidAddress(input.to_string()))?;
        Self::from_slice(&bytes).ok_or_else(|| AbiError::InvalidAddress(input.to_string()))
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        (bytes.len() == 20).then(|| Self(format!("0x{}", hex::encode(bytes))))
    }

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; 20] {
        let mut out = [0u8; 20];
        // The constructor guarantees 40 valid hex digits.
        if let Ok(bytes) = hex::decode(&self.0[2..]) {
            out.copy_from_slice(&bytes);
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AbiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

/// Transaction hash as returned by `eth_sendTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An EIP-1193 request: `{ method, params }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

/// Parameters of `eth_sendTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    /// Hex quantity in wei.
    pub value: String,
    /// Hex calldata.
    pub data: String,
}

/// Minimal view of `eth_getTransactionReceipt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub block_number: u64,
    /// `true` when the transaction succeeded (`status == 0x1`).
    pub success: bool,
}

impl TransactionReceipt {
    pub fn from_json(value: &Value) -> Result<Self, AbiError> {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .ok_or_else(|| AbiError::MissingField(name.to_string()))
        };

        let transaction_hash = TxHash::new(field("transactionHash")?);
        let block_number = parse_block_number(field("blockNumber")?)?;
        // Pre-Byzantium receipts carry no status; treat them as successful.
        let success = match value.get("status").and_then(Value::as_str) {
            Some(status) => parse_quantity(status)? == 1,
            None => true,
        };

        Ok(Self {
            transaction_hash,
            block_number,
            success,
        })
    }
}

/// Raw log entry as returned by `eth_getLogs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<String>,
    pub data: String,
    pub block_number: String,
    pub transaction_hash: String,
    #[serde(default)]
    pub log_index: Option<String>,
}

/// Decoded `GamePlayed(player, bet, playerChoice, botChoice, result)` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamePlayedEvent {
    pub player: Address,
    pub bet: Wei,
    pub player_choice: Choice,
    pub bot_choice: Choice,
    pub outcome: Outcome,
    pub block_number: u64,
    pub transaction_hash: TxHash,
}

/// Parses an Ethereum hex quantity (`"0x1a"`).
pub fn parse_quantity(input: &str) -> Result<u128, AbiError> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .ok_or_else(|| AbiError::InvalidQuantity(input.to_string()))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16).map_err(|_| AbiError::InvalidQuantity(input.to_string()))
}

/// Parses a hex quantity that must fit in a block number.
pub fn parse_block_number(input: &str) -> Result<u64, AbiError> {
    u64::try_from(parse_quantity(input)?).map_err(|_| AbiError::ValueOverflow)
}

/// Formats an integer as an Ethereum hex quantity (no leading zeros).
pub fn to_quantity(value: u128) -> String {
    format!("{:#x}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_is_normalized() {
        let address = Address::parse("0xAbCdEf0000000000000000000000000000000001").unwrap();
        assert_eq!(address.as_str(), "0xabcdef0000000000000000000000000000000001");
        assert_eq!(
            Address::from_slice(&address.to_bytes()).unwrap(),
            address
        );
        assert!(Address::parse("0x1234").is_err());
        assert!(Address::parse("not-an-address").is_err());
    }

    #[test]
    fn quantities_round_trip_through_hex() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0x38d7ea4c68000").unwrap(), 1_000_000_000_000_000);
        assert_eq!(to_quantity(1_000_000_000_000_000), "0x38d7ea4c68000");
        assert_eq!(to_quantity(0), "0x0");
        assert!(parse_quantity("1234").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn receipt_parses_status() {
        let json = serde_json::json!({
            "transactionHash": "0xABC",
            "blockNumber": "0x10",
            "status": "0x0",
        });
        let receipt = TransactionReceipt::from_json(&json).unwrap();
        assert_eq!(receipt.transaction_hash.as_str(), "0xabc");
        assert_eq!(receipt.block_number, 16);
        assert!(!receipt.success);
    }

    #[test]
    fn block_numbers_beyond_u64_are_rejected() {
        assert_eq!(parse_block_number("0x10").unwrap(), 16);
        assert_eq!(
            parse_block_number("0x10000000000000000"),
            Err(AbiError::ValueOverflow)
        );

        let json = serde_json::json!({
            "transactionHash": "0xabc",
            "blockNumber": "0x10000000000000000",
        });
        assert_eq!(
            TransactionReceipt::from_json(&json),
            Err(AbiError::ValueOverflow)
        );
    }
}
