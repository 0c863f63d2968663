//! Solidity ABI encoding for the rock-paper-scissors contract.
//!
//! Only the shapes this contract uses are supported: static `uint8`,
//! `uint256` and `address` words, function selectors and the `GamePlayed`
//! event whose fields are all non-indexed.

use game_core::{Choice, Outcome, Wei};
use sha3::{Digest, Keccak256};

use crate::types::{Address, GamePlayedEvent, LogEntry, TxHash, parse_block_number};

pub const PLAY_SIGNATURE: &str = "play(uint8)";
pub const WITHDRAW_SIGNATURE: &str = "withdraw()";
pub const MIN_BET_SIGNATURE: &str = "MIN_BET()";
pub const RECIPIENT_SIGNATURE: &str = "RECIPIENT()";
pub const GAME_PLAYED_SIGNATURE: &str = "GamePlayed(address,uint256,uint8,uint8,uint8)";

const WORD: usize = 32;
const GAME_PLAYED_WORDS: usize = 5;

/// ABI decoding and parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbiError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid hex quantity: {0}")]
    InvalidQuantity(String),

    #[error("invalid hex data: {0}")]
    InvalidHex(String),

    #[error("expected {expected} bytes of data, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("log topic {0} is not GamePlayed")]
    UnexpectedTopic(String),

    #[error("value does not fit in the target integer type")]
    ValueOverflow,

    #[error("unknown choice ordinal {0}")]
    UnknownChoice(u8),

    #[error("unknown result ordinal {0}")]
    UnknownOutcome(u8),

    #[error("missing field {0}")]
    MissingField(String),
}

/// First four bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// `keccak256(signature)` as a `0x`-prefixed topic string.
pub fn event_topic(signature: &str) -> String {
    format!("0x{}", hex::encode(Keccak256::digest(signature.as_bytes())))
}

pub fn game_played_topic() -> String {
    event_topic(GAME_PLAYED_SIGNATURE)
}

/// Calldata for a function without arguments.
pub fn encode_call(signature: &str) -> String {
    format!("0x{}", hex::encode(selector(signature)))
}

/// Calldata for `play(uint8)`.
pub fn encode_play(choice: Choice) -> String {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector(PLAY_SIGNATURE));
    data.extend_from_slice(&uint_word(u128::from(choice.ordinal())));
    format!("0x{}", hex::encode(data))
}

/// Extracts the choice from `play(uint8)` calldata.
pub fn decode_play(data: &str) -> Result<Choice, AbiError> {
    let bytes = decode_hex(data)?;
    if bytes.len() != 4 + WORD {
        return Err(AbiError::InvalidLength {
            expected: 4 + WORD,
            actual: bytes.len(),
        });
    }
    if bytes[..4] != selector(PLAY_SIGNATURE) {
        return Err(AbiError::InvalidHex(data.to_string()));
    }
    let ordinal = decode_u8(&bytes[4..])?;
    Choice::from_ordinal(ordinal).ok_or(AbiError::UnknownChoice(ordinal))
}

/// Decodes a single `uint256` return value.
pub fn decode_uint_return(data: &str) -> Result<u128, AbiError> {
    let bytes = decode_hex(data)?;
    let word = single_word(&bytes)?;
    decode_uint(word)
}

/// Decodes a single `address` return value.
pub fn decode_address_return(data: &str) -> Result<Address, AbiError> {
    let bytes = decode_hex(data)?;
    let word = single_word(&bytes)?;
    Address::from_slice(&word[12..]).ok_or_else(|| AbiError::InvalidAddress(data.to_string()))
}

/// Decodes a `GamePlayed` log.
pub fn decode_game_played(log: &LogEntry) -> Result<GamePlayedEvent, AbiError> {
    let topic = game_played_topic();
    match log.topics.first() {
        Some(first) if first.eq_ignore_ascii_case(&topic) => {}
        Some(first) => return Err(AbiError::UnexpectedTopic(first.clone())),
        None => return Err(AbiError::MissingField("topics".to_string())),
    }

    let bytes = decode_hex(&log.data)?;
    if bytes.len() != GAME_PLAYED_WORDS * WORD {
        return Err(AbiError::InvalidLength {
            expected: GAME_PLAYED_WORDS * WORD,
            actual: bytes.len(),
        });
    }
    let word = |index: usize| &bytes[index * WORD..(index + 1) * WORD];

    let player = Address::from_slice(&word(0)[12..])
        .ok_or_else(|| AbiError::InvalidAddress(hex::encode(word(0))))?;
    let bet = Wei(decode_uint(word(1))?);
    let player_ordinal = decode_u8(word(2))?;
    let bot_ordinal = decode_u8(word(3))?;
    let result_ordinal = decode_u8(word(4))?;

    Ok(GamePlayedEvent {
        player,
        bet,
        player_choice: Choice::from_ordinal(player_ordinal)
            .ok_or(AbiError::UnknownChoice(player_ordinal))?,
        bot_choice: Choice::from_ordinal(bot_ordinal).ok_or(AbiError::UnknownChoice(bot_ordinal))?,
        outcome: Outcome::from_ordinal(result_ordinal)
            .ok_or(AbiError::UnknownOutcome(result_ordinal))?,
        block_number: parse_block_number(&log.block_number)?,
        transaction_hash: TxHash::new(log.transaction_hash.clone()),
    })
}

/// Event data for `GamePlayed`, as the contract would emit it.
pub fn encode_game_played(
    player: &Address,
    bet: Wei,
    player_choice: Choice,
    bot_choice: Choice,
    outcome: Outcome,
) -> String {
    let mut data = Vec::with_capacity(GAME_PLAYED_WORDS * WORD);
    data.extend_from_slice(&address_word(player));
    data.extend_from_slice(&uint_word(bet.get()));
    data.extend_from_slice(&uint_word(u128::from(player_choice.ordinal())));
    data.extend_from_slice(&uint_word(u128::from(bot_choice.ordinal())));
    data.extend_from_slice(&uint_word(u128::from(outcome.ordinal())));
    format!("0x{}", hex::encode(data))
}

pub fn address_word(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(&address.to_bytes());
    word
}

pub fn uint_word(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn decode_hex(data: &str) -> Result<Vec<u8>, AbiError> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    hex::decode(digits).map_err(|_| AbiError::InvalidHex(data.to_string()))
}

fn single_word(bytes: &[u8]) -> Result<&[u8], AbiError> {
    if bytes.len() != WORD {
        return Err(AbiError::InvalidLength {
            expected: WORD,
            actual: bytes.len(),
        });
    }
    Ok(bytes)
}

fn decode_uint(word: &[u8]) -> Result<u128, AbiError> {
    if word[..16].iter().any(|b| *b != 0) {
        return Err(AbiError::ValueOverflow);
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(low))
}

fn decode_u8(word: &[u8]) -> Result<u8, AbiError> {
    let value = decode_uint(word)?;
    u8::try_from(value).map_err(|_| AbiError::ValueOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Address {
        Address::parse("0x00000000000000000000000000000000000000aa").unwrap()
    }

    #[test]
    fn selectors_are_keccak_prefixes() {
        // Well-known ERC-20 selector as a sanity check of the hash function.
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(encode_call(WITHDRAW_SIGNATURE).len(), 2 + 8);
        assert_eq!(game_played_topic().len(), 2 + 64);
    }

    #[test]
    fn play_calldata_carries_choice_ordinal() {
        let data = encode_play(Choice::Scissors);
        assert_eq!(data.len(), 2 + 2 * (4 + 32));
        assert!(data.ends_with("02"));
        assert_eq!(decode_play(&data).unwrap(), Choice::Scissors);
    }

    #[test]
    fn decodes_game_played_log() {
        let log = LogEntry {
            address: player(),
            topics: vec![game_played_topic()],
            data: encode_game_played(
                &player(),
                Wei(1_000_000_000_000_000),
                Choice::Paper,
                Choice::Rock,
                Outcome::Win,
            ),
            block_number: "0x7".to_string(),
            transaction_hash: "0xFEED".to_string(),
            log_index: None,
        };

        let event = decode_game_played(&log).unwrap();
        assert_eq!(event.player, player());
        assert_eq!(event.bet, Wei(1_000_000_000_000_000));
        assert_eq!(event.player_choice, Choice::Paper);
        assert_eq!(event.bot_choice, Choice::Rock);
        assert_eq!(event.outcome, Outcome::Win);
        assert_eq!(event.block_number, 7);
        assert_eq!(event.transaction_hash.as_str(), "0xfeed");
    }

    #[test]
    fn rejects_foreign_logs_and_bad_ordinals() {
        let mut log = LogEntry {
            address: player(),
            topics: vec![event_topic("Transfer(address,address,uint256)")],
            data: encode_game_played(&player(), Wei(1), Choice::Rock, Choice::Rock, Outcome::Draw),
            block_number: "0x1".to_string(),
            transaction_hash: "0x01".to_string(),
            log_index: None,
        };
        assert!(matches!(
            decode_game_played(&log),
            Err(AbiError::UnexpectedTopic(_))
        ));

        log.topics = vec![game_played_topic()];
        let mut bytes = hex::decode(&log.data[2..]).unwrap();
        bytes[5 * 32 - 1] = 9;
        log.data = format!("0x{}", hex::encode(bytes));
        assert_eq!(decode_game_played(&log), Err(AbiError::UnknownOutcome(9)));
    }

    #[test]
    fn decodes_view_returns() {
        let data = format!("0x{}", hex::encode(uint_word(1_000_000_000_000_000)));
        assert_eq!(decode_uint_return(&data).unwrap(), 1_000_000_000_000_000);

        let data = format!("0x{}", hex::encode(address_word(&player())));
        assert_eq!(decode_address_return(&data).unwrap(), player());
    }
}
