//! Normalised pool account state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::types::{FeeTier, Pair, ResourceKey};

/// Pool account as delivered by the account watch transport.
///
/// Large integers travel as decimal strings so they survive JSON.
#[derive(Debug, Deserialize)]
struct RawPoolAccount {
    token_x: ResourceKey,
    token_y: ResourceKey,
    fee: Decimal,
    tick_spacing: u16,
    sqrt_price: String,
    current_tick_index: i32,
    liquidity: String,
    #[serde(default)]
    fee_protocol_token_x: u64,
    #[serde(default)]
    fee_protocol_token_y: u64,
    #[serde(default)]
    last_timestamp: i64,
    #[serde(default)]
    slot: u64,
}

/// Decoded state of one concentrated-liquidity pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    /// Lower token mint.
    pub token_x: ResourceKey,
    /// Higher token mint.
    pub token_y: ResourceKey,
    /// Fee tier of the pool.
    pub fee_tier: FeeTier,
    /// Square root of the price as a fixed-point integer.
    pub sqrt_price: u128,
    /// Index of the tick containing the current price.
    pub current_tick_index: i32,
    /// Active liquidity.
    pub liquidity: u128,
    /// Protocol fees accrued in token X.
    pub fee_protocol_token_x: u64,
    /// Protocol fees accrued in token Y.
    pub fee_protocol_token_y: u64,
    /// Unix seconds of the last pool update.
    pub last_timestamp: i64,
    /// Ledger slot the notification was observed at.
    pub slot: u64,
}

impl PoolState {
    /// Decodes a raw notification payload.
    ///
    /// Pure: performs no I/O and never panics on malformed input.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if the payload is not a pool document or holds
    /// impossible values (zero price, zero tick spacing, identical mints).
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let raw: RawPoolAccount = serde_json::from_slice(payload)?;

        if raw.token_x == raw.token_y {
            return Err(DecodeError::invalid_field(
                "token_y",
                "pool tokens must differ",
            ));
        }
        let fee_tier = FeeTier {
            fee: raw.fee,
            tick_spacing: raw.tick_spacing,
        };
        fee_tier
            .check()
            .map_err(|e| DecodeError::invalid_field("fee", e.to_string()))?;

        let sqrt_price = parse_u128("sqrt_price", &raw.sqrt_price)?;
        if sqrt_price == 0 {
            return Err(DecodeError::invalid_field("sqrt_price", "must be non-zero"));
        }
        let liquidity = parse_u128("liquidity", &raw.liquidity)?;

        Ok(Self {
            token_x: raw.token_x,
            token_y: raw.token_y,
            fee_tier,
            sqrt_price,
            current_tick_index: raw.current_tick_index,
            liquidity,
            fee_protocol_token_x: raw.fee_protocol_token_x,
            fee_protocol_token_y: raw.fee_protocol_token_y,
            last_timestamp: raw.last_timestamp,
            slot: raw.slot,
        })
    }

    /// Returns the normalised token pair of the pool.
    #[must_use]
    pub fn pair(&self) -> Option<Pair> {
        Pair::new(self.token_x.clone(), self.token_y.clone()).ok()
    }
}

fn parse_u128(field: &str, value: &str) -> Result<u128, DecodeError> {
    value
        .trim()
        .parse::<u128>()
        .map_err(|e| DecodeError::invalid_field(field, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SOL: &str = "So11111111111111111111111111111111111111112";
    const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    fn payload(sqrt_price: &str, liquidity: &str) -> Vec<u8> {
        format!(
            r#"{{
                "token_x": "{USDC}",
                "token_y": "{SOL}",
                "fee": "0.05",
                "tick_spacing": 10,
                "sqrt_price": "{sqrt_price}",
                "current_tick_index": -2304,
                "liquidity": "{liquidity}",
                "last_timestamp": 1700000000,
                "slot": 231000000
            }}"#
        )
        .into_bytes()
    }

    #[test]
    fn test_decode_valid_pool() {
        let state = PoolState::decode(&payload("1000000000000000000000000", "42")).unwrap();
        assert_eq!(state.fee_tier.fee, dec!(0.05));
        assert_eq!(state.fee_tier.tick_spacing, 10);
        assert_eq!(state.sqrt_price, 1_000_000_000_000_000_000_000_000);
        assert_eq!(state.current_tick_index, -2304);
        assert_eq!(state.liquidity, 42);
        assert_eq!(state.fee_protocol_token_x, 0);
        assert_eq!(state.slot, 231_000_000);
        assert!(state.pair().is_some());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            PoolState::decode(b"\x00\x01not json"),
            Err(DecodeError::InvalidJson { .. })
        ));
        assert!(matches!(
            PoolState::decode(b"{}"),
            Err(DecodeError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_bad_numbers() {
        assert!(matches!(
            PoolState::decode(&payload("0", "1")),
            Err(DecodeError::InvalidField { field, .. }) if field == "sqrt_price"
        ));
        assert!(matches!(
            PoolState::decode(&payload("12", "-5")),
            Err(DecodeError::InvalidField { field, .. }) if field == "liquidity"
        ));
    }

    #[test]
    fn test_decode_rejects_same_tokens() {
        let doc = format!(
            r#"{{"token_x":"{SOL}","token_y":"{SOL}","fee":0.3,"tick_spacing":60,
                "sqrt_price":"5","current_tick_index":0,"liquidity":"0"}}"#
        );
        assert!(matches!(
            PoolState::decode(doc.as_bytes()),
            Err(DecodeError::InvalidField { .. })
        ));
    }
}
