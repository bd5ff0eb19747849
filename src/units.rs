//! Amount and timestamp formatting
//!
//! On-chain amounts are wei (1 ether = 10^18 wei); the feed and the submission
//! form use decimal ether strings. Parsing is strict: malformed input is a
//! `Validation` error, never a silent truncation.

use crate::{Error, Result};
use alloy::primitives::U256;
use chrono::{DateTime, Local};

/// Decimal places of the native token
pub const ETHER_DECIMALS: u32 = 18;

/// Parse a decimal ether string into wei
///
/// Accepts plain unsigned decimals ("1", "0.1", ".5"). Rejects empty input,
/// signs, non-digit characters, more than 18 fractional digits, and values
/// that overflow U256.
pub fn parse_ether(amount: &str) -> Result<U256> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(Error::Validation("amount is empty".to_string()));
    }
    if amount.starts_with('-') || amount.starts_with('+') {
        return Err(Error::Validation(format!(
            "amount must be an unsigned decimal: {}",
            amount
        )));
    }

    let (whole, frac) = match amount.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (amount, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(Error::Validation(format!("malformed amount: {}", amount)));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Validation(format!("malformed amount: {}", amount)));
    }
    if frac.len() > ETHER_DECIMALS as usize {
        return Err(Error::Validation(format!(
            "amount has more than {} decimal places: {}",
            ETHER_DECIMALS, amount
        )));
    }

    let overflow = || Error::Validation(format!("amount out of range: {}", amount));
    let scale = U256::from(10).pow(U256::from(ETHER_DECIMALS));

    let whole_wei = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10)
            .map_err(|_| overflow())?
            .checked_mul(scale)
            .ok_or_else(overflow)?
    };

    let frac_wei = if frac.is_empty() {
        U256::ZERO
    } else {
        // "05" in "1.05" is 5 * 10^(18-2) wei
        let digits = U256::from_str_radix(frac, 10).map_err(|_| overflow())?;
        let shift = U256::from(10).pow(U256::from(ETHER_DECIMALS as usize - frac.len()));
        digits.checked_mul(shift).ok_or_else(overflow)?
    };

    whole_wei.checked_add(frac_wei).ok_or_else(overflow)
}

/// Format a wei amount as a minimal decimal ether string
pub fn format_ether(value: U256) -> String {
    if value.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10).pow(U256::from(ETHER_DECIMALS));
    let whole = value / divisor;
    let remainder = value % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let remainder_str = format!("{:0>width$}", remainder, width = ETHER_DECIMALS as usize);
        let trimmed = remainder_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, trimmed)
        }
    }
}

/// Format a Unix timestamp (seconds) as a local time string
pub fn format_timestamp(secs: u64) -> String {
    DateTime::from_timestamp(secs as i64, 0)
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| secs.to_string())
}
