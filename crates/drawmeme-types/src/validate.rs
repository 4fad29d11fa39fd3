//! Input checks run by the request layer before values reach the registry.

use crate::{
    MAX_SOLANA_ADDRESS_LEN, MAX_TICKER_LEN, MAX_TOKEN_NAME_LEN, MIN_SOLANA_ADDRESS_LEN,
    MIN_TICKER_LEN,
};

/// Validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid Solana address format")]
    SolanaAddress,

    #[error("Token name is required")]
    EmptyName,

    #[error("Token name must be at most {MAX_TOKEN_NAME_LEN} characters")]
    NameTooLong,

    #[error("Ticker must be {MIN_TICKER_LEN}-{MAX_TICKER_LEN} characters")]
    TickerLength,
}

/// Base58 alphabet: digits 1-9 and latin letters without `0`, `O`, `I`, `l`.
fn is_base58(c: char) -> bool {
    matches!(c, '1'..='9' | 'A'..='H' | 'J'..='N' | 'P'..='Z' | 'a'..='k' | 'm'..='z')
}

/// Check that `address` looks like a base58 Solana public key.
pub fn solana_address(address: &str) -> Result<(), ValidationError> {
    let len = address.chars().count();
    if !(MIN_SOLANA_ADDRESS_LEN..=MAX_SOLANA_ADDRESS_LEN).contains(&len) {
        return Err(ValidationError::SolanaAddress);
    }
    if !address.chars().all(is_base58) {
        return Err(ValidationError::SolanaAddress);
    }
    Ok(())
}

/// Trim and check a token name. Returns the trimmed name.
pub fn token_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > MAX_TOKEN_NAME_LEN {
        return Err(ValidationError::NameTooLong);
    }
    Ok(name.to_string())
}

/// Trim, upper-case and check a ticker. Returns the normalized ticker.
pub fn ticker(ticker: &str) -> Result<String, ValidationError> {
    let ticker = ticker.trim().to_uppercase();
    let len = ticker.chars().count();
    if !(MIN_TICKER_LEN..=MAX_TICKER_LEN).contains(&len) {
        return Err(ValidationError::TickerLength);
    }
    Ok(ticker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_solana_address() {
        assert!(solana_address("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU").is_ok());
        assert!(solana_address(&"1".repeat(32)).is_ok());
    }

    #[test]
    fn test_rejects_non_base58() {
        // '0', 'O', 'I', 'l' are outside the alphabet
        assert_eq!(
            solana_address("0xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU"),
            Err(ValidationError::SolanaAddress)
        );
        assert!(solana_address("lxKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU").is_err());
        assert!(solana_address("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJos-AsU").is_err());
    }

    #[test]
    fn test_rejects_bad_length() {
        assert!(solana_address("").is_err());
        assert!(solana_address(&"1".repeat(31)).is_err());
        assert!(solana_address(&"1".repeat(45)).is_err());
    }

    #[test]
    fn test_token_name() {
        assert_eq!(token_name("  Doge  ").as_deref(), Ok("Doge"));
        assert_eq!(token_name("   "), Err(ValidationError::EmptyName));
        assert_eq!(token_name(&"a".repeat(50)).map(|n| n.len()), Ok(50));
        assert_eq!(token_name(&"a".repeat(51)), Err(ValidationError::NameTooLong));
    }

    #[test]
    fn test_ticker_normalized() {
        assert_eq!(ticker(" doge ").as_deref(), Ok("DOGE"));
        assert_eq!(ticker("d"), Err(ValidationError::TickerLength));
        assert_eq!(ticker("abcdefghijk"), Err(ValidationError::TickerLength));
        assert_eq!(ticker("abcdefghij").as_deref(), Ok("ABCDEFGHIJ"));
    }
}
