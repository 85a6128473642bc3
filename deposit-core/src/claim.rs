//! Structured parsing of claim text
//!
//! Claims arrive from the chat adapter as `"<transaction id>, <amount>"`.
//! Structural failures surface as [`Error::MalformedClaim`], distinct from
//! any verdict, so the adapter can reply with a format error without a
//! failed attempt being charged.

use crate::{
    error::{Error, Result},
    types::TransactionId,
};

/// A user's assertion that they made a specific deposit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    /// Claimed transaction identifier
    pub transaction_id: TransactionId,

    /// Claimed amount (minor currency unit)
    pub amount: u64,
}

impl Claim {
    /// Parse claim text of the form `"<id>, <amount>"`.
    ///
    /// Exactly one comma; both sides are trimmed; the id must be non-empty
    /// and the amount an unsigned integer. An amount that parses but matches
    /// no transaction is not malformed; it becomes an ordinary rejection.
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split(',').collect();
        if parts.len() != 2 {
            return Err(Error::MalformedClaim(
                "expected \"<transaction id>, <amount>\"".to_string(),
            ));
        }

        let id = parts[0].trim();
        if id.is_empty() {
            return Err(Error::MalformedClaim(
                "transaction id is empty".to_string(),
            ));
        }

        let amount = parts[1].trim().parse::<u64>().map_err(|_| {
            Error::MalformedClaim(format!("amount is not an integer: {:?}", parts[1].trim()))
        })?;

        Ok(Self {
            transaction_id: TransactionId::new(id),
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed() {
        let claim = Claim::parse("843512, 500").unwrap();
        assert_eq!(claim.transaction_id, TransactionId::new("843512"));
        assert_eq!(claim.amount, 500);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let claim = Claim::parse("  843512 ,500 ").unwrap();
        assert_eq!(claim.transaction_id, TransactionId::new("843512"));
        assert_eq!(claim.amount, 500);
    }

    #[test]
    fn test_parse_requires_exactly_one_comma() {
        assert!(matches!(
            Claim::parse("843512 500"),
            Err(Error::MalformedClaim(_))
        ));
        assert!(matches!(
            Claim::parse("843512, 500, 9"),
            Err(Error::MalformedClaim(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_id() {
        assert!(matches!(
            Claim::parse(" , 500"),
            Err(Error::MalformedClaim(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_numeric_amount() {
        assert!(matches!(
            Claim::parse("843512, five hundred"),
            Err(Error::MalformedClaim(_))
        ));
        assert!(matches!(
            Claim::parse("843512, -500"),
            Err(Error::MalformedClaim(_))
        ));
        assert!(matches!(
            Claim::parse("843512,"),
            Err(Error::MalformedClaim(_))
        ));
    }

    #[test]
    fn test_parse_accepts_zero_amount() {
        // Zero parses; it will simply never match a stored row
        let claim = Claim::parse("843512, 0").unwrap();
        assert_eq!(claim.amount, 0);
    }
}
