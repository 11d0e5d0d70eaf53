use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// A venue-local trading pair identifier, in `base/quote[:settle]` form.
///
/// A `:settle` suffix marks the symbol as a perpetual contract rather than a
/// spot pair (see [`Symbol::is_perpetual`]).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[display("{}", self.as_str())]
pub struct Symbol {
    base: String,
    quote: String,
    settle: Option<String>,
}

impl Symbol {
    pub fn spot(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
            settle: None,
        }
    }

    pub fn perpetual(base: impl Into<String>, quote: impl Into<String>, settle: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
            settle: Some(settle.into()),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    pub fn settle(&self) -> Option<&str> {
        self.settle.as_deref()
    }

    pub fn is_perpetual(&self) -> bool {
        self.settle.is_some()
    }

    pub fn as_str(&self) -> String {
        match &self.settle {
            Some(settle) => format!("{}/{}:{}", self.base, self.quote, settle),
            None => format!("{}/{}", self.base, self.quote),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("invalid symbol `{0}`: expected `base/quote[:settle]`")]
pub struct SymbolParseError(pub String);

impl FromStr for Symbol {
    type Err = SymbolParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (pair, settle) = match s.split_once(':') {
            Some((pair, settle)) => (pair, Some(settle.to_string())),
            None => (s, None),
        };

        let (base, quote) = pair
            .split_once('/')
            .ok_or_else(|| SymbolParseError(s.to_string()))?;

        if base.is_empty() || quote.is_empty() || settle.as_deref() == Some("") {
            return Err(SymbolParseError(s.to_string()));
        }

        Ok(Self {
            base: base.to_string(),
            quote: quote.to_string(),
            settle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spot_symbol() {
        let symbol: Symbol = "BTC/USDT".parse().unwrap();
        assert_eq!(symbol.base(), "BTC");
        assert_eq!(symbol.quote(), "USDT");
        assert!(!symbol.is_perpetual());
    }

    #[test]
    fn parses_perpetual_symbol() {
        let symbol: Symbol = "BTC/USDT:USDT".parse().unwrap();
        assert!(symbol.is_perpetual());
        assert_eq!(symbol.settle(), Some("USDT"));
        assert_eq!(symbol.as_str(), "BTC/USDT:USDT");
    }

    #[test]
    fn rejects_malformed_symbol() {
        assert!("BTCUSDT".parse::<Symbol>().is_err());
        assert!("BTC/".parse::<Symbol>().is_err());
        assert!("BTC/USDT:".parse::<Symbol>().is_err());
    }
}
