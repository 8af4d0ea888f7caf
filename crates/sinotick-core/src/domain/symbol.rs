use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const CODE_LEN: usize = 6;
const INDEX_PREFIX: &str = "zs.";

/// Whether a symbol names an individual stock or a market index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityKind {
    Stock,
    Index,
}

/// Normalized A-share security identifier.
///
/// Stocks are bare six-digit codes (`600519`); indexes carry the `zs.`
/// prefix (`zs.000001`), matching the upstream data-source convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol {
    code: String,
    kind: SecurityKind,
}

impl Symbol {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let lowered = trimmed.to_ascii_lowercase();
        let (kind, code) = match lowered.strip_prefix(INDEX_PREFIX) {
            Some(code) => (SecurityKind::Index, code),
            None => (SecurityKind::Stock, lowered.as_str()),
        };

        let len = code.chars().count();
        if len != CODE_LEN {
            return Err(ValidationError::SymbolBadLength { len });
        }

        for (index, ch) in code.chars().enumerate() {
            if !ch.is_ascii_digit() {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
        }

        Ok(Self {
            code: code.to_owned(),
            kind,
        })
    }

    pub const fn kind(&self) -> SecurityKind {
        self.kind
    }

    /// Bare six-digit code without any prefix.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Canonical form: `600519` for stocks, `zs.000001` for indexes.
    pub fn canonical(&self) -> String {
        match self.kind {
            SecurityKind::Stock => self.code.clone(),
            SecurityKind::Index => format!("{INDEX_PREFIX}{}", self.code),
        }
    }

    /// Eastmoney `secid` routing key: `{market}.{code}` where market `1` is
    /// Shanghai and `0` is Shenzhen/Beijing.
    pub fn secid(&self) -> String {
        let market = match self.kind {
            SecurityKind::Stock => {
                if self.code.starts_with('6') || self.code.starts_with('9') {
                    '1'
                } else {
                    '0'
                }
            }
            SecurityKind::Index => {
                if self.code.starts_with('3') {
                    '0'
                } else {
                    '1'
                }
            }
        };
        format!("{market}.{}", self.code)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl FromStr for Symbol {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.canonical()
    }
}
