//! Positional addressing for collections.
//!
//! Id-bearing collections are addressed 1-based, skills 0-based. The two
//! schemes are kept as an explicit per-record contract instead of being
//! unified, since clients already depend on both.

use crate::store::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// Positions run `1..=len`.
    OneBased,
    /// Positions run `0..len`.
    ZeroBased,
}

impl Addressing {
    pub fn lower_bound(self) -> usize {
        match self {
            Addressing::OneBased => 1,
            Addressing::ZeroBased => 0,
        }
    }

    /// Parses a raw `index` token into a position.
    ///
    /// Non-numeric tokens are an `InvalidArgument`. Tokens that are numeric
    /// but can never address an element (negative, or too large for `usize`)
    /// are `OutOfRange`.
    pub fn parse(self, token: &str) -> Result<usize, StoreError> {
        let (negative, digits) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(StoreError::InvalidArgument(
                "Index must be a number".to_string(),
            ));
        }

        if negative {
            return Err(out_of_range(token));
        }

        digits.parse::<usize>().map_err(|_| out_of_range(token))
    }

    /// Converts a position into a slot of a `len`-element sequence.
    pub fn slot(self, position: usize, len: usize) -> Result<usize, StoreError> {
        let in_range = match self {
            Addressing::OneBased => position >= 1 && position <= len,
            Addressing::ZeroBased => position < len,
        };

        if !in_range {
            return Err(out_of_range(&position.to_string()));
        }
        Ok(position - self.lower_bound())
    }

    /// `parse` followed by `slot`.
    pub fn resolve(self, token: &str, len: usize) -> Result<usize, StoreError> {
        let position = self.parse(token)?;
        self.slot(position, len)
    }
}

fn out_of_range(index: &str) -> StoreError {
    StoreError::OutOfRange {
        index: index.to_string(),
    }
}
