//! Allocation vectors: one exact-decimal weight per asset, in symbol order.

use crate::domain::error::AllocationError;
use rust_decimal::Decimal;
use std::fmt;

/// Number of grid increments between 0.0 and 1.0.
pub const GRID_STEPS: u32 = 10;

/// A symbol paired with its weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetWeight {
    pub symbol: String,
    pub weight: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllocationVector {
    weights: Vec<Decimal>,
}

impl AllocationVector {
    pub fn new(weights: Vec<Decimal>) -> Self {
        Self { weights }
    }

    /// Build from grid units, where one unit is `1 / GRID_STEPS`.
    pub fn from_tenths(units: &[u32]) -> Self {
        Self {
            weights: units
                .iter()
                .map(|&u| Decimal::new(i64::from(u), 1))
                .collect(),
        }
    }

    pub fn weights(&self) -> &[Decimal] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.weights.iter().sum()
    }

    pub fn sums_to_one(&self) -> bool {
        self.total() == Decimal::ONE
    }

    pub fn label(&self, symbols: &[String]) -> Vec<AssetWeight> {
        symbols
            .iter()
            .zip(&self.weights)
            .map(|(symbol, &weight)| AssetWeight {
                symbol: symbol.clone(),
                weight,
            })
            .collect()
    }
}

impl fmt::Display for AllocationVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, w) in self.weights.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{w}")?;
        }
        write!(f, "]")
    }
}

/// Parse a comma-separated weight list such as `0.1,0.2, 0.3,0.4`.
///
/// Each weight is either `0.d` or `1.0`, there must be `expected` of them, and they
/// must total exactly 1.0.
pub fn parse_allocation(input: &str, expected: usize) -> Result<AllocationVector, AllocationError> {
    let units = input
        .split(',')
        .map(|token| parse_tenths(token.trim()))
        .collect::<Result<Vec<u32>, _>>()?;

    if units.len() != expected {
        return Err(AllocationError::WrongCount {
            expected,
            actual: units.len(),
        });
    }

    let allocation = AllocationVector::from_tenths(&units);
    if units.iter().sum::<u32>() != GRID_STEPS {
        return Err(AllocationError::BadTotal {
            total: allocation.total().to_string(),
        });
    }
    Ok(allocation)
}

fn parse_tenths(token: &str) -> Result<u32, AllocationError> {
    let invalid = || AllocationError::InvalidWeight {
        token: token.to_string(),
    };
    match token.as_bytes() {
        b"1.0" => Ok(GRID_STEPS),
        [b'0', b'.', d] if d.is_ascii_digit() => Ok(u32::from(d - b'0')),
        _ => Err(invalid()),
    }
}
