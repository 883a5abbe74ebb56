//! Asset universe: the ordered, duplicate-free symbol list a simulation runs over.

use crate::domain::error::SymbolError;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Universe {
    pub symbols: Vec<String>,
    pub benchmark: String,
}

impl Universe {
    pub fn count(&self) -> usize {
        self.symbols.len()
    }
}

pub fn parse_symbols(input: &str) -> Result<Vec<String>, SymbolError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(SymbolError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(SymbolError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// Reject any symbol outside `allowed`. An empty whitelist allows everything.
pub fn check_allowed(symbols: &[String], allowed: &[String]) -> Result<(), SymbolError> {
    if allowed.is_empty() {
        return Ok(());
    }
    match symbols.iter().find(|s| !allowed.contains(s)) {
        Some(s) => Err(SymbolError::NotInUniverse(s.clone())),
        None => Ok(()),
    }
}
