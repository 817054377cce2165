/// Pool registry response types
use crate::tokens::types::PoolInfo;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

/// One row of the AMM pool collection
#[derive(Debug, Clone, Deserialize)]
pub struct PoolRow {
    /// Pool account address
    pub pubkey: String,
    pub base_mint: String,
    pub quote_mint: String,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub lp_mint: Option<String>,
    #[serde(default)]
    pub pool_bump: Option<serde_json::Value>,
    #[serde(default)]
    pub pool_quote_token_account: Option<String>,
}

/// Outcome of one pool registry lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BondingStatus {
    /// Mints the registry reports a pool for
    pub bonded: HashSet<String>,
    /// Pool identity per mint, only for `base_mint` matches
    pub pools: HashMap<String, PoolInfo>,
    /// The registry produced a well-formed answer. `false` means "no
    /// evidence this round", not "confirmed unbonded".
    pub answered: bool,
}

impl BondingStatus {
    pub fn no_evidence() -> Self {
        Self::default()
    }

    pub fn is_bonded(&self, mint: &str) -> bool {
        self.bonded.contains(mint)
    }

    pub fn pool_for(&self, mint: &str) -> Option<&PoolInfo> {
        self.pools.get(mint)
    }
}

/// Classify registry rows against the queried mints.
///
/// A mint counts as bonded when it is either side of a pool, but only
/// `base_mint` matches carry pool identity. Quote-side matches therefore
/// take the "bonded without pool" path downstream.
pub fn classify_pool_rows(queried: &[String], rows: &[PoolRow]) -> BondingStatus {
    let wanted: HashSet<&str> = queried.iter().map(String::as_str).collect();
    let mut status = BondingStatus {
        answered: true,
        ..Default::default()
    };

    for row in rows {
        if wanted.contains(row.base_mint.as_str()) {
            status.bonded.insert(row.base_mint.clone());
            status.pools.entry(row.base_mint.clone()).or_insert_with(|| PoolInfo {
                pool_id: row.pubkey.clone(),
                base_mint: row.base_mint.clone(),
                quote_mint: row.quote_mint.clone(),
            });
        }
        if wanted.contains(row.quote_mint.as_str()) {
            status.bonded.insert(row.quote_mint.clone());
        }
    }

    status
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOL: &str = "So11111111111111111111111111111111111111112";

    fn row(pool: &str, base: &str, quote: &str) -> PoolRow {
        PoolRow {
            pubkey: pool.to_string(),
            base_mint: base.to_string(),
            quote_mint: quote.to_string(),
            creator: None,
            lp_mint: None,
            pool_bump: None,
            pool_quote_token_account: None,
        }
    }

    fn queried(mints: &[&str]) -> Vec<String> {
        mints.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_base_match_carries_pool() {
        let status = classify_pool_rows(
            &queried(&["MintA", "MintB", "MintC"]),
            &[row("Pool1", "MintB", SOL)],
        );
        assert!(status.answered);
        assert_eq!(status.bonded.len(), 1);
        assert!(status.is_bonded("MintB"));
        assert!(!status.is_bonded("MintA"));
        assert_eq!(status.pool_for("MintB").map(|p| p.pool_id.as_str()), Some("Pool1"));
    }

    #[test]
    fn test_quote_match_is_bonded_without_pool() {
        let status = classify_pool_rows(&queried(&["MintQ"]), &[row("PoolQ", SOL, "MintQ")]);
        assert!(status.is_bonded("MintQ"));
        assert!(status.pool_for("MintQ").is_none());
        // SOL was not queried, so it is neither bonded nor mapped
        assert!(!status.is_bonded(SOL));
    }

    #[test]
    fn test_first_pool_wins_for_duplicate_base() {
        let status = classify_pool_rows(
            &queried(&["MintB"]),
            &[row("Pool1", "MintB", SOL), row("Pool2", "MintB", SOL)],
        );
        assert_eq!(status.pool_for("MintB").map(|p| p.pool_id.as_str()), Some("Pool1"));
    }

    #[test]
    fn test_no_evidence_is_not_answered() {
        let status = BondingStatus::no_evidence();
        assert!(!status.answered);
        assert!(status.bonded.is_empty() && status.pools.is_empty());
    }
}
