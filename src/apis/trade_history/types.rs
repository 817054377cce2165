/// Trade aggregation response types
use crate::tokens::types::AthRecord;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyInfo {
    #[serde(rename = "MintAddress")]
    pub mint_address: String,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Symbol", default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeInfo {
    #[serde(rename = "Currency")]
    pub currency: CurrencyInfo,
    #[serde(rename = "PriceInUSD", default)]
    pub price_in_usd: Option<f64>,
}

/// One aggregated row per traded mint
#[derive(Debug, Clone, Deserialize)]
pub struct TradeAggregateRow {
    #[serde(rename = "Trade")]
    pub trade: TradeInfo,
    /// Quantile price; the service sends it as a string or a number
    #[serde(default)]
    pub max: Option<Value>,
    /// Server-side market cap; ignored, recomputed from `max` and supply
    #[serde(rename = "ATH_Marketcap", default)]
    pub ath_marketcap: Option<Value>,
}

/// Accept `"0.0042"` or `0.0042`; reject non-finite and negative values
pub fn parse_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (price.is_finite() && price >= 0.0).then_some(price)
}

fn blank_to_none(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Turn aggregate rows into ATH records for the queried mints.
///
/// Market cap is always `price * total_supply`. Rows for mints that were
/// not asked for, or without a usable price, are dropped; duplicates keep
/// the highest price.
pub fn rows_to_ath_records(queried: &[String], rows: &[TradeAggregateRow], total_supply: f64) -> Vec<AthRecord> {
    let wanted: HashSet<&str> = queried.iter().map(String::as_str).collect();
    let mut best: HashMap<String, AthRecord> = HashMap::new();

    for row in rows {
        let mint = row.trade.currency.mint_address.as_str();
        if !wanted.contains(mint) {
            continue;
        }
        let Some(price) = row.max.as_ref().and_then(parse_price) else {
            continue;
        };

        let record = AthRecord {
            mint: mint.to_string(),
            name: blank_to_none(&row.trade.currency.name),
            symbol: blank_to_none(&row.trade.currency.symbol),
            ath_price_usd: price,
            ath_market_cap_usd: price * total_supply,
        };

        match best.get(mint) {
            Some(existing) if existing.ath_price_usd >= price => {}
            _ => {
                best.insert(mint.to_string(), record);
            }
        }
    }

    // Keep the caller's order
    queried.iter().filter_map(|m| best.remove(m)).collect()
}
