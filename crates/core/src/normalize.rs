//! Normalization helpers for free-text fields scraped from research pages.
//!
//! All of these are total: malformed input maps to `None` (or
//! [`RatingCode::None`]), never to an error.

use serde::{Deserialize, Serialize};

/// Canonical analyst sentiment codes. Seeded into the `ratings` table at
/// startup; `reports.rating_code` is constrained to this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatingCode {
    Buy,
    Sell,
    Hold,
    None,
}

impl RatingCode {
    pub const ALL: [RatingCode; 4] = [
        RatingCode::Buy,
        RatingCode::Sell,
        RatingCode::Hold,
        RatingCode::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RatingCode::Buy => "Buy",
            RatingCode::Sell => "Sell",
            RatingCode::Hold => "Hold",
            RatingCode::None => "None",
        }
    }

    /// Seed description shown to readers (the site is Korean-language).
    pub fn description(&self) -> &'static str {
        match self {
            RatingCode::Buy => "매수",
            RatingCode::Sell => "매도",
            RatingCode::Hold => "보유/중립",
            RatingCode::None => "투자의견 없음",
        }
    }
}

/// Trims the input; empty strings become `None`.
pub fn normalize_str(s: Option<&str>) -> Option<String> {
    let t = s?.trim();
    if t.is_empty() {
        return None;
    }
    Some(t.to_string())
}

/// Parses integers as they appear on research pages ("1,234" etc.).
pub fn parse_int(value: Option<&str>) -> Option<i64> {
    let v = value?.replace(',', "");
    let t = v.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<i64>().ok()
}

/// Float companion to [`parse_int`], same comma and whitespace rules.
pub fn parse_float(value: Option<&str>) -> Option<f64> {
    let v = value?.replace(',', "");
    let t = v.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok()
}

/// Maps free-text rating labels to a canonical code.
///
/// Brokers write the same opinion a dozen ways (매수, BUY, Trading Buy, ...);
/// anything unrecognized collapses to `None` rather than failing the row.
pub fn normalize_rating(raw: Option<&str>) -> RatingCode {
    let Some(raw) = raw else {
        return RatingCode::None;
    };

    let s = raw.trim().to_lowercase();
    match s.as_str() {
        "" | "nr" | "투자의견없음" | "n/a" | "na" | "notrated" | "-" => RatingCode::None,
        "buy" | "매수" | "tradingbuy" => RatingCode::Buy,
        "hold" => RatingCode::Hold,
        "sell" | "매도" | "underperform" => RatingCode::Sell,
        _ => RatingCode::None,
    }
}
