//! Coin — one tracked asset plus its derived display state.
//!
//! Pure data, no I/O. The engine mutates a `Coin` through the reload path
//! (`restore`, values verbatim from storage) and the refresh path
//! (`apply_quote`, which shifts the prior price into `price_previous`).
//! Everything else is derived on read.

pub mod state;

use crate::shared::{round_to_string, CoinId};
use crate::store::{CoinRecord, CoinUpdate};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Placeholder rendered for any value that is not (yet) resolved.
pub const PLACEHOLDER: &str = "...";

/// Neutral price-trend colour, visible on a white background.
const COLOUR_NEUTRAL: &str = "#cc9200";

/// Direction of the last price change, judged on the *rounded* change so
/// the colour never contradicts the displayed `0.00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn colour(&self) -> &'static str {
        match self {
            Trend::Up => "green",
            Trend::Down => "red",
            Trend::Flat => COLOUR_NEUTRAL,
        }
    }
}

/// One tracked asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Coin {
    id: CoinId,
    symbol: Option<String>,
    price: Option<Decimal>,
    price_previous: Option<Decimal>,
    in_message: bool,
    last_updated: Option<DateTime<Utc>>,
}

impl Coin {
    /// A fresh coin with no price history.
    pub fn new(id: CoinId) -> Self {
        Self {
            id,
            symbol: None,
            price: None,
            price_previous: None,
            in_message: false,
            last_updated: None,
        }
    }

    pub fn from_record(record: CoinRecord) -> Self {
        Self {
            id: record.id,
            symbol: record.symbol,
            price: record.price,
            price_previous: record.price_previous,
            in_message: record.in_message,
            last_updated: record.last_updated,
        }
    }

    // ── Mutation ─────────────────────────────────────────────────────────

    /// Overwrite every field from a storage record, in place.
    ///
    /// Reload path: storage is ground truth, including `price_previous`
    /// (which was persisted by the previous cycle) and the dashboard-owned
    /// `in_message` flag.
    pub fn restore(&mut self, record: &CoinRecord) {
        self.symbol = record.symbol.clone();
        self.set_price_with_previous(record.price, record.price_previous);
        self.in_message = record.in_message;
        self.last_updated = record.last_updated;
    }

    /// Record the outcome of a successful refresh.
    ///
    /// The prior `price` becomes `price_previous` — the only rule that ever
    /// overwrites it — and `last_updated` is stamped. `price` may be absent
    /// (pair not found upstream); the previous value still shifts.
    pub fn apply_quote(&mut self, price: Option<Decimal>, at: DateTime<Utc>) {
        self.price_previous = self.price;
        self.price = price;
        self.last_updated = Some(at);
    }

    /// Set `price` and `price_previous` verbatim, bypassing the
    /// previous-tracking rule. Reserved for reload.
    pub fn set_price_with_previous(
        &mut self,
        price: Option<Decimal>,
        previous: Option<Decimal>,
    ) {
        self.price = price;
        self.price_previous = previous;
    }

    pub fn set_symbol(&mut self, symbol: Option<String>) {
        self.symbol = symbol;
    }

    pub fn set_in_message(&mut self, in_message: bool) {
        self.in_message = in_message;
    }

    pub fn set_last_updated(&mut self, at: Option<DateTime<Utc>>) {
        self.last_updated = at;
    }

    // ── Fields ───────────────────────────────────────────────────────────

    pub fn id(&self) -> &CoinId {
        &self.id
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn price(&self) -> Option<Decimal> {
        self.price
    }

    pub fn price_previous(&self) -> Option<Decimal> {
        self.price_previous
    }

    pub fn in_message(&self) -> bool {
        self.in_message
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    // ── Derived state ────────────────────────────────────────────────────

    /// `price - price_previous`; zero on the first observation; absent while
    /// the price itself is absent.
    pub fn price_change(&self) -> Option<Decimal> {
        match (self.price, self.price_previous) {
            (None, _) => None,
            (Some(_), None) => Some(Decimal::ZERO),
            (Some(price), Some(previous)) => Some(price - previous),
        }
    }

    pub fn trend(&self) -> Trend {
        match self.price_change().map(|change| change.round_dp(2)) {
            Some(rounded) if rounded > Decimal::ZERO => Trend::Up,
            Some(rounded) if rounded < Decimal::ZERO => Trend::Down,
            _ => Trend::Flat,
        }
    }

    // ── Display forms ────────────────────────────────────────────────────

    pub fn price_str(&self) -> String {
        match self.price {
            Some(price) => round_to_string(price),
            None => PLACEHOLDER.to_string(),
        }
    }

    pub fn price_change_str(&self) -> String {
        match self.price_change() {
            Some(change) => round_to_string(change),
            None => PLACEHOLDER.to_string(),
        }
    }

    pub fn symbol_str(&self) -> String {
        match &self.symbol {
            Some(symbol) => symbol.clone(),
            None => PLACEHOLDER.to_string(),
        }
    }

    pub fn colour_str(&self) -> &'static str {
        self.trend().colour()
    }

    /// `"checked"` when the coin participates in the announcement message;
    /// consumed verbatim by the dashboard's form rendering.
    pub fn checkbox_str(&self) -> &'static str {
        if self.in_message {
            "checked"
        } else {
            ""
        }
    }

    // ── Persistence views ────────────────────────────────────────────────

    /// The engine-writable slice of this coin's state. Deliberately carries
    /// no `in_message`: that flag is dashboard-owned.
    pub fn update_record(&self) -> CoinUpdate {
        CoinUpdate {
            id: self.id.clone(),
            symbol: self.symbol.clone(),
            price: self.price,
            price_previous: self.price_previous,
            last_updated: self.last_updated,
        }
    }

    pub fn record(&self) -> CoinRecord {
        CoinRecord {
            id: self.id.clone(),
            symbol: self.symbol.clone(),
            price: self.price,
            price_previous: self.price_previous,
            in_message: self.in_message,
            last_updated: self.last_updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn coin_with_price(price: &str) -> Coin {
        let mut coin = Coin::new(CoinId::from("bitcoin"));
        coin.apply_quote(Some(dec(price)), Utc::now());
        coin
    }

    #[test]
    fn test_price_change_absent_without_price() {
        let coin = Coin::new(CoinId::from("bitcoin"));
        assert_eq!(coin.price_change(), None);
        assert_eq!(coin.price_change_str(), PLACEHOLDER);
    }

    #[test]
    fn test_price_change_zero_on_first_observation() {
        let coin = coin_with_price("100.5");
        assert_eq!(coin.price_change(), Some(Decimal::ZERO));
        assert_eq!(coin.price_change_str(), "0.00");
    }

    #[test]
    fn test_price_change_is_difference() {
        let mut coin = coin_with_price("100.00");
        coin.apply_quote(Some(dec("103.25")), Utc::now());
        assert_eq!(coin.price_change(), Some(dec("3.25")));
        assert_eq!(coin.price_previous(), Some(dec("100.00")));
    }

    #[test]
    fn test_apply_quote_shifts_previous_even_when_price_absent() {
        let mut coin = coin_with_price("100.00");
        coin.apply_quote(None, Utc::now());
        assert_eq!(coin.price(), None);
        assert_eq!(coin.price_previous(), Some(dec("100.00")));
        assert_eq!(coin.price_change(), None);
        assert_eq!(coin.price_str(), PLACEHOLDER);
    }

    #[test]
    fn test_trend_uses_rounded_change() {
        let mut coin = coin_with_price("100.000");
        coin.apply_quote(Some(dec("100.001")), Utc::now());
        // Raw change is positive but rounds to 0.00.
        assert_eq!(coin.trend(), Trend::Flat);
        assert_eq!(coin.colour_str(), "#cc9200");

        coin.apply_quote(Some(dec("101.00")), Utc::now());
        assert_eq!(coin.trend(), Trend::Up);
        assert_eq!(coin.colour_str(), "green");

        coin.apply_quote(Some(dec("99.00")), Utc::now());
        assert_eq!(coin.trend(), Trend::Down);
        assert_eq!(coin.colour_str(), "red");
    }

    #[test]
    fn test_checkbox_str() {
        let mut coin = Coin::new(CoinId::from("tron"));
        assert_eq!(coin.checkbox_str(), "");
        coin.set_in_message(true);
        assert_eq!(coin.checkbox_str(), "checked");
    }

    #[test]
    fn test_update_record_has_no_membership_flag() {
        let mut coin = coin_with_price("1.00");
        coin.set_in_message(true);
        coin.set_symbol(Some("btc".into()));
        let update = coin.update_record();
        assert_eq!(update.symbol.as_deref(), Some("btc"));
        assert_eq!(update.price, Some(dec("1.00")));
        // CoinUpdate deliberately has no in_message field; this only checks
        // the id survives the conversion.
        assert_eq!(update.id, CoinId::from("bitcoin"));
    }

    #[test]
    fn test_restore_is_verbatim() {
        let mut coin = coin_with_price("50.00");
        let record = CoinRecord {
            id: CoinId::from("bitcoin"),
            symbol: Some("btc".into()),
            price: Some(dec("60.00")),
            price_previous: Some(dec("55.00")),
            in_message: true,
            last_updated: None,
        };
        coin.restore(&record);
        assert_eq!(coin.price(), Some(dec("60.00")));
        assert_eq!(coin.price_previous(), Some(dec("55.00")));
        assert!(coin.in_message());
        assert_eq!(coin.last_updated(), None);
    }
}
