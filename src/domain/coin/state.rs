//! Watch-set container — engine-owned, reconciled against storage each cycle.

use super::Coin;
use crate::shared::{round_to_string, CoinId};
use crate::store::CoinRecord;

/// The ordered collection of coins currently tracked.
///
/// Ordering follows whatever the persistence gateway returned last, which
/// in turn determines announcement ordering.
#[derive(Debug, Default)]
pub struct WatchSet {
    coins: Vec<Coin>,
}

impl WatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the set from freshly loaded records, reusing the existing
    /// `Coin` for every id that survives.
    ///
    /// Storage is ground truth: ids missing from `records` disappear, new
    /// ids are picked up, and surviving coins are updated in place — never
    /// replaced wholesale — so their identity and any state not present in
    /// the record carry over.
    pub fn reconcile(&mut self, records: Vec<CoinRecord>) {
        let mut previous = std::mem::take(&mut self.coins);
        for record in records {
            match previous.iter().position(|coin| coin.id() == &record.id) {
                Some(index) => {
                    let mut coin = previous.swap_remove(index);
                    coin.restore(&record);
                    self.coins.push(coin);
                }
                None => self.coins.push(Coin::from_record(record)),
            }
        }
    }

    /// The broadcast string for this cycle: `"SYM-1.23"` per participating
    /// coin, single-space separated. Coins excluded from the message, or
    /// with an unresolved symbol or price, are silently skipped.
    pub fn announcement(&self) -> String {
        let parts: Vec<String> = self
            .coins
            .iter()
            .filter(|coin| coin.in_message())
            .filter_map(|coin| {
                let symbol = coin.symbol()?;
                let price = coin.price()?;
                Some(format!("{}-{}", symbol.to_uppercase(), round_to_string(price)))
            })
            .collect();
        parts.join(" ")
    }

    pub fn get(&self, id: &CoinId) -> Option<&Coin> {
        self.coins.iter().find(|coin| coin.id() == id)
    }

    pub fn first(&self) -> Option<&Coin> {
        self.coins.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.coins.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Coin> {
        self.coins.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}
