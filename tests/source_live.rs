//! Live smoke tests against the real price source API.
//!
//! All tests are `#[ignore]` because they require network access.
//!
//! Run with:
//! ```bash
//! cargo test --test source_live -- --ignored
//! ```

use ticker_engine::prelude::*;

fn client() -> CoinGecko {
    CoinGecko::new(DEFAULT_API_URL)
}

#[tokio::test]
#[ignore]
async fn list_assets_contains_bitcoin() {
    let entries = client().list_assets().await.expect("catalog fetch");
    assert!(!entries.is_empty());

    let catalog = AssetCatalog::from_entries(entries);
    assert_eq!(catalog.symbol_for(&CoinId::from("bitcoin")), Some("btc"));
}

#[tokio::test]
#[ignore]
async fn spot_price_for_known_pair() {
    let price = client()
        .spot_price(&CoinId::from("bitcoin"), "usd")
        .await
        .expect("price fetch");
    assert!(price.is_some());
    assert!(price.unwrap() > rust_decimal::Decimal::ZERO);
}

#[tokio::test]
#[ignore]
async fn spot_price_for_mistyped_id_is_not_an_error() {
    let price = client()
        .spot_price(&CoinId::from("definitely-not-a-coin-xyz"), "usd")
        .await
        .expect("request should still succeed");
    assert!(price.is_none());
}
