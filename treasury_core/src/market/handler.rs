use std::time::{Duration, Instant};

use futures::future::join_all;
use log::{info, warn};

use crate::coingecko::handler::CHIA;
use crate::dexie::handler::TickerBook;
use crate::helpers::{
    dto::{Outcome, PriceQuote, PriceSource},
    rate_limit::Lane,
};
use crate::market::dto::{MarketBoard, TreasuryWallets, WalletSnapshot, WalletToken};
use crate::providers::Providers;
use crate::spacescan::handler::tail;

pub const XCH_PRICE_TIMEOUT: Duration = Duration::from_secs(6);
pub const CAT_INFO_TIMEOUT: Duration = Duration::from_secs(5);
pub const WALLET_NFT_TIMEOUT: Duration = Duration::from_secs(12);
pub const WALLET_TOKEN_TIMEOUT: Duration = Duration::from_secs(25);

/// Prices every tracked asset. Per asset the first positive quote wins, in
/// order: asset metadata, exchange ticker list, lowest open ask. The ticker
/// list and the XCH rate are fetched alongside the metadata pass.
pub async fn market_prices(providers: &Providers) -> Outcome<MarketBoard> {
    let ids = &providers.market_cat_ids;

    let xch = providers
        .coingecko
        .usd_price_or(CHIA, providers.fallback_prices.xch_usd, XCH_PRICE_TIMEOUT);
    let tickers = providers.dexie.tickers();
    let metadata = async {
        let mut quotes = Vec::with_capacity(ids.len());
        for id in ids {
            providers.limiter.acquire(Lane::SpacescanCatInfo).await;
            quotes.push(providers.spacescan.cat_quote(id, CAT_INFO_TIMEOUT).await);
        }
        quotes
    };

    let ((xch_usd, xch_source), book, metadata) = tokio::join!(xch, tickers, metadata);

    let mut warnings = Vec::new();
    if xch_source == PriceSource::Fallback {
        warnings.push(format!("XCH price unavailable, using fallback {}", xch_usd));
    }

    let (mut board, unresolved) = first_pass(ids, metadata, &book, xch_usd);

    if !unresolved.is_empty() {
        let asks = join_all(unresolved.iter().map(|id| providers.dexie.best_ask(id, xch_usd))).await;
        for (id, ask) in unresolved.iter().zip(asks) {
            match ask {
                Some(quote) => board.insert(id, quote),
                None => {
                    warnings.push(format!("no price for {}", id));
                    board.insert(id, PriceQuote::missing());
                }
            }
        }
    }

    info!("[MARKET] {}/{} assets priced, xch ${}", board.priced(), ids.len(), xch_usd);

    if !ids.is_empty() && board.priced() == 0 {
        return Outcome::Failed {
            error: "no market prices available".to_string(),
        };
    }
    Outcome::from_parts(board, warnings)
}

/// Applies the metadata quotes and the ticker book; returns the board so far and
/// the assets that still need an order-book quote.
pub fn first_pass(
    ids: &[String],
    metadata: Vec<Option<PriceQuote>>,
    book: &TickerBook,
    xch_usd: f64,
) -> (MarketBoard, Vec<String>) {
    let mut board = MarketBoard::new(xch_usd);
    let mut unresolved = Vec::new();

    for (id, quote) in ids.iter().zip(metadata) {
        match quote.or_else(|| book.usd_quote(id, xch_usd)) {
            Some(quote) => board.insert(id, quote),
            None => unresolved.push(id.clone()),
        }
    }

    (board, unresolved)
}

/// Balance, NFTs and CATs of each treasury wallet, one wallet after another.
/// Every lookup is best effort.
pub async fn treasury_wallets(providers: &Providers, wallets: &[String]) -> TreasuryWallets {
    let started = Instant::now();
    let mut snapshots = Vec::with_capacity(wallets.len());

    for wallet in wallets {
        let mut snapshot = WalletSnapshot {
            wallet: wallet.clone(),
            ..Default::default()
        };

        match providers.xchscan.balance(wallet).await {
            Ok(xch) => snapshot.xch_bal = xch,
            Err(e) => warn!("[TREASURY] xchscan balance failed: {}", e),
        }

        providers.limiter.acquire(Lane::SpacescanWallet).await;
        match providers.spacescan.nft_balance(wallet, WALLET_NFT_TIMEOUT).await {
            Ok(nfts) => snapshot.nfts = nfts,
            Err(e) => warn!("[TREASURY] nft-balance failed: {}", e),
        }

        providers.limiter.acquire(Lane::SpacescanWallet).await;
        match providers.spacescan.token_balance(wallet, WALLET_TOKEN_TIMEOUT).await {
            Ok(cats) => {
                snapshot.tokens = cats
                    .into_iter()
                    .filter(|c| c.balance > 0.0)
                    .map(WalletToken::from)
                    .collect()
            }
            Err(e) => warn!("[TREASURY] token-balance failed: {}", e),
        }

        info!(
            "[TREASURY] {}: {:.4} XCH, {} NFTs, {} tokens",
            tail(wallet),
            snapshot.xch_bal,
            snapshot.nfts.len(),
            snapshot.tokens.len()
        );
        snapshots.push(snapshot);
    }

    TreasuryWallets {
        ok: true,
        wallets: snapshots,
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::providers;
    use serde_json::json;
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_xch_price(server: &MockServer, usd: f64) {
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"chia": {"usd": usd}})))
            .mount(server)
            .await;
    }

    fn with_ids(server: &MockServer, ids: &[&str]) -> Providers {
        let mut providers = providers(&server.uri());
        providers.market_cat_ids = ids.iter().map(|id| id.to_string()).collect();
        providers
    }

    #[tokio::test]
    async fn test_metadata_quote_skips_fallback_providers() {
        let server = MockServer::start().await;
        mount_xch_price(&server, 10.0).await;
        Mock::given(method("GET"))
            .and(path("/cat/info/cat1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"amount_price": 0.5, "pricepercentage": 2.0, "circulating_supply": 100}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/prices/tickers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tickers": [{"base_id": "cat1", "last_price": 1.0}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/offers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"offers": [{"price": 1}]})))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = market_prices(&with_ids(&server, &["cat1"])).await;

        let board = outcome.data().unwrap();
        assert!(outcome.is_complete());
        assert_eq!(board.prices["cat1"], 0.5);
        assert_eq!(board.mcaps["cat1"], 50.0);
        assert_eq!(board.sources["cat1"], PriceSource::Spacescan);
        assert_eq!(board.xch_usd, 10.0);
    }

    #[tokio::test]
    async fn test_falls_through_ticker_then_order_book() {
        let server = MockServer::start().await;
        mount_xch_price(&server, 10.0).await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/cat/info/.+$"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/prices/tickers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tickers": [{"base_id": "CAT1", "last_price": 0.2}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/offers"))
            .and(query_param("offered", "cat2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"offers": [{"price": 0.3}, {"price": 0.1}]})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/offers"))
            .and(query_param("offered", "cat3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"offers": []})))
            .mount(&server)
            .await;

        let outcome = market_prices(&with_ids(&server, &["cat1", "cat2", "cat3"])).await;

        let Outcome::Partial { data: board, warnings } = outcome else {
            panic!("expected a partial board");
        };
        assert_eq!(board.prices["cat1"], 2.0);
        assert_eq!(board.sources["cat1"], PriceSource::Dexie);
        assert!((board.prices["cat2"] - 1.0).abs() < 1e-9);
        assert_eq!(board.prices["cat3"], 0.0);
        assert_eq!(board.sources["cat3"], PriceSource::None);
        assert_eq!(warnings, vec!["no price for cat3".to_string()]);
    }

    #[tokio::test]
    async fn test_nothing_priced_is_a_failure_with_fallback_rate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let outcome = market_prices(&with_ids(&server, &["cat1"])).await;
        assert!(matches!(outcome, Outcome::Failed { .. }));
    }

    #[test]
    fn test_first_pass_prefers_metadata() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let metadata = vec![
            Some(PriceQuote {
                price: 3.0,
                change: 1.0,
                market_cap: 30.0,
                source: PriceSource::Spacescan,
            }),
            None,
        ];
        let (board, unresolved) = first_pass(&ids, metadata, &TickerBook::default(), 4.0);

        assert_eq!(board.prices["a"], 3.0);
        assert_eq!(unresolved, vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn test_treasury_wallets_are_best_effort() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/account/balance"))
            .and(query_param("address", "xch1a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"xch": 7.5})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/address/nft-balance/xch1a"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/address/token-balance/xch1a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"asset_id": "c1", "symbol": "SBX", "balance": "5", "price": 0.1, "total_value": 0.5},
                    {"asset_id": "c2", "name": "Empty", "balance": 0}
                ]
            })))
            .mount(&server)
            .await;

        let result = treasury_wallets(&providers(&server.uri()), &["xch1a".to_string()]).await;

        assert!(result.ok);
        let wallet = &result.wallets[0];
        assert_eq!(wallet.xch_bal, 7.5);
        assert!(wallet.nfts.is_empty());
        assert_eq!(wallet.tokens.len(), 1);
        assert_eq!(wallet.tokens[0].name, "SBX");
        assert_eq!(wallet.tokens[0].symbol, "SBX");

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["wallets"][0]["xchBal"], 7.5);
        assert!(json.get("elapsed_ms").is_some());
    }
}
