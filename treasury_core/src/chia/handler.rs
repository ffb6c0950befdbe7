use std::time::Duration;

use futures::future::join_all;
use log::{info, warn};
use tokio::time::{timeout_at, Instant};

use crate::chia::{
    nfts::{enrich, tally},
    tokens::{merge_holdings, wallet_tokens, OUT_OF_TIME},
};
use crate::coingecko::handler::CHIA;
use crate::helpers::{
    dto::{FullReport, NftCollection, NftReport, Outcome, TokensReport},
    rate_limit::Lane,
    retry::retry_rate_limited,
};
use crate::providers::Providers;
use crate::spacescan::{dto::RawNft, handler::tail};

pub const XCH_PRICE_TIMEOUT: Duration = Duration::from_secs(5);
/// Kept back from the request budget for merging and serializing.
pub const FINISH_RESERVE: Duration = Duration::from_millis(100);

fn request_deadline(providers: &Providers) -> Instant {
    Instant::now() + providers.budget.saturating_sub(FINISH_RESERVE)
}

async fn xch_usd(providers: &Providers, deadline: Instant) -> f64 {
    let price = providers
        .coingecko
        .usd_price_or(CHIA, providers.fallback_prices.xch_usd, XCH_PRICE_TIMEOUT);
    match timeout_at(deadline, price).await {
        Ok((price, _)) => price,
        Err(_) => providers.fallback_prices.xch_usd,
    }
}

/// Collection names are cosmetic; running out of time keeps the tallied ones.
async fn enrich_until(
    providers: &Providers,
    collections: &mut [NftCollection],
    deadline: Instant,
    warnings: &mut Vec<String>,
) {
    if timeout_at(deadline, enrich(providers, collections)).await.is_err() {
        warn!("[CHIA-NFTS] enrichment cut short");
        warnings.push(format!("collection metadata unavailable: {}", OUT_OF_TIME));
    }
}

pub async fn chia_tokens(providers: &Providers, address: &str) -> Outcome<TokensReport> {
    info!("[CHIA-TOKENS] {}", tail(address));
    let deadline = request_deadline(providers);
    let xch_usd = xch_usd(providers, deadline).await;

    let (tokens, warnings) = wallet_tokens(providers, address, xch_usd, &providers.retries.single_cat, deadline).await;
    let report = TokensReport::new(tokens);

    info!("[CHIA-TOKENS] done: {} tokens, ${:.2}", report.tokens.len(), report.total);
    Outcome::from_parts(report, warnings)
}

pub async fn chia_nfts(providers: &Providers, address: &str) -> Outcome<NftReport> {
    info!("[CHIA-NFTS] {}", tail(address));
    let deadline = request_deadline(providers);

    let raw = timeout_at(
        deadline,
        retry_rate_limited("CHIA-NFTS", &providers.retries.nfts, |timeout| async move {
            providers.limiter.acquire(Lane::SpacescanWallet).await;
            providers.spacescan.nft_balance(address, timeout).await
        }),
    )
    .await;

    let (raw, mut warnings) = match raw {
        Ok(Ok(raw)) => (raw, Vec::new()),
        Ok(Err(e)) => (Vec::new(), vec![format!("NFT list unavailable: {}", e)]),
        Err(_) => (Vec::new(), vec![format!("NFT list unavailable: {}", OUT_OF_TIME)]),
    };

    let mut collections = tally(&raw);
    enrich_until(providers, &mut collections, deadline, &mut warnings).await;

    info!("[CHIA-NFTS] done: {} NFTs in {} collections", raw.len(), collections.len());
    Outcome::from_parts(
        NftReport {
            nfts: collections,
            nft_count: raw.len(),
        },
        warnings,
    )
}

/// Tokens and NFTs of up to two wallets. Token balances are fetched one wallet
/// after the other since they share the explorer's rate limit; NFT lists are
/// fetched together. A second address equal to the first is ignored.
///
/// The whole request is held to `providers.budget`. The token phase stops
/// early enough to leave one NFT attempt its full timeout; whatever does not
/// fit is reported as a warning.
pub async fn chia_full(providers: &Providers, address1: &str, address2: Option<&str>) -> Outcome<FullReport> {
    let mut wallets = vec![address1];
    if let Some(address2) = address2.filter(|a| !a.is_empty() && *a != address1) {
        wallets.push(address2);
    }
    info!("[CHIA-FULL] {} wallet(s)", wallets.len());

    let started = Instant::now();
    let deadline = request_deadline(providers);
    let nft_timeout = providers.retries.nfts.attempt_timeout;
    let tokens_deadline = deadline
        .checked_sub(nft_timeout)
        .filter(|d| *d > started)
        .unwrap_or(deadline);

    let xch_usd = xch_usd(providers, tokens_deadline).await;
    let mut holdings = Vec::new();
    let mut warnings = Vec::new();

    for wallet in &wallets {
        let (tokens, wallet_warnings) =
            wallet_tokens(providers, wallet, xch_usd, &providers.retries.full_cat, tokens_deadline).await;
        holdings.extend(tokens);
        warnings.extend(wallet_warnings);
    }

    let tokens = merge_holdings(holdings);
    let total: f64 = tokens.iter().map(|t| t.value).sum();
    info!("[CHIA-FULL] tokens: {} unique, ${:.2}", tokens.len(), total);

    let lists = timeout_at(
        deadline,
        join_all(
            wallets
                .iter()
                .map(|wallet| providers.spacescan.nft_balance(wallet, nft_timeout)),
        ),
    )
    .await;

    let mut raw: Vec<RawNft> = Vec::new();
    match lists {
        Ok(lists) => {
            for (wallet, list) in wallets.iter().zip(lists) {
                match list {
                    Ok(list) => raw.extend(list),
                    Err(e) => {
                        warn!("[CHIA-FULL] nft-balance {}: {}", tail(wallet), e);
                        warnings.push(format!("NFT list unavailable for {}: {}", tail(wallet), e));
                    }
                }
            }
        }
        Err(_) => {
            warn!("[CHIA-FULL] nft-balance: out of time");
            warnings.push(format!("NFT lists unavailable: {}", OUT_OF_TIME));
        }
    }

    let mut nfts = tally(&raw);
    enrich_until(providers, &mut nfts, deadline, &mut warnings).await;

    info!(
        "[CHIA-FULL] complete in {}ms: {} tokens, {} NFTs in {} collections",
        started.elapsed().as_millis(),
        tokens.len(),
        raw.len(),
        nfts.len()
    );

    Outcome::from_parts(
        FullReport {
            tokens,
            total,
            nfts,
            nft_count: raw.len(),
        },
        warnings,
    )
}
