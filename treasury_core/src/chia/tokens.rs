use std::{collections::HashMap, time::Duration};

use log::{info, warn};
use tokio::time::{timeout_at, Instant};

use crate::helpers::{
    dto::{TokenHolding, TokenKind},
    rate_limit::Lane,
    retry::{retry_rate_limited, RetryPolicy},
};
use crate::providers::Providers;
use crate::spacescan::{dto::CatBalance, handler::tail};

pub const XCH_BALANCE_TIMEOUT: Duration = Duration::from_secs(8);
pub const XCH_ASSET_ID: &str = "XCH";
pub const OUT_OF_TIME: &str = "request time budget spent";

pub fn native_holding(balance: f64, xch_usd: f64) -> TokenHolding {
    let mut holding = TokenHolding::priced("XCH", "Chia", balance, xch_usd, TokenKind::Native);
    holding.asset_id = Some(XCH_ASSET_ID.to_string());
    holding
}

/// Prices a CAT row: the USD quote when present, else the XCH quote at
/// `xch_usd`. A reported `total_value` overrides `balance * price`.
pub fn cat_holding(cat: &CatBalance, xch_usd: f64) -> Option<TokenHolding> {
    if cat.balance <= 0.0 {
        return None;
    }

    let price = if cat.price > 0.0 { cat.price } else { cat.price_xch * xch_usd };
    let value = if cat.total_value > 0.0 { cat.total_value } else { cat.balance * price };

    let symbol = first_non_empty(&[cat.symbol.as_str(), cat.name.as_str()], "?");
    let name = first_non_empty(&[cat.name.as_str(), cat.symbol.as_str()], "Unknown CAT");

    Some(TokenHolding {
        symbol,
        name,
        asset_id: (!cat.asset_id.is_empty()).then(|| cat.asset_id.clone()),
        contract: None,
        balance: cat.balance,
        price,
        value,
        kind: TokenKind::Cat,
        price_xch: Some(cat.price_xch),
        image: Some(cat.preview_url.clone()),
        lp: None,
    })
}

fn first_non_empty(candidates: &[&str], fallback: &str) -> String {
    candidates
        .iter()
        .find(|c| !c.is_empty())
        .copied()
        .unwrap_or(fallback)
        .to_string()
}

/// Native balance plus CAT balances of one wallet. The CAT call follows
/// `policy`; when it is exhausted, or `deadline` passes first, the wallet
/// degrades to what was read so far and a warning says so.
pub async fn wallet_tokens(
    providers: &Providers,
    address: &str,
    xch_usd: f64,
    policy: &RetryPolicy,
    deadline: Instant,
) -> (Vec<TokenHolding>, Vec<String>) {
    let mut tokens = Vec::new();
    let mut warnings = Vec::new();

    let balance = timeout_at(deadline, providers.spacescan.xch_balance(address, XCH_BALANCE_TIMEOUT)).await;
    match balance {
        Ok(Ok(balance)) => {
            info!("[CHIA-TOKENS] XCH {} = {}", tail(address), balance);
            if balance > 0.0 {
                tokens.push(native_holding(balance, xch_usd));
            }
        }
        Ok(Err(e)) => {
            warn!("[CHIA-TOKENS] xch-balance {}: {}", tail(address), e);
            warnings.push(format!("XCH balance unavailable for {}: {}", tail(address), e));
        }
        Err(_) => {
            warn!("[CHIA-TOKENS] xch-balance {}: out of time", tail(address));
            warnings.push(format!("XCH balance unavailable for {}: {}", tail(address), OUT_OF_TIME));
            return (tokens, warnings);
        }
    }

    let cats = timeout_at(
        deadline,
        retry_rate_limited("CHIA-TOKENS", policy, |timeout| async move {
            providers.limiter.acquire(Lane::SpacescanTokenBalance).await;
            providers.spacescan.token_balance(address, timeout).await
        }),
    )
    .await;

    match cats {
        Ok(Ok(cats)) => tokens.extend(cats.iter().filter_map(|cat| cat_holding(cat, xch_usd))),
        Ok(Err(e)) => warnings.push(format!("token balances unavailable for {}: {}", tail(address), e)),
        Err(_) => {
            warn!("[CHIA-TOKENS] token-balance {}: out of time", tail(address));
            warnings.push(format!("token balances unavailable for {}: {}", tail(address), OUT_OF_TIME));
        }
    }

    (tokens, warnings)
}

/// Folds holdings of several wallets together by asset id (symbol when there
/// is none), summing balance and value, highest value first.
pub fn merge_holdings(holdings: Vec<TokenHolding>) -> Vec<TokenHolding> {
    let mut merged: Vec<TokenHolding> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for holding in holdings {
        match index.get(holding.merge_key()) {
            Some(slot) => {
                let existing = &mut merged[*slot];
                existing.balance += holding.balance;
                existing.value += holding.value;
            }
            None => {
                index.insert(holding.merge_key().to_string(), merged.len());
                merged.push(holding);
            }
        }
    }

    merged.sort_by(|a, b| b.value.total_cmp(&a.value));
    merged
}
