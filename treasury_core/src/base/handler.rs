use std::{collections::HashMap, time::Duration};

use log::{info, warn};

use crate::base::lp::{is_lp_token, value_position, LpPoolMeta, UnderlyingToken, POOLS_PER_BATCH, POOL_CALLS, TOKEN_CALLS};
use crate::blockscout::dto::TokenBalanceItem;
use crate::coingecko::handler::ETHEREUM;
use crate::helpers::{
    defaults::BASE_WETH,
    dto::{Outcome, TokenHolding, TokenKind, TokensReport},
};
use crate::providers::Providers;
use crate::rpc::dto::EthCall;

pub const ETH_PRICE_TIMEOUT: Duration = Duration::from_secs(5);
/// Native balances at or below this are not listed.
pub const NATIVE_DUST: f64 = 0.0001;
/// Token balances below this are not listed.
pub const TOKEN_DUST: f64 = 0.000001;

fn erc20_holding(item: &TokenBalanceItem, price: f64) -> TokenHolding {
    let symbol = if item.token.symbol.is_empty() { "?" } else { item.token.symbol.as_str() };
    let name = if item.token.name.is_empty() { symbol } else { item.token.name.as_str() };

    let mut holding = TokenHolding::priced(symbol, name, item.balance(), price, TokenKind::Erc20);
    holding.contract = Some(item.contract());
    holding
}

/// Native ETH, ERC-20 and LP holdings of a Base wallet.
pub async fn fetch_base(providers: &Providers, address: &str) -> Outcome<TokensReport> {
    info!("[BASE] {}", address);
    let mut tokens = Vec::new();
    let mut warnings = Vec::new();

    let (eth_usd, _) = providers
        .coingecko
        .usd_price_or(ETHEREUM, providers.fallback_prices.eth_usd, ETH_PRICE_TIMEOUT)
        .await;
    let mut price_map: HashMap<String, f64> = HashMap::new();
    price_map.insert(BASE_WETH.to_string(), eth_usd);

    let native = match providers.blockscout.eth_balance(address).await {
        Ok(balance) => Some(balance),
        Err(e) => {
            warn!("[BASE] ETH via explorer: {}, trying RPC", e);
            providers.rpc.eth_get_balance(address).await
        }
    };
    match native {
        Some(balance) if balance > NATIVE_DUST => {
            tokens.push(TokenHolding::priced("ETH", "Ethereum", balance, eth_usd, TokenKind::Native));
        }
        Some(_) => {}
        None => warnings.push("ETH balance unavailable".to_string()),
    }

    let items = match providers.blockscout.token_balances(address).await {
        Ok(items) => items,
        Err(e) => {
            warn!("[BASE] ERC20: {}", e);
            warnings.push(format!("token balances unavailable: {}", e));
            Vec::new()
        }
    };

    let (lp_items, erc20_items): (Vec<TokenBalanceItem>, Vec<TokenBalanceItem>) = items
        .into_iter()
        .filter(|item| item.balance() >= TOKEN_DUST)
        .partition(|item| is_lp_token(&item.token.symbol, &item.token.name));
    info!("[BASE] {} erc20, {} LP", erc20_items.len(), lp_items.len());

    let mut unpriced = Vec::new();
    for item in erc20_items {
        let contract = item.contract();
        if item.token.exchange_rate > 0.0 {
            price_map.insert(contract, item.token.exchange_rate);
            tokens.push(erc20_holding(&item, item.token.exchange_rate));
        } else if !contract.is_empty() {
            unpriced.push(item);
        }
    }

    if !unpriced.is_empty() {
        let contracts: Vec<String> = unpriced.iter().map(TokenBalanceItem::contract).collect();
        let quotes = providers.dexscreener.prices(&contracts).await;
        for item in &unpriced {
            let contract = item.contract();
            let price = quotes.get(&contract).map_or(0.0, |q| q.price);
            if price > 0.0 {
                price_map.insert(contract, price);
            }
            tokens.push(erc20_holding(item, price));
        }
    }

    let pools = resolve_pools(providers, &lp_items).await;
    info!("[BASE] {} LP pairs resolved", pools.len());

    let mut underlying: Vec<String> = Vec::new();
    for address in pools.iter().flat_map(|p| [p.token0.as_ref(), p.token1.as_ref()]).flatten() {
        if !underlying.contains(address) {
            underlying.push(address.clone());
        }
    }
    let infos = resolve_underlying(providers, &underlying).await;

    let mut lp_prices: HashMap<String, f64> = providers
        .dexscreener
        .prices(&underlying)
        .await
        .into_iter()
        .map(|(address, quote)| (address, quote.price))
        .collect();
    for (address, price) in &price_map {
        if *price > 0.0 {
            lp_prices.entry(address.clone()).or_insert(*price);
        }
    }

    let side = |token: &Option<String>| -> (UnderlyingToken, f64) {
        match token {
            Some(address) => (
                infos.get(address).cloned().unwrap_or_else(UnderlyingToken::unknown),
                lp_prices.get(address).copied().unwrap_or(0.0),
            ),
            None => (UnderlyingToken::unknown(), 0.0),
        }
    };
    for pool in &pools {
        let (info0, price0) = side(&pool.token0);
        let (info1, price1) = side(&pool.token1);
        tokens.push(value_position(pool, &info0, &info1, price0, price1));
    }

    let report = TokensReport::new(tokens);
    info!("[BASE] ${:.2}, {} tokens", report.total, report.tokens.len());
    Outcome::from_parts(report, warnings)
}

/// Resolves LP contracts five at a time, one JSON-RPC batch per chunk.
async fn resolve_pools(providers: &Providers, lp_items: &[TokenBalanceItem]) -> Vec<LpPoolMeta> {
    let mut pools = Vec::with_capacity(lp_items.len());

    for chunk in lp_items.chunks(POOLS_PER_BATCH) {
        let contracts: Vec<String> = chunk.iter().map(TokenBalanceItem::contract).collect();
        let calls: Vec<EthCall> = contracts
            .iter()
            .enumerate()
            .flat_map(|(slot, contract)| LpPoolMeta::calls(contract, slot))
            .collect();
        let results = providers.rpc.batch(&calls).await;

        for (slot, (item, contract)) in chunk.iter().zip(&contracts).enumerate() {
            let start = slot * POOL_CALLS;
            let slice = results.get(start..start + POOL_CALLS).unwrap_or(&[]);
            pools.push(LpPoolMeta::decode(contract, item.balance(), slice));
        }
    }

    pools
}

/// Decimals and symbol of every distinct underlying token in a single batch.
async fn resolve_underlying(providers: &Providers, addresses: &[String]) -> HashMap<String, UnderlyingToken> {
    if addresses.is_empty() {
        return HashMap::new();
    }

    let calls: Vec<EthCall> = addresses
        .iter()
        .enumerate()
        .flat_map(|(slot, address)| UnderlyingToken::calls(address, slot))
        .collect();
    let results = providers.rpc.batch(&calls).await;

    addresses
        .iter()
        .enumerate()
        .map(|(slot, address)| {
            let result = |k: usize| results.get(slot * TOKEN_CALLS + k).and_then(|r| r.as_deref());
            (address.clone(), UnderlyingToken::decode(address, result(0), result(1)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::providers;
    use crate::rpc::abi;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    const POOL: &str = "0x00000000000000000000000000000000000000cc";
    const USDC: &str = "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913";

    fn word(value: u128) -> String {
        format!("{:064x}", value)
    }

    fn address_word(address: &str) -> String {
        format!("{:0>64}", address.trim_start_matches("0x"))
    }

    fn string_result(text: &str) -> String {
        let padded = format!("{:0<64}", hex::encode(text));
        format!("0x{}{}{}", word(32), word(text.len() as u128), padded)
    }

    fn eth_call_result(to: &str, data: &str) -> Value {
        let result = match (to, data) {
            (POOL, abi::TOKEN0) => format!("0x{}", address_word(BASE_WETH)),
            (POOL, abi::TOKEN1) => format!("0x{}", address_word(USDC)),
            (POOL, abi::GET_RESERVES) => {
                format!("0x{}{}{}", word(2_000_000_000_000_000_000), word(6_000_000), word(0))
            }
            (POOL, abi::TOTAL_SUPPLY) => format!("0x{}", word(10_000_000_000_000_000_000)),
            (POOL, abi::DECIMALS) | (BASE_WETH, abi::DECIMALS) => format!("0x{}", word(18)),
            (USDC, abi::DECIMALS) => format!("0x{}", word(6)),
            (BASE_WETH, abi::SYMBOL) => string_result("WETH"),
            (USDC, abi::SYMBOL) => string_result("USDC"),
            _ => return Value::Null,
        };
        Value::String(result)
    }

    fn answer(call: &Value) -> Value {
        let result = match call["method"].as_str() {
            Some("eth_getBalance") => json!("0xde0b6b3a7640000"),
            Some("eth_call") => eth_call_result(
                call["params"][0]["to"].as_str().unwrap_or_default(),
                call["params"][0]["data"].as_str().unwrap_or_default(),
            ),
            _ => Value::Null,
        };
        json!({"jsonrpc": "2.0", "id": call["id"], "result": result})
    }

    /// A tiny Base node: answers single requests and batches.
    fn base_node(req: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&req.body).unwrap();
        let reply = match &body {
            Value::Array(calls) => Value::Array(calls.iter().map(answer).collect()),
            call => answer(call),
        };
        ResponseTemplate::new(200).set_body_json(reply)
    }

    async fn mount_common(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ethereum": {"usd": 3000.0}})))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rpc"))
            .respond_with(base_node)
            .mount(server)
            .await;
    }

    fn token_balances() -> Value {
        json!([
            {
                "value": "5000000",
                "token": {"address_hash": USDC, "symbol": "USDC", "name": "USD Coin", "decimals": "6", "exchange_rate": "1.0"}
            },
            {
                "value": "1000000000000000000",
                "token": {"address_hash": POOL, "symbol": "UNI-V2", "name": "Uniswap V2", "decimals": "18"}
            },
            {
                "value": "1",
                "token": {"address_hash": "0xdust", "symbol": "DUST", "decimals": "18"}
            }
        ])
    }

    #[tokio::test]
    async fn test_base_wallet_with_lp_position() {
        let server = MockServer::start().await;
        mount_common(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/addresses/0xwallet"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"coin_balance": "1000000000000000000"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/addresses/0xwallet/token-balances"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_balances()))
            .mount(&server)
            .await;

        let outcome = fetch_base(&providers(&server.uri()), "0xwallet").await;
        assert!(outcome.is_complete());
        let report = outcome.data().unwrap();
        assert_eq!(report.tokens.len(), 3);

        let eth = &report.tokens[0];
        assert_eq!(eth.kind, TokenKind::Native);
        assert_eq!(eth.value, 3000.0);

        let usdc = report.tokens.iter().find(|t| t.kind == TokenKind::Erc20).unwrap();
        assert_eq!(usdc.balance, 5.0);
        assert_eq!(usdc.contract.as_deref(), Some(USDC));

        let lp = report.tokens.iter().find(|t| t.kind == TokenKind::Lp).unwrap();
        let details = lp.lp.as_ref().unwrap();
        assert_eq!(details.pair_name, "WETH/USDC");
        assert!((details.total_liq_usd - 6006.0).abs() < 1e-6);
        assert!((lp.value - 600.6).abs() < 1e-6);
        assert_eq!(details.user_share_pct, "10.0000");
        assert!((report.total - 3605.6).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_explorer_outage_falls_back_to_rpc_balance() {
        let server = MockServer::start().await;
        mount_common(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/addresses/0xwallet"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/addresses/0xwallet/token-balances"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let outcome = fetch_base(&providers(&server.uri()), "0xwallet").await;
        let Outcome::Partial { data, warnings } = outcome else {
            panic!("expected partial data");
        };

        assert_eq!(data.tokens.len(), 1);
        assert_eq!(data.tokens[0].symbol, "ETH");
        assert!((data.tokens[0].balance - 1.0).abs() < 1e-12);
        assert_eq!(warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_unpriced_erc20_uses_dex_aggregator() {
        let server = MockServer::start().await;
        mount_common(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/addresses/0xwallet"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"coin_balance": "0"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/addresses/0xwallet/token-balances"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [
                {"value": "2000000000000000000", "token": {"address_hash": "0xABC", "symbol": "NINE", "decimals": "18"}}
            ]})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tokens/v1/base/0xabc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"chainId": "base", "baseToken": {"address": "0xabc", "symbol": "NINE"}, "priceUsd": "0.5", "liquidity": {"usd": 1000}}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = fetch_base(&providers(&server.uri()), "0xwallet").await;
        let report = outcome.data().unwrap();

        assert_eq!(report.tokens.len(), 1);
        assert_eq!(report.tokens[0].name, "NINE");
        assert_eq!(report.tokens[0].price, 0.5);
        assert_eq!(report.total, 1.0);
    }
}
