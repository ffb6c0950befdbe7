//! Liquidity-pool positions valued from on-chain reserves.

use alloy_primitives::U256;

use crate::helpers::dto::{LpDetails, TokenHolding, TokenKind};
use crate::rpc::{abi, dto::EthCall};

/// Calls needed to describe one pool: token0, token1, getReserves,
/// totalSupply, decimals.
pub const POOL_CALLS: usize = 5;
/// Pools resolved per JSON-RPC batch.
pub const POOLS_PER_BATCH: usize = 5;
/// Calls per underlying token: decimals, symbol.
pub const TOKEN_CALLS: usize = 2;

const DEFAULT_DECIMALS: u32 = 18;

pub fn is_lp_token(symbol: &str, name: &str) -> bool {
    symbol == "9mm-LP"
        || symbol.contains("-LP")
        || symbol.contains("UNI-V2")
        || (name.contains(" LPs") && !name.contains("Staked"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct LpPoolMeta {
    pub contract: String,
    pub user_balance: f64,
    pub token0: Option<String>,
    pub token1: Option<String>,
    pub reserve0: U256,
    pub reserve1: U256,
    /// Already scaled by `lp_decimals`.
    pub total_supply: f64,
    pub lp_decimals: u32,
}

impl LpPoolMeta {
    /// The five calls of pool number `slot` in its batch, with ids
    /// `slot * 5 + k`.
    pub fn calls(contract: &str, slot: usize) -> Vec<EthCall> {
        let base = (slot * POOL_CALLS) as u64;
        [abi::TOKEN0, abi::TOKEN1, abi::GET_RESERVES, abi::TOTAL_SUPPLY, abi::DECIMALS]
            .iter()
            .enumerate()
            .map(|(k, selector)| EthCall::new(base + k as u64, contract, selector))
            .collect()
    }

    /// Reads the five results of one pool. Missing results leave zero
    /// reserves and supply, which values the position at zero.
    pub fn decode(contract: &str, user_balance: f64, results: &[Option<String>]) -> Self {
        let result = |k: usize| results.get(k).and_then(|r| r.as_deref());

        let lp_decimals = result(4).and_then(abi::decimals).unwrap_or(DEFAULT_DECIMALS);
        let (reserve0, reserve1) = result(2).and_then(abi::reserves).unwrap_or((U256::ZERO, U256::ZERO));
        let total_supply = result(3)
            .and_then(abi::uint)
            .map(|supply| abi::scaled(supply, lp_decimals))
            .unwrap_or(0.0);

        Self {
            contract: contract.to_string(),
            user_balance,
            token0: result(0).and_then(abi::address),
            token1: result(1).and_then(abi::address),
            reserve0,
            reserve1,
            total_supply,
            lp_decimals,
        }
    }

    pub fn share(&self) -> f64 {
        if self.total_supply > 0.0 {
            self.user_balance / self.total_supply
        } else {
            0.0
        }
    }
}

/// Decimals and symbol of a pool's underlying token.
#[derive(Debug, Clone, PartialEq)]
pub struct UnderlyingToken {
    pub decimals: u32,
    pub symbol: String,
}

impl UnderlyingToken {
    pub fn unknown() -> Self {
        Self {
            decimals: DEFAULT_DECIMALS,
            symbol: "?".to_string(),
        }
    }

    pub fn calls(address: &str, slot: usize) -> Vec<EthCall> {
        let base = (slot * TOKEN_CALLS) as u64;
        vec![
            EthCall::new(base, address, abi::DECIMALS),
            EthCall::new(base + 1, address, abi::SYMBOL),
        ]
    }

    /// Unreadable decimals fall back to 18, an unreadable symbol to the last
    /// six characters of the address.
    pub fn decode(address: &str, decimals: Option<&str>, symbol: Option<&str>) -> Self {
        let tail = address.get(address.len().saturating_sub(6)..).unwrap_or(address);
        Self {
            decimals: decimals.and_then(abi::decimals).unwrap_or(DEFAULT_DECIMALS),
            symbol: symbol.and_then(abi::string).unwrap_or_else(|| tail.to_string()),
        }
    }
}

/// USD value of a pool holding `amount0` at `price0` and `amount1` at
/// `price1`. When exactly one side is priced the pool is taken as twice that
/// side, which only holds for a balanced constant-product pool.
pub fn pool_value(amount0: f64, price0: f64, amount1: f64, price1: f64) -> f64 {
    match (price0 > 0.0, price1 > 0.0) {
        (true, false) => 2.0 * amount0 * price0,
        (false, true) => 2.0 * amount1 * price1,
        (true, true) => amount0 * price0 + amount1 * price1,
        (false, false) => 0.0,
    }
}

pub fn value_position(
    meta: &LpPoolMeta,
    info0: &UnderlyingToken,
    info1: &UnderlyingToken,
    price0: f64,
    price1: f64,
) -> TokenHolding {
    let pair_name = format!("{}/{}", info0.symbol, info1.symbol);
    let amount0 = abi::scaled(meta.reserve0, info0.decimals);
    let amount1 = abi::scaled(meta.reserve1, info1.decimals);
    let pool_usd = pool_value(amount0, price0, amount1, price1);

    let share = meta.share();
    let value = share * pool_usd;
    let price = if meta.user_balance > 0.0 { value / meta.user_balance } else { 0.0 };

    TokenHolding {
        symbol: pair_name.clone(),
        name: format!("{} LP", pair_name),
        asset_id: None,
        contract: Some(meta.contract.clone()),
        balance: meta.user_balance,
        price,
        value,
        kind: TokenKind::Lp,
        price_xch: None,
        image: None,
        lp: Some(LpDetails {
            pair_name,
            token0: meta.token0.clone(),
            token1: meta.token1.clone(),
            price0,
            price1,
            total_liq_usd: pool_usd,
            user_share_pct: format!("{:.4}", share * 100.0),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(value: u128) -> String {
        format!("{:064x}", value)
    }

    fn pool() -> LpPoolMeta {
        LpPoolMeta {
            contract: "0xpool".to_string(),
            user_balance: 1.0,
            token0: Some("0xaaaa".to_string()),
            token1: Some("0xbbbb".to_string()),
            reserve0: U256::from(2_000_000_000_000_000_000u128),
            reserve1: U256::from(6_000_000u64),
            total_supply: 10.0,
            lp_decimals: 18,
        }
    }

    fn token(symbol: &str, decimals: u32) -> UnderlyingToken {
        UnderlyingToken {
            decimals,
            symbol: symbol.to_string(),
        }
    }

    #[test]
    fn test_lp_detection() {
        assert!(is_lp_token("9mm-LP", ""));
        assert!(is_lp_token("WETH-USDC-LP", ""));
        assert!(is_lp_token("UNI-V2", "Uniswap V2"));
        assert!(is_lp_token("AERO", "Aerodrome LPs"));
        assert!(!is_lp_token("sAERO", "Staked Aerodrome LPs"));
        assert!(!is_lp_token("USDC", "USD Coin"));
    }

    #[test]
    fn test_position_value_from_reserves() {
        let holding = value_position(&pool(), &token("WETH", 18), &token("USDC", 6), 3.0, 1.0);
        let lp = holding.lp.as_ref().unwrap();

        assert!((lp.total_liq_usd - 12.0).abs() < 1e-9);
        assert!((holding.value - 1.2).abs() < 1e-9);
        assert!((holding.price - 1.2).abs() < 1e-9);
        assert_eq!(lp.user_share_pct, "10.0000");
        assert_eq!(holding.symbol, "WETH/USDC");
        assert_eq!(holding.name, "WETH/USDC LP");
        assert_eq!(holding.kind, TokenKind::Lp);
    }

    // Approximation: assumes both sides of the pool hold equal value.
    #[test]
    fn test_single_sided_price_doubles_known_side() {
        let holding = value_position(&pool(), &token("WETH", 18), &token("???", 6), 3.0, 0.0);
        let lp = holding.lp.unwrap();
        assert!((lp.total_liq_usd - 12.0).abs() < 1e-9);

        assert_eq!(pool_value(2.0, 0.0, 6.0, 1.0), 12.0);
        assert_eq!(pool_value(2.0, 0.0, 6.0, 0.0), 0.0);
    }

    #[test]
    fn test_empty_supply_values_position_at_zero() {
        let mut meta = pool();
        meta.total_supply = 0.0;
        let holding = value_position(&meta, &token("A", 18), &token("B", 6), 3.0, 1.0);

        assert_eq!(holding.value, 0.0);
        assert_eq!(holding.lp.unwrap().user_share_pct, "0.0000");
    }

    #[test]
    fn test_pool_calls_are_numbered_by_slot() {
        let calls = LpPoolMeta::calls("0xpool", 2);
        let ids: Vec<u64> = calls.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![10, 11, 12, 13, 14]);
        assert_eq!(calls[2].data, abi::GET_RESERVES);

        let token_calls = UnderlyingToken::calls("0xaaaa", 3);
        assert_eq!(token_calls[0].id, 6);
        assert_eq!(token_calls[1].data, abi::SYMBOL);
    }

    #[test]
    fn test_decode_pool_results() {
        let results = vec![
            Some(format!("0x{}", word(0xaa))),
            None,
            Some(format!("0x{}{}{}", word(2_000_000_000_000_000_000), word(6_000_000), word(1))),
            Some(format!("0x{}", word(10_000_000_000_000_000_000))),
            Some(format!("0x{}", word(18))),
        ];
        let meta = LpPoolMeta::decode("0xpool", 1.0, &results);

        assert_eq!(meta.token0.as_deref(), Some("0x00000000000000000000000000000000000000aa"));
        assert_eq!(meta.token1, None);
        assert_eq!(meta.reserve1, U256::from(6_000_000u64));
        assert!((meta.total_supply - 10.0).abs() < 1e-9);
        assert!((meta.share() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_unreadable_underlying_token_falls_back() {
        let info = UnderlyingToken::decode("0x833589fcd6edb6e08f4c7c32d4f71b54bda02913", None, Some("0x"));
        assert_eq!(info.decimals, 18);
        assert_eq!(info.symbol, "a02913");
    }
}
