//! Fallback quotes used when no live price source answers. Every endpoint reads
//! them from here (through `Config::fallback_prices`) so the numbers never diverge.

pub const DEFAULT_XCH_USD: f64 = 4.0;
pub const DEFAULT_ETH_USD: f64 = 2500.0;

/// Wrapped ETH on Base, priced with the native ETH quote.
pub const BASE_WETH: &str = "0x4200000000000000000000000000000000000006";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// CAT tokens tracked by the market price board.
pub const MARKET_CAT_IDS: [&str; 6] = [
    "a09af8b0d12b27772c64f89cf0d1db95186dca5b1871babc5108ff44f36305e6",
    "eb2155a177b6060535dd8e72e98ddb0c77aea21fab53737de1c1ced3cb38e4c4",
    "ae1536f56760e471ad85ead45f00d680ff9cca73b8cc3407be778f1c0c606eac",
    "70010d83542594dd44314efbae75d82b3d9ae7d946921ed981a6cd08f0549e50",
    "ab558b1b841365a24d1ff2264c55982e55664a8b6e45bc107446b7e667bb463b",
    "dd37f678dda586fad9b1daeae1f7c5c137ffa6d947e1ed5c7b4f3c430da80638",
];

pub const BASE_RPC_URLS: [&str; 3] = [
    "https://base-rpc.publicnode.com",
    "https://base.llamarpc.com",
    "https://base.meowrpc.com",
];
