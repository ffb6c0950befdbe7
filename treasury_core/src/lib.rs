pub mod base;
pub mod blockscout;
pub mod chia;
pub mod coingecko;
pub mod config;
pub mod dexie;
pub mod dexscreener;
pub mod error;
pub mod helpers;
pub mod market;
pub mod merkl;
pub mod mintgarden;
pub mod providers;
pub mod rpc;
pub mod spacescan;
pub mod storage;
pub mod xchscan;
