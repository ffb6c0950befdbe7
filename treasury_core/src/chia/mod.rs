pub mod handler;
pub mod nfts;
pub mod tokens;
