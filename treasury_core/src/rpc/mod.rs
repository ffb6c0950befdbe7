pub mod abi;
pub mod dto;
pub mod handler;
