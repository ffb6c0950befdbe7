pub mod defaults;
pub mod dto;
pub mod fetch;
pub mod lenient;
pub mod rate_limit;
pub mod retry;
