pub mod handler;
pub mod lp;
