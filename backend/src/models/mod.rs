pub mod account;
pub mod interval;
pub mod session;
pub mod user;
