//! Identity module: signing accounts in.

pub mod service;

pub use service::LoginService;
