pub mod board;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod server;
pub mod session;
pub mod ui;
