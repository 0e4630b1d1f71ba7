pub mod client;
pub mod commands;
pub mod config;
pub mod run;
pub mod session;
pub mod view;
