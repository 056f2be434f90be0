pub mod activity;
pub mod assets;
pub mod config;
pub mod editor;
pub mod rpc;
pub mod session;
