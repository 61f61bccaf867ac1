pub mod api_football;
pub mod config;
pub mod context;
pub mod error;
pub mod favorites;
pub mod formation;
pub mod http_client;
pub mod kv_store;
pub mod page;
pub mod provider;
pub mod season;
pub mod state;
