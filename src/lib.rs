pub mod api;
pub mod cache;
pub mod config;
pub mod domain;
pub mod http;
pub mod logging;
pub mod resource;
pub mod store;
