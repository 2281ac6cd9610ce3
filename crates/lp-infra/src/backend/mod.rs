//! Backend service adapters.

mod dto;
mod http;

pub use http::HttpBackendClient;
