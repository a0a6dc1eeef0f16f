//! HTTP layer: methods, the pluggable transport and the API client

pub mod client;
pub mod method;
pub mod transport;

pub use client::{ApiClient, ApiResponse};
pub use method::HttpMethod;
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
