//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_miro_gateway;

pub use http_miro_gateway::{DEFAULT_API_BASE_URL, DEFAULT_SCIM_BASE_URL, HttpMiroGateway};
