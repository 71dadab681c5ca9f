//! HTTP gateway: multipart ingestion, input validation, and error mapping
//! around the vision judgment core.

pub mod analyze_api;
pub mod health_api;
pub mod server;

pub use server::{router, start_server, GatewayState};
