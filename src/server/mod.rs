//! HTTP transport: request parsing, the gateway service, and the `may_minihttp` listener.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_query_params, parse_request, ParsedRequest};
pub use response::Reply;
pub use service::GatewayService;
