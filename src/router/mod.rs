//! # Router Module
//!
//! Path matching and parameter extraction for configured endpoints.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling `url-path` templates such as `/customers/:customer_id/orders`
//! - Matching incoming request paths against the templates for one method
//! - Extracting and percent-decoding named path parameters
//!
//! ## Architecture
//!
//! 1. **Compilation**: when a catalog snapshot is built, each template is split
//!    into literal and capture segments ([`UrlTemplate`]). Malformed templates are
//!    rejected there, never at request time.
//!
//! 2. **Matching**: [`RouteResolver`] walks the candidates for the request method in
//!    configuration order and returns the first structural match.
//!
//! ## Example
//!
//! ```rust,ignore
//! use flapi::router::RouteResolver;
//! use http::Method;
//!
//! let resolver = RouteResolver::new(catalog);
//! if let Some(route) = resolver.resolve(&Method::GET, "/customers/42/orders") {
//!     assert_eq!(route.get_path_param("customer_id"), Some("42"));
//! }
//! ```

mod core;
mod template;

pub use core::{ParamVec, ResolvedRoute, RouteResolver, MAX_INLINE_PARAMS};
pub use template::{Segment, UrlTemplate, CAPTURE_MARKER};
