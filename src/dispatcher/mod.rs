//! # Dispatcher Module
//!
//! Thin orchestration between the transport boundary and the router.
//!
//! ## Request Flow
//!
//! 1. The transport hands over the request method and path (query string removed)
//! 2. [`RequestDispatcher::dispatch`] resolves them through the [`crate::router::RouteResolver`]
//! 3. On a match the transport invokes its [`crate::executor::RequestExecutor`] with the
//!    [`crate::router::ResolvedRoute`]; otherwise it answers 404
//!
//! Every call is independent: nothing is retried or cached here.

mod core;

pub use core::{DispatchOutcome, RequestDispatcher};
