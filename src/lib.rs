//! # flapi
//!
//! **flapi** is a configuration-driven HTTP gateway that publishes parameterized,
//! database-backed query endpoints as a REST API, and derives OpenAPI documentation
//! from the same configuration plus the query engine's schema description.
//!
//! ## Architecture
//!
//! - **[`config`]** - project and endpoint definitions, loaded from YAML
//! - **[`catalog`]** - the active endpoint set, swapped atomically on refresh
//! - **[`router`]** - URL template compilation, matching, and path parameter extraction
//! - **[`dispatcher`]** - request-to-endpoint orchestration
//! - **[`executor`]** - auth, rate-limit, and query capabilities behind traits
//! - **[`docs`]** - OpenAPI document synthesis
//! - **[`server`]** - HTTP service built on `may_minihttp`
//! - **[`hot_reload`]** - refresh the catalog when the configuration file changes
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as GatewayService<br/>(may_minihttp)
//!     participant Dispatcher as RequestDispatcher
//!     participant Resolver as RouteResolver
//!     participant Catalog as EndpointCatalog
//!     participant Executor as RequestExecutor
//!
//!     Client->>Server: GET /customers/42/orders
//!     Server->>Dispatcher: dispatch(GET, path)
//!     Dispatcher->>Resolver: resolve(GET, path)
//!     Resolver->>Catalog: snapshot()
//!     Catalog-->>Resolver: Arc<CatalogSnapshot>
//!     Resolver->>Resolver: match templates in configuration order
//!     alt No template matches
//!         Resolver-->>Server: NotFound
//!         Server-->>Client: 404 Not Found
//!     else Matched
//!         Resolver-->>Server: ResolvedRoute {customer_id: "42"}
//!         Server->>Executor: execute(route, context)
//!         Executor->>Executor: auth, rate limit, required fields, query
//!         Executor-->>Server: ExecutionResponse
//!         Server-->>Client: 200 {data, next, total_count}
//!     end
//! ```
//!
//! ### Configuration Refresh
//!
//! `DELETE /config` (or a file change with `--watch`) reloads the configuration,
//! validates it in full, and swaps the new snapshot in with a single atomic store.
//! Requests already in flight finish against the snapshot they started with. An
//! invalid configuration is rejected and the previous catalog keeps serving.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flapi::catalog::EndpointCatalog;
//! use flapi::config::YamlConfigSource;
//! use flapi::docs::UnavailableDescriber;
//! use flapi::executor::{EchoQueryExecutor, PolicyExecutor};
//! use flapi::server::{GatewayService, HttpServer};
//! use std::sync::Arc;
//!
//! let source = Arc::new(YamlConfigSource::new("flapi.yaml"));
//! let catalog = Arc::new(EndpointCatalog::load(source.as_ref())?);
//! let service = GatewayService::new(
//!     catalog,
//!     source,
//!     Arc::new(PolicyExecutor::new(Arc::new(EchoQueryExecutor))),
//!     Arc::new(UnavailableDescriber),
//! );
//! HttpServer(service).start("0.0.0.0:8080")?.join().ok();
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod docs;
pub mod error;
pub mod executor;
pub mod hot_reload;
pub mod logging;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use catalog::{CatalogSnapshot, EndpointCatalog};
pub use config::{load_config, EndpointDefinition, ProjectConfig};
pub use dispatcher::{DispatchOutcome, RequestDispatcher};
pub use docs::{DocSynthesizer, DocumentNode};
pub use error::{ConfigError, DescribeError};
pub use router::{ResolvedRoute, RouteResolver};
