//! # CLI Module
//!
//! Command-line interface of the `flapi` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Load the configuration and serve its endpoints:
//!
//! ```bash
//! flapi serve --config flapi.yaml --addr 0.0.0.0:8080 --watch
//! ```
//!
//! Options:
//! - `--config <FILE>` - project configuration (required)
//! - `--addr <ADDR>` - listen address (default `0.0.0.0:8080`)
//! - `--watch` - refresh the catalog when the configuration file changes
//! - `--base-url <URL>` - server URL advertised in `/openapi.json`
//!
//! ### `routes`
//!
//! Validate the configuration and print the resolved route table:
//!
//! ```bash
//! flapi routes --config flapi.yaml
//! ```
//!
//! ### `openapi`
//!
//! Print the OpenAPI document for the configuration without starting a server.
//! No query engine is attached, so row schemas are left empty:
//!
//! ```bash
//! flapi openapi --config flapi.yaml --format yaml
//! ```

mod commands;


pub use commands::{render_openapi, render_routes, run_cli, Cli, Commands, DocFormat};
