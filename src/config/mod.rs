//! # Configuration Module
//!
//! Project and endpoint configuration, as read from `flapi.yaml`.
//!
//! ```yaml
//! project_name: shop
//! project_description: Customer and order data
//! base_url: https://api.example.com
//! endpoint_files:
//!   - sqls/invoices.yaml
//! endpoints:
//!   - url-path: /customers/:customer_id/orders
//!     method: GET
//!     template-source: orders.sql
//!     request:
//!       - field-name: customer_id
//!         field-in: path
//!         required: true
//!     auth: { enabled: true, type: basic }
//!     rate-limit: { enabled: true, max: 100, interval: 60 }
//! ```
//!
//! Loading only parses; template validation happens when the configuration is
//! compiled into a [`crate::catalog::CatalogSnapshot`].

mod load;
mod types;

pub use load::*;
pub use types::*;
