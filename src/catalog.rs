//! # Endpoint Catalog
//!
//! The set of endpoint definitions currently being served.
//!
//! The catalog is an immutable [`CatalogSnapshot`] behind an [`ArcSwap`]. Readers
//! call [`EndpointCatalog::snapshot`] once at the start of an operation and use
//! that `Arc` until they finish; a refresh builds and validates a complete new
//! snapshot and installs it with a single pointer swap. A reader therefore sees
//! either the old catalog or the new one in full, and never takes a lock.
//!
//! ```rust,ignore
//! let catalog = EndpointCatalog::from_config(config)?;
//! let snapshot = catalog.snapshot();          // pinned for this request
//! catalog.replace_all(new_config)?;           // concurrent refresh
//! snapshot.lookup_candidates(&Method::GET);   // still the old definitions
//! ```

use crate::config::{ConfigSource, EndpointDefinition, FieldLocation, ProjectConfig, ProjectMetadata};
use crate::error::ConfigError;
use crate::router::UrlTemplate;
use arc_swap::ArcSwap;
use http::Method;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// Methods an endpoint may be configured for.
const SUPPORTED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// An endpoint together with its compiled URL template.
#[derive(Debug)]
pub struct CatalogEntry {
    pub endpoint: Arc<EndpointDefinition>,
    pub template: UrlTemplate,
}

/// Immutable, fully validated set of endpoints.
#[derive(Debug)]
pub struct CatalogSnapshot {
    project: ProjectMetadata,
    entries: Vec<Arc<CatalogEntry>>,
    by_method: HashMap<Method, Vec<Arc<CatalogEntry>>>,
}

/// Serializable view of a snapshot, as returned by `GET /config`.
#[derive(Debug, Serialize)]
pub struct CatalogDump<'a> {
    pub flapi: &'a ProjectMetadata,
    pub endpoints: Vec<&'a EndpointDefinition>,
}

impl CatalogSnapshot {
    /// Validate and compile a configuration.
    ///
    /// Fails on the first malformed template, duplicate capture name, path
    /// field without a matching capture or marked optional, unsupported method, or pair of
    /// identically shaped templates for one method. A template fully covered by
    /// an earlier one for the same method is accepted (configuration order
    /// decides) but logged, since it can never be reached.
    pub fn build(config: ProjectConfig) -> Result<Self, ConfigError> {
        let ProjectConfig {
            project, endpoints, ..
        } = config;

        let mut entries: Vec<Arc<CatalogEntry>> = Vec::with_capacity(endpoints.len());
        let mut by_method: HashMap<Method, Vec<Arc<CatalogEntry>>> = HashMap::new();

        for endpoint in endpoints {
            if !SUPPORTED_METHODS.contains(&endpoint.method) {
                return Err(ConfigError::UnsupportedMethod {
                    url_path: endpoint.url_path.clone(),
                    method: endpoint.method.clone(),
                });
            }

            let template = UrlTemplate::parse(&endpoint.url_path)?;

            for field in &endpoint.request_fields {
                if field.field_in != FieldLocation::Path {
                    continue;
                }
                if !template.capture_names().any(|n| n == field.field_name) {
                    return Err(ConfigError::UnboundPathField {
                        url_path: endpoint.url_path.clone(),
                        field: field.field_name.clone(),
                    });
                }
                if !field.required {
                    return Err(ConfigError::OptionalPathField {
                        url_path: endpoint.url_path.clone(),
                        field: field.field_name.clone(),
                    });
                }
            }

            let same_method = by_method.entry(endpoint.method.clone()).or_default();
            for earlier in same_method.iter() {
                if earlier.template.same_shape(&template) {
                    return Err(ConfigError::AmbiguousTemplate {
                        method: endpoint.method.clone(),
                        url_path: endpoint.url_path.clone(),
                        conflicts_with: earlier.endpoint.url_path.clone(),
                    });
                }
                if earlier.template.covers(&template) {
                    warn!(
                        method = %endpoint.method,
                        url_path = %endpoint.url_path,
                        shadowed_by = %earlier.endpoint.url_path,
                        "Endpoint is unreachable: an earlier endpoint matches every path it would"
                    );
                }
            }

            let entry = Arc::new(CatalogEntry {
                endpoint: Arc::new(endpoint),
                template,
            });
            same_method.push(Arc::clone(&entry));
            entries.push(entry);
        }

        Ok(Self {
            project,
            entries,
            by_method,
        })
    }

    pub fn project(&self) -> &ProjectMetadata {
        &self.project
    }

    /// All entries in configuration order.
    pub fn entries(&self) -> &[Arc<CatalogEntry>] {
        &self.entries
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &EndpointDefinition> {
        self.entries.iter().map(|e| e.endpoint.as_ref())
    }

    /// Entries answering `method`, in configuration order. Empty when none do.
    pub fn lookup_candidates(&self, method: &Method) -> &[Arc<CatalogEntry>] {
        self.by_method
            .get(method)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dump(&self) -> CatalogDump<'_> {
        CatalogDump {
            flapi: &self.project,
            endpoints: self.endpoints().collect(),
        }
    }
}

/// The active catalog, swappable as a whole.
pub struct EndpointCatalog {
    current: ArcSwap<CatalogSnapshot>,
    /// Serializes refreshes; readers never touch it
    refresh_lock: Mutex<()>,
}

impl EndpointCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        info!(
            project = %snapshot.project().project_name,
            endpoints_count = snapshot.len(),
            "Endpoint catalog initialized"
        );
        Self {
            current: ArcSwap::from_pointee(snapshot),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: ProjectConfig) -> Result<Self, ConfigError> {
        CatalogSnapshot::build(config).map(Self::new)
    }

    /// Load from a source and build the initial catalog.
    pub fn load(source: &dyn ConfigSource) -> anyhow::Result<Self> {
        let config = source.load()?;
        Ok(Self::from_config(config)?)
    }

    /// The snapshot that is current right now.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.load_full()
    }

    /// Entries answering `method` in the current snapshot, in configuration order.
    #[must_use]
    pub fn lookup_candidates(&self, method: &Method) -> Vec<Arc<CatalogEntry>> {
        self.current.load().lookup_candidates(method).to_vec()
    }

    /// Validate `config` and atomically make it the active catalog.
    ///
    /// On error the previous snapshot stays active.
    ///
    /// # Returns
    ///
    /// The number of endpoints now being served.
    pub fn replace_all(&self, config: ProjectConfig) -> Result<usize, ConfigError> {
        let _guard = self
            .refresh_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.install(config)
    }

    /// Reload from `source` and replace the catalog.
    ///
    /// Load and validation happen under the refresh lock so two refreshes never
    /// race to install stale data.
    pub fn refresh(&self, source: &dyn ConfigSource) -> anyhow::Result<usize> {
        let _guard = self
            .refresh_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let config = source.load().inspect_err(|e| {
            let detail = format!("{e:#}");
            error!(error = %detail, "Configuration reload failed, keeping current catalog");
        })?;
        Ok(self.install(config)?)
    }

    fn install(&self, config: ProjectConfig) -> Result<usize, ConfigError> {
        let previous = self.current.load().len();
        match CatalogSnapshot::build(config) {
            Ok(snapshot) => {
                let count = snapshot.len();
                self.current.store(Arc::new(snapshot));
                info!(
                    previous_endpoints = previous,
                    endpoints_count = count,
                    "Endpoint catalog replaced"
                );
                Ok(count)
            }
            Err(e) => {
                error!(
                    error = %e,
                    endpoints_count = previous,
                    "Rejected invalid configuration, keeping current catalog"
                );
                Err(e)
            }
        }
    }
}
