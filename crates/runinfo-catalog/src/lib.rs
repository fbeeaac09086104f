//! # runinfo-catalog
//!
//! Explicit component registration for the runinfo kernel.
//!
//! A catalog document (JSON or TOML) lists every component class the
//! process knows about, with its parents, defaults, annotations and resume
//! preferences. [`load_catalog`] turns it into a
//! [`ComponentRegistry`](runinfo_kernel::ComponentRegistry) once at start-up;
//! the kernel never looks anything up by reflection.
//!
//! ```text
//! catalog.{json,toml}
//!     │  parse + schema check
//! Catalog rows
//!     │  parents folded (abstracts, kind bases, same-kind components)
//! ComponentRegistry
//! ```

pub mod build;
pub mod schema;

pub use build::build_registry;
pub use schema::{CATALOG_KIND, CATALOG_SCHEMA, Catalog, ComponentRow, DescriptorRow};

use runinfo_kernel::ComponentRegistry;
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read file: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json at {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("unsupported catalog: {0}")]
    Unsupported(String),

    #[error("{component}: unknown parent '{parent}'")]
    UnknownParent { component: String, parent: String },

    #[error("parent cycle: {}", .chain.join(" -> "))]
    ParentCycle { chain: Vec<String> },

    #[error("{component} is registered twice")]
    Duplicate { component: String },

    #[error("{component}: {reason}")]
    MalformedRow { component: String, reason: String },
}

/// Document formats accepted for catalogs, defaults files and input infos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// `.toml` files are TOML; everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// Read a JSON or TOML document, keeping mapping order.
pub fn read_document(path: &Path) -> Result<Value, CatalogError> {
    let text = read_text(path)?;
    parse_document(&text, DocumentFormat::from_path(path), &display_path(path))
}

pub fn parse_document(
    text: &str,
    format: DocumentFormat,
    origin: &str,
) -> Result<Value, CatalogError> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str(text).map_err(|source| CatalogError::ParseJson {
                path: origin.to_string(),
                source,
            })
        }
        DocumentFormat::Toml => toml::from_str(text).map_err(|source| CatalogError::ParseToml {
            path: origin.to_string(),
            source,
        }),
    }
}

/// Parse a catalog document without building it.
pub fn parse_catalog(
    text: &str,
    format: DocumentFormat,
    origin: &str,
) -> Result<Catalog, CatalogError> {
    let catalog: Catalog = match format {
        DocumentFormat::Json => {
            serde_json::from_str(text).map_err(|source| CatalogError::ParseJson {
                path: origin.to_string(),
                source,
            })?
        }
        DocumentFormat::Toml => toml::from_str(text).map_err(|source| CatalogError::ParseToml {
            path: origin.to_string(),
            source,
        })?,
    };
    if catalog.schema != CATALOG_SCHEMA {
        return Err(CatalogError::Unsupported(format!(
            "schema must be {CATALOG_SCHEMA} at {origin}, got {}",
            catalog.schema
        )));
    }
    if catalog.catalog_kind != CATALOG_KIND {
        return Err(CatalogError::Unsupported(format!(
            "catalog kind mismatch at {origin}: expected {CATALOG_KIND:?}, got {:?}",
            catalog.catalog_kind
        )));
    }
    Ok(catalog)
}

/// Load and build the registry declared by the catalog at `path`.
///
/// `defaultsFile` entries are resolved relative to the catalog's directory.
pub fn load_catalog(path: &Path) -> Result<ComponentRegistry, CatalogError> {
    let text = read_text(path)?;
    let catalog = parse_catalog(&text, DocumentFormat::from_path(path), &display_path(path))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let registry = build_registry(&catalog, base_dir)?;
    tracing::debug!(
        path = %display_path(path),
        components = catalog.components.len(),
        externals = catalog.externals.len(),
        "component catalog loaded"
    );
    Ok(registry)
}

fn read_text(path: &Path) -> Result<String, CatalogError> {
    fs::read_to_string(path).map_err(|source| CatalogError::ReadFile {
        path: display_path(path),
        source,
    })
}

pub(crate) fn display_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
