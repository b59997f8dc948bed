//! Lazily connected workbook handle.
//!
//! Connecting to a workbook (authenticating, opening the document) happens
//! once per process, on first use. The resulting handle is shared by every
//! table and lives until the `LazyWorkbook` is dropped at exit.

use std::sync::{Arc, OnceLock};

use tracing::info;

use rollbook_sheet::{FileWorkbook, InMemoryWorkbook, SharedBackend};

use crate::config::{BackendConfig, SchoolConfig};
use crate::error::{SdkError, SdkResult};

/// Connect-once holder for the shared workbook backend.
pub struct LazyWorkbook {
    config: SchoolConfig,
    handle: OnceLock<SharedBackend>,
}

impl LazyWorkbook {
    pub fn new(config: SchoolConfig) -> Self {
        Self {
            config,
            handle: OnceLock::new(),
        }
    }

    /// Wrap an already connected backend.
    pub fn from_backend(config: SchoolConfig, backend: SharedBackend) -> Self {
        let handle = OnceLock::new();
        let _ = handle.set(backend);
        Self { config, handle }
    }

    pub fn config(&self) -> &SchoolConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.handle.get().is_some()
    }

    /// The shared backend, connecting on first call.
    pub fn handle(&self) -> SdkResult<SharedBackend> {
        if let Some(backend) = self.handle.get() {
            return Ok(Arc::clone(backend));
        }
        let backend = connect(&self.config)?;
        // A concurrent first call may have won the race; keep its handle.
        let _ = self.handle.set(backend);
        self.handle
            .get()
            .cloned()
            .ok_or_else(|| SdkError::Config("workbook handle vanished after connect".into()))
    }
}

impl std::fmt::Debug for LazyWorkbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyWorkbook")
            .field("backend", &self.config.backend)
            .field("connected", &self.is_connected())
            .finish()
    }
}

fn connect(config: &SchoolConfig) -> SdkResult<SharedBackend> {
    info!(
        workbook_id = config.workbook_id.as_deref().unwrap_or("<unset>"),
        credentials = if config.credentials.is_some() { "provided" } else { "none" },
        "connecting to workbook"
    );
    let backend: SharedBackend = match &config.backend {
        BackendConfig::Memory => Arc::new(InMemoryWorkbook::new()),
        BackendConfig::File { path } => Arc::new(FileWorkbook::open(path)?),
    };
    Ok(backend)
}
