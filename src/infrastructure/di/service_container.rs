//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{EvaluationService, Session};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, InputSource, RealFileSystem, StdinSource};

/// Container holding settings and I/O implementations.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Piped input (tree text read via `-`)
    pub input: Arc<dyn InputSource>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem), Arc::new(StdinSource))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        input: Arc<dyn InputSource>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            input,
        }
    }

    pub fn evaluation_service(&self) -> EvaluationService {
        EvaluationService::new(Arc::clone(&self.fs))
    }

    /// New interactive session seeded from settings.
    pub fn session(&self) -> Session {
        Session::new(
            self.evaluation_service(),
            self.settings.direction,
            self.settings.start_with,
            self.settings.format,
        )
    }
}
