//! Diagnostics sink
//!
//! Registry and factory failures are reported through an injected
//! [`DiagnosticSink`] instead of a process-wide logger, so callers (and tests)
//! decide where they go. [`TracingSink`] is the production choice.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// One reported diagnostic
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    /// Reporting component, e.g. `"manager"`
    pub component: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, component: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            component,
            message: message.into(),
        }
    }

    pub fn warning(component: &'static str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warning, component, message)
    }

    pub fn error(component: &'static str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, component, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.level, self.component, self.message)
    }
}

/// Destination for diagnostics
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Shared sink handle
pub type SharedSink = Arc<dyn DiagnosticSink>;

/// Forwards diagnostics to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn shared() -> SharedSink {
        Arc::new(Self)
    }
}

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        let Diagnostic {
            level,
            component,
            message,
        } = diagnostic;
        match level {
            DiagnosticLevel::Debug => tracing::debug!(component, "{message}"),
            DiagnosticLevel::Info => tracing::info!(component, "{message}"),
            DiagnosticLevel::Warning => tracing::warn!(component, "{message}"),
            DiagnosticLevel::Error => tracing::error!(component, "{message}"),
        }
    }
}

/// Keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    /// Number of diagnostics at or above `level`
    pub fn count_at_least(&self, level: DiagnosticLevel) -> usize {
        self.lock().iter().filter(|d| d.level >= level).count()
    }

    /// Whether any message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lock().iter().any(|d| d.message.contains(needle))
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        // entries are append-only, a poisoned lock still holds whole values
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, diagnostic: Diagnostic) {
        self.lock().push(diagnostic);
    }
}
