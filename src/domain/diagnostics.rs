// ============================================================
// DIAGNOSTICS
// ============================================================
// Caller-visible, request-scoped notes about an extraction or analysis

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub id: u64,
    pub level: DiagnosticLevel,
    pub source: String,
    pub message: String,
}

/// Monotonic id source owned by one request.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u64 {
        self.last += 1;
        self.last
    }
}

/// Collects diagnostics for one request and mirrors them to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    ids: IdGenerator,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing generator, e.g. one shared across the
    /// stages of a single request.
    pub fn with_ids(ids: IdGenerator) -> Self {
        Self {
            ids,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, level: DiagnosticLevel, source: &str, message: impl Into<String>) -> u64 {
        let id = self.ids.next_id();
        let message = message.into();

        match level {
            DiagnosticLevel::Info => tracing::info!(id, source, "{}", message),
            DiagnosticLevel::Warning => tracing::warn!(id, source, "{}", message),
            DiagnosticLevel::Error => tracing::error!(id, source, "{}", message),
        }

        self.entries.push(Diagnostic {
            id,
            level,
            source: source.to_string(),
            message,
        });
        id
    }

    pub fn info(&mut self, source: &str, message: impl Into<String>) -> u64 {
        self.push(DiagnosticLevel::Info, source, message)
    }

    pub fn warn(&mut self, source: &str, message: impl Into<String>) -> u64 {
        self.push(DiagnosticLevel::Warning, source, message)
    }

    pub fn error(&mut self, source: &str, message: impl Into<String>) -> u64 {
        self.push(DiagnosticLevel::Error, source, message)
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error)
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_request_scoped() {
        let mut first = Diagnostics::new();
        first.info("CSV", "one");
        first.warn("CSV", "two");

        let mut second = Diagnostics::new();
        let id = second.error("PDF", "three");

        assert_eq!(
            first.entries().iter().map(|d| d.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(id, 1);
        assert!(second.has_errors());
        assert!(!first.has_errors());
    }

    #[test]
    fn test_with_ids_continues_sequence() {
        let mut ids = IdGenerator::new();
        ids.next_id();
        let mut diagnostics = Diagnostics::with_ids(ids);
        assert_eq!(diagnostics.info("XLSX", "note"), 2);
    }
}
