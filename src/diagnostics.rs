//! Diagnostics recorded instead of surfacing errors to the page

use bevy::ecs::resource::Resource;

/// Diagnostics kept before the oldest are dropped
pub const DIAGNOSTICS_CAPACITY: usize = 64;

/// One reported problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Identifier of the embed concerned, when known
    pub id: Option<String>,
    /// Human readable message
    pub message: String,
}

/// Resource collecting the most recent diagnostics the embed app reported
///
/// Reporting also logs at error level, so a page with a console sees the same
/// message the host can read back from [`Diagnostics::entries`]. At most
/// [`DIAGNOSTICS_CAPACITY`] entries are kept.
#[derive(Resource, Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Log and store a diagnostic, dropping the oldest when full
    pub fn report(&mut self, id: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        match id {
            Some(id) => log::error!("[embed #{id}] {message}"),
            None => log::error!("[embed] {message}"),
        }
        if self.entries.len() == DIAGNOSTICS_CAPACITY {
            self.entries.remove(0);
        }
        self.entries.push(Diagnostic {
            id: id.map(str::to_string),
            message,
        });
    }

    /// Retained diagnostics, oldest first
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of retained diagnostics
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was reported
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
