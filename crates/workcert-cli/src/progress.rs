// crates/workcert-cli/src/progress.rs
// ============================================================================
// Module: Progress Rendering
// Description: Terminal rendering of aggregate loading state.
// Purpose: Turn observer output into deduplicated progress lines on stderr.
// Dependencies: workcert-tracker
// ============================================================================

//! ## Overview
//! [`ProgressRenderer`] is the listener the CLI attaches to its
//! [`workcert_tracker::LoadingObserver`]. Each notification is reduced to a
//! single line by [`progress_line`]; identical consecutive lines are
//! suppressed so a checkpoint that does not move the aggregate prints
//! nothing. Rendering never fails the command it decorates.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;
use std::sync::PoisonError;

use workcert_tracker::LoadingState;
use workcert_tracker::RequestRecord;

// ============================================================================
// SECTION: Formatting
// ============================================================================

/// Bytes per mebibyte.
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Formats a byte count as megabytes with two decimals.
pub(crate) fn format_megabytes(bytes: u64) -> String {
    let hundredths = bytes.saturating_mul(100) / BYTES_PER_MB;
    format!("{}.{:02} MB", hundredths / 100, hundredths % 100)
}

/// Describes the file attached to a record, if any.
fn file_suffix(record: &RequestRecord) -> Option<String> {
    let name = record.file_name.as_deref()?;
    match record.file_size {
        Some(size) => Some(format!(" {name} ({})", format_megabytes(size))),
        None => Some(format!(" {name}")),
    }
}

/// Builds the progress line for `state`; `None` when nothing is active.
pub(crate) fn progress_line(state: &LoadingState) -> Option<String> {
    let current = state.current_operation.as_ref()?;
    let mut line = format!("[{:>3}%] {}", state.overall_progress, current.kind.label());
    if let Some(suffix) = file_suffix(current) {
        line.push_str(&suffix);
    }
    let others = state.active_requests.len().saturating_sub(1);
    if others > 0 {
        line.push_str(&format!(" (+{others} more)"));
    }
    Some(line)
}

// ============================================================================
// SECTION: Renderer
// ============================================================================

/// Writer plus the last line it received.
struct RenderTarget<W> {
    /// Output stream.
    writer: W,
    /// Last line written.
    last: Option<String>,
}

/// Deduplicating progress line writer.
pub(crate) struct ProgressRenderer<W: Write + Send> {
    /// Serialized output target.
    target: Mutex<RenderTarget<W>>,
}

impl<W: Write + Send> ProgressRenderer<W> {
    /// Creates a renderer writing to `writer`.
    pub(crate) const fn new(writer: W) -> Self {
        Self {
            target: Mutex::new(RenderTarget {
                writer,
                last: None,
            }),
        }
    }

    /// Renders `state`, skipping idle states and repeats.
    pub(crate) fn render(&self, state: &LoadingState) {
        let mut target = self.target.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(line) = progress_line(state) else {
            target.last = None;
            return;
        };
        if target.last.as_deref() == Some(line.as_str()) {
            return;
        }
        let _ = writeln!(target.writer, "{line}");
        target.last = Some(line);
    }

    /// Returns the writer.
    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.target.into_inner().unwrap_or_else(PoisonError::into_inner).writer
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
