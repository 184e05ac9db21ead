//! Getting results out: clipboard text and JSON download.
//!
//! Both exports read the [`DocumentData`] and never change it.

use crate::document::DocumentData;
use crate::error::FieldSenseError;
use crate::fields::FieldCatalog;
use std::path::Path;
use tracing::{debug, info, warn};

/// File name used when the user does not pick one.
pub const DEFAULT_EXPORT_FILENAME: &str = "field-service-extraction-results.json";

/// One `label: text` line per result, in response order.
///
/// Repeated `class_id`s each get their own line; nothing is merged or
/// overwritten by a later duplicate.
pub fn clipboard_listing(doc: &DocumentData, catalog: &FieldCatalog) -> String {
    doc.results
        .iter()
        .map(|r| format!("{}: {}", catalog.label(&r.class_id), r.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write-only text clipboard.
pub trait Clipboard {
    fn set_text(&self, text: &str) -> Result<(), String>;
}

/// The platform clipboard, reached through the usual command-line helpers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), String> {
        platform::set_text(text)
    }
}

/// Copy the listing of `doc` to `clipboard`.
///
/// Fire-and-forget: a failure is logged, never raised. Returns whether the
/// text reached the clipboard.
pub fn copy_to_clipboard(
    clipboard: &dyn Clipboard,
    doc: &DocumentData,
    catalog: &FieldCatalog,
) -> bool {
    let text = clipboard_listing(doc, catalog);
    match clipboard.set_text(&text) {
        Ok(()) => {
            debug!("Copied {} fields to clipboard", doc.results.len());
            true
        }
        Err(e) => {
            warn!("Clipboard copy failed: {}", e);
            false
        }
    }
}

/// Write `doc` as pretty JSON to `path`.
///
/// Uses atomic write (temp file + rename) so a failed export never leaves a
/// truncated file behind.
pub async fn export_json(doc: &DocumentData, path: impl AsRef<Path>) -> Result<(), FieldSenseError> {
    let path = path.as_ref();
    let write_err = |source: std::io::Error| FieldSenseError::ExportWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(doc)
        .map_err(|e| FieldSenseError::Internal(format!("serialise results: {e}")))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }

    info!("Exported {} fields to {}", doc.results.len(), path.display());
    Ok(())
}

#[cfg(target_os = "macos")]
mod platform {
    pub fn set_text(text: &str) -> Result<(), String> {
        super::pipe_to("pbcopy", &[], text)
    }
}

#[cfg(target_os = "windows")]
mod platform {
    pub fn set_text(text: &str) -> Result<(), String> {
        super::pipe_to("clip", &[], text)
    }
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
mod platform {
    pub fn set_text(text: &str) -> Result<(), String> {
        let wayland = std::env::var_os("WAYLAND_DISPLAY").is_some();
        let first = if wayland {
            super::pipe_to("wl-copy", &[], text)
        } else {
            super::pipe_to("xclip", &["-selection", "clipboard"], text)
        };
        first.or_else(|e| {
            if wayland {
                super::pipe_to("xclip", &["-selection", "clipboard"], text)
            } else {
                Err(e)
            }
        })
    }
}

fn pipe_to(program: &str, args: &[&str], text: &str) -> Result<(), String> {
    use std::io::Write;
    use std::process::{Command, Stdio};

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("{program}: {e}"))?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .map_err(|e| format!("{program}: {e}"))?;
    }
    let status = child.wait().map_err(|e| format!("{program}: {e}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("{program} exited with {status}"))
    }
}
