// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-window editing session.

use crate::config::EditorConfig;
use crate::upload::{self, UploadStatus};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use wirebench_wiring::{
    restore_connections, serialize_document, RestoreError, Testbed, TopologyError, WireDocument,
    WireEditorState, WiringController,
};

/// One editing session: the loaded topology, the editor state over it, and
/// the upload plumbing. Discarded when the window closes; nothing persists
/// unless explicitly submitted.
pub struct WireSession {
    /// The immutable topology
    pub testbed: Testbed,
    /// Editor state (controller + retained visuals)
    pub editor: WireEditorState,
    /// Saved entries that failed to restore, kept for the status bar
    pub restore_skipped: Vec<RestoreError>,
    upload_url: String,
    upload_tx: Sender<UploadStatus>,
    upload_rx: Receiver<UploadStatus>,
    /// Most recent submission outcome
    pub last_upload: Option<UploadStatus>,
}

impl WireSession {
    /// Load the topology document and start a session over it.
    ///
    /// A malformed topology is fatal; stale saved connections are skipped
    /// and reported.
    pub fn start(config: &EditorConfig) -> Result<Self, SessionError> {
        let text = std::fs::read_to_string(&config.topology_path)
            .map_err(|e| SessionError::Io(config.topology_path.clone(), e))?;
        let document = WireDocument::from_json_str(&text)?;

        let outcome = restore_connections(&document.connections, &document.testbed);
        for skipped in &outcome.skipped {
            tracing::warn!(%skipped, "saved connection skipped");
        }
        tracing::info!(
            testbed = %document.testbed.testbed_name,
            restored = outcome.connections.len(),
            skipped = outcome.skipped.len(),
            "session started"
        );

        let controller = WiringController::with_connections(outcome.connections, config.cell_px);
        let redraw = controller.redraw_commands(&document.testbed);
        let mut editor = WireEditorState::new(controller);
        editor.apply_commands(redraw);

        let (upload_tx, upload_rx) = channel();
        Ok(Self {
            testbed: document.testbed,
            editor,
            restore_skipped: outcome.skipped,
            upload_url: config.upload_url.clone(),
            upload_tx,
            upload_rx,
            last_upload: None,
        })
    }

    /// Serialize the current connections and submit them to the endpoint
    pub fn submit(&self) {
        let document = serialize_document(&self.testbed, self.editor.controller().connections());
        upload::submit(self.upload_url.clone(), document, self.upload_tx.clone());
    }

    /// Drain upload outcomes that arrived since the last frame
    pub fn poll_uploads(&mut self) {
        while let Ok(status) = self.upload_rx.try_recv() {
            self.last_upload = Some(status);
        }
    }
}

/// Error that aborts session start
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The topology document could not be read
    #[error("cannot read topology {0:?}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    /// The topology document is malformed
    #[error(transparent)]
    Topology(#[from] TopologyError),
}
