// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fire-and-forget submission of the wire document.
//!
//! The session never awaits the server: the POST runs on a background
//! thread and its outcome comes back over a channel for the status bar.
//! Retries, if any, belong to the transport collaborator, not here.

use std::sync::mpsc::Sender;
use wirebench_wiring::WireDocument;

/// Outcome of one submission
#[derive(Debug, Clone)]
pub enum UploadStatus {
    /// The endpoint accepted the document
    Accepted,
    /// The request failed or the endpoint rejected it
    Failed(String),
}

/// Submit the document to the endpoint on a background thread.
///
/// Returns immediately; the outcome arrives on `events` when the request
/// completes. The response body is opaque, only success/failure is kept.
pub fn submit(url: String, document: WireDocument, events: Sender<UploadStatus>) {
    std::thread::spawn(move || {
        let status = match post_document(&url, &document) {
            Ok(()) => {
                tracing::info!(%url, "wire document accepted");
                UploadStatus::Accepted
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "wire document submission failed");
                UploadStatus::Failed(e)
            }
        };
        // The session may already be gone; nothing left to notify then
        let _ = events.send(status);
    });
}

fn post_document(url: &str, document: &WireDocument) -> Result<(), String> {
    let response = reqwest::blocking::Client::new()
        .post(url)
        .json(document)
        .send()
        .map_err(|e| e.to_string())?;

    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(format!("endpoint returned {status}"))
    }
}
