// SPDX-License-Identifier: MIT OR Apache-2.0
//! WireBench - visual testbed wiring for the lab grading platform.
//!
//! Loads a testbed topology, restores any saved connections, and opens the
//! wire editor. The wired-up document is submitted to the grading server
//! from the toolbar.

mod app;
mod config;
mod session;
mod upload;

use app::WireBenchApp;
use config::EditorConfig;
use session::WireSession;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("wirebench_app=info".parse().unwrap())
        .add_directive("wirebench_wiring=info".parse().unwrap());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting WireBench v{}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::CONFIG_FILE_NAME.to_owned());
    let config = match EditorConfig::load(Path::new(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    // A malformed topology is fatal at session start
    let session = match WireSession::start(&config) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("cannot start session: {e}");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions::default();
    if let Err(e) = eframe::run_native(
        "WireBench",
        options,
        Box::new(|_cc| Ok(Box::new(WireBenchApp::new(session)))),
    ) {
        tracing::error!("editor crashed: {e}");
        std::process::exit(1);
    }
}
