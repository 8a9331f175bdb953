use std::process::ExitCode;

use gaze_pointer::config::Config;
use gaze_pointer::logging::{init_tracing, LogConfig};
use gaze_pointer::startup::build_session;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    init_tracing(&LogConfig::from_env());
    tracing::info!("Starting gaze-pointer");

    let config = Config::from_env();

    let session = match build_session(&config) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("error: {e}");
            eprintln!("hint: {}", e.remediation());
            return ExitCode::FAILURE;
        }
    };

    let summary = session.run().await;
    tracing::info!(
        frames = summary.frames,
        failed_frames = summary.failed_frames,
        events = summary.events,
        exit = ?summary.exit,
        "Shutdown complete"
    );

    ExitCode::SUCCESS
}
