//! Terra Release - chat-triggered release automation for the Terra iOS app.

use std::process;
use terra_release::cli;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            eprintln!("Fatal error: {e:#}");
            process::exit(1);
        }
    }
}
