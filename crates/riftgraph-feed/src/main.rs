mod config;
mod server;
mod source;
mod watch;

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = config::parse_args()?;
    let sock_path = config.socket_path();

    // Clean stale socket
    let _ = std::fs::remove_file(&sock_path);

    let initial = source::current_frame(&config.result_path);
    let (latest_tx, latest_rx) = tokio::sync::watch::channel(Arc::new(initial));

    let (change_tx, mut change_rx) = mpsc::channel::<()>(16);
    // Dropping the watcher stops notifications; it lives as long as main.
    let _watcher = watch::spawn(&config.result_path, change_tx)?;

    let result_path = config.result_path.clone();
    tokio::spawn(async move {
        while change_rx.recv().await.is_some() {
            let frame = source::current_frame(&result_path);
            latest_tx.send_replace(Arc::new(frame));
        }
    });

    server::run(&sock_path, latest_rx).await
}
