use crate::net::Incoming;
use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use futures_util::{SinkExt, StreamExt};
use riftgraph_core::Msg;
use tokio::net::UnixStream;
use tokio_util::bytes::Bytes;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

pub fn spawn_reader(sock_path: String, tx: Sender<Incoming>) {
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                let _ = tx.send(Incoming::error(sock_path, format!("tokio runtime: {e}")));
                return;
            }
        };
        rt.block_on(async move {
            if let Err(e) = run(sock_path.clone(), tx.clone()).await {
                tracing::warn!(path = %sock_path, error = %format!("{e:#}"), "feed unavailable");
                let _ = tx.send(Incoming::error(sock_path.clone(), format!("{e:#}")));
                let _ = tx.send(Incoming::disconnected(sock_path.clone()));
            }
        });
    });
}

async fn run(sock_path: String, tx: Sender<Incoming>) -> Result<()> {
    let stream = UnixStream::connect(&sock_path)
        .await
        .with_context(|| format!("connect UDS {sock_path}"))?;

    let mut framed = Framed::new(stream, LengthDelimitedCodec::new());

    let _ = tx.send(Incoming::connected(sock_path.clone()));

    let hello = Msg::Hello {
        version: env!("CARGO_PKG_VERSION").into(),
    };
    framed
        .send(Bytes::from(serde_json::to_vec(&hello)?))
        .await?;

    while let Some(frame) = framed.next().await {
        let bytes = frame?;
        match serde_json::from_slice::<Msg>(&bytes) {
            Ok(m) => {
                if let Some(inc) = Incoming::from_msg(sock_path.clone(), m) {
                    let _ = tx.send(inc);
                }
            }
            Err(e) => {
                let _ = tx.send(Incoming::error(
                    sock_path.clone(),
                    format!("decode error: {e}"),
                ));
            }
        }
    }

    let _ = tx.send(Incoming::disconnected(sock_path.clone()));
    Ok(())
}
