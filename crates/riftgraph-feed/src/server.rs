use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use riftgraph_core::Msg;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixListener;
use tokio::sync::watch;
use tokio_util::bytes::Bytes;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

async fn send<S>(framed: &mut Framed<S, LengthDelimitedCodec>, msg: &Msg) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    framed.send(Bytes::from(serde_json::to_vec(msg)?)).await?;
    Ok(())
}

pub async fn run(sock_path: &Path, latest: watch::Receiver<Arc<Msg>>) -> Result<()> {
    let listener = UnixListener::bind(sock_path)
        .with_context(|| format!("bind {}", sock_path.display()))?;
    tracing::info!(path = %sock_path.display(), "riftgraph-feed listening");

    loop {
        let (stream, _addr) = listener.accept().await?;
        let latest = latest.clone();
        tokio::spawn(async move {
            if let Err(err) = serve(stream, latest).await {
                tracing::debug!(error = %format!("{err:#}"), "viewer session ended");
            }
        });
    }
}

fn reply_to(msg: &Msg, latest: &Arc<Msg>) -> Option<Arc<Msg>> {
    match msg {
        Msg::RequestResult => Some(Arc::clone(latest)),
        Msg::Ping => Some(Arc::new(Msg::Pong)),
        _ => None,
    }
}

/// One viewer session: `Hello`, the current frame, then every new frame as
/// the watched file changes.
async fn serve<S>(stream: S, mut latest: watch::Receiver<Arc<Msg>>) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framed = Framed::new(stream, LengthDelimitedCodec::new());
    tracing::info!("viewer connected");

    let hello = Msg::Hello {
        version: VERSION.into(),
    };
    send(&mut framed, &hello).await?;
    let current = latest.borrow_and_update().clone();
    send(&mut framed, &current).await?;

    loop {
        tokio::select! {
            frame = framed.next() => {
                let Some(frame) = frame else {
                    break;
                };
                let bytes = frame?;
                match serde_json::from_slice::<Msg>(&bytes) {
                    Ok(msg) => {
                        let current = latest.borrow().clone();
                        if let Some(reply) = reply_to(&msg, &current) {
                            send(&mut framed, &reply).await?;
                        }
                    }
                    Err(err) => tracing::debug!(%err, "ignoring undecodable frame"),
                }
            }
            changed = latest.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = latest.borrow_and_update().clone();
                send(&mut framed, &current).await?;
            }
        }
    }

    tracing::info!("viewer disconnected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use riftgraph_core::AnalysisResult;

    fn result_frame(total: u64) -> Arc<Msg> {
        let mut result = AnalysisResult::default();
        result.summary.total_accounts_analyzed = total;
        Arc::new(Msg::Result {
            result: Box::new(result),
        })
    }

    async fn recv<S>(framed: &mut Framed<S, LengthDelimitedCodec>) -> Msg
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let bytes = framed.next().await.expect("frame").expect("io");
        serde_json::from_slice(&bytes).expect("decode")
    }

    #[test]
    fn replies_only_to_requests_and_pings() {
        let latest = result_frame(1);
        assert!(matches!(
            reply_to(&Msg::Ping, &latest).as_deref(),
            Some(Msg::Pong)
        ));
        let again = reply_to(&Msg::RequestResult, &latest).expect("reply");
        assert!(Arc::ptr_eq(&again, &latest));
        assert!(reply_to(&Msg::Pong, &latest).is_none());
    }

    #[tokio::test]
    async fn session_sends_hello_current_and_updates() {
        let (server_side, client_side) = tokio::net::UnixStream::pair().expect("pair");
        let (tx, rx) = watch::channel(result_frame(1));
        let session = tokio::spawn(serve(server_side, rx));
        let mut client = Framed::new(client_side, LengthDelimitedCodec::new());

        assert!(matches!(recv(&mut client).await, Msg::Hello { .. }));
        match recv(&mut client).await {
            Msg::Result { result } => assert_eq!(result.summary.total_accounts_analyzed, 1),
            other => panic!("unexpected frame: {other:?}"),
        }

        send(&mut client, &Msg::Ping).await.expect("ping");
        assert!(matches!(recv(&mut client).await, Msg::Pong));

        tx.send_replace(Arc::new(Msg::Error {
            detail: "parse failed".into(),
        }));
        match recv(&mut client).await {
            Msg::Error { detail } => assert_eq!(detail, "parse failed"),
            other => panic!("unexpected frame: {other:?}"),
        }

        drop(client);
        session.await.expect("join").expect("session");
    }
}
