use riftgraph_core::{AnalysisResult, Msg};

#[derive(Debug, Clone)]
pub struct Incoming {
    /// Socket path or file the message came from.
    pub source: String,
    pub kind: IncomingKind,
}

#[derive(Debug, Clone)]
pub enum IncomingKind {
    Connected,
    Disconnected,
    Hello(String),
    Result(Box<AnalysisResult>),
    Error(String),
}

impl Incoming {
    pub fn connected(source: String) -> Self {
        Self {
            source,
            kind: IncomingKind::Connected,
        }
    }

    pub fn disconnected(source: String) -> Self {
        Self {
            source,
            kind: IncomingKind::Disconnected,
        }
    }

    pub fn result(source: String, result: Box<AnalysisResult>) -> Self {
        Self {
            source,
            kind: IncomingKind::Result(result),
        }
    }

    pub fn error(source: String, detail: String) -> Self {
        Self {
            source,
            kind: IncomingKind::Error(detail),
        }
    }

    /// Maps a feed frame onto what the viewer cares about. Keepalives and
    /// requests are not forwarded.
    pub fn from_msg(source: String, msg: Msg) -> Option<Self> {
        let kind = match msg {
            Msg::Hello { version } => IncomingKind::Hello(version),
            Msg::Result { result } => IncomingKind::Result(result),
            Msg::Error { detail } => IncomingKind::Error(detail),
            Msg::RequestResult | Msg::Ping | Msg::Pong => return None,
        };
        Some(Self { source, kind })
    }
}
