use anyhow::Result;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub result_path: PathBuf,
    pub socket_path: Option<PathBuf>,
}

impl FeedConfig {
    pub fn socket_path(&self) -> PathBuf {
        self.socket_path.clone().unwrap_or_else(runtime_sock_path)
    }
}

pub fn runtime_sock_path() -> PathBuf {
    // Wayland-friendly: prefer XDG_RUNTIME_DIR
    match std::env::var_os("XDG_RUNTIME_DIR") {
        Some(dir) => PathBuf::from(dir).join("riftgraph.sock"),
        None => PathBuf::from("/tmp/riftgraph.sock"),
    }
}

pub fn parse_args() -> Result<FeedConfig> {
    parse_args_from(std::env::args_os().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<FeedConfig>
where
    I: IntoIterator<Item = OsString>,
{
    let mut result_path = None;
    let mut socket_path = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--result" {
            let Some(path) = args.next() else {
                anyhow::bail!("--result expects a path");
            };
            result_path = Some(PathBuf::from(path));
        } else if arg == "--socket" {
            let Some(path) = args.next() else {
                anyhow::bail!("--socket expects a path");
            };
            socket_path = Some(PathBuf::from(path));
        } else {
            anyhow::bail!("unknown argument: {:?}", arg);
        }
    }

    let Some(result_path) = result_path else {
        anyhow::bail!("missing --result <analysis.json>");
    };

    Ok(FeedConfig {
        result_path,
        socket_path,
    })
}
