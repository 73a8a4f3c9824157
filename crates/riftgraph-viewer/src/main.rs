mod app;
mod graph;
mod net;
mod render;
mod ui;
mod util;

use anyhow::Result;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::app::resources::NetRx;
use crate::app::RiftGraphViewerPlugin;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ViewerArgs {
    result_path: Option<PathBuf>,
    socket_path: Option<String>,
    no_connect: bool,
}

fn parse_args() -> Result<ViewerArgs> {
    parse_args_from(std::env::args_os().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<ViewerArgs>
where
    I: IntoIterator<Item = OsString>,
{
    let mut parsed = ViewerArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--result" {
            let Some(path) = args.next() else {
                anyhow::bail!("--result expects a path");
            };
            parsed.result_path = Some(PathBuf::from(path));
        } else if arg == "--socket" {
            let Some(path) = args.next() else {
                anyhow::bail!("--socket expects a path");
            };
            parsed.socket_path = Some(path.to_string_lossy().into_owned());
        } else if arg == "--no-connect" {
            parsed.no_connect = true;
        } else {
            anyhow::bail!("unknown argument: {:?}", arg);
        }
    }

    Ok(parsed)
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();
    let args = parse_args()?;
    let cfg = util::config::load_or_default();

    let (tx, rx) = crossbeam_channel::unbounded();
    if let Some(path) = args.result_path.as_deref() {
        net::file::load_into(path, &tx);
    }
    if cfg.auto_connect && !args.no_connect {
        let sock = args.socket_path.clone().unwrap_or_else(|| cfg.socket_path());
        tracing::info!(%sock, "connecting to feed");
        net::spawn_reader(sock, tx);
    }

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "RiftGraph".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .insert_resource(NetRx(rx))
        .add_plugins(RiftGraphViewerPlugin { cfg })
        .run();
    Ok(())
}
