use bevy::prelude::Resource;
use crossbeam_channel::Receiver;

use crate::net::Incoming;

/// Frames from the socket reader and the one-shot file loader.
#[derive(Resource)]
pub struct NetRx(pub Receiver<Incoming>);
