use bevy::prelude::Event;
use riftgraph_core::NodeId;

/// A node hit by a left click in the 3D viewport.
#[derive(Event, Debug, Clone)]
pub struct Picked(pub NodeId);
