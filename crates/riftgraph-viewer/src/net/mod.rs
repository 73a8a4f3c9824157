pub mod file;
pub mod protocol;
pub mod uds;

pub use protocol::{Incoming, IncomingKind};
pub use uds::spawn_reader;
