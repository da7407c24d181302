pub mod replica;
pub mod uci;

pub use replica::{GameReplica, ReplicaError};
pub use uci::{MoveFormatError, UciMove};
