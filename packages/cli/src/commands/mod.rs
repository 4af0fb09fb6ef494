pub mod init;
pub mod replay;

pub use init::{init, InitArgs};
pub use replay::{replay, ReplayArgs};
