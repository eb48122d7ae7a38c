pub mod pins;
pub mod snapshot;
pub mod watch;
