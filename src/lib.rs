pub mod common;
pub mod configs;
pub mod patches;
pub mod server;
pub mod settings;
pub mod spoof;
pub mod transport;
