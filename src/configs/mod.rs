pub mod base;
pub mod logging;
pub mod server;
pub mod spoof;

pub use base::*;
pub use logging::*;
pub use server::*;
pub use spoof::*;
