pub mod errors;
pub mod logger;
pub mod notifier;
pub mod types;

pub use errors::*;
pub use logger::*;
pub use notifier::*;
pub use types::*;
