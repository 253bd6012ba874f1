pub mod codec;
pub mod history_domain;
pub mod seekbar;

pub use codec::CodecPolicy;
pub use history_domain::WatchHistoryDomainCheck;
pub use seekbar::SeekbarLayout;
