pub mod entry;
pub mod feed;
pub mod user;

pub use entry::{EntryView, Period, RawEntry, WatchlistEntry, UNKNOWN};
pub use feed::Feed;
pub use user::User;
