pub mod points;
pub mod time_range;

pub use points::{BalancePoint, PricePoint, TvlVolumePoint};
pub use time_range::TimeRange;
