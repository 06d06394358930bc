pub mod location;
pub mod time;

pub use location::{distance_km, format_distance, GeoPoint};
pub use time::{format_minute, format_price, relative_time, relative_time_at};
