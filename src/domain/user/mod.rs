pub mod model;

pub use model::{permissions_for, UserProfile, UserType};
