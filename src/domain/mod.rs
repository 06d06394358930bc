pub mod auth;
pub mod catalog;
pub mod customer;
pub mod favorites;
pub mod shared;
pub mod user;
