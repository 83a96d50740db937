pub mod auth;
pub mod exports;
pub mod geo;
pub mod lookups;
pub mod map;
pub mod notifications;
pub mod reports;
pub mod users;
