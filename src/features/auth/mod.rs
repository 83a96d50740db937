mod validator;

pub mod dto;
pub mod guards;
pub mod handler;
pub mod model;
pub mod permissions;
pub mod routes;

pub use validator::JwtValidator;
