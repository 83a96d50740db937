//! Staff accounts and their access level.
//!
//! Accounts are created by the identity provider; this feature loads them for
//! the auth middleware and lets admins change who may do what.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/admin/users` | Every account with its access level |
//! | PUT | `/api/admin/users/{id}/access` | Set role, or `nologin` to deactivate |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::UserService;
