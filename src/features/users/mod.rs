//! User accounts and self-service profile management.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/users` | List members of the caller's organization |
//! | GET | `/api/users/{id}` | Get a user |
//! | GET | `/api/users/profile` | Get own profile |
//! | PUT | `/api/users/profile` | Update name, email or phone |
//! | PUT | `/api/users/password` | Change password |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::UserService;
