//! Email/password authentication with self-issued HS256 tokens.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/auth/register` | Create an account and return a token |
//! | POST | `/api/auth/login` | Exchange credentials for a token |
//! | GET | `/api/auth/me` | Current user |

pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod jwt;
pub mod model;
pub mod password;
pub mod routes;
pub mod services;

pub use jwt::JwtService;
pub use services::AuthService;
