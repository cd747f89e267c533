//! Organizations (tenants), billing settings, join requests and membership.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/organizations` | Create and become admin |
//! | GET/PUT | `/api/organizations/current` | Caller's organization |
//! | GET/PUT | `/api/organizations/settings` | Currency, invoice numbering, tax, terms |
//! | GET | `/api/organizations/search` | Find an organization to join |
//! | POST | `/api/organizations/{id}/join-requests` | Ask to join |
//! | GET | `/api/organizations/join-requests` | Requests awaiting review (admin) |
//! | GET | `/api/organizations/join-requests/mine` | Caller's requests |
//! | PUT | `/api/organizations/join-requests/{id}/approve` | Approve (admin) |
//! | PUT | `/api/organizations/join-requests/{id}/deny` | Deny (admin) |
//! | GET | `/api/organizations/members` | Members |
//! | PUT | `/api/organizations/members/{user_id}/role` | Change role (admin) |
//! | DELETE | `/api/organizations/members/{user_id}` | Remove member (admin) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::OrganizationService;
