//! HTTP server module.
//!
//! An axum-based server exposing the user registry as a JSON REST API plus
//! a single bundled HTML page.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Request parsing and id validation                      │
//! │  - JSON serialization/deserialization                     │
//! │  - CORS, compression, error rendering                     │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (db::services)                             │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db::repositories)                      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! | Method | Path              | Handler                    |
//! |--------|-------------------|----------------------------|
//! | GET    | `/`               | [`handlers::index`]        |
//! | GET    | `/health`         | [`handlers::health_check`] |
//! | GET    | `/api/users`      | [`handlers::list_users`]   |
//! | POST   | `/api/users`      | [`handlers::create_user`]  |
//! | GET    | `/api/users/{id}` | [`handlers::get_user`]     |
//! | PUT    | `/api/users/{id}` | [`handlers::update_user`]  |
//! | DELETE | `/api/users/{id}` | [`handlers::delete_user`]  |

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
