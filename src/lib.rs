//! HTTP CRUD service over a single `categories` table.
//!
//! Request flow: [`router`] → [`handler`] → [`repository`] → [`store`].
//! The repository is the only place raw store errors are classified; the
//! [`guard`] catches whatever escapes classification.

pub mod config;
pub mod error;
pub mod guard;
pub mod handler;
pub mod model;
pub mod openapi;
pub mod repository;
pub mod router;
pub mod store;
pub mod telemetry;

pub use error::{ApiError, CategoryError, CategoryResult};
pub use handler::AppState;
pub use model::{Category, CategoryPayload};
pub use repository::CategoryRepository;
pub use router::category_router;
pub use store::CategoryTable;
pub use store::memory::MemoryTable;
pub use store::postgres::Session;
