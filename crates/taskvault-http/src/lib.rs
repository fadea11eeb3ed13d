//! # Taskvault HTTP
//!
//! The HTTP boundary for the taskvault service: wire types, validation at
//! the edge, error-to-status mapping, and the axum router. All business
//! rules live in `taskvault-store`; this layer only parses, delegates, and
//! renders.

pub mod api;
pub mod error;
pub mod handlers;
pub mod router;

pub use error::{ApiError, ErrorResponse};
pub use router::{build_router, AppState};
