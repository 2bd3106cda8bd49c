//! Request and response types specific to the web layer.
//!
//! Storage and folder size wire types live next to their services.

pub mod session;
pub mod validation;

pub use session::{LoginRequest, LoginResponse, UserSession};
pub use validation::ValidatedJson;
