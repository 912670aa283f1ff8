pub mod controller;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod sessions;

pub use controller::{InteractionController, RenderState, SelectionUpdate};
pub use error::{ApiError, Result};
pub use router::create_router;
pub use server::run_server;
pub use sessions::{AppState, SessionStore};
