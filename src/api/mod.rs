// API layer module (HTTP adapter over the domain and repositories)

pub mod errors;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod pagination;
pub mod responses;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
