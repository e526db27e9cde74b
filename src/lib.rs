// Media Relay - forwards multipart uploads to a remote media store, grouped by folder

pub mod config;
pub mod models;
pub mod types;
pub mod storage;   // Remote media store seam and Cloudinary client
pub mod routes;
pub mod middleware;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
