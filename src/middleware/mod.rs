// Middleware for CORS and multipart staging

pub mod cors;
pub mod staging;

pub use cors::*;
pub use staging::*;
