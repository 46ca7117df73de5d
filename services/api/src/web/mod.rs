pub mod ai;
pub mod auth;
pub mod dashboard;
pub mod extract;
pub mod library;
pub mod materials;
pub mod middleware;
pub mod ocr;
pub mod quizzes;
pub mod rest;
pub mod router;
pub mod sessions;
pub mod settings;
pub mod state;

// Re-export what the binaries need to build and document the server.
pub use middleware::require_auth;
pub use rest::ApiDoc;
pub use router::app_router;
