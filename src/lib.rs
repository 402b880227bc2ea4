// Library side of the chat mockup, re-exported for the binary and the tests
pub mod config;
pub mod messenger;
pub mod models;
pub mod sim;   // Simulated receipts, typing and recording
pub mod store;

// Re-export main types for convenience
pub use config::AppConfig;
pub use messenger::Messenger;
pub use models::*;
pub use store::StoreError;
