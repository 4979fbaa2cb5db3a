pub mod config;
pub mod export;
pub mod identity;
pub mod media;
pub mod prompt;
pub mod session;
pub mod transform;

pub use session::Session;
