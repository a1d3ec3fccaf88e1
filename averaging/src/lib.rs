pub mod aggregate;
pub mod combination;
pub mod discovery;
mod error;
pub mod manifest;
pub mod metadata;
pub mod pipeline;
pub mod settings;
pub mod trajectory;

pub use error::{Error, Result};
