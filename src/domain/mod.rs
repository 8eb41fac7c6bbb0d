pub mod models;
pub mod reactions;

pub use models::*;
pub use reactions::*;
