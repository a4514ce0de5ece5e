pub mod error;
pub mod id;
pub mod tolerance;
pub mod traits;

pub use error::{CleaveError, Result};
pub use id::NodeId;
pub use tolerance::Tolerance;
