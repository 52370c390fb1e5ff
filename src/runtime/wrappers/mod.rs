// Compiled wrapper cache
pub mod cache;
pub mod fatal;

pub use cache::{WrapperCache, WrapperPorts};
pub use fatal::FatalError;
