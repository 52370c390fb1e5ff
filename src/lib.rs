pub mod cli;
pub mod config;
pub mod manifest;
pub mod runtime;

pub use otterwrap_sig::{CallKind, FunctionSig, SignatureKey, ValueKind};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
