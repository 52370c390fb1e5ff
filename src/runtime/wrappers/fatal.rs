use otterwrap_sig::SignatureKey;
use thiserror::Error;
use tracing::error;

use crate::runtime::codegen::CodegenError;

/// Internal invariant violations the runtime cannot recover from.
///
/// These are never returned to callers; they are handed to [`abort_with`].
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("failed to compile wrapper {key}: {source}")]
    WrapperCompilation {
        key: SignatureKey,
        source: CodegenError,
    },
    #[error("module code space exhausted: {0}")]
    CodeSpaceExhausted(&'static str),
}

/// Report `err` and abort the process.
pub fn abort_with(err: FatalError) -> ! {
    error!(error = %err, "fatal runtime error");
    eprintln!("\n#\n# Fatal error in otterwrap runtime\n# {err}\n#");
    std::process::abort()
}
