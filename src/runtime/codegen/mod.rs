// Wrapper code generation
pub mod template;

pub use template::TemplateWrapperCompiler;

use otterwrap_sig::{CallKind, FunctionSig};
use thiserror::Error;

/// Produces machine code for a (call kind, signature) pair.
///
/// Implementations may be slow and may allocate freely, but must be safe to
/// call from any worker thread.
pub trait CodeGenerationPort: Send + Sync {
    fn compile_wrapper(
        &self,
        kind: CallKind,
        sig: &FunctionSig,
        track_source_positions: bool,
    ) -> Result<WrapperArtifact, CodegenError>;
}

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("{kind} wrappers cannot adapt {sig}")]
    Unsupported { kind: CallKind, sig: String },
}

/// Mapping from an instruction offset to a position in the source module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    pub code_offset: u32,
    pub source_offset: u32,
}

/// Raw output of code generation, not yet placed in executable memory.
#[derive(Debug, Clone)]
pub struct WrapperArtifact {
    pub call_kind: CallKind,
    pub instructions: Vec<u8>,
    pub reloc_info: Vec<u8>,
    pub source_positions: Vec<SourcePosition>,
}

impl WrapperArtifact {
    pub fn code_size(&self) -> usize {
        self.instructions.len()
    }

    pub fn reloc_size(&self) -> usize {
        self.reloc_info.len()
    }
}
