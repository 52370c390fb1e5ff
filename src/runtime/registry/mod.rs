// Code ownership and addressing
pub mod code_space;

pub use code_space::{ModuleCodeSpace, RegisteredCode};

use crate::runtime::codegen::WrapperArtifact;

/// What a piece of registered code is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeKind {
    /// Compiled body of a module function.
    Function,
    /// Adapter for a call crossing the module boundary (import or export).
    WasmToHostWrapper,
}

/// Non-owning handle to code held by a [`CodeRegistry`].
///
/// Copying a `CodeRef` never extends the lifetime of the code it names; the
/// registry that issued it owns the bytes and is torn down with its module.
/// `space` identifies the issuing registry, so handles from different modules
/// never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodeRef {
    space: u32,
    index: u32,
    kind: CodeKind,
    instruction_size: u32,
}

impl CodeRef {
    pub(crate) fn new(space: u32, index: u32, kind: CodeKind, instruction_size: u32) -> Self {
        Self {
            space,
            index,
            kind,
            instruction_size,
        }
    }

    pub fn space(&self) -> u32 {
        self.space
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn kind(&self) -> CodeKind {
        self.kind
    }

    pub fn instruction_size(&self) -> u32 {
        self.instruction_size
    }
}

/// Owner of executable code.
///
/// Called while the wrapper cache holds its lock, so implementations must not
/// call back into that cache.
pub trait CodeRegistry: Send + Sync {
    fn add_anonymous_code(&self, artifact: WrapperArtifact, kind: CodeKind) -> CodeRef;
}
