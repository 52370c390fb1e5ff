use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::RwLock;
use tracing::trace;

use super::{CodeKind, CodeRef, CodeRegistry};
use crate::runtime::codegen::{SourcePosition, WrapperArtifact};
use crate::runtime::wrappers::fatal::{self, FatalError};

/// Code as stored by a module after registration.
#[derive(Debug)]
pub struct RegisteredCode {
    pub kind: CodeKind,
    pub instructions: Box<[u8]>,
    pub reloc_info: Box<[u8]>,
    pub source_positions: Box<[SourcePosition]>,
}

static NEXT_SPACE_ID: AtomicU32 = AtomicU32::new(0);

/// Append-only code store for a single module.
///
/// Indices are never reused, so every [`CodeRef`] it hands out stays valid
/// until the space itself is dropped. Handles issued by another space are
/// never resolved.
#[derive(Debug)]
pub struct ModuleCodeSpace {
    id: u32,
    code: RwLock<Vec<Arc<RegisteredCode>>>,
}

impl ModuleCodeSpace {
    pub fn new() -> Self {
        Self {
            id: NEXT_SPACE_ID.fetch_add(1, Ordering::Relaxed),
            code: RwLock::new(Vec::new()),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn lookup(&self, code_ref: CodeRef) -> Option<Arc<RegisteredCode>> {
        if code_ref.space() != self.id {
            return None;
        }
        let index = usize::try_from(code_ref.index()).ok()?;
        self.code.read().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.code.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.read().is_empty()
    }

    pub fn total_code_size(&self) -> usize {
        self.code
            .read()
            .iter()
            .map(|code| code.instructions.len())
            .sum()
    }
}

impl Default for ModuleCodeSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeRegistry for ModuleCodeSpace {
    fn add_anonymous_code(&self, artifact: WrapperArtifact, kind: CodeKind) -> CodeRef {
        let Ok(instruction_size) = u32::try_from(artifact.code_size()) else {
            fatal::abort_with(FatalError::CodeSpaceExhausted(
                "instruction stream exceeds 4 GiB",
            ))
        };

        let mut code = self.code.write();
        let Ok(index) = u32::try_from(code.len()) else {
            fatal::abort_with(FatalError::CodeSpaceExhausted("code index overflow"))
        };

        code.push(Arc::new(RegisteredCode {
            kind,
            instructions: artifact.instructions.into_boxed_slice(),
            reloc_info: artifact.reloc_info.into_boxed_slice(),
            source_positions: artifact.source_positions.into_boxed_slice(),
        }));
        trace!(index, ?kind, instruction_size, "registered code");

        CodeRef::new(self.id, index, kind, instruction_size)
    }
}

#[cfg(test)]
mod tests {
    use otterwrap_sig::CallKind;

    use super::*;

    fn artifact(len: usize) -> WrapperArtifact {
        WrapperArtifact {
            call_kind: CallKind::GenericAdapter,
            instructions: vec![0x90; len],
            reloc_info: vec![1, 0, 0, 0, 0],
            source_positions: Vec::new(),
        }
    }

    #[test]
    fn handles_address_distinct_code() {
        let space = ModuleCodeSpace::new();
        let first = space.add_anonymous_code(artifact(8), CodeKind::WasmToHostWrapper);
        let second = space.add_anonymous_code(artifact(12), CodeKind::Function);

        assert_ne!(first, second);
        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
        assert_eq!(second.kind(), CodeKind::Function);
        assert_eq!(space.len(), 2);
        assert_eq!(space.total_code_size(), 20);

        let stored = space.lookup(first).expect("registered code");
        assert_eq!(stored.instructions.len(), 8);
        assert_eq!(stored.kind, CodeKind::WasmToHostWrapper);
    }

    #[test]
    fn foreign_handle_is_not_found() {
        let space = ModuleCodeSpace::new();
        let stray = CodeRef::new(space.id(), 3, CodeKind::Function, 4);
        assert!(space.lookup(stray).is_none());
        assert!(space.is_empty());
    }

    #[test]
    fn handles_from_another_space_are_rejected() {
        let first = ModuleCodeSpace::new();
        let second = ModuleCodeSpace::new();
        assert_ne!(first.id(), second.id());

        let a = first.add_anonymous_code(artifact(8), CodeKind::WasmToHostWrapper);
        let b = second.add_anonymous_code(artifact(8), CodeKind::WasmToHostWrapper);
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);

        assert!(first.lookup(a).is_some());
        assert!(second.lookup(a).is_none());
        assert!(first.lookup(b).is_none());
    }
}
