use std::sync::atomic::{AtomicU64, Ordering};

use otterwrap_sig::{CallKind, FunctionSig, ValueKind};

use super::{CodeGenerationPort, CodegenError, SourcePosition, WrapperArtifact};

const PROLOGUE: [u8; 4] = [0x55, 0x48, 0x89, 0xe5]; // push rbp; mov rbp, rsp
const EPILOGUE: [u8; 2] = [0x5d, 0xc3]; // pop rbp; ret
const CALL_REL32: u8 = 0xe8;

/// Relocation mode bytes written ahead of each patched offset.
const RELOC_CALLEE: u8 = 0x01;
const RELOC_THROW_STUB: u8 = 0x02;

/// Deterministic template backend.
///
/// Emits a fixed byte sequence per boundary value instead of running a real
/// instruction selector, which is enough for the runtime to register, size
/// and account for wrappers. The same inputs always produce identical bytes.
#[derive(Debug, Default)]
pub struct TemplateWrapperCompiler {
    compilations: AtomicU64,
}

impl TemplateWrapperCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of wrappers this backend has produced.
    pub fn compilations(&self) -> u64 {
        self.compilations.load(Ordering::Relaxed)
    }
}

impl CodeGenerationPort for TemplateWrapperCompiler {
    fn compile_wrapper(
        &self,
        kind: CallKind,
        sig: &FunctionSig,
        track_source_positions: bool,
    ) -> Result<WrapperArtifact, CodegenError> {
        let mut emitter = Emitter::new(track_source_positions);
        emitter.bytes(&PROLOGUE);

        if kind.always_throws() {
            emitter.call(RELOC_THROW_STUB, 0);
        } else {
            for (slot, param) in sig.params().iter().enumerate() {
                emitter.mark(slot_source_offset(slot));
                emitter.convert(*param, slot);
            }
            if kind == CallKind::ArityMismatch {
                // Adapter frame: push argument count for the callee to inspect.
                emitter.bytes(&[0x6a, clamp_slot(sig.param_count())]);
            }
            emitter.mark(slot_source_offset(sig.param_count()));
            emitter.call(RELOC_CALLEE, kind.as_u8());
            for (slot, ret) in sig.returns().iter().enumerate() {
                emitter.convert(*ret, slot);
            }
        }

        emitter.bytes(&EPILOGUE);
        self.compilations.fetch_add(1, Ordering::Relaxed);
        Ok(emitter.finish(kind))
    }
}

fn slot_source_offset(slot: usize) -> u32 {
    u32::try_from(slot).unwrap_or(u32::MAX)
}

fn clamp_slot(slot: usize) -> u8 {
    u8::try_from(slot).unwrap_or(u8::MAX)
}

struct Emitter {
    code: Vec<u8>,
    reloc: Vec<u8>,
    positions: Option<Vec<SourcePosition>>,
}

impl Emitter {
    fn new(track_source_positions: bool) -> Self {
        Self {
            code: Vec::with_capacity(64),
            reloc: Vec::new(),
            positions: track_source_positions.then(Vec::new),
        }
    }

    fn bytes(&mut self, bytes: &[u8]) {
        self.code.extend_from_slice(bytes);
    }

    fn offset(&self) -> u32 {
        u32::try_from(self.code.len()).unwrap_or(u32::MAX)
    }

    fn mark(&mut self, source_offset: u32) {
        let code_offset = self.offset();
        if let Some(positions) = &mut self.positions {
            positions.push(SourcePosition {
                code_offset,
                source_offset,
            });
        }
    }

    /// Move one boundary value between its native slot and the other side's
    /// representation.
    fn convert(&mut self, kind: ValueKind, slot: usize) {
        let slot = clamp_slot(slot);
        match kind {
            ValueKind::I32 => self.bytes(&[0x89, slot]),
            ValueKind::I64 => self.bytes(&[0x48, 0x89, slot]),
            ValueKind::F32 => self.bytes(&[0xf3, 0x0f, 0x11, slot]),
            ValueKind::F64 => self.bytes(&[0xf2, 0x0f, 0x11, slot]),
            ValueKind::S128 => self.bytes(&[0x0f, 0x29, slot]),
            ValueKind::AnyRef | ValueKind::FuncRef => self.bytes(&[0x48, 0x8b, slot]),
        }
    }

    fn call(&mut self, mode: u8, target: u8) {
        self.code.push(CALL_REL32);
        let patch_at = self.offset();
        self.reloc.push(mode);
        self.reloc.extend_from_slice(&patch_at.to_le_bytes());
        self.bytes(&[target, 0, 0, 0]);
    }

    fn finish(self, call_kind: CallKind) -> WrapperArtifact {
        WrapperArtifact {
            call_kind,
            instructions: self.code,
            reloc_info: self.reloc,
            source_positions: self.positions.unwrap_or_default(),
        }
    }
}
