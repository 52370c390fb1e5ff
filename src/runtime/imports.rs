use otterwrap_sig::{CallKind, FunctionSig, ValueKind};

/// What an import name resolved to on the other side of the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    /// Nothing was supplied for the import.
    Missing,
    /// A value was supplied but it is not callable.
    Object,
    /// A function compiled by the same engine, with its own signature.
    WasmFunction { sig: FunctionSig },
    /// A host callable; `arity` is `None` when it cannot be determined.
    HostFunction { arity: Option<usize> },
}

/// An import paired with the wrapper strategy chosen for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImport {
    pub name: String,
    pub sig_index: usize,
    pub kind: CallKind,
}

/// Pick the call-adaptation strategy for calling `target` as `expected`.
pub fn resolve_call_kind(expected: &FunctionSig, target: &ImportTarget) -> CallKind {
    match target {
        ImportTarget::Missing | ImportTarget::Object => CallKind::LinkError,
        ImportTarget::WasmFunction { sig } if sig == expected => CallKind::DirectAdapter,
        ImportTarget::WasmFunction { .. } => CallKind::LinkError,
        ImportTarget::HostFunction { .. } if expected.contains(ValueKind::S128) => {
            CallKind::RuntimeTypeError
        }
        ImportTarget::HostFunction { arity: None } => CallKind::GenericAdapter,
        ImportTarget::HostFunction { arity: Some(arity) } if *arity == expected.param_count() => {
            CallKind::ArityMatch
        }
        ImportTarget::HostFunction { .. } => CallKind::ArityMismatch,
    }
}
