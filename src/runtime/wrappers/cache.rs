use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use otterwrap_sig::{CallKind, FunctionSig, SignatureKey};
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::fatal::{self, FatalError};
use crate::runtime::codegen::CodeGenerationPort;
use crate::runtime::metrics::MetricsSink;
use crate::runtime::registry::{CodeKind, CodeRef, CodeRegistry};

/// Collaborators a [`WrapperCache`] compiles through.
#[derive(Clone)]
pub struct WrapperPorts {
    pub codegen: Arc<dyn CodeGenerationPort>,
    pub registry: Arc<dyn CodeRegistry>,
    pub metrics: Arc<dyn MetricsSink>,
}

/// Memoizes compiled boundary wrappers per (call kind, signature).
///
/// Each distinct [`SignatureKey`] is compiled at most once. Lookups and the
/// whole miss path (generate, register, record metrics, insert) run under one
/// cache-wide lock, so a reader can never see a half-built entry and two
/// threads racing on the same key cannot both compile it. The price is that
/// a miss on one key also stalls lookups of unrelated keys until it finishes;
/// misses are bounded by the number of distinct wrappers a module needs and
/// mostly happen during instantiation.
///
/// Entries are never evicted or replaced. The map holds [`CodeRef`] handles
/// only; the code itself belongs to the registry.
pub struct WrapperCache {
    entries: Mutex<AHashMap<SignatureKey, CodeRef>>,
    ports: WrapperPorts,
    track_source_positions: bool,
}

impl WrapperCache {
    /// `track_source_positions` is a per-module policy and applies to every
    /// wrapper this cache compiles.
    pub fn new(ports: WrapperPorts, track_source_positions: bool) -> Self {
        Self {
            entries: Mutex::new(AHashMap::new()),
            ports,
            track_source_positions,
        }
    }

    /// Return the wrapper for `(kind, sig)`, compiling it on first request.
    ///
    /// Blocks while another thread is compiling any wrapper for this cache.
    /// Aborts the process if the backend rejects the signature.
    pub fn get_or_compile(&self, kind: CallKind, sig: &FunctionSig) -> CodeRef {
        let key = SignatureKey::new(kind, sig);
        let mut entries = self.entries.lock();
        match entries.entry(key) {
            Entry::Occupied(entry) => {
                trace!(key = %entry.key(), "wrapper cache hit");
                *entry.get()
            }
            Entry::Vacant(slot) => {
                let code = self.compile(slot.key());
                *slot.insert(code)
            }
        }
    }

    /// Return the wrapper for `(kind, sig)` if it was already compiled.
    pub fn lookup(&self, kind: CallKind, sig: &FunctionSig) -> Option<CodeRef> {
        let key = SignatureKey::new(kind, sig);
        self.entries.lock().get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn tracks_source_positions(&self) -> bool {
        self.track_source_positions
    }

    // Caller holds the entries lock.
    fn compile(&self, key: &SignatureKey) -> CodeRef {
        let artifact = match self.ports.codegen.compile_wrapper(
            key.kind(),
            key.sig(),
            self.track_source_positions,
        ) {
            Ok(artifact) => artifact,
            Err(source) => fatal::abort_with(FatalError::WrapperCompilation {
                key: key.clone(),
                source,
            }),
        };

        let code_size = artifact.code_size();
        let reloc_size = artifact.reloc_size();
        let code = self
            .ports
            .registry
            .add_anonymous_code(artifact, CodeKind::WasmToHostWrapper);
        self.ports.metrics.record_code_metrics(code_size, reloc_size);

        debug!(
            key = %key,
            fingerprint = key.fingerprint(),
            index = code.index(),
            code_size,
            reloc_size,
            "compiled wrapper"
        );
        code
    }
}

impl fmt::Debug for WrapperCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapperCache")
            .field("entries", &self.len())
            .field("track_source_positions", &self.track_source_positions)
            .finish_non_exhaustive()
    }
}
