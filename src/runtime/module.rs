use std::sync::Arc;

use otterwrap_sig::{CallKind, FunctionSig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::codegen::CodeGenerationPort;
use super::imports::ResolvedImport;
use super::metrics::MetricsSink;
use super::registry::{CodeRef, ModuleCodeSpace};
use super::wrappers::{WrapperCache, WrapperPorts};

/// Translation path a module was produced by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleOrigin {
    #[default]
    Wasm,
    AsmJs,
}

impl ModuleOrigin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "wasm" => Some(ModuleOrigin::Wasm),
            "asm-js" | "asmjs" => Some(ModuleOrigin::AsmJs),
            _ => None,
        }
    }

    /// Modules translated from asm.js report errors against their asm.js
    /// source, so their wrappers carry source positions.
    pub fn tracks_source_positions(self) -> bool {
        matches!(self, ModuleOrigin::AsmJs)
    }
}

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("signature index {index} out of range (module declares {count})")]
    UnknownSignature { index: usize, count: usize },
    #[error("failed to start wrapper compilation pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A compiled module: its signatures, its code space and its wrapper cache.
///
/// The wrapper cache is created with the module and dropped with it; no two
/// modules share one.
pub struct NativeModule {
    origin: ModuleOrigin,
    signatures: Vec<FunctionSig>,
    code_space: Arc<ModuleCodeSpace>,
    import_wrapper_cache: WrapperCache,
}

impl NativeModule {
    pub fn new(
        origin: ModuleOrigin,
        signatures: Vec<FunctionSig>,
        codegen: Arc<dyn CodeGenerationPort>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        let code_space = Arc::new(ModuleCodeSpace::new());
        let ports = WrapperPorts {
            codegen,
            registry: code_space.clone(),
            metrics,
        };
        let import_wrapper_cache = WrapperCache::new(ports, origin.tracks_source_positions());
        debug!(?origin, signatures = signatures.len(), "module created");

        Self {
            origin,
            signatures,
            code_space,
            import_wrapper_cache,
        }
    }

    pub fn origin(&self) -> ModuleOrigin {
        self.origin
    }

    pub fn signatures(&self) -> &[FunctionSig] {
        &self.signatures
    }

    pub fn signature(&self, index: usize) -> Option<&FunctionSig> {
        self.signatures.get(index)
    }

    pub fn code_space(&self) -> &ModuleCodeSpace {
        &self.code_space
    }

    pub fn import_wrapper_cache(&self) -> &WrapperCache {
        &self.import_wrapper_cache
    }

    /// Wrapper for calling signature `sig_index` with strategy `kind`.
    pub fn import_wrapper(&self, kind: CallKind, sig_index: usize) -> Result<CodeRef, ModuleError> {
        let sig = self
            .signature(sig_index)
            .ok_or(ModuleError::UnknownSignature {
                index: sig_index,
                count: self.signatures.len(),
            })?;
        Ok(self.import_wrapper_cache.get_or_compile(kind, sig))
    }

    /// Compile the wrappers for `imports` on a pool of `threads` workers.
    ///
    /// The result is in import order. Imports sharing a kind and signature
    /// receive the same [`CodeRef`].
    pub fn compile_import_wrappers(
        &self,
        imports: &[ResolvedImport],
        threads: usize,
    ) -> Result<Vec<CodeRef>, ModuleError> {
        if let Some(bad) = imports.iter().find(|import| import.sig_index >= self.signatures.len()) {
            return Err(ModuleError::UnknownSignature {
                index: bad.sig_index,
                count: self.signatures.len(),
            });
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("otterwrap-compile-{i}"))
            .build()?;

        let wrappers: Vec<CodeRef> = pool.install(|| {
            imports
                .par_iter()
                .map(|import| {
                    self.import_wrapper_cache
                        .get_or_compile(import.kind, &self.signatures[import.sig_index])
                })
                .collect()
        });

        info!(
            imports = imports.len(),
            distinct = self.import_wrapper_cache.len(),
            "import wrappers ready"
        );
        Ok(wrappers)
    }
}
