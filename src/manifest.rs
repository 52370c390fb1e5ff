use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};
use otterwrap_sig::{FunctionSig, ValueKind};
use serde::{Deserialize, Serialize};

use crate::runtime::{ImportTarget, ModuleOrigin, ResolvedImport, resolve_call_kind};

/// Declarative description of a module's signature table and imports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleManifest {
    #[serde(default)]
    pub origin: ModuleOrigin,
    #[serde(default)]
    pub signatures: Vec<SignatureSpec>,
    #[serde(default)]
    pub imports: Vec<ImportSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignatureSpec {
    #[serde(default)]
    pub params: Vec<ValueKind>,
    #[serde(default)]
    pub returns: Vec<ValueKind>,
}

impl SignatureSpec {
    pub fn to_sig(&self) -> FunctionSig {
        FunctionSig::new(self.params.iter().copied(), self.returns.iter().copied())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportSpec {
    pub name: String,
    /// Index into the manifest's signature table.
    pub sig: usize,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub target: TargetSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetSpec {
    Missing,
    Object,
    Wasm {
        sig: usize,
    },
    Host {
        #[serde(default)]
        arity: Option<usize>,
    },
}

impl ModuleManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open manifest {}", path.display()))?;
        serde_yaml::from_reader(file)
            .with_context(|| format!("failed to parse manifest {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("failed to parse manifest")
    }

    pub fn function_sigs(&self) -> Vec<FunctionSig> {
        self.signatures.iter().map(SignatureSpec::to_sig).collect()
    }

    /// Pick a call kind for every import against `sigs`, the module's
    /// signature table built from this manifest.
    pub fn resolve_imports(&self, sigs: &[FunctionSig]) -> Result<Vec<ResolvedImport>> {
        let lookup = |index: usize, import: &str| {
            sigs.get(index).with_context(|| {
                format!(
                    "import `{import}` references signature {index}, but only {} are declared",
                    sigs.len()
                )
            })
        };

        let mut resolved = Vec::with_capacity(self.imports.len());
        for import in &self.imports {
            if import.name.is_empty() {
                bail!("import names must not be empty");
            }
            let expected = lookup(import.sig, &import.name)?;
            let target = match &import.target {
                TargetSpec::Missing => ImportTarget::Missing,
                TargetSpec::Object => ImportTarget::Object,
                TargetSpec::Wasm { sig } => ImportTarget::WasmFunction {
                    sig: lookup(*sig, &import.name)?.clone(),
                },
                TargetSpec::Host { arity } => ImportTarget::HostFunction { arity: *arity },
            };
            resolved.push(ResolvedImport {
                name: import.name.clone(),
                sig_index: import.sig,
                kind: resolve_call_kind(expected, &target),
            });
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use otterwrap_sig::CallKind;

    use super::*;

    const MANIFEST: &str = r#"
origin: asm-js
signatures:
  - params: [i32]
    returns: [i32]
  - {}
  - params: [f64, f64]
imports:
  - name: env.abs
    sig: 0
    target: { host: { arity: 1 } }
  - name: env.tick
    sig: 1
    target: { host: {} }
  - name: env.plot
    sig: 2
    target: { host: { arity: 3 } }
  - name: lib.inc
    sig: 0
    target: { wasm: { sig: 0 } }
  - name: env.gone
    sig: 1
    target: missing
"#;

    #[test]
    fn parses_and_resolves_imports() -> Result<()> {
        let manifest = ModuleManifest::from_yaml_str(MANIFEST)?;
        assert_eq!(manifest.origin, ModuleOrigin::AsmJs);

        let sigs = manifest.function_sigs();
        assert_eq!(sigs[1], FunctionSig::empty());

        let kinds: Vec<CallKind> = manifest
            .resolve_imports(&sigs)?
            .into_iter()
            .map(|import| import.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                CallKind::ArityMatch,
                CallKind::GenericAdapter,
                CallKind::ArityMismatch,
                CallKind::DirectAdapter,
                CallKind::LinkError,
            ]
        );
        Ok(())
    }

    #[test]
    fn dangling_signature_index_is_an_error() -> Result<()> {
        let manifest = ModuleManifest::from_yaml_str(
            "signatures: [{}]\nimports:\n  - {name: f, sig: 4, target: object}\n",
        )?;
        let err = manifest
            .resolve_imports(&manifest.function_sigs())
            .unwrap_err();
        assert!(err.to_string().contains("references signature 4"));
        Ok(())
    }

    #[test]
    fn demo_manifest_loads() -> Result<()> {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/app.yaml");
        let manifest = ModuleManifest::load(&path)?;
        assert_eq!(manifest.origin, ModuleOrigin::Wasm);
        assert_eq!(manifest.signatures.len(), 5);
        assert_eq!(manifest.imports.len(), 11);
        assert!(matches!(
            manifest.imports[3].target,
            TargetSpec::Host { arity: Some(2) }
        ));
        assert!(matches!(manifest.imports[6].target, TargetSpec::Wasm { sig: 0 }));
        assert!(matches!(manifest.imports[10].target, TargetSpec::Missing));
        Ok(())
    }

    #[test]
    fn targets_written_back_reload() -> Result<()> {
        let manifest = ModuleManifest::from_yaml_str(MANIFEST)?;
        let text = serde_yaml::to_string(&manifest)?;
        let reloaded = ModuleManifest::from_yaml_str(&text)?;
        let sigs = reloaded.function_sigs();
        assert_eq!(
            reloaded.resolve_imports(&sigs)?,
            manifest.resolve_imports(&manifest.function_sigs())?
        );
        Ok(())
    }

    #[test]
    fn unknown_value_kind_fails_to_parse() {
        let result = ModuleManifest::from_yaml_str("signatures:\n  - params: [i31]\n");
        assert!(result.is_err());
    }
}
