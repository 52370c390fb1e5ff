use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use otterwrap_sig::{CallKind, FunctionSig, SignatureKey};
use tracing::{debug, info};

use crate::VERSION;
use crate::config::EngineConfig;
use crate::manifest::ModuleManifest;
use crate::runtime::{CodeMetrics, ModuleOrigin, NativeModule, TemplateWrapperCompiler};

#[derive(Parser, Debug)]
#[command(name = "otterwrap", version = VERSION, about = "Call-boundary wrapper cache driver")]
pub struct WrapCli {
    #[arg(long, global = true)]
    /// Engine configuration file (YAML, or TOML with the `toml-config` feature).
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    /// Log filter directives; `OTTERWRAP_LOG` still takes precedence.
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

impl WrapCli {
    pub fn subcommand(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Instantiates a module manifest and compiles all of its import wrappers.
    Warm {
        manifest: PathBuf,
        #[arg(short, long)]
        threads: Option<usize>,
        /// Repeat instantiation to exercise the warm cache.
        #[arg(long, default_value_t = 1)]
        rounds: usize,
    },
    /// Compiles a single wrapper and reports its identity and size.
    Compile {
        kind: CallKind,
        #[arg(allow_hyphen_values = true)]
        signature: FunctionSig,
        #[arg(long)]
        asm_js: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = WrapCli::parse();
    let mut config = EngineConfig::resolve(cli.config.as_deref())?;
    if let Some(filter) = &cli.log {
        config.log_filter.clone_from(filter);
    }
    otterwrap_utils::init_logging(Some(&config.log_filter));
    debug!(?config, "engine configuration");

    match &cli.command {
        Command::Warm {
            manifest,
            threads,
            rounds,
        } => handle_warm(&config, manifest, *threads, *rounds),
        Command::Compile {
            kind,
            signature,
            asm_js,
        } => {
            handle_compile(*kind, signature, *asm_js);
            Ok(())
        }
    }
}

fn handle_warm(
    config: &EngineConfig,
    manifest_path: &Path,
    threads: Option<usize>,
    rounds: usize,
) -> Result<()> {
    let manifest = ModuleManifest::load(manifest_path)?;
    let origin = config.origin_override.unwrap_or(manifest.origin);
    let threads = threads.unwrap_or(config.worker_threads);

    let backend = Arc::new(TemplateWrapperCompiler::new());
    let metrics = CodeMetrics::new();
    let module = NativeModule::new(
        origin,
        manifest.function_sigs(),
        backend.clone(),
        metrics.clone(),
    );
    let imports = manifest.resolve_imports(module.signatures())?;

    let mut timings = Vec::with_capacity(rounds);
    let mut wrappers = Vec::new();
    for _ in 0..rounds.max(1) {
        let start = Instant::now();
        wrappers = module.compile_import_wrappers(&imports, threads)?;
        timings.push(start.elapsed());
    }
    info!(manifest = %manifest_path.display(), ?origin, threads, "warm-up finished");

    println!("{}", "[Imports]".bold());
    for (import, code) in imports.iter().zip(&wrappers) {
        println!(
            "{:>24}  {:<20} sig#{:<3} -> code#{} ({} bytes)",
            import.name,
            import.kind.to_string().cyan(),
            import.sig_index,
            code.index(),
            code.instruction_size()
        );
    }

    let snapshot = metrics.snapshot();
    println!("{}", "[Wrappers]".bold());
    println!("{:>24}: {:?}", "Origin", origin);
    println!("{:>24}: {}", "Imports", imports.len());
    println!(
        "{:>24}: {}",
        "Distinct wrappers",
        module.import_wrapper_cache().len()
    );
    println!("{:>24}: {}", "Backend compilations", backend.compilations());
    println!("{:>24}: {} bytes", "Generated code", snapshot.generated_code_size);
    println!("{:>24}: {} bytes", "Relocation info", snapshot.reloc_size);
    print_timings(&timings);
    Ok(())
}

fn handle_compile(kind: CallKind, sig: &FunctionSig, asm_js: bool) {
    let origin = if asm_js {
        ModuleOrigin::AsmJs
    } else {
        ModuleOrigin::Wasm
    };
    let metrics = CodeMetrics::new();
    let module = NativeModule::new(
        origin,
        vec![sig.clone()],
        Arc::new(TemplateWrapperCompiler::new()),
        metrics.clone(),
    );

    let code = module.import_wrapper_cache().get_or_compile(kind, sig);
    let key = SignatureKey::new(kind, sig);
    let positions = module
        .code_space()
        .lookup(code)
        .map_or(0, |registered| registered.source_positions.len());

    println!("{} {}", "compiled".green().bold(), key);
    println!("{:>16}: {:016x}", "Fingerprint", key.fingerprint());
    println!("{:>16}: {}", "Short name", sig.short_name());
    println!("{:>16}: {} bytes", "Code", code.instruction_size());
    println!("{:>16}: {} bytes", "Relocations", metrics.snapshot().reloc_size);
    println!("{:>16}: {}", "Positions", positions);
}

fn print_timings(timings: &[Duration]) {
    println!("{}", "[Timing]".bold());
    for (round, duration) in timings.iter().enumerate() {
        let label = format!("Round {}", round + 1);
        println!("{:>24}: {:>8.3} ms", label, duration.as_secs_f64() * 1000.0);
    }
}
