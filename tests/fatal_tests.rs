//! A backend failure must take the whole process down. Each test re-runs
//! itself in a child process and checks how that child exited.

use std::process::{Command, ExitStatus};
use std::sync::Arc;

use otterwrap::runtime::{
    CodeGenerationPort, CodeMetrics, CodegenError, ModuleOrigin, NativeModule, WrapperArtifact,
};
use otterwrap::{CallKind, FunctionSig, ValueKind};

const CHILD_ENV: &str = "OTTERWRAP_FATAL_CHILD";

struct RejectingBackend;

impl CodeGenerationPort for RejectingBackend {
    fn compile_wrapper(
        &self,
        kind: CallKind,
        sig: &FunctionSig,
        _track_source_positions: bool,
    ) -> Result<WrapperArtifact, CodegenError> {
        Err(CodegenError::Unsupported {
            kind,
            sig: sig.to_string(),
        })
    }
}

fn run_child(test_name: &str) -> (ExitStatus, String) {
    let exe = std::env::current_exe().expect("test binary path");
    let output = Command::new(exe)
        .args([test_name, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, test_name)
        .output()
        .expect("failed to spawn child test process");
    (output.status, String::from_utf8_lossy(&output.stderr).into_owned())
}

fn is_child(test_name: &str) -> bool {
    std::env::var(CHILD_ENV).is_ok_and(|name| name == test_name)
}

#[cfg(unix)]
fn assert_aborted(status: ExitStatus) {
    use std::os::unix::process::ExitStatusExt;
    assert_eq!(status.signal(), Some(libc::SIGABRT), "child exited with {status}");
}

#[cfg(not(unix))]
fn assert_aborted(status: ExitStatus) {
    assert!(!status.success(), "child exited with {status}");
}

#[test]
fn generation_failure_aborts_process() {
    const NAME: &str = "generation_failure_aborts_process";
    if is_child(NAME) {
        let module = NativeModule::new(
            ModuleOrigin::Wasm,
            Vec::new(),
            Arc::new(RejectingBackend),
            CodeMetrics::new(),
        );
        let sig = FunctionSig::new([ValueKind::I32], [ValueKind::I32]);
        let _ = module
            .import_wrapper_cache()
            .get_or_compile(CallKind::GenericAdapter, &sig);
        // Only reached if the cache returned instead of aborting.
        std::process::exit(0);
    }

    let (status, stderr) = run_child(NAME);
    assert_aborted(status);
    assert!(
        stderr.contains("failed to compile wrapper generic-adapter:(i32) -> (i32)"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn parallel_instantiation_failure_aborts() {
    const NAME: &str = "parallel_instantiation_failure_aborts";
    if is_child(NAME) {
        let module = NativeModule::new(
            ModuleOrigin::AsmJs,
            vec![FunctionSig::empty()],
            Arc::new(RejectingBackend),
            CodeMetrics::new(),
        );
        let imports: Vec<_> = (0..8)
            .map(|i| otterwrap::runtime::ResolvedImport {
                name: format!("env.f{i}"),
                sig_index: 0,
                kind: CallKind::ArityMatch,
            })
            .collect();
        let _ = module.compile_import_wrappers(&imports, 4);
        std::process::exit(0);
    }

    let (status, _) = run_child(NAME);
    assert_aborted(status);
}
