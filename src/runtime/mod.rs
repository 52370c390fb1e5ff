// Call-boundary wrapper runtime
pub mod codegen;
pub mod imports;
pub mod metrics;
pub mod module;
pub mod registry;
pub mod wrappers;

pub use codegen::{CodeGenerationPort, CodegenError, TemplateWrapperCompiler, WrapperArtifact};
pub use imports::{ImportTarget, ResolvedImport, resolve_call_kind};
pub use metrics::{CodeMetrics, CodeMetricsSnapshot, MetricsSink};
pub use module::{ModuleError, ModuleOrigin, NativeModule};
pub use registry::{CodeKind, CodeRef, CodeRegistry, ModuleCodeSpace};
pub use wrappers::{FatalError, WrapperCache, WrapperPorts};
