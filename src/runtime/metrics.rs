use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Receiver for generated-code size observations.
///
/// Fire-and-forget: implementations must not fail and must not block for
/// long, they are called with the wrapper cache locked.
pub trait MetricsSink: Send + Sync {
    fn record_code_metrics(&self, code_size: usize, reloc_size: usize);
}

#[derive(Debug, Default)]
pub struct CodeMetrics {
    generated_code_size: AtomicU64,
    reloc_size: AtomicU64,
    wrappers_recorded: AtomicU64,
}

impl CodeMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshot(&self) -> CodeMetricsSnapshot {
        CodeMetricsSnapshot {
            generated_code_size: self.generated_code_size.load(Ordering::Relaxed),
            reloc_size: self.reloc_size.load(Ordering::Relaxed),
            wrappers_recorded: self.wrappers_recorded.load(Ordering::Relaxed),
        }
    }
}

impl MetricsSink for CodeMetrics {
    fn record_code_metrics(&self, code_size: usize, reloc_size: usize) {
        self.generated_code_size
            .fetch_add(code_size as u64, Ordering::Relaxed);
        self.reloc_size.fetch_add(reloc_size as u64, Ordering::Relaxed);
        self.wrappers_recorded.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodeMetricsSnapshot {
    pub generated_code_size: u64,
    pub reloc_size: u64,
    pub wrappers_recorded: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_observations() {
        let metrics = CodeMetrics::new();
        metrics.record_code_metrics(16, 5);
        metrics.record_code_metrics(24, 10);
        assert_eq!(
            metrics.snapshot(),
            CodeMetricsSnapshot {
                generated_code_size: 40,
                reloc_size: 15,
                wrappers_recorded: 2,
            }
        );
    }
}
