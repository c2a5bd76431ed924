use parking_lot::Mutex;
use serde::Serialize;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Raw heap figures in bytes, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeapUsage {
    pub used_bytes: u64,
    pub total_bytes: u64,
    pub limit_bytes: u64,
}

/// Optional memory-introspection capability.
///
/// A collector is handed `Option<Arc<dyn MemoryProbe>>`; `None` means the
/// host cannot report memory and every memory feature quietly degrades.
pub trait MemoryProbe: Send + Sync {
    /// Current usage, or `None` if this particular read failed.
    fn heap_usage(&self) -> Option<HeapUsage>;
}

/// Reads this process's memory through `sysinfo`.
///
/// used = resident set, total = virtual size, limit = physical RAM.
pub struct ProcessMemoryProbe {
    system: Mutex<System>,
    pid: Pid,
}

impl ProcessMemoryProbe {
    /// `None` when the platform cannot identify the current process.
    pub fn new() -> Option<Self> {
        let pid = sysinfo::get_current_pid().ok()?;
        let mut system = System::new();
        system.refresh_memory();
        Some(Self {
            system: Mutex::new(system),
            pid,
        })
    }
}

impl MemoryProbe for ProcessMemoryProbe {
    fn heap_usage(&self) -> Option<HeapUsage> {
        let mut system = self.system.lock();
        system.refresh_memory();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        let process = system.process(self.pid)?;
        Some(HeapUsage {
            used_bytes: process.memory(),
            total_bytes: process.virtual_memory(),
            limit_bytes: system.total_memory(),
        })
    }
}

/// Fixed readings, settable at runtime. Handy for embedding hosts that
/// already know their heap figures, and for tests.
pub struct StaticMemoryProbe {
    usage: Mutex<Option<HeapUsage>>,
}

impl StaticMemoryProbe {
    pub fn new(usage: HeapUsage) -> Self {
        Self {
            usage: Mutex::new(Some(usage)),
        }
    }

    pub fn set(&self, usage: Option<HeapUsage>) {
        *self.usage.lock() = usage;
    }
}

impl MemoryProbe for StaticMemoryProbe {
    fn heap_usage(&self) -> Option<HeapUsage> {
        *self.usage.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_probe_reports_nonzero_resident_memory() {
        // sysinfo supports pid lookup on every platform we build for
        let probe = ProcessMemoryProbe::new().expect("current pid");
        let usage = probe.heap_usage().expect("own process is visible");
        assert!(usage.used_bytes > 0);
        assert!(usage.limit_bytes > 0);
    }

    #[test]
    fn static_probe_can_go_dark() {
        let probe = StaticMemoryProbe::new(HeapUsage {
            used_bytes: 1,
            total_bytes: 2,
            limit_bytes: 3,
        });
        assert!(probe.heap_usage().is_some());
        probe.set(None);
        assert!(probe.heap_usage().is_none());
    }
}
