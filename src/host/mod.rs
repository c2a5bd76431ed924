//! Capabilities the collector borrows from its host: a clock, optional
//! memory introspection, an optional native timeline and a display surface.

pub mod clock;
pub mod memory;
pub mod timeline;

use std::sync::Arc;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use memory::{HeapUsage, MemoryProbe, ProcessMemoryProbe, StaticMemoryProbe};
pub use timeline::{Timeline, TracingTimeline};

use crate::overlay::{InMemorySurface, OverlaySurface};

/// Everything a `MetricsCollector` needs from the outside world.
#[derive(Clone)]
pub struct HostEnvironment {
    pub clock: Arc<dyn Clock>,
    pub memory: Option<Arc<dyn MemoryProbe>>,
    pub timeline: Option<Arc<dyn Timeline>>,
    pub surface: Arc<dyn OverlaySurface>,
}

impl HostEnvironment {
    /// Real clock, process memory via sysinfo, tracing timeline.
    pub fn system(surface: Arc<dyn OverlaySurface>) -> Self {
        let memory = ProcessMemoryProbe::new()
            .map(|probe| Arc::new(probe) as Arc<dyn MemoryProbe>);
        if memory.is_none() {
            tracing::debug!("process memory introspection unavailable");
        }
        Self {
            clock: Arc::new(MonotonicClock::new()),
            memory,
            timeline: Some(Arc::new(TracingTimeline::new())),
            surface,
        }
    }

    /// Hand-driven clock, no memory, no timeline, private surface.
    pub fn manual(clock: Arc<ManualClock>) -> Self {
        Self {
            clock,
            memory: None,
            timeline: None,
            surface: Arc::new(InMemorySurface::new()),
        }
    }

    pub fn with_memory(mut self, probe: Arc<dyn MemoryProbe>) -> Self {
        self.memory = Some(probe);
        self
    }

    pub fn with_timeline(mut self, timeline: Arc<dyn Timeline>) -> Self {
        self.timeline = Some(timeline);
        self
    }

    pub fn with_surface(mut self, surface: Arc<dyn OverlaySurface>) -> Self {
        self.surface = surface;
        self
    }
}
