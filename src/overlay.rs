use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::metrics::MemoryReading;

/// Element id of the performance panel on the surface.
pub const OVERLAY_ID: &str = "perf-overlay";

/// A document-like target that panels can be attached to and removed from.
pub trait OverlaySurface: Send + Sync {
    fn contains(&self, id: &str) -> bool;

    /// Attach an empty panel. Returns false if one with this id exists.
    fn attach(&self, id: &str) -> bool;

    /// Replace the panel's text. Returns false if the panel is gone.
    fn set_content(&self, id: &str, content: &str) -> bool;

    /// Detach the panel. Returns false if there was nothing to remove.
    fn remove(&self, id: &str) -> bool;
}

/// Panels held in memory, readable by the SSE overlay stream.
#[derive(Default)]
pub struct InMemorySurface {
    panels: Mutex<IndexMap<String, String>>,
}

impl InMemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text of a panel, if attached.
    pub fn content(&self, id: &str) -> Option<String> {
        self.panels.lock().get(id).cloned()
    }
}

impl OverlaySurface for InMemorySurface {
    fn contains(&self, id: &str) -> bool {
        self.panels.lock().contains_key(id)
    }

    fn attach(&self, id: &str) -> bool {
        let mut panels = self.panels.lock();
        if panels.contains_key(id) {
            return false;
        }
        panels.insert(id.to_owned(), String::new());
        true
    }

    fn set_content(&self, id: &str, content: &str) -> bool {
        match self.panels.lock().get_mut(id) {
            Some(slot) => {
                content.clone_into(slot);
                true
            }
            None => false,
        }
    }

    fn remove(&self, id: &str) -> bool {
        self.panels.lock().shift_remove(id).is_some()
    }
}

/// Text shown in the overlay panel, one line per metric.
pub fn render_overlay(
    fps: f64,
    memory: Option<&MemoryReading>,
    frames: u64,
) -> String {
    let mut text = format!("FPS: {fps:.1}\n");
    if let Some(m) = memory {
        text.push_str(&format!(
            "Memory: {:.2}MB / {:.2}MB\n",
            m.used_mb, m.total_mb
        ));
    }
    text.push_str(&format!("Frames: {frames}"));
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_is_exclusive_per_id() {
        let surface = InMemorySurface::new();
        assert!(surface.attach(OVERLAY_ID));
        assert!(!surface.attach(OVERLAY_ID));
        assert!(surface.set_content(OVERLAY_ID, "hello"));
        assert_eq!(surface.content(OVERLAY_ID).as_deref(), Some("hello"));
        assert!(surface.remove(OVERLAY_ID));
        assert!(!surface.remove(OVERLAY_ID));
        assert!(!surface.set_content(OVERLAY_ID, "late"));
    }

    #[test]
    fn render_without_memory_skips_memory_line() {
        let text = render_overlay(62.5, None, 5);
        assert_eq!(text, "FPS: 62.5\nFrames: 5");
    }

    #[test]
    fn render_with_memory() {
        let memory = MemoryReading {
            used_mb: 12.5,
            total_mb: 64.0,
            limit_mb: 2048.0,
        };
        let text = render_overlay(59.94, Some(&memory), 120);
        assert_eq!(text, "FPS: 59.9\nMemory: 12.50MB / 64.00MB\nFrames: 120");
    }
}
