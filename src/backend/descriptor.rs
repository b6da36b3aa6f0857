//! Execution descriptors: per-operation backend hints

/// Optional execution hints attached to one operation request.
///
/// Descriptors never change what an operation computes, only how a backend
/// may run it (device and queue placement on accelerator backends). The
/// reference CPU backend ignores everything except the label, which shows
/// up in trace logging.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Descriptor {
    /// Debug label for logs and traces
    pub label: Option<String>,
    /// Preferred platform index on multi-platform backends
    pub platform: Option<u32>,
    /// Preferred device index
    pub device: Option<u32>,
    /// Preferred queue index
    pub queue: Option<u32>,
}

impl Descriptor {
    /// An empty descriptor (no hints)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debug label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the device hint
    pub fn with_device(mut self, device: u32) -> Self {
        self.device = Some(device);
        self
    }

    /// Set the queue hint
    pub fn with_queue(mut self, queue: u32) -> Self {
        self.queue = Some(queue);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_builder() {
        let desc = Descriptor::new().with_label("bfs step").with_device(1);
        assert_eq!(desc.label.as_deref(), Some("bfs step"));
        assert_eq!(desc.device, Some(1));
        assert_eq!(desc.queue, None);
    }
}
