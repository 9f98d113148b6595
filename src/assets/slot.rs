//! Single-owner slot for the raw model payload.
//!
//! At most one payload is ever alive. Publishing drops the previous one on
//! the spot, reading is borrow-only, and release reports whether there was
//! anything to release so teardown can assert it ran exactly once.

/// The raw bytes of the currently loaded model.
#[derive(Debug)]
pub struct ModelResource {
    label: String,
    bytes: Vec<u8>,
}

impl ModelResource {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Holds the one live [`ModelResource`], or nothing.
#[derive(Debug, Default)]
pub struct ResourceSlot {
    live: Option<ModelResource>,
}

impl ResourceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly fetched payload, superseding whatever was live.
    pub fn publish(&mut self, label: &str, bytes: Vec<u8>) {
        if let Some(old) = self.live.take() {
            log::debug!(
                "superseding model resource `{}` ({} bytes)",
                old.label,
                old.bytes.len()
            );
        }
        self.live = Some(ModelResource {
            label: label.to_owned(),
            bytes,
        });
    }

    pub fn resource(&self) -> Option<&ModelResource> {
        self.live.as_ref()
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.live.as_ref().map(|res| res.bytes.as_slice())
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Drop the live payload. Returns whether one existed; a second call is
    /// a quiet no-op.
    pub fn release(&mut self) -> bool {
        match self.live.take() {
            Some(res) => {
                log::debug!("released model resource `{}`", res.label);
                true
            }
            None => false,
        }
    }
}
