use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use parking_lot::RwLock;
use crate::core::error::{Error, ErrorKind, Result};
use crate::host::{AttachmentHost, InternalAttachment};
use crate::reader::table_format::TableSnapshot;

/// In-process host that only records attachments
pub struct MemoryHost {
    pub attachments: RwLock<BTreeMap<String, InternalAttachment>>,
    pub attach_calls: AtomicU64,
    pub refresh_calls: AtomicU64,
    pub detach_calls: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCallCounts {
    pub attach: u64,
    pub refresh: u64,
    pub detach: u64,
}

impl MemoryHost {
    pub fn new() -> Self {
        MemoryHost {
            attachments: RwLock::new(BTreeMap::new()),
            attach_calls: AtomicU64::new(0),
            refresh_calls: AtomicU64::new(0),
            detach_calls: AtomicU64::new(0),
        }
    }

    pub fn get(&self, name: &str) -> Option<InternalAttachment> {
        self.attachments.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attachments.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.attachments.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.read().is_empty()
    }

    /// Names starting with `prefix`, the way a `LIKE 'prefix%'` filter would see them
    pub fn names_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.attachments.read()
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn call_counts(&self) -> HostCallCounts {
        HostCallCounts {
            attach: self.attach_calls.load(Ordering::Relaxed),
            refresh: self.refresh_calls.load(Ordering::Relaxed),
            detach: self.detach_calls.load(Ordering::Relaxed),
        }
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        MemoryHost::new()
    }
}

impl AttachmentHost for MemoryHost {
    fn attach(&self, attachment: &InternalAttachment) -> Result<()> {
        self.attach_calls.fetch_add(1, Ordering::Relaxed);
        let mut attachments = self.attachments.write();
        if attachments.contains_key(&attachment.name) {
            return Err(Error::new(
                ErrorKind::DuplicateName,
                format!("database \"{}\" is already attached in the host", attachment.name),
            ));
        }
        attachments.insert(attachment.name.clone(), attachment.clone());
        Ok(())
    }

    fn refresh(&self, name: &str, snapshot: &TableSnapshot) -> Result<()> {
        self.refresh_calls.fetch_add(1, Ordering::Relaxed);
        let mut attachments = self.attachments.write();
        match attachments.get_mut(name) {
            Some(existing) => {
                existing.snapshot = snapshot.clone();
                Ok(())
            }
            None => Err(Error::no_such_database(name)),
        }
    }

    fn detach(&self, name: &str) -> Result<bool> {
        self.detach_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.attachments.write().remove(name).is_some())
    }

    fn attachment_names(&self) -> Vec<String> {
        self.attachments.read().keys().cloned().collect()
    }
}
