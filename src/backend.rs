use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock, Weak};

use crate::error::DnsError;
use crate::qtype::QType;
use crate::record::DnsResourceRecord;

/// Storage that answers lookups and accepts serial updates for the zones it
/// serves.
pub trait Backend: Send + Sync {
    /// Records matching `(qname, qtype, domain_id)`. `QType::ANY` matches
    /// every type; a negative `domain_id` means "any zone".
    fn lookup(&self, qname: &str, qtype: QType, domain_id: i32) -> Vec<DnsResourceRecord>;

    /// Every record of one zone.
    fn list(&self, domain_id: i32) -> Vec<DnsResourceRecord>;

    fn set_serial(&self, domain_id: i32, serial: u32) -> Result<(), DnsError>;
}

/// Opaque name for a registered backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendId(u32);

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "backend#{}", self.0)
    }
}

/// Maps `BackendId`s to backends without owning them. A backend that has
/// been dropped simply stops resolving. Ids are never reused.
#[derive(Default)]
pub struct BackendRegistry {
    next_id: AtomicU32,
    entries: RwLock<HashMap<BackendId, Weak<dyn Backend>>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, backend: &Arc<dyn Backend>) -> BackendId {
        let id = BackendId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, weak| weak.strong_count() > 0);
        entries.insert(id, Arc::downgrade(backend));
        id
    }

    pub fn resolve(&self, id: BackendId) -> Option<Arc<dyn Backend>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(&id).and_then(Weak::upgrade)
    }

    pub fn unregister(&self, id: BackendId) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(&id);
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("BackendRegistry")
            .field("entries", &entries.len())
            .finish()
    }
}

/// Backend holding its records in memory. Used by the CLI to load records
/// from a file, and by tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<Vec<DnsResourceRecord>>,
    serials: RwLock<HashMap<i32, u32>>,
}

impl MemoryBackend {
    pub fn new(records: Vec<DnsResourceRecord>) -> Self {
        MemoryBackend {
            records: RwLock::new(records),
            serials: RwLock::default(),
        }
    }

    /// Last serial written back for `domain_id`, if any.
    pub fn serial(&self, domain_id: i32) -> Option<u32> {
        let serials = self.serials.read().unwrap_or_else(|e| e.into_inner());
        serials.get(&domain_id).copied()
    }
}

impl Backend for MemoryBackend {
    fn lookup(&self, qname: &str, qtype: QType, domain_id: i32) -> Vec<DnsResourceRecord> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records
            .iter()
            .filter(|rr| rr.qname.eq_ignore_ascii_case(qname))
            .filter(|rr| qtype == QType::ANY || rr.qtype == qtype)
            .filter(|rr| domain_id < 0 || rr.domain_id == domain_id)
            .cloned()
            .collect()
    }

    fn list(&self, domain_id: i32) -> Vec<DnsResourceRecord> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records
            .iter()
            .filter(|rr| rr.domain_id == domain_id)
            .cloned()
            .collect()
    }

    fn set_serial(&self, domain_id: i32, serial: u32) -> Result<(), DnsError> {
        let mut serials = self.serials.write().unwrap_or_else(|e| e.into_inner());
        let current = serials.entry(domain_id).or_insert(0);
        *current = (*current).max(serial);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soa::SoaData;

    fn example_backend() -> Arc<MemoryBackend> {
        Arc::new(MemoryBackend::new(vec![
            DnsResourceRecord {
                domain_id: 1,
                ..DnsResourceRecord::new("example.com", QType::SOA, "ns1 hm 0", 3600)
            },
            DnsResourceRecord {
                domain_id: 1,
                last_modified: 1_700_000_000,
                ..DnsResourceRecord::new("www.example.com", QType::A, "10.0.0.1", 3600)
            },
            DnsResourceRecord {
                domain_id: 1,
                ..DnsResourceRecord::new("www.example.com", QType::AAAA, "::1", 3600)
            },
        ]))
    }

    #[test]
    fn test_lookup_by_key() {
        let backend = example_backend();
        assert_eq!(backend.lookup("www.example.com", QType::A, 1).len(), 1);
        assert_eq!(backend.lookup("WWW.example.com", QType::ANY, -1).len(), 2);
        assert!(backend.lookup("www.example.com", QType::MX, 1).is_empty());
        assert!(backend.lookup("www.example.com", QType::A, 2).is_empty());
    }

    #[test]
    fn test_resolve_does_not_keep_backend_alive() {
        let registry = BackendRegistry::new();
        let backend: Arc<dyn Backend> = example_backend();
        let id = registry.register(&backend);

        assert!(registry.resolve(id).is_some());
        drop(backend);
        assert!(registry.resolve(id).is_none());
    }

    #[test]
    fn test_ids_are_distinct() {
        let registry = BackendRegistry::new();
        let first: Arc<dyn Backend> = example_backend();
        let second: Arc<dyn Backend> = example_backend();
        let a = registry.register(&first);
        let b = registry.register(&second);
        assert_ne!(a, b);

        registry.unregister(a);
        assert!(registry.resolve(a).is_none());
        assert!(registry.resolve(b).is_some());
    }

    #[test]
    fn test_publish_serial() {
        let registry = BackendRegistry::new();
        let memory = example_backend();
        let backend: Arc<dyn Backend> = memory.clone();
        let id = registry.register(&backend);

        let zone = backend.list(1);
        assert_eq!(zone.len(), 3);

        let soa = SoaData::from_records("example.com", &zone, None)
            .unwrap()
            .with_backend(id);
        assert!(soa.publish_serial(&registry).unwrap());
        assert_eq!(memory.serial(1), Some(1_700_000_000));

        drop(backend);
        drop(memory);
        assert!(!soa.publish_serial(&registry).unwrap());
    }
}
