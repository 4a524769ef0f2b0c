//! In-memory model and wire encoding of the core DNS entities a nameserver
//! works with: the message header, resource records, zone SOA data and the
//! type / opcode / rcode vocabularies.

pub mod backend;
pub mod dns_header;
pub mod error;
pub mod name;
pub mod qtype;
pub mod rdata;
pub mod record;
pub mod record_header;
pub mod soa;
pub mod start_time;

pub use backend::{Backend, BackendId, BackendRegistry, MemoryBackend};
pub use dns_header::{DnsFlags, DnsHeader};
pub use error::DnsError;
pub use qtype::{Opcode, QType, RCode, RecordClass};
pub use record::{DnsResourceRecord, Place};
pub use record_header::RecordHeader;
pub use soa::SoaData;
