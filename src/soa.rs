use crate::backend::{BackendId, BackendRegistry};
use crate::error::DnsError;
use crate::qtype::QType;
use crate::record::DnsResourceRecord;

pub const DEFAULT_REFRESH: u32 = 10800;
pub const DEFAULT_RETRY: u32 = 3600;
pub const DEFAULT_EXPIRE: u32 = 604800;
pub const DEFAULT_TTL: u32 = 3600;

/// Authority parameters of one zone.
///
/// `backend` only names the backend that produced this data; it is looked up
/// in a `BackendRegistry` whenever the serial has to be written back and does
/// not keep the backend alive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoaData {
    pub qname: String,
    pub nameserver: String,
    pub hostmaster: String,
    pub ttl: u32,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub default_ttl: u32,
    pub domain_id: i32,
    pub backend: Option<BackendId>,
}

impl SoaData {
    /// Parse SOA content of the form
    /// `nameserver hostmaster serial refresh retry expire default_ttl`.
    /// The numeric fields may be left off from the right and then take the
    /// usual defaults (serial 0).
    pub fn parse_content(
        qname: &str,
        content: &str,
        ttl: u32,
        domain_id: i32,
    ) -> Result<Self, DnsError> {
        let mut parts = content.split_whitespace();
        let nameserver = parts
            .next()
            .ok_or_else(|| DnsError::parse(format!("SOA for '{}' has no nameserver", qname)))?;
        let hostmaster = parts
            .next()
            .ok_or_else(|| DnsError::parse(format!("SOA for '{}' has no hostmaster", qname)))?;

        let numbers = parts
            .map(|field| {
                field
                    .parse::<u32>()
                    .map_err(|_| DnsError::parse(format!("bad SOA field '{}'", field)))
            })
            .collect::<Result<Vec<u32>, DnsError>>()?;
        if numbers.len() > 5 {
            return Err(DnsError::parse(format!(
                "SOA for '{}' has {} numeric fields",
                qname,
                numbers.len()
            )));
        }
        let field = |idx: usize, default: u32| numbers.get(idx).copied().unwrap_or(default);

        Ok(SoaData {
            qname: qname.to_string(),
            nameserver: nameserver.to_string(),
            hostmaster: hostmaster.to_string(),
            ttl,
            serial: field(0, 0),
            refresh: field(1, DEFAULT_REFRESH),
            retry: field(2, DEFAULT_RETRY),
            expire: field(3, DEFAULT_EXPIRE),
            default_ttl: field(4, DEFAULT_TTL),
            domain_id,
            backend: None,
        })
    }

    /// Build the zone's SOA from the records a backend returned for it.
    ///
    /// A stored serial of 0 asks for the serial to be derived from the
    /// records' modification times. Either way the result never goes below
    /// `previous_serial`.
    pub fn from_records(
        qname: &str,
        records: &[DnsResourceRecord],
        previous_serial: Option<u32>,
    ) -> Result<Self, DnsError> {
        let soa_record = records
            .iter()
            .find(|rr| rr.qtype == QType::SOA && rr.qname.eq_ignore_ascii_case(qname))
            .ok_or_else(|| DnsError::parse(format!("no SOA record for '{}'", qname)))?;

        let mut soa = Self::parse_content(
            &soa_record.qname,
            &soa_record.content,
            soa_record.ttl,
            soa_record.domain_id,
        )?;

        soa.serial = if soa.serial == 0 {
            Self::derive_serial(records, previous_serial)
        } else {
            soa.serial.max(previous_serial.unwrap_or(0))
        };

        Ok(soa)
    }

    /// Newest `last_modified` among `records`, clamped into the serial
    /// range, and never less than `previous`.
    pub fn derive_serial(records: &[DnsResourceRecord], previous: Option<u32>) -> u32 {
        records
            .iter()
            .map(|rr| rr.last_modified.clamp(0, u32::MAX as i64) as u32)
            .chain(previous)
            .max()
            .unwrap_or(0)
    }

    pub fn with_backend(mut self, backend: BackendId) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn to_content(&self) -> String {
        format!(
            "{} {} {} {} {} {} {}",
            self.nameserver,
            self.hostmaster,
            self.serial,
            self.refresh,
            self.retry,
            self.expire,
            self.default_ttl
        )
    }

    pub fn to_record(&self) -> DnsResourceRecord {
        DnsResourceRecord {
            domain_id: self.domain_id,
            ..DnsResourceRecord::new(&self.qname, QType::SOA, &self.to_content(), self.ttl)
        }
    }

    /// Hand the current serial to the backend this SOA came from.
    /// Returns `Ok(false)` when there is no backend or it has gone away.
    pub fn publish_serial(&self, registry: &BackendRegistry) -> Result<bool, DnsError> {
        let Some(backend) = self.backend.and_then(|id| registry.resolve(id)) else {
            return Ok(false);
        };
        backend.set_serial(self.domain_id, self.serial)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(soa_content: &str, modified: &[i64]) -> Vec<DnsResourceRecord> {
        let mut records = vec![DnsResourceRecord {
            domain_id: 7,
            ..DnsResourceRecord::new("example.com", QType::SOA, soa_content, 86400)
        }];
        for (i, ts) in modified.iter().enumerate() {
            records.push(DnsResourceRecord {
                last_modified: *ts,
                domain_id: 7,
                ..DnsResourceRecord::new(
                    "www.example.com",
                    QType::A,
                    &format!("10.0.0.{}", i + 1),
                    3600,
                )
            });
        }
        records
    }

    #[test]
    fn test_parse_full_content() {
        let soa = SoaData::parse_content(
            "example.com",
            "ns1.example.com hostmaster.example.com 2024010101 7200 1800 1209600 300",
            86400,
            3,
        )
        .unwrap();

        assert_eq!(soa.nameserver, "ns1.example.com");
        assert_eq!(soa.hostmaster, "hostmaster.example.com");
        assert_eq!(soa.serial, 2024010101);
        assert_eq!(soa.refresh, 7200);
        assert_eq!(soa.retry, 1800);
        assert_eq!(soa.expire, 1209600);
        assert_eq!(soa.default_ttl, 300);
        assert_eq!(soa.ttl, 86400);
        assert_eq!(soa.domain_id, 3);
    }

    #[test]
    fn test_parse_defaults() {
        let soa = SoaData::parse_content("example.com", "ns1 hostmaster", 3600, 1).unwrap();
        assert_eq!(soa.serial, 0);
        assert_eq!(soa.refresh, DEFAULT_REFRESH);
        assert_eq!(soa.retry, DEFAULT_RETRY);
        assert_eq!(soa.expire, DEFAULT_EXPIRE);
        assert_eq!(soa.default_ttl, DEFAULT_TTL);
        assert_eq!(soa.to_content(), "ns1 hostmaster 0 10800 3600 604800 3600");
    }

    #[test]
    fn test_parse_errors() {
        assert!(SoaData::parse_content("example.com", "", 0, 1).is_err());
        assert!(SoaData::parse_content("example.com", "ns1", 0, 1).is_err());
        assert!(SoaData::parse_content("example.com", "ns1 hm soon", 0, 1).is_err());
        assert!(SoaData::parse_content("example.com", "ns1 hm 1 2 3 4 5 6", 0, 1).is_err());
    }

    #[test]
    fn test_explicit_serial_kept() {
        let records = zone("ns1 hm 2024010101", &[1_700_000_000]);
        let soa = SoaData::from_records("example.com", &records, None).unwrap();
        assert_eq!(soa.serial, 2024010101);
        assert_eq!(soa.domain_id, 7);
        assert_eq!(soa.ttl, 86400);
    }

    #[test]
    fn test_automatic_serial_from_last_modified() {
        let records = zone("ns1 hm 0", &[1_600_000_000, 1_700_000_000, 1_650_000_000]);
        let soa = SoaData::from_records("example.com", &records, None).unwrap();
        assert_eq!(soa.serial, 1_700_000_000);
    }

    #[test]
    fn test_serial_never_goes_backwards() {
        let records = zone("ns1 hm 0", &[1_600_000_000]);
        let soa = SoaData::from_records("example.com", &records, Some(1_700_000_000)).unwrap();
        assert_eq!(soa.serial, 1_700_000_000);

        let records = zone("ns1 hm 5", &[]);
        let soa = SoaData::from_records("example.com", &records, Some(9)).unwrap();
        assert_eq!(soa.serial, 9);

        // recomputing from unchanged records is stable
        let records = zone("ns1 hm 0", &[1_600_000_000]);
        let first = SoaData::from_records("example.com", &records, None).unwrap();
        let second = SoaData::from_records("example.com", &records, Some(first.serial)).unwrap();
        assert!(second.serial >= first.serial);
    }

    #[test]
    fn test_derive_serial_clamps() {
        let records = zone("ns1 hm 0", &[-5, i64::MAX]);
        assert_eq!(SoaData::derive_serial(&records, None), u32::MAX);
        assert_eq!(SoaData::derive_serial(&[], None), 0);
        assert_eq!(SoaData::derive_serial(&[], Some(42)), 42);
    }

    #[test]
    fn test_missing_soa_record() {
        let records = zone("ns1 hm 0", &[1]);
        assert!(SoaData::from_records("other.org", &records, None).is_err());
    }

    #[test]
    fn test_to_record() {
        let soa = SoaData::parse_content("example.com", "ns1 hm 12", 600, 4).unwrap();
        let record = soa.to_record();
        assert_eq!(record.qtype, QType::SOA);
        assert_eq!(record.qname, "example.com");
        assert_eq!(record.ttl, 600);
        assert_eq!(record.domain_id, 4);
        assert_eq!(
            SoaData::parse_content(&record.qname, &record.content, record.ttl, record.domain_id)
                .unwrap(),
            soa
        );
    }
}
