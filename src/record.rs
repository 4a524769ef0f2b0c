use std::cmp::Ordering;
use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::DnsError;
use crate::name::{encode_domain_name, parse_domain_name};
use crate::qtype::{QType, RecordClass};
use crate::rdata::{decode_rdata, encode_rdata};
use crate::record_header::RecordHeader;

const FIELD_SEPARATOR: char = '|';
const ESCAPE: char = '\\';
const SERIALIZED_FIELDS: usize = 9;

/// Domain id of records that no backend keeps track of.
pub const NO_DOMAIN_ID: i32 = -1;

/// Section of a DNS message a record is placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Place {
    Question = 0,
    #[default]
    Answer = 1,
    Authority = 2,
    Additional = 3,
}

impl Place {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Place::Question),
            1 => Some(Place::Answer),
            2 => Some(Place::Authority),
            3 => Some(Place::Additional),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// One resource record as a nameserver keeps it in memory.
///
/// `content` is the textual form (`10.1.2.3` for A, a name for CNAME, the
/// exchanger for MX with the preference kept in `priority`). The wire form
/// is rebuilt from these fields by `to_wire`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsResourceRecord {
    pub qtype: QType,
    pub qclass: u16,
    pub qname: String,
    pub content: String,
    pub priority: u16,
    pub ttl: u32,
    /// Zone this record belongs to, or `NO_DOMAIN_ID`.
    pub domain_id: i32,
    /// Unix time of the last change, 0 when the backend does not know.
    pub last_modified: i64,
    pub place: Place,
}

impl Default for DnsResourceRecord {
    fn default() -> Self {
        DnsResourceRecord {
            qtype: QType::INVALID,
            qclass: RecordClass::IN.to_u16(),
            qname: String::new(),
            content: String::new(),
            priority: 0,
            ttl: 0,
            domain_id: NO_DOMAIN_ID,
            last_modified: 0,
            place: Place::Answer,
        }
    }
}

impl DnsResourceRecord {
    pub fn new(
        qname: impl Into<String>,
        qtype: QType,
        content: impl Into<String>,
        ttl: u32,
    ) -> Self {
        DnsResourceRecord {
            qtype,
            qname: qname.into(),
            content: content.into(),
            ttl,
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_place(mut self, place: Place) -> Self {
        self.place = place;
        self
    }

    pub fn with_domain_id(mut self, domain_id: i32) -> Self {
        self.domain_id = domain_id;
        self
    }

    /// Canonical order: by name, then by content. Type and class do not take
    /// part, so an A and an AAAA record can compare equal here.
    pub fn cmp_canonical(&self, other: &Self) -> Ordering {
        self.qname
            .cmp(&other.qname)
            .then_with(|| self.content.cmp(&other.content))
    }

    /// `self < other` in canonical order.
    pub fn precedes(&self, other: &Self) -> bool {
        self.cmp_canonical(other) == Ordering::Less
    }

    /// Text form for persistence and hashing. Separators and backslashes in
    /// the name and content are backslash-escaped.
    pub fn serialize(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}|{}",
            escape(&self.qname),
            self.qtype,
            self.qclass,
            escape(&self.content),
            self.ttl,
            self.priority,
            self.domain_id,
            self.last_modified,
            self.place.to_u8()
        )
    }

    pub fn unserialize(line: &str) -> Result<Self, DnsError> {
        let fields = split_escaped(line)?;
        if fields.len() != SERIALIZED_FIELDS {
            return Err(DnsError::parse(format!(
                "expected {} fields, found {}",
                SERIALIZED_FIELDS,
                fields.len()
            )));
        }

        let place = number::<u8>(&fields[8], "place")?;
        Ok(DnsResourceRecord {
            qname: fields[0].clone(),
            qtype: fields[1].parse()?,
            qclass: number(&fields[2], "class")?,
            content: fields[3].clone(),
            ttl: number(&fields[4], "ttl")?,
            priority: number(&fields[5], "priority")?,
            domain_id: number(&fields[6], "domain id")?,
            last_modified: number(&fields[7], "last modified")?,
            place: Place::from_u8(place)
                .ok_or_else(|| DnsError::parse(format!("bad place {}", place)))?,
        })
    }

    /// Wire form of this record. Question-section records produce a question
    /// entry (name, type, class); all others a full resource record.
    pub fn to_wire(&self) -> Result<Bytes, DnsError> {
        let mut buf = BytesMut::new();
        encode_domain_name(&self.qname, &mut buf)?;

        if self.place == Place::Question {
            buf.put_u16(self.qtype.to_u16());
            buf.put_u16(self.qclass);
            return Ok(buf.freeze());
        }

        let mut rdata = BytesMut::new();
        encode_rdata(self.qtype, &self.content, self.priority, &mut rdata)?;
        let content_len = u16::try_from(rdata.len()).map_err(|_| DnsError::InvalidContent {
            qtype: self.qtype,
            content: format!("{} bytes of rdata", rdata.len()),
        })?;

        RecordHeader {
            rtype: self.qtype.to_u16(),
            class: self.qclass,
            ttl: self.ttl,
            content_len,
        }
        .write_to(&mut buf);
        buf.put(rdata);

        Ok(buf.freeze())
    }

    /// Parse a record (or question entry, for `Place::Question`) starting at
    /// `offset`. Returns the record and the offset just past it.
    pub fn from_wire(bytes: &[u8], offset: usize, place: Place) -> Result<(Self, usize), DnsError> {
        let (qname, offset) = parse_domain_name(bytes, offset)?;

        if place == Place::Question {
            let fixed = bytes.get(offset..offset + 4).ok_or(DnsError::TruncatedRecord {
                needed: offset + 4,
                available: bytes.len(),
            })?;
            let record = DnsResourceRecord {
                qname,
                qtype: QType::from_u16(u16::from_be_bytes([fixed[0], fixed[1]])),
                qclass: u16::from_be_bytes([fixed[2], fixed[3]]),
                place,
                ..Default::default()
            };
            return Ok((record, offset + 4));
        }

        let (header, rdata, rest) = RecordHeader::split_content(&bytes[offset..])?;
        let (content, priority) = decode_rdata(header.qtype(), rdata)?;
        let record = DnsResourceRecord {
            qtype: header.qtype(),
            qclass: header.class,
            qname,
            content,
            priority,
            ttl: header.ttl,
            place,
            ..Default::default()
        };

        Ok((record, bytes.len() - rest.len()))
    }
}

impl fmt::Display for DnsResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t",
            self.qname,
            self.ttl,
            RecordClass::from_u16(self.qclass),
            self.qtype
        )?;
        if self.qtype.uses_priority() {
            write!(f, "{} ", self.priority)?;
        }
        f.write_str(&self.content)
    }
}

/// Sort into canonical (name, content) order. The sort is stable, so records
/// that tie keep their relative order.
pub fn sort_canonical(records: &mut [DnsResourceRecord]) {
    records.sort_by(DnsResourceRecord::cmp_canonical);
}

/// Sort canonically and drop records that repeat the name, content, type and
/// class of the one before them.
pub fn dedup_canonical(records: &mut Vec<DnsResourceRecord>) {
    records.sort_by(|a, b| {
        a.cmp_canonical(b)
            .then_with(|| a.qtype.to_u16().cmp(&b.qtype.to_u16()))
            .then_with(|| a.qclass.cmp(&b.qclass))
    });
    records.dedup_by(|b, a| {
        a.cmp_canonical(b) == Ordering::Equal && a.qtype == b.qtype && a.qclass == b.qclass
    });
}

/// Records destined for one message section.
pub fn in_place(
    records: &[DnsResourceRecord],
    place: Place,
) -> impl Iterator<Item = &DnsResourceRecord> {
    records.iter().filter(move |rr| rr.place == place)
}

fn escape(field: &str) -> String {
    let mut escaped = String::with_capacity(field.len());
    for c in field.chars() {
        if c == FIELD_SEPARATOR || c == ESCAPE {
            escaped.push(ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Split on unescaped separators, removing the escapes.
fn split_escaped(line: &str) -> Result<Vec<String>, DnsError> {
    let mut fields = Vec::with_capacity(SERIALIZED_FIELDS);
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.next() {
                Some(next @ (FIELD_SEPARATOR | ESCAPE)) => current.push(next),
                Some(other) => {
                    return Err(DnsError::parse(format!("invalid escape '\\{}'", other)))
                }
                None => return Err(DnsError::parse("dangling escape at end of record")),
            },
            FIELD_SEPARATOR => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);

    Ok(fields)
}

fn number<T: std::str::FromStr>(field: &str, what: &str) -> Result<T, DnsError> {
    field
        .parse()
        .map_err(|_| DnsError::parse(format!("bad {} '{}'", what, field)))
}
