use bytes::{Buf, BufMut};

use crate::error::DnsError;
use crate::qtype::QType;

pub const RECORD_HEADER_LEN: usize = 10;

/// TYPE + CLASS + TTL + RDLENGTH, the fixed part of a resource record that
/// sits between the owner name and the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub rtype: u16,
    pub class: u16,
    pub ttl: u32,
    pub content_len: u16,
}

impl RecordHeader {
    pub fn qtype(&self) -> QType {
        QType::from_u16(self.rtype)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DnsError> {
        if bytes.len() < RECORD_HEADER_LEN {
            return Err(DnsError::TruncatedRecord {
                needed: RECORD_HEADER_LEN,
                available: bytes.len(),
            });
        }

        let mut buf = &bytes[..RECORD_HEADER_LEN];
        Ok(RecordHeader {
            rtype: buf.get_u16(),
            class: buf.get_u16(),
            ttl: buf.get_u32(),
            content_len: buf.get_u16(),
        })
    }

    pub fn to_bytes(&self) -> [u8; RECORD_HEADER_LEN] {
        let mut bytes = [0u8; RECORD_HEADER_LEN];
        let mut buf = &mut bytes[..];
        self.write_to(&mut buf);
        bytes
    }

    pub fn write_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16(self.rtype);
        buf.put_u16(self.class);
        buf.put_u32(self.ttl);
        buf.put_u16(self.content_len);
    }

    /// Decode the header and cut exactly `content_len` bytes of content off
    /// the front of what follows it. Returns the header, the content and the
    /// unread remainder.
    pub fn split_content(bytes: &[u8]) -> Result<(Self, &[u8], &[u8]), DnsError> {
        let header = Self::from_bytes(bytes)?;
        let rest = &bytes[RECORD_HEADER_LEN..];
        let len = header.content_len as usize;

        if rest.len() < len {
            return Err(DnsError::TruncatedRecord {
                needed: len,
                available: rest.len(),
            });
        }

        let (content, remainder) = rest.split_at(len);
        Ok((header, content, remainder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a_record_header() -> Vec<u8> {
        RecordHeader {
            rtype: QType::A.to_u16(),
            class: 1,
            ttl: 3600,
            content_len: 4,
        }
        .to_bytes()
        .to_vec()
    }

    #[test]
    fn test_wire_layout() {
        assert_eq!(a_record_header(), vec![0, 1, 0, 1, 0, 0, 0x0E, 0x10, 0, 4]);
    }

    #[test]
    fn test_split_exact_content() {
        let mut bytes = a_record_header();
        bytes.extend_from_slice(&[10, 0, 0, 1]);

        let (header, content, rest) = RecordHeader::split_content(&bytes).unwrap();
        assert_eq!(header.qtype(), QType::A);
        assert_eq!(header.class, 1);
        assert_eq!(header.ttl, 3600);
        assert_eq!(content, &[10, 0, 0, 1]);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_split_leaves_remainder() {
        let mut bytes = a_record_header();
        bytes.extend_from_slice(&[10, 0, 0, 1, 0xFF]);

        let (_, content, rest) = RecordHeader::split_content(&bytes).unwrap();
        assert_eq!(content.len(), 4);
        assert_eq!(rest, &[0xFF]);
    }

    #[test]
    fn test_short_content_is_truncated() {
        let mut bytes = a_record_header();
        bytes.extend_from_slice(&[10, 0, 0]);

        assert_eq!(
            RecordHeader::split_content(&bytes),
            Err(DnsError::TruncatedRecord { needed: 4, available: 3 })
        );
    }

    #[test]
    fn test_short_header_is_truncated() {
        assert_eq!(
            RecordHeader::from_bytes(&[0, 1, 0, 1]),
            Err(DnsError::TruncatedRecord { needed: 10, available: 4 })
        );
    }

    #[test]
    fn test_unknown_type_decodes() {
        let header = RecordHeader::from_bytes(&[0xFF, 0x00, 0, 1, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(header.qtype(), QType::Unknown(0xFF00));
    }
}
