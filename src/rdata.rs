//! Conversion between the textual content kept in a `DnsResourceRecord` and
//! the type-specific bytes that follow the record header on the wire.
//!
//! Only a handful of types have a grammar here. Everything else can still be
//! carried using the RFC 3597 generic form `\# <len> <hex>`.

use std::net::{Ipv4Addr, Ipv6Addr};

use bytes::{Buf, BufMut};

use crate::error::DnsError;
use crate::name::{encode_domain_name, parse_domain_name};
use crate::qtype::QType;
use crate::soa::SoaData;

const GENERIC_PREFIX: &str = "\\#";
const MAX_CHARACTER_STRING: usize = 255;

fn is_single_name(qtype: QType) -> bool {
    matches!(
        qtype,
        QType::NS
            | QType::CNAME
            | QType::PTR
            | QType::DNAME
            | QType::MB
            | QType::MG
            | QType::MR
            | QType::MD
            | QType::MF
    )
}

/// Append the wire form of `content` for a record of type `qtype`.
/// `priority` is only consulted for MX.
pub fn encode_rdata<B: BufMut>(
    qtype: QType,
    content: &str,
    priority: u16,
    buf: &mut B,
) -> Result<(), DnsError> {
    let qtype = qtype.canonical();
    if content.starts_with(GENERIC_PREFIX) {
        buf.put_slice(&parse_generic(qtype, content)?);
        return Ok(());
    }

    let invalid = || DnsError::InvalidContent {
        qtype,
        content: content.to_string(),
    };

    match qtype {
        QType::A => {
            let addr: Ipv4Addr = content.trim().parse().map_err(|_| invalid())?;
            buf.put_slice(&addr.octets());
        }
        QType::AAAA => {
            let addr: Ipv6Addr = content.trim().parse().map_err(|_| invalid())?;
            buf.put_slice(&addr.octets());
        }
        QType::MX => {
            buf.put_u16(priority);
            encode_domain_name(content.trim(), buf)?;
        }
        QType::TXT => {
            let text = content.as_bytes();
            if text.is_empty() {
                buf.put_u8(0);
            }
            for chunk in text.chunks(MAX_CHARACTER_STRING) {
                buf.put_u8(chunk.len() as u8);
                buf.put_slice(chunk);
            }
        }
        QType::SOA => {
            let soa = SoaData::parse_content("", content, 0, -1)?;
            encode_domain_name(&soa.nameserver, buf)?;
            encode_domain_name(&soa.hostmaster, buf)?;
            buf.put_u32(soa.serial);
            buf.put_u32(soa.refresh);
            buf.put_u32(soa.retry);
            buf.put_u32(soa.expire);
            buf.put_u32(soa.default_ttl);
        }
        qtype if is_single_name(qtype) => encode_domain_name(content.trim(), buf)?,
        qtype => return Err(DnsError::Unsupported(qtype)),
    }

    Ok(())
}

/// Turn wire content back into text. Returns the content and, for MX, the
/// preference (0 otherwise).
pub fn decode_rdata(qtype: QType, rdata: &[u8]) -> Result<(String, u16), DnsError> {
    let qtype = qtype.canonical();
    let invalid = || DnsError::InvalidContent {
        qtype,
        content: format!("{} bytes of rdata", rdata.len()),
    };

    let decoded = match qtype {
        QType::A => {
            let octets: [u8; 4] = rdata.try_into().map_err(|_| invalid())?;
            (Ipv4Addr::from(octets).to_string(), 0)
        }
        QType::AAAA => {
            let octets: [u8; 16] = rdata.try_into().map_err(|_| invalid())?;
            (Ipv6Addr::from(octets).to_string(), 0)
        }
        QType::MX => {
            if rdata.len() < 2 {
                return Err(invalid());
            }
            let priority = u16::from_be_bytes([rdata[0], rdata[1]]);
            (parse_whole_name(qtype, rdata, 2)?, priority)
        }
        QType::TXT => {
            let mut text = Vec::with_capacity(rdata.len());
            let mut rest = rdata;
            while let Some((&len, tail)) = rest.split_first() {
                let chunk = tail.get(..len as usize).ok_or(DnsError::TruncatedRecord {
                    needed: len as usize,
                    available: tail.len(),
                })?;
                text.extend_from_slice(chunk);
                rest = &tail[len as usize..];
            }
            let text = String::from_utf8(text).map_err(|_| invalid())?;
            (text, 0)
        }
        QType::SOA => {
            let (nameserver, offset) = parse_domain_name(rdata, 0)?;
            let (hostmaster, offset) = parse_domain_name(rdata, offset)?;
            let mut numbers = rdata
                .get(offset..)
                .filter(|rest| rest.len() == 20)
                .ok_or_else(invalid)?;
            let soa = SoaData {
                nameserver,
                hostmaster,
                serial: numbers.get_u32(),
                refresh: numbers.get_u32(),
                retry: numbers.get_u32(),
                expire: numbers.get_u32(),
                default_ttl: numbers.get_u32(),
                ..SoaData::default()
            };
            (soa.to_content(), 0)
        }
        qtype if is_single_name(qtype) => (parse_whole_name(qtype, rdata, 0)?, 0),
        _ => (format_generic(rdata), 0),
    };

    Ok(decoded)
}

fn parse_whole_name(qtype: QType, rdata: &[u8], offset: usize) -> Result<String, DnsError> {
    let (name, end) = parse_domain_name(rdata, offset)?;
    if end != rdata.len() {
        return Err(DnsError::InvalidContent {
            qtype,
            content: format!("{} trailing bytes after {}", rdata.len() - end, name),
        });
    }
    Ok(name)
}

fn format_generic(rdata: &[u8]) -> String {
    let mut out = format!("{} {}", GENERIC_PREFIX, rdata.len());
    if !rdata.is_empty() {
        out.push(' ');
        for byte in rdata {
            out.push_str(&format!("{:02x}", byte));
        }
    }
    out
}

fn parse_generic(qtype: QType, content: &str) -> Result<Vec<u8>, DnsError> {
    let invalid = || DnsError::InvalidContent {
        qtype,
        content: content.to_string(),
    };

    let mut fields = content[GENERIC_PREFIX.len()..].split_whitespace();
    let len: usize = fields
        .next()
        .and_then(|len| len.parse().ok())
        .ok_or_else(invalid)?;
    let hex: String = fields.collect();

    if hex.len() != len * 2 || !hex.is_ascii() {
        return Err(invalid());
    }

    (0..len)
        .map(|i| u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| invalid()))
        .collect()
}
