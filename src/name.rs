use bytes::BufMut;

use crate::error::DnsError;

const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 255;

/// Encode a domain name to DNS message format
/// Format: length-prefixed labels terminated with a null byte
/// Example: "example.com" -> [7]example[3]com[0]
pub fn encode_domain_name<B: BufMut>(name: &str, buf: &mut B) -> Result<(), DnsError> {
    let labels: Vec<&str> = name.split('.').filter(|label| !label.is_empty()).collect();

    // one length byte per label, the label bytes, and the terminating zero
    let wire_len = labels.iter().map(|label| label.len() + 1).sum::<usize>() + 1;
    if wire_len > MAX_NAME_LEN {
        return Err(DnsError::InvalidName(format!(
            "{} is {} bytes on the wire",
            name, wire_len
        )));
    }

    for label in &labels {
        if label.len() > MAX_LABEL_LEN {
            return Err(DnsError::InvalidName(format!("label too long: {}", label)));
        }
        buf.put_u8(label.len() as u8);
        buf.put_slice(label.as_bytes());
    }
    buf.put_u8(0);

    Ok(())
}

/// Parse an uncompressed domain name starting at `offset`.
/// Returns the name (root as ".") and the offset just past it. Names that
/// `encode_domain_name` would refuse are refused here too.
pub fn parse_domain_name(bytes: &[u8], mut offset: usize) -> Result<(String, usize), DnsError> {
    let start = offset;
    let mut labels = Vec::new();

    loop {
        let length = *bytes.get(offset).ok_or(DnsError::TruncatedRecord {
            needed: offset + 1,
            available: bytes.len(),
        })? as usize;
        offset += 1;

        if length == 0 {
            break;
        }
        if offset - start + length + 1 > MAX_NAME_LEN {
            return Err(DnsError::InvalidName(format!(
                "name at offset {} is longer than {} bytes",
                start, MAX_NAME_LEN
            )));
        }
        if length & 0xC0 != 0 {
            return Err(DnsError::InvalidName(format!(
                "compressed or extended label type 0x{:02x} at offset {}",
                length,
                offset - 1
            )));
        }

        let label = bytes.get(offset..offset + length).ok_or(DnsError::TruncatedRecord {
            needed: offset + length,
            available: bytes.len(),
        })?;
        let label = std::str::from_utf8(label)
            .map_err(|_| DnsError::InvalidName("invalid UTF-8 in label".to_string()))?;
        if label.contains('.') {
            return Err(DnsError::InvalidName(format!("dot inside label: {}", label)));
        }

        labels.push(label);
        offset += length;
    }

    let domain_name = if labels.is_empty() {
        ".".to_string()
    } else {
        labels.join(".")
    };

    Ok((domain_name, offset))
}
