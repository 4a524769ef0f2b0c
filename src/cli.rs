use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use dns_core::record::{dedup_canonical, sort_canonical};
use dns_core::{
    Backend, BackendRegistry, DnsFlags, DnsHeader, DnsResourceRecord, MemoryBackend, Opcode,
    QType, RCode, SoaData,
};

#[derive(clap::Args, Debug)]
pub struct HeaderArgs {
    #[arg(long, default_value_t = 0)]
    id: u16,
    #[arg(long)]
    qr: bool,
    #[arg(long, default_value = "query")]
    opcode: Opcode,
    #[arg(long)]
    aa: bool,
    #[arg(long)]
    tc: bool,
    #[arg(long)]
    rd: bool,
    #[arg(long)]
    ra: bool,
    #[arg(long)]
    ad: bool,
    #[arg(long)]
    cd: bool,
    #[arg(long, default_value = "noerror")]
    rcode: RCode,
    #[arg(long, default_value_t = 0)]
    qdcount: u16,
    #[arg(long, default_value_t = 0)]
    ancount: u16,
    #[arg(long, default_value_t = 0)]
    nscount: u16,
    #[arg(long, default_value_t = 0)]
    arcount: u16,
}

pub fn decode_header(hex: &str) -> anyhow::Result<()> {
    let bytes = parse_hex(hex)?;
    if bytes.len() > 12 {
        tracing::warn!(extra = bytes.len() - 12, "ignoring bytes after the header");
    }
    let header = DnsHeader::from_bytes(&bytes).context("decoding header")?;
    let flags = &header.flags;

    let opcode = header
        .opcode()
        .map(|op| op.to_string())
        .unwrap_or_else(|| format!("RESERVED{}", flags.opcode_bits()));
    let rcode = header
        .rcode()
        .map(|rc| rc.to_string())
        .unwrap_or_else(|| format!("RCODE{}", flags.rcode_bits()));

    println!("id: 0x{:04x} ({})", header.id, header.id);
    println!("qr: {} opcode: {} rcode: {}", flags.qr as u8, opcode, rcode);
    println!(
        "flags: aa={} tc={} rd={} ra={} z={} ad={} cd={}",
        flags.aa as u8,
        flags.tc as u8,
        flags.rd as u8,
        flags.ra as u8,
        flags.z as u8,
        flags.ad as u8,
        flags.cd as u8
    );
    println!(
        "qdcount: {} ancount: {} nscount: {} arcount: {}",
        header.qdcount, header.ancount, header.nscount, header.arcount
    );
    Ok(())
}

pub fn encode_header(args: &HeaderArgs) -> anyhow::Result<()> {
    let mut flags = DnsFlags::default();
    flags.qr = args.qr;
    flags.aa = args.aa;
    flags.tc = args.tc;
    flags.rd = args.rd;
    flags.ra = args.ra;
    flags.ad = args.ad;
    flags.cd = args.cd;

    let mut header = DnsHeader {
        id: args.id,
        flags,
        qdcount: args.qdcount,
        ancount: args.ancount,
        nscount: args.nscount,
        arcount: args.arcount,
    };
    header.set_opcode(args.opcode);
    header.set_rcode(args.rcode);

    println!("{}", to_hex(&header.to_bytes()));
    Ok(())
}

pub fn show_record(line: &str) -> anyhow::Result<()> {
    let record = DnsResourceRecord::unserialize(line).context("parsing serialized record")?;

    println!("{}", record);
    println!("place: {:?} domain_id: {}", record.place, record.domain_id);
    match record.to_wire() {
        Ok(wire) => println!("wire: {}", to_hex(&wire)),
        Err(e) => tracing::warn!(error = %e, "record has no wire form"),
    }
    Ok(())
}

pub fn sort_records(file: Option<&Path>, dedup: bool) -> anyhow::Result<()> {
    let mut records = load_records(file)?;
    let before = records.len();

    if dedup {
        dedup_canonical(&mut records);
    } else {
        sort_canonical(&mut records);
    }
    tracing::info!(read = before, written = records.len(), "sorted records");

    for record in &records {
        println!("{}", record.serialize());
    }
    Ok(())
}

pub fn derive_soa(zone: &str, file: &Path, previous_serial: Option<u32>) -> anyhow::Result<()> {
    let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new(load_records(Some(file))?));
    let registry = BackendRegistry::new();
    let id = registry.register(&backend);

    let Some(apex) = backend.lookup(zone, QType::SOA, -1).into_iter().next() else {
        bail!("no SOA record for {} in {}", zone, file.display());
    };
    let records = backend.list(apex.domain_id);
    tracing::debug!(zone, domain_id = apex.domain_id, records = records.len(), "loaded zone");

    let soa = SoaData::from_records(zone, &records, previous_serial)
        .with_context(|| format!("building SOA for {}", zone))?
        .with_backend(id);
    if soa.publish_serial(&registry)? {
        tracing::info!(serial = soa.serial, %id, "published serial");
    }

    println!("{}", soa.to_record());
    println!(
        "serial: {} refresh: {} retry: {} expire: {} default_ttl: {}",
        soa.serial, soa.refresh, soa.retry, soa.expire, soa.default_ttl
    );
    Ok(())
}

fn load_records(file: Option<&Path>) -> anyhow::Result<Vec<DnsResourceRecord>> {
    let input = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("reading stdin")?;
            input
        }
    };

    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|(n, line)| {
            DnsResourceRecord::unserialize(line).with_context(|| format!("line {}", n + 1))
        })
        .collect()
}

fn parse_hex(input: &str) -> anyhow::Result<Vec<u8>> {
    let digits: String = input
        .split_whitespace()
        .map(|word| word.trim_start_matches("0x"))
        .collect();
    if digits.len() % 2 != 0 || !digits.is_ascii() {
        bail!("expected an even number of hex digits, got '{}'", input);
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .with_context(|| format!("bad hex byte '{}'", &digits[i..i + 2]))
        })
        .collect()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("1234 0100").unwrap(), vec![0x12, 0x34, 0x01, 0x00]);
        assert_eq!(parse_hex("0x12 0x34").unwrap(), vec![0x12, 0x34]);
        assert!(parse_hex("123").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[0x12, 0x34, 0x00]), "12 34 00");
    }
}
