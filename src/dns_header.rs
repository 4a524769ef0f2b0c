use bytes::{Buf, BufMut};

use crate::error::DnsError;
use crate::qtype::{Opcode, RCode};

pub const HEADER_LEN: usize = 12;

/// The fixed 12-byte header that starts every DNS message.
///
/// Fields are plain values; the wire layout lives entirely in `from_bytes`
/// and `to_bytes`, which always read and write network byte order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DnsHeader {
    pub id: u16,
    pub flags: DnsFlags,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

/// The two flag bytes of the header.
///
/// `opcode` and `rcode` are kept raw so every bit pattern off the wire can be
/// represented. Both are 4-bit fields and are masked on the way in, so a
/// decoded header always equals the one that was encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DnsFlags {
    pub qr: bool,   // Query/Response (false = query, true = response)
    opcode: u8,     // Operation code (0 = standard query)
    pub aa: bool,   // Authoritative Answer
    pub tc: bool,   // Truncation
    pub rd: bool,   // Recursion Desired
    pub ra: bool,   // Recursion Available
    pub z: bool,    // Reserved (must be 0)
    pub ad: bool,   // Authentic Data
    pub cd: bool,   // Checking Disabled
    rcode: u8,      // Response code
}

impl DnsFlags {
    pub fn opcode_bits(&self) -> u8 {
        self.opcode
    }

    pub fn set_opcode_bits(&mut self, opcode: u8) {
        self.opcode = opcode & 0xF;
    }

    pub fn rcode_bits(&self) -> u8 {
        self.rcode
    }

    pub fn set_rcode_bits(&mut self, rcode: u8) {
        self.rcode = rcode & 0xF;
    }

    pub fn to_u16(&self) -> u16 {
        let mut flags: u16 = 0;

        if self.qr { flags |= 1 << 15; }           // QR at bit 15
        flags |= (self.opcode as u16) << 11;       // OPCODE at bits 11-14
        if self.aa { flags |= 1 << 10; }           // AA at bit 10
        if self.tc { flags |= 1 << 9; }            // TC at bit 9
        if self.rd { flags |= 1 << 8; }            // RD at bit 8
        if self.ra { flags |= 1 << 7; }            // RA at bit 7
        if self.z { flags |= 1 << 6; }             // Z at bit 6
        if self.ad { flags |= 1 << 5; }            // AD at bit 5
        if self.cd { flags |= 1 << 4; }            // CD at bit 4
        flags |= self.rcode as u16;                // RCODE at bits 0-3

        flags
    }

    pub fn from_u16(flags: u16) -> Self {
        DnsFlags {
            qr: (flags & (1 << 15)) != 0,
            opcode: ((flags >> 11) & 0xF) as u8,
            aa: (flags & (1 << 10)) != 0,
            tc: (flags & (1 << 9)) != 0,
            rd: (flags & (1 << 8)) != 0,
            ra: (flags & (1 << 7)) != 0,
            z: (flags & (1 << 6)) != 0,
            ad: (flags & (1 << 5)) != 0,
            cd: (flags & (1 << 4)) != 0,
            rcode: (flags & 0xF) as u8,
        }
    }
}

impl DnsHeader {
    /// Decode the header from the start of `bytes`. Anything past the first
    /// 12 bytes is left alone.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DnsError> {
        if bytes.len() < HEADER_LEN {
            return Err(DnsError::MalformedHeader { len: bytes.len() });
        }

        let mut buf = &bytes[..HEADER_LEN];
        Ok(DnsHeader {
            id: buf.get_u16(),
            flags: DnsFlags::from_u16(buf.get_u16()),
            qdcount: buf.get_u16(),
            ancount: buf.get_u16(),
            nscount: buf.get_u16(),
            arcount: buf.get_u16(),
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        let mut buf = &mut bytes[..];
        self.write_to(&mut buf);
        bytes
    }

    /// Append the encoded header to a message buffer.
    pub fn write_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16(self.id);
        buf.put_u16(self.flags.to_u16());
        buf.put_u16(self.qdcount);
        buf.put_u16(self.ancount);
        buf.put_u16(self.nscount);
        buf.put_u16(self.arcount);
    }

    /// Header for the answer to `request`: id, opcode, rd and the question
    /// count are echoed, everything else starts out cleared.
    pub fn response_to(request: &DnsHeader) -> Self {
        DnsHeader {
            id: request.id,
            flags: DnsFlags {
                qr: true,
                opcode: request.flags.opcode,
                rd: request.flags.rd,
                ..DnsFlags::default()
            },
            qdcount: request.qdcount,
            ..DnsHeader::default()
        }
    }

    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_u8(self.flags.opcode)
    }

    pub fn set_opcode(&mut self, opcode: Opcode) {
        self.flags.set_opcode_bits(opcode.to_u8());
    }

    pub fn rcode(&self) -> Option<RCode> {
        RCode::from_u8(self.flags.rcode)
    }

    pub fn set_rcode(&mut self, rcode: RCode) {
        self.flags.set_rcode_bits(rcode.to_u8());
    }
}
