use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::DnsError;

macro_rules! qtypes {
    ($($variant:ident = $code:literal => $name:literal,)*) => {
        /// DNS record types, numbered as assigned by IANA.
        ///
        /// Codes without a variant of their own are carried in `Unknown` so
        /// that records of types we do not understand can still be moved
        /// around opaquely. Equality and hashing go by the numeric code, so
        /// `Unknown(1)` is the same type as `A`.
        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy)]
        pub enum QType {
            $($variant,)*
            Unknown(u16),
        }

        impl QType {
            pub fn from_u16(value: u16) -> Self {
                match value {
                    $($code => QType::$variant,)*
                    other => QType::Unknown(other),
                }
            }

            pub fn to_u16(self) -> u16 {
                match self {
                    $(QType::$variant => $code,)*
                    QType::Unknown(code) => code,
                }
            }

            /// Mnemonic for well-known codes, `None` for codes without one.
            pub fn mnemonic(self) -> Option<&'static str> {
                match self.canonical() {
                    $(QType::$variant => Some($name),)*
                    QType::Unknown(_) => None,
                }
            }

            fn from_mnemonic(name: &str) -> Option<Self> {
                $(if name.eq_ignore_ascii_case($name) {
                    return Some(QType::$variant);
                })*
                None
            }
        }
    };
}

qtypes! {
    INVALID = 0 => "INVALID",
    A = 1 => "A",
    NS = 2 => "NS",
    MD = 3 => "MD",
    MF = 4 => "MF",
    CNAME = 5 => "CNAME",
    SOA = 6 => "SOA",
    MB = 7 => "MB",
    MG = 8 => "MG",
    MR = 9 => "MR",
    NULL = 10 => "NULL",
    WKS = 11 => "WKS",
    PTR = 12 => "PTR",
    HINFO = 13 => "HINFO",
    MINFO = 14 => "MINFO",
    MX = 15 => "MX",
    TXT = 16 => "TXT",
    RP = 17 => "RP",
    AFSDB = 18 => "AFSDB",
    X25 = 19 => "X25",
    ISDN = 20 => "ISDN",
    RT = 21 => "RT",
    NSAP = 22 => "NSAP",
    NSAP_PTR = 23 => "NSAP-PTR",
    SIG = 24 => "SIG",
    KEY = 25 => "KEY",
    PX = 26 => "PX",
    GPOS = 27 => "GPOS",
    AAAA = 28 => "AAAA",
    LOC = 29 => "LOC",
    NXT = 30 => "NXT",
    EID = 31 => "EID",
    NIMLOC = 32 => "NIMLOC",
    SRV = 33 => "SRV",
    ATMA = 34 => "ATMA",
    NAPTR = 35 => "NAPTR",
    KX = 36 => "KX",
    CERT = 37 => "CERT",
    A6 = 38 => "A6",
    DNAME = 39 => "DNAME",
    SINK = 40 => "SINK",
    OPT = 41 => "OPT",
    TSIG = 250 => "TSIG",
    IXFR = 251 => "IXFR",
    AXFR = 252 => "AXFR",
    MAILB = 253 => "MAILB",
    MAILA = 254 => "MAILA",
    ANY = 255 => "ANY",
}

impl QType {
    /// The named variant for this code, if there is one. Use before matching
    /// on variants, since `Unknown` may carry a well-known code.
    pub fn canonical(self) -> Self {
        QType::from_u16(self.to_u16())
    }

    /// Types whose content carries a preference value in `priority`.
    pub fn uses_priority(self) -> bool {
        matches!(
            self.canonical(),
            QType::MX | QType::SRV | QType::AFSDB | QType::KX | QType::RT
        )
    }
}

impl PartialEq for QType {
    fn eq(&self, other: &Self) -> bool {
        self.to_u16() == other.to_u16()
    }
}

impl Eq for QType {}

impl Hash for QType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_u16().hash(state);
    }
}

impl fmt::Display for QType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mnemonic() {
            Some(name) => f.write_str(name),
            None => write!(f, "TYPE{}", self.to_u16()),
        }
    }
}

impl FromStr for QType {
    type Err = DnsError;

    /// Accepts mnemonics in any case and the RFC 3597 `TYPEnnn` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(qtype) = QType::from_mnemonic(s) {
            return Ok(qtype);
        }
        let generic = s
            .get(..4)
            .filter(|prefix| prefix.eq_ignore_ascii_case("TYPE"))
            .map(|_| &s[4..])
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse::<u16>().ok());
        match generic {
            Some(code) => Ok(QType::from_u16(code)),
            None => Err(DnsError::parse(format!("unknown record type '{}'", s))),
        }
    }
}

/// Common DNS classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordClass {
    IN,
    CS,
    CH,
    HS,
    Unknown(u16),
}

impl RecordClass {
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => RecordClass::IN,
            2 => RecordClass::CS,
            3 => RecordClass::CH,
            4 => RecordClass::HS,
            other => RecordClass::Unknown(other),
        }
    }

    pub fn to_u16(self) -> u16 {
        match self {
            RecordClass::IN => 1,
            RecordClass::CS => 2,
            RecordClass::CH => 3,
            RecordClass::HS => 4,
            RecordClass::Unknown(code) => code,
        }
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordClass::IN => f.write_str("IN"),
            RecordClass::CS => f.write_str("CS"),
            RecordClass::CH => f.write_str("CH"),
            RecordClass::HS => f.write_str("HS"),
            RecordClass::Unknown(code) => write!(f, "CLASS{}", code),
        }
    }
}

impl FromStr for RecordClass {
    type Err = DnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IN" => Ok(RecordClass::IN),
            "CS" => Ok(RecordClass::CS),
            "CH" => Ok(RecordClass::CH),
            "HS" => Ok(RecordClass::HS),
            upper => upper
                .strip_prefix("CLASS")
                .filter(|code| !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|code| code.parse::<u16>().ok())
                .map(RecordClass::from_u16)
                .ok_or_else(|| DnsError::parse(format!("unknown record class '{}'", s))),
        }
    }
}

/// Response codes that fit in the 4-bit RCODE header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RCode {
    NoError = 0,
    FormErr = 1,
    ServFail = 2,
    NXDomain = 3,
    NotImp = 4,
    Refused = 5,
}

impl RCode {
    /// Values outside the defined set are for the message parser to reject.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(RCode::NoError),
            1 => Some(RCode::FormErr),
            2 => Some(RCode::ServFail),
            3 => Some(RCode::NXDomain),
            4 => Some(RCode::NotImp),
            5 => Some(RCode::Refused),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RCode::NoError => "NOERROR",
            RCode::FormErr => "FORMERR",
            RCode::ServFail => "SERVFAIL",
            RCode::NXDomain => "NXDOMAIN",
            RCode::NotImp => "NOTIMP",
            RCode::Refused => "REFUSED",
        }
    }
}

impl fmt::Display for RCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RCode {
    type Err = DnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NOERROR" => Ok(RCode::NoError),
            "FORMERR" => Ok(RCode::FormErr),
            "SERVFAIL" => Ok(RCode::ServFail),
            "NXDOMAIN" => Ok(RCode::NXDomain),
            "NOTIMP" => Ok(RCode::NotImp),
            "REFUSED" => Ok(RCode::Refused),
            _ => Err(DnsError::parse(format!("unknown rcode '{}'", s))),
        }
    }
}

/// Message opcodes. 3 is reserved by the protocol and has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Query = 0,
    IQuery = 1,
    Status = 2,
    Notify = 4,
    Update = 5,
}

impl Opcode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Opcode::Query),
            1 => Some(Opcode::IQuery),
            2 => Some(Opcode::Status),
            4 => Some(Opcode::Notify),
            5 => Some(Opcode::Update),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Opcode::Query => "QUERY",
            Opcode::IQuery => "IQUERY",
            Opcode::Status => "STATUS",
            Opcode::Notify => "NOTIFY",
            Opcode::Update => "UPDATE",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Opcode {
    type Err = DnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "QUERY" => Ok(Opcode::Query),
            "IQUERY" => Ok(Opcode::IQuery),
            "STATUS" => Ok(Opcode::Status),
            "NOTIFY" => Ok(Opcode::Notify),
            "UPDATE" => Ok(Opcode::Update),
            _ => Err(DnsError::parse(format!("unknown opcode '{}'", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_codes() {
        assert_eq!(QType::A.to_u16(), 1);
        assert_eq!(QType::NS.to_u16(), 2);
        assert_eq!(QType::SOA.to_u16(), 6);
        assert_eq!(QType::MX.to_u16(), 15);
        assert_eq!(QType::AAAA.to_u16(), 28);
        assert_eq!(QType::SRV.to_u16(), 33);
        assert_eq!(QType::AXFR.to_u16(), 252);
        assert_eq!(QType::ANY.to_u16(), 255);
        assert_eq!(QType::from_u16(0), QType::INVALID);
        assert_eq!(QType::from_u16(5), QType::CNAME);
    }

    #[test]
    fn test_unknown_qtype_passthrough() {
        let qtype = QType::from_u16(65280);
        assert_eq!(qtype, QType::Unknown(65280));
        assert_eq!(qtype.to_u16(), 65280);
        assert_eq!(qtype.to_string(), "TYPE65280");
        assert_eq!("TYPE65280".parse::<QType>().unwrap(), qtype);
    }

    #[test]
    fn test_generic_form_of_known_type() {
        assert_eq!("type1".parse::<QType>().unwrap(), QType::A);
    }

    #[test]
    fn test_qtype_names() {
        assert_eq!(QType::NSAP_PTR.to_string(), "NSAP-PTR");
        assert_eq!("aaaa".parse::<QType>().unwrap(), QType::AAAA);
        assert_eq!("nsap-ptr".parse::<QType>().unwrap(), QType::NSAP_PTR);
        assert!("BOGUS".parse::<QType>().is_err());
        assert!("TYPE70000".parse::<QType>().is_err());
        assert!("TYPE+1".parse::<QType>().is_err());
        assert!("TYPE".parse::<QType>().is_err());
        assert!("TYPE 1".parse::<QType>().is_err());
    }

    #[test]
    fn test_unknown_with_known_code_is_same_type() {
        use std::collections::HashSet;

        assert_eq!(QType::Unknown(1), QType::A);
        assert_eq!(QType::Unknown(15).canonical(), QType::MX);
        assert_eq!(QType::Unknown(15).to_string(), "MX");
        assert!(QType::Unknown(15).uses_priority());
        assert_ne!(QType::Unknown(2), QType::A);

        let set: HashSet<QType> = [QType::A, QType::Unknown(1)].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_record_class() {
        assert_eq!(RecordClass::from_u16(1), RecordClass::IN);
        assert_eq!(RecordClass::from_u16(254), RecordClass::Unknown(254));
        assert_eq!(RecordClass::Unknown(254).to_u16(), 254);
        assert_eq!("ch".parse::<RecordClass>().unwrap(), RecordClass::CH);
        assert_eq!("CLASS254".parse::<RecordClass>().unwrap(), RecordClass::Unknown(254));
        assert!("CLASS+1".parse::<RecordClass>().is_err());
        assert!("CLASS".parse::<RecordClass>().is_err());
    }

    #[test]
    fn test_opcode_reserved_gap() {
        assert_eq!(Opcode::from_u8(3), None);
        assert_eq!(Opcode::from_u8(4), Some(Opcode::Notify));
        assert_eq!(Opcode::Update.to_u8(), 5);
        assert_eq!("notify".parse::<Opcode>().unwrap(), Opcode::Notify);
    }

    #[test]
    fn test_rcode_values() {
        assert_eq!(RCode::NXDomain.to_u8(), 3);
        assert_eq!(RCode::from_u8(5), Some(RCode::Refused));
        assert_eq!(RCode::from_u8(6), None);
        assert_eq!(RCode::ServFail.to_string(), "SERVFAIL");
    }
}
