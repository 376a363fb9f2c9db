//! Department-scoped IP range lists.
//!
//! A department may restrict which addresses its devices can use with a
//! comma-separated list such as `10.1.2.10-10.1.2.40, 10.1.3.7, 10.1.4`.
//! Each entry is one of:
//!
//! * `start-end` - inclusive numeric range of two full dotted quads
//! * `a.b.c.d` - a single address
//! * `a.b.c` (or `a.b.c.`) - every address under that octet-aligned prefix
//!
//! Membership is tested on the 32-bit big-endian value of the address.

use std::fmt;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IpRangeError {
    #[error("invalid IPv4 address: {0}")]
    InvalidAddress(String),

    #[error("invalid range entry: {0}")]
    InvalidEntry(String),

    #[error("range start {start} is after range end {end}")]
    Inverted { start: String, end: String },
}

/// Convert a dotted quad to its 32-bit value (`a << 24 | b << 16 | c << 8 | d`).
pub fn ipv4_to_u32(ip: &str) -> Result<u32, IpRangeError> {
    let addr = Ipv4Addr::from_str(ip.trim())
        .map_err(|_| IpRangeError::InvalidAddress(ip.trim().to_string()))?;
    Ok(u32::from(addr))
}

pub fn u32_to_ipv4(value: u32) -> String {
    Ipv4Addr::from(value).to_string()
}

/// One entry of a range list, normalized to an inclusive integer span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpRange {
    Single(u32),
    Span { start: u32, end: u32 },
    Prefix { octets: Vec<u8> },
}

impl IpRange {
    pub fn bounds(&self) -> RangeInclusive<u32> {
        match self {
            IpRange::Single(ip) => *ip..=*ip,
            IpRange::Span { start, end } => *start..=*end,
            IpRange::Prefix { octets } => {
                let mut low: u32 = 0;
                for (i, octet) in octets.iter().enumerate() {
                    low |= (*octet as u32) << (24 - 8 * i as u32);
                }
                let host_bits = 32 - 8 * octets.len() as u32;
                let high = if host_bits == 32 {
                    u32::MAX
                } else {
                    low | ((1u32 << host_bits) - 1)
                };
                low..=high
            }
        }
    }

    pub fn contains(&self, ip: u32) -> bool {
        self.bounds().contains(&ip)
    }

    fn parse_prefix(entry: &str) -> Result<Self, IpRangeError> {
        let trimmed = entry.trim_end_matches('.');
        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(IpRangeError::InvalidEntry(entry.to_string()));
        }
        let octets = parts
            .iter()
            .map(|p| p.trim().parse::<u8>())
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|_| IpRangeError::InvalidEntry(entry.to_string()))?;
        Ok(IpRange::Prefix { octets })
    }
}

impl FromStr for IpRange {
    type Err = IpRangeError;

    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(IpRangeError::InvalidEntry(entry.to_string()));
        }

        if let Some((start, end)) = entry.split_once('-') {
            let start_value = ipv4_to_u32(start)?;
            let end_value = ipv4_to_u32(end)?;
            if start_value > end_value {
                return Err(IpRangeError::Inverted {
                    start: start.trim().to_string(),
                    end: end.trim().to_string(),
                });
            }
            return Ok(IpRange::Span { start: start_value, end: end_value });
        }

        match ipv4_to_u32(entry) {
            Ok(ip) => Ok(IpRange::Single(ip)),
            Err(_) => Self::parse_prefix(entry),
        }
    }
}

impl fmt::Display for IpRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpRange::Single(ip) => write!(f, "{}", u32_to_ipv4(*ip)),
            IpRange::Span { start, end } => write!(f, "{}-{}", u32_to_ipv4(*start), u32_to_ipv4(*end)),
            IpRange::Prefix { octets } => {
                let parts: Vec<String> = octets.iter().map(|o| o.to_string()).collect();
                write!(f, "{}.*", parts.join("."))
            }
        }
    }
}

/// Parsed form of a department's `special_ip_ranges` column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpRangeSet {
    ranges: Vec<IpRange>,
}

impl IpRangeSet {
    /// Parse a comma-separated list. Blank entries are skipped.
    pub fn parse(list: &str) -> Result<Self, IpRangeError> {
        let ranges = list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(IpRange::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[IpRange] {
        &self.ranges
    }

    pub fn contains_u32(&self, ip: u32) -> bool {
        self.ranges.iter().any(|range| range.contains(ip))
    }

    /// Malformed candidates are never members.
    pub fn contains(&self, ip: &str) -> bool {
        ipv4_to_u32(ip).map(|value| self.contains_u32(value)).unwrap_or(false)
    }

    /// Upper bound on how many addresses `expand` yields, computed without expanding
    pub fn span_len(&self) -> u64 {
        self.ranges
            .iter()
            .map(|range| {
                let bounds = range.bounds();
                *bounds.end() as u64 - *bounds.start() as u64 + 1
            })
            .sum()
    }

    /// Every address covered by the set, in ascending order, for pool provisioning.
    ///
    /// Prefix entries skip every address ending in `.0` or `.255`.
    pub fn expand(&self) -> Vec<u32> {
        let mut out = Vec::new();
        for range in &self.ranges {
            let bounds = range.bounds();
            let skip_edges = matches!(range, IpRange::Prefix { .. });
            for ip in bounds {
                if skip_edges && (ip & 0xff == 0 || ip & 0xff == 0xff) {
                    continue;
                }
                out.push(ip);
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }
}

impl fmt::Display for IpRangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ranges.iter().map(|r| r.to_string()).collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl FromStr for IpRangeSet {
    type Err = IpRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
