//! IPv4 address block and range utilities.
//!
//! Provides [`Ipv4`] for CIDR blocks and [`summarize_range`] / [`expand_range`]
//! for turning an inclusive `start..=end` allocation pool into blocks and
//! individual addresses.

use std::error::Error;
use std::net::Ipv4Addr;

/// Maximum length for an IPv4 subnet mask (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use chi_network_ops::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32, Box<dyn Error>> {
    if len > MAX_LENGTH {
        Err("Network length is too long".into())
    } else {
        let right_len = MAX_LENGTH - len;
        let all_bits = u32::MAX as u64;

        let mask = (all_bits >> right_len) << right_len;

        Ok(mask as u32)
    }
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, Box<dyn Error>> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from(u32::from(addr) & mask))
}

/// Get the broadcast (highest) address for a given IP and prefix length.
pub fn broadcast_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, Box<dyn Error>> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from((u32::from(addr) & mask) | !mask))
}

/// Smallest prefix length a block starting at `ip` can have, based on trailing zeros.
///
/// `0.0.0.0` aligns to every boundary and yields 0.
pub fn lo_mask(ip: Ipv4Addr) -> u8 {
    let trailing_zeros = u32::from(ip).trailing_zeros() as u8;
    MAX_LENGTH - trailing_zeros
}

/// Split the inclusive range `start..=end` into the minimal list of CIDR blocks.
///
/// Blocks are returned in ascending order and cover the range exactly.
pub fn summarize_range(start: Ipv4Addr, end: Ipv4Addr) -> Result<Vec<Ipv4>, Box<dyn Error>> {
    if start > end {
        return Err(format!("Range start {start} is after range end {end}").into());
    }

    let last = u32::from(end) as u64;
    let mut first = u32::from(start) as u64;
    let mut blocks = Vec::new();

    while first <= last {
        let align_bits = MAX_LENGTH - lo_mask(Ipv4Addr::from(first as u32));
        let span = last - first + 1;
        // floor(log2(span)), span is at most 2^32
        let fit_bits = (63 - span.leading_zeros()) as u8;
        let host_bits = align_bits.min(fit_bits);

        blocks.push(Ipv4 {
            addr: Ipv4Addr::from(first as u32),
            mask: MAX_LENGTH - host_bits,
        });
        first += 1u64 << host_bits;
    }

    Ok(blocks)
}

/// Every address in the inclusive range `start..=end`, ascending.
pub fn expand_range(start: Ipv4Addr, end: Ipv4Addr) -> Result<Vec<Ipv4Addr>, Box<dyn Error>> {
    Ok(summarize_range(start, end)?
        .iter()
        .flat_map(Ipv4::addresses)
        .collect())
}

/// IPv4 block in CIDR notation.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    /// The IPv4 address.
    pub addr: Ipv4Addr,
    /// The subnet mask length (0-32).
    pub mask: u8,
}

impl Ipv4 {
    /// Create a new [`Ipv4`] from a CIDR string (e.g., "10.0.0.0/24").
    pub fn new(addr_cidr: &str) -> Result<Ipv4, Box<dyn Error>> {
        let (addr, mask) = addr_cidr
            .trim()
            .split_once('/')
            .ok_or("Invalid address/mask")?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| format!("Invalid address {addr}"))?;
        let mask: u8 = mask.parse()?;
        if mask > MAX_LENGTH {
            return Err("Network length is too long".into());
        }
        Ok(Ipv4 { addr, mask })
    }

    /// Lowest (network) address in the block.
    pub fn lo(&self) -> Ipv4Addr {
        cut_addr(self.addr, self.mask).unwrap_or(self.addr)
    }

    /// Highest (broadcast) address in the block.
    pub fn hi(&self) -> Ipv4Addr {
        broadcast_addr(self.addr, self.mask).unwrap_or(self.addr)
    }

    /// Number of addresses in the block, network and broadcast included.
    pub fn size(&self) -> u64 {
        1u64 << (MAX_LENGTH - self.mask.min(MAX_LENGTH))
    }

    /// Iterate every address in the block, network and broadcast included.
    pub fn addresses(&self) -> impl Iterator<Item = Ipv4Addr> {
        (u32::from(self.lo())..=u32::from(self.hi())).map(Ipv4Addr::from)
    }
}

impl std::fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_cidr_mask() {
        assert_eq!(get_cidr_mask(0).unwrap(), 0x00000000);
        assert_eq!(get_cidr_mask(8).unwrap(), 0xFF000000);
        assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
        assert_eq!(get_cidr_mask(32).unwrap(), 0xFFFFFFFF);
        assert!(get_cidr_mask(33).is_err());
    }

    #[test]
    fn test_broadcast_and_cut_addr() {
        let ip = Ipv4Addr::new(192, 168, 1, 42);
        assert_eq!(cut_addr(ip, 24).unwrap(), Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(
            broadcast_addr(ip, 24).unwrap(),
            Ipv4Addr::new(192, 168, 1, 255)
        );
        assert_eq!(broadcast_addr(ip, 32).unwrap(), ip);
        assert!(cut_addr(ip, 33).is_err());
    }

    #[test]
    fn test_lo_mask() {
        assert_eq!(lo_mask(Ipv4Addr::new(192, 168, 1, 1)), 32);
        assert_eq!(lo_mask(Ipv4Addr::new(10, 0, 0, 0)), 8);
        assert_eq!(lo_mask(Ipv4Addr::new(0, 0, 0, 0)), 0);
    }

    #[test]
    fn test_summarize_range_unaligned() {
        let blocks = summarize_range(
            Ipv4Addr::new(192, 0, 2, 2),
            Ipv4Addr::new(192, 0, 2, 20),
        )
        .unwrap();
        let cidrs: Vec<String> = blocks.iter().map(|b| b.to_string()).collect();
        assert_eq!(
            cidrs,
            vec![
                "192.0.2.2/31",
                "192.0.2.4/30",
                "192.0.2.8/29",
                "192.0.2.16/30",
                "192.0.2.20/32",
            ]
        );
        assert_eq!(blocks.iter().map(Ipv4::size).sum::<u64>(), 19);
    }

    #[test]
    fn test_summarize_range_single_and_full() {
        let one = Ipv4Addr::new(10, 1, 1, 1);
        assert_eq!(
            summarize_range(one, one).unwrap(),
            vec![Ipv4::new("10.1.1.1/32").unwrap()]
        );
        assert_eq!(
            summarize_range(Ipv4Addr::new(0, 0, 0, 0), Ipv4Addr::new(255, 255, 255, 255))
                .unwrap(),
            vec![Ipv4::new("0.0.0.0/0").unwrap()]
        );
        assert!(summarize_range(Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 0, 4)).is_err());
    }

    #[test]
    fn test_expand_range_inclusive() {
        let ips = expand_range(Ipv4Addr::new(10, 0, 0, 2), Ipv4Addr::new(10, 0, 0, 4)).unwrap();
        assert_eq!(
            ips,
            vec![
                Ipv4Addr::new(10, 0, 0, 2),
                Ipv4Addr::new(10, 0, 0, 3),
                Ipv4Addr::new(10, 0, 0, 4),
            ]
        );
    }

    #[test]
    fn test_expand_range_top_of_space() {
        let ips = expand_range(
            Ipv4Addr::new(255, 255, 255, 254),
            Ipv4Addr::new(255, 255, 255, 255),
        )
        .unwrap();
        assert_eq!(ips.len(), 2);
        assert_eq!(ips[1], Ipv4Addr::BROADCAST);
    }

    #[test]
    fn test_ipv4_new_and_cmp() {
        let ip1 = Ipv4::new("10.0.0.1/24").unwrap();
        let ip2 = Ipv4::new(" 10.0.0.2/24 ").unwrap();
        assert!(ip1 < ip2);
        assert_eq!(ip1.lo(), Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(ip1.hi(), Ipv4Addr::new(10, 0, 0, 255));
        assert!(Ipv4::new("10.0.0.0").is_err());
        assert!(Ipv4::new("10.0.0.0/33").is_err());
    }
}
