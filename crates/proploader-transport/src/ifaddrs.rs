use std::net::Ipv4Addr;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::InterfaceAddr;

/// Directed broadcast address for `addr` under `netmask`.
pub fn broadcast_address(addr: Ipv4Addr, netmask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(addr) | !u32::from(netmask))
}

/// Enumerate up to `max` interfaces that are up, not loopback, broadcast
/// capable and carry an IPv4 address.
#[cfg(unix)]
pub fn interface_addresses(max: usize) -> Result<Vec<InterfaceAddr>> {
    let mut head: *mut libc::ifaddrs = std::ptr::null_mut();

    // SAFETY: `head` is a valid writable pointer; on success the list it
    // receives is released with `freeifaddrs` below and not used afterwards.
    let rc = unsafe { libc::getifaddrs(&mut head) };
    if rc != 0 {
        return Err(TransportError::Interfaces(std::io::Error::last_os_error()));
    }

    let mut out = Vec::new();
    let mut cursor = head;
    while !cursor.is_null() && out.len() < max {
        // SAFETY: `cursor` is a non-null node of the list returned by
        // `getifaddrs`, which stays valid until `freeifaddrs`.
        let entry = unsafe { &*cursor };
        cursor = entry.ifa_next;

        let flags = entry.ifa_flags;
        let wanted = flags & (libc::IFF_UP as libc::c_uint) != 0
            && flags & (libc::IFF_BROADCAST as libc::c_uint) != 0
            && flags & (libc::IFF_LOOPBACK as libc::c_uint) == 0;
        if !wanted {
            continue;
        }

        // SAFETY: both pointers come from the same live `ifaddrs` node.
        let (addr, netmask) = unsafe {
            (
                ipv4_from_sockaddr(entry.ifa_addr),
                ipv4_from_sockaddr(entry.ifa_netmask),
            )
        };
        if let (Some(addr), Some(netmask)) = (addr, netmask) {
            let broadcast = broadcast_address(addr, netmask);
            debug!(%addr, %broadcast, "found interface");
            out.push(InterfaceAddr { addr, broadcast });
        }
    }

    // SAFETY: `head` was produced by a successful `getifaddrs` call.
    unsafe { libc::freeifaddrs(head) };

    Ok(out)
}

#[cfg(not(unix))]
pub fn interface_addresses(max: usize) -> Result<Vec<InterfaceAddr>> {
    let _ = max;
    Err(TransportError::Interfaces(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "interface enumeration requires getifaddrs",
    )))
}

/// # Safety
///
/// `sa` must be null or point to a valid `sockaddr` whose storage is at least
/// `sockaddr_in` sized when its family is `AF_INET`.
#[cfg(unix)]
unsafe fn ipv4_from_sockaddr(sa: *const libc::sockaddr) -> Option<Ipv4Addr> {
    if sa.is_null() || (*sa).sa_family as libc::c_int != libc::AF_INET {
        return None;
    }
    let sin = &*(sa as *const libc::sockaddr_in);
    Some(Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr)))
}
