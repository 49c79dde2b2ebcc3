use crate::details::icmp::AddressFamily;
use crate::Ttl;
use std::net::IpAddr;
use std::{io, time::Duration};

pub(crate) mod raw_socket;
pub(crate) use raw_socket::RawSocketFactory;

pub(crate) trait TSocket {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize>;
    fn set_read_timeout(&self, timeout: Duration) -> io::Result<()>;
    /// Receives one ICMP message (without IP header) into `buf`.
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)>;
}

/// Opens one fresh socket per probe. The socket is closed when the returned box is dropped.
pub(crate) trait TSocketFactory: Send + Sync {
    fn open(&self, family: AddressFamily, ttl: Ttl) -> io::Result<Box<dyn TSocket>>;
}
