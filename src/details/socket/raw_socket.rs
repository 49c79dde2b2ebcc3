use super::{TSocket, TSocketFactory};
use crate::details::icmp::AddressFamily;
use crate::Ttl;
use pnet_packet::ipv4::Ipv4Packet;
use socket2::{Domain, Protocol, Type};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::{io, time::Duration};

pub(crate) struct RawSocketFactory;

impl TSocketFactory for RawSocketFactory {
    fn open(&self, family: AddressFamily, ttl: Ttl) -> io::Result<Box<dyn TSocket>> {
        Ok(Box::new(RawSocket::new(family, ttl)?))
    }
}

pub(crate) struct RawSocket {
    socket: socket2::Socket,
    family: AddressFamily,
}

impl RawSocket {
    pub(crate) fn new(family: AddressFamily, ttl: Ttl) -> Result<Self, io::Error> {
        tracing::trace!("creating raw {:?} socket with ttl {}", family, ttl);
        let (domain, protocol, wildcard) = match family {
            AddressFamily::V4 => (Domain::IPV4, Protocol::ICMPV4, SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))),
            AddressFamily::V6 => (Domain::IPV6, Protocol::ICMPV6, SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))),
        };
        let socket = socket2::Socket::new(domain, Type::RAW, Some(protocol))?;
        socket.bind(&wildcard.into())?;
        match family {
            AddressFamily::V4 => socket.set_ttl(ttl.into())?,
            AddressFamily::V6 => socket.set_unicast_hops_v6(ttl.into())?,
        }
        Ok(RawSocket { socket, family })
    }
}

impl TSocket for RawSocket {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize> {
        self.socket.send_to(buf, addr)
    }

    fn set_read_timeout(&self, timeout: Duration) -> io::Result<()> {
        self.socket.set_read_timeout(Some(timeout))
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)> {
        // Socket2 gives a safety guaranty which allows us to do an unsafe cast from `&mut [u8]`
        // to `&mut [std::mem::MaybeUninit<u8>]`: it never writes uninitialized bytes into it.
        // https://docs.rs/socket2/0.4.7/socket2/struct.Socket.html#method.recv
        let (n_bytes, socket_addr) = self.socket.recv_from(unsafe {
            &mut *(std::ptr::addr_of_mut!(*buf) as *mut [std::mem::MaybeUninit<u8>])
        })?;
        let ip_addr = socket_addr
            .as_socket()
            .map(|addr| addr.ip())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "received from a non-IP address"))?;

        match self.family {
            // On a raw IPv4 socket we get the IP packet, return only the ICMP content.
            AddressFamily::V4 => {
                let header_len = Ipv4Packet::new(&buf[..n_bytes])
                    .map(|ipv4_package| usize::from(ipv4_package.get_header_length()) * 4)
                    .filter(|header_len| *header_len <= n_bytes)
                    .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "truncated IPv4 header"))?;
                buf.copy_within(header_len..n_bytes, 0);
                Ok((n_bytes - header_len, ip_addr))
            }
            AddressFamily::V6 => Ok((n_bytes, ip_addr)),
        }
    }
}
