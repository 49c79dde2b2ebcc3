use crate::details::icmp::sequence_number::SequenceNumber;
use crate::PingError;
use std::net::IpAddr;

pub(crate) mod sequence_number;
mod v4;
mod v6;

pub(crate) const PROTOCOL_ICMP: u8 = 1;
pub(crate) const PROTOCOL_ICMPV6: u8 = 58;

/// Address family of a probe session, fixed once the target is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    pub fn of(ip_addr: IpAddr) -> AddressFamily {
        match ip_addr {
            IpAddr::V4(_) => AddressFamily::V4,
            IpAddr::V6(_) => AddressFamily::V6,
        }
    }

    /// IANA protocol number used for the raw socket.
    pub fn protocol_number(self) -> u8 {
        match self {
            AddressFamily::V4 => PROTOCOL_ICMP,
            AddressFamily::V6 => PROTOCOL_ICMPV6,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Echo {
    pub identifier: u16,
    pub sequence_number: SequenceNumber,
    pub payload: Vec<u8>,
}

/// Identifier and sequence number of the echo request quoted by an ICMP error message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct QuotedEcho {
    pub identifier: u16,
    pub sequence_number: SequenceNumber,
}

/// A decoded ICMP message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum IcmpMessage {
    EchoRequest(Echo),
    EchoReply(Echo),
    /// Error message (destination unreachable, time exceeded, ...). `quoted` is `None` when the
    /// offending datagram is not an echo request or is cut short.
    Error { icmp_type: u8, icmp_code: u8, quoted: Option<QuotedEcho> },
    /// Any other informational message, e.g. ICMPv6 neighbor discovery.
    Informational { icmp_type: u8, icmp_code: u8 },
}

// type, code, checksum, identifier, sequence number
const ECHO_HEADER_LEN: usize = 8;

/// Reads identifier and sequence number from the start of a quoted echo request.
fn quoted_echo(quoted_icmp: &[u8], echo_request_type: u8) -> Option<QuotedEcho> {
    if quoted_icmp.len() < ECHO_HEADER_LEN || quoted_icmp[0] != echo_request_type {
        return None;
    }
    Some(QuotedEcho {
        identifier: u16::from_be_bytes([quoted_icmp[4], quoted_icmp[5]]),
        sequence_number: u16::from_be_bytes([quoted_icmp[6], quoted_icmp[7]]).into(),
    })
}

pub(crate) fn encode_echo_request(
    family: AddressFamily,
    identifier: u16,
    sequence_number: SequenceNumber,
    payload: &[u8],
) -> Result<Vec<u8>, PingError> {
    let encoded = match family {
        AddressFamily::V4 => v4::encode_echo_request(identifier, sequence_number, payload),
        AddressFamily::V6 => v6::encode_echo_request(identifier, sequence_number, payload),
    };
    encoded.ok_or_else(|| PingError::Encode(format!("echo request with {} payload bytes", payload.len())))
}

/// Decodes an ICMP message without any IP header in front of it.
pub(crate) fn decode(family: AddressFamily, buf: &[u8]) -> Result<IcmpMessage, PingError> {
    let decoded = match family {
        AddressFamily::V4 => v4::decode(buf),
        AddressFamily::V6 => v6::decode(buf),
    };
    decoded.ok_or_else(|| PingError::Decode(format!("{} bytes are not a valid {family:?} ICMP message", buf.len())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn address_family_of_ip() {
        assert_eq!(AddressFamily::V4, AddressFamily::of(IpAddr::V4(Ipv4Addr::LOCALHOST)));
        assert_eq!(AddressFamily::V6, AddressFamily::of(IpAddr::V6(Ipv6Addr::LOCALHOST)));
    }

    #[test]
    fn protocol_numbers() {
        assert_eq!(1, AddressFamily::V4.protocol_number());
        assert_eq!(58, AddressFamily::V6.protocol_number());
    }

    #[test]
    fn decode_garbage_is_an_error() {
        let result = decode(AddressFamily::V4, &[0x00, 0x00]);
        assert!(matches!(result, Err(PingError::Decode(_))));

        let result = decode(AddressFamily::V6, &[]);
        assert!(matches!(result, Err(PingError::Decode(_))));
    }

    #[test]
    fn encoded_request_decodes_as_request() {
        for family in [AddressFamily::V4, AddressFamily::V6] {
            let bytes = encode_echo_request(family, 0x1234, SequenceNumber::from(7), b"aaaa").unwrap();
            let message = decode(family, &bytes).unwrap();
            assert_eq!(
                IcmpMessage::EchoRequest(Echo {
                    identifier: 0x1234,
                    sequence_number: SequenceNumber::from(7),
                    payload: b"aaaa".to_vec(),
                }),
                message
            );
        }
    }
}
