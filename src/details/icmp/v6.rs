use super::{quoted_echo, Echo, IcmpMessage};
use crate::details::icmp::sequence_number::SequenceNumber;
use pnet_packet::icmpv6::{Icmpv6Code, Icmpv6Packet, Icmpv6Types, MutableIcmpv6Packet};
use pnet_packet::Packet;

// identifier + sequence number in front of the echo data
const ECHO_HEADER_LEN: usize = 4;
// unused (or MTU / pointer) field in front of the quoted datagram of an error message
const ERROR_HEADER_LEN: usize = 4;
const IPV6_HEADER_LEN: usize = 40;
const NEXT_HEADER_ICMPV6: u8 = 58;
// Types below 128 are error messages, the rest informational.
const FIRST_INFORMATIONAL_TYPE: u8 = 128;

pub(super) fn encode_echo_request(identifier: u16, sequence_number: SequenceNumber, payload: &[u8]) -> Option<Vec<u8>> {
    let mut body = Vec::with_capacity(ECHO_HEADER_LEN + payload.len());
    body.extend_from_slice(&identifier.to_be_bytes());
    body.extend_from_slice(&u16::from(sequence_number).to_be_bytes());
    body.extend_from_slice(payload);

    let buf = vec![0u8; Icmpv6Packet::minimum_packet_size() + body.len()];
    let mut package = MutableIcmpv6Packet::owned(buf)?;
    package.set_icmpv6_type(Icmpv6Types::EchoRequest);
    package.set_icmpv6_code(Icmpv6Code::new(0));
    package.set_payload(&body);
    // The checksum covers a pseudo-header with the source address; the kernel fills it in.
    package.set_checksum(0_u16);
    Some(package.packet().to_vec())
}

pub(super) fn decode(buf: &[u8]) -> Option<IcmpMessage> {
    let package = Icmpv6Packet::new(buf)?;
    let icmp_type = package.get_icmpv6_type();
    let icmp_code = package.get_icmpv6_code().0;
    if icmp_type == Icmpv6Types::EchoReply {
        decode_echo(package.payload()).map(IcmpMessage::EchoReply)
    } else if icmp_type == Icmpv6Types::EchoRequest {
        decode_echo(package.payload()).map(IcmpMessage::EchoRequest)
    } else if icmp_type.0 < FIRST_INFORMATIONAL_TYPE {
        let quoted = package
            .payload()
            .get(ERROR_HEADER_LEN..)
            .filter(|quoted_ip| quoted_ip.len() >= IPV6_HEADER_LEN && quoted_ip[6] == NEXT_HEADER_ICMPV6)
            .and_then(|quoted_ip| quoted_echo(&quoted_ip[IPV6_HEADER_LEN..], Icmpv6Types::EchoRequest.0));
        Some(IcmpMessage::Error { icmp_type: icmp_type.0, icmp_code, quoted })
    } else {
        Some(IcmpMessage::Informational { icmp_type: icmp_type.0, icmp_code })
    }
}

fn decode_echo(body: &[u8]) -> Option<Echo> {
    if body.len() < ECHO_HEADER_LEN {
        return None;
    }
    Some(Echo {
        identifier: u16::from_be_bytes([body[0], body[1]]),
        sequence_number: u16::from_be_bytes([body[2], body[3]]).into(),
        payload: body[ECHO_HEADER_LEN..].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::details::icmp::QuotedEcho;

    fn hop_limit_exceeded(next_header: u8) -> Vec<u8> {
        let mut bytes = vec![3u8, 0, 0, 0, 0, 0, 0, 0];
        let mut ipv6_header = [0u8; IPV6_HEADER_LEN];
        ipv6_header[0] = 0x60;
        ipv6_header[6] = next_header;
        bytes.extend_from_slice(&ipv6_header);
        bytes.extend_from_slice(&[128, 0, 0, 0, 0x00, 0x2A, 0x00, 0x05]);
        bytes
    }

    #[test]
    fn echo_request_header() {
        let bytes = encode_echo_request(0xABCD, SequenceNumber::from(0x0102), b"aa").unwrap();

        assert_eq!(10, bytes.len());
        assert_eq!(128, bytes[0]);
        assert_eq!(0, bytes[1]);
        assert_eq!([0u8, 0], bytes[2..4]);
        assert_eq!([0xABu8, 0xCD, 0x01, 0x02], bytes[4..8]);
        assert_eq!(b"aa", &bytes[8..]);
    }

    #[test]
    fn decode_echo_reply() {
        let bytes = [129u8, 0, 0x12, 0x34, 0x00, 0x2A, 0x00, 0x05, b'a', b'b'];

        let message = decode(&bytes).unwrap();

        assert_eq!(
            IcmpMessage::EchoReply(Echo {
                identifier: 42,
                sequence_number: SequenceNumber::from(5),
                payload: b"ab".to_vec()
            }),
            message
        );
    }

    #[test]
    fn decode_echo_reply_without_identifier_fails() {
        assert_eq!(None, decode(&[129u8, 0, 0, 0, 0x00]));
    }

    #[test]
    fn decode_hop_limit_exceeded_with_quoted_echo() {
        assert_eq!(
            Some(IcmpMessage::Error {
                icmp_type: 3,
                icmp_code: 0,
                quoted: Some(QuotedEcho { identifier: 42, sequence_number: SequenceNumber::from(5) }),
            }),
            decode(&hop_limit_exceeded(NEXT_HEADER_ICMPV6))
        );
    }

    #[test]
    fn decode_hop_limit_exceeded_behind_extension_header() {
        // hop-by-hop options in front of the quoted ICMPv6 header are not followed
        assert_eq!(Some(IcmpMessage::Error { icmp_type: 3, icmp_code: 0, quoted: None }), decode(&hop_limit_exceeded(0)));
    }

    #[test]
    fn decode_neighbor_discovery_as_informational() {
        // neighbor advertisement for fe80::1
        let mut bytes = vec![136u8, 0, 0, 0, 0x60, 0, 0, 0, 0xfe, 0x80];
        bytes.extend_from_slice(&[0u8; 13]);
        bytes.push(1);
        assert_eq!(Some(IcmpMessage::Informational { icmp_type: 136, icmp_code: 0 }), decode(&bytes));

        for icmp_type in [130u8, 133, 134, 135, 143] {
            let bytes = [icmp_type, 0, 0, 0, 0, 0, 0, 0];
            assert!(matches!(decode(&bytes), Some(IcmpMessage::Informational { .. })));
        }
    }
}
