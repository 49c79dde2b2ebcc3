use super::{quoted_echo, Echo, IcmpMessage, ECHO_HEADER_LEN};
use crate::details::icmp::sequence_number::SequenceNumber;
use pnet_packet::icmp::{
    echo_reply::EchoReplyPacket,
    echo_request::{EchoRequestPacket, MutableEchoRequestPacket},
    IcmpCode, IcmpPacket, IcmpType, IcmpTypes,
};
use pnet_packet::ipv4::Ipv4Packet;
use pnet_packet::Packet;

const ERROR_TYPES: [IcmpType; 5] = [
    IcmpTypes::DestinationUnreachable,
    IcmpTypes::SourceQuench,
    IcmpTypes::RedirectMessage,
    IcmpTypes::TimeExceeded,
    IcmpTypes::ParameterProblem,
];

pub(super) fn encode_echo_request(identifier: u16, sequence_number: SequenceNumber, payload: &[u8]) -> Option<Vec<u8>> {
    let buf = vec![0u8; EchoRequestPacket::minimum_packet_size() + payload.len()];
    let mut package = MutableEchoRequestPacket::owned(buf)?;
    package.set_icmp_type(IcmpTypes::EchoRequest);
    package.set_icmp_code(IcmpCode::new(0));
    package.set_identifier(identifier);
    package.set_sequence_number(sequence_number.into());
    package.set_payload(payload);

    package.set_checksum(0_u16);
    let checksum = pnet_packet::icmp::checksum(&IcmpPacket::new(package.packet())?);
    package.set_checksum(checksum);
    Some(package.packet().to_vec())
}

pub(super) fn decode(buf: &[u8]) -> Option<IcmpMessage> {
    let icmp_package = IcmpPacket::new(buf)?;
    let icmp_type = icmp_package.get_icmp_type();
    let icmp_code = icmp_package.get_icmp_code().0;
    if icmp_type == IcmpTypes::EchoReply {
        let package = EchoReplyPacket::new(buf)?;
        Some(IcmpMessage::EchoReply(Echo {
            identifier: package.get_identifier(),
            sequence_number: package.get_sequence_number().into(),
            payload: package.payload().to_vec(),
        }))
    } else if icmp_type == IcmpTypes::EchoRequest {
        let package = EchoRequestPacket::new(buf)?;
        Some(IcmpMessage::EchoRequest(Echo {
            identifier: package.get_identifier(),
            sequence_number: package.get_sequence_number().into(),
            payload: package.payload().to_vec(),
        }))
    } else if ERROR_TYPES.contains(&icmp_type) {
        // The error body quotes the offending IP header plus the first 8 bytes of its payload.
        let quoted = buf.get(ECHO_HEADER_LEN..).and_then(|quoted_ip| {
            let header_len = usize::from(Ipv4Packet::new(quoted_ip)?.get_header_length()) * 4;
            quoted_echo(quoted_ip.get(header_len..)?, IcmpTypes::EchoRequest.0)
        });
        Some(IcmpMessage::Error { icmp_type: icmp_type.0, icmp_code, quoted })
    } else {
        Some(IcmpMessage::Informational { icmp_type: icmp_type.0, icmp_code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::details::icmp::QuotedEcho;
    use pnet_packet::icmp::echo_reply::MutableEchoReplyPacket;

    // time exceeded quoting a 20 byte IPv4 header and the head of an echo request
    fn time_exceeded(quoted_type: u8) -> Vec<u8> {
        let mut bytes = vec![11u8, 0, 0, 0, 0, 0, 0, 0];
        bytes.extend_from_slice(&[0x45, 0, 0, 28, 0, 0, 0, 0, 1, 1, 0, 0, 127, 0, 0, 1, 127, 0, 0, 1]);
        bytes.extend_from_slice(&[quoted_type, 0, 0, 0, 0x12, 0x34, 0x00, 0x07]);
        bytes
    }

    #[test]
    fn echo_request_header() {
        let bytes = encode_echo_request(0xABCD, SequenceNumber::from(3), b"aaaaaaaa").unwrap();

        assert_eq!(16, bytes.len());
        assert_eq!(8, bytes[0]); // type
        assert_eq!(0, bytes[1]); // code
        assert_eq!([0xABu8, 0xCD], bytes[4..6]);
        assert_eq!([0x00u8, 0x03], bytes[6..8]);
        assert_eq!(b"aaaaaaaa", &bytes[8..]);
    }

    #[test]
    fn echo_request_checksum_verifies() {
        let bytes = encode_echo_request(1, SequenceNumber::from(1), b"abc").unwrap();
        let package = IcmpPacket::new(&bytes).unwrap();
        assert_eq!(package.get_checksum(), pnet_packet::icmp::checksum(&package));
    }

    #[test]
    fn decode_echo_reply() {
        let mut package = MutableEchoReplyPacket::owned(vec![0u8; 12]).unwrap();
        package.set_icmp_type(IcmpTypes::EchoReply);
        package.set_identifier(0x0102);
        package.set_sequence_number(9);
        package.set_payload(b"aaaa");

        let message = decode(package.packet()).unwrap();

        assert_eq!(
            IcmpMessage::EchoReply(Echo {
                identifier: 0x0102,
                sequence_number: SequenceNumber::from(9),
                payload: b"aaaa".to_vec()
            }),
            message
        );
    }

    #[test]
    fn decode_time_exceeded_with_quoted_echo() {
        assert_eq!(
            Some(IcmpMessage::Error {
                icmp_type: 11,
                icmp_code: 0,
                quoted: Some(QuotedEcho { identifier: 0x1234, sequence_number: SequenceNumber::from(7) }),
            }),
            decode(&time_exceeded(8))
        );
    }

    #[test]
    fn decode_time_exceeded_quoting_something_else() {
        // quoted datagram is an echo reply, not one of our requests
        assert_eq!(Some(IcmpMessage::Error { icmp_type: 11, icmp_code: 0, quoted: None }), decode(&time_exceeded(0)));
    }

    #[test]
    fn decode_truncated_time_exceeded() {
        let bytes = [11u8, 0, 0, 0, 0, 0, 0, 0, 0x45, 0, 0, 28];
        assert_eq!(Some(IcmpMessage::Error { icmp_type: 11, icmp_code: 0, quoted: None }), decode(&bytes));
    }

    #[test]
    fn decode_timestamp_as_informational() {
        let bytes = [13u8, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(Some(IcmpMessage::Informational { icmp_type: 13, icmp_code: 0 }), decode(&bytes));
    }

    #[test]
    fn decode_truncated_echo_reply_fails() {
        assert_eq!(None, decode(&[0u8, 0, 0, 0, 0]));
    }
}
