//! Request encoding.

use crate::core::Mapping;
use crate::core::constants::{
    EXTERNAL_ADDRESS_REQUEST_SIZE, MAP_REQUEST_SIZE, NATPMP_VERSION, OPCODE_EXTERNAL_ADDRESS,
};

/// Encode a mapping request.
///
/// Wire format (12 bytes, big-endian):
/// ```text
/// +---------+--------+----------+--------------+-------------+----------+
/// | Version | Opcode | Reserved | Private port | Public port | Lifetime |
/// | 1 byte  | 1 byte | 2 bytes  | 2 bytes      | 2 bytes     | 4 bytes  |
/// +---------+--------+----------+--------------+-------------+----------+
/// ```
///
/// The requested public port is only sent when creating; a delete always
/// carries zero there. The mapping's lifetime is passed through unchanged.
pub fn encode_map_request(mapping: &Mapping, create: bool) -> [u8; MAP_REQUEST_SIZE] {
    let public_port = if create { mapping.public_port() } else { 0 };

    let mut buf = [0u8; MAP_REQUEST_SIZE];
    buf[0] = NATPMP_VERSION;
    buf[1] = mapping.protocol().opcode();
    // buf[2..4] reserved
    buf[4..6].copy_from_slice(&mapping.private_port().to_be_bytes());
    buf[6..8].copy_from_slice(&public_port.to_be_bytes());
    buf[8..12].copy_from_slice(&mapping.lifetime().to_be_bytes());
    buf
}

/// Encode an external address request.
pub fn encode_external_address_request() -> [u8; EXTERNAL_ADDRESS_REQUEST_SIZE] {
    [NATPMP_VERSION, OPCODE_EXTERNAL_ADDRESS]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MappingProtocol;

    #[test]
    fn test_encode_udp_create() {
        let mapping = Mapping::new(MappingProtocol::Udp, 1234, 3600).with_public_port(5678);
        let bytes = encode_map_request(&mapping, true);

        assert_eq!(bytes.as_slice(), hex::decode("0001000004d2162e00000e10").unwrap());
    }

    #[test]
    fn test_encode_tcp_create() {
        let mapping = Mapping::new(MappingProtocol::Tcp, 80, 60).with_public_port(8080);
        let bytes = encode_map_request(&mapping, true);

        assert_eq!(bytes[0], NATPMP_VERSION);
        assert_eq!(bytes[1], 2);
        assert_eq!(&bytes[2..4], &[0, 0]);
        assert_eq!(u16::from_be_bytes([bytes[4], bytes[5]]), 80);
        assert_eq!(u16::from_be_bytes([bytes[6], bytes[7]]), 8080);
        assert_eq!(u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]), 60);
    }

    #[test]
    fn test_encode_delete_zeroes_public_port() {
        let mapping = Mapping::new(MappingProtocol::Udp, 1234, 3600).with_public_port(5678);
        let bytes = encode_map_request(&mapping, false);

        assert_eq!(bytes.as_slice(), hex::decode("0001000004d2000000000e10").unwrap());
    }

    #[test]
    fn test_encode_external_address() {
        assert_eq!(encode_external_address_request(), [0, 0]);
    }
}
