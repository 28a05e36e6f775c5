//! Byte decoder properties and scenarios

use memprobe::core::types::{ByteBuffer, ByteOrder, ProbeError};
use memprobe::decode;
use proptest::prelude::*;

#[test]
fn test_known_four_byte_scenario() {
    let buf = ByteBuffer::from(&[0xAC, 0x10, 0x43, 0xB9][..]);
    let decoded = decode::decode(&buf).unwrap();

    assert_eq!(decoded.be_value, Some(2886729657));
    assert_eq!(decoded.le_value, Some(3107890348));
    assert_eq!(decoded.hex_string(), "0xAC 0x10 0x43 0xB9");
}

#[test]
fn test_dump_lines_below_threshold() {
    let buf = ByteBuffer::from(&[0xAC, 0x10, 0x43, 0xB9][..]);
    let decoded = decode::decode(&buf).unwrap();
    let lines = decode::dump_lines(&decoded);

    assert_eq!(lines[0], "Big-endian Hex string: 0xAC 0x10 0x43 0xB9");
    assert_eq!(lines[2], "Big-endian Decimal:    2886729657");
    assert_eq!(lines[3], "Little-endian Decimal: 3107890348");
}

#[test]
fn test_dump_lines_above_threshold() {
    let buf = ByteBuffer::new((0u8..32).collect());
    let decoded = decode::decode(&buf).unwrap();
    let lines = decode::dump_lines(&decoded);

    // Only the column dumps; no integer interpretation of 32 bytes
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Big-endian Hex string:"));
}

#[test]
fn test_empty_input_is_no_data() {
    let buf = ByteBuffer::new(Vec::new());
    assert!(matches!(decode::decode(&buf), Err(ProbeError::NoData)));
}

#[test]
fn test_single_byte() {
    let buf = ByteBuffer::from(&[0x7F][..]);
    let decoded = decode::decode(&buf).unwrap();
    assert_eq!(decoded.be_value, Some(127));
    assert_eq!(decoded.le_value, Some(127));
}

proptest! {
    #[test]
    fn prop_big_endian_round_trip(bytes in proptest::collection::vec(any::<u8>(), 1..=8)) {
        let be = decode::be_value(&bytes);
        prop_assert_eq!(decode::to_bytes(be, bytes.len(), ByteOrder::Big), bytes);
    }

    #[test]
    fn prop_little_endian_round_trip(bytes in proptest::collection::vec(any::<u8>(), 1..=8)) {
        let le = decode::le_value(&bytes);
        prop_assert_eq!(decode::to_bytes(le, bytes.len(), ByteOrder::Little), bytes);
    }

    #[test]
    fn prop_big_endian_equals_reversed_little(bytes in proptest::collection::vec(any::<u8>(), 1..=8)) {
        let mut reversed = bytes.clone();
        reversed.reverse();
        prop_assert_eq!(decode::be_value(&bytes), decode::le_value(&reversed));
    }

    #[test]
    fn prop_decode_agrees_with_free_functions(bytes in proptest::collection::vec(any::<u8>(), 1..=8)) {
        let decoded = decode::decode(&ByteBuffer::new(bytes.clone())).unwrap();
        prop_assert_eq!(decoded.be_value, Some(decode::be_value(&bytes)));
        prop_assert_eq!(decoded.le_value, Some(decode::le_value(&bytes)));
    }
}
