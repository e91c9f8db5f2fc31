//! Codec tests: type tags, names and the write/read round trip.

use proptest::prelude::*;
use reg_access::*;

#[test]
fn test_value_type_names() {
    assert_eq!(ValueType::None.name(), "REG_NONE");
    assert_eq!(ValueType::String.name(), "REG_SZ");
    assert_eq!(ValueType::ExpandString.name(), "REG_EXPAND_SZ");
    assert_eq!(ValueType::Binary.name(), "REG_BINARY");
    assert_eq!(ValueType::Dword.name(), "REG_DWORD");
    assert_eq!(ValueType::DwordBigEndian.name(), "REG_DWORD_BIG_ENDIAN");
    assert_eq!(ValueType::Link.name(), "REG_LINK");
    assert_eq!(ValueType::MultiString.name(), "REG_MULTI_SZ");
    assert_eq!(ValueType::Qword.name(), "REG_QWORD");
}

#[test]
fn test_value_type_from_u32() {
    assert_eq!(ValueType::from_u32(0), ValueType::None);
    assert_eq!(ValueType::from_u32(1), ValueType::String);
    assert_eq!(ValueType::from_u32(2), ValueType::ExpandString);
    assert_eq!(ValueType::from_u32(3), ValueType::Binary);
    assert_eq!(ValueType::from_u32(4), ValueType::Dword);
    assert_eq!(ValueType::from_u32(7), ValueType::MultiString);
    assert_eq!(ValueType::from_u32(11), ValueType::Qword);
    assert!(matches!(ValueType::from_u32(999), ValueType::Unknown(999)));
}

#[test]
fn test_decode_never_coerces() {
    // Four bytes of UTF-16 text stored as REG_DWORD stay a DWORD.
    let raw = RawValue::new(ValueType::Dword, vec![b'1', 0, 0, 0]);
    assert_eq!(decode(&raw).unwrap(), ValueData::Dword(0x31));

    // A DWORD-sized blob stored as REG_BINARY stays binary.
    let raw = RawValue::new(ValueType::Binary, vec![1, 0, 0, 0]);
    assert_eq!(decode(&raw).unwrap().value_type(), ValueType::Binary);
}

#[test]
fn test_malformed_values_are_reported() {
    let cases = [
        RawValue::new(ValueType::Dword, vec![1, 2]),
        RawValue::new(ValueType::String, vec![b'a', 0, b'b']),
        RawValue::new(ValueType::ExpandString, vec![0x00, 0xDC]),
        RawValue::new(ValueType::MultiString, vec![0]),
        RawValue::new(ValueType::Qword, vec![0; 7]),
    ];
    for raw in cases {
        let err = decode(&raw).unwrap_err();
        assert!(
            matches!(err, RegistryError::MalformedValue { value_type, .. } if value_type == raw.value_type),
            "unexpected error for {:?}: {}",
            raw,
            err
        );
    }
}

fn writable_data() -> impl Strategy<Value = ValueData> {
    // Any text without NUL survives the terminator round trip.
    let text = "[^\u{0}]{0,64}";
    prop_oneof![
        text.prop_map(ValueData::String),
        text.prop_map(ValueData::ExpandString),
        any::<u32>().prop_map(ValueData::Dword),
    ]
}

proptest! {
    #[test]
    fn prop_encode_decode_round_trip(data in writable_data()) {
        let raw = encode(data.value_type(), &data).unwrap();
        prop_assert_eq!(raw.value_type, data.value_type());
        prop_assert_eq!(decode(&raw).unwrap(), data);
    }

    #[test]
    fn prop_dword_text_round_trip(n in any::<u32>()) {
        let data = ValueData::from_host_str(ValueType::Dword, &n.to_string()).unwrap();
        let raw = encode(ValueType::Dword, &data).unwrap();
        prop_assert_eq!(raw.bytes.len(), 4);
        prop_assert_eq!(decode(&raw).unwrap(), ValueData::Dword(n));
    }

    #[test]
    fn prop_decoded_type_matches_declared_type(
        tag in any::<u32>(),
        bytes in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let raw = RawValue::new(ValueType::from_u32(tag), bytes);
        if let Ok(data) = decode(&raw) {
            prop_assert_eq!(data.value_type(), raw.value_type);
        }
    }

    #[test]
    fn prop_binary_passes_through(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let raw = RawValue::new(ValueType::Binary, bytes.clone());
        prop_assert_eq!(decode(&raw).unwrap(), ValueData::Binary(bytes));
    }

    #[test]
    fn prop_multi_string_decodes_its_layout(strings in proptest::collection::vec("[^\u{0}]{1,16}", 0..8)) {
        let raw = RawValue::new(ValueType::MultiString, value::encode_multi_string(&strings));
        prop_assert_eq!(decode(&raw).unwrap(), ValueData::MultiString(strings));
    }
}
