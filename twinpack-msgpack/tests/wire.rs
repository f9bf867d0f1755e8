use std::time::{Duration, SystemTime, UNIX_EPOCH};

use time::macros::datetime;
use time::OffsetDateTime;
use twinpack_core::{ErrorKind, Extension, Nil, Timestamp, Value};
use twinpack_msgpack::{codes, from_slice, to_vec};
use twinpack_testhelpers::test;

#[test]
fn integer_headers_are_minimal() {
    assert_eq!(to_vec(&127i32).unwrap(), [0x7f]);
    assert_eq!(to_vec(&128i32).unwrap(), [0xcc, 0x80]);
    assert_eq!(to_vec(&-32i64).unwrap(), [0xe0]);
    assert_eq!(to_vec(&-33i64).unwrap(), [0xd0, 0xdf]);
    assert_eq!(to_vec(&65_536u64).unwrap(), [0xce, 0x00, 0x01, 0x00, 0x00]);
    assert_eq!(to_vec(&usize::MAX).unwrap()[0], codes::UINT64);
}

#[test]
fn string_headers_are_minimal() {
    assert_eq!(to_vec(&String::from("abc")).unwrap(), [0xa3, b'a', b'b', b'c']);

    let long = "x".repeat(200);
    let bytes = to_vec(&long).unwrap();
    assert_eq!(&bytes[..2], [codes::STR8, 200]);
    assert_eq!(bytes.len(), 202);

    let longer = "y".repeat(300);
    let bytes = to_vec(&longer).unwrap();
    assert_eq!(&bytes[..3], [codes::STR16, 0x01, 0x2c]);
    assert_eq!(from_slice::<String>(&bytes).unwrap(), longer);
}

#[test]
fn nil_and_unit() {
    assert_eq!(to_vec(&Nil).unwrap(), [0xc0]);
    assert_eq!(to_vec(&()).unwrap(), [0xc0]);
    from_slice::<()>(&[0xc0]).unwrap();
    assert!(from_slice::<Nil>(&[0x00]).is_err());
}

#[test]
fn never_used_byte_names_itself() {
    let err = from_slice::<i32>(&[0xc1]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidCode { code: 0xc1, .. }));
    assert!(err.to_string().contains("never used"), "{err}");
    assert_eq!(err.offset, Some(0));
}

#[test]
fn type_mismatch_reports_the_format_name() {
    let err = from_slice::<String>(&[0x05]).unwrap_err();
    assert!(err.to_string().contains("positive fixint"), "{err}");
}

#[test]
fn wide_integers_travel_as_decimal_strings() {
    let big = u128::MAX;
    let bytes = to_vec(&big).unwrap();
    assert_eq!(bytes[0], codes::STR8);
    assert_eq!(from_slice::<u128>(&bytes).unwrap(), big);

    let small = -5i128;
    let bytes = to_vec(&small).unwrap();
    assert_eq!(bytes, [0xa2, b'-', b'5']);
    assert_eq!(from_slice::<i128>(&bytes).unwrap(), -5);
    assert_eq!(from_slice::<i128>(&[0xd0, 0x80]).unwrap(), -128);

    let err = from_slice::<u128>(&[0xa2, b'-', b'5']).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidNumber { target: "u128" });
}

#[test]
fn char_is_a_one_character_string() {
    assert_eq!(to_vec(&'é').unwrap(), [0xa2, 0xc3, 0xa9]);
    assert_eq!(from_slice::<char>(&[0xa2, 0xc3, 0xa9]).unwrap(), 'é');
    assert!(from_slice::<char>(&[0xa2, b'a', b'b']).is_err());
}

#[test]
fn byte_vectors_are_bin() {
    let bytes = to_vec(&vec![1u8, 2, 3]).unwrap();
    assert_eq!(bytes, [codes::BIN8, 3, 1, 2, 3]);
    assert_eq!(from_slice::<Vec<u8>>(&bytes).unwrap(), [1, 2, 3]);
    // arrays of small integers are accepted too
    assert_eq!(from_slice::<Vec<u8>>(&[0x92, 0x07, 0x08]).unwrap(), [7, 8]);
}

#[test]
fn timestamp_epoch_uses_the_32_bit_layout() {
    let bytes = to_vec(&Timestamp::UNIX_EPOCH).unwrap();
    assert_eq!(bytes, [codes::FIXEXT4, 0xff, 0, 0, 0, 0]);
    assert_eq!(from_slice::<Timestamp>(&bytes).unwrap(), Timestamp::UNIX_EPOCH);
    assert_eq!(from_slice::<SystemTime>(&bytes).unwrap(), UNIX_EPOCH);
}

#[test]
fn timestamp_with_nanos_uses_the_64_bit_layout() {
    let time = UNIX_EPOCH + Duration::new(1_700_000_000, 123_456_789);
    let bytes = to_vec(&time).unwrap();
    assert_eq!(bytes[0], codes::FIXEXT8);
    assert_eq!(bytes.len(), 10);
    assert_eq!(from_slice::<SystemTime>(&bytes).unwrap(), time);
}

#[test]
fn timestamp_out_of_34_bits_uses_the_96_bit_layout() {
    let before = datetime!(1900-01-01 00:00:00.5 UTC);
    let bytes = to_vec(&before).unwrap();
    assert_eq!(&bytes[..3], [codes::EXT8, 12, 0xff]);
    assert_eq!(from_slice::<OffsetDateTime>(&bytes).unwrap(), before);

    let far = Timestamp::new(1 << 40, 7).unwrap();
    let bytes = to_vec(&far).unwrap();
    assert_eq!(bytes.len(), 15);
    assert_eq!(from_slice::<Timestamp>(&bytes).unwrap(), far);
}

#[test]
fn extensions_keep_their_type_code() {
    let ext = Extension {
        type_code: 42,
        data: vec![1, 2, 3],
    };
    let bytes = to_vec(&ext).unwrap();
    assert_eq!(&bytes[..3], [codes::EXT8, 3, 42]);
    assert_eq!(from_slice::<Extension>(&bytes).unwrap(), ext);

    let fixed = Extension {
        type_code: -3,
        data: vec![9; 2],
    };
    assert_eq!(to_vec(&fixed).unwrap(), [codes::FIXEXT2, 0xfd, 9, 9]);
}

#[test]
fn value_reads_anything_well_formed() {
    // {"a": [1, -1, nil], "b": 1.5}
    let bytes = [
        0x82, 0xa1, b'a', 0x93, 0x01, 0xff, 0xc0, 0xa1, b'b', 0xcb, 0x3f, 0xf8, 0, 0, 0, 0, 0, 0,
    ];
    let value: Value = from_slice(&bytes).unwrap();
    let a = value.get("a").and_then(Value::as_array).unwrap();
    assert_eq!(a[0].as_u64(), Some(1));
    assert_eq!(a[1].as_i64(), Some(-1));
    assert!(a[2].is_nil());
    assert_eq!(value.get("b").and_then(Value::as_f64), Some(1.5));
    assert!(value.get("missing").is_none());
    assert_eq!(to_vec(&value).unwrap(), bytes);
}

#[test]
fn value_recognises_timestamps() {
    let bytes = to_vec(&Timestamp::UNIX_EPOCH).unwrap();
    assert_eq!(
        from_slice::<Value>(&bytes).unwrap(),
        Value::Timestamp(Timestamp::UNIX_EPOCH)
    );
}

#[test]
fn value_nesting_is_bounded() {
    let mut bytes = vec![0x91; 10_000];
    bytes.push(0xc0);
    let err = from_slice::<Value>(&bytes).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidValue { .. }));
}

#[test]
fn trailing_bytes_are_left_alone() {
    assert_eq!(from_slice::<u8>(&[0x05, 0xc1, 0xc1]).unwrap(), 5);
}

#[test]
fn integer_extremes_round_trip() {
    macro_rules! extremes {
        ($($t:ty),*) => {$(
            for n in [<$t>::MIN, <$t>::MAX, 0, 1] {
                let bytes = to_vec(&n).unwrap();
                assert_eq!(from_slice::<$t>(&bytes).unwrap(), n, "{} {n}", stringify!($t));
            }
        )*};
    }
    extremes!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

    for n in [-1i8, -32, -33, i8::MIN + 1] {
        assert_eq!(from_slice::<i8>(&to_vec(&n).unwrap()).unwrap(), n);
    }
    for n in [i16::MIN, i16::from(i8::MIN) - 1, i16::MAX] {
        assert_eq!(from_slice::<i32>(&to_vec(&n).unwrap()).unwrap(), i32::from(n));
    }
}

#[test]
fn float_extremes_round_trip_bit_for_bit() {
    for x in [
        0.0f64,
        -0.0,
        f64::MIN,
        f64::MAX,
        f64::MIN_POSITIVE,
        -f64::MIN_POSITIVE / 2.0,
        f64::EPSILON,
        f64::INFINITY,
        f64::NEG_INFINITY,
    ] {
        let back: f64 = from_slice(&to_vec(&x).unwrap()).unwrap();
        assert_eq!(back.to_bits(), x.to_bits(), "{x:e}");
    }
    assert!(from_slice::<f64>(&to_vec(&f64::NAN).unwrap()).unwrap().is_nan());

    for x in [
        0.0f32,
        -0.0,
        f32::MIN,
        f32::MAX,
        f32::MIN_POSITIVE,
        f32::EPSILON,
        f32::INFINITY,
        f32::NEG_INFINITY,
    ] {
        let bytes = to_vec(&x).unwrap();
        assert_eq!(bytes[0], codes::FLOAT32);
        let back: f32 = from_slice(&bytes).unwrap();
        assert_eq!(back.to_bits(), x.to_bits(), "{x:e}");
    }
    assert!(from_slice::<f32>(&to_vec(&f32::NAN).unwrap()).unwrap().is_nan());
}
