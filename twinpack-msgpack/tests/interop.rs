//! Bytes written here must be readable by rmp-serde and the other way round.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use twinpack_core::{CompositeResolver, GenericResolver, Value};
use twinpack_msgpack::{default_resolver, from_slice, to_vec, to_vec_with};
use twinpack_testhelpers::test;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Reading {
    sensor: String,
    celsius: f64,
    samples: Vec<i32>,
    note: Option<String>,
}

#[test]
fn integer_arrays_match_rmp_serde_byte_for_byte() {
    let values: Vec<u32> = vec![0, 127, 128, 255, 256, 65_535, 65_536, u32::MAX];
    assert_eq!(to_vec(&values).unwrap(), rmp_serde::to_vec(&values).unwrap());

    let values: Vec<i64> = vec![-1, -32, -33, -128, -129, -32_768, -32_769, i64::MIN, 5, 300];
    assert_eq!(to_vec(&values).unwrap(), rmp_serde::to_vec(&values).unwrap());
}

#[test]
fn strings_match_rmp_serde_byte_for_byte() {
    for len in [0, 31, 32, 255, 256, 70_000] {
        let s = "q".repeat(len);
        assert_eq!(to_vec(&s).unwrap(), rmp_serde::to_vec(&s).unwrap(), "len {len}");
    }
}

#[test]
fn serde_structs_read_as_values() {
    let reading = Reading {
        sensor: "north".into(),
        celsius: 21.5,
        samples: vec![1, -2, 300],
        note: None,
    };
    // rmp-serde writes structs as arrays unless asked for named fields
    let bytes = rmp_serde::to_vec_named(&reading).unwrap();
    let value: Value = from_slice(&bytes).unwrap();
    assert_eq!(value.get("sensor").and_then(Value::as_str), Some("north"));
    assert_eq!(value.get("celsius").and_then(Value::as_f64), Some(21.5));
    let samples: Vec<i64> = value
        .get("samples")
        .and_then(Value::as_array)
        .unwrap()
        .iter()
        .filter_map(Value::as_i64)
        .collect();
    assert_eq!(samples, [1, -2, 300]);
    assert!(value.get("note").unwrap().is_nil());

    // and back out again, unchanged
    let back: Reading = rmp_serde::from_slice(&to_vec(&value).unwrap()).unwrap();
    assert_eq!(back, reading);
}

#[test]
fn maps_read_by_rmp_serde() {
    let mut map = BTreeMap::new();
    map.insert("alpha".to_string(), vec![1.25f64, -0.5]);
    map.insert("beta".to_string(), Vec::new());
    let resolver = CompositeResolver::new()
        .with(GenericResolver::new().register::<BTreeMap<String, Vec<f64>>>())
        .with(default_resolver());
    let bytes = to_vec_with(&map, &resolver).unwrap();
    let back: BTreeMap<String, Vec<f64>> = rmp_serde::from_slice(&bytes).unwrap();
    assert_eq!(back, map);
}
