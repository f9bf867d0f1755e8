use std::collections::{BTreeMap, HashMap, VecDeque};

use indexmap::IndexMap;
use twinpack_core::{
    CompositeResolver, ConcreteResolver, ErrorKind, FieldMatch, Fields, Format, Formatter,
    GenericResolver, KeyValuePair, Resolver, ResolverExt, Result, Stack, Value,
};
use twinpack_msgpack::{MsgPack, default_resolver, from_slice, from_slice_with, to_vec, to_vec_with};
use twinpack_testhelpers::test;

#[derive(Debug, Clone, PartialEq)]
struct Point {
    x: i32,
    y: i32,
    label: Option<String>,
}

struct PointFormatter {
    fields: Fields,
}

impl PointFormatter {
    fn new() -> Self {
        Self {
            fields: Fields::new(&["x", "y", "label"]),
        }
    }
}

impl<F: Format> Formatter<F, Point> for PointFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &Point,
        resolver: &dyn Resolver<F>,
    ) -> Result<()> {
        let int = resolver.get_with_verify::<i32>()?;
        F::write_record_start(buffer, cursor, &self.fields)?;
        F::write_field_name(buffer, cursor, 0, &self.fields)?;
        int.serialize(buffer, cursor, &value.x, resolver)?;
        F::write_field_name(buffer, cursor, 1, &self.fields)?;
        int.serialize(buffer, cursor, &value.y, resolver)?;
        F::write_field_name(buffer, cursor, 2, &self.fields)?;
        resolver
            .get_with_verify::<Option<String>>()?
            .serialize(buffer, cursor, &value.label, resolver)?;
        F::write_record_end(buffer, cursor, &self.fields)
    }

    fn deserialize(&self, bytes: &[u8], cursor: &mut usize, resolver: &dyn Resolver<F>) -> Result<Point> {
        let int = resolver.get_with_verify::<i32>()?;
        let label = resolver.get_with_verify::<Option<String>>()?;
        let mut point = Point {
            x: 0,
            y: 0,
            label: None,
        };
        let mut state = F::read_record_start(bytes, cursor)?;
        while let Some(ordinal) = F::read_record_next(bytes, cursor, &mut state)? {
            match F::read_field_name(bytes, cursor, ordinal, &self.fields)? {
                FieldMatch::Known(0) => point.x = int.deserialize(bytes, cursor, resolver)?,
                FieldMatch::Known(1) => point.y = int.deserialize(bytes, cursor, resolver)?,
                FieldMatch::Known(2) => point.label = label.deserialize(bytes, cursor, resolver)?,
                _ => F::skip_value(bytes, cursor)?,
            }
        }
        Ok(point)
    }
}

fn app_resolver() -> CompositeResolver<MsgPack> {
    CompositeResolver::new()
        .with(ConcreteResolver::new().with::<Point>(PointFormatter::new()))
        .with(GenericResolver::new().register::<Vec<Point>>())
        .with(default_resolver())
}

#[test]
fn records_are_arrays_in_member_order() {
    let resolver = app_resolver();
    let point = Point {
        x: 1,
        y: -2,
        label: Some("a".into()),
    };
    let bytes = to_vec_with(&point, &resolver).unwrap();
    assert_eq!(bytes, [0x93, 0x01, 0xfe, 0xa1, b'a']);
    assert_eq!(from_slice_with::<Point>(&bytes, &resolver).unwrap(), point);
}

#[test]
fn unknown_trailing_members_are_skipped() {
    let resolver = app_resolver();
    // [X, Y, nil, {"extra": [1, 2]}, 9]
    let bytes = [
        0x95, 0x05, 0x06, 0xc0, 0x81, 0xa5, b'e', b'x', b't', b'r', b'a', 0x92, 0x01, 0x02, 0x09,
    ];
    let mut cursor = 0;
    let formatter = resolver.get_with_verify::<Point>().unwrap();
    let point = formatter.deserialize(&bytes, &mut cursor, &resolver).unwrap();
    assert_eq!((point.x, point.y, point.label), (5, 6, None));
    assert_eq!(cursor, bytes.len());
}

#[test]
fn generic_containers_of_application_types() {
    let resolver = app_resolver();
    let points = vec![
        Point {
            x: 1,
            y: 2,
            label: None,
        };
        3
    ];
    let bytes = to_vec_with(&points, &resolver).unwrap();
    assert_eq!(bytes[0], 0x93);
    assert_eq!(from_slice_with::<Vec<Point>>(&bytes, &resolver).unwrap(), points);
}

#[test]
fn unregistered_type_is_reported_by_name() {
    let err = to_vec(&Point {
        x: 0,
        y: 0,
        label: None,
    })
    .unwrap_err();
    match err.kind {
        ErrorKind::NoFormatter { type_name } => assert!(type_name.ends_with("Point"), "{type_name}"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(default_resolver().get::<Point>().is_none());
}

#[test]
fn stack_pops_in_the_order_it_was_written() {
    let mut stack = Stack::new();
    stack.push(1u32);
    stack.push(2);
    stack.push(3);
    let resolver = CompositeResolver::new()
        .with(GenericResolver::new().register::<Stack<u32>>())
        .with(default_resolver());
    let bytes = to_vec_with(&stack, &resolver).unwrap();
    // top first on the wire
    assert_eq!(bytes, [0x93, 0x03, 0x02, 0x01]);
    let mut back: Stack<u32> = from_slice_with(&bytes, &resolver).unwrap();
    assert_eq!(back.pop(), Some(3));
    assert_eq!(back.pop(), Some(2));
    assert_eq!(back.pop(), Some(1));
    assert_eq!(back.pop(), None);
}

#[test]
fn dictionaries_round_trip() {
    let mut sorted = BTreeMap::new();
    sorted.insert("b".to_string(), 2i64);
    sorted.insert("a".to_string(), 1);
    let bytes = to_vec(&sorted).unwrap();
    assert_eq!(bytes, [0x82, 0xa1, b'a', 0x01, 0xa1, b'b', 0x02]);
    assert_eq!(from_slice::<BTreeMap<String, i64>>(&bytes).unwrap(), sorted);

    let hashed: HashMap<String, i64> = from_slice(&bytes).unwrap();
    assert_eq!(hashed.len(), 2);
    assert_eq!(hashed["b"], 2);

    let ordered: IndexMap<String, i64> = from_slice(&[0x82, 0xa1, b'z', 0x01, 0xa1, b'a', 0x02]).unwrap();
    assert_eq!(ordered.keys().collect::<Vec<_>>(), ["z", "a"]);
}

#[test]
fn fixed_arrays_insist_on_length() {
    let resolver = CompositeResolver::new()
        .with(
            GenericResolver::new()
                .register::<[u16; 3]>()
                .register::<VecDeque<u16>>(),
        )
        .with(default_resolver());
    let bytes = to_vec_with(&[1u16, 2, 3], &resolver).unwrap();
    assert_eq!(from_slice_with::<[u16; 3]>(&bytes, &resolver).unwrap(), [1, 2, 3]);
    assert_eq!(
        from_slice_with::<VecDeque<u16>>(&bytes, &resolver).unwrap(),
        [1, 2, 3]
    );
    assert!(from_slice_with::<[u16; 3]>(&[0x92, 0x01, 0x02], &resolver).is_err());
}

#[test]
fn tuples_are_records() {
    let resolver = CompositeResolver::new()
        .with(GenericResolver::new().register::<(u8, String, bool)>())
        .with(default_resolver());
    let value = (7u8, "seven".to_string(), true);
    let bytes = to_vec_with(&value, &resolver).unwrap();
    assert_eq!(bytes[0], 0x93);
    assert_eq!(from_slice_with::<(u8, String, bool)>(&bytes, &resolver).unwrap(), value);

    // a fourth element from a newer writer is skipped
    let mut longer = bytes.clone();
    longer[0] = 0x94;
    longer.push(0xc0);
    assert_eq!(from_slice_with::<(u8, String, bool)>(&longer, &resolver).unwrap(), value);

    let err = from_slice_with::<(u8, String, bool)>(&[0x91, 0x07], &resolver).unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingField { name: "Item2" });
}

#[test]
fn key_value_pairs() {
    let pair = KeyValuePair::new("k".to_string(), Value::from(3u8));
    let bytes = to_vec(&pair).unwrap();
    assert_eq!(bytes, [0x92, 0xa1, b'k', 0x03]);
    assert_eq!(from_slice::<KeyValuePair<String, Value>>(&bytes).unwrap(), pair);
}

#[test]
fn application_resolvers_override_defaults() {
    struct Doubled;
    impl Formatter<MsgPack, u32> for Doubled {
        fn serialize(
            &self,
            buffer: &mut Vec<u8>,
            cursor: &mut usize,
            value: &u32,
            _: &dyn Resolver<MsgPack>,
        ) -> Result<()> {
            twinpack_msgpack::write::write_u32(buffer, cursor, value * 2)
        }

        fn deserialize(&self, bytes: &[u8], cursor: &mut usize, _: &dyn Resolver<MsgPack>) -> Result<u32> {
            twinpack_msgpack::read::read_u32(bytes, cursor).map(|n| n / 2)
        }
    }

    let resolver = CompositeResolver::new()
        .with(ConcreteResolver::new().with::<u32>(Doubled))
        .with(default_resolver());
    assert_eq!(to_vec_with(&vec![1u32, 2], &resolver).unwrap(), [0x92, 0x02, 0x04]);
    assert_eq!(to_vec(&vec![1u32, 2]).unwrap(), [0x92, 0x01, 0x02]);
}
