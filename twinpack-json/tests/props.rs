//! Property checks against serde_json.

use std::collections::BTreeMap;

use proptest::prelude::*;
use twinpack_json::{from_str, to_string};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 512,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn any_i64_matches_serde_json(n in any::<i64>()) {
        let ours = to_string(&n).unwrap();
        prop_assert_eq!(&ours, &serde_json::to_string(&n).unwrap());
        prop_assert_eq!(from_str::<i64>(&ours).unwrap(), n);
    }

    #[test]
    fn finite_f64_survives(n in any::<f64>().prop_filter("finite", |n| n.is_finite())) {
        let ours = to_string(&n).unwrap();
        prop_assert_eq!(from_str::<f64>(&ours).unwrap(), n);
        prop_assert_eq!(serde_json::from_str::<f64>(&ours).unwrap(), n);
    }

    #[test]
    fn any_string_survives_both_ways(s in any::<String>()) {
        let ours = to_string(&s).unwrap();
        prop_assert!(ours.is_ascii());
        prop_assert_eq!(serde_json::from_str::<String>(&ours).unwrap(), s.clone());
        prop_assert_eq!(from_str::<String>(&serde_json::to_string(&s).unwrap()).unwrap(), s);
    }

    #[test]
    fn string_maps_survive(map in prop::collection::btree_map(".{0,8}", any::<i32>(), 0..16)) {
        let text = to_string(&map).unwrap();
        prop_assert_eq!(from_str::<BTreeMap<String, i32>>(&text).unwrap(), map);
    }
}
