//! # Path Algebra Properties
//!
//! The override table is only sound if addresses are deterministic and
//! distinct operations never collide for the same parent. These properties
//! are checked over arbitrary parents and keys.

use lexc_core::{array_path, object_path, parse_path, render_path, union_path, PathSegment};
use proptest::prelude::*;

/// Property keys as they appear in real Lexicons: no dots, no reserved markers.
fn key() -> impl Strategy<Value = String> {
    "[a-zA-Z$][a-zA-Z0-9_$]{0,12}".prop_filter("reserved marker", |k| {
        k != "__array__" && k != "__union__"
    })
}

fn segment() -> impl Strategy<Value = PathSegment> {
    prop_oneof![
        key().prop_map(PathSegment::Key),
        Just(PathSegment::Array),
        (0usize..16).prop_map(PathSegment::Union),
    ]
}

proptest! {
    #[test]
    fn object_path_is_deterministic(parent in "[a-z.]{0,20}", k in key()) {
        prop_assert_eq!(object_path(&parent, &k), object_path(&parent, &k));
    }

    #[test]
    fn traversals_are_pairwise_distinct(parent in prop::collection::vec(segment(), 0..5), k in key(), i in 0usize..32) {
        let parent = render_path(&parent);
        let by_key = object_path(&parent, &k);
        let by_array = array_path(&parent);
        let by_union = union_path(&parent, i);
        prop_assert_ne!(&by_key, &by_array);
        prop_assert_ne!(&by_key, &by_union);
        prop_assert_ne!(&by_array, &by_union);
    }

    #[test]
    fn union_indices_do_not_collide(parent in prop::collection::vec(segment(), 0..4), i in 0usize..64, j in 0usize..64) {
        prop_assume!(i != j);
        let parent = render_path(&parent);
        prop_assert_ne!(union_path(&parent, i), union_path(&parent, j));
    }

    #[test]
    fn parse_inverts_render(segments in prop::collection::vec(segment(), 0..8)) {
        prop_assert_eq!(parse_path(&render_path(&segments)), segments);
    }
}
