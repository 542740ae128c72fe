//! Property-based tests for the tag-expression parser.

use limbo_core::{Tag, TagQuery, TagTree};
use proptest::prelude::*;

/// Tag names never contain a sign
fn tag_name() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,8}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: a well-formed expression parses back into its signed parts
    #[test]
    fn prop_signed_tags_land_in_their_lists(
        first in tag_name(),
        leading_plus in any::<bool>(),
        rest in prop::collection::vec((any::<bool>(), tag_name()), 0..8),
    ) {
        let mut expr = String::new();
        if leading_plus {
            expr.push('+');
        }
        expr.push_str(&first);

        let mut include = vec![first];
        let mut exclude = Vec::new();
        for (plus, tag) in rest {
            expr.push(if plus { '+' } else { '-' });
            expr.push_str(&tag);
            if plus { include.push(tag) } else { exclude.push(tag) }
        }

        let query = TagQuery::parse(&expr);
        prop_assert_eq!(query.include, include);
        prop_assert_eq!(query.exclude, exclude);
    }

    /// Property: parsing never panics and never yields a tag containing a sign
    #[test]
    fn prop_parse_is_total(expr in ".{0,64}") {
        let query = TagQuery::parse(&expr);
        for tag in query.include.iter().chain(&query.exclude) {
            prop_assert!(!tag.contains('+') && !tag.contains('-'));
        }
    }

    /// Property: hierarchy expansion terminates and keeps the queried tag first
    #[test]
    fn prop_expansion_terminates_on_any_graph(
        edges in prop::collection::vec((0u8..6, 0u8..6), 0..20),
        root in 0u8..6,
    ) {
        let mut tags: Vec<Tag> = (0..6).map(|n| Tag::new(&format!("t{n}"), "")).collect();
        for (from, to) in edges {
            tags[from as usize].children.push(format!("t{to}"));
        }
        let tree = TagTree::new(tags);

        let expanded = tree.descendants(&format!("t{root}"));
        prop_assert_eq!(&expanded[0], &format!("t{root}"));
        prop_assert!(expanded.len() <= 6);
    }
}
