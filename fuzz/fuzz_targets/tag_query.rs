//! Fuzz target for tag-expression parsing and expansion
//!
//! # Invariants
//!
//! - Parsing is total
//! - No parsed tag contains a sign character
//! - Expansion terminates on arbitrary (cyclic) tag graphs
//! - Expansion keeps every original tag, in order, without duplicates

#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use limbo_core::{Tag, TagQuery, TagTree};

#[derive(Debug, Arbitrary)]
struct Input {
    expr: String,
    edges: Vec<(u8, Vec<u8>)>,
}

fn name(n: u8) -> String {
    format!("t{}", n % 16)
}

fuzz_target!(|input: Input| {
    let query = TagQuery::parse(&input.expr);
    for tag in query.include.iter().chain(&query.exclude) {
        assert!(!tag.contains('+') && !tag.contains('-'));
    }

    let tree = TagTree::new(input.edges.iter().map(|(parent, children)| {
        Tag::new(&name(*parent), "").with_children(children.iter().map(|c| name(*c)))
    }));
    let expanded = tree.expand(&query);

    for list in [&expanded.include, &expanded.exclude] {
        let unique: HashSet<&String> = list.iter().collect();
        assert_eq!(unique.len(), list.len());
    }
    for tag in &query.include {
        assert!(expanded.include.contains(tag));
    }
});
