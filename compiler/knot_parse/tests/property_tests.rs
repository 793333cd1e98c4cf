//! Property-based tests for the reader.
//!
//! Parenthesized and indentation-based layouts of the same program must
//! read to the same list.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use knot_ir::Pool;
use knot_parse::parse;
use proptest::prelude::*;

fn atom_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<i32>().prop_map(|i| i.to_string()),
        prop::string::string_regex("[a-z][a-z0-9_]{0,8}").expect("valid regex"),
    ]
}

fn def_strategy() -> impl Strategy<Value = (String, Vec<String>)> {
    (
        prop::string::string_regex("[a-z]{1,6}").expect("valid regex"),
        prop::collection::vec(atom_strategy(), 0..8),
    )
}

fn render(pool_src: &str) -> String {
    let mut pool = Pool::new();
    let root = parse(&mut pool, pool_src).unwrap();
    pool.display(root).to_string()
}

proptest! {
    #[test]
    fn layouts_read_the_same(defs in prop::collection::vec(def_strategy(), 0..6)) {
        let mut parens = String::from("module m\n");
        let mut indented = String::from("module m\n");
        for (name, body) in &defs {
            parens.push_str(&format!("def {name} () () ({})\n", body.join(" ")));
            indented.push_str(&format!("def {name} () ():\n    {}\n", body.join(" ")));
        }
        prop_assert_eq!(render(&parens), render(&indented));
    }
}
