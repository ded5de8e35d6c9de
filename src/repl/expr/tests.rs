use crate::repl::{NavExpr, Op, OpKind};

#[test]
fn member_then_index_parses_in_order() {
	let expr = NavExpr::parse("a.b[2]").expect("expression parses");
	assert_eq!(expr.root.as_ref(), "a");
	assert_eq!(expr.ops, vec![Op::with(OpKind::Member, "b"), Op::with(OpKind::Index, "2")]);
	assert!(expr.notes.is_empty());
}

#[test]
fn prefix_deref_applies_after_member_chain() {
	let expr = NavExpr::parse("*a.b").expect("expression parses");
	assert_eq!(expr.root.as_ref(), "a");
	assert_eq!(expr.ops, vec![Op::with(OpKind::Member, "b"), Op::bare(OpKind::Deref)]);
}

#[test]
fn prefix_deref_applies_after_member_and_index() {
	let expr = NavExpr::parse("*a.b[2]").expect("expression parses");
	assert_eq!(
		expr.ops,
		vec![Op::with(OpKind::Member, "b"), Op::with(OpKind::Index, "2"), Op::bare(OpKind::Deref)]
	);
}

#[test]
fn parenthesized_chain_binds_before_outer_postfix() {
	let expr = NavExpr::parse("(*a.b)[2]").expect("expression parses");
	assert_eq!(expr.root.as_ref(), "a");
	assert_eq!(
		expr.ops,
		vec![Op::with(OpKind::Member, "b"), Op::bare(OpKind::Deref), Op::with(OpKind::Index, "2")]
	);
}

#[test]
fn cast_captures_stripped_type_text() {
	let expr = NavExpr::parse("a.b.cast( int * )").expect("expression parses");
	assert_eq!(expr.ops, vec![Op::with(OpKind::Member, "b"), Op::with(OpKind::Cast, "int*")]);
}

#[test]
fn slice_bounds_are_captured() {
	let expr = NavExpr::parse("a[1..3]").expect("expression parses");
	assert_eq!(expr.ops, vec![Op::slice("1", "3")]);
}

#[test]
fn whitespace_is_insignificant() {
	let expr = NavExpr::parse("  a . b [ 2 ] ").expect("expression parses");
	assert_eq!(expr.ops, vec![Op::with(OpKind::Member, "b"), Op::with(OpKind::Index, "2")]);
}

#[test]
fn malformed_index_keeps_valid_prefix() {
	let expr = NavExpr::parse("a.b[x]").expect("root still parses");
	assert_eq!(expr.root.as_ref(), "a");
	assert_eq!(expr.ops, vec![Op::with(OpKind::Member, "b")]);
	assert!(!expr.notes.is_empty(), "malformed bracket records a note");
}

#[test]
fn empty_and_rootless_inputs_fail() {
	assert!(NavExpr::parse("   ").is_err());
	assert!(NavExpr::parse(".b").is_err());
	assert!(NavExpr::parse("[2]").is_err());
}

#[test]
fn one_root_operand_per_expression() {
	let expr = NavExpr::parse("a b").expect("first identifier is the root");
	assert_eq!(expr.root.as_ref(), "a");
	assert!(!expr.notes.is_empty(), "second bare identifier records a note");
}
