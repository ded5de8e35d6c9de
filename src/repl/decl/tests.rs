use crate::repl::{EmitState, ParsedDecl, RawDecl, ValueDecl};

fn parsed(name: &str, type_text: Option<&str>, init_text: Option<&str>) -> ParsedDecl {
	ParsedDecl {
		name: name.to_owned(),
		type_text: type_text.map(str::to_owned),
		init_text: init_text.map(str::to_owned),
	}
}

#[test]
fn typed_declaration_allocates_and_aliases() {
	let mut decl = ValueDecl::new(parsed("x", Some("int"), None));
	assert_eq!(decl.state, EmitState::First);

	let fragments = decl.generate(0);
	assert!(fragments.module_scope.is_empty());
	assert!(fragments.turn_scope.contains("_repl_.alloc!(int)(0)"));
	assert!(fragments.turn_scope.contains("alias x = *__v0;"));
	assert!(fragments.turn_scope.contains("_repl_.register!"));
	assert_eq!(decl.state, EmitState::Reemitted);
}

#[test]
fn typed_declaration_with_initializer_seeds_storage() {
	let mut decl = ValueDecl::new(parsed("total", Some("double"), Some("1.5 + 2.5")));
	let fragments = decl.generate(2);
	assert!(fragments.turn_scope.contains("_repl_.alloc!(double)(2)"));
	assert!(fragments.turn_scope.contains("*__v2 = cast(double)(1.5 + 2.5);"));
}

#[test]
fn auto_declaration_probes_for_function_values() {
	let mut decl = ValueDecl::new(parsed("f", None, Some("(int a) => a * 2")));
	let fragments = decl.generate(1);
	assert!(fragments.turn_scope.contains("auto __t1 = ((int a) => a * 2);"));
	assert!(fragments.turn_scope.contains("_repl_.markFunction(1, q{(int a) => a * 2});"));
	assert!(fragments.turn_scope.contains("_repl_.alloc!(typeof(__t1))(1)"));
}

#[test]
fn rebind_uses_the_stable_address() {
	let mut decl = ValueDecl::new(parsed("x", Some("int"), None));
	let _ = decl.generate(0);
	decl.display_type = "int".into();

	let fragments = decl.generate(0);
	assert!(fragments.turn_scope.contains("cast(int*)_repl_.addr(0)"));
	assert!(fragments.turn_scope.contains("alias x = *__v0;"));
	assert!(!fragments.turn_scope.contains("alloc"), "rebind never reallocates");
}

#[test]
fn function_values_reevaluate_their_initializer() {
	let mut decl = ValueDecl::new(parsed("f", None, Some("makeCounter()")));
	let _ = decl.generate(3);
	decl.is_function = true;

	let fragments = decl.generate(3);
	assert!(fragments.turn_scope.contains("auto __f3 = (makeCounter());"));
	assert!(fragments.turn_scope.contains("alias f = __f3;"));
	assert!(!fragments.turn_scope.contains("_repl_.addr"));
}

#[test]
fn raw_declarations_route_by_scope() {
	let global = RawDecl {
		text: "import std.algorithm;".into(),
		global: true,
	};
	let fragments = global.generate();
	assert_eq!(fragments.module_scope, "import std.algorithm;\n");
	assert!(fragments.turn_scope.is_empty());

	let local = RawDecl {
		text: "alias T = int;".into(),
		global: false,
	};
	let fragments = local.generate();
	assert!(fragments.module_scope.is_empty());
	assert_eq!(fragments.turn_scope, "alias T = int;\n");
}
