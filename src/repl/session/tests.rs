use crate::repl::{Declaration, MemSpan, ParsedDecl, Session};

fn parsed(name: &str, type_text: Option<&str>, init_text: Option<&str>) -> ParsedDecl {
	ParsedDecl {
		name: name.to_owned(),
		type_text: type_text.map(str::to_owned),
		init_text: init_text.map(str::to_owned),
	}
}

#[test]
fn declared_value_evaluates_after_binding() {
	let mut session = Session::new();
	let fragments = session.declare(parsed("x", Some("int"), None));
	assert!(fragments.turn_scope.contains("_repl_.alloc!(int)(0)"));

	let storage: i32 = 42;
	session.bind_storage("x", std::ptr::from_ref(&storage) as usize, 4).expect("symbol exists");
	session.set_display_type("x", "int").expect("symbol exists");

	assert_eq!(session.evaluate_expression("x"), "42");
	assert_eq!(session.type_of_expression("x"), "int");
}

#[test]
fn errors_render_as_diagnostics_without_poisoning_state() {
	let mut session = Session::new();
	let _ = session.declare(parsed("x", Some("int"), None));
	let storage: i32 = 7;
	session.bind_storage("x", std::ptr::from_ref(&storage) as usize, 4).expect("symbol exists");
	session.set_display_type("x", "int").expect("symbol exists");

	let diagnostic = session.evaluate_expression("x[5]");
	assert!(diagnostic.starts_with("error:"), "got: {diagnostic}");

	// The failed sibling leaves the session fully usable.
	assert_eq!(session.evaluate_expression("x"), "7");
}

#[test]
fn unknown_root_reports_unknown_identifier() {
	let mut session = Session::new();
	let diagnostic = session.evaluate_expression("nothing");
	assert_eq!(diagnostic, "error: unknown identifier: nothing");
}

#[test]
fn unbound_value_reports_missing_storage() {
	let mut session = Session::new();
	let _ = session.declare(parsed("x", Some("int"), None));
	let diagnostic = session.evaluate_expression("x");
	assert!(diagnostic.contains("no backing storage"), "got: {diagnostic}");
}

#[test]
fn shadowing_resolves_to_the_latest_declaration() {
	let mut session = Session::new();
	let _ = session.declare(parsed("x", Some("int"), None));
	let _ = session.declare(parsed("x", Some("double"), None));

	let second: f64 = 2.5;
	// bind_storage targets the latest declaration with the name.
	session.bind_storage("x", std::ptr::from_ref(&second) as usize, 8).expect("symbol exists");
	session.set_display_type("x", "double").expect("symbol exists");

	assert_eq!(session.lookup_index("x"), Some(1));
	assert_eq!(session.evaluate_expression("x"), "2.5");

	assert!(session.delete_by_name("x"), "delete removes the latest match");
	assert_eq!(session.lookup_index("x"), Some(0), "the shadowed declaration becomes visible again");
	let Some(Declaration::Value(value)) = session.lookup("x") else {
		panic!("expected the first declaration to remain");
	};
	assert_eq!(value.display_type.as_ref(), "int");

	assert!(!session.delete_by_name("gone"), "deleting an unknown name is a no-op");
}

#[test]
fn reset_clears_everything_atomically() {
	let mut session = Session::new();
	let _ = session.declare(parsed("x", Some("int"), None));
	let storage: i32 = 5;
	session.bind_storage("x", std::ptr::from_ref(&storage) as usize, 4).expect("symbol exists");
	session.module_loaded(MemSpan { base: 0x1000, len: 0x100 });
	session.registry().begin_struct("Custom", 8).finish();

	session.reset();

	assert!(session.is_empty());
	assert!(session.list_all().is_empty());
	assert!(session.lookup("x").is_none());
	assert!(session.registry().lookup_name("Custom").is_none());
	assert!(session.registry().lookup_name("int").is_some(), "scalars survive reset");
	assert!(session.mem_view().spans().is_empty());
}

#[test]
fn rebinding_replaces_the_previous_storage_span() {
	let mut session = Session::new();
	let _ = session.declare(parsed("x", Some("int"), None));

	let old: i32 = 1;
	session.bind_storage("x", std::ptr::from_ref(&old) as usize, 4).expect("symbol exists");
	let new: i32 = 2;
	session.bind_storage("x", std::ptr::from_ref(&new) as usize, 4).expect("symbol exists");

	assert_eq!(session.mem_view().spans().len(), 1, "superseded storage is no longer readable");
	assert_eq!(session.evaluate_expression("x"), "2");

	assert!(session.delete_by_name("x"));
	assert!(session.mem_view().spans().is_empty(), "deleting the symbol drops its span");
}

#[test]
fn list_all_renders_in_insertion_order() {
	let mut session = Session::new();
	let _ = session.declare(parsed("a", Some("int"), None));
	let _ = session.declare(parsed("b", Some("double"), None));

	let a: i32 = 10;
	session.bind_storage("a", std::ptr::from_ref(&a) as usize, 4).expect("symbol exists");
	session.set_display_type("a", "int").expect("symbol exists");

	let listing = session.list_all();
	assert_eq!(listing.len(), 2);
	assert_eq!((listing[0].name.as_str(), listing[0].value.as_str()), ("a", "10"));
	assert_eq!((listing[1].name.as_str(), listing[1].value.as_str()), ("b", "<not bound>"));
}

#[test]
fn function_values_are_listed_but_not_navigable() {
	let mut session = Session::new();
	let _ = session.declare(parsed("f", None, Some("(int a) => a + 1")));
	session.mark_function("f").expect("symbol exists");

	let listing = session.list_all();
	assert_eq!(listing[0].value, "(int a) => a + 1");

	let diagnostic = session.evaluate_expression("f");
	assert!(diagnostic.contains("not supported"), "got: {diagnostic}");
}

#[test]
fn raw_declarations_classify_and_route() {
	let mut session = Session::new();
	let fragments = session.declare_raw("import std.stdio;", true);
	assert_eq!(fragments.module_scope, "import std.stdio;\n");

	let fragments = session.declare_raw("alias Row = int[4];", false);
	assert_eq!(fragments.turn_scope, "alias Row = int[4];\n");

	let Some(Declaration::Import(_)) = session.get(0) else {
		panic!("expected an import declaration");
	};
	let Some(Declaration::Alias(_)) = session.get(1) else {
		panic!("expected an alias declaration");
	};
}

#[test]
fn rebind_emits_bridging_glue_for_later_turns() {
	let mut session = Session::new();
	let _ = session.declare(parsed("x", Some("int"), None));
	session.set_display_type("x", "int").expect("symbol exists");
	let _ = session.declare_raw("import std.stdio;", true);

	let fragments = session.rebind_fragments();
	assert!(fragments.turn_scope.contains("cast(int*)_repl_.addr(0)"));
	assert!(fragments.module_scope.contains("import std.stdio;"), "raw declarations re-emit every turn");
}

#[test]
fn stale_pointer_reads_are_diagnosed() {
	let mut session = Session::new();
	let _ = session.declare(parsed("p", Some("int*"), None));

	// The pointer itself is bound storage, but it points at an address that
	// no registered span covers.
	let dangling: usize = 0xdead_0000;
	session.bind_storage("p", std::ptr::from_ref(&dangling) as usize, size_of::<usize>()).expect("symbol exists");
	session.set_display_type("p", "int*").expect("symbol exists");

	let diagnostic = session.evaluate_expression("*p");
	assert!(diagnostic.contains("stale address"), "got: {diagnostic}");
}
