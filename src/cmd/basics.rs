use replspect::repl::TypeRegistry;

use crate::cmd::emit_json;

/// List the scalar types every session starts with.
pub fn run(json: bool) -> replspect::repl::Result<()> {
	let registry = TypeRegistry::new();

	if json {
		let payload: Vec<BasicJson> = registry
			.basics()
			.map(|desc| BasicJson {
				name: desc.name.to_string(),
				size: desc.size,
			})
			.collect();
		emit_json(&payload);
		return Ok(());
	}

	for desc in registry.basics() {
		println!("{:8} {}", desc.name, desc.size);
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct BasicJson {
	name: String,
	size: usize,
}
