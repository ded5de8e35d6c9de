use replspect::repl::{ReplError, TypeKind, TypeRegistry};

use crate::cmd::emit_json;

/// Resolve type text against the scalar table and print the derived layout.
pub fn run(text: &str, json: bool) -> replspect::repl::Result<()> {
	let mut registry = TypeRegistry::new();
	let id = registry.describe_by_name(text).ok_or_else(|| ReplError::InvalidTypeText { text: text.to_owned() })?;
	let desc = registry.get(id);

	if json {
		let payload = TyJson {
			input: text.to_owned(),
			name: desc.name.to_string(),
			kind: kind_name(desc.kind).to_owned(),
			size: desc.size,
			len: desc.len,
			elem: desc.elem.map(|elem| registry.name_of(elem).to_owned()),
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("input: {text}");
	println!("name: {}", desc.name);
	println!("kind: {}", kind_name(desc.kind));
	println!("size: {}", desc.size);
	if let Some(len) = desc.len {
		println!("len: {len}");
	}
	if let Some(elem) = desc.elem {
		println!("elem: {}", registry.name_of(elem));
	}

	Ok(())
}

fn kind_name(kind: TypeKind) -> &'static str {
	match kind {
		TypeKind::Basic => "basic",
		TypeKind::Pointer => "pointer",
		TypeKind::Struct => "struct",
		TypeKind::Class => "class",
		TypeKind::DynamicArray => "dynamic-array",
		TypeKind::StaticArray => "static-array",
		TypeKind::AssocArray => "assoc-array",
	}
}

#[derive(serde::Serialize)]
struct TyJson {
	input: String,
	name: String,
	kind: String,
	size: usize,
	#[serde(skip_serializing_if = "Option::is_none")]
	len: Option<usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	elem: Option<String>,
}
