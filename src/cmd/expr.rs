use replspect::repl::{NavExpr, OpKind};

use crate::cmd::emit_json;

/// Parse a navigation expression and print its operation list.
pub fn run(text: &str, json: bool) -> replspect::repl::Result<()> {
	let expr = NavExpr::parse(text)?;

	if json {
		let payload = ExprJson {
			expr: text.to_owned(),
			root: expr.root.to_string(),
			ops: expr.ops.iter().map(op_json).collect(),
			notes: expr
				.notes
				.iter()
				.map(|note| NoteJson {
					at: note.at,
					message: note.message.clone(),
				})
				.collect(),
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("expr: {text}");
	println!("root: {}", expr.root);
	println!("ops: {}", expr.ops.len());
	for (idx, op) in expr.ops.iter().enumerate() {
		match op.kind {
			OpKind::Deref => println!("  {idx}: deref"),
			OpKind::Member => println!("  {idx}: member {}", op.operand),
			OpKind::Index => println!("  {idx}: index {}", op.operand),
			OpKind::Slice => println!("  {idx}: slice {}..{}", op.operand, op.operand2),
			OpKind::Cast => println!("  {idx}: cast {}", op.operand),
		}
	}
	for note in &expr.notes {
		println!("note at {}: {}", note.at, note.message);
	}

	Ok(())
}

fn op_json(op: &replspect::repl::Op) -> OpJson {
	let kind = match op.kind {
		OpKind::Deref => "deref",
		OpKind::Member => "member",
		OpKind::Index => "index",
		OpKind::Slice => "slice",
		OpKind::Cast => "cast",
	};
	OpJson {
		kind: kind.to_owned(),
		operand: (!op.operand.is_empty()).then(|| op.operand.to_string()),
		operand2: (!op.operand2.is_empty()).then(|| op.operand2.to_string()),
	}
}

#[derive(serde::Serialize)]
struct ExprJson {
	expr: String,
	root: String,
	ops: Vec<OpJson>,
	notes: Vec<NoteJson>,
}

#[derive(serde::Serialize)]
struct OpJson {
	kind: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	operand: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	operand2: Option<String>,
}

#[derive(serde::Serialize)]
struct NoteJson {
	at: usize,
	message: String,
}
