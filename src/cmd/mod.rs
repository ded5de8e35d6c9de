/// Pre-registered scalar type listing command.
pub mod basics;
/// Navigation expression inspection command.
pub mod expr;
/// Type text resolution command.
pub mod ty;

/// Print a value as pretty JSON on stdout.
pub fn emit_json<T: serde::Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(out) => println!("{out}"),
		Err(err) => eprintln!("error: {err}"),
	}
}
