use std::fmt::Write as _;

use crate::repl::mem::MemSpan;

/// Declaration record supplied by the out-of-scope statement parser.
///
/// All strings are owned copies; nothing here may borrow the raw input buffer
/// of the turn that produced it.
#[derive(Debug, Clone)]
pub struct ParsedDecl {
	/// Declared symbol name.
	pub name: String,
	/// Declared type text, `None` for `auto` declarations.
	pub type_text: Option<String>,
	/// Initializer expression text, if any.
	pub init_text: Option<String>,
}

/// Emission state of a value declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitState {
	/// Never part of a compiled turn yet.
	First,
	/// Compiled in a prior turn; later turns bind to existing storage.
	Reemitted,
}

/// A declared value with stable backing storage across turns.
#[derive(Debug, Clone)]
pub struct ValueDecl {
	/// Symbol name.
	pub name: Box<str>,
	/// Declared type text, `None` for `auto`.
	pub type_text: Option<Box<str>>,
	/// Initializer text, kept verbatim for function values.
	pub init_text: Option<Box<str>>,
	/// Display type reported back by the compiled turn.
	pub display_type: Box<str>,
	/// Whether the value is a function or delegate.
	pub is_function: bool,
	/// Emission state machine position.
	pub state: EmitState,
	/// Backing storage range owned by the compiled module, never by this record.
	///
	/// Re-binding after a reload replaces the whole range; deleting the
	/// declaration drops it.
	pub storage: Option<MemSpan>,
}

/// A declaration emitted as raw text with no backing storage.
#[derive(Debug, Clone)]
pub struct RawDecl {
	/// Full declaration text.
	pub text: Box<str>,
	/// Whether it must be emitted at module scope rather than turn scope.
	pub global: bool,
}

/// One declaration made during the session.
#[derive(Debug, Clone)]
pub enum Declaration {
	/// Value with allocatable backing storage.
	Value(ValueDecl),
	/// `alias` declaration.
	Alias(RawDecl),
	/// `import` declaration.
	Import(RawDecl),
	/// `enum` declaration.
	Enum(RawDecl),
	/// `struct`/`class`/user type declaration.
	UserType(RawDecl),
}

/// Source text a compiled turn needs, split by emission scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFragments {
	/// Text emitted at module scope of the generated unit.
	pub module_scope: String,
	/// Text emitted inside the turn entry point.
	pub turn_scope: String,
}

impl SourceFragments {
	/// Append another fragment set scope-by-scope.
	pub fn append(&mut self, other: &SourceFragments) {
		self.module_scope.push_str(&other.module_scope);
		self.turn_scope.push_str(&other.turn_scope);
	}

	/// Whether both scopes are empty.
	pub fn is_empty(&self) -> bool {
		self.module_scope.is_empty() && self.turn_scope.is_empty()
	}
}

impl ValueDecl {
	/// Create a never-emitted value declaration from a parsed record.
	pub fn new(decl: ParsedDecl) -> Self {
		let display = decl.type_text.clone().unwrap_or_else(|| "auto".to_owned());
		Self {
			name: decl.name.into_boxed_str(),
			type_text: decl.type_text.map(String::into_boxed_str),
			init_text: decl.init_text.map(String::into_boxed_str),
			display_type: display.into_boxed_str(),
			is_function: false,
			state: EmitState::First,
			storage: None,
		}
	}

	/// Emit the glue a compiled turn needs for this symbol.
	///
	/// `index` is the symbol's position in the session, used by the emitted
	/// code to address the runtime storage table. The first successful call
	/// moves the state machine to [`EmitState::Reemitted`].
	pub fn generate(&mut self, index: usize) -> SourceFragments {
		let fragments = match self.state {
			EmitState::First => self.generate_first(index),
			EmitState::Reemitted => self.generate_rebind(index),
		};
		self.state = EmitState::Reemitted;
		fragments
	}

	fn generate_first(&self, index: usize) -> SourceFragments {
		let mut turn = String::new();
		let name = &self.name;

		match (&self.type_text, &self.init_text) {
			(Some(ty), None) => {
				// Declared type only: default-initialized stable storage.
				let _ = writeln!(turn, "auto __v{index} = _repl_.alloc!({ty})({index});");
				let _ = writeln!(turn, "alias {name} = *__v{index};");
				Self::emit_bookkeeping(&mut turn, index, name);
			}
			(Some(ty), Some(init)) => {
				// Declared type and initializer: storage seeded from the expression.
				let _ = writeln!(turn, "auto __v{index} = _repl_.alloc!({ty})({index});");
				let _ = writeln!(turn, "*__v{index} = cast({ty})({init});");
				let _ = writeln!(turn, "alias {name} = *__v{index};");
				Self::emit_bookkeeping(&mut turn, index, name);
			}
			(None, Some(init)) => {
				// `auto`: probe the initializer first, since function values
				// cannot be relocated into fixed backing storage.
				let _ = writeln!(turn, "auto __t{index} = ({init});");
				let _ = writeln!(turn, "static if (isFunctionValue!(typeof(__t{index}))) {{");
				let _ = writeln!(turn, "\talias {name} = __t{index};");
				let _ = writeln!(turn, "\t_repl_.markFunction({index}, q{{{init}}});");
				let _ = writeln!(turn, "}} else {{");
				let _ = writeln!(turn, "\tauto __v{index} = _repl_.alloc!(typeof(__t{index}))({index});");
				let _ = writeln!(turn, "\t*__v{index} = __t{index};");
				let _ = writeln!(turn, "\talias {name} = *__v{index};");
				let _ = writeln!(turn, "\t_repl_.register!(typeof({name}))();");
				let _ = writeln!(turn, "}}");
				let _ = writeln!(turn, "_repl_.setType({index}, typeof({name}).stringof);");
			}
			(None, None) => {}
		}

		SourceFragments {
			module_scope: String::new(),
			turn_scope: turn,
		}
	}

	fn generate_rebind(&self, index: usize) -> SourceFragments {
		let mut turn = String::new();
		let name = &self.name;

		if self.is_function {
			// Function values re-evaluate their stored initializer every turn.
			let init = self.init_text.as_deref().unwrap_or("");
			let _ = writeln!(turn, "auto __f{index} = ({init});");
			let _ = writeln!(turn, "alias {name} = __f{index};");
		} else {
			let ty = self.display_type.as_ref();
			let _ = writeln!(turn, "auto __v{index} = cast({ty}*)_repl_.addr({index});");
			let _ = writeln!(turn, "alias {name} = *__v{index};");
		}

		SourceFragments {
			module_scope: String::new(),
			turn_scope: turn,
		}
	}

	fn emit_bookkeeping(turn: &mut String, index: usize, name: &str) {
		let _ = writeln!(turn, "_repl_.setType({index}, typeof({name}).stringof);");
		let _ = writeln!(turn, "_repl_.register!(typeof({name}))();");
	}
}

impl RawDecl {
	/// Emit the declaration text into its configured scope.
	///
	/// Raw declarations hold no storage, so re-emission is idempotent.
	pub fn generate(&self) -> SourceFragments {
		let mut fragments = SourceFragments::default();
		let target = if self.global { &mut fragments.module_scope } else { &mut fragments.turn_scope };
		target.push_str(&self.text);
		if !self.text.ends_with('\n') {
			target.push('\n');
		}
		fragments
	}
}

impl Declaration {
	/// Return the symbol name for value declarations.
	pub fn name(&self) -> Option<&str> {
		match self {
			Declaration::Value(value) => Some(&value.name),
			_ => None,
		}
	}

	/// Return the value payload, if this is a value declaration.
	pub fn as_value(&self) -> Option<&ValueDecl> {
		match self {
			Declaration::Value(value) => Some(value),
			_ => None,
		}
	}

	/// Emit this declaration's glue for the current turn.
	pub fn generate(&mut self, index: usize) -> SourceFragments {
		match self {
			Declaration::Value(value) => value.generate(index),
			Declaration::Alias(raw) | Declaration::Import(raw) | Declaration::Enum(raw) | Declaration::UserType(raw) => raw.generate(),
		}
	}
}

#[cfg(test)]
mod tests;
