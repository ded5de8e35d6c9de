use crate::repl::decl::{Declaration, ParsedDecl, RawDecl, SourceFragments, ValueDecl};
use crate::repl::eval::{Evaluator, RenderOptions, resolve_casts};
use crate::repl::expr::NavExpr;
use crate::repl::mem::{MemSpan, MemView};
use crate::repl::registry::TypeRegistry;
use crate::repl::{ReplError, Result};

/// One row of a session listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedSymbol {
	/// Symbol name.
	pub name: String,
	/// Display type string.
	pub display_type: String,
	/// Rendered current value, or a placeholder when nothing is bound.
	pub value: String,
}

/// All mutable state of one interactive session.
///
/// Owns the ordered declarations, the type registry, and the live address
/// ranges. The navigation parser and evaluator never mutate this state; only
/// declaration emission and loader notifications do.
#[derive(Debug, Default)]
pub struct Session {
	decls: Vec<Declaration>,
	registry: TypeRegistry,
	module_span: Option<MemSpan>,
}

impl Session {
	/// Create an empty session with only the scalar types registered.
	pub fn new() -> Self {
		Self {
			decls: Vec::new(),
			registry: TypeRegistry::new(),
			module_span: None,
		}
	}

	/// Mutable access to the type registry, used by glue-side registration.
	pub fn registry(&mut self) -> &mut TypeRegistry {
		&mut self.registry
	}

	/// Record a parsed value declaration and emit its first-turn glue.
	pub fn declare(&mut self, decl: ParsedDecl) -> SourceFragments {
		let index = self.decls.len();
		self.decls.push(Declaration::Value(ValueDecl::new(decl)));
		self.decls[index].generate(index)
	}

	/// Record a non-value declaration classified by its leading keyword.
	pub fn declare_raw(&mut self, text: &str, global: bool) -> SourceFragments {
		let raw = RawDecl {
			text: text.trim().into(),
			global,
		};
		let keyword = text.trim().split_whitespace().next().unwrap_or("");
		let decl = match keyword {
			"alias" => Declaration::Alias(raw),
			"import" => Declaration::Import(raw),
			"enum" => Declaration::Enum(raw),
			_ => Declaration::UserType(raw),
		};

		let index = self.decls.len();
		self.decls.push(decl);
		self.decls[index].generate(index)
	}

	/// Emit bridging glue for every prior declaration at the start of a turn.
	pub fn rebind_fragments(&mut self) -> SourceFragments {
		let mut fragments = SourceFragments::default();
		for index in 0..self.decls.len() {
			fragments.append(&self.decls[index].generate(index));
		}
		fragments
	}

	/// Loader notification: a freshly compiled module is now mapped at `span`.
	///
	/// Replaces the previous module range; backing-storage spans survive.
	pub fn module_loaded(&mut self, span: MemSpan) {
		self.module_span = Some(span);
	}

	/// Loader notification: backing storage for `name` lives at `addr`.
	///
	/// Re-binding replaces the symbol's previous storage range, so superseded
	/// addresses become unreadable.
	pub fn bind_storage(&mut self, name: &str, addr: usize, len: usize) -> Result<()> {
		let value = self.value_mut(name)?;
		value.storage = Some(MemSpan { base: addr, len });
		Ok(())
	}

	/// Compiled-turn notification: the display type string for `name`.
	pub fn set_display_type(&mut self, name: &str, display_type: &str) -> Result<()> {
		let value = self.value_mut(name)?;
		value.display_type = display_type.into();
		Ok(())
	}

	/// Compiled-turn notification: `name` evaluated to a function value.
	pub fn mark_function(&mut self, name: &str) -> Result<()> {
		let value = self.value_mut(name)?;
		value.is_function = true;
		Ok(())
	}

	/// Return the most recent declaration with this name, if any.
	///
	/// Later declarations shadow earlier ones; shadowed entries stay
	/// reachable by index only.
	pub fn lookup(&self, name: &str) -> Option<&Declaration> {
		self.lookup_index(name).map(|index| &self.decls[index])
	}

	/// Return the index of the most recent declaration with this name.
	pub fn lookup_index(&self, name: &str) -> Option<usize> {
		self.decls.iter().rposition(|decl| decl.name() == Some(name))
	}

	/// Return a declaration by session index.
	pub fn get(&self, index: usize) -> Option<&Declaration> {
		self.decls.get(index)
	}

	/// Remove the most recent declaration with this name.
	pub fn delete_by_name(&mut self, name: &str) -> bool {
		match self.lookup_index(name) {
			Some(index) => {
				self.decls.remove(index);
				true
			}
			None => false,
		}
	}

	/// Clear declarations, user types, and live address ranges together.
	pub fn reset(&mut self) {
		self.decls.clear();
		self.registry.clear_user_types();
		self.module_span = None;
	}

	/// Number of declarations made so far.
	pub fn len(&self) -> usize {
		self.decls.len()
	}

	/// Whether no declarations have been made.
	pub fn is_empty(&self) -> bool {
		self.decls.is_empty()
	}

	/// Build the checked view over the module image and bound storage.
	pub fn mem_view(&self) -> MemView {
		let mut spans: Vec<MemSpan> = self
			.decls
			.iter()
			.filter_map(|decl| decl.as_value())
			.filter_map(|value| value.storage)
			.collect();
		if let Some(span) = self.module_span {
			spans.push(span);
		}
		MemView::new(spans)
	}

	/// Evaluate a navigation expression and render its value.
	///
	/// Failures render as diagnostic text; they never alter session state.
	pub fn evaluate_expression(&mut self, text: &str) -> String {
		match self.eval_inner(text, false) {
			Ok(rendered) => rendered,
			Err(err) => format!("error: {err}"),
		}
	}

	/// Evaluate a navigation expression and render the resulting type.
	pub fn type_of_expression(&mut self, text: &str) -> String {
		match self.eval_inner(text, true) {
			Ok(rendered) => rendered,
			Err(err) => format!("error: {err}"),
		}
	}

	/// List every value declaration in insertion order with rendered values.
	pub fn list_all(&mut self) -> Vec<ListedSymbol> {
		let rows: Vec<(String, String, Option<usize>, bool, Option<String>)> = self
			.decls
			.iter()
			.filter_map(|decl| decl.as_value())
			.map(|value| {
				(
					value.name.to_string(),
					value.display_type.to_string(),
					value.storage.map(|span| span.base),
					value.is_function,
					value.init_text.as_ref().map(|init| init.to_string()),
				)
			})
			.collect();

		rows.into_iter()
			.map(|(name, display_type, addr, is_function, init)| {
				let value = if is_function {
					init.unwrap_or_else(|| "<function>".to_owned())
				} else {
					match addr {
						Some(addr) => self.render_at(&display_type, addr).unwrap_or_else(|err| format!("error: {err}")),
						None => "<not bound>".to_owned(),
					}
				};
				ListedSymbol { name, display_type, value }
			})
			.collect()
	}

	fn render_at(&mut self, display_type: &str, addr: usize) -> Result<String> {
		let ty = self.registry.describe_by_name(display_type).ok_or_else(|| ReplError::InvalidTypeText {
			text: display_type.to_owned(),
		})?;
		let view = self.mem_view();
		let evaluator = Evaluator::new(&self.registry, &view);
		evaluator.render_value(ty, addr, &RenderOptions::default())
	}

	fn eval_inner(&mut self, text: &str, want_type: bool) -> Result<String> {
		let expr = NavExpr::parse(text)?;
		let index = self.lookup_index(&expr.root).ok_or_else(|| ReplError::UnknownIdentifier { name: expr.root.to_string() })?;

		let (addr, display_type) = {
			let Some(value) = self.decls[index].as_value() else {
				return Err(ReplError::TypeMismatch {
					expected: "a value declaration",
					type_name: expr.root.to_string(),
				});
			};
			if value.is_function {
				return Err(ReplError::UnsupportedOperation {
					what: "inspecting a function value",
				});
			}
			let span = value.storage.ok_or_else(|| ReplError::NoBackingStorage { name: value.name.to_string() })?;
			(span.base, value.display_type.to_string())
		};

		let root_ty = self.registry.describe_by_name(&display_type).ok_or(ReplError::InvalidTypeText { text: display_type })?;
		resolve_casts(&mut self.registry, &expr.ops);

		let view = self.mem_view();
		let evaluator = Evaluator::new(&self.registry, &view);
		let (ty, addr) = evaluator.walk(root_ty, addr, &expr.ops)?;

		if want_type {
			Ok(evaluator.render_type(ty))
		} else {
			evaluator.render_value(ty, addr, &RenderOptions::default())
		}
	}

	fn value_mut(&mut self, name: &str) -> Result<&mut ValueDecl> {
		let index = self.lookup_index(name).ok_or_else(|| ReplError::UnknownIdentifier { name: name.to_owned() })?;
		match &mut self.decls[index] {
			Declaration::Value(value) => Ok(value),
			_ => Err(ReplError::UnknownIdentifier { name: name.to_owned() }),
		}
	}
}

#[cfg(test)]
mod tests;
