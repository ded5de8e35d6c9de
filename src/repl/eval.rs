use crate::repl::expr::{Op, OpKind};
use crate::repl::mem::MemView;
use crate::repl::registry::TypeRegistry;
use crate::repl::ty::{POINTER_SIZE, TypeId, TypeKind};
use crate::repl::{ReplError, Result};

/// Output truncation limits for rendered values.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
	/// Character count above which string content is elided.
	pub max_string: usize,
	/// Characters kept at each end of an elided string.
	pub string_edge: usize,
	/// Element count above which arrays are elided.
	pub max_elems: usize,
	/// Elements kept at each end of an elided array.
	pub array_edge: usize,
	/// Maximum recursive render depth for nested aggregates and arrays.
	pub max_depth: u32,
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self {
			max_string: 50,
			string_edge: 20,
			max_elems: 12,
			array_edge: 4,
			max_depth: 6,
		}
	}
}

/// Walks navigation operations over live addresses and renders the result.
#[derive(Debug)]
pub struct Evaluator<'a> {
	registry: &'a TypeRegistry,
	view: &'a MemView,
}

/// Register every cast target appearing in `ops` ahead of evaluation.
///
/// The walk itself holds the registry immutably, so composed cast types must
/// exist before it runs; targets that fail to resolve are reported by the walk
/// as unresolved casts.
pub fn resolve_casts(registry: &mut TypeRegistry, ops: &[Op]) {
	for op in ops {
		if op.kind == OpKind::Cast {
			let _ = registry.describe_by_name(&op.operand);
		}
	}
}

impl<'a> Evaluator<'a> {
	/// Create an evaluator over a registry and a checked memory view.
	pub fn new(registry: &'a TypeRegistry, view: &'a MemView) -> Self {
		Self { registry, view }
	}

	/// Apply navigation operations starting from a typed root address.
	///
	/// Returns the resulting type and address without reading the final value.
	pub fn walk(&self, root: TypeId, root_addr: usize, ops: &[Op]) -> Result<(TypeId, usize)> {
		let mut ty = root;
		let mut addr = root_addr;

		for op in ops {
			let desc = self.registry.get(ty);
			match op.kind {
				OpKind::Deref => {
					if desc.kind != TypeKind::Pointer {
						return Err(self.mismatch(ty, "a pointer"));
					}
					let Some(elem) = desc.elem else {
						return Err(self.mismatch(ty, "a pointer"));
					};
					addr = self.view.read_usize(addr)?;
					ty = elem;
				}
				OpKind::Index => {
					let index = op.operand.parse::<usize>().map_err(|_| ReplError::InvalidExpr {
						expr: op.operand.to_string(),
						reason: "index is not a number",
					})?;
					(ty, addr) = self.index_step(ty, addr, index)?;
				}
				OpKind::Member => (ty, addr) = self.member_step(ty, addr, &op.operand)?,
				OpKind::Cast => {
					ty = self.registry.lookup_name(&op.operand).ok_or_else(|| ReplError::UnresolvedCastType {
						text: op.operand.to_string(),
					})?;
				}
				OpKind::Slice => return Err(ReplError::UnsupportedOperation { what: "slicing" }),
			}
		}

		Ok((ty, addr))
	}

	/// Render the value of a typed address as display text.
	pub fn render_value(&self, ty: TypeId, addr: usize, options: &RenderOptions) -> Result<String> {
		self.render(ty, addr, options, 0)
	}

	/// Render the canonical type name, expanding aggregates one level deep.
	pub fn render_type(&self, ty: TypeId) -> String {
		let desc = self.registry.get(ty);
		match desc.kind {
			TypeKind::Struct | TypeKind::Class => {
				let parts: Vec<String> = desc
					.members_by_offset()
					.iter()
					.map(|member| format!("{} {}", self.registry.name_of(member.ty), member.name))
					.collect();
				format!("{}({})", desc.name, parts.join(", "))
			}
			_ => desc.name.to_string(),
		}
	}

	fn index_step(&self, ty: TypeId, addr: usize, index: usize) -> Result<(TypeId, usize)> {
		let desc = self.registry.get(ty);
		let Some(elem) = desc.elem else {
			return Err(self.mismatch(ty, "an array or pointer"));
		};
		let stride = self.registry.stored_size(elem);

		match desc.kind {
			TypeKind::StaticArray => {
				let len = desc.len.unwrap_or(0);
				if index >= len {
					return Err(self.out_of_bounds(ty, index, len));
				}
				Ok((elem, addr + index * stride))
			}
			TypeKind::DynamicArray => {
				let len = self.view.read_usize(addr)?;
				if index >= len {
					return Err(self.out_of_bounds(ty, index, len));
				}
				let base = self.view.read_usize(addr + POINTER_SIZE)?;
				Ok((elem, base + index * stride))
			}
			TypeKind::Pointer => {
				let base = self.view.read_usize(addr)?;
				Ok((elem, base + index * stride))
			}
			_ => Err(self.mismatch(ty, "an array or pointer")),
		}
	}

	fn member_step(&self, ty: TypeId, addr: usize, name: &str) -> Result<(TypeId, usize)> {
		let desc = self.registry.get(ty);
		match desc.kind {
			TypeKind::Struct => {
				let member = desc.member(name).ok_or_else(|| self.unknown_member(ty, name))?;
				Ok((member.ty, addr + member.offset))
			}
			TypeKind::Class => {
				// Classes are reference types; the aggregate base is behind the handle.
				let base = self.view.read_usize(addr)?;
				let member = desc.member(name).ok_or_else(|| self.unknown_member(ty, name))?;
				Ok((member.ty, base + member.offset))
			}
			TypeKind::DynamicArray if name == "length" => {
				let length_ty = self.registry.lookup_name("ulong").ok_or_else(|| self.unknown_member(ty, name))?;
				Ok((length_ty, addr))
			}
			_ => Err(self.mismatch(ty, "an aggregate")),
		}
	}

	fn render(&self, ty: TypeId, addr: usize, options: &RenderOptions, depth: u32) -> Result<String> {
		let desc = self.registry.get(ty);
		match desc.kind {
			TypeKind::Basic => self.render_basic(ty, addr),
			TypeKind::Pointer => {
				let value = self.view.read_usize(addr)?;
				Ok(format!("0x{value:x}"))
			}
			TypeKind::AssocArray => {
				let handle = self.view.read_usize(addr)?;
				Ok(format!("{}@0x{handle:x}", desc.name))
			}
			TypeKind::Struct => self.render_members(ty, addr, options, depth),
			TypeKind::Class => {
				let base = self.view.read_usize(addr)?;
				if base == 0 {
					return Ok("null".to_owned());
				}
				self.render_members(ty, base, options, depth)
			}
			TypeKind::StaticArray => {
				let len = desc.len.unwrap_or(0);
				let Some(elem) = desc.elem else {
					return Ok("[]".to_owned());
				};
				if self.registry.name_of(elem) == "char" {
					let raw = self.view.read(addr, len)?;
					return Ok(self.render_text(raw, options));
				}
				self.render_elems(elem, addr, len, options, depth)
			}
			TypeKind::DynamicArray => {
				let len = self.view.read_usize(addr)?;
				let base = self.view.read_usize(addr + POINTER_SIZE)?;
				let Some(elem) = desc.elem else {
					return Ok("[]".to_owned());
				};
				if len == 0 {
					return Ok(if self.registry.name_of(elem) == "char" { "\"\"".to_owned() } else { "[]".to_owned() });
				}
				if self.registry.name_of(elem) == "char" {
					let raw = self.view.read(base, len)?;
					return Ok(self.render_text(raw, options));
				}
				self.render_elems(elem, base, len, options, depth)
			}
		}
	}

	fn render_basic(&self, ty: TypeId, addr: usize) -> Result<String> {
		let desc = self.registry.get(ty);
		if desc.size == 0 {
			return Ok(desc.name.to_string());
		}
		let raw = self.view.read(addr, desc.size)?;

		let out = match (desc.name.as_ref(), raw.len()) {
			("bool", 1) => if raw[0] != 0 { "true".to_owned() } else { "false".to_owned() },
			("char", 1) => {
				let ch = raw[0];
				if ch.is_ascii_graphic() || ch == b' ' {
					format!("'{}'", ch as char)
				} else {
					format!("'\\x{ch:02x}'")
				}
			}
			("float", 4) => f32::from_ne_bytes(word4(raw)).to_string(),
			("double", 8) => f64::from_ne_bytes(word8(raw)).to_string(),
			("dchar", 4) => {
				let code = u32::from_ne_bytes(word4(raw));
				match char::from_u32(code) {
					Some(ch) => format!("'{ch}'"),
					None => format!("'\\U{code:08x}'"),
				}
			}
			("byte", 1) => (raw[0] as i8).to_string(),
			("short", 2) => i16::from_ne_bytes(word2(raw)).to_string(),
			("int", 4) => i32::from_ne_bytes(word4(raw)).to_string(),
			("long", 8) => i64::from_ne_bytes(word8(raw)).to_string(),
			("ubyte", 1) => raw[0].to_string(),
			("ushort" | "wchar", 2) => u16::from_ne_bytes(word2(raw)).to_string(),
			("uint", 4) => u32::from_ne_bytes(word4(raw)).to_string(),
			("ulong", 8) => u64::from_ne_bytes(word8(raw)).to_string(),
			_ => {
				let hex: String = raw.iter().map(|byte| format!("{byte:02x}")).collect();
				format!("0x{hex}")
			}
		};
		Ok(out)
	}

	fn render_members(&self, ty: TypeId, base: usize, options: &RenderOptions, depth: u32) -> Result<String> {
		let desc = self.registry.get(ty);
		if depth >= options.max_depth {
			return Ok(format!("{}(...)", desc.name));
		}

		let mut parts = Vec::with_capacity(desc.members.len());
		for member in desc.members_by_offset() {
			let rendered = self.render(member.ty, base + member.offset, options, depth + 1)?;
			parts.push(format!("{}={rendered}", member.name));
		}
		Ok(format!("{}({})", desc.name, parts.join(", ")))
	}

	fn render_elems(&self, elem: TypeId, base: usize, len: usize, options: &RenderOptions, depth: u32) -> Result<String> {
		if depth >= options.max_depth {
			return Ok(format!("[... {len} elements]"));
		}

		let stride = self.registry.stored_size(elem);
		let render_at = |index: usize| self.render(elem, base + index * stride, options, depth + 1);

		let mut parts = Vec::new();
		if len > options.max_elems {
			let edge = options.array_edge;
			for index in 0..edge {
				parts.push(render_at(index)?);
			}
			parts.push(format!("..({} elements)..", len - edge * 2));
			for index in (len - edge)..len {
				parts.push(render_at(index)?);
			}
		} else {
			for index in 0..len {
				parts.push(render_at(index)?);
			}
		}
		Ok(format!("[{}]", parts.join(", ")))
	}

	fn render_text(&self, raw: &[u8], options: &RenderOptions) -> String {
		let end = raw.iter().rposition(|byte| *byte != 0).map_or(0, |idx| idx + 1);
		let text = String::from_utf8_lossy(&raw[..end]);

		let count = text.chars().count();
		if count <= options.max_string {
			return format!("\"{text}\"");
		}
		let head: String = text.chars().take(options.string_edge).collect();
		let tail: String = text.chars().skip(count - options.string_edge).collect();
		format!("\"{head} ... {tail}\"")
	}

	fn mismatch(&self, ty: TypeId, expected: &'static str) -> ReplError {
		ReplError::TypeMismatch {
			expected,
			type_name: self.registry.name_of(ty).to_owned(),
		}
	}

	fn out_of_bounds(&self, ty: TypeId, index: usize, len: usize) -> ReplError {
		ReplError::IndexOutOfBounds {
			index,
			len,
			type_name: self.registry.name_of(ty).to_owned(),
		}
	}

	fn unknown_member(&self, ty: TypeId, member: &str) -> ReplError {
		ReplError::UnknownMember {
			member: member.to_owned(),
			type_name: self.registry.name_of(ty).to_owned(),
		}
	}
}

fn word2(raw: &[u8]) -> [u8; 2] {
	let mut buf = [0_u8; 2];
	buf.copy_from_slice(raw);
	buf
}

fn word4(raw: &[u8]) -> [u8; 4] {
	let mut buf = [0_u8; 4];
	buf.copy_from_slice(raw);
	buf
}

fn word8(raw: &[u8]) -> [u8; 8] {
	let mut buf = [0_u8; 8];
	buf.copy_from_slice(raw);
	buf
}
