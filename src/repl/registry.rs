use std::collections::HashMap;

use crate::repl::ty::{DYN_ARRAY_SIZE, Member, POINTER_SIZE, TypeDescriptor, TypeId, TypeKind};
use crate::repl::{ReplError, Result};

/// Scalar types of the target language, pre-registered in every session.
const BASIC_TYPES: &[(&str, usize)] = &[
	("void", 0),
	("bool", 1),
	("byte", 1),
	("ubyte", 1),
	("char", 1),
	("short", 2),
	("ushort", 2),
	("wchar", 2),
	("int", 4),
	("uint", 4),
	("dchar", 4),
	("float", 4),
	("long", 8),
	("ulong", 8),
	("double", 8),
	("real", 16),
];

/// Memoizing table of type layout descriptors keyed by canonical name.
#[derive(Debug)]
pub struct TypeRegistry {
	descs: Vec<TypeDescriptor>,
	by_name: HashMap<Box<str>, TypeId>,
	basic_count: usize,
}

impl Default for TypeRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl TypeRegistry {
	/// Create a registry holding only the pre-registered scalar types.
	pub fn new() -> Self {
		let mut registry = Self {
			descs: Vec::new(),
			by_name: HashMap::new(),
			basic_count: 0,
		};
		for (name, size) in BASIC_TYPES {
			registry.insert(TypeDescriptor {
				name: (*name).into(),
				kind: TypeKind::Basic,
				size: *size,
				elem: None,
				len: None,
				members: Vec::new(),
			});
		}
		registry.basic_count = registry.descs.len();
		registry
	}

	/// Describe a statically known host type.
	///
	/// Memoized: repeated calls for the same type return the identical id.
	pub fn describe<T: Reflect>(&mut self) -> TypeId {
		T::reflect(self)
	}

	/// Resolve free-standing type text to a descriptor.
	///
	/// The leading identifier must already be registered; trailing `*`, `[]`,
	/// and `[N]` suffixes are consumed left to right and each derived type is
	/// registered under its composed canonical name. Returns `None` for an
	/// unregistered identifier or a malformed suffix.
	pub fn describe_by_name(&mut self, text: &str) -> Option<TypeId> {
		let text = text.trim();
		let bytes = text.as_bytes();

		let mut idx = 0_usize;
		while idx < bytes.len() {
			let byte = bytes[idx];
			if byte.is_ascii_alphanumeric() || byte == b'_' {
				idx += 1;
			} else {
				break;
			}
		}
		if idx == 0 {
			return None;
		}

		let mut current = self.lookup_name(&text[..idx])?;

		while idx < bytes.len() {
			match bytes[idx] {
				byte if byte.is_ascii_whitespace() => idx += 1,
				b'*' => {
					current = self.pointer_to(current);
					idx += 1;
				}
				b'[' => {
					idx += 1;
					while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
						idx += 1;
					}
					let digits_start = idx;
					while idx < bytes.len() && bytes[idx].is_ascii_digit() {
						idx += 1;
					}
					let digits_end = idx;
					while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
						idx += 1;
					}
					if idx >= bytes.len() || bytes[idx] != b']' {
						return None;
					}
					idx += 1;

					if digits_start == digits_end {
						current = self.dynamic_array_of(current);
					} else {
						let count = text[digits_start..digits_end].parse::<usize>().ok()?;
						current = self.static_array_of(current, count);
					}
				}
				_ => return None,
			}
		}

		Some(current)
	}

	/// Probe for an already-registered canonical name without registering anything.
	pub fn lookup_name(&self, name: &str) -> Option<TypeId> {
		self.by_name.get(name).copied()
	}

	/// Return the descriptor for a registered id.
	pub fn get(&self, id: TypeId) -> &TypeDescriptor {
		&self.descs[id.index()]
	}

	/// Return the canonical name for a registered id.
	pub fn name_of(&self, id: TypeId) -> &str {
		&self.descs[id.index()].name
	}

	/// Size in bytes a value of this type occupies where it is stored.
	///
	/// Reference kinds store a pointer-sized handle regardless of instance size.
	pub fn stored_size(&self, id: TypeId) -> usize {
		let desc = self.get(id);
		if desc.is_reference() { POINTER_SIZE } else { desc.size }
	}

	/// Register (or return the memoized) pointer type over `elem`.
	pub fn pointer_to(&mut self, elem: TypeId) -> TypeId {
		let name = format!("{}*", self.name_of(elem));
		if let Some(id) = self.lookup_name(&name) {
			return id;
		}
		self.insert(TypeDescriptor {
			name: name.into_boxed_str(),
			kind: TypeKind::Pointer,
			size: POINTER_SIZE,
			elem: Some(elem),
			len: None,
			members: Vec::new(),
		})
	}

	/// Register (or return the memoized) dynamic array type over `elem`.
	pub fn dynamic_array_of(&mut self, elem: TypeId) -> TypeId {
		let name = format!("{}[]", self.name_of(elem));
		if let Some(id) = self.lookup_name(&name) {
			return id;
		}
		self.insert(TypeDescriptor {
			name: name.into_boxed_str(),
			kind: TypeKind::DynamicArray,
			size: DYN_ARRAY_SIZE,
			elem: Some(elem),
			len: None,
			members: Vec::new(),
		})
	}

	/// Register (or return the memoized) static array type over `elem`.
	pub fn static_array_of(&mut self, elem: TypeId, count: usize) -> TypeId {
		let name = format!("{}[{count}]", self.name_of(elem));
		if let Some(id) = self.lookup_name(&name) {
			return id;
		}
		let stride = self.stored_size(elem);
		self.insert(TypeDescriptor {
			name: name.into_boxed_str(),
			kind: TypeKind::StaticArray,
			size: stride.saturating_mul(count),
			elem: Some(elem),
			len: Some(count),
			members: Vec::new(),
		})
	}

	/// Register (or return the memoized) opaque associative array handle.
	pub fn assoc_array(&mut self, name: &str) -> TypeId {
		if let Some(id) = self.lookup_name(name) {
			return id;
		}
		self.insert(TypeDescriptor {
			name: name.into(),
			kind: TypeKind::AssocArray,
			size: POINTER_SIZE,
			elem: None,
			len: None,
			members: Vec::new(),
		})
	}

	/// Begin registering a struct layout under `name`.
	///
	/// The named slot is reserved before any member resolves, so members that
	/// point back at `name` (directly or mutually) find the reserved entry
	/// instead of recursing.
	pub fn begin_struct(&mut self, name: &str, size: usize) -> AggregateBuilder<'_> {
		self.begin_aggregate(name, size, TypeKind::Struct)
	}

	/// Begin registering a class layout under `name`.
	pub fn begin_class(&mut self, name: &str, size: usize) -> AggregateBuilder<'_> {
		self.begin_aggregate(name, size, TypeKind::Class)
	}

	/// Drop every type registered after construction, keeping the scalar table.
	pub fn clear_user_types(&mut self) {
		let keep = self.basic_count;
		self.descs.truncate(keep);
		self.by_name.retain(|_, id| id.index() < keep);
	}

	/// Return the number of registered descriptors.
	pub fn len(&self) -> usize {
		self.descs.len()
	}

	/// Return whether the registry holds no descriptors.
	pub fn is_empty(&self) -> bool {
		self.descs.is_empty()
	}

	/// Iterate the pre-registered scalar descriptors.
	pub fn basics(&self) -> impl Iterator<Item = &TypeDescriptor> {
		self.descs[..self.basic_count].iter()
	}

	fn begin_aggregate(&mut self, name: &str, size: usize, kind: TypeKind) -> AggregateBuilder<'_> {
		if let Some(id) = self.lookup_name(name) {
			return AggregateBuilder {
				registry: self,
				id,
				cached: true,
			};
		}
		let id = self.insert(TypeDescriptor {
			name: name.into(),
			kind,
			size,
			elem: None,
			len: None,
			members: Vec::new(),
		});
		AggregateBuilder {
			registry: self,
			id,
			cached: false,
		}
	}

	fn basic(&mut self, name: &str) -> TypeId {
		self.by_name[name]
	}

	fn insert(&mut self, desc: TypeDescriptor) -> TypeId {
		let id = TypeId(self.descs.len() as u32);
		self.by_name.insert(desc.name.clone(), id);
		self.descs.push(desc);
		id
	}
}

/// In-progress aggregate registration.
///
/// Registering a name that already exists yields a builder that ignores member
/// calls and returns the cached id, keeping re-registration idempotent.
#[derive(Debug)]
pub struct AggregateBuilder<'a> {
	registry: &'a mut TypeRegistry,
	id: TypeId,
	cached: bool,
}

impl AggregateBuilder<'_> {
	/// Add a member resolved from type text at a byte offset.
	pub fn member(&mut self, name: &str, type_text: &str, offset: usize) -> Result<()> {
		let ty = self.registry.describe_by_name(type_text).ok_or_else(|| ReplError::InvalidTypeText {
			text: type_text.to_owned(),
		})?;
		self.member_typed(name, ty, offset);
		Ok(())
	}

	/// Add a member with an already-resolved type at a byte offset.
	pub fn member_typed(&mut self, name: &str, ty: TypeId, offset: usize) {
		if self.cached {
			return;
		}
		self.registry.descs[self.id.index()].members.push(Member { name: name.into(), ty, offset });
	}

	/// Finalize the registration and return the descriptor id.
	pub fn finish(self) -> TypeId {
		self.id
	}
}

/// Statically known host types that can register their own layout.
///
/// Scalar impls map host spellings onto the target language's canonical names;
/// pointer and fixed-array impls compose through the registry. Aggregates
/// register through [`TypeRegistry::begin_struct`] from generated glue.
pub trait Reflect {
	/// Register (or fetch the memoized) descriptor for this type.
	fn reflect(registry: &mut TypeRegistry) -> TypeId;
}

macro_rules! reflect_basic {
	($($host:ty => $name:literal),+ $(,)?) => {
		$(impl Reflect for $host {
			fn reflect(registry: &mut TypeRegistry) -> TypeId {
				registry.basic($name)
			}
		})+
	};
}

reflect_basic! {
	bool => "bool",
	i8 => "byte",
	u8 => "ubyte",
	i16 => "short",
	u16 => "ushort",
	i32 => "int",
	u32 => "uint",
	i64 => "long",
	u64 => "ulong",
	isize => "long",
	usize => "ulong",
	f32 => "float",
	f64 => "double",
}

impl<T: Reflect> Reflect for *const T {
	fn reflect(registry: &mut TypeRegistry) -> TypeId {
		let elem = T::reflect(registry);
		registry.pointer_to(elem)
	}
}

impl<T: Reflect> Reflect for *mut T {
	fn reflect(registry: &mut TypeRegistry) -> TypeId {
		let elem = T::reflect(registry);
		registry.pointer_to(elem)
	}
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
	fn reflect(registry: &mut TypeRegistry) -> TypeId {
		let elem = T::reflect(registry);
		registry.static_array_of(elem, N)
	}
}
