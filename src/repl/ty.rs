/// Width in bytes of a pointer in inspected memory.
pub const POINTER_SIZE: usize = size_of::<usize>();

/// Width in bytes of a dynamic array header (length word followed by base pointer).
pub const DYN_ARRAY_SIZE: usize = POINTER_SIZE * 2;

/// Index identity of a registered type descriptor.
///
/// Two ids compare equal exactly when they refer to the same registry slot,
/// which is what makes memoized descriptors identical across `describe` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
	/// Return the registry table index.
	pub fn index(self) -> usize {
		self.0 as usize
	}
}

/// Structural classification of a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
	/// Scalar primitive of the target language.
	Basic,
	/// Pointer to a single element type.
	Pointer,
	/// Plain aggregate stored in place.
	Struct,
	/// Reference-type aggregate; the stored value is a pointer to instance data.
	Class,
	/// Length-prefixed array header pointing at out-of-line elements.
	DynamicArray,
	/// Fixed-length inline array.
	StaticArray,
	/// Opaque pointer-sized associative array handle.
	AssocArray,
}

/// One named member of an aggregate type.
#[derive(Debug, Clone)]
pub struct Member {
	/// Member name.
	pub name: Box<str>,
	/// Member type.
	pub ty: TypeId,
	/// Byte offset from the aggregate base.
	pub offset: usize,
}

/// Memory layout description of one registered type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
	/// Canonical type name, unique per registry.
	pub name: Box<str>,
	/// Structural kind.
	pub kind: TypeKind,
	/// Size in bytes of one stored value.
	///
	/// For classes this is the instance size; the stored reference is
	/// [`POINTER_SIZE`] bytes.
	pub size: usize,
	/// Element type for pointer and array kinds.
	pub elem: Option<TypeId>,
	/// Element count, static arrays only.
	pub len: Option<usize>,
	/// Aggregate members in registration order.
	pub members: Vec<Member>,
}

impl TypeDescriptor {
	/// Look up an aggregate member by name.
	pub fn member(&self, name: &str) -> Option<&Member> {
		self.members.iter().find(|member| member.name.as_ref() == name)
	}

	/// Return members ordered by ascending byte offset.
	///
	/// Rendering iterates in this order so output is deterministic regardless
	/// of registration order.
	pub fn members_by_offset(&self) -> Vec<&Member> {
		let mut out: Vec<&Member> = self.members.iter().collect();
		out.sort_by_key(|member| member.offset);
		out
	}

	/// Return whether the stored value is itself an address.
	pub fn is_reference(&self) -> bool {
		matches!(self.kind, TypeKind::Pointer | TypeKind::Class | TypeKind::AssocArray)
	}
}
