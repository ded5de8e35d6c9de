use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, ReplError>;

/// Errors produced while registering types, parsing navigation expressions, and walking live memory.
#[derive(Debug, Error)]
pub enum ReplError {
	/// Navigation expression root does not name a known declaration.
	#[error("unknown identifier: {name}")]
	UnknownIdentifier {
		/// Identifier that failed to resolve.
		name: String,
	},
	/// Operation applied to a type of the wrong kind.
	#[error("type mismatch: {type_name} is not {expected}")]
	TypeMismatch {
		/// Kind of type the operation requires.
		expected: &'static str,
		/// Canonical name of the type actually seen.
		type_name: String,
	},
	/// Array index outside the runtime or declared length.
	#[error("index {index} out of bounds for {type_name} of length {len}")]
	IndexOutOfBounds {
		/// Requested element index.
		index: usize,
		/// Length the index was checked against.
		len: usize,
		/// Canonical name of the indexed type.
		type_name: String,
	},
	/// Member access named a field the aggregate does not have.
	#[error("unknown member {member} on {type_name}")]
	UnknownMember {
		/// Requested member name.
		member: String,
		/// Canonical name of the aggregate.
		type_name: String,
	},
	/// Cast target text did not resolve to a registered type.
	#[error("cast unresolved: {text}")]
	UnresolvedCastType {
		/// Raw cast target text.
		text: String,
	},
	/// Operation is recognized but deliberately unsupported.
	#[error("{what} is not supported")]
	UnsupportedOperation {
		/// Human-readable name of the unsupported operation.
		what: &'static str,
	},
	/// Address range is not covered by the loaded module or any bound storage.
	#[error("stale address: 0x{addr:x}+{len} outside live memory")]
	StaleAddress {
		/// Start address of the rejected access.
		addr: usize,
		/// Requested length in bytes.
		len: usize,
	},
	/// Navigation expression could not produce a root operand.
	#[error("invalid expression {expr:?}: {reason}")]
	InvalidExpr {
		/// Original expression text.
		expr: String,
		/// Short description of the failure.
		reason: &'static str,
	},
	/// Type text did not resolve against the registry.
	#[error("invalid type text: {text}")]
	InvalidTypeText {
		/// Offending type text.
		text: String,
	},
	/// Declaration exists but its backing storage was never bound by a loaded module.
	#[error("no backing storage bound for {name}")]
	NoBackingStorage {
		/// Declaration name.
		name: String,
	},
}
