use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, BindError>;

/// Errors produced while marshalling values, parsing descriptors, and calling native entry points.
#[derive(Debug, Error)]
pub enum BindError {
	/// Entry point does not exist on the callable surface.
	#[error("function {name} not in library")]
	MissingEntryPoint {
		/// Fully prefixed native symbol name.
		name: String,
	},
	/// Status-returning entry point reported failure.
	#[error("function {name} call failed (status={code})")]
	NativeFailure {
		/// Fully prefixed native symbol name.
		name: String,
		/// Non-zero status code returned by the driver.
		code: i64,
	},
	/// Entry point returned a value of the wrong kind for its calling convention.
	#[error("function {name} returned {got}, expected {expected}")]
	UnexpectedReturn {
		/// Fully prefixed native symbol name.
		name: String,
		/// Return kind the caller required.
		expected: &'static str,
		/// Return kind actually produced.
		got: &'static str,
	},
	/// Mapping key has no matching field in the native struct.
	#[error("{type_name} has no field {field}")]
	UnknownField {
		/// Native struct type name.
		type_name: String,
		/// Offending key.
		field: String,
	},
	/// Sequence length does not fit the target array field.
	#[error("array length mismatch for {field}: expected {expected}, got {got}")]
	ArrayLengthMismatch {
		/// Field or property name.
		field: String,
		/// Declared capacity of the target.
		expected: ArrayCapacity,
		/// Supplied element count.
		got: usize,
	},
	/// Value shape does not match the type descriptor.
	#[error("type mismatch: expected {expected}, got {got}")]
	TypeMismatch {
		/// Expected logical value kind.
		expected: &'static str,
		/// Actual logical value kind.
		got: &'static str,
	},
	/// Numeric value does not fit the native scalar kind.
	#[error("value {value} out of range for {kind}")]
	ValueOutOfRange {
		/// Native scalar kind name.
		kind: &'static str,
		/// Rendered offending value.
		value: String,
	},
	/// Native buffer size disagrees with its type descriptor.
	#[error("native size mismatch for {type_name}: need={need}, have={have}")]
	NativeSizeMismatch {
		/// Described type name.
		type_name: String,
		/// Bytes the descriptor requires.
		need: usize,
		/// Bytes actually present.
		have: usize,
	},
	/// Not enough bytes remained for a requested read or write.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the access was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Descriptor text did not match the configuration grammar.
	#[error("config parse error at {position}: expected {expected}")]
	ConfigParse {
		/// Byte offset into the parsed text.
		position: usize,
		/// Production that failed to match.
		expected: &'static str,
	},
	/// Requested code parameter set is not in the parsed code table.
	#[error("unknown code name: {name}")]
	UnknownCodeName {
		/// Requested code name.
		name: String,
	},
	/// Hardware description snippet was not valid JSON.
	#[error("description: {0}")]
	Description(#[from] serde_json::Error),
}

/// Declared capacity of an array target, used in length mismatch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayCapacity {
	/// Fixed inline array with exactly this many elements.
	Fixed(usize),
	/// Register window holding at most this many elements.
	AtMost(usize),
	/// Variable-length field that needs a pinned backing allocation.
	Unallocated,
}

impl std::fmt::Display for ArrayCapacity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Fixed(len) => write!(f, "exactly {len}"),
			Self::AtMost(len) => write!(f, "at most {len}"),
			Self::Unallocated => f.write_str("a fresh pinned allocation"),
		}
	}
}
