/// Size in bytes of an embedded native pointer.
pub const POINTER_SIZE: usize = 8;

/// Primitive native scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
	/// `u8`.
	U8,
	/// `u16`.
	U16,
	/// `u32`.
	U32,
	/// `u64` / `UINTPTR`.
	U64,
	/// `int` / `s32`.
	I32,
	/// `double`.
	F64,
}

impl ScalarKind {
	/// Width in bytes.
	pub const fn size(self) -> usize {
		match self {
			Self::U8 => 1,
			Self::U16 => 2,
			Self::U32 | Self::I32 => 4,
			Self::U64 | Self::F64 => 8,
		}
	}

	/// Natural alignment in bytes.
	pub const fn align(self) -> usize {
		self.size()
	}

	/// C type label.
	pub const fn name(self) -> &'static str {
		match self {
			Self::U8 => "u8",
			Self::U16 => "u16",
			Self::U32 => "u32",
			Self::U64 => "u64",
			Self::I32 => "int",
			Self::F64 => "double",
		}
	}
}

/// Shape of one struct field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldType {
	/// Single scalar.
	Scalar(ScalarKind),
	/// Inline array with a fixed element count.
	Array(ScalarKind, usize),
	/// Pointer to a variable-length scalar array owned elsewhere.
	Pointer(ScalarKind),
	/// Nested struct stored inline.
	Struct(&'static StructLayout),
	/// Inline array of nested structs.
	StructArray(&'static StructLayout, usize),
}

impl FieldType {
	/// Storage size in bytes.
	pub fn size(&self) -> usize {
		match *self {
			Self::Scalar(kind) => kind.size(),
			Self::Array(kind, len) => kind.size() * len,
			Self::Pointer(_) => POINTER_SIZE,
			Self::Struct(layout) => layout.size(),
			Self::StructArray(layout, len) => layout.size() * len,
		}
	}

	/// Alignment requirement in bytes.
	pub fn align(&self) -> usize {
		match *self {
			Self::Scalar(kind) | Self::Array(kind, _) => kind.align(),
			Self::Pointer(_) => POINTER_SIZE,
			Self::Struct(layout) | Self::StructArray(layout, _) => layout.align(),
		}
	}
}

/// One declared struct field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
	/// Field name as spelled in the C header.
	pub name: &'static str,
	/// Field storage shape.
	pub ty: FieldType,
}

impl FieldDescriptor {
	/// Declare a field.
	pub const fn new(name: &'static str, ty: FieldType) -> Self {
		Self { name, ty }
	}
}

/// Declared native struct with fields in source order.
#[derive(Debug, PartialEq)]
pub struct StructLayout {
	/// C type name.
	pub name: &'static str,
	/// Field declarations in source order.
	pub fields: &'static [FieldDescriptor],
}

/// Field declaration paired with its byte offset.
#[derive(Debug, Clone, Copy)]
pub struct PlacedField {
	/// Byte offset from the struct start.
	pub offset: usize,
	/// Field declaration.
	pub field: &'static FieldDescriptor,
}

impl StructLayout {
	/// Alignment of the struct (largest field alignment).
	pub fn align(&self) -> usize {
		self.fields.iter().map(|field| field.ty.align()).max().unwrap_or(1)
	}

	/// Total size including trailing padding.
	pub fn size(&self) -> usize {
		let end = self.placed().last().map(|placed| placed.offset + placed.field.ty.size()).unwrap_or(0);
		align_up(end, self.align())
	}

	/// Fields with their C-rule offsets, in declaration order.
	pub fn placed(&self) -> Vec<PlacedField> {
		let mut offset = 0_usize;
		let mut out = Vec::with_capacity(self.fields.len());
		for field in self.fields {
			offset = align_up(offset, field.ty.align());
			out.push(PlacedField { offset, field });
			offset += field.ty.size();
		}
		out
	}

	/// Look up a field by name.
	pub fn field(&self, name: &str) -> Option<PlacedField> {
		self.placed().into_iter().find(|placed| placed.field.name == name)
	}
}

/// Native shape of a value passed across the callable surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeDescriptor {
	/// Single scalar.
	Scalar(ScalarKind),
	/// Fixed-length scalar array.
	Array(ScalarKind, usize),
	/// Struct with named fields.
	Struct(&'static StructLayout),
}

impl TypeDescriptor {
	/// Storage size in bytes.
	pub fn size(&self) -> usize {
		match *self {
			Self::Scalar(kind) => kind.size(),
			Self::Array(kind, len) => kind.size() * len,
			Self::Struct(layout) => layout.size(),
		}
	}

	/// Human-readable type label.
	pub fn name(&self) -> String {
		match *self {
			Self::Scalar(kind) => kind.name().to_owned(),
			Self::Array(kind, len) => format!("{}[{len}]", kind.name()),
			Self::Struct(layout) => layout.name.to_owned(),
		}
	}

	/// Whether values of this type decode to structs.
	pub fn is_struct(&self) -> bool {
		matches!(self, Self::Struct(_))
	}
}

fn align_up(value: usize, align: usize) -> usize {
	value.div_ceil(align) * align
}
