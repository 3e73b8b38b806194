use serde::ser::{Serialize, SerializeMap, Serializer};

/// Host-side representation of a decoded native value.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
	/// Signed integer.
	I64(i64),
	/// Unsigned integer.
	U64(u64),
	/// Floating point number.
	F64(f64),
	/// Address stored in an embedded pointer field.
	Ptr(u64),
	/// Ordered element sequence.
	Array(Vec<Value>),
	/// Struct with named fields.
	Struct(StructValue),
}

impl Value {
	/// Stable lowercase label for the value kind.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::I64(_) => "int",
			Self::U64(_) => "uint",
			Self::F64(_) => "float",
			Self::Ptr(_) => "pointer",
			Self::Array(_) => "array",
			Self::Struct(_) => "struct",
		}
	}

	/// Integer view, when the value is integral and non-negative.
	pub fn as_u64(&self) -> Option<u64> {
		match *self {
			Self::U64(value) | Self::Ptr(value) => Some(value),
			Self::I64(value) => u64::try_from(value).ok(),
			_ => None,
		}
	}

	/// Integer view, when the value is integral.
	pub fn as_i64(&self) -> Option<i64> {
		match *self {
			Self::I64(value) => Some(value),
			Self::U64(value) => i64::try_from(value).ok(),
			_ => None,
		}
	}

	/// Float view, widening integers.
	pub fn as_f64(&self) -> Option<f64> {
		match *self {
			Self::F64(value) => Some(value),
			Self::I64(value) => Some(value as f64),
			Self::U64(value) => Some(value as f64),
			_ => None,
		}
	}

	/// Struct view.
	pub fn as_struct(&self) -> Option<&StructValue> {
		match self {
			Self::Struct(item) => Some(item),
			_ => None,
		}
	}

	/// Array view.
	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Self::Array(items) => Some(items),
			_ => None,
		}
	}
}

impl From<u8> for Value {
	fn from(value: u8) -> Self {
		Self::U64(u64::from(value))
	}
}

impl From<u16> for Value {
	fn from(value: u16) -> Self {
		Self::U64(u64::from(value))
	}
}

impl From<u32> for Value {
	fn from(value: u32) -> Self {
		Self::U64(u64::from(value))
	}
}

impl From<u64> for Value {
	fn from(value: u64) -> Self {
		Self::U64(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::I64(i64::from(value))
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::I64(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::F64(value)
	}
}

impl From<StructValue> for Value {
	fn from(value: StructValue) -> Self {
		Self::Struct(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Self::Array(value)
	}
}

/// Struct value with fields kept in insertion (declaration) order.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
	/// Native struct type name.
	pub type_name: Box<str>,
	/// Named field values.
	pub fields: Vec<FieldValue>,
}

/// One named field of a struct value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
	/// Field name.
	pub name: Box<str>,
	/// Field value.
	pub value: Value,
}

impl StructValue {
	/// Create an empty struct value of the named type.
	pub fn new(type_name: &str) -> Self {
		Self {
			type_name: type_name.into(),
			fields: Vec::new(),
		}
	}

	/// Builder-style field insert.
	pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
		self.insert(name, value.into());
		self
	}

	/// Look up a field value.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.fields.iter().find(|field| field.name.as_ref() == name).map(|field| &field.value)
	}

	/// Mutable field lookup.
	pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
		self.fields.iter_mut().find(|field| field.name.as_ref() == name).map(|field| &mut field.value)
	}

	/// Overwrite an existing field or append a new one; returns the previous value.
	pub fn insert(&mut self, name: &str, value: Value) -> Option<Value> {
		if let Some(slot) = self.get_mut(name) {
			return Some(std::mem::replace(slot, value));
		}
		self.fields.push(FieldValue { name: name.into(), value });
		None
	}

	/// Field names in order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.fields.iter().map(|field| field.name.as_ref())
	}

	/// Number of fields present.
	pub fn len(&self) -> usize {
		self.fields.len()
	}

	/// Whether no fields are present.
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}
}

impl Serialize for StructValue {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.fields.len()))?;
		for field in &self.fields {
			map.serialize_entry(field.name.as_ref(), &field.value)?;
		}
		map.end()
	}
}
