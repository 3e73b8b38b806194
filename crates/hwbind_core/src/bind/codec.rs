use crate::bind::bytes::{Cursor, CursorMut};
use crate::bind::types::{FieldType, ScalarKind, StructLayout, TypeDescriptor};
use crate::bind::value::{FieldValue, StructValue, Value};
use crate::bind::{ArrayCapacity, BindError, Result};

/// Owned C-layout storage tagged with its type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeValue {
	ty: TypeDescriptor,
	bytes: Vec<u8>,
}

impl NativeValue {
	/// Allocate zero-initialized storage for `ty`.
	pub fn zeroed(ty: TypeDescriptor) -> Self {
		Self {
			ty,
			bytes: vec![0; ty.size()],
		}
	}

	/// Wrap existing bytes, checking their length against `ty`.
	pub fn from_bytes(ty: TypeDescriptor, bytes: Vec<u8>) -> Result<Self> {
		check_size(&ty, bytes.len())?;
		Ok(Self { ty, bytes })
	}

	/// Type descriptor of the storage.
	pub fn ty(&self) -> TypeDescriptor {
		self.ty
	}

	/// Raw bytes.
	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Mutable raw bytes.
	pub fn as_bytes_mut(&mut self) -> &mut [u8] {
		&mut self.bytes
	}

	/// Address of the first byte, as the native side sees it.
	pub fn address(&self) -> u64 {
		if self.bytes.is_empty() {
			return 0;
		}
		self.bytes.as_ptr() as u64
	}

	/// Copy another value's bytes into this storage.
	pub fn overwrite(&mut self, src: &NativeValue) -> Result<()> {
		check_size(&self.ty, src.bytes.len())?;
		self.bytes.copy_from_slice(&src.bytes);
		Ok(())
	}

	/// Decode this storage using its own type descriptor.
	pub fn decode(&self) -> Result<Value> {
		unpack(self.ty, self)
	}
}

/// Pack a host value into native storage for `ty`.
///
/// Struct fields absent from the value stay zeroed. Variable-length fields only
/// accept addresses here; sequences for them must go through [`crate::bind::ArrayPool`].
pub fn pack(ty: TypeDescriptor, value: &Value) -> Result<NativeValue> {
	let mut native = NativeValue::zeroed(ty);
	match ty {
		TypeDescriptor::Scalar(kind) => write_scalar(&mut native.bytes, 0, kind, value)?,
		TypeDescriptor::Array(kind, len) => {
			let items = expect_array(value)?;
			check_fixed_len(&ty.name(), len, items.len())?;
			write_scalars(&mut native.bytes, 0, kind, items)?;
		}
		TypeDescriptor::Struct(layout) => {
			let item = value.as_struct().ok_or(BindError::TypeMismatch {
				expected: "struct",
				got: value.kind(),
			})?;
			write_struct(&mut native.bytes, 0, layout, item)?;
		}
	}
	Ok(native)
}

/// Pack a struct value without wrapping it in [`Value`].
pub fn pack_struct(layout: &'static StructLayout, value: &StructValue) -> Result<NativeValue> {
	let mut native = NativeValue::zeroed(TypeDescriptor::Struct(layout));
	write_struct(&mut native.bytes, 0, layout, value)?;
	Ok(native)
}

/// Decode native storage into a host value.
pub fn unpack(ty: TypeDescriptor, native: &NativeValue) -> Result<Value> {
	check_size(&ty, native.bytes.len())?;
	match ty {
		TypeDescriptor::Scalar(kind) => read_scalar(&mut Cursor::new(&native.bytes), kind),
		TypeDescriptor::Array(kind, len) => read_scalars(&mut Cursor::new(&native.bytes), kind, len),
		TypeDescriptor::Struct(layout) => Ok(Value::Struct(read_struct(&native.bytes, 0, layout)?)),
	}
}

/// Convert a raw integer return into a value of `kind`.
pub fn scalar_from_raw(kind: ScalarKind, raw: i64) -> Result<Value> {
	let value = Value::I64(raw);
	let mut buf = [0_u8; 8];
	write_scalar(&mut buf, 0, kind, &value)?;
	read_scalar(&mut Cursor::new(&buf), kind)
}

fn check_size(ty: &TypeDescriptor, have: usize) -> Result<()> {
	let need = ty.size();
	if need != have {
		return Err(BindError::NativeSizeMismatch {
			type_name: ty.name(),
			need,
			have,
		});
	}
	Ok(())
}

fn check_fixed_len(field: &str, expected: usize, got: usize) -> Result<()> {
	if expected != got {
		return Err(BindError::ArrayLengthMismatch {
			field: field.to_owned(),
			expected: ArrayCapacity::Fixed(expected),
			got,
		});
	}
	Ok(())
}

fn expect_array(value: &Value) -> Result<&[Value]> {
	value.as_array().ok_or(BindError::TypeMismatch {
		expected: "array",
		got: value.kind(),
	})
}

fn write_struct(bytes: &mut [u8], base: usize, layout: &'static StructLayout, value: &StructValue) -> Result<()> {
	let placed = layout.placed();
	for field in &value.fields {
		let Some(slot) = placed.iter().find(|slot| slot.field.name == field.name.as_ref()) else {
			return Err(BindError::UnknownField {
				type_name: layout.name.to_owned(),
				field: field.name.to_string(),
			});
		};
		write_field(bytes, base + slot.offset, slot.field.name, slot.field.ty, &field.value)?;
	}
	Ok(())
}

fn write_field(bytes: &mut [u8], at: usize, name: &str, ty: FieldType, value: &Value) -> Result<()> {
	match ty {
		FieldType::Scalar(kind) => write_scalar(bytes, at, kind, value),
		FieldType::Array(kind, len) => {
			let items = expect_array(value)?;
			check_fixed_len(name, len, items.len())?;
			write_scalars(bytes, at, kind, items)
		}
		FieldType::Pointer(_) => match value {
			Value::Ptr(addr) => CursorMut::at(bytes, at).write_all(&addr.to_le_bytes()),
			Value::Array(items) => Err(BindError::ArrayLengthMismatch {
				field: name.to_owned(),
				expected: ArrayCapacity::Unallocated,
				got: items.len(),
			}),
			other => Err(BindError::TypeMismatch {
				expected: "pointer",
				got: other.kind(),
			}),
		},
		FieldType::Struct(layout) => {
			let item = value.as_struct().ok_or(BindError::TypeMismatch {
				expected: "struct",
				got: value.kind(),
			})?;
			write_struct(bytes, at, layout, item)
		}
		FieldType::StructArray(layout, len) => {
			let items = expect_array(value)?;
			check_fixed_len(name, len, items.len())?;
			let stride = layout.size();
			for (idx, item) in items.iter().enumerate() {
				let item = item.as_struct().ok_or(BindError::TypeMismatch {
					expected: "struct",
					got: item.kind(),
				})?;
				write_struct(bytes, at + idx * stride, layout, item)?;
			}
			Ok(())
		}
	}
}

fn write_scalars(bytes: &mut [u8], at: usize, kind: ScalarKind, items: &[Value]) -> Result<()> {
	for (idx, item) in items.iter().enumerate() {
		write_scalar(bytes, at + idx * kind.size(), kind, item)?;
	}
	Ok(())
}

fn write_scalar(bytes: &mut [u8], at: usize, kind: ScalarKind, value: &Value) -> Result<()> {
	let mut out = CursorMut::at(bytes, at);
	match kind {
		ScalarKind::U8 => out.write_all(&[unsigned_in_range::<u8>(kind, value)?]),
		ScalarKind::U16 => out.write_all(&unsigned_in_range::<u16>(kind, value)?.to_le_bytes()),
		ScalarKind::U32 => out.write_all(&unsigned_in_range::<u32>(kind, value)?.to_le_bytes()),
		ScalarKind::U64 => out.write_all(&unsigned_in_range::<u64>(kind, value)?.to_le_bytes()),
		ScalarKind::I32 => {
			let raw = integral(value)?;
			let narrowed = i32::try_from(raw).map_err(|_| out_of_range(kind, value))?;
			out.write_all(&narrowed.to_le_bytes())
		}
		ScalarKind::F64 => {
			let raw = value.as_f64().ok_or(BindError::TypeMismatch {
				expected: "number",
				got: value.kind(),
			})?;
			out.write_all(&raw.to_le_bytes())
		}
	}
}

fn integral(value: &Value) -> Result<i128> {
	match *value {
		Value::I64(raw) => Ok(i128::from(raw)),
		Value::U64(raw) => Ok(i128::from(raw)),
		_ => Err(BindError::TypeMismatch {
			expected: "integer",
			got: value.kind(),
		}),
	}
}

fn unsigned_in_range<T: TryFrom<i128>>(kind: ScalarKind, value: &Value) -> Result<T> {
	let raw = integral(value)?;
	T::try_from(raw).map_err(|_| out_of_range(kind, value))
}

fn out_of_range(kind: ScalarKind, value: &Value) -> BindError {
	BindError::ValueOutOfRange {
		kind: kind.name(),
		value: format!("{value:?}"),
	}
}

fn read_struct(bytes: &[u8], base: usize, layout: &'static StructLayout) -> Result<StructValue> {
	let placed = layout.placed();
	let mut fields = Vec::with_capacity(placed.len());
	for slot in placed {
		let value = read_field(bytes, base + slot.offset, slot.field.ty)?;
		fields.push(FieldValue {
			name: slot.field.name.into(),
			value,
		});
	}
	Ok(StructValue {
		type_name: layout.name.into(),
		fields,
	})
}

fn read_field(bytes: &[u8], at: usize, ty: FieldType) -> Result<Value> {
	match ty {
		FieldType::Scalar(kind) => read_scalar(&mut Cursor::at(bytes, at), kind),
		FieldType::Array(kind, len) => read_scalars(&mut Cursor::at(bytes, at), kind, len),
		FieldType::Pointer(_) => Ok(Value::Ptr(Cursor::at(bytes, at).read_u64_le()?)),
		FieldType::Struct(layout) => Ok(Value::Struct(read_struct(bytes, at, layout)?)),
		FieldType::StructArray(layout, len) => {
			let stride = layout.size();
			let mut out = Vec::with_capacity(len);
			for idx in 0..len {
				out.push(Value::Struct(read_struct(bytes, at + idx * stride, layout)?));
			}
			Ok(Value::Array(out))
		}
	}
}

fn read_scalars(cursor: &mut Cursor<'_>, kind: ScalarKind, count: usize) -> Result<Value> {
	let mut values = Vec::with_capacity(count);
	for _ in 0..count {
		values.push(read_scalar(cursor, kind)?);
	}
	Ok(Value::Array(values))
}

fn read_scalar(cursor: &mut Cursor<'_>, kind: ScalarKind) -> Result<Value> {
	Ok(match kind {
		ScalarKind::U8 => Value::U64(u64::from(cursor.read_u8()?)),
		ScalarKind::U16 => Value::U64(u64::from(cursor.read_u16_le()?)),
		ScalarKind::U32 => Value::U64(u64::from(cursor.read_u32_le()?)),
		ScalarKind::U64 => Value::U64(cursor.read_u64_le()?),
		ScalarKind::I32 => Value::I64(i64::from(cursor.read_i32_le()?)),
		ScalarKind::F64 => Value::F64(cursor.read_f64_le()?),
	})
}

#[cfg(test)]
mod tests;
