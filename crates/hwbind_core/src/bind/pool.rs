use std::collections::HashMap;

use crate::bind::codec::{self, NativeValue};
use crate::bind::types::{FieldType, StructLayout, TypeDescriptor};
use crate::bind::value::{StructValue, Value};
use crate::bind::{BindError, Result};

/// Identity of a packed struct, derived from its storage address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructKey(u64);

impl StructKey {
	/// Key for the struct stored in `native`.
	pub fn of(native: &NativeValue) -> Self {
		Self(native.address())
	}
}

/// Variable-length scalar array referenced by address from a packed struct.
pub type BackingArray = NativeValue;

/// Ownership record from packed structs to the backing arrays they point into.
///
/// Arrays live here, not in the caller, so their heap storage cannot be
/// reclaimed while a struct that embeds their address is still in flight.
#[derive(Debug, Default)]
pub struct ArrayPool {
	pinned: HashMap<StructKey, Vec<BackingArray>>,
}

/// Packed struct whose backing arrays are pinned in an [`ArrayPool`].
#[must_use = "pinned arrays stay alive until the key is released"]
#[derive(Debug)]
pub struct PackedStruct {
	native: NativeValue,
	key: StructKey,
}

impl PackedStruct {
	/// Packed native storage.
	pub fn native(&self) -> &NativeValue {
		&self.native
	}

	/// Pool key holding this struct's arrays.
	pub fn key(&self) -> StructKey {
		self.key
	}
}

impl ArrayPool {
	/// Create an empty pool.
	pub fn new() -> Self {
		Self::default()
	}

	/// Record that `key` depends on `arrays`; repeated pins accumulate.
	pub fn pin(&mut self, key: StructKey, arrays: Vec<BackingArray>) {
		self.pinned.entry(key).or_default().extend(arrays);
	}

	/// Drop the record for `key`, handing its arrays back.
	pub fn release(&mut self, key: StructKey) -> Option<Vec<BackingArray>> {
		self.pinned.remove(&key)
	}

	/// Whether `key` currently pins anything.
	pub fn is_pinned(&self, key: StructKey) -> bool {
		self.pinned.contains_key(&key)
	}

	/// Arrays pinned for `key`.
	pub fn arrays(&self, key: StructKey) -> Option<&[BackingArray]> {
		self.pinned.get(&key).map(Vec::as_slice)
	}

	/// Number of pinned structs.
	pub fn len(&self) -> usize {
		self.pinned.len()
	}

	/// Whether nothing is pinned.
	pub fn is_empty(&self) -> bool {
		self.pinned.is_empty()
	}

	/// Pack `value`, allocating a fresh backing array for every variable-length field
	/// given a sequence (a scalar becomes a one-element array), and pin those arrays.
	pub fn pack(&mut self, layout: &'static StructLayout, value: &StructValue) -> Result<PackedStruct> {
		let mut flushed = value.clone();
		let mut arrays = Vec::new();

		for field in &mut flushed.fields {
			let Some(slot) = layout.field(&field.name) else {
				return Err(BindError::UnknownField {
					type_name: layout.name.to_owned(),
					field: field.name.to_string(),
				});
			};
			let FieldType::Pointer(kind) = slot.field.ty else {
				continue;
			};

			let items = match &field.value {
				Value::Array(items) => items.clone(),
				Value::Ptr(_) => continue,
				scalar => vec![scalar.clone()],
			};
			let array = codec::pack(TypeDescriptor::Array(kind, items.len()), &Value::Array(items))?;
			field.value = Value::Ptr(array.address());
			arrays.push(array);
		}

		let native = codec::pack_struct(layout, &flushed)?;
		let key = StructKey::of(&native);
		self.pin(key, arrays);
		Ok(PackedStruct { native, key })
	}
}

#[cfg(test)]
mod tests {
	use super::{ArrayPool, StructKey};
	use crate::bind::codec::{self, NativeValue};
	use crate::bind::types::{FieldDescriptor, FieldType, ScalarKind, StructLayout, TypeDescriptor};
	use crate::bind::value::{StructValue, Value};

	static TABLES: StructLayout = StructLayout {
		name: "Tables",
		fields: &[
			FieldDescriptor::new("N", FieldType::Scalar(ScalarKind::U32)),
			FieldDescriptor::new("SCTable", FieldType::Pointer(ScalarKind::U32)),
			FieldDescriptor::new("LATable", FieldType::Pointer(ScalarKind::U32)),
		],
	};

	#[test]
	fn pinned_array_outlives_caller_scope() {
		let mut pool = ArrayPool::new();
		let owner = NativeValue::zeroed(TypeDescriptor::Scalar(ScalarKind::U32));
		let key = StructKey::of(&owner);

		let address = {
			let array = codec::pack(
				TypeDescriptor::Array(ScalarKind::U32, 3),
				&Value::Array(vec![Value::U64(7), Value::U64(8), Value::U64(9)]),
			)
			.expect("array packs");
			let address = array.address();
			pool.pin(key, vec![array]);
			address
		};

		let arrays = pool.arrays(key).expect("key is pinned");
		assert_eq!(arrays[0].address(), address);
		assert_eq!(arrays[0].as_bytes()[..4], 7_u32.to_le_bytes());

		let released = pool.release(key).expect("release returns arrays");
		assert_eq!(released.len(), 1);
		assert!(!pool.is_pinned(key));
		assert!(pool.release(key).is_none());
	}

	#[test]
	fn pack_allocates_and_points_at_backing_arrays() {
		let mut pool = ArrayPool::new();
		let value = StructValue::new("Tables")
			.with("N", 4_u32)
			.with("SCTable", Value::Array(vec![Value::U64(1), Value::U64(2)]))
			.with("LATable", 5_u32);

		let packed = pool.pack(&TABLES, &value).expect("struct packs");
		let arrays = pool.arrays(packed.key()).expect("arrays pinned");
		assert_eq!(arrays.len(), 2);

		let decoded = packed.native().decode().expect("decodes");
		let decoded = decoded.as_struct().expect("struct");
		assert_eq!(decoded.get("SCTable"), Some(&Value::Ptr(arrays[0].address())));
		assert_eq!(decoded.get("LATable"), Some(&Value::Ptr(arrays[1].address())));
		assert_eq!(arrays[1].decode().expect("decodes"), Value::Array(vec![Value::U64(5)]));

		pool.release(packed.key());
		assert!(pool.is_empty());
	}

	#[test]
	fn pack_rejects_unknown_keys_without_pinning() {
		let mut pool = ArrayPool::new();
		let value = StructValue::new("Tables").with("Bogus", 1_u32);
		let err = pool.pack(&TABLES, &value).expect_err("unknown key fails");
		assert!(matches!(err, crate::bind::BindError::UnknownField { .. }));
		assert!(pool.is_empty());
	}
}
