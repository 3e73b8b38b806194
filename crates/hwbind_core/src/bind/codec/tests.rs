use crate::bind::codec::{NativeValue, pack, pack_struct, scalar_from_raw, unpack};
use crate::bind::types::{FieldDescriptor, FieldType, ScalarKind, StructLayout, TypeDescriptor};
use crate::bind::value::{StructValue, Value};
use crate::bind::{ArrayCapacity, BindError};

static MIXER: StructLayout = StructLayout {
	name: "Mixer",
	fields: &[
		FieldDescriptor::new("Freq", FieldType::Scalar(ScalarKind::F64)),
		FieldDescriptor::new("Mode", FieldType::Scalar(ScalarKind::U32)),
		FieldDescriptor::new("Offset", FieldType::Scalar(ScalarKind::I32)),
	],
};

static STATUS: StructLayout = StructLayout {
	name: "Status",
	fields: &[
		FieldDescriptor::new("Enabled", FieldType::Scalar(ScalarKind::U16)),
		FieldDescriptor::new("Mixers", FieldType::StructArray(&MIXER, 2)),
		FieldDescriptor::new("Words", FieldType::Array(ScalarKind::U8, 3)),
		FieldDescriptor::new("Table", FieldType::Pointer(ScalarKind::U32)),
		FieldDescriptor::new("Inner", FieldType::Struct(&MIXER)),
	],
};

fn mixer(freq: f64, mode: u32, offset: i32) -> StructValue {
	StructValue::new("Mixer").with("Freq", freq).with("Mode", mode).with("Offset", offset)
}

#[test]
fn nested_struct_round_trips_byte_for_byte() {
	let value = StructValue::new("Status")
		.with("Enabled", 1_u16)
		.with("Mixers", Value::Array(vec![mixer(1.5, 2, -3).into(), mixer(-0.25, 7, 9).into()]))
		.with("Words", Value::Array(vec![Value::U64(1), Value::U64(2), Value::U64(255)]))
		.with("Table", Value::Ptr(0xDEAD_0000))
		.with("Inner", mixer(100.0, 1, 0));

	let native = pack_struct(&STATUS, &value).expect("packs");
	assert_eq!(native.as_bytes().len(), STATUS.size());

	let decoded = unpack(TypeDescriptor::Struct(&STATUS), &native).expect("unpacks");
	let decoded_struct = decoded.as_struct().expect("struct");
	assert_eq!(decoded_struct.get("Enabled"), Some(&Value::U64(1)));
	assert_eq!(decoded_struct.get("Table"), Some(&Value::Ptr(0xDEAD_0000)));
	let mixers = decoded_struct.get("Mixers").and_then(Value::as_array).expect("mixers");
	assert_eq!(mixers[1].as_struct().and_then(|item| item.get("Offset")), Some(&Value::I64(9)));

	let repacked = pack(TypeDescriptor::Struct(&STATUS), &decoded).expect("repacks");
	assert_eq!(repacked, native);
}

#[test]
fn arbitrary_native_bytes_round_trip() {
	let ty = TypeDescriptor::Struct(&MIXER);
	let bytes: Vec<u8> = (0..MIXER.size() as u8).map(|byte| byte.wrapping_mul(37)).collect();
	let native = NativeValue::from_bytes(ty, bytes).expect("sized");
	let decoded = native.decode().expect("decodes");
	let repacked = pack(ty, &decoded).expect("repacks");
	// Padding bytes are not round-tripped; Mixer has none.
	assert_eq!(repacked.as_bytes(), native.as_bytes());
}

#[test]
fn absent_fields_stay_zeroed() {
	let native = pack_struct(&MIXER, &StructValue::new("Mixer").with("Mode", 5_u32)).expect("packs");
	let decoded = native.decode().expect("decodes");
	let decoded = decoded.as_struct().expect("struct");
	assert_eq!(decoded.get("Freq"), Some(&Value::F64(0.0)));
	assert_eq!(decoded.get("Mode"), Some(&Value::U64(5)));
}

#[test]
fn unknown_key_is_rejected() {
	let err = pack_struct(&MIXER, &StructValue::new("Mixer").with("Phase", 1_u32)).expect_err("unknown field");
	assert!(matches!(err, BindError::UnknownField { ref field, .. } if field == "Phase"));
}

#[test]
fn fixed_array_length_must_match() {
	let value = StructValue::new("Status").with("Words", Value::Array(vec![Value::U64(1)]));
	let err = pack_struct(&STATUS, &value).expect_err("short array");
	assert!(matches!(
		err,
		BindError::ArrayLengthMismatch {
			expected: ArrayCapacity::Fixed(3),
			got: 1,
			..
		}
	));
}

#[test]
fn sequence_for_pointer_field_needs_pool() {
	let value = StructValue::new("Status").with("Table", Value::Array(vec![Value::U64(1), Value::U64(2)]));
	let err = pack_struct(&STATUS, &value).expect_err("sequence for pointer");
	assert!(matches!(
		err,
		BindError::ArrayLengthMismatch {
			expected: ArrayCapacity::Unallocated,
			got: 2,
			..
		}
	));
}

#[test]
fn scalars_are_range_checked() {
	let err = pack(TypeDescriptor::Scalar(ScalarKind::U8), &Value::U64(256)).expect_err("too wide");
	assert!(matches!(err, BindError::ValueOutOfRange { kind: "u8", .. }));

	let err = pack(TypeDescriptor::Scalar(ScalarKind::U32), &Value::I64(-1)).expect_err("negative");
	assert!(matches!(err, BindError::ValueOutOfRange { kind: "u32", .. }));

	let err = pack(TypeDescriptor::Scalar(ScalarKind::U32), &Value::F64(1.0)).expect_err("float for int");
	assert!(matches!(err, BindError::TypeMismatch { expected: "integer", .. }));

	let native = pack(TypeDescriptor::Scalar(ScalarKind::I32), &Value::I64(-20)).expect("fits");
	assert_eq!(native.as_bytes(), (-20_i32).to_le_bytes());
}

#[test]
fn size_mismatch_is_reported() {
	let native = NativeValue::zeroed(TypeDescriptor::Scalar(ScalarKind::U16));
	let err = unpack(TypeDescriptor::Struct(&MIXER), &native).expect_err("wrong size");
	assert!(matches!(err, BindError::NativeSizeMismatch { need: 16, have: 2, .. }));

	let err = NativeValue::from_bytes(TypeDescriptor::Scalar(ScalarKind::U32), vec![0; 3]).expect_err("short");
	assert!(matches!(err, BindError::NativeSizeMismatch { need: 4, have: 3, .. }));
}

#[test]
fn raw_integer_returns_decode_by_kind() {
	assert_eq!(scalar_from_raw(ScalarKind::U32, 7).expect("u32"), Value::U64(7));
	assert_eq!(scalar_from_raw(ScalarKind::I32, -4).expect("int"), Value::I64(-4));
	assert!(scalar_from_raw(ScalarKind::U16, 70_000).is_err());
}
