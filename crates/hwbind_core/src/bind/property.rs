use std::fmt;
use std::marker::PhantomData;

use crate::bind::address::{Addressed, Addressing, HandleKind, Node};
use crate::bind::call::{Arg, Convention, NativeReturn};
use crate::bind::codec::{self, NativeValue};
use crate::bind::types::{ScalarKind, TypeDescriptor};
use crate::bind::value::{StructValue, Value};
use crate::bind::write_through::WriteThroughValue;
use crate::bind::{ArrayCapacity, BindError, Result};

/// Access mode of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Access {
	/// Getter only.
	ReadOnly,
	/// Setter only.
	WriteOnly,
	/// Getter and setter.
	ReadWrite,
}

/// Naming and argument convention of a property's entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStyle {
	/// `Get<name>(instance, path..., &mut out)` / `Set<name>(instance, path..., value)`.
	OutParam,
	/// `Get_<name>(base)` returning the value / `Set_<name>(base, value)`.
	Register,
}

/// Declarative description of one property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyDescriptor {
	/// Native name without prefix or accessor verb.
	pub name: &'static str,
	/// Native value shape.
	pub ty: TypeDescriptor,
	/// Access mode.
	pub access: Access,
	/// Whether the tile type discriminant is passed.
	pub addressing: Addressing,
	/// Entry point convention.
	pub style: CallStyle,
}

impl PropertyDescriptor {
	/// Out-parameter property with explicit addressing.
	pub const fn new(name: &'static str, ty: TypeDescriptor, access: Access) -> Self {
		Self {
			name,
			ty,
			access,
			addressing: Addressing::Explicit,
			style: CallStyle::OutParam,
		}
	}

	/// Same property, addressed without the tile type.
	pub const fn implicit(mut self) -> Self {
		self.addressing = Addressing::Implicit;
		self
	}

	/// Same property, using register-style entry points.
	pub const fn register(mut self) -> Self {
		self.style = CallStyle::Register;
		self
	}

	/// Getter entry point name.
	pub fn getter(&self) -> String {
		match self.style {
			CallStyle::OutParam => format!("Get{}", self.name),
			CallStyle::Register => format!("Get_{}", self.name),
		}
	}

	/// Setter entry point name.
	pub fn setter(&self) -> String {
		match self.style {
			CallStyle::OutParam => format!("Set{}", self.name),
			CallStyle::Register => format!("Set_{}", self.name),
		}
	}

	fn handle(&self) -> HandleKind {
		match self.style {
			CallStyle::OutParam => HandleKind::Instance,
			CallStyle::Register => HandleKind::BaseAddress,
		}
	}
}

/// Marker for [`Access::ReadOnly`].
#[derive(Debug, Clone, Copy)]
pub struct ReadOnly;
/// Marker for [`Access::WriteOnly`].
#[derive(Debug, Clone, Copy)]
pub struct WriteOnly;
/// Marker for [`Access::ReadWrite`].
#[derive(Debug, Clone, Copy)]
pub struct ReadWrite;

/// Type-level access mode.
pub trait AccessMode {
	/// Runtime counterpart.
	const ACCESS: Access;
}

/// Access modes that expose a getter.
pub trait Readable: AccessMode {}

/// Access modes that expose a setter.
pub trait Writable: AccessMode {}

impl AccessMode for ReadOnly {
	const ACCESS: Access = Access::ReadOnly;
}

impl AccessMode for WriteOnly {
	const ACCESS: Access = Access::WriteOnly;
}

impl AccessMode for ReadWrite {
	const ACCESS: Access = Access::ReadWrite;
}

impl Readable for ReadOnly {}
impl Readable for ReadWrite {}
impl Writable for WriteOnly {}
impl Writable for ReadWrite {}

/// Entity types that carry properties of scope `S`.
pub trait InScope<S> {}

/// Typed accessor constant for one property of scope `S`.
pub struct Property<S, A> {
	desc: PropertyDescriptor,
	_marker: PhantomData<fn() -> (S, A)>,
}

impl<S, A: AccessMode> Property<S, A> {
	/// Build an accessor; the descriptor's access must match `A`.
	pub const fn generate(desc: PropertyDescriptor) -> Self {
		assert!(desc.access as u8 == A::ACCESS as u8, "descriptor access does not match accessor type");
		Self {
			desc,
			_marker: PhantomData,
		}
	}

	/// Underlying descriptor.
	pub const fn descriptor(&self) -> PropertyDescriptor {
		self.desc
	}
}

impl<S, A> fmt::Debug for Property<S, A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Property").field(&self.desc).finish()
	}
}

/// Result of reading a property.
#[derive(Debug)]
pub enum PropertyValue {
	/// Scalar or array.
	Plain(Value),
	/// Struct; mutations go back to the hardware when the property is writable.
	Struct(WriteThroughValue),
}

impl PropertyValue {
	/// Plain value view.
	pub fn as_value(&self) -> Option<&Value> {
		match self {
			Self::Plain(value) => Some(value),
			Self::Struct(_) => None,
		}
	}

	/// Unsigned integer view of a plain value.
	pub fn as_u64(&self) -> Option<u64> {
		self.as_value().and_then(Value::as_u64)
	}

	/// Signed integer view of a plain value.
	pub fn as_i64(&self) -> Option<i64> {
		self.as_value().and_then(Value::as_i64)
	}

	/// Struct view.
	pub fn as_struct(&self) -> Option<&WriteThroughValue> {
		match self {
			Self::Struct(value) => Some(value),
			Self::Plain(_) => None,
		}
	}

	/// Mutable struct view.
	pub fn as_struct_mut(&mut self) -> Option<&mut WriteThroughValue> {
		match self {
			Self::Struct(value) => Some(value),
			Self::Plain(_) => None,
		}
	}

	/// Detach into a plain [`Value`].
	pub fn into_value(self) -> Value {
		match self {
			Self::Plain(value) => value,
			Self::Struct(value) => Value::Struct(value.into_value()),
		}
	}
}

/// Property getters and setters for any addressed entity.
pub trait PropertyAccess: Addressed {
	/// Read a property.
	fn get<S, A>(&self, property: &Property<S, A>) -> Result<PropertyValue>
	where
		Self: InScope<S>,
		A: Readable,
	{
		read_property(self.node(), property.descriptor())
	}

	/// Write a property.
	fn set<S, A>(&self, property: &Property<S, A>, value: impl Into<Value>) -> Result<()>
	where
		Self: InScope<S>,
		A: Writable,
	{
		write_property(self.node(), &property.descriptor(), &value.into())
	}
}

impl<T: Addressed + ?Sized> PropertyAccess for T {}

fn read_property(node: &Node, desc: PropertyDescriptor) -> Result<PropertyValue> {
	let value = read_raw(node, &desc)?;
	let TypeDescriptor::Struct(layout) = desc.ty else {
		return Ok(PropertyValue::Plain(value));
	};
	let Value::Struct(item) = value else {
		return Err(BindError::TypeMismatch {
			expected: "struct",
			got: value.kind(),
		});
	};

	let mut wrapped = WriteThroughValue::new(layout, item);
	if desc.access == Access::ReadWrite {
		let node = node.clone();
		wrapped.set_callback(move |value: &StructValue| write_property(&node, &desc, &Value::Struct(value.clone())));
	}
	Ok(PropertyValue::Struct(wrapped))
}

fn read_raw(node: &Node, desc: &PropertyDescriptor) -> Result<Value> {
	let getter = desc.getter();
	match desc.style {
		CallStyle::OutParam => {
			let mut out = NativeValue::zeroed(desc.ty);
			node.route(&getter, desc.handle(), desc.addressing, [Arg::Out(&mut out)], Convention::Status)?;
			out.decode()
		}
		CallStyle::Register => {
			let ret = node.route(&getter, desc.handle(), desc.addressing, [], Convention::Value)?;
			match (ret, desc.ty) {
				(NativeReturn::Int(raw), TypeDescriptor::Scalar(kind)) => codec::scalar_from_raw(kind, raw),
				(NativeReturn::Value(native), ty) => codec::unpack(ty, &native),
				(other, _) => Err(BindError::UnexpectedReturn {
					name: node.core().symbol(&getter),
					expected: "value",
					got: other.kind(),
				}),
			}
		}
	}
}

fn write_property(node: &Node, desc: &PropertyDescriptor, value: &Value) -> Result<()> {
	let native = codec::pack(desc.ty, value)?;
	node.route(&desc.setter(), desc.handle(), desc.addressing, [Arg::In(&native)], Convention::Status)
		.map(drop)
}

/// Register window transferred as a block of words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayDescriptor {
	/// Native name without prefix, verb, or `_Words` suffix.
	pub name: &'static str,
	/// Element kind.
	pub kind: ScalarKind,
	/// Window size in elements.
	pub capacity: usize,
	/// Access mode.
	pub access: Access,
}

impl ArrayDescriptor {
	/// `Read_<name>_Words`.
	pub fn reader(&self) -> String {
		format!("Read_{}_Words", self.name)
	}

	/// `Write_<name>_Words`.
	pub fn writer(&self) -> String {
		format!("Write_{}_Words", self.name)
	}
}

/// Typed accessor constant for an array-valued register window.
pub struct ArrayProperty<S, A> {
	desc: ArrayDescriptor,
	_marker: PhantomData<fn() -> (S, A)>,
}

impl<S, A: AccessMode> ArrayProperty<S, A> {
	/// Declare a window of `bytes` bytes holding `kind` elements.
	pub const fn words(name: &'static str, bytes: usize, kind: ScalarKind) -> Self {
		assert!(bytes % kind.size() == 0, "array window size is not a whole number of elements");
		Self {
			desc: ArrayDescriptor {
				name,
				kind,
				capacity: bytes / kind.size(),
				access: A::ACCESS,
			},
			_marker: PhantomData,
		}
	}

	/// Underlying descriptor.
	pub const fn descriptor(&self) -> ArrayDescriptor {
		self.desc
	}
}

impl<S, A> fmt::Debug for ArrayProperty<S, A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ArrayProperty").field(&self.desc).finish()
	}
}

/// Word-block reads and writes for any addressed entity.
pub trait ArrayAccess: Addressed {
	/// Read the words the driver reports as valid, starting at word 0.
	fn read_words<S, A>(&self, property: &ArrayProperty<S, A>) -> Result<Vec<Value>>
	where
		Self: InScope<S>,
		A: Readable,
	{
		read_array(self.node(), &property.descriptor())
	}

	/// Write `words` starting at word 0.
	fn write_words<S, A, I>(&self, property: &ArrayProperty<S, A>, words: I) -> Result<()>
	where
		Self: InScope<S>,
		A: Writable,
		I: IntoIterator,
		I::Item: Into<Value>,
	{
		let words: Vec<Value> = words.into_iter().map(Into::into).collect();
		write_array(self.node(), &property.descriptor(), words)
	}
}

impl<T: Addressed + ?Sized> ArrayAccess for T {}

fn read_array(node: &Node, desc: &ArrayDescriptor) -> Result<Vec<Value>> {
	let reader = desc.reader();
	let mut buf = NativeValue::zeroed(TypeDescriptor::Array(desc.kind, desc.capacity));
	let ret = node.route(
		&reader,
		HandleKind::BaseAddress,
		Addressing::Explicit,
		[Arg::Int(0), Arg::Out(&mut buf), Arg::Int(desc.capacity as i64)],
		Convention::Value,
	)?;

	let count = match ret {
		NativeReturn::Int(count) if count >= 0 => count as usize,
		NativeReturn::Int(code) => {
			return Err(BindError::NativeFailure {
				name: node.core().symbol(&reader),
				code,
			});
		}
		other => {
			return Err(BindError::UnexpectedReturn {
				name: node.core().symbol(&reader),
				expected: "int",
				got: other.kind(),
			});
		}
	};
	if count > desc.capacity {
		return Err(BindError::ArrayLengthMismatch {
			field: desc.name.to_owned(),
			expected: ArrayCapacity::AtMost(desc.capacity),
			got: count,
		});
	}

	let Value::Array(mut words) = buf.decode()? else {
		return Err(BindError::TypeMismatch {
			expected: "array",
			got: "scalar",
		});
	};
	words.truncate(count);
	Ok(words)
}

fn write_array(node: &Node, desc: &ArrayDescriptor, words: Vec<Value>) -> Result<()> {
	if words.len() > desc.capacity {
		return Err(BindError::ArrayLengthMismatch {
			field: desc.name.to_owned(),
			expected: ArrayCapacity::AtMost(desc.capacity),
			got: words.len(),
		});
	}

	let len = words.len();
	let native = codec::pack(TypeDescriptor::Array(desc.kind, len), &Value::Array(words))?;
	node.route(
		&desc.writer(),
		HandleKind::BaseAddress,
		Addressing::Explicit,
		[Arg::Int(0), Arg::In(&native), Arg::Int(len as i64)],
		Convention::Value,
	)
	.map(drop)
}

/// Declare a module of typed property constants.
///
/// ```text
/// property_table! {
///     /// Properties every block has.
///     pub mod block: BlockScope {
///         /// Nyquist zone.
///         NYQUIST_ZONE = "NyquistZone": TypeDescriptor::Scalar(ScalarKind::U32), RW;
///         DECIMATION = "DecimationFactor": TypeDescriptor::Scalar(ScalarKind::U32), RW, implicit;
///     }
/// }
///
/// property_table! {
///     pub mod arrays: CoreScope, words {
///         SC_TABLE = "LDPC_SC_TABLE": 256 bytes of U32, RW;
///     }
/// }
/// ```
///
/// The generated module glob-imports its parent, so layouts and scope markers
/// declared there can be named directly. Trailing flags (`implicit`, `register`)
/// are applied to the descriptor in order.
macro_rules! property_table {
	(@access RO) => { $crate::bind::ReadOnly };
	(@access WO) => { $crate::bind::WriteOnly };
	(@access RW) => { $crate::bind::ReadWrite };
	(@mode RO) => { $crate::bind::Access::ReadOnly };
	(@mode WO) => { $crate::bind::Access::WriteOnly };
	(@mode RW) => { $crate::bind::Access::ReadWrite };

	(
		$(#[$module_doc:meta])*
		$vis:vis mod $module:ident: $scope:ty, words {
			$(
				$(#[$doc:meta])*
				$konst:ident = $name:literal: $bytes:literal bytes of $kind:ident, $rw:ident;
			)*
		}
	) => {
		$(#[$module_doc])*
		$vis mod $module {
			#[allow(unused_imports)]
			use super::*;

			$(
				$(#[$doc])*
				pub const $konst: $crate::bind::ArrayProperty<$scope, $crate::bind::property_table!(@access $rw)> =
					$crate::bind::ArrayProperty::words($name, $bytes, $crate::bind::ScalarKind::$kind);
			)*

			/// Every array declared in this table.
			pub const DESCRIPTORS: &[$crate::bind::ArrayDescriptor] = &[$($konst.descriptor()),*];
		}
	};

	(
		$(#[$module_doc:meta])*
		$vis:vis mod $module:ident: $scope:ty {
			$(
				$(#[$doc:meta])*
				$konst:ident = $name:literal: $ty:expr, $rw:ident $(, $flag:ident)*;
			)*
		}
	) => {
		$(#[$module_doc])*
		$vis mod $module {
			#[allow(unused_imports)]
			use super::*;

			$(
				$(#[$doc])*
				pub const $konst: $crate::bind::Property<$scope, $crate::bind::property_table!(@access $rw)> =
					$crate::bind::Property::generate(
						$crate::bind::PropertyDescriptor::new(
							$name,
							$ty,
							$crate::bind::property_table!(@mode $rw),
						)
						$(.$flag())*
					);
			)*

			/// Every property declared in this table.
			pub const DESCRIPTORS: &[$crate::bind::PropertyDescriptor] = &[$($konst.descriptor()),*];
		}
	};
}

pub(crate) use property_table;
