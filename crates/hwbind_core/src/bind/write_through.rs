use std::fmt;

use crate::bind::Result;
use crate::bind::codec::pack_struct;
use crate::bind::types::StructLayout;
use crate::bind::value::{StructValue, Value};

/// Callback fired with the full current value after every mutation.
pub type WriteBack = Box<dyn FnMut(&StructValue) -> Result<()>>;

/// Decoded struct whose mutations are pushed back to the hardware.
///
/// Reads behave like plain mapping access. Each [`set`](Self::set) updates the
/// field locally and then calls the registered write-back exactly once.
pub struct WriteThroughValue {
	layout: &'static StructLayout,
	value: StructValue,
	write_back: Option<WriteBack>,
}

impl WriteThroughValue {
	/// Wrap a decoded value without a write-back.
	pub fn new(layout: &'static StructLayout, value: StructValue) -> Self {
		Self {
			layout,
			value,
			write_back: None,
		}
	}

	/// Register the write-back, replacing any previous one.
	pub fn set_callback(&mut self, write_back: impl FnMut(&StructValue) -> Result<()> + 'static) {
		self.write_back = Some(Box::new(write_back));
	}

	/// Builder-style [`set_callback`](Self::set_callback).
	pub fn with_callback(mut self, write_back: impl FnMut(&StructValue) -> Result<()> + 'static) -> Self {
		self.set_callback(write_back);
		self
	}

	/// Whether a write-back is registered.
	pub fn has_callback(&self) -> bool {
		self.write_back.is_some()
	}

	/// Field value by name.
	pub fn get(&self, field: &str) -> Option<&Value> {
		self.value.get(field)
	}

	/// Current value snapshot.
	pub fn value(&self) -> &StructValue {
		&self.value
	}

	/// Unwrap into the plain value, dropping the write-back.
	pub fn into_value(self) -> StructValue {
		self.value
	}

	/// Set one field and write the whole value back.
	///
	/// The candidate is packed against the field's layout first, so an
	/// undeclared field or an unencodable value is rejected before anything
	/// changes. A failing write-back leaves the local edit in place and
	/// returns its error.
	pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<()> {
		let value = value.into();
		pack_struct(self.layout, &StructValue::new(self.layout.name).with(field, value.clone()))?;
		self.value.insert(field, value);
		self.fire()
	}

	/// Apply `pairs` in order, one [`set`](Self::set) each.
	pub fn update<I, K, V>(&mut self, pairs: I) -> Result<()>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: Into<Value>,
	{
		for (field, value) in pairs {
			self.set(field.as_ref(), value)?;
		}
		Ok(())
	}

	/// Swap in a whole new value and write it back once.
	pub fn replace(&mut self, value: StructValue) -> Result<()> {
		pack_struct(self.layout, &value)?;
		self.value = value;
		self.fire()
	}

	fn fire(&mut self) -> Result<()> {
		match self.write_back.as_mut() {
			Some(write_back) => write_back(&self.value),
			None => Ok(()),
		}
	}
}

impl fmt::Debug for WriteThroughValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WriteThroughValue")
			.field("layout", &self.layout.name)
			.field("value", &self.value)
			.field("write_back", &self.write_back.is_some())
			.finish()
	}
}

impl PartialEq<StructValue> for WriteThroughValue {
	fn eq(&self, other: &StructValue) -> bool {
		&self.value == other
	}
}
