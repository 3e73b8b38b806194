use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::bind::call::{Arg, Handle, NativeReturn, NativeSurface};
use crate::bind::codec::NativeValue;
use crate::bind::types::TypeDescriptor;

type EntryFn = Box<dyn FnMut(&mut [Arg<'_>]) -> NativeReturn>;

/// In-process callable surface whose entry points are closures.
///
/// Every invocation is recorded in a shared [`CallLog`], so a test can hand the
/// surface to a device and still inspect the traffic afterwards.
pub struct ScriptedSurface {
	entries: HashMap<String, EntryFn>,
	log: CallLog,
	next_handle: u64,
	pending_output: Option<String>,
}

/// Snapshot of one argument as seen by the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedArg {
	/// Handle argument.
	Handle(Handle),
	/// Integer argument.
	Int(i64),
	/// Copy of an input value.
	In(NativeValue),
	/// Output buffer, recorded by type.
	Out(TypeDescriptor),
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
	/// Entry point name.
	pub name: String,
	/// Arguments in positional order.
	pub args: Vec<RecordedArg>,
}

impl CallRecord {
	/// Integer arguments in order, skipping handles and buffers.
	pub fn ints(&self) -> Vec<i64> {
		self.args
			.iter()
			.filter_map(|arg| match arg {
				RecordedArg::Int(value) => Some(*value),
				_ => None,
			})
			.collect()
	}

	/// First input value argument.
	pub fn input(&self) -> Option<&NativeValue> {
		self.args.iter().find_map(|arg| match arg {
			RecordedArg::In(value) => Some(value),
			_ => None,
		})
	}
}

/// Shared, cloneable record of surface invocations.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<CallRecord>>>);

impl CallLog {
	/// All records so far.
	pub fn records(&self) -> Vec<CallRecord> {
		self.0.borrow().clone()
	}

	/// Records for one entry point.
	pub fn calls_to(&self, name: &str) -> Vec<CallRecord> {
		self.0.borrow().iter().filter(|record| record.name == name).cloned().collect()
	}

	/// Number of records so far.
	pub fn len(&self) -> usize {
		self.0.borrow().len()
	}

	/// Whether nothing was recorded.
	pub fn is_empty(&self) -> bool {
		self.0.borrow().is_empty()
	}

	fn push(&self, record: CallRecord) {
		self.0.borrow_mut().push(record);
	}
}

impl Default for ScriptedSurface {
	fn default() -> Self {
		Self::new()
	}
}

impl ScriptedSurface {
	/// Create a surface with no entry points.
	pub fn new() -> Self {
		Self {
			entries: HashMap::new(),
			log: CallLog::default(),
			next_handle: 0x1000,
			pending_output: None,
		}
	}

	/// Shared log handle.
	pub fn log(&self) -> CallLog {
		self.log.clone()
	}

	/// Define an entry point backed by a closure.
	pub fn define(&mut self, name: &str, entry: impl FnMut(&mut [Arg<'_>]) -> NativeReturn + 'static) -> &mut Self {
		self.entries.insert(name.to_owned(), Box::new(entry));
		self
	}

	/// Define an entry point that always returns `status`.
	pub fn define_status(&mut self, name: &str, status: i64) -> &mut Self {
		self.define(name, move |_| NativeReturn::Int(status))
	}

	/// Define a getter that fills its trailing output buffer with `value`.
	pub fn define_output(&mut self, name: &str, value: NativeValue) -> &mut Self {
		self.define(name, move |args| {
			if let Some(out) = args.last_mut().and_then(|arg| arg.as_out()) {
				if out.overwrite(&value).is_err() {
					return NativeReturn::Int(-1);
				}
			}
			NativeReturn::Int(0)
		})
	}

	/// Queue console output to be drained after the next call.
	pub fn emit_output(&mut self, text: &str) {
		self.pending_output = Some(text.to_owned());
	}
}

impl NativeSurface for ScriptedSurface {
	fn has_entry(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	fn call(&mut self, name: &str, args: &mut [Arg<'_>]) -> NativeReturn {
		let recorded = args
			.iter()
			.map(|arg| match arg {
				Arg::Handle(handle) => RecordedArg::Handle(*handle),
				Arg::Int(value) => RecordedArg::Int(*value),
				Arg::In(value) => RecordedArg::In((*value).clone()),
				Arg::Out(value) => RecordedArg::Out(value.ty()),
			})
			.collect();
		self.log.push(CallRecord {
			name: name.to_owned(),
			args: recorded,
		});

		match self.entries.get_mut(name) {
			Some(entry) => entry(args),
			None => NativeReturn::Int(-1),
		}
	}

	fn alloc_instance(&mut self, _type_name: &'static str) -> Handle {
		let handle = Handle(self.next_handle);
		self.next_handle += 0x1000;
		handle
	}

	fn take_output(&mut self) -> Option<String> {
		self.pending_output.take()
	}
}
