use tracing::debug;

use crate::bind::codec::NativeValue;
use crate::bind::{BindError, Result};

/// Opaque handle identifying a driver instance or mapped register window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub u64);

/// One positional argument passed to a native entry point.
#[derive(Debug)]
pub enum Arg<'a> {
	/// Instance or base-address handle.
	Handle(Handle),
	/// Integer passed by value.
	Int(i64),
	/// Value passed by value (scalars) or by const pointer (structs, arrays).
	In(&'a NativeValue),
	/// Caller-owned output buffer the entry point fills.
	Out(&'a mut NativeValue),
}

impl Arg<'_> {
	/// Output buffer view.
	pub fn as_out(&mut self) -> Option<&mut NativeValue> {
		match self {
			Self::Out(value) => Some(value),
			_ => None,
		}
	}
}

/// Raw result of one native invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeReturn {
	/// Entry point returns nothing.
	Void,
	/// Integer return (status code or direct value).
	Int(i64),
	/// Struct or array returned by value.
	Value(NativeValue),
}

impl NativeReturn {
	/// Stable lowercase label for the return kind.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Void => "void",
			Self::Int(_) => "int",
			Self::Value(_) => "value",
		}
	}
}

/// How an entry point's return value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
	/// Return is a status code; non-zero is failure.
	Status,
	/// Return is passed through uninspected.
	Value,
}

/// Native driver's table of entry points, addressed by name.
pub trait NativeSurface {
	/// Whether `name` resolves in this build of the driver.
	fn has_entry(&self, name: &str) -> bool;

	/// Invoke a resolved entry point.
	fn call(&mut self, name: &str, args: &mut [Arg<'_>]) -> NativeReturn;

	/// Allocate host-owned storage for a driver instance struct.
	fn alloc_instance(&mut self, type_name: &'static str) -> Handle;

	/// Drain console output the driver produced since the last call.
	fn take_output(&mut self) -> Option<String> {
		None
	}
}

/// Invoke `name` once, checking that it exists and, for status calls, that it succeeded.
pub fn invoke(surface: &mut dyn NativeSurface, name: &str, args: &mut [Arg<'_>], convention: Convention) -> Result<NativeReturn> {
	if !surface.has_entry(name) {
		return Err(BindError::MissingEntryPoint { name: name.to_owned() });
	}

	debug!(entry = name, args = args.len(), "native call");
	let ret = surface.call(name, args);
	if let Some(output) = surface.take_output() {
		debug!(entry = name, %output, "native output");
	}

	match convention {
		Convention::Value => Ok(ret),
		Convention::Status => match ret {
			NativeReturn::Void | NativeReturn::Int(0) => Ok(ret),
			NativeReturn::Int(code) => Err(BindError::NativeFailure { name: name.to_owned(), code }),
			NativeReturn::Value(_) => Err(BindError::UnexpectedReturn {
				name: name.to_owned(),
				expected: "status",
				got: ret.kind(),
			}),
		},
	}
}
