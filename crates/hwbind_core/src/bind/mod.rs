/// Hierarchy nodes and the device choke point.
pub mod address;
/// Bounded little-endian cursors over native storage.
pub mod bytes;
/// Callable surface trait and checked invocation.
pub mod call;
/// C-layout pack/unpack.
pub mod codec;
/// Hardware description parsing and driver bring-up.
pub mod descriptor;
/// Error and result types.
pub mod error;
/// Descriptor text grammars.
pub mod grammar;
/// Backing array ownership for packed structs.
pub mod pool;
/// Declarative property tables.
pub mod property;
/// Closure-backed callable surface.
pub mod scripted;
/// Native type descriptors and struct layout.
pub mod types;
/// Host value model.
pub mod value;
/// Struct values that push edits back to hardware.
pub mod write_through;

/// Node addressing and shared device state.
pub use address::{Addressed, Addressing, CallPath, DeviceCore, HandleKind, Node};
/// Invocation entry points and surface abstraction.
pub use call::{Arg, Convention, Handle, NativeReturn, NativeSurface, invoke};
/// Packing and unpacking helpers.
pub use codec::{NativeValue, pack, pack_struct, scalar_from_raw, unpack};
/// Description parsing and device initialization.
pub use descriptor::{
	ConfigField, ConfigSource, Description, DriverInit, Initialized, extract_code_table, extract_config, initialize, populate,
};
/// Error and result types.
pub use error::{ArrayCapacity, BindError, Result};
/// Grammar entry points and parsed tables.
pub use grammar::{CodeParams, CodeTable, ParamValue, ParsedConfig, ValueKind, parse_code_table, parse_config_table, parse_value};
/// Backing array pool.
pub use pool::{ArrayPool, BackingArray, PackedStruct, StructKey};
/// Property catalog types.
pub use property::{
	Access, AccessMode, ArrayAccess, ArrayDescriptor, ArrayProperty, CallStyle, InScope, Property, PropertyAccess,
	PropertyDescriptor, PropertyValue, ReadOnly, ReadWrite, Readable, WriteOnly, Writable,
};
/// Scripted surface for tests and host-side simulation.
pub use scripted::{CallLog, CallRecord, RecordedArg, ScriptedSurface};
/// Type descriptors.
pub use types::{FieldDescriptor, FieldType, POINTER_SIZE, PlacedField, ScalarKind, StructLayout, TypeDescriptor};
/// Host values.
pub use value::{FieldValue, StructValue, Value};
/// Write-through wrapper.
pub use write_through::{WriteBack, WriteThroughValue};

pub(crate) use property::property_table;
