use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::bind::Result;
use crate::bind::call::{self, Arg, Convention, Handle, NativeReturn, NativeSurface};

/// Whether an entry point takes the tile type discriminant ahead of the indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
	/// `[type, tile, block]`.
	Explicit,
	/// `[tile, block]`, for entry points that only exist for one tile kind.
	Implicit,
}

/// Which root handle leads the argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
	/// Driver instance struct.
	Instance,
	/// Mapped register window.
	BaseAddress,
	/// No handle; the entry point is a free function.
	None,
}

/// Positional addressing arguments of one hierarchy node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallPath {
	type_tag: Option<u32>,
	indices: Vec<usize>,
}

impl CallPath {
	/// Path of the device itself.
	pub fn root() -> Self {
		Self::default()
	}

	/// Path of a tile with the given type discriminant and index.
	pub fn tile(type_tag: u32, index: usize) -> Self {
		Self {
			type_tag: Some(type_tag),
			indices: vec![index],
		}
	}

	/// Path of a child at `index` below this node.
	pub fn child(&self, index: usize) -> Self {
		let mut indices = self.indices.clone();
		indices.push(index);
		Self {
			type_tag: self.type_tag,
			indices,
		}
	}

	/// Integer arguments this path contributes under `addressing`.
	pub fn arguments(&self, addressing: Addressing) -> Vec<i64> {
		let tag = match addressing {
			Addressing::Explicit => self.type_tag.map(i64::from),
			Addressing::Implicit => None,
		};
		tag.into_iter().chain(self.indices.iter().map(|&index| index as i64)).collect()
	}
}

/// State shared by every node of one device: the surface, its symbol prefix, and the root handles.
pub struct DeviceCore {
	surface: RefCell<Box<dyn NativeSurface>>,
	prefix: &'static str,
	instance: Handle,
	base_address: Handle,
}

impl DeviceCore {
	/// Bundle a surface with the handles of one initialized driver instance.
	pub fn new(surface: Box<dyn NativeSurface>, prefix: &'static str, instance: Handle, base_address: Handle) -> Rc<Self> {
		Rc::new(Self {
			surface: RefCell::new(surface),
			prefix,
			instance,
			base_address,
		})
	}

	/// Register window handle.
	pub fn base_address(&self) -> Handle {
		self.base_address
	}

	/// Fully prefixed symbol for `name`.
	pub fn symbol(&self, name: &str) -> String {
		format!("{}{name}", self.prefix)
	}

	/// Invoke `name` in the driver namespace.
	pub fn invoke(&self, name: &str, args: &mut [Arg<'_>], convention: Convention) -> Result<NativeReturn> {
		let symbol = self.symbol(name);
		let mut surface = self.surface.borrow_mut();
		call::invoke(surface.as_mut(), &symbol, args, convention)
	}

	fn handle(&self, kind: HandleKind) -> Option<Handle> {
		match kind {
			HandleKind::Instance => Some(self.instance),
			HandleKind::BaseAddress => Some(self.base_address),
			HandleKind::None => None,
		}
	}
}

impl fmt::Debug for DeviceCore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DeviceCore")
			.field("prefix", &self.prefix)
			.field("instance", &self.instance)
			.field("base_address", &self.base_address)
			.finish_non_exhaustive()
	}
}

/// One entity in the device → tile → block tree.
#[derive(Debug, Clone)]
pub struct Node {
	core: Rc<DeviceCore>,
	path: CallPath,
}

impl Node {
	/// Device-level node.
	pub fn root(core: Rc<DeviceCore>) -> Self {
		Self {
			core,
			path: CallPath::root(),
		}
	}

	/// Node sharing this node's device with its own path.
	pub fn with_path(&self, path: CallPath) -> Self {
		Self {
			core: Rc::clone(&self.core),
			path,
		}
	}

	/// Shared device state.
	pub fn core(&self) -> &Rc<DeviceCore> {
		&self.core
	}

	/// Precomputed call path.
	pub fn path(&self) -> &CallPath {
		&self.path
	}

	/// Invoke `name` as `[handle?, path..., tail...]`.
	pub fn route<'a>(
		&self,
		name: &str,
		handle: HandleKind,
		addressing: Addressing,
		tail: impl IntoIterator<Item = Arg<'a>>,
		convention: Convention,
	) -> Result<NativeReturn> {
		let mut args: Vec<Arg<'a>> = self.core.handle(handle).map(Arg::Handle).into_iter().collect();
		args.extend(self.path.arguments(addressing).into_iter().map(Arg::Int));
		args.extend(tail);
		self.core.invoke(name, &mut args, convention)
	}

	/// Status call with the instance handle and explicit addressing.
	pub fn call<'a>(&self, name: &str, tail: impl IntoIterator<Item = Arg<'a>>) -> Result<()> {
		self.route(name, HandleKind::Instance, Addressing::Explicit, tail, Convention::Status)
			.map(drop)
	}

	/// Status call with the instance handle and implicit addressing.
	pub fn call_implicit<'a>(&self, name: &str, tail: impl IntoIterator<Item = Arg<'a>>) -> Result<()> {
		self.route(name, HandleKind::Instance, Addressing::Implicit, tail, Convention::Status)
			.map(drop)
	}
}

/// Anything that sits at a node of the hierarchy.
pub trait Addressed {
	/// The entity's node.
	fn node(&self) -> &Node;
}

impl Addressed for Node {
	fn node(&self) -> &Node {
		self
	}
}

#[cfg(test)]
mod tests {
	use super::{Addressing, CallPath, DeviceCore, Node};
	use crate::bind::BindError;
	use crate::bind::call::{Arg, Handle};
	use crate::bind::scripted::{RecordedArg, ScriptedSurface};

	fn block_node(surface: ScriptedSurface) -> Node {
		let core = DeviceCore::new(Box::new(surface), "XDev_", Handle(0x10), Handle(0x20));
		let root = Node::root(core);
		let tile = root.with_path(CallPath::tile(7, 2));
		tile.with_path(tile.path().child(3))
	}

	#[test]
	fn path_arguments_follow_addressing() {
		let path = CallPath::tile(1, 2).child(3);
		assert_eq!(path.arguments(Addressing::Explicit), vec![1, 2, 3]);
		assert_eq!(path.arguments(Addressing::Implicit), vec![2, 3]);
		assert!(CallPath::root().arguments(Addressing::Explicit).is_empty());
	}

	#[test]
	fn explicit_call_sends_type_then_indices() {
		let mut surface = ScriptedSurface::new();
		surface.define_status("XDev_Foo", 0);
		let log = surface.log();
		let block = block_node(surface);

		block.call("Foo", [Arg::Int(42)]).expect("call succeeds");

		let calls = log.calls_to("XDev_Foo");
		assert_eq!(calls.len(), 1);
		assert_eq!(calls[0].args[0], RecordedArg::Handle(Handle(0x10)));
		assert_eq!(calls[0].ints(), vec![7, 2, 3, 42]);
	}

	#[test]
	fn implicit_call_drops_type() {
		let mut surface = ScriptedSurface::new();
		surface.define_status("XDev_Foo", 0);
		let log = surface.log();
		let block = block_node(surface);

		block.call_implicit("Foo", [Arg::Int(42)]).expect("call succeeds");

		assert_eq!(log.calls_to("XDev_Foo")[0].ints(), vec![2, 3, 42]);
	}

	#[test]
	fn missing_entry_is_reported_with_prefixed_name() {
		let block = block_node(ScriptedSurface::new());
		let err = block.call("Bar", []).expect_err("no such entry");
		assert!(matches!(err, BindError::MissingEntryPoint { ref name } if name == "XDev_Bar"));
	}

	#[test]
	fn non_zero_status_fails() {
		let mut surface = ScriptedSurface::new();
		surface.define_status("XDev_Foo", 3);
		let block = block_node(surface);
		let err = block.call("Foo", []).expect_err("status fails");
		assert!(matches!(err, BindError::NativeFailure { code: 3, .. }));
	}
}
