//! Soft-decision forward error correction core: LDPC code provisioning plus
//! register-level access to the core's control words and code memories.
//!
//! ```
//! use hwbind::bind::{Description, Handle, ScriptedSurface};
//! use hwbind::sdfec::{SdFec, TableOffsets};
//!
//! let mut surface = ScriptedSurface::new();
//! surface.define_status("XSdFecCfgInitialize", 0);
//! surface.define_status("XSdFecAddLdpcParams", 0);
//!
//! let description = Description::with_parameters([
//!     ("DRV_STANDARD", "1"),
//!     ("DRV_LDPC_PARAMS", "docsis_short { k 840 n 1120 p 56 sc_table {8 8} }"),
//! ]);
//! let fec = SdFec::new(Box::new(surface), &description, Handle(0xA020_0000))?;
//! assert_eq!(fec.available_ldpc_params(), ["docsis_short"]);
//! fec.add_ldpc_params(0, TableOffsets::default(), "docsis_short")?;
//! # Ok::<(), hwbind::bind::BindError>(())
//! ```

use std::cell::RefCell;

use serde::Serialize;
use tracing::debug;

use crate::bind::{
	Addressed, Addressing, ArrayPool, Arg, BindError, CodeTable, ConfigSource, Convention, Description, DriverInit, Handle, HandleKind, InScope,
	NativeReturn, NativeSurface, NativeValue, Node, Result, ScalarKind, StructValue, TypeDescriptor, Value, extract_code_table,
	extract_config, initialize, pack_struct, populate, property_table, unpack,
};

mod types;

pub use types::*;

static DRIVER: DriverInit = DriverInit {
	prefix: "XSdFec",
	instance_type: "XSdFec",
	config: &XSDFEC_CONFIG,
	base_field: "BaseAddress",
};

/// Scope of the core's register properties.
pub struct CoreScope;

property_table! {
	/// Control and status registers, accessed through the register window.
	pub mod registers: CoreScope {
		/// AXI-Lite write protection.
		CORE_AXI_WR_PROTECT = "CORE_AXI_WR_PROTECT": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Code memory write protection.
		CORE_CODE_WR_PROTECT = "CORE_CODE_WR_PROTECT": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Non-zero while a block is being processed.
		CORE_ACTIVE = "CORE_ACTIVE": TypeDescriptor::Scalar(ScalarKind::U32), RO, register;
		/// Input data stream width.
		CORE_AXIS_WIDTH_DIN = "CORE_AXIS_WIDTH_DIN": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Input data words per beat.
		CORE_AXIS_WIDTH_DIN_WORDS = "CORE_AXIS_WIDTH_DIN_WORDS": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Output data stream width.
		CORE_AXIS_WIDTH_DOUT = "CORE_AXIS_WIDTH_DOUT": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Output data words per beat.
		CORE_AXIS_WIDTH_DOUT_WORDS = "CORE_AXIS_WIDTH_DOUT_WORDS": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Stream widths, all fields.
		CORE_AXIS_WIDTH = "CORE_AXIS_WIDTH": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Control stream enable.
		CORE_AXIS_ENABLE_CTRL = "CORE_AXIS_ENABLE_CTRL": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Input data stream enable.
		CORE_AXIS_ENABLE_DIN = "CORE_AXIS_ENABLE_DIN": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Input data words stream enable.
		CORE_AXIS_ENABLE_DIN_WORDS = "CORE_AXIS_ENABLE_DIN_WORDS": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Status stream enable.
		CORE_AXIS_ENABLE_STATUS = "CORE_AXIS_ENABLE_STATUS": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Output data stream enable.
		CORE_AXIS_ENABLE_DOUT = "CORE_AXIS_ENABLE_DOUT": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Output data words stream enable.
		CORE_AXIS_ENABLE_DOUT_WORDS = "CORE_AXIS_ENABLE_DOUT_WORDS": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Stream interface enables, all fields.
		CORE_AXIS_ENABLE = "CORE_AXIS_ENABLE": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// In-order or out-of-order block output.
		CORE_ORDER = "CORE_ORDER": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Interrupt status.
		CORE_ISR = "CORE_ISR": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Interrupt enable.
		CORE_IER = "CORE_IER": TypeDescriptor::Scalar(ScalarKind::U32), WO, register;
		/// Interrupt disable.
		CORE_IDR = "CORE_IDR": TypeDescriptor::Scalar(ScalarKind::U32), WO, register;
		/// Interrupt mask.
		CORE_IMR = "CORE_IMR": TypeDescriptor::Scalar(ScalarKind::U32), RO, register;
		/// ECC interrupt status.
		CORE_ECC_ISR = "CORE_ECC_ISR": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// ECC interrupt enable.
		CORE_ECC_IER = "CORE_ECC_IER": TypeDescriptor::Scalar(ScalarKind::U32), WO, register;
		/// ECC interrupt disable.
		CORE_ECC_IDR = "CORE_ECC_IDR": TypeDescriptor::Scalar(ScalarKind::U32), WO, register;
		/// ECC interrupt mask.
		CORE_ECC_IMR = "CORE_ECC_IMR": TypeDescriptor::Scalar(ScalarKind::U32), RO, register;
		/// Pass data through without decoding.
		CORE_BYPASS = "CORE_BYPASS": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Core version.
		CORE_VERSION = "CORE_VERSION": TypeDescriptor::Scalar(ScalarKind::U32), RO, register;
		/// Turbo decode control.
		TURBO = "TURBO": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Turbo decode algorithm.
		TURBO_ALG = "TURBO_ALG": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
		/// Turbo extrinsic scale factor.
		TURBO_SCALE_FACTOR = "TURBO_SCALE_FACTOR": TypeDescriptor::Scalar(ScalarKind::U32), RW, register;
	}
}

property_table! {
	/// LDPC code registers and shared tables, transferred as word blocks.
	pub mod ldpc: CoreScope, words {
		/// Code register 0 of every code slot.
		LDPC_CODE_REG0 = "LDPC_CODE_REG0": 508 bytes of U32, RW;
		/// Codeword length field of code register 0.
		LDPC_CODE_REG0_N = "LDPC_CODE_REG0_N": 508 bytes of U32, RW;
		/// Information length field of code register 0.
		LDPC_CODE_REG0_K = "LDPC_CODE_REG0_K": 508 bytes of U32, RW;
		/// Code register 1 of every code slot.
		LDPC_CODE_REG1 = "LDPC_CODE_REG1": 508 bytes of U32, RW;
		/// Sub-matrix size field of code register 1.
		LDPC_CODE_REG1_PSIZE = "LDPC_CODE_REG1_PSIZE": 508 bytes of U32, RW;
		/// Packing disable field of code register 1.
		LDPC_CODE_REG1_NO_PACKING = "LDPC_CODE_REG1_NO_PACKING": 508 bytes of U32, RW;
		/// Sub-matrix count field of code register 1.
		LDPC_CODE_REG1_NM = "LDPC_CODE_REG1_NM": 508 bytes of U32, RW;
		/// Code register 2 of every code slot.
		LDPC_CODE_REG2 = "LDPC_CODE_REG2": 508 bytes of U32, RW;
		/// Layer count field of code register 2.
		LDPC_CODE_REG2_NLAYERS = "LDPC_CODE_REG2_NLAYERS": 508 bytes of U32, RW;
		/// QC table entries per layer field of code register 2.
		LDPC_CODE_REG2_NMQC = "LDPC_CODE_REG2_NMQC": 508 bytes of U32, RW;
		/// Normalization type field of code register 2.
		LDPC_CODE_REG2_NORM_TYPE = "LDPC_CODE_REG2_NORM_TYPE": 508 bytes of U32, RW;
		/// Special QC field of code register 2.
		LDPC_CODE_REG2_SPECIAL_QC = "LDPC_CODE_REG2_SPECIAL_QC": 508 bytes of U32, RW;
		/// Final parity check disable field of code register 2.
		LDPC_CODE_REG2_NO_FINAL_PARITY_CHECK = "LDPC_CODE_REG2_NO_FINAL_PARITY_CHECK": 508 bytes of U32, RW;
		/// Maximum schedule field of code register 2.
		LDPC_CODE_REG2_MAX_SCHEDULE = "LDPC_CODE_REG2_MAX_SCHEDULE": 508 bytes of U32, RW;
		/// Code register 3 of every code slot.
		LDPC_CODE_REG3 = "LDPC_CODE_REG3": 508 bytes of U32, RW;
		/// Scale table offset field of code register 3.
		LDPC_CODE_REG3_SC_OFF = "LDPC_CODE_REG3_SC_OFF": 508 bytes of U32, RW;
		/// Layer table offset field of code register 3.
		LDPC_CODE_REG3_LA_OFF = "LDPC_CODE_REG3_LA_OFF": 508 bytes of U32, RW;
		/// QC table offset field of code register 3.
		LDPC_CODE_REG3_QC_OFF = "LDPC_CODE_REG3_QC_OFF": 508 bytes of U32, RW;
		/// Scale table.
		LDPC_SC_TABLE = "LDPC_SC_TABLE": 256 bytes of U32, RW;
		/// Layer table.
		LDPC_LA_TABLE = "LDPC_LA_TABLE": 1024 bytes of U32, RW;
		/// Quasi-cyclic table.
		LDPC_QC_TABLE = "LDPC_QC_TABLE": 8192 bytes of U32, RW;
	}
}

/// Word offsets into the shared SC, LA, and QC tables at which a code is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableOffsets {
	/// Scale table offset.
	pub sc: u32,
	/// Layer table offset.
	pub la: u32,
	/// Quasi-cyclic table offset.
	pub qc: u32,
}

/// Shared table space one code occupies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableSizes {
	/// Scale table words.
	pub sc_size: u32,
	/// Layer table words.
	pub la_size: u32,
	/// Quasi-cyclic table words.
	pub qc_size: u32,
}

/// Turbo decoder settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurboParams {
	/// Decode algorithm (0 = max-log-MAP, 1 = max-star).
	pub alg: u32,
	/// Extrinsic scale factor.
	pub scale: u32,
}

/// SD-FEC IP instance.
#[derive(Debug)]
pub struct SdFec {
	node: Node,
	config: StructValue,
	config_source: ConfigSource,
	codes: CodeTable,
	pool: RefCell<ArrayPool>,
}

impl SdFec {
	/// Initialize the driver for the IP described by `description`, mapped at `base_address`.
	///
	/// The code table is parsed here, so a malformed `DRV_LDPC_PARAMS` fails construction.
	pub fn new(surface: Box<dyn NativeSurface>, description: &Description, base_address: Handle) -> Result<Self> {
		let (populated, codes) = match &description.parameters {
			Some(params) => {
				let parsed = extract_config(params, CONFIG_FIELDS, 0)?;
				let config = populate(XSDFEC_CONFIG.name, CONFIG_FIELDS, &parsed, None);
				(Some(config), extract_code_table(params, LDPC_PARAMS_KEY)?)
			}
			None => (None, CodeTable::default()),
		};
		let init = initialize(surface, &DRIVER, populated, base_address)?;

		Ok(Self {
			node: Node::root(init.core),
			config: init.config,
			config_source: init.source,
			codes,
			pool: RefCell::new(ArrayPool::new()),
		})
	}

	/// Configuration passed to `CfgInitialize`.
	pub fn config(&self) -> &StructValue {
		&self.config
	}

	/// Where the configuration came from.
	pub fn config_source(&self) -> ConfigSource {
		self.config_source
	}

	/// Parsed LDPC code table.
	pub fn code_table(&self) -> &CodeTable {
		&self.codes
	}

	/// Names of the LDPC codes the description provides, in descriptor order.
	pub fn available_ldpc_params(&self) -> Vec<&str> {
		self.codes.names().collect()
	}

	/// Load the named code into the core as `code_id`, with its tables at `offsets`.
	pub fn add_ldpc_params(&self, code_id: u32, offsets: TableOffsets, name: &str) -> Result<()> {
		debug!(code = name, code_id, "adding ldpc code");
		self.with_packed_code(name, |params| {
			self.node.call(
				"AddLdpcParams",
				[
					Arg::Int(i64::from(code_id)),
					Arg::Int(i64::from(offsets.sc)),
					Arg::Int(i64::from(offsets.la)),
					Arg::Int(i64::from(offsets.qc)),
					Arg::In(params),
				],
			)
		})
	}

	/// Shared table space the named code needs; useful for laying out offsets.
	pub fn share_table_size(&self, name: &str) -> Result<TableSizes> {
		self.with_packed_code(name, |params| {
			let mut sc = NativeValue::zeroed(TypeDescriptor::Scalar(ScalarKind::U32));
			let mut la = NativeValue::zeroed(TypeDescriptor::Scalar(ScalarKind::U32));
			let mut qc = NativeValue::zeroed(TypeDescriptor::Scalar(ScalarKind::U32));
			self.node.route(
				"ShareTableSize",
				HandleKind::None,
				Addressing::Explicit,
				[Arg::In(params), Arg::Out(&mut sc), Arg::Out(&mut la), Arg::Out(&mut qc)],
				Convention::Status,
			)?;
			Ok(TableSizes {
				sc_size: word(&sc)?,
				la_size: word(&la)?,
				qc_size: word(&qc)?,
			})
		})
	}

	/// Classify the pending interrupt.
	pub fn interrupt_classifier(&self) -> Result<StructValue> {
		let ret = self.node.route(
			"InterruptClassifier",
			HandleKind::Instance,
			Addressing::Explicit,
			[],
			Convention::Value,
		)?;
		let NativeReturn::Value(native) = ret else {
			return Err(BindError::UnexpectedReturn {
				name: self.node.core().symbol("InterruptClassifier"),
				expected: "value",
				got: ret.kind(),
			});
		};
		match unpack(TypeDescriptor::Struct(&XSDFEC_INTERRUPT_CLASS), &native)? {
			Value::Struct(class) => Ok(class),
			other => Err(BindError::TypeMismatch {
				expected: "struct",
				got: other.kind(),
			}),
		}
	}

	/// Configure the turbo decoder.
	pub fn set_turbo_params(&self, params: TurboParams) -> Result<()> {
		let value = StructValue::new(XSDFEC_TURBO_PARAMETERS.name)
			.with("Alg", params.alg)
			.with("Scale", params.scale);
		let native = pack_struct(&XSDFEC_TURBO_PARAMETERS, &value)?;
		self.node.call("SetTurboParams", [Arg::In(&native)])
	}

	/// `XSdFecLdpcParameters` value for the named code, before its tables are allocated.
	pub fn ldpc_params(&self, name: &str) -> Result<StructValue> {
		let code = self.codes.get(name).ok_or_else(|| BindError::UnknownCodeName { name: name.to_owned() })?;
		let mut value = StructValue::new(XSDFEC_LDPC_PARAMETERS.name);
		for (key, field) in LDPC_KEYS {
			if let Some(param) = code.get(*key) {
				value.insert(field, Value::from(param));
			}
		}
		Ok(value)
	}

	fn with_packed_code<T>(&self, name: &str, call: impl FnOnce(&NativeValue) -> Result<T>) -> Result<T> {
		let value = self.ldpc_params(name)?;
		let packed = self.pool.borrow_mut().pack(&XSDFEC_LDPC_PARAMETERS, &value)?;
		let result = call(packed.native());
		self.pool.borrow_mut().release(packed.key());
		result
	}
}

fn word(native: &NativeValue) -> Result<u32> {
	let value = native.decode()?;
	value.as_u64().and_then(|raw| u32::try_from(raw).ok()).ok_or(BindError::TypeMismatch {
		expected: "u32",
		got: value.kind(),
	})
}

impl Addressed for SdFec {
	fn node(&self) -> &Node {
		&self.node
	}
}

impl InScope<CoreScope> for SdFec {}
