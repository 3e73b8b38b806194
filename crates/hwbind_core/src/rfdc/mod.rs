//! RF data converter: a device owning ADC and DAC tiles, each owning converter blocks.
//!
//! ```
//! use hwbind::bind::{Description, Handle, PropertyAccess, ScriptedSurface};
//! use hwbind::rfdc::{RfDc, block};
//!
//! let mut surface = ScriptedSurface::new();
//! surface.define_status("XRFdc_CfgInitialize", 0);
//! surface.define_status("XRFdc_SetNyquistZone", 0);
//!
//! let description = Description::with_parameters([("C_IP_Type", "1")]);
//! let rfdc = RfDc::new(Box::new(surface), &description, Handle(0xA000_0000))?;
//! rfdc.dac_tiles()[0].blocks()[1].set(&block::NYQUIST_ZONE, 2_u32)?;
//! # Ok::<(), hwbind::bind::BindError>(())
//! ```
//!
//! Read-only properties have no setter:
//!
//! ```compile_fail
//! use hwbind::bind::PropertyAccess;
//! use hwbind::rfdc::{RfDc, tile};
//!
//! fn lock(rfdc: &RfDc) {
//!     let _ = rfdc.adc_tiles()[0].set(&tile::PLL_LOCK_STATUS, 1_u32);
//! }
//! ```
//!
//! and ADC-only properties do not exist on DAC blocks:
//!
//! ```compile_fail
//! use hwbind::bind::PropertyAccess;
//! use hwbind::rfdc::{RfDc, adc};
//!
//! fn decimation(rfdc: &RfDc) {
//!     let _ = rfdc.dac_tiles()[0].blocks()[0].get(&adc::DECIMATION_FACTOR);
//! }
//! ```

use std::collections::BTreeMap;
use std::marker::PhantomData;

use tracing::debug;

use crate::bind::{
	Addressed, Arg, CallPath, ConfigSource, Description, DriverInit, Handle, InScope, NativeSurface, Node, Result, ScalarKind,
	StructValue, TypeDescriptor, Value, extract_config, initialize, populate, property_table,
};

mod types;

pub use types::*;

static DRIVER: DriverInit = DriverInit {
	prefix: "XRFdc_",
	instance_type: "XRFdc",
	config: &XRFDC_CONFIG,
	base_field: "BaseAddr",
};

/// Scope of device-level properties.
pub struct DeviceScope;
/// Scope of properties every tile has.
pub struct TileScope;
/// Scope of properties every block has.
pub struct BlockScope;
/// Scope of ADC-only block properties.
pub struct AdcBlockScope;
/// Scope of DAC-only block properties.
pub struct DacBlockScope;

/// Converter direction of a tile or block.
pub trait TileKind {
	/// Tile type discriminant passed under explicit addressing.
	const TYPE: u32;
	/// Short label.
	const NAME: &'static str;
}

/// ADC marker.
#[derive(Debug, Clone, Copy)]
pub struct Adc;
/// DAC marker.
#[derive(Debug, Clone, Copy)]
pub struct Dac;

impl TileKind for Adc {
	const TYPE: u32 = XRFDC_ADC_TILE;
	const NAME: &'static str = "adc";
}

impl TileKind for Dac {
	const TYPE: u32 = XRFDC_DAC_TILE;
	const NAME: &'static str = "dac";
}

property_table! {
	/// Properties every converter block exposes.
	pub mod block: BlockScope {
		/// Sampling frequency and data path status.
		BLOCK_STATUS = "BlockStatus": TypeDescriptor::Struct(&XRFDC_BLOCK_STATUS), RO;
		/// Fine and coarse mixer configuration.
		MIXER_SETTINGS = "MixerSettings": TypeDescriptor::Struct(&XRFDC_MIXER_SETTINGS), RW;
		/// Quadrature modulator correction.
		QMC_SETTINGS = "QMCSettings": TypeDescriptor::Struct(&XRFDC_QMC_SETTINGS), RW;
		/// Coarse delay line.
		COARSE_DELAY_SETTINGS = "CoarseDelaySettings": TypeDescriptor::Struct(&XRFDC_COARSE_DELAY_SETTINGS), RW;
		/// Nyquist zone (1 or 2).
		NYQUIST_ZONE = "NyquistZone": TypeDescriptor::Scalar(ScalarKind::U32), RW;
	}
}

property_table! {
	/// ADC block properties.
	pub mod adc: AdcBlockScope {
		/// Decimation rate.
		DECIMATION_FACTOR = "DecimationFactor": TypeDescriptor::Scalar(ScalarKind::U32), RW, implicit;
		/// Sticky or auto-clear threshold flags.
		THRESHOLD_CLEAR_MODE = "ThresholdClearMode": TypeDescriptor::Scalar(ScalarKind::U32), RW, implicit;
		/// Over/under threshold detectors.
		THRESHOLD_SETTINGS = "ThresholdSettings": TypeDescriptor::Struct(&XRFDC_THRESHOLD_SETTINGS), RW, implicit;
		/// Calibration mode (1 or 2).
		CALIBRATION_MODE = "CalibrationMode": TypeDescriptor::Scalar(ScalarKind::U8), RW, implicit;
		/// Fabric read valid words per cycle.
		FAB_RD_VLD_WORDS = "FabRdVldWords": TypeDescriptor::Scalar(ScalarKind::U32), RW;
	}
}

property_table! {
	/// DAC block properties.
	pub mod dac: DacBlockScope {
		/// Interpolation rate.
		INTERPOLATION_FACTOR = "InterpolationFactor": TypeDescriptor::Scalar(ScalarKind::U32), RW, implicit;
		/// Decoder mode.
		DECODER_MODE = "DecoderMode": TypeDescriptor::Scalar(ScalarKind::U32), RW, implicit;
		/// Output current in microamps.
		OUTPUT_CURR = "OutputCurr": TypeDescriptor::Scalar(ScalarKind::I32), RO, implicit;
		/// Inverse sinc filter enable.
		INV_SINC_FIR = "InvSincFIR": TypeDescriptor::Scalar(ScalarKind::U16), RW, implicit;
		/// Fabric write valid words per cycle.
		FAB_WR_VLD_WORDS = "FabWrVldWords": TypeDescriptor::Scalar(ScalarKind::U32), RW;
	}
}

property_table! {
	/// Tile properties.
	pub mod tile: TileScope {
		/// Fabric clock output divider.
		FAB_CLK_OUT_DIV = "FabClkOutDiv": TypeDescriptor::Scalar(ScalarKind::U16), RW;
		/// FIFO enable state.
		FIFO_STATUS = "FIFOStatus": TypeDescriptor::Scalar(ScalarKind::U8), RO;
		/// One of [`XRF_CLK_SRC_PLL`] or [`XRF_CLK_SRC_EXT`].
		CLOCK_SOURCE = "ClockSource": TypeDescriptor::Scalar(ScalarKind::U32), RO;
		/// PLL lock state.
		PLL_LOCK_STATUS = "PLLLockStatus": TypeDescriptor::Scalar(ScalarKind::U32), RO;
	}
}

property_table! {
	/// Device properties.
	pub mod device: DeviceScope {
		/// Power-up state of every tile.
		IP_STATUS = "IPStatus": TypeDescriptor::Struct(&XRFDC_IP_STATUS), RO;
	}
}

/// One converter channel within a tile.
#[derive(Debug)]
pub struct Block<K> {
	node: Node,
	index: usize,
	_kind: PhantomData<K>,
}

impl<K: TileKind> Block<K> {
	fn new(tile: &Node, index: usize) -> Self {
		Self {
			node: tile.with_path(tile.path().child(index)),
			index,
			_kind: PhantomData,
		}
	}

	/// Index within the tile.
	pub fn index(&self) -> usize {
		self.index
	}

	/// Reset the NCO phase of the block's mixer.
	pub fn reset_nco_phase(&self) -> Result<()> {
		self.node.call("ResetNCOPhase", [])
	}

	/// Apply pending settings for `event` (one of the `XRFDC_EVENT_*` masks).
	pub fn update_event(&self, event: u32) -> Result<()> {
		self.node.call("UpdateEvent", [Arg::Int(i64::from(event))])
	}
}

impl Block<Adc> {
	/// Clear sticky threshold flags (one of the `XRFDC_UPDATE_THRESHOLD_*` selectors).
	pub fn threshold_sticky_clear(&self, threshold: u32) -> Result<()> {
		self.node.call_implicit("ThresholdStickyClear", [Arg::Int(i64::from(threshold))])
	}
}

/// Group of four blocks sharing a clock.
#[derive(Debug)]
pub struct Tile<K> {
	node: Node,
	index: usize,
	blocks: Vec<Block<K>>,
}

impl<K: TileKind> Tile<K> {
	fn new(device: &Node, index: usize) -> Self {
		let node = device.with_path(CallPath::tile(K::TYPE, index));
		let blocks = (0..BLOCK_COUNT).map(|block| Block::new(&node, block)).collect();
		Self { node, index, blocks }
	}

	/// Index within the device.
	pub fn index(&self) -> usize {
		self.index
	}

	/// Blocks in index order.
	pub fn blocks(&self) -> &[Block<K>] {
		&self.blocks
	}

	/// Block at `index`.
	pub fn block(&self, index: usize) -> Option<&Block<K>> {
		self.blocks.get(index)
	}

	/// Run the tile power-on sequence.
	pub fn start_up(&self) -> Result<()> {
		self.node.call("StartUp", [])
	}

	/// Power the tile down.
	pub fn shut_down(&self) -> Result<()> {
		self.node.call("Shutdown", [])
	}

	/// Reset the tile.
	pub fn reset(&self) -> Result<()> {
		self.node.call("Reset", [])
	}

	/// Enable or disable the tile's fabric FIFOs.
	pub fn setup_fifo(&self, enable: bool) -> Result<()> {
		self.node.call("SetupFIFO", [Arg::Int(i64::from(enable))])
	}

	/// Have the driver print the tile's registers.
	pub fn dump_regs(&self) -> Result<()> {
		debug!(kind = K::NAME, tile = self.index, "dumping tile registers");
		self.node.call("DumpRegs", [])
	}
}

/// RF data converter IP instance.
#[derive(Debug)]
pub struct RfDc {
	node: Node,
	config: StructValue,
	config_source: ConfigSource,
	adc_tiles: Vec<Tile<Adc>>,
	dac_tiles: Vec<Tile<Dac>>,
}

impl RfDc {
	/// Initialize the driver for the IP described by `description`, mapped at `base_address`.
	pub fn new(surface: Box<dyn NativeSurface>, description: &Description, base_address: Handle) -> Result<Self> {
		let populated = description.parameters.as_ref().map(populate_config).transpose()?;
		let init = initialize(surface, &DRIVER, populated, base_address)?;

		let node = Node::root(init.core);
		let adc_tiles = (0..TILE_COUNT).map(|index| Tile::new(&node, index)).collect();
		let dac_tiles = (0..TILE_COUNT).map(|index| Tile::new(&node, index)).collect();
		Ok(Self {
			node,
			config: init.config,
			config_source: init.source,
			adc_tiles,
			dac_tiles,
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

	/// ADC tiles in index order.
	pub fn adc_tiles(&self) -> &[Tile<Adc>] {
		&self.adc_tiles
	}

	/// DAC tiles in index order.
	pub fn dac_tiles(&self) -> &[Tile<Dac>] {
		&self.dac_tiles
	}
}

fn populate_config(params: &BTreeMap<String, String>) -> Result<StructValue> {
	let fields: Vec<_> = CONFIG_FIELDS.iter().chain(ADC_TILE_FIELDS).chain(DAC_TILE_FIELDS).copied().collect();
	let parsed = extract_config(params, &fields, TILE_COUNT)?;

	let mut config = populate(XRFDC_CONFIG.name, CONFIG_FIELDS, &parsed, None);
	let dac: Vec<Value> = (0..TILE_COUNT)
		.map(|index| populate(XRFDC_DAC_TILE_CONFIG.name, DAC_TILE_FIELDS, &parsed, Some(index)).into())
		.collect();
	let adc: Vec<Value> = (0..TILE_COUNT)
		.map(|index| populate(XRFDC_ADC_TILE_CONFIG.name, ADC_TILE_FIELDS, &parsed, Some(index)).into())
		.collect();
	config.insert("DACTile_Config", Value::Array(dac));
	config.insert("ADCTile_Config", Value::Array(adc));
	Ok(config)
}

impl Addressed for RfDc {
	fn node(&self) -> &Node {
		&self.node
	}
}

impl<K> Addressed for Tile<K> {
	fn node(&self) -> &Node {
		&self.node
	}
}

impl<K> Addressed for Block<K> {
	fn node(&self) -> &Node {
		&self.node
	}
}

impl InScope<DeviceScope> for RfDc {}
impl<K> InScope<TileScope> for Tile<K> {}
impl<K> InScope<BlockScope> for Block<K> {}
impl InScope<AdcBlockScope> for Block<Adc> {}
impl InScope<DacBlockScope> for Block<Dac> {}

#[cfg(test)]
mod tests;
