use crate::bind::{ConfigField, FieldDescriptor, FieldType, ScalarKind, StructLayout, ValueKind};

/// Tile type discriminant for ADC tiles.
pub const XRFDC_ADC_TILE: u32 = 0;
/// Tile type discriminant for DAC tiles.
pub const XRFDC_DAC_TILE: u32 = 1;

/// Fine mixer mode: complex input, real output.
pub const XRF_DC_FINE_MIXER_MOD_COMPLX_TO_REAL: u32 = 0x2;
/// Coarse mixer frequency: Fs / 2.
pub const XRF_DC_COARSE_MIX_SAMPLE_FREQ_BY_TWO: u32 = 0x2;
/// Coarse mixer mode: complex to complex or real.
pub const XRF_DC_COARSE_MIX_MODE_C2C_C2R: u32 = 0x1;
/// Tile clock sourced from the internal PLL.
pub const XRF_CLK_SRC_PLL: u32 = 0x1;
/// Tile clock sourced externally.
pub const XRF_CLK_SRC_EXT: u32 = 0x2;

/// Update event: mixer settings.
pub const XRFDC_EVENT_MIXER: u32 = 0x1;
/// Update event: coarse delay.
pub const XRFDC_EVENT_CRSE_DLY: u32 = 0x2;
/// Update event: QMC settings.
pub const XRFDC_EVENT_QMC: u32 = 0x4;

/// Threshold selector for sticky clear: threshold 0.
pub const XRFDC_UPDATE_THRESHOLD_0: u32 = 0x1;
/// Threshold selector for sticky clear: threshold 1.
pub const XRFDC_UPDATE_THRESHOLD_1: u32 = 0x2;
/// Threshold selector for sticky clear: both thresholds.
pub const XRFDC_UPDATE_THRESHOLD_BOTH: u32 = 0x4;

/// Tiles per converter kind.
pub const TILE_COUNT: usize = 4;
/// Blocks per tile.
pub const BLOCK_COUNT: usize = 4;

const fn scalar(name: &'static str, kind: ScalarKind) -> FieldDescriptor {
	FieldDescriptor::new(name, FieldType::Scalar(kind))
}

/// `XRFdc_BlockStatus`.
pub static XRFDC_BLOCK_STATUS: StructLayout = StructLayout {
	name: "XRFdc_BlockStatus",
	fields: &[
		scalar("SamplingFreq", ScalarKind::F64),
		scalar("AnalogDataPathStatus", ScalarKind::U32),
		scalar("DigitalDataPathStatus", ScalarKind::U32),
		scalar("DataPathClocksStatus", ScalarKind::U8),
		scalar("IsFIFOFlagsEnabled", ScalarKind::U8),
		scalar("IsFIFOFlagsAsserted", ScalarKind::U8),
	],
};

/// `XRFdc_Mixer_Settings`.
pub static XRFDC_MIXER_SETTINGS: StructLayout = StructLayout {
	name: "XRFdc_Mixer_Settings",
	fields: &[
		scalar("Freq", ScalarKind::F64),
		scalar("PhaseOffset", ScalarKind::F64),
		scalar("EventSource", ScalarKind::U32),
		scalar("CoarseMixFreq", ScalarKind::U32),
		scalar("MixerMode", ScalarKind::U32),
		scalar("FineMixerScale", ScalarKind::U8),
		scalar("MixerType", ScalarKind::U8),
	],
};

/// `XRFdc_QMC_Settings`.
pub static XRFDC_QMC_SETTINGS: StructLayout = StructLayout {
	name: "XRFdc_QMC_Settings",
	fields: &[
		scalar("EnablePhase", ScalarKind::U32),
		scalar("EnableGain", ScalarKind::U32),
		scalar("GainCorrectionFactor", ScalarKind::F64),
		scalar("PhaseCorrectionFactor", ScalarKind::F64),
		scalar("OffsetCorrectionFactor", ScalarKind::I32),
		scalar("EventSource", ScalarKind::U32),
	],
};

/// `XRFdc_CoarseDelay_Settings`.
pub static XRFDC_COARSE_DELAY_SETTINGS: StructLayout = StructLayout {
	name: "XRFdc_CoarseDelay_Settings",
	fields: &[scalar("CoarseDelay", ScalarKind::U32), scalar("EventSource", ScalarKind::U32)],
};

/// `XRFdc_Threshold_Settings`.
pub static XRFDC_THRESHOLD_SETTINGS: StructLayout = StructLayout {
	name: "XRFdc_Threshold_Settings",
	fields: &[
		scalar("UpdateThreshold", ScalarKind::U32),
		FieldDescriptor::new("ThresholdMode", FieldType::Array(ScalarKind::U32, 2)),
		FieldDescriptor::new("ThresholdAvgVal", FieldType::Array(ScalarKind::U32, 2)),
		FieldDescriptor::new("ThresholdUnderVal", FieldType::Array(ScalarKind::U32, 2)),
		FieldDescriptor::new("ThresholdOverVal", FieldType::Array(ScalarKind::U32, 2)),
	],
};

/// `XRFdc_TileStatus`.
pub static XRFDC_TILE_STATUS: StructLayout = StructLayout {
	name: "XRFdc_TileStatus",
	fields: &[
		scalar("IsEnabled", ScalarKind::U32),
		scalar("TileState", ScalarKind::U32),
		scalar("BlockStatusMask", ScalarKind::U8),
		scalar("PowerUpState", ScalarKind::U32),
		scalar("PLLState", ScalarKind::U32),
	],
};

/// `XRFdc_IPStatus`.
pub static XRFDC_IP_STATUS: StructLayout = StructLayout {
	name: "XRFdc_IPStatus",
	fields: &[
		FieldDescriptor::new("DACTileStatus", FieldType::StructArray(&XRFDC_TILE_STATUS, TILE_COUNT)),
		FieldDescriptor::new("ADCTileStatus", FieldType::StructArray(&XRFDC_TILE_STATUS, TILE_COUNT)),
		scalar("State", ScalarKind::U32),
	],
};

const TILE_CONFIG_FIELDS: &[FieldDescriptor] = &[
	scalar("Enable", ScalarKind::U32),
	scalar("PLLEnable", ScalarKind::U32),
	scalar("SamplingRate", ScalarKind::F64),
	scalar("RefClkFreq", ScalarKind::F64),
	scalar("FabClkFreq", ScalarKind::F64),
];

/// `XRFdc_DACTile_Config`.
pub static XRFDC_DAC_TILE_CONFIG: StructLayout = StructLayout {
	name: "XRFdc_DACTile_Config",
	fields: TILE_CONFIG_FIELDS,
};

/// `XRFdc_ADCTile_Config`.
pub static XRFDC_ADC_TILE_CONFIG: StructLayout = StructLayout {
	name: "XRFdc_ADCTile_Config",
	fields: TILE_CONFIG_FIELDS,
};

/// `XRFdc_Config`.
pub static XRFDC_CONFIG: StructLayout = StructLayout {
	name: "XRFdc_Config",
	fields: &[
		scalar("DeviceId", ScalarKind::U32),
		scalar("BaseAddr", ScalarKind::U64),
		scalar("ADCType", ScalarKind::U32),
		scalar("MasterADCTile", ScalarKind::U32),
		scalar("MasterDACTile", ScalarKind::U32),
		scalar("ADCSysRefSource", ScalarKind::U32),
		scalar("DACSysRefSource", ScalarKind::U32),
		scalar("IPType", ScalarKind::U32),
		FieldDescriptor::new("DACTile_Config", FieldType::StructArray(&XRFDC_DAC_TILE_CONFIG, TILE_COUNT)),
		FieldDescriptor::new("ADCTile_Config", FieldType::StructArray(&XRFDC_ADC_TILE_CONFIG, TILE_COUNT)),
	],
};

/// Top-level `XRFdc_Config` fields and their descriptor keys.
pub const CONFIG_FIELDS: &[ConfigField] = &[
	ConfigField::new("ADCType", "C_High_Speed_ADC", ValueKind::Int),
	ConfigField::new("MasterADCTile", "C_Sysref_Master", ValueKind::Int),
	ConfigField::new("MasterDACTile", "C_Sysref_Master", ValueKind::Int),
	ConfigField::new("ADCSysRefSource", "C_Sysref_Source", ValueKind::Int),
	ConfigField::new("DACSysRefSource", "C_Sysref_Source", ValueKind::Int),
	ConfigField::new("IPType", "C_IP_Type", ValueKind::Int),
];

/// Per-tile `XRFdc_ADCTile_Config` fields.
pub const ADC_TILE_FIELDS: &[ConfigField] = &[
	ConfigField::new("Enable", "C_ADC{}_Enable", ValueKind::Int),
	ConfigField::new("PLLEnable", "C_ADC{}_PLL_Enable", ValueKind::Int),
	ConfigField::new("SamplingRate", "C_ADC{}_Sampling_Rate", ValueKind::Float),
	ConfigField::new("RefClkFreq", "C_ADC{}_Refclk_Freq", ValueKind::Float),
	ConfigField::new("FabClkFreq", "C_ADC{}_Fabric_Freq", ValueKind::Float),
];

/// Per-tile `XRFdc_DACTile_Config` fields.
pub const DAC_TILE_FIELDS: &[ConfigField] = &[
	ConfigField::new("Enable", "C_DAC{}_Enable", ValueKind::Int),
	ConfigField::new("PLLEnable", "C_DAC{}_PLL_Enable", ValueKind::Int),
	ConfigField::new("SamplingRate", "C_DAC{}_Sampling_Rate", ValueKind::Float),
	ConfigField::new("RefClkFreq", "C_DAC{}_Refclk_Freq", ValueKind::Float),
	ConfigField::new("FabClkFreq", "C_DAC{}_Fabric_Freq", ValueKind::Float),
];
