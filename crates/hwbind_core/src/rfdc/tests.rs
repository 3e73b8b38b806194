use crate::bind::{
	BindError, CallLog, ConfigSource, Description, Handle, NativeReturn, NativeValue, PropertyAccess, RecordedArg, ScalarKind,
	ScriptedSurface, StructValue, TypeDescriptor, Value, pack_struct,
};
use crate::rfdc::{
	RfDc, XRFDC_ADC_TILE, XRFDC_CONFIG, XRFDC_DAC_TILE, XRFDC_EVENT_MIXER, XRFDC_IP_STATUS, XRFDC_MIXER_SETTINGS,
	XRFDC_UPDATE_THRESHOLD_BOTH, adc, block, dac, device, tile,
};

const INSTANCE: Handle = Handle(0x1000);

fn surface() -> ScriptedSurface {
	let mut surface = ScriptedSurface::new();
	surface.define_status("XRFdc_CfgInitialize", 0);
	surface
}

fn description() -> Description {
	Description::with_parameters([
		("C_IP_Type", "1"),
		("C_High_Speed_ADC", "0"),
		("C_Sysref_Master", "1"),
		("C_ADC0_Enable", "1"),
		("C_ADC0_Sampling_Rate", "4.096"),
		("C_DAC2_Enable", "1"),
		("C_DAC2_Refclk_Freq", "409.6"),
	])
}

fn rfdc(surface: ScriptedSurface) -> (RfDc, CallLog) {
	let log = surface.log();
	let rfdc = RfDc::new(Box::new(surface), &description(), Handle(0xA000_0000)).expect("rfdc initializes");
	(rfdc, log)
}

fn u32_word(value: u32) -> NativeValue {
	NativeValue::from_bytes(TypeDescriptor::Scalar(ScalarKind::U32), value.to_le_bytes().to_vec()).expect("sized")
}

fn tile_config<'a>(config: &'a StructValue, field: &str, index: usize) -> &'a StructValue {
	config
		.get(field)
		.and_then(Value::as_array)
		.and_then(|tiles| tiles[index].as_struct())
		.expect("tile config present")
}

#[test]
fn builds_four_tiles_of_four_blocks_each_way() {
	let (rfdc, _) = rfdc(surface());
	assert_eq!(rfdc.adc_tiles().len(), 4);
	assert_eq!(rfdc.dac_tiles().len(), 4);
	for tile in rfdc.dac_tiles() {
		assert_eq!(tile.blocks().len(), 4);
	}
	assert_eq!(rfdc.adc_tiles()[3].block(2).expect("block exists").index(), 2);
	assert!(rfdc.adc_tiles()[0].block(4).is_none());
}

#[test]
fn description_parameters_reach_cfg_initialize() {
	let (rfdc, log) = rfdc(surface());
	assert_eq!(rfdc.config_source(), ConfigSource::Description);

	let init = log.calls_to("XRFdc_CfgInitialize");
	assert_eq!(init.len(), 1);
	let sent = init[0].input().expect("config passed").decode().expect("decodes");
	let sent = sent.as_struct().expect("struct");
	assert_eq!(sent.get("BaseAddr"), Some(&Value::U64(0xA000_0000)));
	assert_eq!(sent.get("IPType"), Some(&Value::U64(1)));
	assert_eq!(sent.get("MasterDACTile"), Some(&Value::U64(1)));

	let adc0 = tile_config(sent, "ADCTile_Config", 0);
	assert_eq!(adc0.get("Enable"), Some(&Value::U64(1)));
	assert_eq!(adc0.get("SamplingRate"), Some(&Value::F64(4.096)));
	let dac2 = tile_config(sent, "DACTile_Config", 2);
	assert_eq!(dac2.get("RefClkFreq"), Some(&Value::F64(409.6)));
	assert_eq!(tile_config(sent, "DACTile_Config", 1).get("Enable"), Some(&Value::U64(0)));
}

#[test]
fn missing_parameters_use_driver_default() {
	let mut surface = surface();
	let default = pack_struct(&XRFDC_CONFIG, &StructValue::new("XRFdc_Config").with("IPType", 2_u32)).expect("packs");
	surface.define("XRFdc_LookupConfig", move |_| NativeReturn::Value(default.clone()));
	let log = surface.log();

	let rfdc = RfDc::new(Box::new(surface), &Description::default(), Handle(0xB000)).expect("rfdc initializes");
	assert_eq!(rfdc.config_source(), ConfigSource::Default);
	assert_eq!(rfdc.config().get("IPType"), Some(&Value::U64(2)));
	assert_eq!(log.calls_to("XRFdc_LookupConfig").len(), 1);
}

#[test]
fn malformed_parameter_aborts_construction() {
	let description = Description::with_parameters([("C_ADC0_Sampling_Rate", "fast")]);
	let err = RfDc::new(Box::new(surface()), &description, Handle(0)).expect_err("parse fails");
	assert!(matches!(err, BindError::ConfigParse { .. }));
}

#[test]
fn failing_cfg_initialize_aborts_construction() {
	let mut surface = ScriptedSurface::new();
	surface.define_status("XRFdc_CfgInitialize", 1);
	let err = RfDc::new(Box::new(surface), &description(), Handle(0)).expect_err("init fails");
	assert!(matches!(err, BindError::NativeFailure { ref name, code: 1 } if name == "XRFdc_CfgInitialize"));
}

#[test]
fn tile_operations_pass_type_and_index() {
	let mut surface = surface();
	for name in ["XRFdc_StartUp", "XRFdc_Shutdown", "XRFdc_Reset", "XRFdc_SetupFIFO"] {
		surface.define_status(name, 0);
	}
	let (rfdc, log) = rfdc(surface);

	rfdc.adc_tiles()[1].start_up().expect("start up");
	rfdc.dac_tiles()[3].shut_down().expect("shut down");
	rfdc.dac_tiles()[0].reset().expect("reset");
	rfdc.adc_tiles()[2].setup_fifo(true).expect("setup fifo");

	assert_eq!(log.calls_to("XRFdc_StartUp")[0].ints(), vec![i64::from(XRFDC_ADC_TILE), 1]);
	assert_eq!(log.calls_to("XRFdc_Shutdown")[0].ints(), vec![i64::from(XRFDC_DAC_TILE), 3]);
	assert_eq!(log.calls_to("XRFdc_Reset")[0].ints(), vec![i64::from(XRFDC_DAC_TILE), 0]);
	assert_eq!(log.calls_to("XRFdc_SetupFIFO")[0].ints(), vec![i64::from(XRFDC_ADC_TILE), 2, 1]);
	assert_eq!(log.calls_to("XRFdc_StartUp")[0].args[0], RecordedArg::Handle(INSTANCE));
}

#[test]
fn dump_regs_tolerates_void_and_driver_output() {
	let mut surface = surface();
	surface.define("XRFdc_DumpRegs", |_| NativeReturn::Void);
	surface.emit_output("ADC tile 0 registers ...");
	let (rfdc, log) = rfdc(surface);

	rfdc.adc_tiles()[0].dump_regs().expect("dump regs");
	assert_eq!(log.calls_to("XRFdc_DumpRegs").len(), 1);
}

#[test]
fn block_operations_use_block_path() {
	let mut surface = surface();
	surface.define_status("XRFdc_ResetNCOPhase", 0);
	surface.define_status("XRFdc_UpdateEvent", 0);
	surface.define_status("XRFdc_ThresholdStickyClear", 0);
	let (rfdc, log) = rfdc(surface);

	rfdc.dac_tiles()[2].blocks()[3].reset_nco_phase().expect("reset nco");
	rfdc.adc_tiles()[2].blocks()[3].update_event(XRFDC_EVENT_MIXER).expect("update event");
	rfdc.adc_tiles()[2].blocks()[3]
		.threshold_sticky_clear(XRFDC_UPDATE_THRESHOLD_BOTH)
		.expect("sticky clear");

	assert_eq!(log.calls_to("XRFdc_ResetNCOPhase")[0].ints(), vec![1, 2, 3]);
	assert_eq!(log.calls_to("XRFdc_UpdateEvent")[0].ints(), vec![0, 2, 3, 1]);
	assert_eq!(log.calls_to("XRFdc_ThresholdStickyClear")[0].ints(), vec![2, 3, 4]);
}

#[test]
fn kind_specific_properties_use_implicit_addressing() {
	let mut surface = surface();
	surface.define_output("XRFdc_GetDecimationFactor", u32_word(8));
	surface.define_status("XRFdc_SetInterpolationFactor", 0);
	surface.define_status("XRFdc_SetFabRdVldWords", 0);
	let (rfdc, log) = rfdc(surface);

	let adc_block = &rfdc.adc_tiles()[1].blocks()[2];
	assert_eq!(adc_block.get(&adc::DECIMATION_FACTOR).expect("get").as_u64(), Some(8));
	adc_block.set(&adc::FAB_RD_VLD_WORDS, 4_u32).expect("set");
	rfdc.dac_tiles()[1].blocks()[0].set(&dac::INTERPOLATION_FACTOR, 2_u32).expect("set");

	assert_eq!(log.calls_to("XRFdc_GetDecimationFactor")[0].ints(), vec![1, 2]);
	assert_eq!(log.calls_to("XRFdc_SetFabRdVldWords")[0].ints(), vec![0, 1, 2]);
	assert_eq!(log.calls_to("XRFdc_SetInterpolationFactor")[0].ints(), vec![1, 0]);
}

#[test]
fn mixer_settings_write_through_once() {
	let mut surface = surface();
	let current = pack_struct(
		&XRFDC_MIXER_SETTINGS,
		&StructValue::new("XRFdc_Mixer_Settings").with("Freq", 1000.0).with("MixerMode", 1_u32),
	)
	.expect("packs");
	surface.define_output("XRFdc_GetMixerSettings", current);
	surface.define_status("XRFdc_SetMixerSettings", 0);
	let (rfdc, log) = rfdc(surface);

	let block = &rfdc.dac_tiles()[0].blocks()[1];
	let mut mixer = block.get(&block::MIXER_SETTINGS).expect("get");
	mixer.as_struct_mut().expect("struct").set("Freq", -250.5).expect("write-through");

	let sets = log.calls_to("XRFdc_SetMixerSettings");
	assert_eq!(sets.len(), 1);
	assert_eq!(sets[0].ints(), vec![i64::from(XRFDC_DAC_TILE), 0, 1]);
	let sent = sets[0].input().expect("struct passed").decode().expect("decodes");
	let sent = sent.as_struct().expect("struct");
	assert_eq!(sent.get("Freq"), Some(&Value::F64(-250.5)));
	assert_eq!(sent.get("MixerMode"), Some(&Value::U64(1)));
}

#[test]
fn ip_status_decodes_nested_tile_status() {
	let mut surface = surface();
	let tile_on = StructValue::new("XRFdc_TileStatus").with("IsEnabled", 1_u32).with("PLLState", 2_u32);
	let idle = StructValue::new("XRFdc_TileStatus");
	let status = StructValue::new("XRFdc_IPStatus")
		.with(
			"ADCTileStatus",
			Value::Array(vec![tile_on.clone().into(), idle.clone().into(), idle.into(), tile_on.into()]),
		)
		.with("State", 1_u32);
	surface.define_output("XRFdc_GetIPStatus", pack_struct(&XRFDC_IP_STATUS, &status).expect("packs"));
	let (rfdc, log) = rfdc(surface);

	let status = rfdc.get(&device::IP_STATUS).expect("get");
	let status = status.as_struct().expect("struct");
	assert!(!status.has_callback());
	let adc = status.get("ADCTileStatus").and_then(Value::as_array).expect("tile array");
	assert_eq!(adc[3].as_struct().and_then(|tile| tile.get("PLLState")), Some(&Value::U64(2)));
	assert_eq!(log.calls_to("XRFdc_GetIPStatus")[0].ints(), Vec::<i64>::new());
}

#[test]
fn read_only_tile_property_reads() {
	let mut surface = surface();
	surface.define_output("XRFdc_GetPLLLockStatus", u32_word(2));
	let (rfdc, _) = rfdc(surface);
	assert_eq!(rfdc.dac_tiles()[1].get(&tile::PLL_LOCK_STATUS).expect("get").as_u64(), Some(2));
}

#[test]
fn unavailable_entry_point_is_not_defaulted() {
	let (rfdc, _) = rfdc(surface());
	let err = rfdc.dac_tiles()[0].blocks()[0].get(&dac::OUTPUT_CURR).expect_err("not in library");
	assert!(matches!(err, BindError::MissingEntryPoint { ref name } if name == "XRFdc_GetOutputCurr"));
}

#[test]
fn property_tables_are_complete() {
	assert_eq!(block::DESCRIPTORS.len(), 5);
	assert_eq!(adc::DESCRIPTORS.len(), 5);
	assert_eq!(dac::DESCRIPTORS.len(), 5);
	assert_eq!(tile::DESCRIPTORS.len(), 4);
	assert_eq!(device::DESCRIPTORS.len(), 1);
}
