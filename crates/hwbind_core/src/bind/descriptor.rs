use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Deserialize;
use tracing::warn;

use crate::bind::address::DeviceCore;
use crate::bind::call::{Arg, Convention, Handle, NativeReturn, NativeSurface};
use crate::bind::codec;
use crate::bind::grammar::{self, CodeTable, ParsedConfig, ValueKind};
use crate::bind::types::{StructLayout, TypeDescriptor};
use crate::bind::value::{StructValue, Value};
use crate::bind::{BindError, Result};

/// Hardware description snippet for one IP instance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Description {
	/// Raw parameter text keyed by descriptor key.
	#[serde(default)]
	pub parameters: Option<BTreeMap<String, String>>,
}

impl Description {
	/// Parse a JSON snippet; unrelated keys are ignored.
	pub fn from_json(text: &str) -> Result<Self> {
		Ok(serde_json::from_str(text)?)
	}

	/// Description with the given parameters.
	pub fn with_parameters<K, V>(parameters: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			parameters: Some(parameters.into_iter().map(|(key, value)| (key.into(), value.into())).collect()),
		}
	}
}

/// Mapping of one config struct field to its descriptor key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigField {
	/// Struct field name.
	pub field: &'static str,
	/// Descriptor key; `{}` is replaced by the tile index.
	pub key: &'static str,
	/// Value grammar.
	pub kind: ValueKind,
}

impl ConfigField {
	/// Declare a field mapping.
	pub const fn new(field: &'static str, key: &'static str, kind: ValueKind) -> Self {
		Self { field, key, kind }
	}

	/// Whether the key is a per-tile template.
	pub fn is_template(&self) -> bool {
		self.key.contains("{}")
	}

	/// Concrete descriptor key for `index`.
	pub fn key_for(&self, index: Option<usize>) -> String {
		match index {
			Some(index) => self.key.replace("{}", &index.to_string()),
			None => self.key.to_owned(),
		}
	}
}

/// Where a device's initial configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
	/// Parsed from the description's parameters.
	Description,
	/// Looked up from the driver's built-in table.
	Default,
}

/// Parse every `fields` key present in `params`; templated keys are tried for `0..tiles`.
pub fn extract_config(params: &BTreeMap<String, String>, fields: &[ConfigField], tiles: usize) -> Result<ParsedConfig> {
	let mut config = ParsedConfig::new();
	for field in fields {
		let keys: Vec<String> = if field.is_template() {
			(0..tiles).map(|index| field.key_for(Some(index))).collect()
		} else {
			vec![field.key_for(None)]
		};
		for key in keys {
			if let Some(text) = params.get(&key) {
				let value = grammar::parse_value(field.kind, text)?;
				config.insert(key, value);
			}
		}
	}
	Ok(config)
}

/// Parse the code table stored under `key`; an absent key yields an empty table.
pub fn extract_code_table(params: &BTreeMap<String, String>, key: &str) -> Result<CodeTable> {
	match params.get(key) {
		Some(text) => grammar::parse_code_table(text),
		None => Ok(CodeTable::default()),
	}
}

/// Build a struct value from the parsed entries `fields` map to.
pub fn populate(type_name: &str, fields: &[ConfigField], config: &ParsedConfig, index: Option<usize>) -> StructValue {
	let mut value = StructValue::new(type_name);
	for field in fields {
		if let Some(param) = config.get(&field.key_for(index)) {
			value.insert(field.field, Value::from(param));
		}
	}
	value
}

/// Static facts about one driver's initialization sequence.
#[derive(Debug, Clone, Copy)]
pub struct DriverInit {
	/// Symbol prefix.
	pub prefix: &'static str,
	/// Instance struct type name.
	pub instance_type: &'static str,
	/// Config struct layout.
	pub config: &'static StructLayout,
	/// Config field receiving the register window address.
	pub base_field: &'static str,
}

/// Device core plus the configuration it was initialized with.
#[derive(Debug)]
pub struct Initialized {
	/// Shared device state.
	pub core: Rc<DeviceCore>,
	/// Configuration passed to `CfgInitialize`.
	pub config: StructValue,
	/// Where the configuration came from.
	pub source: ConfigSource,
}

/// Allocate an instance, resolve its configuration, and run `CfgInitialize`.
///
/// Without a populated configuration the driver's `LookupConfig(0)` table is used.
pub fn initialize(
	mut surface: Box<dyn NativeSurface>,
	driver: &DriverInit,
	populated: Option<StructValue>,
	base_address: Handle,
) -> Result<Initialized> {
	let instance = surface.alloc_instance(driver.instance_type);
	let core = DeviceCore::new(surface, driver.prefix, instance, base_address);

	let (mut config, source) = match populated {
		Some(config) => (config, ConfigSource::Description),
		None => {
			warn!(driver = driver.instance_type, "no hardware parameters in description, using default configuration");
			(lookup_default(&core, driver.config)?, ConfigSource::Default)
		}
	};

	config.insert(driver.base_field, Value::U64(base_address.0));
	let native = codec::pack_struct(driver.config, &config)?;
	core.invoke("CfgInitialize", &mut [Arg::Handle(instance), Arg::In(&native)], Convention::Status)?;

	Ok(Initialized { core, config, source })
}

fn lookup_default(core: &DeviceCore, layout: &'static StructLayout) -> Result<StructValue> {
	let ret = core.invoke("LookupConfig", &mut [Arg::Int(0)], Convention::Value)?;
	let NativeReturn::Value(native) = ret else {
		return Err(BindError::UnexpectedReturn {
			name: core.symbol("LookupConfig"),
			expected: "value",
			got: ret.kind(),
		});
	};
	match codec::unpack(TypeDescriptor::Struct(layout), &native)? {
		Value::Struct(config) => Ok(config),
		other => Err(BindError::TypeMismatch {
			expected: "struct",
			got: other.kind(),
		}),
	}
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use super::{ConfigField, ConfigSource, Description, DriverInit, extract_code_table, extract_config, initialize, populate};
	use crate::bind::call::{Handle, NativeReturn};
	use crate::bind::codec;
	use crate::bind::grammar::{ParamValue, ValueKind};
	use crate::bind::scripted::ScriptedSurface;
	use crate::bind::types::{FieldDescriptor, FieldType, ScalarKind, StructLayout};
	use crate::bind::value::{StructValue, Value};

	static CONFIG: StructLayout = StructLayout {
		name: "Dev_Config",
		fields: &[
			FieldDescriptor::new("BaseAddress", FieldType::Scalar(ScalarKind::U64)),
			FieldDescriptor::new("Standard", FieldType::Scalar(ScalarKind::U32)),
		],
	};

	const FIELDS: &[ConfigField] = &[
		ConfigField::new("Standard", "DRV_STANDARD", ValueKind::Int),
		ConfigField::new("Enable", "C_ADC{}_Enable", ValueKind::Int),
	];

	static DRIVER: DriverInit = DriverInit {
		prefix: "XDev",
		instance_type: "XDev",
		config: &CONFIG,
		base_field: "BaseAddress",
	};

	fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
		pairs.iter().map(|(key, value)| ((*key).to_owned(), (*value).to_owned())).collect()
	}

	#[test]
	fn description_ignores_unrelated_keys() {
		let desc = Description::from_json(r#"{"fullpath": "ip/fec", "parameters": {"DRV_STANDARD": "1"}}"#).expect("parses");
		assert_eq!(desc.parameters.expect("has parameters")["DRV_STANDARD"], "1");

		let bare = Description::from_json(r#"{"phys_addr": 4096}"#).expect("parses");
		assert!(bare.parameters.is_none());
		assert!(Description::from_json("[").is_err());
	}

	#[test]
	fn absent_keys_are_absent() {
		let params = params(&[("DRV_STANDARD", "2"), ("C_ADC1_Enable", "1")]);
		let config = extract_config(&params, FIELDS, 4).expect("extracts");
		assert_eq!(config.len(), 2);
		assert_eq!(config["C_ADC1_Enable"], ParamValue::Int(1));
		assert!(!config.contains_key("C_ADC0_Enable"));

		let tile = populate("Tile", FIELDS, &config, Some(1));
		assert_eq!(tile.get("Enable"), Some(&Value::I64(1)));
		assert_eq!(populate("Tile", FIELDS, &config, Some(0)).get("Enable"), None);
	}

	#[test]
	fn parse_failure_aborts_extraction() {
		let params = params(&[("DRV_STANDARD", "two")]);
		assert!(extract_config(&params, FIELDS, 0).is_err());
		assert!(extract_code_table(&params, "DRV_LDPC_PARAMS").expect("absent").is_empty());
	}

	#[test]
	fn populated_config_is_initialized_with_base_address() {
		let mut surface = ScriptedSurface::new();
		surface.define_status("XDevCfgInitialize", 0);
		let log = surface.log();

		let config = StructValue::new("Dev_Config").with("Standard", 1_u32);
		let init = initialize(Box::new(surface), &DRIVER, Some(config), Handle(0xA000)).expect("initializes");
		assert_eq!(init.source, ConfigSource::Description);

		let sent = log.calls_to("XDevCfgInitialize")[0].input().expect("config passed").decode().expect("decodes");
		let sent = sent.as_struct().expect("struct");
		assert_eq!(sent.get("BaseAddress"), Some(&Value::U64(0xA000)));
		assert_eq!(sent.get("Standard"), Some(&Value::U64(1)));
	}

	#[test]
	fn missing_parameters_fall_back_to_lookup() {
		let mut surface = ScriptedSurface::new();
		let default = codec::pack_struct(&CONFIG, &StructValue::new("Dev_Config").with("Standard", 3_u32)).expect("packs");
		surface.define("XDevLookupConfig", move |_| NativeReturn::Value(default.clone()));
		surface.define_status("XDevCfgInitialize", 0);
		let log = surface.log();

		let init = initialize(Box::new(surface), &DRIVER, None, Handle(0xB000)).expect("initializes");
		assert_eq!(init.source, ConfigSource::Default);
		assert_eq!(init.config.get("Standard"), Some(&Value::U64(3)));
		assert_eq!(log.calls_to("XDevLookupConfig")[0].ints(), vec![0]);
	}
}
