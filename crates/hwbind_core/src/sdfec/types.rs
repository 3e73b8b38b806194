use crate::bind::{ConfigField, FieldDescriptor, FieldType, ScalarKind, StructLayout, ValueKind};

/// Descriptor key holding the LDPC code table.
pub const LDPC_PARAMS_KEY: &str = "DRV_LDPC_PARAMS";

/// Words in the config's initialization block.
pub const INITIALIZATION_WORDS: usize = 4;

const fn word(name: &'static str) -> FieldDescriptor {
	FieldDescriptor::new(name, FieldType::Scalar(ScalarKind::U32))
}

/// `XSdFec_Config`.
pub static XSDFEC_CONFIG: StructLayout = StructLayout {
	name: "XSdFec_Config",
	fields: &[
		FieldDescriptor::new("DeviceId", FieldType::Scalar(ScalarKind::U16)),
		FieldDescriptor::new("BaseAddress", FieldType::Scalar(ScalarKind::U64)),
		word("Standard"),
		FieldDescriptor::new("Initialization", FieldType::Array(ScalarKind::U32, INITIALIZATION_WORDS)),
	],
};

/// `XSdFecLdpcParameters`; the three tables are driver-side pointers.
pub static XSDFEC_LDPC_PARAMETERS: StructLayout = StructLayout {
	name: "XSdFecLdpcParameters",
	fields: &[
		word("N"),
		word("K"),
		word("PSize"),
		word("NLayers"),
		word("NQC"),
		word("NMQC"),
		word("NM"),
		word("NormType"),
		word("NoPacking"),
		word("SpecialQC"),
		word("NoFinalParity"),
		word("MaxSchedule"),
		FieldDescriptor::new("SCTable", FieldType::Pointer(ScalarKind::U32)),
		FieldDescriptor::new("LATable", FieldType::Pointer(ScalarKind::U32)),
		FieldDescriptor::new("QCTable", FieldType::Pointer(ScalarKind::U32)),
	],
};

/// `XSdFecInterruptClass`.
pub static XSDFEC_INTERRUPT_CLASS: StructLayout = StructLayout {
	name: "XSdFecInterruptClass",
	fields: &[
		word("Intf"),
		word("ECCSBit"),
		word("ECCMBit"),
		word("RstReq"),
		word("ReProgReq"),
		word("StopReq"),
	],
};

/// `XSdFecTurboParameters`.
pub static XSDFEC_TURBO_PARAMETERS: StructLayout = StructLayout {
	name: "XSdFecTurboParameters",
	fields: &[word("Alg"), word("Scale")],
};

/// `XSdFec_Config` fields and their descriptor keys.
pub const CONFIG_FIELDS: &[ConfigField] = &[
	ConfigField::new("Standard", "DRV_STANDARD", ValueKind::Int),
	ConfigField::new("Initialization", "DRV_INITIALIZATION_PARAMS", ValueKind::HexList),
];

/// Code table key to `XSdFecLdpcParameters` field. Other keys are ignored.
pub const LDPC_KEYS: &[(&str, &str)] = &[
	("k", "K"),
	("n", "N"),
	("p", "PSize"),
	("nlayers", "NLayers"),
	("nqc", "NQC"),
	("nmqc", "NMQC"),
	("nm", "NM"),
	("norm_type", "NormType"),
	("no_packing", "NoPacking"),
	("special_qc", "SpecialQC"),
	("no_final_parity", "NoFinalParity"),
	("max_schedule", "MaxSchedule"),
	("sc_table", "SCTable"),
	("la_table", "LATable"),
	("qc_table", "QCTable"),
];
