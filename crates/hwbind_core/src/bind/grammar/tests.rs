use crate::bind::BindError;
use crate::bind::grammar::{ParamValue, ValueKind, parse_code_table, parse_config_table, parse_value};

#[test]
fn flat_singleton_brace_binds_scalar() {
	let table = parse_config_table("STD {1}").expect("parses");
	assert_eq!(table.len(), 1);
	assert_eq!(table["STD"], ParamValue::Int(1));
}

#[test]
fn flat_table_mixes_scalars_and_lists() {
	let table = parse_config_table("A 0x10\nB { 1, 2 ,3 }\n  C -2.5 D 1e3").expect("parses");
	assert_eq!(table["A"], ParamValue::Int(16));
	assert_eq!(table["B"], ParamValue::List(vec![1, 2, 3]));
	assert_eq!(table["C"], ParamValue::Float(-2.5));
	assert_eq!(table["D"], ParamValue::Float(1000.0));
}

#[test]
fn code_table_parses_nested_entries() {
	let table = parse_code_table("MYCODE { k 4 n 8 p {0x1 0x2} }").expect("parses");
	assert_eq!(table.names().collect::<Vec<_>>(), vec!["MYCODE"]);
	let code = table.get("MYCODE").expect("entry exists");
	assert_eq!(code["k"], ParamValue::Int(4));
	assert_eq!(code["n"], ParamValue::Int(8));
	assert_eq!(code["p"], ParamValue::List(vec![1, 2]));

	let json = serde_json::to_value(code).expect("serializes");
	assert_eq!(json, serde_json::json!({"k": 4, "n": 8, "p": [1, 2]}));
}

#[test]
fn code_table_keeps_order_and_replaces_duplicates() {
	let text = "
		docsis_short { k 16 sc_table {} }
		wifi_802_11 { k 324 n 648 }
		docsis_short { k 32 }
	";
	let table = parse_code_table(text).expect("parses");
	assert_eq!(table.names().collect::<Vec<_>>(), vec!["docsis_short", "wifi_802_11"]);
	let short = table.get("docsis_short").expect("entry exists");
	assert_eq!(short["k"], ParamValue::Int(32));
	assert!(!short.contains_key("sc_table"));
}

#[test]
fn empty_code_list_is_allowed() {
	let table = parse_code_table("X { la_table { } }").expect("parses");
	assert_eq!(table.get("X").expect("entry")["la_table"], ParamValue::List(Vec::new()));
}

#[test]
fn decimal_literals_coerce_to_target() {
	assert_eq!(parse_value(ValueKind::Int, "2.0").expect("integral"), ParamValue::Int(2));
	assert_eq!(parse_value(ValueKind::Int, " 3e2 ").expect("integral"), ParamValue::Int(300));
	assert_eq!(parse_value(ValueKind::Float, "7").expect("widens"), ParamValue::Float(7.0));
	assert_eq!(parse_value(ValueKind::Float, "0x10").expect("hex widens"), ParamValue::Float(16.0));

	let err = parse_value(ValueKind::Int, "2.5").expect_err("fractional int");
	assert!(matches!(err, BindError::ConfigParse { position: 0, expected: "integer" }));
}

#[test]
fn integral_floats_beyond_i64_are_rejected() {
	let err = parse_value(ValueKind::Int, "9223372036854775808.0").expect_err("2^63 does not fit");
	assert!(matches!(err, BindError::ConfigParse { position: 0, expected: "integer" }));

	let err = parse_value(ValueKind::Int, "-1e19").expect_err("below i64::MIN");
	assert!(matches!(err, BindError::ConfigParse { position: 0, expected: "integer" }));
	assert_eq!(parse_value(ValueKind::Int, "4.5e15").expect("fits"), ParamValue::Int(4_500_000_000_000_000));
}

#[test]
fn hex_list_requires_hex_literals() {
	let value = parse_value(ValueKind::HexList, "{0x1, 0xFF,0x00000010}").expect("parses");
	assert_eq!(value, ParamValue::List(vec![1, 255, 16]));

	let err = parse_value(ValueKind::HexList, "{0x1, 2}").expect_err("decimal in hex list");
	assert!(matches!(err, BindError::ConfigParse { position: 6, expected: "hex literal" }));
}

#[test]
fn hex_list_needs_braces() {
	let err = parse_value(ValueKind::HexList, "0x00000000,0x00000001").expect_err("bare list");
	assert!(matches!(err, BindError::ConfigParse { position: 0, expected: "'{'" }));

	let value = parse_value(ValueKind::HexList, "{0x00000000,0x00000001,0x0000000C,0x00000000}").expect("braced list");
	assert_eq!(value, ParamValue::List(vec![0, 1, 12, 0]));
}

#[test]
fn list_elements_share_literal_kind() {
	let err = parse_value(ValueKind::IntList, "{1, 0x2}").expect_err("mixed kinds");
	assert!(matches!(err, BindError::ConfigParse { position: 4, expected: "decimal literal" }));

	let err = parse_code_table("C { p {0x1 2} }").expect_err("mixed kinds");
	assert!(matches!(err, BindError::ConfigParse { expected: "hex literal", .. }));
}

#[test]
fn whole_input_must_be_consumed() {
	let err = parse_value(ValueKind::Int, "12 13").expect_err("trailing token");
	assert!(matches!(err, BindError::ConfigParse { position: 3, expected: "end of input" }));

	let err = parse_value(ValueKind::Int, "0x").expect_err("hex without digits");
	assert!(matches!(err, BindError::ConfigParse { position: 1, .. }));
}

#[test]
fn malformed_code_tables_report_position() {
	let err = parse_code_table("A { k }").expect_err("missing value");
	assert!(matches!(err, BindError::ConfigParse { position: 6, expected: "number" }));

	let err = parse_code_table("A { k {1 2 }").expect_err("unterminated entry");
	assert!(matches!(err, BindError::ConfigParse { expected: "identifier", .. }));

	let err = parse_config_table("K {1 2}").expect_err("space in flat list");
	assert!(matches!(err, BindError::ConfigParse { position: 5, expected: "',' or '}'" }));
}

#[test]
fn as_list_promotes_scalars() {
	assert_eq!(ParamValue::Int(5).as_list(), Some(vec![5]));
	assert_eq!(ParamValue::List(vec![1, 2]).as_list(), Some(vec![1, 2]));
	assert_eq!(ParamValue::Float(1.0).as_list(), None);
}
