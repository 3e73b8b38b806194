use std::collections::BTreeMap;

use serde::Serialize;

use crate::bind::value::Value;
use crate::bind::{BindError, Result};

/// Parsed descriptor parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
	/// Integer scalar.
	Int(i64),
	/// Floating point scalar.
	Float(f64),
	/// Ordered integer list.
	List(Vec<i64>),
}

impl ParamValue {
	/// List view; a scalar integer is a one-element list.
	pub fn as_list(&self) -> Option<Vec<i64>> {
		match self {
			Self::Int(value) => Some(vec![*value]),
			Self::List(items) => Some(items.clone()),
			Self::Float(_) => None,
		}
	}
}

impl From<&ParamValue> for Value {
	fn from(value: &ParamValue) -> Self {
		match value {
			ParamValue::Int(raw) => Value::I64(*raw),
			ParamValue::Float(raw) => Value::F64(*raw),
			ParamValue::List(items) => Value::Array(items.iter().copied().map(Value::I64).collect()),
		}
	}
}

/// Target shape of one descriptor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
	/// Single number coerced to an integer.
	Int,
	/// Single number coerced to a float.
	Float,
	/// `{a, b, ...}` of integers.
	IntList,
	/// `{0x.., 0x.., ...}` of hex literals.
	HexList,
}

/// Flat key table.
pub type ParsedConfig = BTreeMap<String, ParamValue>;

/// Parameters of one named code.
pub type CodeParams = BTreeMap<String, ParamValue>;

/// Named code parameter sets in descriptor order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CodeTable {
	entries: Vec<(String, CodeParams)>,
}

impl CodeTable {
	/// Parameters for `name`.
	pub fn get(&self, name: &str) -> Option<&CodeParams> {
		self.entries.iter().find(|(entry, _)| entry == name).map(|(_, params)| params)
	}

	/// Code names in descriptor order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(name, _)| name.as_str())
	}

	/// Entries in descriptor order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &CodeParams)> {
		self.entries.iter().map(|(name, params)| (name.as_str(), params))
	}

	/// Number of codes.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the table has no codes.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	fn insert(&mut self, name: &str, params: CodeParams) {
		match self.entries.iter_mut().find(|(entry, _)| entry == name) {
			Some((_, slot)) => *slot = params,
			None => self.entries.push((name.to_owned(), params)),
		}
	}
}

/// Parse one descriptor value as `kind`. The whole text must be consumed.
pub fn parse_value(kind: ValueKind, text: &str) -> Result<ParamValue> {
	let mut scan = Scanner::new(text);
	let value = match kind {
		ValueKind::Int => ParamValue::Int(scan.number()?.to_int(&scan)?),
		ValueKind::Float => ParamValue::Float(scan.number()?.to_float()),
		ValueKind::IntList => ParamValue::List(scan.comma_list(None)?),
		ValueKind::HexList => ParamValue::List(scan.comma_list(Some(LiteralKind::Hex))?),
	};
	scan.finish()?;
	Ok(value)
}

/// Parse a flat `Key value` table. A one-element brace group binds a scalar.
pub fn parse_config_table(text: &str) -> Result<ParsedConfig> {
	let mut scan = Scanner::new(text);
	let mut table = ParsedConfig::new();
	while !scan.at_end() {
		let key = scan.ident()?;
		let value = if scan.peek() == Some(b'{') {
			let mut items = scan.comma_list(None)?;
			match items.len() {
				1 => ParamValue::Int(items.remove(0)),
				_ => ParamValue::List(items),
			}
		} else {
			scan.number()?.to_param(&scan)?
		};
		table.insert(key.to_owned(), value);
	}
	Ok(table)
}

/// Parse a nested `Name { key value ... }` code table.
pub fn parse_code_table(text: &str) -> Result<CodeTable> {
	let mut scan = Scanner::new(text);
	let mut table = CodeTable::default();
	while !scan.at_end() {
		let name = scan.ident()?;
		scan.expect(b'{', "'{'")?;
		let mut params = CodeParams::new();
		while !scan.eat(b'}') {
			let key = scan.ident()?;
			let value = if scan.peek() == Some(b'{') {
				ParamValue::List(scan.space_list()?)
			} else {
				ParamValue::Int(scan.number()?.to_int(&scan)?)
			};
			params.insert(key.to_owned(), value);
		}
		table.insert(name, params);
	}
	Ok(table)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralKind {
	Hex,
	Decimal,
}

impl LiteralKind {
	fn expected(self) -> &'static str {
		match self {
			Self::Hex => "hex literal",
			Self::Decimal => "decimal literal",
		}
	}
}

#[derive(Debug, Clone, Copy)]
struct Literal<'a> {
	kind: LiteralKind,
	text: &'a str,
	start: usize,
}

impl Literal<'_> {
	fn is_integral_text(&self) -> bool {
		self.kind == LiteralKind::Hex || !self.text.contains(['.', 'e', 'E'])
	}

	fn to_int(self, scan: &Scanner<'_>) -> Result<i64> {
		let fail = || scan.error_at(self.start, "integer");
		match self.kind {
			LiteralKind::Hex => {
				let raw = u64::from_str_radix(&self.text[2..], 16).map_err(|_| fail())?;
				i64::try_from(raw).map_err(|_| fail())
			}
			LiteralKind::Decimal if self.is_integral_text() => self.text.parse::<i64>().map_err(|_| fail()),
			LiteralKind::Decimal => {
				let value = self.to_float();
				if value.fract() != 0.0 || !value.is_finite() || value.abs() >= i64::MAX as f64 {
					return Err(fail());
				}
				Ok(value as i64)
			}
		}
	}

	fn to_float(self) -> f64 {
		match self.kind {
			LiteralKind::Hex => u64::from_str_radix(&self.text[2..], 16).map_or(f64::INFINITY, |raw| raw as f64),
			LiteralKind::Decimal => self.text.parse::<f64>().unwrap_or(f64::NAN),
		}
	}

	fn to_param(self, scan: &Scanner<'_>) -> Result<ParamValue> {
		if self.is_integral_text() {
			self.to_int(scan).map(ParamValue::Int)
		} else {
			Ok(ParamValue::Float(self.to_float()))
		}
	}
}

/// Whitespace-insensitive cursor over descriptor text.
struct Scanner<'a> {
	text: &'a str,
	pos: usize,
}

impl<'a> Scanner<'a> {
	fn new(text: &'a str) -> Self {
		let mut scan = Self { text, pos: 0 };
		scan.skip_ws();
		scan
	}

	fn bytes(&self) -> &'a [u8] {
		self.text.as_bytes()
	}

	fn skip_ws(&mut self) {
		while self.bytes().get(self.pos).is_some_and(u8::is_ascii_whitespace) {
			self.pos += 1;
		}
	}

	fn at_end(&self) -> bool {
		self.pos >= self.text.len()
	}

	fn peek(&self) -> Option<u8> {
		self.bytes().get(self.pos).copied()
	}

	fn eat(&mut self, byte: u8) -> bool {
		if self.peek() != Some(byte) {
			return false;
		}
		self.pos += 1;
		self.skip_ws();
		true
	}

	fn expect(&mut self, byte: u8, expected: &'static str) -> Result<()> {
		if self.eat(byte) { Ok(()) } else { Err(self.error(expected)) }
	}

	fn finish(&self) -> Result<()> {
		if self.at_end() { Ok(()) } else { Err(self.error("end of input")) }
	}

	fn error(&self, expected: &'static str) -> BindError {
		self.error_at(self.pos, expected)
	}

	fn error_at(&self, position: usize, expected: &'static str) -> BindError {
		BindError::ConfigParse { position, expected }
	}

	fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
		let start = self.pos;
		while self.peek().is_some_and(&pred) {
			self.pos += 1;
		}
		self.pos - start
	}

	fn ident(&mut self) -> Result<&'a str> {
		let start = self.pos;
		if self.take_while(|byte| byte.is_ascii_alphanumeric() || byte == b'_') == 0 {
			return Err(self.error("identifier"));
		}
		let ident = &self.text[start..self.pos];
		self.skip_ws();
		Ok(ident)
	}

	fn number(&mut self) -> Result<Literal<'a>> {
		let start = self.pos;
		let rest = &self.bytes()[start..];

		let kind = if rest.starts_with(b"0x") && rest.get(2).is_some_and(u8::is_ascii_hexdigit) {
			self.pos += 2;
			self.take_while(|byte| byte.is_ascii_hexdigit());
			LiteralKind::Hex
		} else {
			self.decimal()?;
			LiteralKind::Decimal
		};

		let literal = Literal {
			kind,
			text: &self.text[start..self.pos],
			start,
		};
		self.skip_ws();
		Ok(literal)
	}

	fn decimal(&mut self) -> Result<()> {
		let start = self.pos;
		if self.peek() == Some(b'-') {
			self.pos += 1;
		}
		match self.peek() {
			Some(b'0') => self.pos += 1,
			Some(b'1'..=b'9') => {
				self.take_while(|byte| byte.is_ascii_digit());
			}
			_ => {
				self.pos = start;
				return Err(self.error("number"));
			}
		}

		if self.peek() == Some(b'.') && self.bytes().get(self.pos + 1).is_some_and(u8::is_ascii_digit) {
			self.pos += 1;
			self.take_while(|byte| byte.is_ascii_digit());
		}

		if matches!(self.peek(), Some(b'e' | b'E')) {
			let mark = self.pos;
			self.pos += 1;
			if matches!(self.peek(), Some(b'+' | b'-')) {
				self.pos += 1;
			}
			if self.take_while(|byte| byte.is_ascii_digit()) == 0 {
				self.pos = mark;
			}
		}
		Ok(())
	}

	fn list_item(&mut self, kind: &mut Option<LiteralKind>) -> Result<i64> {
		let literal = self.number()?;
		match *kind {
			Some(expected) if expected != literal.kind => return Err(self.error_at(literal.start, expected.expected())),
			Some(_) => {}
			None => *kind = Some(literal.kind),
		}
		literal.to_int(self)
	}

	/// `'{' (Number (',' Number)*)? '}'`
	fn comma_list(&mut self, mut kind: Option<LiteralKind>) -> Result<Vec<i64>> {
		self.expect(b'{', "'{'")?;
		let mut items = Vec::new();
		if self.eat(b'}') {
			return Ok(items);
		}
		loop {
			items.push(self.list_item(&mut kind)?);
			if self.eat(b'}') {
				return Ok(items);
			}
			self.expect(b',', "',' or '}'")?;
		}
	}

	/// `'{' Number* '}'`
	fn space_list(&mut self) -> Result<Vec<i64>> {
		self.expect(b'{', "'{'")?;
		let mut kind = None;
		let mut items = Vec::new();
		while !self.eat(b'}') {
			if self.at_end() {
				return Err(self.error("'}'"));
			}
			items.push(self.list_item(&mut kind)?);
		}
		Ok(items)
	}
}

#[cfg(test)]
mod tests;
