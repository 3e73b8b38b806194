use std::fmt;

use tracing::debug;

use crate::bind::{
	Arg, ArrayCapacity, BindError, Convention, NativeSurface, NativeValue, Result, ScalarKind, TypeDescriptor, Value, invoke, pack,
};

/// Register words in one LMK04208 programming sequence.
pub const LMK04208_REG_COUNT: usize = 26;
/// Register words in one LMX2594 programming sequence.
pub const LMX2594_REG_COUNT: usize = 113;

/// Board clock synthesizers reached over I2C through the clock wrapper library.
pub struct ClockSynth {
	surface: Box<dyn NativeSurface>,
}

impl ClockSynth {
	/// Wrap the clock wrapper library's surface.
	pub fn new(surface: Box<dyn NativeSurface>) -> Self {
		Self { surface }
	}

	/// Program the LMK04208 jitter cleaner on I2C bus `iic`.
	pub fn write_lmk04208_regs(&mut self, iic: u32, regs: &[u32]) -> Result<()> {
		self.write_regs("writeLmk04208Regs", iic, regs, LMK04208_REG_COUNT)
	}

	/// Program an LMX2594 synthesizer on I2C bus `iic`.
	pub fn write_lmx2594_regs(&mut self, iic: u32, regs: &[u32]) -> Result<()> {
		self.write_regs("writeLmx2594Regs", iic, regs, LMX2594_REG_COUNT)
	}

	fn write_regs(&mut self, name: &str, iic: u32, regs: &[u32], count: usize) -> Result<()> {
		if regs.len() != count {
			return Err(BindError::ArrayLengthMismatch {
				field: name.to_owned(),
				expected: ArrayCapacity::Fixed(count),
				got: regs.len(),
			});
		}

		let words = Value::Array(regs.iter().copied().map(Value::from).collect());
		let native: NativeValue = pack(TypeDescriptor::Array(ScalarKind::U32, count), &words)?;
		debug!(entry = name, iic, "loading clock registers");
		invoke(self.surface.as_mut(), name, &mut [Arg::Int(i64::from(iic)), Arg::In(&native)], Convention::Status)?;
		Ok(())
	}
}

impl fmt::Debug for ClockSynth {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClockSynth").finish_non_exhaustive()
	}
}
