//! Helper for verifying check digits.

/// The running check digit enabled by the `E` flag of a descriptor list.
///
/// The first data value is preceded by `1`, and every following value by the
/// next digit, wrapping from `9` to `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckDigit {
    expected: u8,
}

impl CheckDigit {
    pub fn new() -> Self {
        Self { expected: 1 }
    }

    /// The digit the next value must be preceded by.
    pub fn expected(self) -> u8 {
        self.expected
    }

    /// Verify the byte preceding a value, and move on to the next digit.
    ///
    /// Returns the expected digit if the byte does not match it.
    pub fn verify(&mut self, found: u8) -> Result<(), u8> {
        if found.wrapping_sub(b'0') != self.expected {
            return Err(self.expected);
        }

        self.expected = (self.expected + 1) % 10;
        Ok(())
    }
}

impl Default for CheckDigit {
    fn default() -> Self {
        Self::new()
    }
}
