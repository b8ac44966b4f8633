//! Descriptor codes.
//!
//! A descriptor names either a single element, a replication, an operator, or
//! a sequence of other descriptors. It is written in CREX as a six-byte token
//! such as `B12101`, and held in memory packed into 16 bits: two bits of class
//! (`F`), six bits of table-X and eight bits of table-Y.

use core::fmt;

use tartan_bitfield::bitfield;
use zerocopy::FromBytes;

bitfield! {
    struct Packed(u16) {
        [0..8] y: u8,
        [8..14] x: u8,
        [14..16] f: u8,
    }
}

/// A packed (F, X, Y) descriptor code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Varcode(u16);

impl Varcode {
    /// Pack a descriptor code from its parts.
    ///
    /// Returns `None` if a part does not fit its field (F above 3, X above 63,
    /// or Y above 255).
    pub const fn new(f: u8, x: u8, y: u8) -> Option<Self> {
        if f > 3 || x > 63 {
            return None;
        }

        Some(Self(((f as u16) << 14) | ((x as u16) << 8) | y as u16))
    }

    /// Wrap an already-packed descriptor code.
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// The packed representation.
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// The class selector, between 0 and 3.
    pub fn f(self) -> u8 {
        Packed(self.0).f()
    }

    /// The table-X selector.
    pub fn x(self) -> u8 {
        Packed(self.0).x()
    }

    /// The table-Y selector.
    pub fn y(self) -> u8 {
        Packed(self.0).y()
    }

    /// The class of this descriptor.
    pub fn class(self) -> DescriptorClass {
        match self.f() {
            0 => DescriptorClass::Element,
            1 => DescriptorClass::Replication,
            2 => DescriptorClass::Operator,
            _ => DescriptorClass::Sequence,
        }
    }

    /// Parse a descriptor token such as `B12101` or `D01001`.
    ///
    /// Returns `None` if the class letter is unknown or the remaining five
    /// bytes are not decimal digits.
    pub fn parse(r: [u8; 6]) -> Option<Self> {
        #[repr(C, packed)]
        #[derive(FromBytes)]
        struct Token {
            class: u8,
            x: [u8; 2],
            y: [u8; 3],
        }

        let Token { class, x, y } = zerocopy::transmute!(r);

        let f = DescriptorClass::from_letter(class)? as u8;
        let x = digits(&x)?;
        let y = digits(&y)?;

        // A three-digit Y can exceed the eight bits it is packed into.
        Self::new(f, u8::try_from(x).ok()?, u8::try_from(y).ok()?)
    }
}

impl fmt::Display for Varcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:02}{:03}",
            self.class().letter() as char,
            self.x(),
            self.y()
        )
    }
}

/// The class of a descriptor, selected by its `F` part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DescriptorClass {
    /// A single element, looked up in table B.
    Element = 0,
    /// A replication of the descriptors that follow.
    Replication = 1,
    /// An operator, looked up in table C.
    Operator = 2,
    /// A sequence of descriptors, looked up in table D.
    Sequence = 3,
}

impl DescriptorClass {
    /// The letter introducing descriptors of this class in CREX text.
    pub fn letter(self) -> u8 {
        match self {
            Self::Element => b'B',
            Self::Replication => b'R',
            Self::Operator => b'C',
            Self::Sequence => b'D',
        }
    }

    /// The class introduced by a letter in CREX text, if any.
    pub fn from_letter(letter: u8) -> Option<Self> {
        match letter {
            b'B' => Some(Self::Element),
            b'R' => Some(Self::Replication),
            b'C' => Some(Self::Operator),
            b'D' => Some(Self::Sequence),
            _ => None,
        }
    }
}

/// Read a run of ASCII decimal digits.
pub(crate) fn digits(r: &[u8]) -> Option<u32> {
    if r.is_empty() {
        return None;
    }

    r.iter().try_fold(0u32, |acc, b| {
        let d = (*b as char).to_digit(10)?;
        acc.checked_mul(10)?.checked_add(d)
    })
}
