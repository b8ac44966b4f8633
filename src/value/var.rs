//! Decoded values.

use alloc::{
    borrow::ToOwned,
    format,
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};
use core::fmt::{self, Write};

use thiserror::Error;

use super::info::{Varinfo, Vartype};
use crate::varcode::Varcode;

/// An error reading or writing the value of a [`Var`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// The variable holds no value.
    #[error("Variable {code} is unset.")]
    Unset { code: Varcode },
    /// The variable holds values of another kind.
    #[error("Variable {code} holds {actual:?} values, not {requested:?}.")]
    Kind {
        code: Varcode,
        actual: Vartype,
        requested: Vartype,
    },
    /// A number has more digits than the variable allows.
    #[error("Value does not fit the {len} digits of variable {code}.")]
    OutOfRange { code: Varcode, len: u32 },
    /// Text or bytes are longer than the variable allows.
    #[error("Value of {found} bytes does not fit the {len} bytes of variable {code}.")]
    TooLong { code: Varcode, len: u32, found: usize },
    /// A floating point value is infinite or NaN.
    #[error("Value for variable {code} is not finite.")]
    NotFinite { code: Varcode },
    /// Binary content is not valid UTF-8.
    #[error("Variable {code} does not hold UTF-8 text.")]
    NotText { code: Varcode },
}

/// A stored value. Decimal values are held scaled, as written in the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Decimal(i64),
    String(String),
    Binary(Vec<u8>),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> Vartype {
        match self {
            Self::Integer(_) => Vartype::Integer,
            Self::Decimal(_) => Vartype::Decimal,
            Self::String(_) => Vartype::String,
            Self::Binary(_) => Vartype::Binary,
        }
    }
}

/// A borrowed view of a value, with decimal scaling applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Integer(i64),
    Decimal(f64),
    String(&'a str),
    Binary(&'a [u8]),
}

/// A decoded scalar, possibly unset, together with its metadata.
#[derive(Clone)]
pub struct Var {
    info: Arc<Varinfo>,
    value: Option<Value>,
}

impl Var {
    /// Create an unset variable.
    pub fn new(info: Arc<Varinfo>) -> Self {
        Self { info, value: None }
    }

    /// Create a variable holding a value.
    ///
    /// Fails if the value is not of the kind declared by `info`, or does not
    /// fit its declared length.
    pub fn with_value(info: Arc<Varinfo>, value: Value) -> Result<Self, ValueError> {
        validate(&info, &value)?;
        Ok(Self {
            info,
            value: Some(value),
        })
    }

    /// Create a variable from a value known to match its metadata.
    pub(crate) fn decoded(info: Arc<Varinfo>, value: Option<Value>) -> Self {
        debug_assert!(value.as_ref().is_none_or(|v| v.kind() == info.kind));
        Self { info, value }
    }

    pub fn code(&self) -> Varcode {
        self.info.code
    }

    pub fn info(&self) -> &Arc<Varinfo> {
        &self.info
    }

    pub fn isset(&self) -> bool {
        self.value.is_some()
    }

    /// The stored value, if set.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Set an integer value.
    pub fn seti(&mut self, value: i64) -> Result<(), ValueError> {
        self.set(Value::Integer(value))
    }

    /// Set a decimal value, rounding it to the scale of the variable.
    pub fn setd(&mut self, value: f64) -> Result<(), ValueError> {
        let code = self.code();
        self.require(Vartype::Decimal)?;

        if !value.is_finite() {
            Err(ValueError::NotFinite { code })?;
        }

        let scaled = scale_up(value, self.info.scale);
        if scaled.abs() >= i64::MAX as f64 {
            Err(ValueError::OutOfRange {
                code,
                len: self.info.len,
            })?;
        }

        // Round half away from zero.
        let raw = if scaled < 0.0 {
            (scaled - 0.5) as i64
        } else {
            (scaled + 0.5) as i64
        };

        self.set(Value::Decimal(raw))
    }

    /// Set a text value.
    pub fn setc(&mut self, value: &str) -> Result<(), ValueError> {
        self.set(Value::String(value.to_owned()))
    }

    /// Set a binary value.
    pub fn setb(&mut self, value: &[u8]) -> Result<(), ValueError> {
        self.set(Value::Binary(value.to_vec()))
    }

    pub fn unset(&mut self) {
        self.value = None;
    }

    fn set(&mut self, value: Value) -> Result<(), ValueError> {
        validate(&self.info, &value)?;
        self.value = Some(value);
        Ok(())
    }

    fn require(&self, kind: Vartype) -> Result<(), ValueError> {
        if self.info.kind != kind {
            Err(ValueError::Kind {
                code: self.code(),
                actual: self.info.kind,
                requested: kind,
            })?;
        }

        Ok(())
    }

    fn mismatch(&self, value: &Value) -> ValueError {
        ValueError::Kind {
            code: self.code(),
            actual: value.kind(),
            requested: self.info.kind,
        }
    }

    fn stored(&self) -> Result<&Value, ValueError> {
        self.value
            .as_ref()
            .ok_or(ValueError::Unset { code: self.code() })
    }

    /// Read an integer value.
    pub fn enqi(&self) -> Result<i64, ValueError> {
        self.require(Vartype::Integer)?;

        match self.stored()? {
            Value::Integer(v) => Ok(*v),
            other => Err(self.mismatch(other)),
        }
    }

    /// Read a numeric value as a float, applying the decimal scale.
    pub fn enqd(&self) -> Result<f64, ValueError> {
        match (self.info.kind, self.stored()?) {
            (Vartype::Integer, Value::Integer(v)) => Ok(*v as f64),
            (Vartype::Decimal, Value::Decimal(v)) => Ok(scale_down(*v, self.info.scale)),
            _ => Err(ValueError::Kind {
                code: self.code(),
                actual: self.info.kind,
                requested: Vartype::Decimal,
            }),
        }
    }

    /// Read a text value. Binary values are returned if they are valid UTF-8.
    pub fn enqc(&self) -> Result<&str, ValueError> {
        match (self.info.kind, self.stored()?) {
            (Vartype::String, Value::String(s)) => Ok(s),
            (Vartype::Binary, Value::Binary(b)) => {
                core::str::from_utf8(b).map_err(|_| ValueError::NotText { code: self.code() })
            }
            _ => Err(ValueError::Kind {
                code: self.code(),
                actual: self.info.kind,
                requested: Vartype::String,
            }),
        }
    }

    /// Read a binary value.
    pub fn enqb(&self) -> Result<&[u8], ValueError> {
        self.require(Vartype::Binary)?;

        match self.stored()? {
            Value::Binary(b) => Ok(b),
            other => Err(self.mismatch(other)),
        }
    }

    /// Read the value according to the kind of the variable.
    pub fn enq(&self) -> Result<Scalar<'_>, ValueError> {
        Ok(match self.stored()? {
            Value::Integer(v) => Scalar::Integer(*v),
            Value::Decimal(v) => Scalar::Decimal(scale_down(*v, self.info.scale)),
            Value::String(s) => Scalar::String(s),
            Value::Binary(b) => Scalar::Binary(b),
        })
    }

    /// Read the value, or `default` if the variable is unset.
    pub fn get<'a>(&'a self, default: Scalar<'a>) -> Scalar<'a> {
        self.enq().unwrap_or(default)
    }

    /// Render the value as text, writing `placeholder` if it is unset.
    ///
    /// Decimal values are written with exactly as many decimal places as
    /// their scale, so the result parses back to the same number.
    pub fn format(&self, placeholder: &str) -> String {
        match &self.value {
            None => placeholder.to_owned(),
            Some(Value::Integer(v)) => v.to_string(),
            Some(Value::Decimal(v)) => format_decimal(*v, self.info.scale),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Binary(b)) => b.iter().fold(String::new(), |mut acc, b| {
                let _ = write!(acc, "{b:02x}");
                acc
            }),
        }
    }
}

impl PartialEq for Var {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.info, &other.info) || self.info == other.info)
            && self.value == other.value
    }
}

impl Eq for Var {}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format("None"))
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(Value::String(_) | Value::Binary(_)) => {
                write!(f, "Var({}, '{}')", self.code(), self.format(""))
            }
            _ => write!(f, "Var({}, {})", self.code(), self.format("None")),
        }
    }
}

fn validate(info: &Varinfo, value: &Value) -> Result<(), ValueError> {
    let code = info.code;

    if value.kind() != info.kind {
        Err(ValueError::Kind {
            code,
            actual: value.kind(),
            requested: info.kind,
        })?;
    }

    let len = info.len;
    match value {
        Value::Integer(v) | Value::Decimal(v) => {
            let width = v.unsigned_abs().checked_ilog10().map_or(1, |l| l + 1);
            if width > len {
                Err(ValueError::OutOfRange { code, len })?;
            }
        }
        Value::String(s) if s.len() > len as usize => Err(ValueError::TooLong {
            code,
            len,
            found: s.len(),
        })?,
        Value::Binary(b) if b.len() > len as usize => Err(ValueError::TooLong {
            code,
            len,
            found: b.len(),
        })?,
        _ => {}
    }

    Ok(())
}

fn exp10(n: u32) -> f64 {
    (0..n).fold(1.0, |acc, _| acc * 10.0)
}

fn scale_down(raw: i64, scale: i32) -> f64 {
    if scale >= 0 {
        raw as f64 / exp10(scale.unsigned_abs())
    } else {
        raw as f64 * exp10(scale.unsigned_abs())
    }
}

fn scale_up(value: f64, scale: i32) -> f64 {
    if scale >= 0 {
        value * exp10(scale.unsigned_abs())
    } else {
        value / exp10(scale.unsigned_abs())
    }
}

fn format_decimal(raw: i64, scale: i32) -> String {
    if scale <= 0 {
        let mut s = raw.to_string();
        if raw != 0 {
            s.extend((0..scale.unsigned_abs()).map(|_| '0'));
        }
        return s;
    }

    let scale = scale as usize;
    let mut digits = raw.unsigned_abs().to_string();
    if digits.len() <= scale {
        digits = "0".repeat(scale + 1 - digits.len()) + &digits;
    }

    let (int, frac) = digits.split_at(digits.len() - scale);
    let sign = if raw < 0 { "-" } else { "" };

    format!("{sign}{int}.{frac}")
}
