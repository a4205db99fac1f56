// Copyright (c) 2017-2021 Fabian Schuiki

//! Constant values.
//!
//! Constants are values, not instructions. The data flow graph interns them
//! per function, keyed on type and payload, which makes "same pointer value"
//! and "same operand" checks plain key comparisons.

use num::{BigInt, One, Signed, Zero};

/// The payload of a constant value.
///
/// Integers are stored in canonical unsigned form, wrapped into `[0, 2^w)`
/// for their type's width `w`. Floats are stored as the bit pattern of the
/// `f64` representation, which keeps `Eq` and `Hash` well-defined in the
/// presence of NaN.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Konst {
    /// An integer constant.
    Int(BigInt),
    /// A floating-point constant, as `f64` bits.
    Float(u64),
    /// The null pointer.
    Null,
    /// An unspecified value of any type.
    Undef,
}

impl Konst {
    /// Check whether this is the integer or float zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Konst::Int(v) => v.is_zero(),
            Konst::Float(bits) => f64::from_bits(*bits) == 0.0,
            _ => false,
        }
    }

    /// Check whether this is the integer one.
    pub fn is_one(&self) -> bool {
        match self {
            Konst::Int(v) => v.is_one(),
            _ => false,
        }
    }

    /// Get the integer payload, if this is an integer constant.
    pub fn get_int(&self) -> Option<&BigInt> {
        match self {
            Konst::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Get the float payload, if this is a float constant.
    pub fn get_float(&self) -> Option<f64> {
        match self {
            Konst::Float(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Konst {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Konst::Int(v) => write!(f, "{}", v),
            Konst::Float(bits) => write!(f, "0x{:016X}", bits),
            Konst::Null => write!(f, "null"),
            Konst::Undef => write!(f, "undef"),
        }
    }
}

/// Wrap an integer into the canonical unsigned range of a width.
pub fn wrap_to_width(value: BigInt, width: usize) -> BigInt {
    let modulus = BigInt::one() << width;
    let mut v = value % &modulus;
    if v.is_negative() {
        v += &modulus;
    }
    v
}

/// Reinterpret a canonical unsigned integer as a signed value of a width.
pub fn to_signed(value: &BigInt, width: usize) -> BigInt {
    if width == 0 {
        return BigInt::zero();
    }
    let half = BigInt::one() << (width - 1);
    if value >= &half {
        value - (BigInt::one() << width)
    } else {
        value.clone()
    }
}

/// Create an integer constant wrapped to a width.
pub fn const_int(width: usize, value: impl Into<BigInt>) -> Konst {
    Konst::Int(wrap_to_width(value.into(), width))
}

/// Create a float constant from an `f64` value.
pub fn const_float(value: f64) -> Konst {
    Konst::Float(value.to_bits())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping() {
        assert_eq!(const_int(8, -1), Konst::Int(BigInt::from(255)));
        assert_eq!(const_int(8, 256), Konst::Int(BigInt::from(0)));
        assert_eq!(to_signed(&BigInt::from(255), 8), BigInt::from(-1));
        assert_eq!(to_signed(&BigInt::from(127), 8), BigInt::from(127));
    }

    #[test]
    fn nan_constants_compare_equal() {
        assert_eq!(const_float(f64::NAN), const_float(f64::NAN));
        assert_ne!(const_float(0.0), const_float(-0.0));
    }
}
