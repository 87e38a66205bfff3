//! Single- and multi-qubit Pauli operators, and the phase algebra of their
//! products.
//!
//! A single-qubit Pauli is encoded by a pair of bits `(x, z)`:
//!
//! | `x` | `z` | Pauli |
//! | :-: | :-: | :---: |
//! | 0   | 0   | *I*   |
//! | 1   | 0   | *X*   |
//! | 1   | 1   | *Y*   |
//! | 0   | 1   | *Z*   |

use std::fmt;

/// Return the exponent `e` (not reduced) such that the product of the Pauli
/// encoded by `(x1, z1)` on the left with the Pauli encoded by `(x2, z2)` on
/// the right carries the phase *i*<sup>`e`</sup>.
///
/// For example, *XZ* = −*iY*, so `phase_exponent(true, false, false, true)`
/// is −1.
pub fn phase_exponent(x1: bool, z1: bool, x2: bool, z2: bool) -> i32 {
    let (x2, z2) = (i32::from(x2), i32::from(z2));
    match (x1, z1) {
        (true,  true ) => z2 - x2,             // Y
        (true,  false) => z2 * (2 * x2 - 1),   // X
        (false, true ) => x2 * (1 - 2 * z2),   // Z
        (false, false) => 0,                   // I
    }
}

/// A single-qubit Pauli operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pauli {
    /// Identity
    I,
    /// σ<sub>*x*</sub>
    X,
    /// σ<sub>*y*</sub>
    Y,
    /// σ<sub>*z*</sub>
    Z,
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::I => write!(f, "{}", if f.alternate() { "." } else { "I" }),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl Pauli {
    /// Decode from an `(x, z)` bit pair.
    pub fn from_xz(x: bool, z: bool) -> Self {
        match (x, z) {
            (false, false) => Self::I,
            (true,  false) => Self::X,
            (true,  true ) => Self::Y,
            (false, true ) => Self::Z,
        }
    }

    /// Encode as an `(x, z)` bit pair.
    pub fn to_xz(self) -> (bool, bool) {
        match self {
            Self::I => (false, false),
            Self::X => (true,  false),
            Self::Y => (true,  true ),
            Self::Z => (false, true ),
        }
    }

    /// Return `true` if `self` and `other` commute.
    pub fn commutes_with(self, other: Self) -> bool {
        match (self, other) {
            (_, Self::I) => true,
            (Self::I, _) => true,
            (a, b) => a == b,
        }
    }
}

/// The overall sign of a Hermitian Pauli string.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Sign {
    /// +1
    Pos,
    /// −1
    Neg,
}

impl Sign {
    /// Decode from a tableau phase bit.
    pub fn from_bit(r: u8) -> Self {
        if r == 0 { Self::Pos } else { Self::Neg }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Pos => write!(f, "+"),
            Self::Neg => write!(f, "-"),
        }
    }
}

/// A single `n`-qubit Pauli operator with a sign.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NPauli {
    pub sign: Sign,
    pub ops: Vec<Pauli>,
}

impl NPauli {
    /// Return `true` if `self` and `other` commute as `n`-qubit operators.
    ///
    /// *Panics if the two operators act on different numbers of qubits.*
    pub fn commutes_with(&self, other: &Self) -> bool {
        assert_eq!(
            self.ops.len(), other.ops.len(),
            "NPauli::commutes_with: operator sizes differ",
        );
        self.ops.iter().zip(&other.ops)
            .filter(|(a, b)| !a.commutes_with(**b))
            .count() % 2 == 0
    }
}

impl fmt::Display for NPauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.sign, f)?;
        self.ops.iter()
            .try_for_each(|p| fmt::Display::fmt(p, f))
    }
}

/// The complete `n`-qubit stabilizer/destabilizer groups for a given state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StabGroup {
    pub stab: Vec<NPauli>,
    pub destab: Vec<NPauli>,
}

impl fmt::Display for StabGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.stab.len();
        for (k, (stab, destab)) in
            self.stab.iter().zip(&self.destab).enumerate()
        {
            fmt::Display::fmt(stab, f)?;
            write!(f, " | ")?;
            fmt::Display::fmt(destab, f)?;
            if k < n - 1 { writeln!(f)?; }
        }
        Ok(())
    }
}
