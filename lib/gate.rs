//! Generators of the *n*-qubit Clifford group, as gate descriptions.
//!
//! See also: <https://en.wikipedia.org/wiki/Clifford_gates>

use std::fmt;
use crate::error::{ StabError, StabResult };

/// Description of a single gate for a register of `n` qubits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Hadamard
    H(usize),
    /// π/2 rotation about Z
    S(usize),
    /// Z-controlled π rotation about X.
    ///
    /// The first qubit index is the control.
    CX(usize, usize),
    /// Swap
    Swap(usize, usize),
}

impl Gate {
    /// Return `true` if `self` is `H`.
    pub fn is_h(&self) -> bool { matches!(self, Self::H(..)) }

    /// Return `true` if `self` is `S`.
    pub fn is_s(&self) -> bool { matches!(self, Self::S(..)) }

    /// Return `true` if `self` is `CX`.
    pub fn is_cx(&self) -> bool { matches!(self, Self::CX(..)) }

    /// Return `true` if `self` is `Swap`.
    pub fn is_swap(&self) -> bool { matches!(self, Self::Swap(..)) }

    /// Return the largest qubit index `self` acts on.
    pub fn max_qubit(&self) -> usize {
        match *self {
            Self::H(k) | Self::S(k) => k,
            Self::CX(a, b) | Self::Swap(a, b) => a.max(b),
        }
    }

    /// Check that `self` is applicable to a register of `n` qubits.
    ///
    /// A `CX` needs distinct control and target; a `Swap` of a qubit with
    /// itself is allowed and does nothing.
    pub fn validate(&self, n: usize) -> StabResult<()> {
        let check = |k: usize| {
            if k < n { Ok(()) } else { Err(StabError::QubitOutOfBounds { qubit: k, n }) }
        };
        match *self {
            Self::H(k) | Self::S(k) => check(k),
            Self::CX(a, b) => {
                check(a)?;
                check(b)?;
                if a == b { Err(StabError::DuplicateQubit(a)) } else { Ok(()) }
            },
            Self::Swap(a, b) => { check(a)?; check(b) },
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::H(k) => write!(f, "H({})", k),
            Self::S(k) => write!(f, "S({})", k),
            Self::CX(a, b) => write!(f, "CX({}, {})", a, b),
            Self::Swap(a, b) => write!(f, "SWAP({}, {})", a, b),
        }
    }
}
