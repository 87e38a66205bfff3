//! Errors returned by the checked entry points of the simulator.

use thiserror::Error;

/// A violated precondition on a tableau operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum StabError {
    /// A qubit index was not less than the number of qubits.
    #[error("qubit index {qubit} out of bounds for a register of {n} qubits")]
    QubitOutOfBounds { qubit: usize, n: usize },

    /// A two-qubit gate was given the same qubit twice.
    #[error("two-qubit gate applied to qubit {0} twice")]
    DuplicateQubit(usize),

    /// A region was empty, reversed, or extended past the register.
    #[error("invalid region [{start}, {end}) for a register of {n} qubits")]
    InvalidRegion { start: usize, end: usize, n: usize },
}

pub type StabResult<T> = Result<T, StabError>;
