//! Simulation of stabilizer circuits on registers of qubits, using the
//! Aaronson-Gottesman tableau representation.
//!
//! All operations are limited to Clifford-group transformations generated by
//! Hadamard, phase (S), CNOT, and SWAP gates, along with projective
//! measurements in the Z-basis. States are tracked in *O*(*n*<sup>2</sup>)
//! bits, and the entanglement entropy of any contiguous region of qubits can
//! be read off the stabilizer group.

pub mod error;
pub mod gf2;
pub mod pauli;
pub mod gate;
pub mod stab;
pub mod circuit;
