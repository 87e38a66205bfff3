//! Top-level driver owning a stabilizer state, a seedable random number
//! generator, and a record of measurement outcomes.

use rand::{ rngs::StdRng, SeedableRng };
use tracing::debug;
use crate::{
    error::StabResult,
    gate::Gate,
    gf2::BinMatrix,
    pauli::{ NPauli, StabGroup },
    stab::{ Outcome, Stab },
};

/// Main driver for running circuits of Clifford gates and Z-basis
/// measurements on a register of qubits.
#[derive(Clone, Debug)]
pub struct StabCircuit {
    pub state: Stab,
    pub outcomes: Vec<(usize, Outcome)>,
    pub rng: StdRng,
}

impl StabCircuit {
    /// Create a new `StabCircuit` for a register of `n` qubits, with state
    /// initialized to ∣0...0⟩ and no recorded outcomes. Optionally also seed
    /// the internal random number generator; otherwise it is seeded from the
    /// operating system.
    ///
    /// *Panics if `n` is zero.*
    pub fn new(n: usize, seed: Option<u64>) -> Self {
        let rng
            = seed.map(StdRng::seed_from_u64)
            .unwrap_or_else(StdRng::from_entropy);
        debug!(n, ?seed, "new circuit");
        Self { state: Stab::new(n), outcomes: Vec::new(), rng }
    }

    /// Return the number of qubits.
    pub fn num_qubits(&self) -> usize { self.state.num_qubits() }

    /// Apply a Hadamard gate to the `k`-th qubit.
    ///
    /// *Panics if `k` is out of bounds.*
    pub fn hadamard(&mut self, k: usize) -> &mut Self {
        self.state.apply_h(k);
        self
    }

    /// Apply a CNOT gate to the `b`-th qubit, with the `a`-th qubit as control.
    ///
    /// *Panics if either index is out of bounds or `a == b`.*
    pub fn cnot(&mut self, a: usize, b: usize) -> &mut Self {
        self.state.apply_cnot(a, b);
        self
    }

    /// Apply an S gate to the `k`-th qubit.
    ///
    /// *Panics if `k` is out of bounds.*
    pub fn phase(&mut self, k: usize) -> &mut Self {
        self.state.apply_s(k);
        self
    }

    /// Swap the `a`-th and `b`-th qubits.
    ///
    /// *Panics if either index is out of bounds.*
    pub fn swap(&mut self, a: usize, b: usize) -> &mut Self {
        self.state.apply_swap(a, b);
        self
    }

    /// Perform the action of a gate, returning an error if it does not fit the
    /// register.
    pub fn apply_gate(&mut self, gate: Gate) -> StabResult<&mut Self> {
        self.state.apply_gate(gate)?;
        Ok(self)
    }

    /// Perform a series of gates, stopping at the first one that does not fit
    /// the register. Gates before the offending one remain applied.
    pub fn apply_circuit(&mut self, gates: &[Gate]) -> StabResult<&mut Self> {
        self.state.apply_circuit(gates)?;
        Ok(self)
    }

    /// Measure the `k`-th qubit in the Z-basis, record the outcome, and return
    /// the measured bit.
    ///
    /// *Panics if `k` is out of bounds.*
    pub fn measure_z(&mut self, k: usize) -> u8 {
        let outcome = self.state.measure(k, &mut self.rng);
        self.outcomes.push((k, outcome));
        outcome.as_bit()
    }

    /// Measure every qubit in order, returning the measured bits.
    pub fn measure_all(&mut self) -> Vec<u8> {
        (0..self.num_qubits()).map(|k| self.measure_z(k)).collect()
    }

    /// Return the record of every measurement performed so far, in order.
    pub fn outcomes(&self) -> &[(usize, Outcome)] { &self.outcomes }

    /// Collect the stabilizers restricted to the qubits `start..end`.
    ///
    /// See [`Stab::region_stabilizers`].
    pub fn region_stabilizers(&self, start: usize, end: usize)
        -> StabResult<BinMatrix>
    {
        self.state.region_stabilizers(start, end)
    }

    /// Calculate the entanglement entropy of the qubits `start..end` with the
    /// rest of the register.
    pub fn entanglement_entropy(&self, start: usize, end: usize)
        -> StabResult<usize>
    {
        self.state.entanglement_entropy(start, end)
    }

    /// Calculate the entanglement entropy averaged over all left/right
    /// bipartitions of the register.
    pub fn entanglement_entropy_average(&self) -> f32 {
        self.state.entanglement_entropy_average()
    }

    /// Return the stabilizer generators of the current state.
    pub fn stabilizers(&self) -> Vec<NPauli> { self.state.stabilizers() }

    /// Return the stabilizer and destabilizer groups of the current state.
    pub fn as_group(&self) -> StabGroup { self.state.as_group() }
}
