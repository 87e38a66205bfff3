//! *n*-qubit stabilizer states in the Aaronson-Gottesman [tableau][tableau]
//! representation.
//!
//! A stabilizer state of *n* qubits is identified by *n* independent, mutually
//! commuting Pauli strings that leave it unchanged. Each single-qubit Pauli
//! takes two bits to encode and each string carries a sign, so the whole state
//! fits in *O*(*n*<sup>2</sup>) bits instead of the *O*(2<sup>*n*</sup>)
//! amplitudes of a state vector.
//!
//! The tableau kept here has 2*n* + 1 rows. Rows 0, ..., *n* − 1 hold the
//! "destabilizers", rows *n*, ..., 2*n* − 1 hold the stabilizers proper, and
//! row 2*n* is scratch space for deterministic measurements. The *j*-th X and Z
//! bits of a row give its Pauli on qubit *j* (see [`crate::pauli`]), and each
//! row has a sign bit (0 for +1, 1 for −1). Clifford gates act on the tableau
//! as bitwise column operations in *O*(*n*) time; measurements take
//! *O*(*n*<sup>2</sup>).
//!
//! Entanglement entropy of a contiguous region *A* is computed as the GF(2)
//! rank of the stabilizers restricted to *A*, minus |*A*|
//! ([arXiv:1901.08092][entropy1], [arXiv:1608.06950][entropy2]).
//!
//! # Example
//! ```
//! use chp_sim::stab::Stab;
//! use rand::{ rngs::StdRng, SeedableRng };
//!
//! let mut rng = StdRng::seed_from_u64(10546);
//!
//! // initialize a new state to ∣000⟩ and prepare a GHZ state
//! let mut stab = Stab::new(3);
//! stab.apply_h(2).apply_cnot(2, 1).apply_cnot(2, 0);
//!
//! // `#` formatter suppresses identities
//! println!("{:#}", stab.as_group());
//! assert_eq!(stab.entanglement_entropy(0, 2), Ok(1));
//!
//! let a = stab.measure(0, &mut rng);
//! let b = stab.measure(1, &mut rng);
//! assert_eq!(a.as_bit(), b.as_bit());
//! assert_eq!(stab.entanglement_entropy(0, 2), Ok(0));
//! ```
//!
//! [tableau]: https://arxiv.org/abs/quant-ph/0406196
//! [entropy1]: https://arxiv.org/abs/1901.08092
//! [entropy2]: https://arxiv.org/abs/1608.06950

use std::fmt;
use nalgebra as na;
use rand::Rng;
use tracing::{ debug, trace };
use crate::{
    error::{ StabError, StabResult },
    gate::Gate,
    gf2::{ self, BinMatrix },
    pauli::{ phase_exponent, NPauli, Pauli, Sign, StabGroup },
};

const PW: [u32; 32] = [ // PW[i] = 2^i
    1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768,
    65536, 131072, 262144, 524288, 1048576, 2097152, 4194304, 8388608, 16777216,
    33554432, 67108864, 134217728, 268435456, 536870912, 1073741824, 2147483648
];

/// A stabilizer state of a finite register of qubits, identified by its
/// stabilizer group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stab {
    pub(crate) n: usize,
    // `x` and `z` are bit arrays of size (2n + 1) × n; for space efficiency,
    // the columns are packed into u32s
    pub(crate) x: na::DMatrix<u32>, // Pauli-X bits; size (2n + 1) × over32
    pub(crate) z: na::DMatrix<u32>, // Pauli-Z bits; size (2n + 1) × over32
    pub(crate) r: na::DVector<u8>, // signs (0 for +1, 1 for -1); size 2n + 1
    pub(crate) over32: usize, // = floor(n / 32) + 1
}

impl Stab {
    /// Create a new stabilizer state of size `n` initialized to ∣0...0⟩.
    ///
    /// Destabilizer `i` is *X*<sub>`i`</sub> and stabilizer `i` is
    /// *Z*<sub>`i`</sub>, all with sign +1.
    ///
    /// *Panics if `n` is zero.*
    pub fn new(n: usize) -> Self {
        assert!(n > 0, "Stab::new: register must have at least one qubit");
        let over32: usize = (n >> 5) + 1;
        let mut x: na::DMatrix<u32> = na::DMatrix::zeros(2 * n + 1, over32);
        let mut z: na::DMatrix<u32> = na::DMatrix::zeros(2 * n + 1, over32);
        let r: na::DVector<u8> = na::DVector::zeros(2 * n + 1);
        let mut j: usize;
        for i in 0..2 * n {
            if i < n {
                x[(i, i >> 5)] = PW[i & 31];
            } else {
                j = i - n;
                z[(i, j >> 5)] = PW[j & 31];
            }
        }
        debug!(n, "initialized stabilizer state");
        Self { n, x, z, r, over32 }
    }

    /// Return the number of qubits.
    pub fn num_qubits(&self) -> usize { self.n }

    fn check_qubit(&self, k: usize, op: &str) {
        assert!(
            k < self.n,
            "Stab::{}: qubit index {} out of bounds for {} qubits",
            op, k, self.n,
        );
    }

    /// Return the X bit of row `i` on qubit `k`.
    ///
    /// *Panics if `i > 2n` or `k >= n`.*
    pub fn x_bit(&self, i: usize, k: usize) -> bool {
        self.check_qubit(k, "x_bit");
        self.x[(i, k >> 5)] & PW[k & 31] != 0
    }

    /// Return the Z bit of row `i` on qubit `k`.
    ///
    /// *Panics if `i > 2n` or `k >= n`.*
    pub fn z_bit(&self, i: usize, k: usize) -> bool {
        self.check_qubit(k, "z_bit");
        self.z[(i, k >> 5)] & PW[k & 31] != 0
    }

    /// Return the sign bit of row `i` (0 for +1, 1 for −1).
    ///
    /// *Panics if `i > 2n`.*
    pub fn sign(&self, i: usize) -> u8 { self.r[i] }

    /// Apply a Hadamard gate to the `k`-th qubit.
    ///
    /// *Panics if `k` is out of bounds.*
    pub fn apply_h(&mut self, k: usize) -> &mut Self {
        self.check_qubit(k, "apply_h");
        self.apply_h_unchecked(k)
    }

    fn apply_h_unchecked(&mut self, k: usize) -> &mut Self {
        trace!(qubit = k, "H");
        let k5: usize = k >> 5;
        let pw: u32 = PW[k & 31];
        let mut tmp: u32;
        for ((x_i_k5, z_i_k5), r_i) in
            self.x.column_mut(k5).iter_mut()
                .zip(self.z.column_mut(k5).iter_mut())
                .zip(self.r.iter_mut())
                .take(2 * self.n)
        {
            if *x_i_k5 & pw != 0 && *z_i_k5 & pw != 0 { *r_i ^= 1; }
            tmp = *x_i_k5;
            *x_i_k5 ^= (*x_i_k5 ^ *z_i_k5) & pw;
            *z_i_k5 ^= (*z_i_k5 ^ tmp) & pw;
        }
        self
    }

    /// Apply an S gate (= Z(π/2)) to the `k`-th qubit.
    ///
    /// *Panics if `k` is out of bounds.*
    pub fn apply_s(&mut self, k: usize) -> &mut Self {
        self.check_qubit(k, "apply_s");
        self.apply_s_unchecked(k)
    }

    fn apply_s_unchecked(&mut self, k: usize) -> &mut Self {
        trace!(qubit = k, "S");
        let k5: usize = k >> 5;
        let pw: u32 = PW[k & 31];
        for ((x_i_k5, z_i_k5), r_i) in
            self.x.column(k5).iter()
                .zip(self.z.column_mut(k5).iter_mut())
                .zip(self.r.iter_mut())
                .take(2 * self.n)
        {
            if *x_i_k5 & pw != 0 && *z_i_k5 & pw != 0 { *r_i ^= 1; }
            *z_i_k5 ^= *x_i_k5 & pw;
        }
        self
    }

    /// Apply a CNOT gate to the `b`-th qubit, with the `a`-th qubit as control.
    ///
    /// *Panics if either index is out of bounds or `a == b`.*
    pub fn apply_cnot(&mut self, a: usize, b: usize) -> &mut Self {
        self.check_qubit(a, "apply_cnot");
        self.check_qubit(b, "apply_cnot");
        assert_ne!(a, b, "Stab::apply_cnot: control and target must differ");
        self.apply_cnot_unchecked(a, b)
    }

    fn apply_cnot_unchecked(&mut self, a: usize, b: usize) -> &mut Self {
        trace!(control = a, target = b, "CX");
        let a5: usize = a >> 5;
        let b5: usize = b >> 5;
        let pwa: u32 = PW[a & 31];
        let pwb: u32 = PW[b & 31];
        for ((mut x_i, mut z_i), r_i) in
            self.x.row_iter_mut()
                .zip(self.z.row_iter_mut())
                .zip(self.r.iter_mut())
                .take(2 * self.n)
        {
            let xa = x_i[a5] & pwa != 0;
            let za = z_i[a5] & pwa != 0;
            let xb = x_i[b5] & pwb != 0;
            let zb = z_i[b5] & pwb != 0;
            // r ^= x_a z_b (x_b ⊕ z_a ⊕ 1)
            if xa && zb && xb == za { *r_i ^= 1; }
            if xa { x_i[b5] ^= pwb; }
            if zb { z_i[a5] ^= pwa; }
        }
        self
    }

    /// Apply a SWAP gate to the `a`-th and `b`-th qubits.
    ///
    /// Does nothing if `a == b`.
    ///
    /// *Panics if either index is out of bounds.*
    pub fn apply_swap(&mut self, a: usize, b: usize) -> &mut Self {
        self.check_qubit(a, "apply_swap");
        self.check_qubit(b, "apply_swap");
        if a == b { return self; }
        self.apply_swap_unchecked(a, b)
    }

    fn apply_swap_unchecked(&mut self, a: usize, b: usize) -> &mut Self {
        trace!(a, b, "SWAP");
        let a5: usize = a >> 5;
        let b5: usize = b >> 5;
        let pwa: u32 = PW[a & 31];
        let pwb: u32 = PW[b & 31];
        for (mut x_i, mut z_i) in
            self.x.row_iter_mut()
                .zip(self.z.row_iter_mut())
                .take(2 * self.n)
        {
            if (x_i[a5] & pwa != 0) != (x_i[b5] & pwb != 0) {
                x_i[a5] ^= pwa;
                x_i[b5] ^= pwb;
            }
            if (z_i[a5] & pwa != 0) != (z_i[b5] & pwb != 0) {
                z_i[a5] ^= pwa;
                z_i[b5] ^= pwb;
            }
        }
        self
    }

    /// Perform the action of a gate.
    ///
    /// Returns an error and leaves `self` untouched if the gate does not fit
    /// the register (see [`Gate::validate`]).
    pub fn apply_gate(&mut self, gate: Gate) -> StabResult<&mut Self> {
        gate.validate(self.n)?;
        let this
            = match gate {
                Gate::H(k) => self.apply_h_unchecked(k),
                Gate::S(k) => self.apply_s_unchecked(k),
                Gate::CX(a, b) => self.apply_cnot_unchecked(a, b),
                Gate::Swap(a, b) if a == b => self,
                Gate::Swap(a, b) => self.apply_swap_unchecked(a, b),
            };
        Ok(this)
    }

    /// Perform a series of gates, stopping at the first one that does not fit
    /// the register.
    pub fn apply_circuit<'a, I>(&mut self, gates: I) -> StabResult<&mut Self>
    where I: IntoIterator<Item = &'a Gate>
    {
        for gate in gates.into_iter() {
            self.apply_gate(*gate)?;
        }
        Ok(self)
    }

    // set row b equal to row a
    pub(crate) fn row_copy(&mut self, a: usize, b: usize) -> &mut Self {
        for (mut x_j, mut z_j) in
            self.x.column_iter_mut()
                .zip(self.z.column_iter_mut())
        {
            x_j[b] = x_j[a];
            z_j[b] = z_j[a];
        }
        self.r[b] = self.r[a];
        self
    }

    // set row k to the identity with sign +1
    pub(crate) fn row_zero(&mut self, k: usize) -> &mut Self {
        self.x.fill_row(k, 0);
        self.z.fill_row(k, 0);
        self.r[k] = 0;
        self
    }

    // left-multiply row h's operator by row j's operator and store the result
    // in row h; row j is unchanged
    //
    // the product of two rows with real signs is real whenever they commute,
    // which holds for every call made during measurement
    pub(crate) fn row_sum(&mut self, h: usize, j: usize) -> &mut Self {
        let mut m: i32 = 2 * (i32::from(self.r[h]) + i32::from(self.r[j]));
        let mut k5: usize;
        let mut pw: u32;
        for k in 0..self.n {
            k5 = k >> 5;
            pw = PW[k & 31];
            m += phase_exponent(
                self.x[(j, k5)] & pw != 0,
                self.z[(j, k5)] & pw != 0,
                self.x[(h, k5)] & pw != 0,
                self.z[(h, k5)] & pw != 0,
            );
        }
        for w in 0..self.over32 {
            let xjw = self.x[(j, w)];
            let zjw = self.z[(j, w)];
            self.x[(h, w)] ^= xjw;
            self.z[(h, w)] ^= zjw;
        }
        self.r[h] = (m.rem_euclid(4) / 2) as u8;
        self
    }

    /// Perform a projective measurement on a qubit `k` in the Z-basis,
    /// returning the outcome of the measurement.
    ///
    /// The measurement is random if some stabilizer anticommutes with
    /// *Z*<sub>`k`</sub>, in which case the outcome is a uniform bit drawn from
    /// `rng` and the state collapses to the corresponding eigenstate.
    /// Otherwise the outcome is fixed by the stabilizer group, computed in the
    /// scratch row, and every other row is left unchanged.
    ///
    /// *Panics if `k` is out of bounds.*
    pub fn measure<R>(&mut self, k: usize, rng: &mut R) -> Outcome
    where R: Rng + ?Sized
    {
        self.check_qubit(k, "measure");
        let n = self.n;
        let k5: usize = k >> 5;
        let pw: u32 = PW[k & 31];

        let maybe_p: Option<usize>
            = (n..2 * n).find(|p| self.x[(*p, k5)] & pw != 0);

        let outcome
            = if let Some(p) = maybe_p {
                for i in 0..2 * n {
                    if i != p && self.x[(i, k5)] & pw != 0 { self.row_sum(i, p); }
                }
                self.row_copy(p, p - n);
                self.row_zero(p);
                self.z[(p, k5)] = pw;
                self.r[p] = u8::from(rng.gen::<bool>());
                if self.r[p] != 0 { Outcome::Rand1 } else { Outcome::Rand0 }
            } else {
                self.row_zero(2 * n);
                for i in 0..n {
                    if self.x[(i, k5)] & pw != 0 { self.row_sum(2 * n, i + n); }
                }
                if self.r[2 * n] != 0 { Outcome::Det1 } else { Outcome::Det0 }
            };
        debug!(qubit = k, ?outcome, "measured");
        outcome
    }

    fn row_as_npauli(&self, i: usize) -> NPauli {
        let ops: Vec<Pauli>
            = (0..self.n)
            .map(|k| {
                let k5: usize = k >> 5;
                let pw: u32 = PW[k & 31];
                Pauli::from_xz(self.x[(i, k5)] & pw != 0, self.z[(i, k5)] & pw != 0)
            })
            .collect();
        NPauli { sign: Sign::from_bit(self.r[i]), ops }
    }

    /// Return the stabilizer generators as signed Pauli strings, in tableau
    /// order.
    pub fn stabilizers(&self) -> Vec<NPauli> {
        (self.n..2 * self.n).map(|i| self.row_as_npauli(i)).collect()
    }

    /// Return the destabilizer generators as signed Pauli strings, in tableau
    /// order.
    pub fn destabilizers(&self) -> Vec<NPauli> {
        (0..self.n).map(|i| self.row_as_npauli(i)).collect()
    }

    /// Convert `self` to a more human-readable stabilizer/destabilizer group
    /// representation.
    pub fn as_group(&self) -> StabGroup {
        StabGroup { stab: self.stabilizers(), destab: self.destabilizers() }
    }

    /// Return a copy of the full tableau, including the scratch row.
    ///
    /// The tableau is returned as a `(2n + 1) × 2n` binary matrix `T` with the
    /// vector of sign bits. For `0 ≤ j < n`,
    ///
    /// | <code>T[_, j]</code> | <code>T[_, n + j]</code> | Pauli |
    /// | :------------------: | :----------------------: | :---: |
    /// | 0                    | 0                        | *I*   |
    /// | 1                    | 0                        | *X*   |
    /// | 1                    | 1                        | *Y*   |
    /// | 0                    | 1                        | *Z*   |
    pub fn as_tableau(&self) -> (na::DMatrix<u8>, na::DVector<u8>) {
        let n = self.n;
        let tab: na::DMatrix<u8>
            = na::DMatrix::from_fn(2 * n + 1, 2 * n, |i, j| {
                if j < n {
                    u8::from(self.x[(i, j >> 5)] & PW[j & 31] != 0)
                } else {
                    u8::from(self.z[(i, (j - n) >> 5)] & PW[(j - n) & 31] != 0)
                }
            });
        (tab, self.r.clone())
    }

    fn check_region(&self, start: usize, end: usize) -> StabResult<()> {
        if start < end && end <= self.n {
            Ok(())
        } else {
            Err(StabError::InvalidRegion { start, end, n: self.n })
        }
    }

    /// Collect the stabilizers restricted to the contiguous region of qubits
    /// `start..end`.
    ///
    /// For the `i`-th qubit `k = start + i` of the region, row `2i` of the
    /// output holds the X bits on qubit `k` of all `n` stabilizers and row
    /// `2i + 1` holds their Z bits. The result is the transpose of the
    /// restricted generator matrix, so the two have the same GF(2) rank.
    pub fn region_stabilizers(&self, start: usize, end: usize)
        -> StabResult<BinMatrix>
    {
        self.check_region(start, end)?;
        Ok(self.region_stabilizers_unchecked(start, end))
    }

    fn region_stabilizers_unchecked(&self, start: usize, end: usize)
        -> BinMatrix
    {
        let n = self.n;
        let mut region = BinMatrix::zeros(2 * (end - start), n);
        let mut k5: usize;
        let mut pw: u32;
        for (i, k) in (start..end).enumerate() {
            k5 = k >> 5;
            pw = PW[k & 31];
            for s in 0..n {
                region.set(2 * i, s, self.x[(n + s, k5)] & pw != 0);
                region.set(2 * i + 1, s, self.z[(n + s, k5)] & pw != 0);
            }
        }
        region
    }

    fn entanglement_entropy_unchecked(&self, start: usize, end: usize)
        -> usize
    {
        let rank = gf2::rank(&self.region_stabilizers_unchecked(start, end));
        let entropy = rank - (end - start);
        debug!(start, end, rank, entropy, "entanglement entropy");
        entropy
    }

    /// Calculate the entanglement entropy (in bits) between the contiguous
    /// region `start..end` and the rest of the register.
    ///
    /// This is the GF(2) rank of [`Self::region_stabilizers`] minus the size
    /// of the region.
    ///
    /// See equation A19 of [arXiv:1901.08092][arxiv1], footnote 11 of
    /// [arXiv:1608.06950][arxiv2] and [this Stack Exchange thread][stackex].
    ///
    /// [arxiv1]: https://arxiv.org/abs/1901.08092
    /// [arxiv2]: https://arxiv.org/abs/1608.06950
    /// [stackex]: https://quantumcomputing.stackexchange.com/questions/16718/measuring-entanglement-entropy-using-a-stabilizer-circuit-simulator
    pub fn entanglement_entropy(&self, start: usize, end: usize)
        -> StabResult<usize>
    {
        self.check_region(start, end)?;
        Ok(self.entanglement_entropy_unchecked(start, end))
    }

    /// Calculate the entanglement entropy of the state as the average over all
    /// bipartitions `0..cut | cut..n` of the register.
    ///
    /// Returns zero for a single qubit.
    pub fn entanglement_entropy_average(&self) -> f32 {
        if self.n < 2 { return 0.0; }
        let total: usize
            = (1..self.n)
            .map(|cut| self.entanglement_entropy_unchecked(0, cut))
            .sum();
        total as f32 / (self.n - 1) as f32
    }
}

impl fmt::Display for Stab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, stab) in self.stabilizers().iter().enumerate() {
            write!(f, "{}:", k)?;
            fmt::Display::fmt(stab, f)?;
            if k < self.n - 1 { writeln!(f)?; }
        }
        Ok(())
    }
}

/// The result of a measurement, generated by [`Stab::measure`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// A deterministic outcome resulting in ∣0⟩
    Det0,
    /// A deterministic outcome resulting in ∣1⟩
    Det1,
    /// A random outcome resulting in ∣0⟩
    Rand0,
    /// A random outcome resulting in ∣1⟩
    Rand1,
}

impl Outcome {
    /// Returns `true` if `self` is `Det0` or `Rand0`.
    pub fn is_0(&self) -> bool { matches!(self, Self::Det0 | Self::Rand0) }

    /// Returns `true` if `self` is `Det1` or `Rand1`.
    pub fn is_1(&self) -> bool { matches!(self, Self::Det1 | Self::Rand1) }

    /// Returns `true` if `self` is `Rand0` or `Rand1`.
    pub fn is_random(&self) -> bool { matches!(self, Self::Rand0 | Self::Rand1) }

    /// Returns `true` if `self` is `Det0` or `Det1`.
    pub fn is_deterministic(&self) -> bool { !self.is_random() }

    /// Convert to the measured bit.
    pub fn as_bit(&self) -> u8 { u8::from(self.is_1()) }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;
    use rand::{ rngs::StdRng, SeedableRng };

    // overwrite row i with a given Pauli string and sign
    fn set_row(stab: &mut Stab, i: usize, ops: &[Pauli], r: u8) {
        stab.row_zero(i);
        for (k, op) in ops.iter().enumerate() {
            let (x, z) = op.to_xz();
            if x { stab.x[(i, k >> 5)] |= PW[k & 31]; }
            if z { stab.z[(i, k >> 5)] |= PW[k & 31]; }
        }
        stab.r[i] = r;
    }

    fn ops(stab: &Stab, i: usize) -> Vec<Pauli> { stab.row_as_npauli(i).ops }

    fn check_invariants(stab: &Stab) {
        let stabs = stab.stabilizers();
        let destabs = stab.destabilizers();
        for (i, si) in stabs.iter().enumerate() {
            for (j, sj) in stabs.iter().enumerate() {
                assert!(si.commutes_with(sj), "stabilizers {} and {} anticommute", i, j);
            }
            for (j, dj) in destabs.iter().enumerate() {
                assert_eq!(
                    si.commutes_with(dj), i != j,
                    "stabilizer {} vs destabilizer {}", i, j,
                );
            }
        }
        assert!(stab.r.iter().all(|r| *r <= 1));
    }

    #[test]
    fn new_is_computational_basis() {
        let stab = Stab::new(3);
        let (tab, r) = stab.as_tableau();
        assert_eq!(tab.nrows(), 7);
        assert_eq!(tab.ncols(), 6);
        for i in 0..7 {
            for j in 0..6 {
                assert_eq!(tab[(i, j)], u8::from(i == j));
            }
        }
        assert!(r.iter().all(|ri| *ri == 0));
        assert_eq!(stab.to_string(), "0:+ZII\n1:+IZI\n2:+IIZ");
        check_invariants(&stab);
    }

    #[test]
    #[should_panic]
    fn new_empty_register() { Stab::new(0); }

    #[test]
    fn fresh_state_is_unentangled() {
        for n in 1..=6 {
            let stab = Stab::new(n);
            for start in 0..n {
                for end in start + 1..=n {
                    assert_eq!(stab.entanglement_entropy(start, end), Ok(0));
                }
            }
            assert_eq!(stab.entanglement_entropy_average(), 0.0);
        }
    }

    #[test]
    fn single_qubit_gates() {
        let mut stab = Stab::new(1);
        stab.apply_h(0);
        assert_eq!(stab.stabilizers()[0].to_string(), "+X");
        stab.apply_s(0);
        assert_eq!(stab.stabilizers()[0].to_string(), "+Y");
        stab.apply_s(0);
        assert_eq!(stab.stabilizers()[0].to_string(), "-X");
        stab.apply_h(0);
        assert_eq!(stab.stabilizers()[0].to_string(), "-Z");
        check_invariants(&stab);
    }

    #[test]
    fn cnot_propagation() {
        let mut stab = Stab::new(2);
        stab.apply_h(0).apply_cnot(0, 1);
        let group = stab.as_group();
        assert_eq!(group.stab[0].to_string(), "+XX");
        assert_eq!(group.stab[1].to_string(), "+ZZ");
        assert_eq!(group.destab[0].to_string(), "+ZI");
        assert_eq!(group.destab[1].to_string(), "+IX");
        check_invariants(&stab);
    }

    #[test]
    fn group_display() {
        let mut stab = Stab::new(3);
        stab.apply_h(2).apply_cnot(2, 1).apply_cnot(2, 0);
        let group = stab.as_group();
        assert_eq!(
            format!("{}", group),
            "+ZIZ | +XII\n+IZZ | +IXI\n+XXX | +IIZ",
        );
        assert_eq!(
            format!("{:#}", group),
            "+Z.Z | +X..\n+.ZZ | +.X.\n+XXX | +..Z",
        );
        assert_eq!(stab.to_string(), "0:+ZIZ\n1:+IZZ\n2:+XXX");
        assert_eq!(group.destab, stab.destabilizers());
    }

    #[test]
    fn bit_access_matches_tableau() {
        let mut stab = Stab::new(3);
        stab.apply_h(2).apply_cnot(2, 1).apply_cnot(2, 0).apply_s(1);
        let (tab, r) = stab.as_tableau();
        for i in 0..7 {
            for k in 0..3 {
                assert_eq!(stab.x_bit(i, k), tab[(i, k)] != 0);
                assert_eq!(stab.z_bit(i, k), tab[(i, 3 + k)] != 0);
            }
            assert_eq!(stab.sign(i), r[i]);
        }
        // XXX -> XYX under S on qubit 1
        assert!(stab.x_bit(5, 1) && stab.z_bit(5, 1));
        assert!(stab.x_bit(5, 0) && !stab.z_bit(5, 0));
    }

    #[test]
    fn swap_moves_entanglement() {
        let mut stab = Stab::new(3);
        stab.apply_h(0).apply_cnot(0, 1).apply_swap(1, 2);
        assert_eq!(stab.entanglement_entropy(0, 1), Ok(1));
        assert_eq!(stab.entanglement_entropy(1, 2), Ok(0));
        assert_eq!(stab.entanglement_entropy(0, 2), Ok(1));
        assert_eq!(stab.entanglement_entropy(2, 3), Ok(1));
        let before = stab.clone();
        stab.apply_swap(1, 1);
        assert_eq!(stab, before);
    }

    #[test]
    fn gates_across_words() {
        let mut stab = Stab::new(40);
        stab.apply_h(35).apply_cnot(35, 3);
        assert_eq!(stab.entanglement_entropy(0, 4), Ok(1));
        assert_eq!(stab.entanglement_entropy(0, 35), Ok(1));
        assert_eq!(stab.entanglement_entropy(3, 36), Ok(0));
        stab.apply_swap(3, 34);
        assert_eq!(stab.entanglement_entropy(0, 4), Ok(0));
        assert_eq!(stab.entanglement_entropy(34, 36), Ok(0));
        assert_eq!(stab.entanglement_entropy(34, 35), Ok(1));
        check_invariants(&stab);
    }

    #[test]
    #[should_panic]
    fn gate_out_of_bounds() { Stab::new(2).apply_h(2); }

    #[test]
    #[should_panic]
    fn cnot_same_qubit() { Stab::new(2).apply_cnot(1, 1); }

    #[test]
    fn apply_gate_checked() {
        let mut stab = Stab::new(2);
        let before = stab.clone();
        assert_eq!(
            stab.apply_gate(Gate::H(2)).map(|_| ()),
            Err(StabError::QubitOutOfBounds { qubit: 2, n: 2 }),
        );
        assert_eq!(
            stab.apply_gate(Gate::CX(0, 0)).map(|_| ()),
            Err(StabError::DuplicateQubit(0)),
        );
        assert_eq!(stab, before);

        let gates = [Gate::H(0), Gate::CX(0, 1), Gate::S(5), Gate::H(1)];
        assert!(stab.apply_circuit(&gates).is_err());
        let mut expected = Stab::new(2);
        expected.apply_h(0).apply_cnot(0, 1);
        assert_eq!(stab, expected);
    }

    #[test]
    fn row_sum_single_qubit() {
        let mut stab = Stab::new(1);
        // row 0 = +X, row 1 = +Z; X·Z = -iY
        stab.row_sum(1, 0);
        assert_eq!(ops(&stab, 1), vec![Pauli::Y]);
        assert_eq!(stab.sign(1), 1);
        assert_eq!(ops(&stab, 0), vec![Pauli::X]);
        assert_eq!(stab.sign(0), 0);

        // not idempotent: X·(-Y) gives Z, still with the sign bit set
        stab.row_sum(1, 0);
        assert_eq!(ops(&stab, 1), vec![Pauli::Z]);
        assert_eq!(stab.sign(1), 1);
    }

    #[test]
    fn row_sum_two_qubits() {
        let mut stab = Stab::new(2);
        // XX·ZZ = (XZ)(XZ) = -YY
        set_row(&mut stab, 2, &[Pauli::Z, Pauli::Z], 0);
        set_row(&mut stab, 3, &[Pauli::X, Pauli::X], 0);
        stab.row_sum(2, 3);
        assert_eq!(ops(&stab, 2), vec![Pauli::Y, Pauli::Y]);
        assert_eq!(stab.sign(2), 1);
        assert_eq!(ops(&stab, 3), vec![Pauli::X, Pauli::X]);

        // XX·(-ZZ) = +YY
        set_row(&mut stab, 2, &[Pauli::Z, Pauli::Z], 1);
        stab.row_sum(2, 3);
        assert_eq!(ops(&stab, 2), vec![Pauli::Y, Pauli::Y]);
        assert_eq!(stab.sign(2), 0);

        // (-XI)·(IZ) = -XZ
        set_row(&mut stab, 2, &[Pauli::I, Pauli::Z], 0);
        set_row(&mut stab, 3, &[Pauli::X, Pauli::I], 1);
        stab.row_sum(2, 3);
        assert_eq!(ops(&stab, 2), vec![Pauli::X, Pauli::Z]);
        assert_eq!(stab.sign(2), 1);
    }

    #[test]
    fn measure_fresh_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(10546);
        let mut stab = Stab::new(4);
        stab.apply_cnot(0, 1).apply_swap(2, 3);
        let before = stab.clone();
        for k in 0..4 {
            assert_eq!(stab.measure(k, &mut rng), Outcome::Det0);
        }
        assert_eq!(stab.as_group(), before.as_group());
        // only the scratch row may differ
        assert_eq!(
            stab.x.rows(0, 8).clone_owned(),
            before.x.rows(0, 8).clone_owned(),
        );
        assert_eq!(
            stab.z.rows(0, 8).clone_owned(),
            before.z.rows(0, 8).clone_owned(),
        );
        assert_eq!(stab.r.rows(0, 8).clone_owned(), before.r.rows(0, 8).clone_owned());
    }

    #[test]
    fn measure_flipped_is_deterministic_one() {
        let mut rng = StdRng::seed_from_u64(10546);
        let mut stab = Stab::new(2);
        // H S S H = X
        stab.apply_h(1).apply_s(1).apply_s(1).apply_h(1);
        assert_eq!(stab.measure(0, &mut rng), Outcome::Det0);
        assert_eq!(stab.measure(1, &mut rng), Outcome::Det1);
        assert_eq!(stab.measure(1, &mut rng), Outcome::Det1);
    }

    #[test]
    fn measure_plus_is_random() {
        let mut rng = StdRng::seed_from_u64(10546);
        let trials: usize = 2000;
        let mut ones: usize = 0;
        for _ in 0..trials {
            let mut stab = Stab::new(1);
            stab.apply_h(0);
            let outcome = stab.measure(0, &mut rng);
            assert!(outcome.is_random());
            let expected = if outcome.is_1() { "-Z" } else { "+Z" };
            assert_eq!(stab.stabilizers()[0].to_string(), expected);
            // collapsed: measuring again is deterministic and agrees
            let again = stab.measure(0, &mut rng);
            assert!(again.is_deterministic());
            assert_eq!(again.as_bit(), outcome.as_bit());
            check_invariants(&stab);
            ones += usize::from(outcome.as_bit());
        }
        assert!((900..=1100).contains(&ones), "{} ones in {} trials", ones, trials);
    }

    #[test]
    fn outcome_predicates() {
        for (outcome, bit, random) in [
            (Outcome::Det0, 0, false),
            (Outcome::Det1, 1, false),
            (Outcome::Rand0, 0, true),
            (Outcome::Rand1, 1, true),
        ] {
            assert_eq!(outcome.as_bit(), bit);
            assert_eq!(outcome.is_0(), bit == 0);
            assert_eq!(outcome.is_1(), bit == 1);
            assert_eq!(outcome.is_random(), random);
            assert_eq!(outcome.is_deterministic(), !random);
        }
    }

    #[test]
    fn measure_is_reproducible_under_seed() {
        let run = |seed: u64| -> Vec<u8> {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut stab = Stab::new(6);
            (0..6).for_each(|k| { stab.apply_h(k); });
            (0..6).map(|k| stab.measure(k, &mut rng).as_bit()).collect()
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn ghz() {
        let mut rng = StdRng::seed_from_u64(10546);
        for _ in 0..50 {
            let mut stab = Stab::new(3);
            stab.apply_h(2).apply_cnot(2, 1).apply_cnot(2, 0);
            let stabs: Vec<String>
                = stab.stabilizers().iter().map(|s| s.to_string()).collect();
            assert!(stabs.contains(&"+XXX".to_string()));
            assert!(stabs.contains(&"+ZIZ".to_string()));
            assert!(stabs.contains(&"+IZZ".to_string()));
            check_invariants(&stab);
            assert_eq!(stab.entanglement_entropy(0, 2), Ok(1));
            assert_eq!(stab.entanglement_entropy(0, 1), Ok(1));
            assert_eq!(stab.entanglement_entropy(0, 3), Ok(0));
            assert_eq!(stab.entanglement_entropy_average(), 1.0);

            let outcomes: Vec<Outcome>
                = (0..3).map(|k| stab.measure(k, &mut rng)).collect();
            assert!(outcomes[0].is_random());
            assert!(outcomes[1].is_deterministic());
            assert!(outcomes[2].is_deterministic());
            assert!(outcomes.iter().all(|o| o.as_bit() == outcomes[0].as_bit()));
            check_invariants(&stab);
            assert_eq!(stab.entanglement_entropy(0, 2), Ok(0));
        }
    }

    #[test]
    fn region_bounds() {
        let stab = Stab::new(3);
        for (start, end) in [(2, 1), (1, 1), (0, 4), (3, 3)] {
            assert_eq!(
                stab.region_stabilizers(start, end),
                Err(StabError::InvalidRegion { start, end, n: 3 }),
            );
            assert_eq!(
                stab.entanglement_entropy(start, end),
                Err(StabError::InvalidRegion { start, end, n: 3 }),
            );
        }
    }

    #[test]
    fn region_stabilizers_layout() {
        let mut stab = Stab::new(3);
        stab.apply_h(2).apply_cnot(2, 1).apply_cnot(2, 0);
        // stabilizers in tableau order: ZIZ, IZZ, XXX
        let region = stab.region_stabilizers(1, 3).unwrap();
        assert_eq!(region.nrows(), 4);
        assert_eq!(region.ncols(), 3);
        let expected = BinMatrix::from_rows(&[
            [0_u8, 0, 1], // X bits on qubit 1
            [0, 1, 0],    // Z bits on qubit 1
            [0, 0, 1],    // X bits on qubit 2
            [1, 1, 0],    // Z bits on qubit 2
        ]);
        assert_eq!(region, expected);
    }

    fn gate_strategy(n: usize) -> impl Strategy<Value = Gate> {
        (0_u8..4, 0..n, 1..n)
            .prop_map(move |(kind, a, offs)| {
                let b = (a + offs) % n;
                match kind {
                    0 => Gate::H(a),
                    1 => Gate::S(a),
                    2 => Gate::CX(a, b),
                    _ => Gate::Swap(a, b),
                }
            })
    }

    proptest! {
        #[test]
        fn involutions_restore_tableau(
            circuit in prop::collection::vec(gate_strategy(5), 0..40),
            gate in gate_strategy(5),
        ) {
            prop_assume!(!gate.is_s());
            let mut stab = Stab::new(5);
            stab.apply_circuit(&circuit).unwrap();
            let before = stab.clone();
            stab.apply_gate(gate).unwrap();
            stab.apply_gate(gate).unwrap();
            prop_assert_eq!(stab, before);
        }

        #[test]
        fn s_has_order_four(
            circuit in prop::collection::vec(gate_strategy(4), 0..40),
            k in 0_usize..4,
        ) {
            let mut stab = Stab::new(4);
            stab.apply_circuit(&circuit).unwrap();
            let before = stab.clone();
            stab.apply_s(k).apply_s(k);
            stab.apply_s(k).apply_s(k);
            prop_assert_eq!(stab, before);
        }

        #[test]
        fn measurements_preserve_invariants(
            circuit in prop::collection::vec(gate_strategy(6), 0..60),
            targets in prop::collection::vec(0_usize..6, 1..12),
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut stab = Stab::new(6);
            stab.apply_circuit(&circuit).unwrap();
            check_invariants(&stab);
            for &k in targets.iter() {
                let first = stab.measure(k, &mut rng);
                let second = stab.measure(k, &mut rng);
                prop_assert!(second.is_deterministic());
                prop_assert_eq!(first.as_bit(), second.as_bit());
                check_invariants(&stab);
            }
            for start in 0..6 {
                for end in start + 1..=6 {
                    let s = stab.entanglement_entropy(start, end).unwrap();
                    prop_assert!(s <= (end - start).min(6 - (end - start)));
                }
            }
        }
    }
}
