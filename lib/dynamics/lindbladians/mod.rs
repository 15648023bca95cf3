//! Liouvillian builders for dissipative systems.
//!
//! All superoperators act on row-major vectorized density matrices, under
//! which `A ρ B` maps to `(A ⊗ Bᵀ) vec(ρ)`.

use ndarray::{ self as nd, linalg::kron };
use num_complex::Complex64 as C64;
use crate::{
    dynamics::{ dagger, Generator },
    error::{ Error, Result },
};

pub mod transmon;
pub use transmon::{ LBuilderTransmon, LTransmonParams };

/// A collapse operator representing one irreversible dissipation or dephasing
/// channel with a non-negative rate.
#[derive(Clone, Debug)]
pub struct Collapse {
    op: nd::Array2<C64>,
    rate: f64,
}

impl Collapse {
    /// Create a new `Collapse`.
    ///
    /// Fails if the operator is not square or the rate is negative. A rate of
    /// exactly zero is valid input and degenerates to unitary dynamics on the
    /// channel.
    pub fn new(op: nd::Array2<C64>, rate: f64) -> Result<Self> {
        if !op.is_square() {
            return Err(Error::DimensionMismatch(format!(
                "collapse operator must be square, got {}x{}",
                op.shape()[0], op.shape()[1],
            )));
        }
        if rate < 0.0 { return Err(Error::NegativeRate(rate)); }
        Ok(Self { op, rate })
    }

    /// Get a reference to the bare operator.
    pub fn op(&self) -> &nd::Array2<C64> { &self.op }

    /// Return the channel rate in units of angular frequency.
    pub fn rate(&self) -> f64 { self.rate }

    /// Return the rate-scaled jump operator `√γ L`.
    pub fn scaled(&self) -> nd::Array2<C64> {
        self.op.mapv(|a| self.rate.sqrt() * a)
    }
}

/// Map a Hamiltonian term to its commutator superoperator
/// `-i (H ⊗ 1 − 1 ⊗ Hᵀ)`.
pub fn hamiltonian_super(h: &nd::Array2<C64>) -> nd::Array2<C64> {
    let n = h.shape()[0];
    let eye: nd::Array2<C64> = nd::Array2::eye(n);
    (kron(h, &eye) - kron(&eye, &h.t())).mapv(|a| -C64::i() * a)
}

/// Build the dissipator superoperator
/// `Σ_k γ_k (L_k ⊗ L̄_k − ½ L_k†L_k ⊗ 1 − ½ 1 ⊗ (L_k†L_k)ᵀ)`
/// over a `dim`-dimensional Hilbert space.
///
/// Channels with zero rate contribute nothing. Fails if any channel operator
/// does not match `dim`.
pub fn dissipator(channels: &[Collapse], dim: usize)
    -> Result<nd::Array2<C64>>
{
    let mut D: nd::Array2<C64> = nd::Array2::zeros((dim * dim, dim * dim));
    let eye: nd::Array2<C64> = nd::Array2::eye(dim);
    for ch in channels.iter() {
        if ch.op.shape() != [dim, dim] {
            return Err(Error::DimensionMismatch(format!(
                "collapse operator is {}x{}, expected {}x{}",
                ch.op.shape()[0], ch.op.shape()[1], dim, dim,
            )));
        }
        if ch.rate == 0.0 { continue; }
        let l = ch.scaled();
        let l_conj = l.mapv(|a| a.conj());
        let ldl = dagger(&l).dot(&l);
        D += &kron(&l, &l_conj);
        D -= &kron(&ldl, &eye).mapv(|a| 0.5 * a);
        D -= &kron(&eye, &ldl.t()).mapv(|a| 0.5 * a);
    }
    Ok(D)
}

/// Basic requirements for any Liouvillian builder.
pub trait LBuild {
    /// Initialization data type.
    type Params;

    /// Basis type containing state energies.
    type Basis;

    /// Initialize `self`.
    fn new_operator(params: Self::Params) -> Result<Self>
    where Self: Sized;

    /// Build the decomposed Liouvillian-kind generator.
    fn build_generator(&self) -> Result<Generator>;

    /// Return a reference to the basis.
    fn get_basis(&self) -> &Self::Basis;
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        dynamics::lower,
        hilbert::{ ket, outer_prod, trace_of, unvectorize, vectorize },
    };

    #[test]
    fn negative_rate_rejected() {
        assert!(Collapse::new(lower(2), -1.0).is_err());
        assert!(Collapse::new(lower(2), 0.0).is_ok());
    }

    #[test]
    fn zero_rate_contributes_nothing() {
        let channels = vec![Collapse::new(lower(3), 0.0).unwrap()];
        let D = dissipator(&channels, 3).unwrap();
        assert!(D.iter().all(|a| a.norm() < 1e-15));
    }

    #[test]
    fn commutator_superoperator() {
        let h
            = nd::array![
                [C64::from(1.0), C64::new(0.0, 0.5)],
                [C64::new(0.0, -0.5), C64::from(-1.0)],
            ];
        let rho = outer_prod(&ket(2, 1).unwrap(), &ket(2, 1).unwrap());
        let sup = hamiltonian_super(&h);
        let lhs = unvectorize(&sup.dot(&vectorize(&rho)), 2).unwrap();
        let rhs
            = (h.dot(&rho) - rho.dot(&h)).mapv(|a| -C64::i() * a);
        for (l, r) in lhs.iter().zip(rhs.iter()) {
            assert!((l - r).norm() < 1e-12);
        }
    }

    #[test]
    fn dissipator_preserves_trace() {
        let gamma = 0.3;
        let channels = vec![Collapse::new(lower(3), gamma).unwrap()];
        let D = dissipator(&channels, 3).unwrap();
        // a state with coherences and population everywhere
        let a: nd::Array1<C64>
            = nd::array![
                C64::from(0.5), C64::new(0.5, 0.3), C64::new(0.2, -0.4)];
        let mut rho = outer_prod(&a, &a);
        rho /= trace_of(&rho);
        let drho = unvectorize(&D.dot(&vectorize(&rho)), 3).unwrap();
        assert!(trace_of(&drho).norm() < 1e-12);
    }

    #[test]
    fn excited_population_decays() {
        let gamma = 0.25;
        let channels = vec![Collapse::new(lower(2), gamma).unwrap()];
        let D = dissipator(&channels, 2).unwrap();
        let rho = outer_prod(&ket(2, 1).unwrap(), &ket(2, 1).unwrap());
        let drho = unvectorize(&D.dot(&vectorize(&rho)), 2).unwrap();
        assert!((drho[[0, 0]].re - gamma).abs() < 1e-12);
        assert!((drho[[1, 1]].re + gamma).abs() < 1e-12);
    }

    #[test]
    fn dimension_checked() {
        let channels = vec![Collapse::new(lower(2), 1.0).unwrap()];
        assert!(dissipator(&channels, 3).is_err());
    }
}
