//! Dissipative extension of the transmon pair: amplitude damping and pure
//! dephasing on each transmon.
//!
//! See also [`hamiltonians::transmon`][super::super::hamiltonians::transmon].

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    dynamics::{
        hamiltonians::transmon::{ HBuilderTransmon, TransmonParams },
        lindbladians::{ dissipator, hamiltonian_super, Collapse, LBuild },
        lower, number_op, sitekron,
        Coeff, Generator, GeneratorKind,
    },
    error::Result,
    hilbert::{ Basis, Transmon2 },
};

/// Initialization data for [`LBuilderTransmon`].
#[derive(Clone, Debug)]
pub struct LTransmonParams {
    pub params: TransmonParams,
    /// Amplitude-damping rates (γ₁, γ₂); the jump operators are `√γ_q b_q`.
    pub decay: (f64, f64),
    /// Pure-dephasing rates (γφ₁, γφ₂); the jump operators are `√γφ_q n_q`.
    pub dephasing: (f64, f64),
    pub drive_re: Coeff,
    pub drive_im: Coeff,
}

/// Liouvillian builder for the driven, dissipative transmon pair.
#[derive(Clone, Debug)]
pub struct LBuilderTransmon {
    pub(crate) hbuilder: HBuilderTransmon,
    pub(crate) channels: Vec<Collapse>,
}

impl LBuilderTransmon {
    /// Create a new `LBuilderTransmon`.
    ///
    /// Fails on truncation dimensions below 2 or negative rates; zero rates
    /// are valid and degenerate to unitary dynamics on the channel.
    pub fn new(lparams: LTransmonParams) -> Result<Self> {
        let LTransmonParams { params, decay, dephasing, drive_re, drive_im }
            = lparams;
        let hbuilder = HBuilderTransmon::new(params, drive_re, drive_im)?;
        let (n1, n2) = params.nlevels;
        let dims = [n1, n2];
        let channels = vec![
            Collapse::new(sitekron(&dims, 0, &lower(n1)), decay.0)?,
            Collapse::new(sitekron(&dims, 1, &lower(n2)), decay.1)?,
            Collapse::new(sitekron(&dims, 0, &number_op(n1)), dephasing.0)?,
            Collapse::new(sitekron(&dims, 1, &number_op(n2)), dephasing.1)?,
        ];
        Ok(Self { hbuilder, channels })
    }

    /// Get a reference to the underlying Hamiltonian builder.
    pub fn hbuilder(&self) -> &HBuilderTransmon { &self.hbuilder }

    /// Get a reference to the basis.
    pub fn basis(&self) -> &Basis<Transmon2> { self.hbuilder.basis() }

    /// Return the collapse channels.
    pub fn channels(&self) -> &[Collapse] { &self.channels }

    /// Build the Liouvillian-kind [`Generator`]: the vectorized commutator of
    /// the drift plus the dissipator as the static term, and the vectorized
    /// commutators of the drive quadratures as control terms with their
    /// coefficients carried over unchanged.
    pub fn generator(&self) -> Result<Generator> {
        let dim = self.hbuilder.ndim();
        let mut drift_super = hamiltonian_super(&self.hbuilder.gen_drift());
        drift_super += &dissipator(&self.channels, dim)?;
        let (x, y) = self.hbuilder.gen_drive_ops();
        Generator::new(
            GeneratorKind::Liouvillian,
            drift_super,
            vec![
                (hamiltonian_super(&x), self.hbuilder.drive_re.clone()),
                (hamiltonian_super(&y), self.hbuilder.drive_im.clone()),
            ],
        )
    }

    /// Compute the Liouvillian matrix at a given time.
    pub fn gen_at(&self, t: f64) -> nd::Array2<C64> {
        match self.generator() {
            Ok(gen) => gen.gen_at(t),
            Err(err) => panic!("unexpected generator error: {}", err),
        }
    }
}

impl LBuild for LBuilderTransmon {
    type Params = LTransmonParams;
    type Basis = Basis<Transmon2>;

    fn new_operator(params: Self::Params) -> Result<Self> {
        Self::new(params)
    }

    fn build_generator(&self) -> Result<Generator> {
        self.generator()
    }

    fn get_basis(&self) -> &Self::Basis { self.basis() }
}

#[cfg(test)]
mod test {
    use std::f64::consts::TAU;
    use super::*;
    use crate::hilbert::{ trace_of, unvectorize, vectorize };

    fn lparams(decay: (f64, f64), dephasing: (f64, f64)) -> LTransmonParams {
        LTransmonParams {
            params: TransmonParams {
                nlevels: (2, 2),
                freq: (TAU * 5000.0, TAU * 5000.0),
                anharm: (0.0, 0.0),
                coupling: 0.0,
                frame_freq: TAU * 5000.0,
                temperature: 0.0,
            },
            decay,
            dephasing,
            drive_re: Coeff::Constant(C64::from(0.0)),
            drive_im: Coeff::Constant(C64::from(0.0)),
        }
    }

    #[test]
    fn zero_rates_reduce_to_unitary() {
        let lb = LBuilderTransmon::new(lparams((0.0, 0.0), (0.0, 0.0)))
            .unwrap();
        let gen = lb.generator().unwrap();
        assert_eq!(gen.kind(), GeneratorKind::Liouvillian);
        assert_eq!(gen.dim(), 16);
        assert_eq!(gen.hilbert_dim(), 4);
        let unitary_part = hamiltonian_super(&lb.hbuilder().gen_drift());
        for (g, u) in gen.drift().iter().zip(unitary_part.iter()) {
            assert!((g - u).norm() < 1e-12);
        }
    }

    #[test]
    fn negative_rate_rejected() {
        assert!(LBuilderTransmon::new(lparams((-0.1, 0.0), (0.0, 0.0)))
            .is_err());
    }

    #[test]
    fn left_decay_feeds_ground() {
        let gamma = TAU * 0.04;
        let lb = LBuilderTransmon::new(lparams((gamma, 0.0), (0.0, 0.0)))
            .unwrap();
        let gen = lb.generator().unwrap();
        // resonant frame with no coupling: drift is dissipative only
        let rho10 = lb.basis().get_density(&Transmon2(1, 0)).unwrap();
        let drho
            = unvectorize(&gen.drift().dot(&vectorize(&rho10)), 4).unwrap();
        assert!((drho[[0, 0]].re - gamma).abs() < 1e-9);
        assert!((drho[[2, 2]].re + gamma).abs() < 1e-9);
        assert!(trace_of(&drho).norm() < 1e-9);
    }

    #[test]
    fn channel_count() {
        let lb = LBuilderTransmon::new(
            lparams((0.01, 0.02), (0.003, 0.004))).unwrap();
        assert_eq!(lb.channels().len(), 4);
        assert!(lb.channels().iter().all(|c| c.rate() >= 0.0));
    }
}
