//! Two coupled anharmonic transmons sharing a single microwave drive line.
//!
//! See also [`lindbladians::transmon`][super::super::lindbladians::transmon].

use std::f64::consts::TAU;
use ndarray as nd;
use ndarray_linalg::{ EighInto, UPLO };
use num_complex::Complex64 as C64;
use rand::{ prelude as rnd, Rng };
use crate::{
    dynamics::{
        hamiltonians::HBuild,
        lower, sitekron, dagger,
        Coeff, Generator, GeneratorKind,
    },
    error::{ Error, Result },
    hilbert::{ Basis, Transmon2 },
};

/// Physical parameters for a pair of coupled transmons in the frame rotating
/// at the drive carrier frequency.
///
/// All frequencies are in units of angular frequency.
#[derive(Copy, Clone, Debug)]
pub struct TransmonParams {
    /// Truncation dimensions, both at least 2.
    pub nlevels: (usize, usize),
    /// Bare 0 → 1 transition frequencies (ω₁, ω₂).
    pub freq: (f64, f64),
    /// Anharmonicities (α₁, α₂); negative for ordinary transmons.
    pub anharm: (f64, f64),
    /// Exchange coupling J.
    pub coupling: f64,
    /// Drive carrier frequency ω_d defining the rotating frame.
    pub frame_freq: f64,
    /// Temperature expressed as k_B T / ħ in the same angular-frequency
    /// units; values at or below 0 select the ground-state limit.
    pub temperature: f64,
}

impl TransmonParams {
    /// Return the rotating-frame detunings (ω₁ − ω_d, ω₂ − ω_d).
    pub fn detunings(&self) -> (f64, f64) {
        (self.freq.0 - self.frame_freq, self.freq.1 - self.frame_freq)
    }
}

/// Hamiltonian builder for the driven transmon pair.
///
/// The drive enters through two real-valued quadrature coefficients pairing
/// with the Hermitian operators `½ Σ_q (b_q + b_q†)` and
/// `(i/2) Σ_q (b_q† − b_q)`.
#[derive(Clone, Debug)]
pub struct HBuilderTransmon {
    pub(crate) basis: Basis<Transmon2>,
    pub params: TransmonParams,
    pub drive_re: Coeff,
    pub drive_im: Coeff,
}

impl HBuilderTransmon {
    /// Create a new `HBuilderTransmon`.
    ///
    /// Fails if either truncation dimension is less than 2.
    pub fn new(params: TransmonParams, drive_re: Coeff, drive_im: Coeff)
        -> Result<Self>
    {
        let (n1, n2) = params.nlevels;
        if n1 < 2 || n2 < 2 {
            return Err(Error::DimensionMismatch(format!(
                "truncation dimensions must be at least 2, got ({}, {})",
                n1, n2,
            )));
        }
        let (d1, d2) = params.detunings();
        let (a1, a2) = params.anharm;
        let basis: Basis<Transmon2>
            = (0..n1)
            .flat_map(|k1| (0..n2).map(move |k2| (k1, k2)))
            .map(|(k1, k2)| {
                let e1
                    = d1 * k1 as f64
                    + a1 / 2.0 * (k1 * k1.saturating_sub(1)) as f64;
                let e2
                    = d2 * k2 as f64
                    + a2 / 2.0 * (k2 * k2.saturating_sub(1)) as f64;
                (Transmon2(k1, k2), e1 + e2)
            })
            .collect();
        Ok(Self { basis, params, drive_re, drive_im })
    }

    /// Get a reference to the basis.
    pub fn basis(&self) -> &Basis<Transmon2> { &self.basis }

    /// Return the dimension of the product space.
    pub fn ndim(&self) -> usize { self.basis.len() }

    fn lowering_ops(&self) -> (nd::Array2<C64>, nd::Array2<C64>) {
        let (n1, n2) = self.params.nlevels;
        let dims = [n1, n2];
        let b1 = sitekron(&dims, 0, &lower(n1));
        let b2 = sitekron(&dims, 1, &lower(n2));
        (b1, b2)
    }

    /// Compute the static drift term: rotating-frame level shifts and
    /// anharmonicities on the diagonal plus the exchange coupling
    /// `J (b₁†b₂ + b₁b₂†)`.
    pub fn gen_drift(&self) -> nd::Array2<C64> {
        let mut H: nd::Array2<C64>
            = nd::Array2::from_diag(
                &self.basis.values().map(|e| C64::from(*e))
                    .collect::<nd::Array1<C64>>()
            );
        let (b1, b2) = self.lowering_ops();
        let exchange = dagger(&b1).dot(&b2) + dagger(&b2).dot(&b1);
        H += &exchange.mapv(|a| self.params.coupling * a);
        H
    }

    /// Compute the two Hermitian drive-quadrature operators.
    pub fn gen_drive_ops(&self) -> (nd::Array2<C64>, nd::Array2<C64>) {
        let (b1, b2) = self.lowering_ops();
        let sum = &b1 + &b2;
        let sum_dag = dagger(&sum);
        let x = (&sum + &sum_dag).mapv(|a| 0.5 * a);
        let y = (&sum_dag - &sum).mapv(|a| C64::i() / 2.0 * a);
        (x, y)
    }

    /// Build the decomposed Hamiltonian-kind [`Generator`]: the drift plus
    /// one control term per drive quadrature.
    pub fn generator(&self) -> Result<Generator> {
        let (x, y) = self.gen_drive_ops();
        Generator::new(
            GeneratorKind::Hamiltonian,
            self.gen_drift(),
            vec![
                (x, self.drive_re.clone()),
                (y, self.drive_im.clone()),
            ],
        )
    }

    /// Compute a time-independent Hamiltonian if both drive quadratures are
    /// [`Coeff::Constant`].
    pub fn gen_static(&self) -> Option<nd::Array2<C64>> {
        let Coeff::Constant(cre) = &self.drive_re else { return None; };
        let Coeff::Constant(cim) = &self.drive_im else { return None; };
        let (x, y) = self.gen_drive_ops();
        let mut H = self.gen_drift();
        H += &x.mapv(|a| *cre * a);
        H += &y.mapv(|a| *cim * a);
        Some(H)
    }

    /// Compute the time-dependent Hamiltonian at a given time as a 2D array.
    pub fn gen_at(&self, t: f64) -> nd::Array2<C64> {
        let (x, y) = self.gen_drive_ops();
        let mut H = self.gen_drift();
        H += &x.mapv(|a| self.drive_re.at(t) * a);
        H += &y.mapv(|a| self.drive_im.at(t) * a);
        H
    }

    /// Compute the time-dependent Hamiltonian as a 3D array, with the last
    /// axis corresponding to time.
    pub fn gen(&self, time: &nd::Array1<f64>) -> nd::Array3<C64> {
        let n = self.ndim();
        let nt = time.len();
        let drift = self.gen_drift();
        let (x, y) = self.gen_drive_ops();
        let cre = self.drive_re.gen_time_dep(time);
        let cim = self.drive_im.gen_time_dep(time);
        let mut H: nd::Array3<C64> = nd::Array3::zeros((n, n, nt));
        for (k, mut Hk) in H.axis_iter_mut(nd::Axis(2)).enumerate() {
            Hk.assign(&drift);
            Hk += &x.mapv(|a| cre[k] * a);
            Hk += &y.mapv(|a| cim[k] * a);
        }
        H
    }

    /// Diagonalize the drift term.
    pub fn diagonalize(&self) -> (nd::Array1<f64>, nd::Array2<C64>) {
        match self.gen_drift().eigh_into(UPLO::Lower) {
            Ok((E, V)) => (E, V),
            Err(err) => panic!("unexpected diagonalization error: {}", err),
        }
    }

    /// Diagonalize the drift term and return a ground state of the undriven
    /// system.
    pub fn ground_state(&self) -> (f64, nd::Array1<C64>) {
        let (E, V) = self.diagonalize();
        (E[0], V.slice(nd::s![.., 0]).to_owned())
    }

    fn boltzmann_weights(&self) -> nd::Array1<f64> {
        let n = self.ndim();
        if self.params.temperature <= 0.0 {
            let mut w = nd::Array1::zeros(n);
            w[0] = 1.0;
            return w;
        }
        let (w1, w2) = self.params.freq;
        let (a1, a2) = self.params.anharm;
        let beta = self.params.temperature.recip();
        let mut w: nd::Array1<f64>
            = self.basis.keys()
            .map(|s| {
                let (k1, k2) = (s.left() as f64, s.right() as f64);
                let e
                    = w1 * k1 + a1 / 2.0 * k1 * (k1 - 1.0)
                    + w2 * k2 + a2 / 2.0 * k2 * (k2 - 1.0);
                (-beta * e).exp()
            })
            .collect();
        let Z: f64 = w.sum();
        w /= Z;
        w
    }

    /// Generate a thermal state vector following a Boltzmann distribution
    /// over the bare product levels.
    ///
    /// The resulting state is given random phases on all levels, sampled
    /// uniformly over [0, 2π).
    pub fn thermal_state_vector(&self) -> nd::Array1<C64> {
        let mut rng = rnd::thread_rng();
        self.boltzmann_weights().iter()
            .map(|w| C64::from_polar(w.sqrt(), TAU * rng.gen::<f64>()))
            .collect()
    }

    /// Generate a thermal state density matrix following a Boltzmann
    /// distribution over the bare product levels.
    ///
    /// The resulting state has no off-diagonal elements and unit trace.
    pub fn thermal_state_density(&self) -> nd::Array2<C64> {
        nd::Array2::from_diag(
            &self.boltzmann_weights().mapv(C64::from)
        )
    }
}

/// Initialization data for [`HBuilderTransmon`].
#[derive(Clone, Debug)]
pub struct HTransmonParams {
    pub params: TransmonParams,
    pub drive_re: Coeff,
    pub drive_im: Coeff,
}

impl HBuild for HBuilderTransmon {
    type Params = HTransmonParams;
    type Basis = Basis<Transmon2>;

    fn new_builder(params: Self::Params) -> Result<Self> {
        let HTransmonParams { params, drive_re, drive_im } = params;
        Self::new(params, drive_re, drive_im)
    }

    fn build_static(&self) -> Option<nd::Array2<C64>> {
        self.gen_static()
    }

    fn build_at(&self, t: f64) -> nd::Array2<C64> {
        self.gen_at(t)
    }

    fn build_generator(&self) -> Result<Generator> {
        self.generator()
    }

    fn get_basis(&self) -> &Self::Basis { self.basis() }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hilbert::is_hermitian;

    fn params_2x2() -> TransmonParams {
        TransmonParams {
            nlevels: (2, 2),
            freq: (TAU * 5000.0, TAU * 5100.0),
            anharm: (TAU * -200.0, TAU * -210.0),
            coupling: TAU * -3.0,
            frame_freq: TAU * 5050.0,
            temperature: 0.0,
        }
    }

    fn zero_drive() -> (Coeff, Coeff) {
        (
            Coeff::Constant(C64::from(0.0)),
            Coeff::Constant(C64::from(0.0)),
        )
    }

    #[test]
    fn truncation_validation() {
        let mut params = params_2x2();
        params.nlevels = (1, 2);
        let (cre, cim) = zero_drive();
        assert!(HBuilderTransmon::new(params, cre, cim).is_err());
    }

    #[test]
    fn drift_structure() {
        let (cre, cim) = zero_drive();
        let h = HBuilderTransmon::new(params_2x2(), cre, cim).unwrap();
        let drift = h.gen_drift();
        assert!(is_hermitian(&drift, 1e-12));
        // rotating-frame detunings on the diagonal: states 00, 01, 10, 11
        assert!((drift[[0, 0]] - C64::from(0.0)).norm() < 1e-9);
        assert!((drift[[1, 1]] - C64::from(TAU * 50.0)).norm() < 1e-9);
        assert!((drift[[2, 2]] - C64::from(TAU * -50.0)).norm() < 1e-9);
        assert!((drift[[3, 3]] - C64::from(0.0)).norm() < 1e-9);
        // exchange coupling between 01 and 10 only
        assert!((drift[[1, 2]] - C64::from(TAU * -3.0)).norm() < 1e-9);
        assert!((drift[[2, 1]] - C64::from(TAU * -3.0)).norm() < 1e-9);
        assert!(drift[[0, 3]].norm() < 1e-12);
    }

    #[test]
    fn anharmonic_shift() {
        let mut params = params_2x2();
        params.nlevels = (3, 2);
        let (cre, cim) = zero_drive();
        let h = HBuilderTransmon::new(params, cre, cim).unwrap();
        let e20 = h.basis().get_energy(&Transmon2(2, 0)).unwrap();
        let (d1, _) = params.detunings();
        assert!((e20 - (2.0 * d1 + params.anharm.0)).abs() < 1e-9);
    }

    #[test]
    fn drive_ops_hermitian() {
        let (cre, cim) = zero_drive();
        let h = HBuilderTransmon::new(params_2x2(), cre, cim).unwrap();
        let (x, y) = h.gen_drive_ops();
        assert!(is_hermitian(&x, 1e-12));
        assert!(is_hermitian(&y, 1e-12));
        // X couples 00 to both single-excitation states with weight 1/2
        assert!((x[[0, 1]] - C64::from(0.5)).norm() < 1e-12);
        assert!((x[[0, 2]] - C64::from(0.5)).norm() < 1e-12);
    }

    #[test]
    fn static_only_for_constant_drive() {
        let (cre, cim) = zero_drive();
        let h = HBuilderTransmon::new(params_2x2(), cre, cim).unwrap();
        assert!(h.gen_static().is_some());
        let windowed = Coeff::windowed(
            1.0,
            crate::dynamics::Window::new(
                1.0, 0.1, crate::dynamics::WindowShape::Flattop),
        );
        let h = HBuilderTransmon::new(
            params_2x2(), windowed, Coeff::Constant(C64::from(0.0)),
        ).unwrap();
        assert!(h.gen_static().is_none());
        // at the plateau center the drive is fully on
        let H = h.gen_at(0.5);
        assert!((H[[0, 1]] - C64::from(0.5)).norm() < 1e-12);
    }

    #[test]
    fn generator_terms() {
        let (cre, cim) = zero_drive();
        let h = HBuilderTransmon::new(params_2x2(), cre, cim).unwrap();
        let gen = h.generator().unwrap();
        assert_eq!(gen.kind(), GeneratorKind::Hamiltonian);
        assert_eq!(gen.dim(), 4);
        assert_eq!(gen.controls().len(), 2);
    }

    #[test]
    fn thermal_states() {
        let mut params = params_2x2();
        let (cre, cim) = zero_drive();
        let h = HBuilderTransmon::new(params, cre.clone(), cim.clone())
            .unwrap();
        let rho = h.thermal_state_density();
        assert!((rho[[0, 0]] - C64::from(1.0)).norm() < 1e-15);

        params.temperature = TAU * 2000.0;
        let h = HBuilderTransmon::new(params, cre, cim).unwrap();
        let rho = h.thermal_state_density();
        let tr: C64 = rho.diag().iter().sum();
        assert!((tr.re - 1.0).abs() < 1e-12);
        // populations decrease with level energy
        assert!(rho[[0, 0]].re > rho[[1, 1]].re);
        assert!(rho[[1, 1]].re > rho[[3, 3]].re);
        let psi = h.thermal_state_vector();
        let norm: f64 = psi.iter().map(|a| a.norm_sqr()).sum();
        assert!((norm - 1.0).abs() < 1e-12);
    }
}
