//! Constructs to build the generator of motion of a driven transmon pair as a
//! static drift plus (operator, time-dependent coefficient) control terms.

use std::f64::consts::{ PI, TAU };
use ndarray::{ self as nd, linalg::kron };
use num_complex::Complex64 as C64;
use num_traits::Zero;
use crate::error::{ Error, Result };

pub mod hamiltonians;
pub use hamiltonians::{
    transmon::{ HBuilderTransmon, HTransmonParams, TransmonParams },
    HBuild,
};

pub mod lindbladians;
pub use lindbladians::{
    transmon::{ LBuilderTransmon, LTransmonParams },
    Collapse,
    LBuild,
};

/// Names a smooth pulse window shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WindowShape {
    /// Unit amplitude over the whole window, zero outside.
    Box,
    /// Sine-squared ramps of a fixed rise time at both edges, unit plateau
    /// between them.
    Flattop,
    /// Blackman envelope over the whole window.
    Blackman,
}

/// A pulse window over `[0, duration]`, carrying its own parameters so that
/// coefficients remain inspectable plain data.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Window {
    /// Total window length.
    pub duration: f64,
    /// Edge ramp time; meaningful for [`WindowShape::Flattop`] only.
    pub rise: f64,
    /// Window shape.
    pub shape: WindowShape,
}

impl Window {
    /// Create a new `Window`.
    pub fn new(duration: f64, rise: f64, shape: WindowShape) -> Self {
        Self { duration, rise, shape }
    }

    /// Evaluate the window amplitude at a given time.
    ///
    /// Zero outside `[0, duration]`.
    pub fn at(&self, t: f64) -> f64 {
        if !(0.0..=self.duration).contains(&t) { return 0.0; }
        match self.shape {
            WindowShape::Box => 1.0,
            WindowShape::Flattop => {
                if self.rise <= 0.0 {
                    1.0
                } else if t < self.rise {
                    (PI * t / 2.0 / self.rise).sin().powi(2)
                } else if t > self.duration - self.rise {
                    (PI * (self.duration - t) / 2.0 / self.rise)
                        .sin().powi(2)
                } else {
                    1.0
                }
            },
            WindowShape::Blackman => {
                let x = t / self.duration;
                0.42 - 0.5 * (TAU * x).cos() + 0.08 * (2.0 * TAU * x).cos()
            },
        }
    }
}

/// Time-dependent scalar coefficient attached to an operator term of a
/// [`Generator`].
///
/// All variants are pure functions of time holding no hidden state, so
/// generators can be shared read-only across concurrently evaluated
/// trajectories.
#[derive(Clone, Debug, PartialEq)]
pub enum Coeff {
    /// Constant complex amplitude at all times.
    Constant(C64),
    /// A fixed complex amplitude under a smooth window.
    Windowed {
        /// Peak amplitude.
        amp: C64,
        /// Window function.
        window: Window,
    },
    /// Amplitudes sampled on a uniform time grid, linearly interpolated
    /// between samples and zero outside the grid.
    ///
    /// This is the form in which optimized per-time-step control fields are
    /// re-substituted for verification propagation.
    Sampled {
        /// Time coordinate of the first sample.
        t0: f64,
        /// Sample spacing.
        dt: f64,
        /// Sample values.
        amps: nd::Array1<C64>,
    },
}

impl Coeff {
    /// Create a new `Coeff::Windowed` with a real amplitude.
    pub fn windowed(amp: f64, window: Window) -> Self {
        Self::Windowed { amp: C64::from(amp), window }
    }

    /// Create a new `Coeff::Sampled`.
    ///
    /// Fails if fewer than two samples are supplied or `dt` is not positive.
    pub fn sampled(t0: f64, dt: f64, amps: nd::Array1<C64>) -> Result<Self> {
        if amps.len() < 2 { return Err(Error::EmptyGrid(amps.len())); }
        if dt <= 0.0 {
            return Err(Error::DimensionMismatch(format!(
                "sample spacing must be positive, got {:e}", dt,
            )));
        }
        Ok(Self::Sampled { t0, dt, amps })
    }

    /// Evaluate the coefficient at a given time.
    pub fn at(&self, t: f64) -> C64 {
        match self {
            Self::Constant(a) => *a,
            Self::Windowed { amp, window } => *amp * window.at(t),
            Self::Sampled { t0, dt, amps } => {
                let n = amps.len();
                let s = (t - t0) / dt;
                if s < 0.0 || s > (n - 1) as f64 { return C64::zero(); }
                let k = (s.floor() as usize).min(n - 2);
                let frac = s - k as f64;
                amps[k] * (1.0 - frac) + amps[k + 1] * frac
            },
        }
    }

    /// Evaluate the coefficient over an array of time coordinates.
    pub fn gen_time_dep(&self, time: &nd::Array1<f64>) -> nd::Array1<C64> {
        time.mapv(|t| self.at(t))
    }
}

/// Distinguishes whether a [`Generator`] acts on pure state vectors or on
/// row-major vectorized density matrices.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GeneratorKind {
    /// Hamiltonian acting on state vectors; propagation follows
    /// `dψ/dt = -i H(t) ψ`.
    Hamiltonian,
    /// Liouvillian acting on vectorized density matrices; propagation follows
    /// `d vec(ρ)/dt = L(t) vec(ρ)`.
    Liouvillian,
}

/// Decomposition of the generator of motion into one static term plus an
/// ordered sequence of (operator, coefficient) control terms.
///
/// All matrices are immutable after construction; only the coefficients of
/// designated control terms are replaced when optimized fields come back from
/// the optimizer.
#[derive(Clone, Debug)]
pub struct Generator {
    kind: GeneratorKind,
    drift: nd::Array2<C64>,
    controls: Vec<(nd::Array2<C64>, Coeff)>,
}

impl Generator {
    /// Create a new `Generator`.
    ///
    /// Fails if the drift is not square, if any control operator does not
    /// match the drift dimension, or if a Liouvillian's dimension is not a
    /// perfect square.
    pub fn new(
        kind: GeneratorKind,
        drift: nd::Array2<C64>,
        controls: Vec<(nd::Array2<C64>, Coeff)>,
    ) -> Result<Self>
    {
        if !drift.is_square() {
            return Err(Error::DimensionMismatch(format!(
                "drift must be square, got {}x{}",
                drift.shape()[0], drift.shape()[1],
            )));
        }
        let n = drift.shape()[0];
        for (k, (op, _)) in controls.iter().enumerate() {
            if op.shape() != [n, n] {
                return Err(Error::DimensionMismatch(format!(
                    "control operator {} is {}x{}, expected {}x{}",
                    k, op.shape()[0], op.shape()[1], n, n,
                )));
            }
        }
        if kind == GeneratorKind::Liouvillian {
            let d = (n as f64).sqrt().round() as usize;
            if d * d != n {
                return Err(Error::DimensionMismatch(format!(
                    "Liouvillian dimension {} is not a perfect square", n,
                )));
            }
        }
        Ok(Self { kind, drift, controls })
    }

    /// Return the generator kind.
    pub fn kind(&self) -> GeneratorKind { self.kind }

    /// Return the matrix dimension of the generator.
    pub fn dim(&self) -> usize { self.drift.shape()[0] }

    /// Return the dimension of the underlying Hilbert space: equal to
    /// [`Self::dim`] for a Hamiltonian and its square root for a Liouvillian.
    pub fn hilbert_dim(&self) -> usize {
        match self.kind {
            GeneratorKind::Hamiltonian => self.dim(),
            GeneratorKind::Liouvillian
                => (self.dim() as f64).sqrt().round() as usize,
        }
    }

    /// Return a reference to the static term.
    pub fn drift(&self) -> &nd::Array2<C64> { &self.drift }

    /// Return a reference to the control terms.
    pub fn controls(&self) -> &[(nd::Array2<C64>, Coeff)] { &self.controls }

    /// Replace all control coefficients, preserving the paired operators.
    ///
    /// This is the re-entry point for optimized fields. Fails if the number
    /// of coefficients does not match the number of control terms.
    pub fn set_coeffs<I>(&mut self, coeffs: I) -> Result<()>
    where I: IntoIterator<Item = Coeff>
    {
        let coeffs: Vec<Coeff> = coeffs.into_iter().collect();
        if coeffs.len() != self.controls.len() {
            return Err(Error::DimensionMismatch(format!(
                "got {} coefficients for {} control terms",
                coeffs.len(), self.controls.len(),
            )));
        }
        self.controls.iter_mut().zip(coeffs)
            .for_each(|((_, c), new)| { *c = new; });
        Ok(())
    }

    /// Compute the full generator matrix at a given time.
    pub fn gen_at(&self, t: f64) -> nd::Array2<C64> {
        let mut g = self.drift.clone();
        for (op, coeff) in self.controls.iter() {
            let c = coeff.at(t);
            if c.norm() <= 1e-15 { continue; }
            g += &op.mapv(|a| c * a);
        }
        g
    }

    /// Compute the right-hand-side matrix of the equation of motion at a
    /// given time: `-i H(t)` for a Hamiltonian, `L(t)` for a Liouvillian.
    pub fn flow_at(&self, t: f64) -> nd::Array2<C64> {
        match self.kind {
            GeneratorKind::Hamiltonian
                => self.gen_at(t).mapv(|a| -C64::i() * a),
            GeneratorKind::Liouvillian => self.gen_at(t),
        }
    }
}

/* Operators ******************************************************************/

/// Construct the `nlevels`-dimensional lowering (annihilation) operator, with
/// `⟨n-1|b|n⟩ = √n`.
pub fn lower(nlevels: usize) -> nd::Array2<C64> {
    let mut b: nd::Array2<C64> = nd::Array2::zeros((nlevels, nlevels));
    for n in 1..nlevels {
        b[[n - 1, n]] = C64::from((n as f64).sqrt());
    }
    b
}

/// Construct the `nlevels`-dimensional raising (creation) operator, with
/// `⟨n|b†|n-1⟩ = √n`.
pub fn raise(nlevels: usize) -> nd::Array2<C64> {
    let mut b: nd::Array2<C64> = nd::Array2::zeros((nlevels, nlevels));
    for n in 1..nlevels {
        b[[n, n - 1]] = C64::from((n as f64).sqrt());
    }
    b
}

/// Construct the `nlevels`-dimensional number operator `b†b`.
pub fn number_op(nlevels: usize) -> nd::Array2<C64> {
    nd::Array2::from_diag(
        &(0..nlevels).map(|n| C64::from(n as f64))
            .collect::<nd::Array1<C64>>()
    )
}

/// Compute the conjugate transpose of a matrix.
pub fn dagger(a: &nd::Array2<C64>) -> nd::Array2<C64> {
    a.t().mapv(|z| z.conj())
}

pub(crate) fn sitekron(
    dims: &[usize],
    site: usize,
    a: &nd::Array2<C64>,
) -> nd::Array2<C64>
{
    let eyesize1: usize = dims.iter().take(site).copied().product();
    let eyesize2: usize = dims.iter().skip(site + 1).copied().product();
    kron(&kron(&nd::Array2::eye(eyesize1), a), &nd::Array2::eye(eyesize2))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ladder_commutator() {
        // truncation forces [b, b†] = diag(1, ..., 1, 1 - N)
        for nlevels in 2..=6 {
            let b = lower(nlevels);
            let bdag = raise(nlevels);
            let comm = b.dot(&bdag) - bdag.dot(&b);
            for ((i, j), c) in comm.indexed_iter() {
                let expected
                    = if i != j {
                        0.0
                    } else if i == nlevels - 1 {
                        1.0 - nlevels as f64
                    } else {
                        1.0
                    };
                assert!((c - C64::from(expected)).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn number_from_ladder() {
        let n = raise(5).dot(&lower(5));
        assert_eq!(n, number_op(5));
    }

    #[test]
    fn flattop_window() {
        let w = Window::new(1.0, 0.1, WindowShape::Flattop);
        assert_eq!(w.at(-0.01), 0.0);
        assert_eq!(w.at(1.01), 0.0);
        assert_eq!(w.at(0.5), 1.0);
        assert!((w.at(0.05) - 0.5).abs() < 1e-12);
        assert!((w.at(0.95) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn blackman_window() {
        let w = Window::new(2.0, 0.0, WindowShape::Blackman);
        assert!(w.at(0.0).abs() < 1e-12);
        assert!(w.at(2.0).abs() < 1e-12);
        assert!((w.at(1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sampled_interpolation() {
        let amps: nd::Array1<C64>
            = nd::array![C64::from(0.0), C64::from(1.0), C64::from(0.5)];
        let c = Coeff::sampled(0.0, 0.5, amps).unwrap();
        assert_eq!(c.at(-0.1), C64::zero());
        assert_eq!(c.at(1.1), C64::zero());
        assert!((c.at(0.25) - C64::from(0.5)).norm() < 1e-12);
        assert!((c.at(0.75) - C64::from(0.75)).norm() < 1e-12);
        assert!((c.at(1.0) - C64::from(0.5)).norm() < 1e-12);
        assert!(Coeff::sampled(0.0, 0.5, nd::array![C64::from(1.0)]).is_err());
        assert!(
            Coeff::sampled(
                0.0, -0.5, nd::array![C64::from(1.0), C64::from(2.0)],
            )
            .is_err()
        );
    }

    #[test]
    fn generator_validation() {
        let drift = nd::Array2::<C64>::eye(4);
        let op = nd::Array2::<C64>::eye(3);
        assert!(
            Generator::new(
                GeneratorKind::Hamiltonian,
                drift.clone(),
                vec![(op, Coeff::Constant(C64::from(1.0)))],
            )
            .is_err()
        );
        // Liouvillian dimension must be a perfect square
        assert!(
            Generator::new(
                GeneratorKind::Liouvillian,
                nd::Array2::<C64>::eye(5),
                Vec::new(),
            )
            .is_err()
        );
        let gen = Generator::new(
            GeneratorKind::Liouvillian, drift, Vec::new()).unwrap();
        assert_eq!(gen.dim(), 4);
        assert_eq!(gen.hilbert_dim(), 2);
    }

    #[test]
    fn generator_eval() {
        let drift = nd::Array2::<C64>::eye(2);
        let op
            = nd::Array2::from_diag(
                &nd::array![C64::from(1.0), C64::from(-1.0)]);
        let mut gen = Generator::new(
            GeneratorKind::Hamiltonian,
            drift,
            vec![(op, Coeff::Constant(C64::from(2.0)))],
        ).unwrap();
        let g = gen.gen_at(0.0);
        assert!((g[[0, 0]] - C64::from(3.0)).norm() < 1e-15);
        assert!((g[[1, 1]] - C64::from(-1.0)).norm() < 1e-15);
        assert!(gen.set_coeffs([]).is_err());
        gen.set_coeffs([Coeff::Constant(C64::zero())]).unwrap();
        let g = gen.gen_at(0.0);
        assert!((g[[1, 1]] - C64::from(1.0)).norm() < 1e-15);
    }
}
