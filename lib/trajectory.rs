//! Construction of the weighted trajectory ensembles handed to the pulse
//! optimizer.
//!
//! A gate objective on an open system is fully determined by three fixed
//! mixed states of the logical subspace: a mixture with linearly decreasing
//! populations (distinguishes all basis states pairwise), the uniform pure
//! superposition (fixes relative phases), and the maximally mixed state
//! (captures average population transfer). One weighted trajectory per state
//! suffices for the optimizer's figure of merit.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    dynamics::{ dagger, Generator, GeneratorKind },
    error::{ Error, Result },
    hilbert::{ maximally_mixed, outer_prod, purity, vectorize },
};

/// Tolerance on `max |U†U − 1|` for the unitarity check on gate targets.
pub const UNITARY_TOL: f64 = 1e-9;

/// The minimal unit of optimization input: one initial condition, one
/// generator, one target, one weight.
///
/// States are stored in vectorized form so that pure states and density
/// matrices flow through the same propagation interface. Trajectories borrow
/// their generator immutably and own their states, so an ensemble can be
/// evaluated in parallel with no shared mutable state.
#[derive(Clone, Debug)]
pub struct Trajectory<'a> {
    pub initial: nd::Array1<C64>,
    pub target: nd::Array1<C64>,
    pub generator: &'a Generator,
    pub weight: f64,
}

impl<'a> Trajectory<'a> {
    /// Create a new `Trajectory`.
    ///
    /// Fails if either state length does not match the generator dimension.
    pub fn new(
        initial: nd::Array1<C64>,
        target: nd::Array1<C64>,
        generator: &'a Generator,
        weight: f64,
    ) -> Result<Self>
    {
        let n = generator.dim();
        if initial.len() != n || target.len() != n {
            return Err(Error::DimensionMismatch(format!(
                "state lengths ({}, {}) do not match generator dimension {}",
                initial.len(), target.len(), n,
            )));
        }
        Ok(Self { initial, target, generator, weight })
    }

    /// Return the vectorized state dimension.
    pub fn dim(&self) -> usize { self.initial.len() }

    /// Evaluate the kind-appropriate fidelity of a propagated final state
    /// against the target: squared-modulus overlap for pure-state
    /// trajectories, real-part Hilbert-Schmidt overlap for vectorized
    /// density matrices.
    pub fn fidelity_of(&self, fin: &nd::Array1<C64>) -> f64 {
        match self.generator.kind() {
            GeneratorKind::Hamiltonian => overlap_sq(&self.target, fin),
            GeneratorKind::Liouvillian => overlap_re(&self.target, fin),
        }
    }
}

/// Compute the real part of the inner product `⟨a, b⟩`.
///
/// For vectorized density matrices this is the Hilbert-Schmidt overlap
/// `Re tr(a† b)`.
pub fn overlap_re(a: &nd::Array1<C64>, b: &nd::Array1<C64>) -> f64 {
    a.iter().zip(b).map(|(ai, bi)| ai.conj() * bi).sum::<C64>().re
}

/// Compute the squared-modulus overlap `|⟨a|b⟩|²` of two pure states.
pub fn overlap_sq(a: &nd::Array1<C64>, b: &nd::Array1<C64>) -> f64 {
    a.iter().zip(b).map(|(ai, bi)| ai.conj() * bi).sum::<C64>().norm_sqr()
}

/// Combine per-trajectory fidelities into the ensemble figure of merit: the
/// weight-normalized sum of contributions.
pub fn weighted_objective(trajs: &[Trajectory], fids: &[f64]) -> f64 {
    let wsum: f64 = trajs.iter().map(|tr| tr.weight).sum();
    trajs.iter().zip(fids)
        .map(|(tr, f)| tr.weight * f)
        .sum::<f64>()
        / wsum
}

/// Construct the three fixed density matrices of the gate scheme over the
/// `d`-dimensional logical subspace.
///
/// In order: the mixture with populations `2(d−i)/(d(d+1))` for
/// `i = 0, …, d−1`; the uniform pure superposition `(1/d) Σ_ij |i⟩⟨j|`; the
/// maximally mixed state.
pub fn three_state_densities(d: usize) -> [nd::Array2<C64>; 3] {
    let norm = (d * (d + 1)) as f64;
    let rho1: nd::Array2<C64>
        = nd::Array2::from_diag(
            &(0..d)
                .map(|i| C64::from(2.0 * (d - i) as f64 / norm))
                .collect::<nd::Array1<C64>>()
        );
    let rho2: nd::Array2<C64>
        = nd::Array2::from_elem((d, d), C64::from(1.0 / d as f64));
    let rho3 = maximally_mixed(d);
    [rho1, rho2, rho3]
}

fn check_unitary(u: &nd::Array2<C64>, tol: f64) -> Result<()> {
    let prod = dagger(u).dot(u);
    let dev = prod.indexed_iter()
        .map(|((i, j), p)| {
            let target = if i == j { C64::from(1.0) } else { C64::from(0.0) };
            (p - target).norm()
        })
        .fold(0.0, f64::max);
    if dev <= tol { Ok(()) } else { Err(Error::NonUnitary { dev }) }
}

/// Build the minimal three-trajectory ensemble that fully determines average
/// gate fidelity under dissipative evolution.
///
/// `embeds` maps each logical basis index to its physical state vector
/// (handling subspace embedding into a larger truncated space); `target` is
/// the d×d logical gate; `weights` are the caller-supplied pre-normalization
/// weights. Weights are rescaled so their sum equals the ensemble size, then
/// divided by the purity of the corresponding initial state — mixed-state
/// overlaps saturate below 1 even at perfect fidelity, and the purity
/// division makes the combined objective meaningful.
///
/// Fails if the generator is not Liouvillian-kind, the target is not d×d or
/// not unitary within [`UNITARY_TOL`], or any embedding does not match the
/// generator's Hilbert dimension.
pub fn gate_ensemble<'a>(
    generator: &'a Generator,
    embeds: &[nd::Array1<C64>],
    target: &nd::Array2<C64>,
    weights: [f64; 3],
) -> Result<Vec<Trajectory<'a>>>
{
    if generator.kind() != GeneratorKind::Liouvillian {
        return Err(Error::KindMismatch);
    }
    let d = embeds.len();
    if d < 2 {
        return Err(Error::DimensionMismatch(format!(
            "logical dimension must be at least 2, got {}", d,
        )));
    }
    if target.shape() != [d, d] {
        return Err(Error::TargetDimension {
            rows: target.shape()[0],
            cols: target.shape()[1],
            dim: d,
        });
    }
    check_unitary(target, UNITARY_TOL)?;
    let p = generator.hilbert_dim();
    for (k, e) in embeds.iter().enumerate() {
        if e.len() != p {
            return Err(Error::DimensionMismatch(format!(
                "embedding {} has length {}, expected {}", k, e.len(), p,
            )));
        }
    }

    let lift = |m: &nd::Array2<C64>| -> nd::Array2<C64> {
        let mut out: nd::Array2<C64> = nd::Array2::zeros((p, p));
        for ((i, j), mij) in m.indexed_iter() {
            if mij.norm() <= 1e-15 { continue; }
            out += &outer_prod(&embeds[i], &embeds[j]).mapv(|a| *mij * a);
        }
        out
    };

    let rhos = three_state_densities(d);
    let wsum: f64 = weights.iter().sum();
    let k = weights.len() as f64;
    let udag = dagger(target);
    rhos.iter().zip(weights)
        .map(|(rho, w)| {
            let tgt = target.dot(rho).dot(&udag);
            Trajectory::new(
                vectorize(&lift(rho)),
                vectorize(&lift(&tgt)),
                generator,
                (w / wsum * k) / purity(rho),
            )
        })
        .collect()
}

fn lift_state(generator: &Generator, state: nd::Array1<C64>)
    -> Result<nd::Array1<C64>>
{
    match generator.kind() {
        GeneratorKind::Hamiltonian => Ok(state),
        GeneratorKind::Liouvillian => {
            if state.len() == generator.dim() {
                Ok(state)
            } else if state.len() == generator.hilbert_dim() {
                Ok(vectorize(&outer_prod(&state, &state)))
            } else {
                Err(Error::DimensionMismatch(format!(
                    "state length {} matches neither the generator \
                    dimension {} nor its Hilbert dimension {}",
                    state.len(), generator.dim(), generator.hilbert_dim(),
                )))
            }
        },
    }
}

/// Build the single-trajectory ensemble for a state-to-state objective with
/// default weight 1.
///
/// Pure state vectors are accepted for both generator kinds; for a
/// Liouvillian generator they are lifted to vectorized projectors. States
/// already matching the full generator dimension are taken as-is.
pub fn state_to_state<'a>(
    generator: &'a Generator,
    initial: nd::Array1<C64>,
    target: nd::Array1<C64>,
) -> Result<Vec<Trajectory<'a>>>
{
    let initial = lift_state(generator, initial)?;
    let target = lift_state(generator, target)?;
    Ok(vec![Trajectory::new(initial, target, generator, 1.0)?])
}
