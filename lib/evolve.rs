//! Verification propagation of states under a [`Generator`].
//!
//! Fourth-order Runge-Kutta with half-step generator evaluation and
//! per-step renormalization. This exists to check optimized controls against
//! a trajectory ensemble, not as a general-purpose integrator.

use ndarray::{ self as nd, s };
use num_complex::Complex64 as C64;
use crate::{
    dynamics::{ Generator, GeneratorKind },
    error::{ Error, Result },
    trajectory::Trajectory,
};

fn array_diff(arr: &nd::Array1<f64>) -> nd::Array1<f64> {
    arr.iter().zip(arr.iter().skip(1))
        .map(|(ak, akp1)| *akp1 - *ak)
        .collect()
}

// quadrature norm for state vectors, trace for vectorized density matrices
fn state_norm(kind: GeneratorKind, x: &nd::Array1<C64>) -> C64 {
    match kind {
        GeneratorKind::Hamiltonian
            => x.iter().map(|a| a * a.conj()).sum::<C64>().sqrt(),
        GeneratorKind::Liouvillian => {
            let d = (x.len() as f64).sqrt().round() as usize;
            (0..d).map(|k| x[k * d + k]).sum()
        },
    }
}

fn check_args(
    gen: &Generator,
    x0: &nd::Array1<C64>,
    t: &nd::Array1<f64>,
) -> Result<()>
{
    if x0.len() != gen.dim() {
        return Err(Error::DimensionMismatch(format!(
            "state length {} does not match generator dimension {}",
            x0.len(), gen.dim(),
        )));
    }
    if t.len() < 2 { return Err(Error::EmptyGrid(t.len())); }
    Ok(())
}

fn rk4_step(
    gen: &Generator,
    x_old: &nd::Array1<C64>,
    tk: f64,
    dtk: f64,
) -> nd::Array1<C64>
{
    let gk = gen.flow_at(tk);
    let gkh = gen.flow_at(tk + dtk / 2.0);
    let gkp1 = gen.flow_at(tk + dtk);
    let k1 = gk.dot(x_old);
    let k2 = gkh.dot(&(x_old + &k1 * (dtk / 2.0)));
    let k3 = gkh.dot(&(x_old + &k2 * (dtk / 2.0)));
    let k4 = gkp1.dot(&(x_old + &k3 * dtk));
    let mut x_new = x_old + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dtk / 6.0);
    let norm = state_norm(gen.kind(), &x_new);
    x_new /= norm;
    x_new
}

/// Numerically integrate the equation of motion over a time grid, returning
/// the state at all times with the last axis corresponding to time.
///
/// The state is renormalized at every step by the kind-appropriate norm.
pub fn evolve(gen: &Generator, x0: &nd::Array1<C64>, t: &nd::Array1<f64>)
    -> Result<nd::Array2<C64>>
{
    check_args(gen, x0, t)?;
    let n = t.len();
    let dt = array_diff(t);
    let mut x: nd::Array2<C64> = nd::Array2::zeros((x0.len(), n));
    let mut x_old: nd::Array1<C64> = x0.clone();
    x.slice_mut(s![.., 0]).assign(x0);
    let iter = dt.iter().zip(t).enumerate();
    for (k, (&dtk, &tk)) in iter {
        let x_new = rk4_step(gen, &x_old, tk, dtk);
        x_new.clone().move_into(x.slice_mut(s![.., k + 1]));
        x_old = x_new;
    }
    Ok(x)
}

/// Like [`evolve`], but returning only the final state.
pub fn evolve_final(
    gen: &Generator,
    x0: &nd::Array1<C64>,
    t: &nd::Array1<f64>,
) -> Result<nd::Array1<C64>>
{
    check_args(gen, x0, t)?;
    let dt = array_diff(t);
    let mut x_old: nd::Array1<C64> = x0.clone();
    for (&dtk, &tk) in dt.iter().zip(t) {
        x_old = rk4_step(gen, &x_old, tk, dtk);
    }
    Ok(x_old)
}

/// Like [`evolve`], but with reduced integration output: only the results of
/// applying a function to the state at each time are stored.
pub fn evolve_reduced<X, T>(
    gen: &Generator,
    x0: &nd::Array1<C64>,
    t: &nd::Array1<f64>,
    x: X,
) -> Result<Vec<T>>
where X: Fn(&nd::Array1<C64>) -> T
{
    check_args(gen, x0, t)?;
    let dt = array_diff(t);
    let mut x_old: nd::Array1<C64> = x0.clone();
    let mut x_t: Vec<T> = Vec::with_capacity(t.len());
    x_t.push(x(&x_old));
    for (&dtk, &tk) in dt.iter().zip(t) {
        x_old = rk4_step(gen, &x_old, tk, dtk);
        x_t.push(x(&x_old));
    }
    Ok(x_t)
}

/// Propagate a trajectory's initial state over a time grid and return the
/// final state together with its fidelity against the trajectory target.
pub fn propagate_trajectory(traj: &Trajectory, t: &nd::Array1<f64>)
    -> Result<(nd::Array1<C64>, f64)>
{
    let fin = evolve_final(traj.generator, &traj.initial, t)?;
    let fid = traj.fidelity_of(&fin);
    Ok((fin, fid))
}

#[cfg(test)]
mod test {
    use std::f64::consts::TAU;
    use super::*;
    use crate::{
        dynamics::{
            Coeff, HBuilderTransmon, LBuilderTransmon, LTransmonParams,
            TransmonParams,
        },
        hilbert::{ purity, trace_of, unvectorize, vectorize },
        trajectory::overlap_re,
    };

    fn params() -> TransmonParams {
        TransmonParams {
            nlevels: (2, 2),
            freq: (TAU * 0.5, TAU * -0.5),
            anharm: (0.0, 0.0),
            coupling: TAU * 0.1,
            frame_freq: 0.0,
            temperature: 0.0,
        }
    }

    fn drive() -> (Coeff, Coeff) {
        (
            Coeff::Constant(C64::from(TAU * 0.2)),
            Coeff::Constant(C64::from(0.0)),
        )
    }

    fn lparams(decay: f64) -> LTransmonParams {
        let (drive_re, drive_im) = drive();
        LTransmonParams {
            params: params(),
            decay: (decay, decay),
            dephasing: (0.0, 0.0),
            drive_re,
            drive_im,
        }
    }

    #[test]
    fn arg_checks() {
        let (cre, cim) = drive();
        let gen = HBuilderTransmon::new(params(), cre, cim).unwrap()
            .generator().unwrap();
        let x0: nd::Array1<C64> = nd::Array1::zeros(3);
        let t: nd::Array1<f64> = nd::Array1::linspace(0.0, 1.0, 11);
        assert!(evolve(&gen, &x0, &t).is_err());
        let x0: nd::Array1<C64> = crate::hilbert::ket(4, 0).unwrap();
        let t1: nd::Array1<f64> = nd::array![0.0];
        assert!(evolve(&gen, &x0, &t1).is_err());
        assert!(evolve(&gen, &x0, &t).is_ok());
    }

    #[test]
    fn unitary_preserves_trace_and_purity() {
        let lb = LBuilderTransmon::new(lparams(0.0)).unwrap();
        let gen = lb.generator().unwrap();
        let rho0 = lb.basis().get_density(&(1, 1).into()).unwrap();
        let t: nd::Array1<f64> = nd::Array1::linspace(0.0, 1.0, 2001);
        let fin = evolve_final(&gen, &vectorize(&rho0), &t).unwrap();
        let rho = unvectorize(&fin, 4).unwrap();
        assert!((trace_of(&rho).re - 1.0).abs() < 1e-9);
        assert!((purity(&rho) - 1.0).abs() < 1e-8);
    }

    #[test]
    fn decay_strictly_reduces_purity() {
        let lb = LBuilderTransmon::new(lparams(TAU * 0.05)).unwrap();
        let gen = lb.generator().unwrap();
        let rho0 = lb.basis().get_density(&(1, 1).into()).unwrap();
        let t: nd::Array1<f64> = nd::Array1::linspace(0.0, 1.0, 2001);
        let purities: Vec<f64>
            = evolve_reduced(
                &gen,
                &vectorize(&rho0),
                &t,
                |x| purity(&unvectorize(x, 4).unwrap()),
            ).unwrap();
        assert!((purities[0] - 1.0).abs() < 1e-12);
        assert!(*purities.last().unwrap() < 1.0 - 1e-4);
    }

    #[test]
    fn liouvillian_matches_schrodinger() {
        // zero-rate Liouvillian evolution of a projector reproduces the
        // Hamiltonian evolution of the underlying state vector
        let lb = LBuilderTransmon::new(lparams(0.0)).unwrap();
        let lgen = lb.generator().unwrap();
        let hgen = lb.hbuilder().generator().unwrap();
        let t: nd::Array1<f64> = nd::Array1::linspace(0.0, 0.8, 1601);

        let psi0 = lb.basis().get_vector(&(0, 0).into()).unwrap();
        let psi = evolve_final(&hgen, &psi0, &t).unwrap();
        let rho_psi = crate::hilbert::outer_prod(&psi, &psi);

        let rho0 = lb.basis().get_density(&(0, 0).into()).unwrap();
        let rho = evolve_final(&lgen, &vectorize(&rho0), &t).unwrap();

        let ov = overlap_re(&vectorize(&rho_psi), &rho);
        assert!((ov - 1.0).abs() < 1e-6);
    }

    #[test]
    fn evolve_stores_all_times() {
        let (cre, cim) = drive();
        let gen = HBuilderTransmon::new(params(), cre, cim).unwrap()
            .generator().unwrap();
        let psi0 = crate::hilbert::ket(4, 0).unwrap();
        let t: nd::Array1<f64> = nd::Array1::linspace(0.0, 0.5, 501);
        let psi = evolve(&gen, &psi0, &t).unwrap();
        assert_eq!(psi.shape(), &[4, 501]);
        let fin = evolve_final(&gen, &psi0, &t).unwrap();
        for (a, b) in psi.slice(s![.., 500]).iter().zip(fin.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }
}
