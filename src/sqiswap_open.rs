#![allow(dead_code, non_snake_case, non_upper_case_globals)]

use std::{
    f64::consts::{ FRAC_1_SQRT_2 as OVER_RT2, TAU },
    path::PathBuf,
};
use ndarray as nd;
use num_complex::Complex64 as C64;
use rayon::iter::{ IntoParallelRefIterator, ParallelIterator };
use transmon_ctrl::{
    mkdir,
    write_npz,
    config::{ DriveConfig, ObjectiveConfig, ProblemConfig },
    dynamics::{ Coeff, LBuilderTransmon, TransmonParams, WindowShape },
    evolve::propagate_trajectory,
    hilbert::Transmon2,
    trajectory::{ gate_ensemble, weighted_objective },
};

const NLEVELS: usize = 5;
const F1: f64 = 4380.0; // MHz
const F2: f64 = 4614.0; // MHz
const ANHARM1: f64 = -210.0; // MHz
const ANHARM2: f64 = -215.0; // MHz
const COUPLING: f64 = -3.0; // MHz
const FRAME: f64 = 4498.0; // MHz

const T1: f64 = 190.0; // μs
const TPHI: f64 = 310.0; // μs

const DURATION: f64 = 0.8; // μs
const RISE: f64 = 0.08; // μs
const AMP: f64 = 35.0; // MHz
const NT: usize = 1601;
const WEIGHTS: [f64; 3] = [20.0, 1.0, 1.0];

fn default_config() -> ProblemConfig {
    ProblemConfig {
        transmon: TransmonParams {
            nlevels: (NLEVELS, NLEVELS),
            freq: (TAU * F1, TAU * F2),
            anharm: (TAU * ANHARM1, TAU * ANHARM2),
            coupling: TAU * COUPLING,
            frame_freq: TAU * FRAME,
            temperature: 0.0,
        },
        decay: (1.0 / T1, 1.0 / T1),
        dephasing: (1.0 / TPHI, 1.0 / TPHI),
        drive: DriveConfig {
            duration: DURATION,
            rise: RISE,
            shape: WindowShape::Flattop,
            amp: TAU * AMP,
        },
        objective: ObjectiveConfig { weights: WEIGHTS, nt: NT },
    }
}

fn sqiswap() -> nd::Array2<C64> {
    let o = C64::from(0.0);
    let l = C64::from(1.0);
    let r = C64::from(OVER_RT2);
    let i = C64::new(0.0, OVER_RT2);
    nd::array![
        [l, o, o, o],
        [o, r, i, o],
        [o, i, r, o],
        [o, o, o, l],
    ]
}

fn main() -> anyhow::Result<()> {
    let outdir = PathBuf::from("output");
    mkdir!(outdir);

    let config = match std::env::args().nth(1) {
        Some(path) => ProblemConfig::load(path)?,
        None => default_config(),
    };

    let lbuilder = LBuilderTransmon::new(config.lparams())?;
    let generator = lbuilder.generator()?;
    println!(
        "Liouvillian: dim = {} ({} levels)",
        generator.dim(), generator.hilbert_dim(),
    );

    let basis = lbuilder.basis();
    let embeds: Vec<nd::Array1<C64>>
        = [(0, 0), (0, 1), (1, 0), (1, 1)].into_iter()
        .map(|(n1, n2)| basis.get_vector(&Transmon2(n1, n2)).unwrap())
        .collect();
    let trajectories
        = gate_ensemble(
            &generator, &embeds, &sqiswap(), config.objective.weights)?;
    println!("ensemble:");
    for (k, traj) in trajectories.iter().enumerate() {
        println!(
            "  traj {}: dim = {}, weight = {:.6}",
            k + 1, traj.dim(), traj.weight,
        );
    }

    // verify the initial guess: propagate each trajectory independently
    let time: nd::Array1<f64> = config.time_grid();
    let fids: Vec<f64>
        = trajectories.par_iter()
        .map(|traj| {
            propagate_trajectory(traj, &time).map(|(_, fid)| fid)
        })
        .collect::<Result<Vec<f64>, _>>()?;
    for (k, fid) in fids.iter().enumerate() {
        println!("  F_{} = {:.9}", k + 1, fid);
    }
    println!(
        "objective = {:.9}",
        weighted_objective(&trajectories, &fids),
    );

    // stand-in for an optimizer round trip: re-substitute the fields as
    // per-time-step samples and verify again
    let (cre, cim) = config.drive.initial_coeffs();
    let dt = time[1] - time[0];
    let mut resampled = generator.clone();
    resampled.set_coeffs([
        Coeff::sampled(0.0, dt, cre.gen_time_dep(&time))?,
        Coeff::sampled(0.0, dt, cim.gen_time_dep(&time))?,
    ])?;
    let trajectories2
        = gate_ensemble(
            &resampled, &embeds, &sqiswap(), config.objective.weights)?;
    let fids2: Vec<f64>
        = trajectories2.par_iter()
        .map(|traj| {
            propagate_trajectory(traj, &time).map(|(_, fid)| fid)
        })
        .collect::<Result<Vec<f64>, _>>()?;
    println!(
        "objective (resampled fields) = {:.9}",
        weighted_objective(&trajectories2, &fids2),
    );

    let u_re: nd::Array1<f64> = time.mapv(|t| cre.at(t).re);
    let u_im: nd::Array1<f64> = time.mapv(|t| cim.at(t).re);
    let weights: nd::Array1<f64>
        = trajectories.iter().map(|traj| traj.weight).collect();
    let fidelities: nd::Array1<f64> = fids.iter().copied().collect();
    write_npz!(
        outdir.join("sqiswap_open.npz"),
        arrays: {
            "time" => &time,
            "u_re" => &u_re,
            "u_im" => &u_im,
            "weights" => &weights,
            "fidelities" => &fidelities,
        }
    );

    println!("done");
    Ok(())
}
