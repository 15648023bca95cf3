#![allow(dead_code, non_snake_case, non_upper_case_globals)]

use std::{
    f64::consts::TAU,
    path::PathBuf,
};
use ndarray::{ self as nd, s };
use num_complex::Complex64 as C64;
use transmon_ctrl::{
    mkdir,
    println_flush,
    write_npz,
    dynamics::{
        Coeff, HBuilderTransmon, LBuilderTransmon, LTransmonParams,
        TransmonParams, Window, WindowShape,
    },
    evolve::{ evolve, evolve_reduced },
    hilbert::{ purity, unvectorize, vectorize, Transmon2 },
    trajectory::state_to_state,
};

const NLEVELS: usize = 3;
const FREQ: f64 = 4380.0; // MHz, both transmons on resonance
const ANHARM1: f64 = -210.0; // MHz
const ANHARM2: f64 = -215.0; // MHz
const COUPLING: f64 = 2.5; // MHz

const DURATION: f64 = 1.2; // μs
const AMP: f64 = 8.0; // MHz
const NT: usize = 2401;

const T1: f64 = 190.0; // μs
const TPHI: f64 = 310.0; // μs
const TEMPERATURE: f64 = 900.0; // MHz, k_B T / h (~43 mK)

fn params() -> TransmonParams {
    // rotating frame on resonance with both transmons
    TransmonParams {
        nlevels: (NLEVELS, NLEVELS),
        freq: (TAU * FREQ, TAU * FREQ),
        anharm: (TAU * ANHARM1, TAU * ANHARM2),
        coupling: TAU * COUPLING,
        frame_freq: TAU * FREQ,
        temperature: TAU * TEMPERATURE,
    }
}

fn drive() -> (Coeff, Coeff) {
    let window = Window::new(DURATION, 0.0, WindowShape::Blackman);
    (Coeff::windowed(TAU * AMP, window), Coeff::Constant(C64::from(0.0)))
}

fn main() -> anyhow::Result<()> {
    let outdir = PathBuf::from("output");
    mkdir!(outdir);

    let (drive_re, drive_im) = drive();
    let hbuilder
        = HBuilderTransmon::new(params(), drive_re.clone(), drive_im.clone())?;
    let basis = hbuilder.basis();
    let psi0 = basis.get_vector(&Transmon2(0, 0)).unwrap();
    let psi_tgt = basis.get_vector(&Transmon2(1, 1)).unwrap();
    let generator = hbuilder.generator()?;
    let trajectories = state_to_state(&generator, psi0, psi_tgt)?;

    let time: nd::Array1<f64> = nd::Array1::linspace(0.0, DURATION, NT);
    let psi = evolve(&generator, &trajectories[0].initial, &time)?;
    let pops: nd::Array2<f64> = psi.mapv(|a| a.norm_sqr());
    let fin = psi.slice(s![.., NT - 1]).to_owned();
    println_flush!(
        "transfer fidelity = {:.9}",
        trajectories[0].fidelity_of(&fin),
    );

    // the same pulse on the dissipative system, starting from a thermal state
    let lbuilder = LBuilderTransmon::new(LTransmonParams {
        params: params(),
        decay: (1.0 / T1, 1.0 / T1),
        dephasing: (1.0 / TPHI, 1.0 / TPHI),
        drive_re,
        drive_im,
    })?;
    let lgenerator = lbuilder.generator()?;
    let rho0 = lbuilder.hbuilder().thermal_state_density();
    let dim = lbuilder.hbuilder().ndim();
    let purities: Vec<f64>
        = evolve_reduced(
            &lgenerator,
            &vectorize(&rho0),
            &time,
            |x| purity(&unvectorize(x, dim).unwrap()),
        )?;
    println_flush!(
        "thermal purity: {:.6} -> {:.6}",
        purities[0],
        purities.last().unwrap(),
    );

    let purities: nd::Array1<f64> = purities.into_iter().collect();
    write_npz!(
        outdir.join("state_transfer.npz"),
        arrays: {
            "time" => &time,
            "pops" => &pops,
            "purity" => &purities,
        }
    );

    println!("done");
    Ok(())
}
