//! Loading of problem parameters from TOML files, so that library code
//! carries no problem-specific constants and multiple problem instances can
//! coexist.
//!
//! Frequencies and rates are given in MHz and converted to angular frequency
//! on read; times are in μs. Expected layout:
//!
//! ```toml
//! [transmon]
//! nlevels = [5, 5]
//! freq = [4380.0, 4614.0]       # MHz
//! anharm = [-210.0, -215.0]     # MHz
//! coupling = -3.0               # MHz
//! frame_freq = 4498.0           # MHz
//! temperature = 0.0             # MHz, k_B T / h
//!
//! [dissipation]
//! decay = [0.0053, 0.0053]      # MHz
//! dephasing = [0.0032, 0.0032]  # MHz
//!
//! [drive]
//! duration = 0.8                # μs
//! rise = 0.08                   # μs
//! shape = "flattop"
//! amp = 35.0                    # MHz
//!
//! [objective]
//! weights = [20.0, 1.0, 1.0]
//! nt = 1601
//! ```

use std::{ f64::consts::TAU, path::Path };
use ndarray as nd;
use num_complex::Complex64 as C64;
use toml::Value;
use crate::{
    dynamics::{
        Coeff, LTransmonParams, TransmonParams, Window, WindowShape,
    },
    error::{ Error, Result },
};

/// Drive window and initial-guess amplitude settings.
#[derive(Copy, Clone, Debug)]
pub struct DriveConfig {
    /// Pulse duration in μs.
    pub duration: f64,
    /// Edge ramp time in μs.
    pub rise: f64,
    /// Window shape.
    pub shape: WindowShape,
    /// Peak amplitude in units of angular frequency.
    pub amp: f64,
}

impl DriveConfig {
    /// Return the pulse window.
    pub fn window(&self) -> Window {
        Window::new(self.duration, self.rise, self.shape)
    }

    /// Build the initial-guess quadrature coefficients: the windowed real
    /// quadrature and a zero imaginary quadrature.
    pub fn initial_coeffs(&self) -> (Coeff, Coeff) {
        (
            Coeff::windowed(self.amp, self.window()),
            Coeff::Constant(C64::from(0.0)),
        )
    }
}

/// Objective settings for the gate ensemble.
#[derive(Copy, Clone, Debug)]
pub struct ObjectiveConfig {
    /// Pre-normalization trajectory weights.
    pub weights: [f64; 3],
    /// Number of points in the shared time grid.
    pub nt: usize,
}

/// Full problem description.
#[derive(Copy, Clone, Debug)]
pub struct ProblemConfig {
    pub transmon: TransmonParams,
    /// Amplitude-damping rates in units of angular frequency.
    pub decay: (f64, f64),
    /// Pure-dephasing rates in units of angular frequency.
    pub dephasing: (f64, f64),
    pub drive: DriveConfig,
    pub objective: ObjectiveConfig,
}

impl ProblemConfig {
    /// Read a configuration from a TOML file.
    pub fn load<P>(path: P) -> Result<Self>
    where P: AsRef<Path>
    {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse a configuration from TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        let root: Value = text.parse::<Value>()?;
        let tr = get_table(&root, "transmon")?;
        let transmon = TransmonParams {
            nlevels: get_usize_pair(tr, "transmon", "nlevels")?,
            freq: get_freq_pair(tr, "transmon", "freq")?,
            anharm: get_freq_pair(tr, "transmon", "anharm")?,
            coupling: TAU * get_f64(tr, "transmon", "coupling")?,
            frame_freq: TAU * get_f64(tr, "transmon", "frame_freq")?,
            temperature:
                TAU * get_f64_or(tr, "transmon", "temperature", 0.0)?,
        };
        let di = get_table(&root, "dissipation")?;
        let decay = get_freq_pair(di, "dissipation", "decay")?;
        let dephasing = get_freq_pair(di, "dissipation", "dephasing")?;
        let dr = get_table(&root, "drive")?;
        let drive = DriveConfig {
            duration: get_f64(dr, "drive", "duration")?,
            rise: get_f64_or(dr, "drive", "rise", 0.0)?,
            shape: get_shape(dr, "drive", "shape")?,
            amp: TAU * get_f64(dr, "drive", "amp")?,
        };
        let ob = get_table(&root, "objective")?;
        let objective = ObjectiveConfig {
            weights: get_weights(ob, "objective", "weights")?,
            nt: get_usize(ob, "objective", "nt")?,
        };
        Ok(Self { transmon, decay, dephasing, drive, objective })
    }

    /// Assemble the Liouvillian builder parameters with the initial-guess
    /// drive coefficients.
    pub fn lparams(&self) -> LTransmonParams {
        let (drive_re, drive_im) = self.drive.initial_coeffs();
        LTransmonParams {
            params: self.transmon,
            decay: self.decay,
            dephasing: self.dephasing,
            drive_re,
            drive_im,
        }
    }

    /// Return the shared propagation time grid over the drive duration.
    pub fn time_grid(&self) -> nd::Array1<f64> {
        nd::Array1::linspace(0.0, self.drive.duration, self.objective.nt)
    }
}

fn get_table<'a>(root: &'a Value, key: &str) -> Result<&'a Value> {
    root.get(key)
        .ok_or_else(|| Error::ConfigMissing(key.into()))
}

fn get_value<'a>(tab: &'a Value, table: &str, key: &str)
    -> Result<&'a Value>
{
    tab.get(key)
        .ok_or_else(|| Error::ConfigMissing(format!("{}.{}", table, key)))
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Float(x) => Some(*x),
        Value::Integer(n) => Some(*n as f64),
        _ => None,
    }
}

fn get_f64(tab: &Value, table: &str, key: &str) -> Result<f64> {
    as_f64(get_value(tab, table, key)?)
        .ok_or_else(|| Error::ConfigInvalid(format!("{}.{}", table, key)))
}

fn get_f64_or(tab: &Value, table: &str, key: &str, default: f64)
    -> Result<f64>
{
    match tab.get(key) {
        None => Ok(default),
        Some(v) => as_f64(v)
            .ok_or_else(|| {
                Error::ConfigInvalid(format!("{}.{}", table, key))
            }),
    }
}

fn get_usize(tab: &Value, table: &str, key: &str) -> Result<usize> {
    match get_value(tab, table, key)? {
        Value::Integer(n) if *n >= 0 => Ok(*n as usize),
        _ => Err(Error::ConfigInvalid(format!("{}.{}", table, key))),
    }
}

fn get_array<'a>(tab: &'a Value, table: &str, key: &str, len: usize)
    -> Result<&'a [Value]>
{
    match get_value(tab, table, key)? {
        Value::Array(items) if items.len() == len => Ok(items),
        _ => Err(Error::ConfigInvalid(format!("{}.{}", table, key))),
    }
}

fn get_usize_pair(tab: &Value, table: &str, key: &str)
    -> Result<(usize, usize)>
{
    let items = get_array(tab, table, key, 2)?;
    match (&items[0], &items[1]) {
        (Value::Integer(a), Value::Integer(b)) if *a >= 0 && *b >= 0
            => Ok((*a as usize, *b as usize)),
        _ => Err(Error::ConfigInvalid(format!("{}.{}", table, key))),
    }
}

// a pair in MHz, converted to angular frequency
fn get_freq_pair(tab: &Value, table: &str, key: &str) -> Result<(f64, f64)> {
    let items = get_array(tab, table, key, 2)?;
    match (as_f64(&items[0]), as_f64(&items[1])) {
        (Some(a), Some(b)) => Ok((TAU * a, TAU * b)),
        _ => Err(Error::ConfigInvalid(format!("{}.{}", table, key))),
    }
}

fn get_weights(tab: &Value, table: &str, key: &str) -> Result<[f64; 3]> {
    let items = get_array(tab, table, key, 3)?;
    let mut w = [0.0; 3];
    for (wk, item) in w.iter_mut().zip(items) {
        *wk = as_f64(item)
            .ok_or_else(|| {
                Error::ConfigInvalid(format!("{}.{}", table, key))
            })?;
    }
    Ok(w)
}

fn get_shape(tab: &Value, table: &str, key: &str) -> Result<WindowShape> {
    match get_value(tab, table, key)? {
        Value::String(s) => match s.as_str() {
            "box" => Ok(WindowShape::Box),
            "flattop" => Ok(WindowShape::Flattop),
            "blackman" => Ok(WindowShape::Blackman),
            _ => Err(Error::ConfigInvalid(format!("{}.{}", table, key))),
        },
        _ => Err(Error::ConfigInvalid(format!("{}.{}", table, key))),
    }
}
