//! Hamiltonian builders.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{ dynamics::Generator, error::Result };

pub mod transmon;
pub use transmon::{ HBuilderTransmon, HTransmonParams, TransmonParams };

/// Basic requirements for any Hamiltonian builder.
pub trait HBuild {
    /// Initialization data type.
    type Params;

    /// Basis type containing state energies.
    type Basis;

    /// Initialize `self`.
    fn new_builder(params: Self::Params) -> Result<Self>
    where Self: Sized;

    /// Build a time-independent Hamiltonian matrix, if possible.
    fn build_static(&self) -> Option<nd::Array2<C64>>;

    /// Build the Hamiltonian matrix at a given time.
    fn build_at(&self, t: f64) -> nd::Array2<C64>;

    /// Build the decomposed generator of motion.
    fn build_generator(&self) -> Result<Generator>;

    /// Return a reference to the basis.
    fn get_basis(&self) -> &Self::Basis;
}
