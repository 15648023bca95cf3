//! Definitions to describe basis states, bases, and (vectorized) density
//! matrices.

use std::{ hash::Hash, ops::{ Deref, DerefMut } };
use indexmap::IndexMap;
use itertools::Itertools;
use ndarray as nd;
use num_complex::Complex64 as C64;
use num_traits::{ One, Zero };
use crate::error::{ Error, Result };

/* States *********************************************************************/

/// Product state of two transmons, labeled by excitation numbers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Transmon2(pub usize, pub usize);

impl Transmon2 {
    /// Return the excitation number of the left transmon.
    pub fn left(&self) -> usize { self.0 }

    /// Return the excitation number of the right transmon.
    pub fn right(&self) -> usize { self.1 }

    /// Return the row-major index of the state in the product basis for given
    /// truncation dimensions.
    ///
    /// Fails if either excitation number lies at or beyond its truncation.
    pub fn index_in(&self, nlevels: (usize, usize)) -> Result<usize> {
        if self.0 >= nlevels.0 || self.1 >= nlevels.1 {
            return Err(Error::DimensionMismatch(format!(
                "state ({}, {}) lies outside truncation ({}, {})",
                self.0, self.1, nlevels.0, nlevels.1,
            )));
        }
        Ok(self.0 * nlevels.1 + self.1)
    }
}

impl From<(usize, usize)> for Transmon2 {
    fn from(nn: (usize, usize)) -> Self { Self(nn.0, nn.1) }
}

/* State arrays ***************************************************************/

/// Return the `index`-th canonical basis vector of a `dim`-dimensional space.
///
/// Fails if `index` lies at or beyond `dim`.
pub fn ket(dim: usize, index: usize) -> Result<nd::Array1<C64>> {
    if index >= dim {
        return Err(Error::DimensionMismatch(format!(
            "basis index {} lies outside dimension {}", index, dim,
        )));
    }
    Ok(
        (0..dim)
            .map(|j| if j == index { C64::one() } else { C64::zero() })
            .collect()
    )
}

/// Compute the outer product of two state vectors.
pub fn outer_prod(a: &nd::Array1<C64>, b: &nd::Array1<C64>)
    -> nd::Array2<C64>
{
    let na = a.len();
    let nb = b.len();
    nd::Array2::from_shape_vec(
        (na, nb),
        a.iter().cartesian_product(b)
            .map(|(ai, bj)| *ai * bj.conj())
            .collect(),
    )
    .unwrap()
}

/// Flatten a density matrix to a single 1D array in row-major order.
///
/// Under this convention, `A ρ B` maps to `(A ⊗ Bᵀ) vec(ρ)`.
pub fn vectorize(rho: &nd::Array2<C64>) -> nd::Array1<C64> {
    rho.iter().copied().collect()
}

/// Reshape a row-major vectorized density matrix back to matrix form.
///
/// This is the exact inverse of [`vectorize`]. Fails if the array length is
/// not `dim²`.
pub fn unvectorize(v: &nd::Array1<C64>, dim: usize)
    -> Result<nd::Array2<C64>>
{
    if v.len() != dim * dim {
        return Err(Error::DimensionMismatch(format!(
            "vectorized state has length {}, expected {}", v.len(), dim * dim,
        )));
    }
    Ok(
        nd::Array2::from_shape_vec((dim, dim), v.to_vec())
            .expect("unvectorize: error reshaping array")
    )
}

/// Compute the trace of a matrix.
pub fn trace_of(rho: &nd::Array2<C64>) -> C64 { rho.diag().iter().sum() }

/// Compute the purity `tr(ρ²)` of a density matrix.
pub fn purity(rho: &nd::Array2<C64>) -> f64 {
    rho.dot(rho).diag().iter().sum::<C64>().re
}

/// Return the maximally mixed state over a `dim`-dimensional space.
pub fn maximally_mixed(dim: usize) -> nd::Array2<C64> {
    nd::Array2::from_diag(
        &nd::Array1::from_elem(dim, C64::from(1.0 / dim as f64))
    )
}

/// Return `true` if a matrix equals its conjugate transpose to within `tol`
/// on every element.
pub fn is_hermitian(rho: &nd::Array2<C64>, tol: f64) -> bool {
    rho.is_square()
        && rho.indexed_iter()
            .all(|((i, j), r)| (r - rho[[j, i]].conj()).norm() <= tol)
}

/* Bases **********************************************************************/

/// A collection of unique basis states with associated rotating-frame
/// energies in units of angular frequency.
///
/// This collection is backed by a single [`IndexMap`], which can be accessed
/// via [`AsRef`], [`AsMut`], [`Deref`] and [`DerefMut`]; insertion order is
/// matrix index order.
#[derive(Clone, Debug, PartialEq)]
pub struct Basis<S>
where S: Clone + Eq + Hash
{
    energies: IndexMap<S, f64>,
}

impl<S> AsRef<IndexMap<S, f64>> for Basis<S>
where S: Clone + Eq + Hash
{
    fn as_ref(&self) -> &IndexMap<S, f64> { &self.energies }
}

impl<S> AsMut<IndexMap<S, f64>> for Basis<S>
where S: Clone + Eq + Hash
{
    fn as_mut(&mut self) -> &mut IndexMap<S, f64> { &mut self.energies }
}

impl<S> Deref for Basis<S>
where S: Clone + Eq + Hash
{
    type Target = IndexMap<S, f64>;

    fn deref(&self) -> &Self::Target { &self.energies }
}

impl<S> DerefMut for Basis<S>
where S: Clone + Eq + Hash
{
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.energies }
}

impl<S> Default for Basis<S>
where S: Clone + Eq + Hash
{
    fn default() -> Self { Self { energies: IndexMap::default() } }
}

impl<S> FromIterator<(S, f64)> for Basis<S>
where S: Clone + Eq + Hash
{
    fn from_iter<I>(iter: I) -> Self
    where I: IntoIterator<Item = (S, f64)>
    {
        Self { energies: iter.into_iter().collect() }
    }
}

impl<S> Basis<S>
where S: Clone + Eq + Hash
{
    /// Create a new, empty basis.
    pub fn new() -> Self { Self::default() }

    /// Get the energy in units of angular frequency of a particular basis
    /// state.
    pub fn get_energy(&self, state: &S) -> Option<f64> {
        self.energies.get(state).copied()
    }

    /// Get the energy in units of angular frequency of a particular basis
    /// state by index.
    pub fn get_energy_index(&self, index: usize) -> Option<f64> {
        self.energies.get_index(index).map(|(_, e)| e).copied()
    }

    /// Get an array representation of a particular basis state.
    ///
    /// The array is sized to match the number of states currently in `self`.
    pub fn get_vector(&self, state: &S) -> Option<nd::Array1<C64>> {
        self.energies.get_index_of(state)
            .map(|k| {
                let n = self.energies.len();
                (0..n).map(|j| if j == k { C64::one() } else { C64::zero() })
                    .collect()
            })
    }

    /// Get an array representation of a particular basis state by index.
    ///
    /// The array is sized to match the number of states currently in `self`.
    pub fn get_vector_index(&self, index: usize) -> Option<nd::Array1<C64>> {
        let n = self.energies.len();
        (index < n).then(|| {
            (0..n).map(|j| if j == index { C64::one() } else { C64::zero() })
                .collect()
        })
    }

    /// Get an array representation of the density matrix for a particular
    /// basis state.
    ///
    /// The array is sized to match the number of states currently in `self`.
    pub fn get_density(&self, state: &S) -> Option<nd::Array2<C64>> {
        self.get_vector(state)
            .map(|diag| nd::Array2::from_diag(&diag))
    }

    /// Get an array representation of the density matrix for a particular
    /// basis state by index.
    ///
    /// The array is sized to match the number of states currently in `self`.
    pub fn get_density_index(&self, index: usize) -> Option<nd::Array2<C64>> {
        self.get_vector_index(index)
            .map(|diag| nd::Array2::from_diag(&diag))
    }

    /// Get an array representation of a linear combination of basis states,
    /// with weights determined by a weighting function.
    ///
    /// The weighting function will be passed a state, its index, and its
    /// energy. The array is sized to match the number of states currently in
    /// `self`.
    pub fn get_vector_weighted<F>(&self, weights: F) -> nd::Array1<C64>
    where F: Fn(&S, usize, f64) -> C64
    {
        self.energies.iter().enumerate()
            .map(|(index, (state, energy))| weights(state, index, *energy))
            .collect()
    }
}
