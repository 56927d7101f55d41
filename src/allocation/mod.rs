//! Allocation matrices, the incremental search-node lattice, and the trait
//! algebra scoring them.

mod matrix;
mod node;
mod reduction;

pub use matrix::{Allocation, AllocationKey};
pub use node::{AllocationNode, Assignment};
pub use reduction::{
    satisfies_traits, traits_penalty, Reducer, TraitMatrix, TraitsReduction, TRAITS_EPSILON,
};
