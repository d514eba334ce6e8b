//! Edge models deciding the multiplicity of each ordered vertex pair.
//!
//! Every topology is a variant of [`Topology`], evaluated through the single
//! [`EdgeModel::edge_count`] entry point. Stochastic variants draw from the
//! random source handed in by the caller and keep no state of their own.

use std::fmt;

use rand::Rng;
use serde::Deserialize;

use crate::matrix::Multiplicity;

/// Maps an ordered vertex pair of a graph with `order` vertices to an edge
/// multiplicity.
pub trait EdgeModel {
    /// Returns the number of parallel edges `source → target`.
    fn edge_count<R: Rng + ?Sized>(
        &self,
        source: usize,
        target: usize,
        order: usize,
        rng: &mut R,
    ) -> Multiplicity;
}

/// Probability that a dense pair carries any edges.
const DENSE_EDGE_PROBABILITY: f64 = 0.8;
/// Probability that a sparse pair carries an edge.
const SPARSE_EDGE_PROBABILITY: f64 = 0.2;
/// Largest multiplicity drawn by the default multi-edge model.
const MULTI_EDGE_MAX: Multiplicity = 3;

/// A fully parameterised topology model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Uniformly random multiplicity in `[0, 3]`.
    MultiEdge,
    /// With probability 0.8 a multiplicity in `[1, 2]`, otherwise none.
    Dense,
    /// With probability 0.2 a single edge, otherwise none.
    Sparse,
    /// Simple directed path `0 → 1 → 2 → …`.
    Chain,
    /// Directed clique on the first `size` vertices; the rest are isolated.
    Clique {
        /// Number of vertices taking part in the clique.
        size: usize,
    },
    /// Row-major grid with edges to the right and bottom neighbours.
    Grid {
        /// Number of vertices per row. A width of zero produces no edges.
        width: usize,
    },
}

impl Topology {
    /// Returns `true` when the model consumes randomness.
    #[must_use]
    pub const fn is_stochastic(self) -> bool {
        matches!(self, Self::MultiEdge | Self::Dense | Self::Sparse)
    }

    /// Returns the topology family this model belongs to.
    #[must_use]
    pub const fn kind(self) -> TopologyKind {
        match self {
            Self::MultiEdge => TopologyKind::Random,
            Self::Dense => TopologyKind::Dense,
            Self::Sparse => TopologyKind::Sparse,
            Self::Chain => TopologyKind::Chain,
            Self::Clique { .. } => TopologyKind::Clique,
            Self::Grid { .. } => TopologyKind::Grid,
        }
    }
}

impl EdgeModel for Topology {
    fn edge_count<R: Rng + ?Sized>(
        &self,
        source: usize,
        target: usize,
        _order: usize,
        rng: &mut R,
    ) -> Multiplicity {
        match *self {
            Self::MultiEdge => rng.gen_range(0..=MULTI_EDGE_MAX),
            Self::Dense => {
                if rng.gen_bool(DENSE_EDGE_PROBABILITY) {
                    rng.gen_range(1..=2)
                } else {
                    0
                }
            }
            Self::Sparse => Multiplicity::from(rng.gen_bool(SPARSE_EDGE_PROBABILITY)),
            Self::Chain => Multiplicity::from(source.checked_add(1) == Some(target)),
            Self::Clique { size } => {
                Multiplicity::from(source < size && target < size && source != target)
            }
            Self::Grid { width } => Multiplicity::from(grid_neighbours(source, target, width)),
        }
    }
}

/// Returns `true` when `target` is the right or bottom neighbour of `source`.
fn grid_neighbours(source: usize, target: usize, width: usize) -> bool {
    let (Some(source_row), Some(source_col)) = (source.checked_div(width), source.checked_rem(width))
    else {
        return false;
    };
    let (Some(target_row), Some(target_col)) = (target.checked_div(width), target.checked_rem(width))
    else {
        return false;
    };

    let right = source_row == target_row && source_col.checked_add(1) == Some(target_col);
    let bottom = source_col == target_col && source_row.checked_add(1) == Some(target_row);
    right || bottom
}

/// Topology family without model-specific parameters.
///
/// Used by configuration files and the command line, then resolved into a
/// [`Topology`] once the graph size is known.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TopologyKind {
    /// Uniform multi-edge model, also accepted as `default`.
    #[serde(alias = "default")]
    Random,
    /// Dense model.
    Dense,
    /// Sparse model.
    Sparse,
    /// Directed path.
    Chain,
    /// Leading clique.
    Clique,
    /// Grid.
    Grid,
}

/// Optional model parameters supplied alongside a [`TopologyKind`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TopologyParams {
    /// Clique size; defaults to the graph size.
    pub clique_size: Option<usize>,
    /// Grid width; defaults to the integer square root of the graph size.
    pub grid_width: Option<usize>,
}

impl TopologyKind {
    /// Every family, in sweep order.
    pub const ALL: [Self; 6] = [
        Self::Random,
        Self::Dense,
        Self::Sparse,
        Self::Chain,
        Self::Clique,
        Self::Grid,
    ];

    /// Stable lowercase name, also used as the corpus directory name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Dense => "dense",
            Self::Sparse => "sparse",
            Self::Chain => "chain",
            Self::Clique => "clique",
            Self::Grid => "grid",
        }
    }

    /// Resolves the family into a concrete model for graphs of `order`
    /// vertices, filling unset parameters with their defaults.
    ///
    /// # Examples
    /// ```
    /// use grafy_core::{Topology, TopologyKind, TopologyParams};
    ///
    /// let grid = TopologyKind::Grid.resolve(TopologyParams::default(), 10);
    /// assert_eq!(grid, Topology::Grid { width: 3 });
    /// let clique = TopologyKind::Clique.resolve(TopologyParams::default(), 10);
    /// assert_eq!(clique, Topology::Clique { size: 10 });
    /// ```
    #[must_use]
    pub fn resolve(self, params: TopologyParams, order: usize) -> Topology {
        match self {
            Self::Random => Topology::MultiEdge,
            Self::Dense => Topology::Dense,
            Self::Sparse => Topology::Sparse,
            Self::Chain => Topology::Chain,
            Self::Clique => Topology::Clique {
                size: params.clique_size.unwrap_or(order),
            },
            Self::Grid => Topology::Grid {
                width: params.grid_width.unwrap_or_else(|| order.isqrt()),
            },
        }
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
