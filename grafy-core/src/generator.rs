//! Graph generation from an edge model.

use rand::Rng;

use crate::{matrix::AdjacencyMatrix, topology::EdgeModel};

/// Generates an `order × order` adjacency matrix by evaluating `model` on
/// every ordered vertex pair.
///
/// Pairs are visited in row-major order, so a seeded `rng` always yields the
/// same matrix. Diagonal pairs are skipped, and left at zero, unless
/// `allow_loops` is set.
///
/// # Examples
/// ```
/// use grafy_core::{Topology, generate};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut rng = SmallRng::seed_from_u64(1);
/// let chain = generate(4, &Topology::Chain, false, &mut rng);
/// assert_eq!(chain.edge_count(), 3);
/// assert!(chain.has_zero_diagonal());
/// ```
pub fn generate<M, R>(order: usize, model: &M, allow_loops: bool, rng: &mut R) -> AdjacencyMatrix
where
    M: EdgeModel + ?Sized,
    R: Rng + ?Sized,
{
    let mut matrix = AdjacencyMatrix::zeroed(order);
    for source in 0..order {
        for target in 0..order {
            if source == target && !allow_loops {
                continue;
            }
            let count = model.edge_count(source, target, order, rng);
            matrix.set(source, target, count);
        }
    }
    matrix
}
