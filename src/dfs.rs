//! This module implements an ordered depth-first counterpart to
//! [pathfinding's dfs function](https://docs.rs/pathfinding/latest/pathfinding/directed/dfs/index.html)
//! which sorts the candidates of every expanded node by their move cost
//! before descending, keeping generation order for candidates of equal cost.
use num_traits::Zero;

struct Frame<N, C> {
    node: N,
    cost: C,
    candidates: std::vec::IntoIter<(N, C)>,
}

fn sorted_candidates<N, C, IN>(candidates: IN) -> std::vec::IntoIter<(N, C)>
where
    C: Ord,
    IN: IntoIterator<Item = (N, C)>,
{
    let mut candidates: Vec<(N, C)> = candidates.into_iter().collect();
    // Stable sort: candidates of equal cost keep the order the successor
    // closure produced them in.
    candidates.sort_by(|a, b| a.1.cmp(&b.1));
    candidates.into_iter()
}

/// Depth-first search from `start` until `success` holds, returning the node
/// path and its accumulated cost. The successor closure owns the visited
/// bookkeeping: a node emitted as a candidate must never be emitted again
/// within the same call, which bounds every node to a single expansion and
/// makes exhaustion of the candidates equivalent to exhaustion of the
/// reachable component.
pub fn dfs_route<N, C, FN, IN, FS>(
    start: &N,
    mut successors: FN,
    mut success: FS,
) -> Option<(Vec<N>, C)>
where
    N: Eq + Clone,
    C: Zero + Ord + Copy,
    FN: FnMut(&N) -> IN,
    IN: IntoIterator<Item = (N, C)>,
    FS: FnMut(&N) -> bool,
{
    if success(start) {
        return Some((vec![start.clone()], Zero::zero()));
    }
    let mut frames = vec![Frame {
        node: start.clone(),
        cost: Zero::zero(),
        candidates: sorted_candidates(successors(start)),
    }];
    while let Some(frame) = frames.last_mut() {
        match frame.candidates.next() {
            Some((node, move_cost)) => {
                let cost = frame.cost + move_cost;
                if success(&node) {
                    // The live stack spells out the route; close it off with
                    // the accepting node.
                    let mut path: Vec<N> = frames.iter().map(|f| f.node.clone()).collect();
                    path.push(node);
                    return Some((path, cost));
                }
                let candidates = sorted_candidates(successors(&node));
                frames.push(Frame {
                    node,
                    cost,
                    candidates,
                });
            }
            None => {
                // Dead subtree. The nodes under it stay visited, only the
                // frame is abandoned.
                frames.pop();
            }
        }
    }
    None
}
