//! Traversal graph snapshot and all-shortest-paths search.

use std::collections::VecDeque;

use palefiz_core::CellCoord;

use crate::Board;

/// Undirected 4-neighbourhood graph over the non-blocked cells of a board.
///
/// The graph is a snapshot: edits applied to the board after [`TraversalGraph::build`]
/// do not affect it. Nodes are stored densely in row-major order and edges are
/// implied by adjacency between two passable cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraversalGraph {
    size: u32,
    passable: Vec<bool>,
}

impl TraversalGraph {
    /// Captures the traversal graph of the provided board.
    #[must_use]
    pub fn build(board: &Board) -> Self {
        Self::from_cells(board.size(), |cell| {
            board
                .state_at(cell)
                .map_or(false, |state| !state.is_blocked())
        })
    }

    /// Captures a graph of `size` x `size` cells using `is_passable` to select nodes.
    #[must_use]
    pub fn from_cells<F>(size: u32, mut is_passable: F) -> Self
    where
        F: FnMut(CellCoord) -> bool,
    {
        let width = usize::try_from(size).unwrap_or(0);
        let mut passable = Vec::with_capacity(width.saturating_mul(width));
        for row in 0..size {
            for column in 0..size {
                passable.push(is_passable(CellCoord::new(column, row)));
            }
        }

        Self { size, passable }
    }

    /// Edge length of the underlying board.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Reports whether the cell is a node of the graph.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.passable.get(index).copied())
            .unwrap_or(false)
    }

    /// Number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.passable.iter().filter(|passable| **passable).count()
    }

    /// Number of undirected edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes()
            .map(|cell| {
                self.neighbors(cell)
                    .filter(|neighbor| *neighbor > cell)
                    .count()
            })
            .sum()
    }

    /// Reports whether an edge connects the two cells.
    #[must_use]
    pub fn has_edge(&self, a: CellCoord, b: CellCoord) -> bool {
        a.is_adjacent(b) && self.contains(a) && self.contains(b)
    }

    /// Iterator over every node in row-major order.
    pub fn nodes(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let size = self.size;
        (0..size)
            .flat_map(move |row| (0..size).map(move |column| CellCoord::new(column, row)))
            .filter(move |cell| self.contains(*cell))
    }

    /// Nodes adjacent to `cell`, visited north, east, south, west.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        let candidates = if self.contains(cell) {
            grid_neighbors(cell, self.size)
        } else {
            [None; 4]
        };
        candidates
            .into_iter()
            .flatten()
            .filter(move |neighbor| self.contains(*neighbor))
    }

    /// Length in edges of the shortest path between the two cells, if one exists.
    #[must_use]
    pub fn distance(&self, source: CellCoord, target: CellCoord) -> Option<u32> {
        let search = self.search(source, target)?;
        search.distances.get(search.target).copied().flatten()
    }

    /// Enumerates every minimum-length path from `source` to `target`.
    ///
    /// Each path starts with `source` and ends with `target`. The sequence is
    /// empty when no path exists or either cell is not a node. The enumeration
    /// order depends only on the graph, so repeated calls yield identical
    /// sequences.
    #[must_use]
    pub fn shortest_paths(&self, source: CellCoord, target: CellCoord) -> ShortestPaths {
        let Some(search) = self.search(source, target) else {
            return ShortestPaths::empty(self.size);
        };

        let reachable = search
            .distances
            .get(search.target)
            .copied()
            .flatten()
            .is_some();
        let stack = if reachable {
            vec![Frame {
                node: search.target,
                cursor: 0,
            }]
        } else {
            Vec::new()
        };

        ShortestPaths {
            size: self.size,
            source: search.source,
            predecessors: search.predecessors,
            stack,
        }
    }

    /// Breadth-first search from `source` recording each node's predecessors
    /// on the previous layer. Stops once the target's layer is complete.
    fn search(&self, source: CellCoord, target: CellCoord) -> Option<Search> {
        if !self.contains(source) || !self.contains(target) {
            return None;
        }

        let source_index = self.index(source)?;
        let target_index = self.index(target)?;
        let mut distances: Vec<Option<u32>> = vec![None; self.passable.len()];
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); self.passable.len()];
        let mut queue = VecDeque::new();

        distances[source_index] = Some(0);
        queue.push_back(source);

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = self.index(cell) else {
                continue;
            };
            let Some(current_distance) = distances[current_index] else {
                continue;
            };

            if let Some(target_distance) = distances[target_index] {
                if current_distance >= target_distance {
                    break;
                }
            }

            let next_distance = current_distance + 1;
            for neighbor in self.neighbors(cell) {
                let Some(neighbor_index) = self.index(neighbor) else {
                    continue;
                };

                match distances[neighbor_index] {
                    None => {
                        distances[neighbor_index] = Some(next_distance);
                        predecessors[neighbor_index].push(current_index);
                        queue.push_back(neighbor);
                    }
                    Some(distance) if distance == next_distance => {
                        predecessors[neighbor_index].push(current_index);
                    }
                    Some(_) => {}
                }
            }
        }

        Some(Search {
            source: source_index,
            target: target_index,
            distances,
            predecessors,
        })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.size || cell.row() >= self.size {
            return None;
        }

        let width = usize::try_from(self.size).ok()?;
        index(width, cell)
    }
}

#[derive(Debug)]
struct Search {
    source: usize,
    target: usize,
    distances: Vec<Option<u32>>,
    predecessors: Vec<Vec<usize>>,
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    node: usize,
    cursor: usize,
}

/// Lazy sequence of shortest paths produced by [`TraversalGraph::shortest_paths`].
///
/// Paths are enumerated by backtracking from the target through the recorded
/// predecessor sets, taking predecessors in discovery order.
#[derive(Clone, Debug)]
pub struct ShortestPaths {
    size: u32,
    source: usize,
    predecessors: Vec<Vec<usize>>,
    stack: Vec<Frame>,
}

impl ShortestPaths {
    fn empty(size: u32) -> Self {
        Self {
            size,
            source: 0,
            predecessors: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn cell_at(&self, node: usize) -> CellCoord {
        let width = usize::try_from(self.size).unwrap_or(1).max(1);
        let column = u32::try_from(node % width).unwrap_or(u32::MAX);
        let row = u32::try_from(node / width).unwrap_or(u32::MAX);
        CellCoord::new(column, row)
    }
}

impl Iterator for ShortestPaths {
    type Item = Vec<CellCoord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;

            if frame.node == self.source {
                let path = self
                    .stack
                    .iter()
                    .rev()
                    .map(|frame| self.cell_at(frame.node))
                    .collect();
                let _ = self.stack.pop();
                return Some(path);
            }

            let predecessor = self
                .predecessors
                .get(frame.node)
                .and_then(|candidates| candidates.get(frame.cursor))
                .copied();

            match predecessor {
                Some(node) => {
                    frame.cursor += 1;
                    self.stack.push(Frame { node, cursor: 0 });
                }
                None => {
                    let _ = self.stack.pop();
                }
            }
        }
    }
}

fn grid_neighbors(cell: CellCoord, size: u32) -> [Option<CellCoord>; 4] {
    let north = cell
        .row()
        .checked_sub(1)
        .map(|row| CellCoord::new(cell.column(), row));
    let east = cell
        .column()
        .checked_add(1)
        .filter(|column| *column < size)
        .map(|column| CellCoord::new(column, cell.row()));
    let south = cell
        .row()
        .checked_add(1)
        .filter(|row| *row < size)
        .map(|row| CellCoord::new(cell.column(), row));
    let west = cell
        .column()
        .checked_sub(1)
        .map(|column| CellCoord::new(column, cell.row()));

    [north, east, south, west]
}

fn index(width: usize, cell: CellCoord) -> Option<usize> {
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn open(size: u32) -> TraversalGraph {
        TraversalGraph::from_cells(size, |_| true)
    }

    fn is_valid_path(graph: &TraversalGraph, path: &[CellCoord]) -> bool {
        path.windows(2).all(|pair| graph.has_edge(pair[0], pair[1]))
    }

    #[test]
    fn open_grid_counts_nodes_and_edges() {
        let graph = open(3);
        assert_eq!(graph.node_count(), 9);
        assert_eq!(graph.edge_count(), 12);
    }

    #[test]
    fn neighbors_follow_compass_order() {
        let graph = open(3);
        let neighbors: Vec<_> = graph.neighbors(CellCoord::new(1, 1)).collect();
        assert_eq!(
            neighbors,
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(2, 1),
                CellCoord::new(1, 2),
                CellCoord::new(0, 1),
            ]
        );
    }

    #[test]
    fn blocked_cells_are_not_nodes() {
        let wall = CellCoord::new(1, 1);
        let graph = TraversalGraph::from_cells(3, |cell| cell != wall);

        assert!(!graph.contains(wall));
        assert_eq!(graph.node_count(), 8);
        assert_eq!(graph.edge_count(), 8);
        assert!(!graph.has_edge(CellCoord::new(1, 0), wall));
        assert_eq!(graph.neighbors(wall).count(), 0);
    }

    #[test]
    fn shortest_paths_enumerates_every_monotone_route() {
        let graph = open(3);
        let source = CellCoord::new(0, 0);
        let target = CellCoord::new(2, 2);

        let paths: Vec<_> = graph.shortest_paths(source, target).collect();

        assert_eq!(paths.len(), 6);
        for path in &paths {
            assert_eq!(path.len(), 5);
            assert_eq!(path.first(), Some(&source));
            assert_eq!(path.last(), Some(&target));
            assert!(is_valid_path(&graph, path));
        }
        let distinct: BTreeSet<_> = paths.iter().cloned().collect();
        assert_eq!(distinct.len(), paths.len());
    }

    #[test]
    fn shortest_paths_is_repeatable() {
        let wall = CellCoord::new(2, 1);
        let graph = TraversalGraph::from_cells(4, |cell| cell != wall);
        let source = CellCoord::new(0, 0);
        let target = CellCoord::new(3, 3);

        let first: Vec<_> = graph.shortest_paths(source, target).collect();
        let second: Vec<_> = graph.shortest_paths(source, target).collect();

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn first_path_prefers_earliest_discovered_predecessor() {
        let graph = open(3);
        let first = graph
            .shortest_paths(CellCoord::new(0, 0), CellCoord::new(1, 1))
            .next()
            .expect("path exists");
        assert_eq!(
            first,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(1, 1),
            ]
        );
    }

    #[test]
    fn shortest_paths_to_self_is_single_cell() {
        let graph = open(2);
        let cell = CellCoord::new(1, 1);
        let paths: Vec<_> = graph.shortest_paths(cell, cell).collect();
        assert_eq!(paths, vec![vec![cell]]);
        assert_eq!(graph.distance(cell, cell), Some(0));
    }

    #[test]
    fn unreachable_target_yields_no_paths() {
        let graph = TraversalGraph::from_cells(3, |cell| cell.column() != 1);
        let source = CellCoord::new(0, 0);
        let target = CellCoord::new(2, 2);

        assert_eq!(graph.shortest_paths(source, target).count(), 0);
        assert_eq!(graph.distance(source, target), None);
    }

    #[test]
    fn blocked_endpoints_yield_no_paths() {
        let wall = CellCoord::new(0, 0);
        let graph = TraversalGraph::from_cells(3, |cell| cell != wall);

        assert_eq!(graph.shortest_paths(wall, CellCoord::new(2, 2)).count(), 0);
        assert_eq!(graph.shortest_paths(CellCoord::new(2, 2), wall).count(), 0);
        assert_eq!(
            graph
                .shortest_paths(CellCoord::new(9, 9), CellCoord::new(2, 2))
                .count(),
            0
        );
    }

    #[test]
    fn detour_paths_match_distance() {
        // Vertical wall with a single gap at the bottom.
        let graph = TraversalGraph::from_cells(4, |cell| !(cell.column() == 1 && cell.row() < 3));
        let source = CellCoord::new(0, 0);
        let target = CellCoord::new(3, 0);

        let distance = graph.distance(source, target).expect("reachable");
        assert_eq!(distance, 9);
        for path in graph.shortest_paths(source, target) {
            assert_eq!(path.len(), 10);
            assert!(path.contains(&CellCoord::new(1, 3)));
            assert!(is_valid_path(&graph, &path));
        }
    }

    #[test]
    fn build_mirrors_board_passability() {
        let mut board = Board::new(5, 4).expect("valid size");
        for cell in [
            CellCoord::new(1, 0),
            CellCoord::new(1, 1),
            CellCoord::new(3, 2),
            CellCoord::new(4, 4),
        ] {
            board.set_blocked(cell, true).expect("cell can be blocked");
        }
        let _ = board
            .place_figure(CellCoord::new(0, 0))
            .expect("figure placed");
        let _ = board
            .place_figure(CellCoord::new(2, 3))
            .expect("figure placed");
        board
            .set_target(CellCoord::new(4, 0))
            .expect("target set");

        let graph = TraversalGraph::build(&board);
        let cells: Vec<_> = board.cells().collect();

        for (cell, state) in &cells {
            assert_eq!(graph.contains(*cell), !state.is_blocked(), "node {cell}");
        }
        assert_eq!(graph.node_count(), 21);

        let mut edges = 0;
        for (a, a_state) in &cells {
            for (b, b_state) in &cells {
                let expected =
                    a.is_adjacent(*b) && !a_state.is_blocked() && !b_state.is_blocked();
                assert_eq!(graph.has_edge(*a, *b), expected, "edge {a} -> {b}");
                if expected && a < b {
                    edges += 1;
                }
            }
        }
        assert_eq!(graph.edge_count(), edges);
    }

    #[test]
    fn build_is_a_snapshot() {
        let mut board = Board::new(3, 4).expect("valid size");
        let graph = TraversalGraph::build(&board);

        board
            .set_blocked(CellCoord::new(1, 1), true)
            .expect("cell can be blocked");

        assert!(graph.contains(CellCoord::new(1, 1)));
        assert_eq!(graph, open(3));
        assert!(!TraversalGraph::build(&board).contains(CellCoord::new(1, 1)));
    }
}
