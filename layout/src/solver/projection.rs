//! The projection solver. Given variables with desired positions and weights,
//! and separation constraints of the form right - left >= gap (or == gap),
//! the solver finds positions that satisfy the constraints and minimize the
//! weighted squared distance from the desired positions.
//!
//! The solver groups variables into blocks that move together. A violated
//! constraint between two blocks merges them. A violated constraint inside a
//! block splits the block on the least critical active constraint on the
//! path between the two variables, and then merges the halves through the
//! violated constraint. Finally, blocks are split on active constraints with
//! negative Lagrange multipliers until the solution is locally optimal.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};

use super::block::{Block, Constraint, ConstraintId, Variable, VariableId};
use crate::core::error::{LayoutError, Result};

/// The relative tolerance of constraint violation checks.
const EPSILON: f64 = 1e-9;

/// Multipliers above this (negative) value are not worth a split.
const LM_TOLERANCE: f64 = 1e-7;

#[derive(Debug, Clone, Default)]
pub struct Solver {
    vars: Vec<Variable>,
    constraints: Vec<Constraint>,
    blocks: Vec<Block>,
    // The constraints that touch each variable.
    incident: Vec<Vec<usize>>,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable that wants to be at \p desired. The \p weight controls
    /// how strongly it resists moving, and must be positive and finite.
    pub fn add_variable(&mut self, desired: f64, weight: f64) -> Result<VariableId> {
        if !(weight.is_finite() && weight > 0.) {
            return Err(LayoutError::InvalidWeight(weight));
        }
        assert!(desired.is_finite(), "Invalid desired position");
        let idx = self.vars.len();
        let block = self.blocks.len();
        self.blocks.push(Block::singleton(idx, desired, weight));
        self.vars.push(Variable {
            desired,
            weight,
            block,
            offset: 0.,
        });
        self.incident.push(Vec::new());
        Ok(VariableId::new(idx))
    }

    /// Add the constraint right - left >= gap, or right - left == gap if
    /// \p equality is set.
    pub fn add_constraint(
        &mut self,
        left: VariableId,
        right: VariableId,
        gap: f64,
        equality: bool,
    ) -> Result<ConstraintId> {
        let (l, r) = (left.get_index(), right.get_index());
        if l == r {
            return Err(LayoutError::SelfConstraint(l));
        }
        assert!(l < self.vars.len() && r < self.vars.len(), "Invalid variable");
        assert!(gap.is_finite(), "Invalid gap");
        let idx = self.constraints.len();
        self.constraints.push(Constraint {
            left: l,
            right: r,
            gap,
            equality,
            active: false,
            unsatisfiable: false,
            lm: 0.,
        });
        self.incident[l].push(idx);
        self.incident[r].push(idx);
        Ok(ConstraintId::new(idx))
    }

    pub fn num_variables(&self) -> usize {
        self.vars.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// \returns the number of non-empty blocks.
    pub fn num_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_empty()).count()
    }

    pub fn position(&self, var: VariableId) -> f64 {
        self.pos(var.get_index())
    }

    pub fn positions(&self) -> Vec<f64> {
        (0..self.vars.len()).map(|v| self.pos(v)).collect()
    }

    pub fn is_active(&self, c: ConstraintId) -> bool {
        self.constraints[c.get_index()].active
    }

    pub fn is_unsatisfiable(&self, c: ConstraintId) -> bool {
        self.constraints[c.get_index()].unsatisfiable
    }

    /// \returns the Lagrange multiplier of the constraint from the last
    /// solve. Zero for inactive constraints.
    pub fn lagrange_multiplier(&self, c: ConstraintId) -> f64 {
        let con = &self.constraints[c.get_index()];
        if con.active {
            con.lm
        } else {
            0.
        }
    }

    /// \returns the weighted squared displacement of the current positions.
    pub fn cost(&self) -> f64 {
        self.vars
            .iter()
            .enumerate()
            .map(|(i, v)| v.weight * (self.pos(i) - v.desired).powi(2))
            .sum()
    }

    /// Move the variables to satisfy all of the constraints.
    pub fn solve(&mut self) -> Result<()> {
        #[cfg(feature = "log")]
        log::debug!(
            "Solving {} variables with {} constraints.",
            self.vars.len(),
            self.constraints.len()
        );
        self.satisfy()?;
        self.refine()?;
        #[cfg(feature = "log")]
        log::debug!("Solved into {} blocks.", self.num_blocks());
        Ok(())
    }

    fn pos(&self, v: usize) -> f64 {
        let var = &self.vars[v];
        self.blocks[var.block].position() + var.offset
    }

    fn iteration_limit(&self) -> usize {
        100 * (self.constraints.len() + self.vars.len()) + 100
    }

    /// \returns the amount by which the constraint \p c is violated. A
    /// positive value means that the variables are too close together.
    fn violation(&self, c: usize) -> f64 {
        let con = &self.constraints[c];
        con.gap - (self.pos(con.right) - self.pos(con.left))
    }

    fn tolerance(&self, c: usize) -> f64 {
        let con = &self.constraints[c];
        let scale = 1. + con.gap.abs() + self.pos(con.left).abs() + self.pos(con.right).abs();
        EPSILON * scale
    }

    /// \returns the most violated constraint that is not active. Ties go to
    /// the constraint that was added first.
    fn most_violated(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, con) in self.constraints.iter().enumerate() {
            if con.active || con.unsatisfiable {
                continue;
            }
            let v = self.violation(i);
            let v = if con.equality { v.abs() } else { v };
            if v <= self.tolerance(i) {
                continue;
            }
            match best {
                Some((_, best_v)) if best_v >= v => {}
                _ => best = Some((i, v)),
            }
        }
        best.map(|x| x.0)
    }

    fn satisfy(&mut self) -> Result<()> {
        for _ in 0..self.iteration_limit() {
            let Some(c) = self.most_violated() else {
                return Ok(());
            };
            let con = &self.constraints[c];
            if self.vars[con.left].block != self.vars[con.right].block {
                self.merge(c);
            } else {
                self.split_and_merge(c)?;
            }
        }
        #[cfg(feature = "log")]
        log::warn!("The solver reached the iteration limit while satisfying constraints.");
        Ok(())
    }

    /// Merge the blocks of the endpoints of \p c so that the constraint is
    /// tight. The smaller block is moved into the larger one.
    fn merge(&mut self, c: usize) {
        let con = &self.constraints[c];
        let (l, r, gap) = (con.left, con.right, con.gap);
        let bl = self.vars[l].block;
        let br = self.vars[r].block;
        assert_ne!(bl, br, "Merging a block with itself");

        let (keep, gone) = if self.blocks[br].vars.len() > self.blocks[bl].vars.len() {
            (br, bl)
        } else {
            (bl, br)
        };

        // Re-base the moved block so that right - left == gap.
        let shift = if keep == bl {
            self.vars[l].offset + gap - self.vars[r].offset
        } else {
            self.vars[r].offset - gap - self.vars[l].offset
        };

        let moved = std::mem::take(&mut self.blocks[gone].vars);
        self.blocks[gone].clear();
        for v in moved {
            self.vars[v].offset += shift;
            self.vars[v].block = keep;
            self.blocks[keep].add(v, &self.vars[v]);
        }
        self.constraints[c].active = true;
    }

    /// Handle a violated constraint \p c whose endpoints are in the same
    /// block.
    fn split_and_merge(&mut self, c: usize) -> Result<()> {
        let con = &self.constraints[c];
        let (l, r, equality) = (con.left, con.right, con.equality);
        // Should the distance right - left grow or shrink?
        let grow = !equality || self.violation(c) > 0.;

        self.compute_lagrange_multipliers(self.vars[l].block);

        let mut best: Option<usize> = None;
        for (pc, forward) in self.active_path(l, r) {
            let candidate = &self.constraints[pc];
            if candidate.equality || forward != grow {
                continue;
            }
            best = match best {
                Some(b) => {
                    let blm = self.constraints[b].lm;
                    if candidate.lm < blm || (candidate.lm == blm && pc < b) {
                        Some(pc)
                    } else {
                        Some(b)
                    }
                }
                None => Some(pc),
            };
        }

        match best {
            Some(s) => {
                self.split(s);
                self.merge(c);
                Ok(())
            }
            None if !equality => {
                #[cfg(feature = "log")]
                log::warn!(
                    "Constraint {} between variables {} and {} is unsatisfiable.",
                    c,
                    l,
                    r
                );
                self.constraints[c].unsatisfiable = true;
                Ok(())
            }
            None => Err(LayoutError::InfeasibleConstraintSet { left: l, right: r }),
        }
    }

    /// \returns the active constraints on the path from \p from to \p to,
    /// with a flag that says if the constraint is walked from its left to its
    /// right variable. The active constraints of a block form a tree, so the
    /// path is unique.
    fn active_path(&self, from: usize, to: usize) -> Vec<(usize, bool)> {
        let mut parent: HashMap<usize, usize> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        parent.insert(from, usize::MAX);
        while let Some(v) = queue.pop_front() {
            if v == to {
                break;
            }
            for c in self.incident[v].iter() {
                let con = &self.constraints[*c];
                if !con.active {
                    continue;
                }
                let next = con.other(v);
                if let Entry::Vacant(e) = parent.entry(next) {
                    e.insert(*c);
                    queue.push_back(next);
                }
            }
        }

        let mut path = Vec::new();
        let mut v = to;
        while v != from {
            let Some(&c) = parent.get(&v) else {
                // Not connected.
                return Vec::new();
            };
            let con = &self.constraints[c];
            let prev = con.other(v);
            path.push((c, con.left == prev));
            v = prev;
        }
        path.reverse();
        path
    }

    /// Compute the Lagrange multipliers of the active constraints in
    /// \p block. The gradient 2 * w * (pos - desired) is summed over each
    /// subtree of the tree of active constraints; the multiplier of the
    /// constraint that holds the subtree is that sum, negated when the
    /// subtree hangs off the left end of the constraint.
    fn compute_lagrange_multipliers(&mut self, block: usize) {
        let Some(&root) = self.blocks[block].vars.first() else {
            return;
        };

        // Collect a dfs order, and the constraint that leads to each node.
        let mut order = Vec::new();
        let mut parent: HashMap<usize, usize> = HashMap::new();
        parent.insert(root, usize::MAX);
        let mut worklist = vec![root];
        while let Some(v) = worklist.pop() {
            order.push(v);
            for c in self.incident[v].iter() {
                let con = &self.constraints[*c];
                if !con.active {
                    continue;
                }
                let next = con.other(v);
                if let Entry::Vacant(e) = parent.entry(next) {
                    e.insert(*c);
                    worklist.push(next);
                }
            }
        }

        let mut dfdv: HashMap<usize, f64> = order
            .iter()
            .map(|v| {
                let var = &self.vars[*v];
                (*v, 2. * var.weight * (self.pos(*v) - var.desired))
            })
            .collect();

        for v in order.iter().rev() {
            let c = parent[v];
            if c == usize::MAX {
                continue;
            }
            let sum = dfdv[v];
            let con = &mut self.constraints[c];
            con.lm = if con.right == *v { sum } else { -sum };
            let p = con.other(*v);
            if let Some(x) = dfdv.get_mut(&p) {
                *x += sum;
            }
        }
    }

    /// Deactivate the constraint \p c and split its block in two.
    fn split(&mut self, c: usize) {
        self.constraints[c].active = false;
        let right = self.constraints[c].right;
        let old = self.vars[right].block;

        // Find the variables that are still connected to the right end.
        let mut side = vec![right];
        let mut seen = HashSet::from([right]);
        let mut i = 0;
        while i < side.len() {
            let v = side[i];
            i += 1;
            for ci in self.incident[v].iter() {
                let con = &self.constraints[*ci];
                if !con.active {
                    continue;
                }
                let next = con.other(v);
                if seen.insert(next) {
                    side.push(next);
                }
            }
        }

        let new_block = self.blocks.len();
        self.blocks[old].vars.retain(|v| !seen.contains(v));
        for v in side.iter() {
            self.vars[*v].block = new_block;
        }
        let mut block = Block {
            vars: side,
            ..Block::default()
        };
        block.recompute(&self.vars);
        self.blocks.push(block);

        let mut old_block = std::mem::take(&mut self.blocks[old]);
        old_block.recompute(&self.vars);
        self.blocks[old] = old_block;
    }

    /// Split blocks on active inequalities with negative multipliers until
    /// no such constraint remains.
    fn refine(&mut self) -> Result<()> {
        for _ in 0..self.iteration_limit() {
            for b in 0..self.blocks.len() {
                if self.blocks[b].vars.len() > 1 {
                    self.compute_lagrange_multipliers(b);
                }
            }

            let mut best: Option<usize> = None;
            for (i, con) in self.constraints.iter().enumerate() {
                if !con.active || con.equality || con.lm >= -LM_TOLERANCE {
                    continue;
                }
                match best {
                    Some(b) if self.constraints[b].lm <= con.lm => {}
                    _ => best = Some(i),
                }
            }

            let Some(s) = best else {
                return Ok(());
            };
            self.split(s);
            self.satisfy()?;
        }
        #[cfg(feature = "log")]
        log::warn!("The solver reached the iteration limit while refining blocks.");
        Ok(())
    }
}

#[cfg(test)]
fn solve_chain(desired: &[f64], cons: &[(usize, usize, f64, bool)]) -> Result<Vec<f64>> {
    let mut s = Solver::new();
    let vars: Vec<VariableId> = desired
        .iter()
        .map(|d| s.add_variable(*d, 1.).unwrap())
        .collect();
    for (l, r, g, eq) in cons {
        s.add_constraint(vars[*l], vars[*r], *g, *eq).unwrap();
    }
    s.solve()?;
    Ok(s.positions())
}

#[test]
fn test_satisfied_constraint() {
    let pos = solve_chain(&[0., 1.], &[(0, 1, 1., false)]).unwrap();
    assert_eq!(pos, vec![0., 1.]);
}

#[test]
fn test_violated_constraint() {
    let pos = solve_chain(&[0., 1.], &[(0, 1, 2., false)]).unwrap();
    assert_eq!(pos[1] - pos[0], 2.);
    assert!(pos[0] < pos[1]);
    assert_eq!(pos[0], -0.5);
}

#[test]
fn test_cycle_of_constraints() {
    let cons: Vec<(usize, usize, f64, bool)> =
        (0..5).map(|i| (i, (i + 1) % 5, 1., false)).collect();
    let pos = solve_chain(&[0., 1., 2., 3., 4.], &cons).unwrap();
    let failed = (0..5).filter(|i| pos[*i] >= pos[(i + 1) % 5]).count();
    assert_eq!(failed, 1);
}

#[test]
fn test_equality_constraints() {
    let pos = solve_chain(&[0., 10., 3.], &[(0, 1, 4., true), (1, 2, 1., false)]).unwrap();
    assert!((pos[1] - pos[0] - 4.).abs() < 1e-9);
    assert!(pos[2] - pos[1] >= 1. - 1e-9);

    // Two equalities that contradict each other.
    let res = solve_chain(&[0., 0.], &[(0, 1, 4., true), (1, 0, 4., true)]);
    assert_eq!(
        res,
        Err(LayoutError::InfeasibleConstraintSet { left: 1, right: 0 })
    );
}

#[test]
fn test_invalid_input() {
    let mut s = Solver::new();
    assert_eq!(s.add_variable(0., 0.), Err(LayoutError::InvalidWeight(0.)));
    assert!(s.add_variable(0., f64::NAN).is_err());
    let a = s.add_variable(0., 1.).unwrap();
    assert_eq!(
        s.add_constraint(a, a, 1., false),
        Err(LayoutError::SelfConstraint(0))
    );
}

#[test]
fn test_solve_is_idempotent() {
    let mut s = Solver::new();
    let a = s.add_variable(0., 1.).unwrap();
    let b = s.add_variable(0.5, 1.).unwrap();
    let c = s.add_variable(10., 1.).unwrap();
    let c0 = s.add_constraint(a, b, 1., false).unwrap();
    s.add_constraint(b, c, 1., false).unwrap();
    s.solve().unwrap();
    let pos = s.positions();
    assert!((pos[0] - -0.25).abs() < 1e-9);
    assert!((pos[1] - 0.75).abs() < 1e-9);
    assert_eq!(pos[2], 10.);
    assert!(s.lagrange_multiplier(c0) >= 0.);

    // Solving again does not move anything.
    let cost = s.cost();
    s.solve().unwrap();
    assert_eq!(s.positions(), pos);
    assert_eq!(s.cost(), cost);
}

#[test]
fn test_many_constraints() {
    // A row of nodes that all want to be at zero.
    let n = 20;
    let desired = vec![0.; n];
    let cons: Vec<(usize, usize, f64, bool)> = (0..n - 1).map(|i| (i, i + 1, 2., false)).collect();
    let pos = solve_chain(&desired, &cons).unwrap();
    for i in 0..n - 1 {
        assert!((pos[i + 1] - pos[i] - 2.).abs() < 1e-9);
    }
    let mean: f64 = pos.iter().sum::<f64>() / n as f64;
    assert!(mean.abs() < 1e-9);
}
