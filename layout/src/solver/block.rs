//! The data model of the projection solver: variables, separation
//! constraints and the blocks of variables that move together.

/// A handle to a variable in a Solver.
#[derive(Copy, Clone, Default, PartialEq, PartialOrd, Eq, Ord, Hash, Debug)]
pub struct VariableId {
    idx: usize,
}

impl VariableId {
    pub fn new(idx: usize) -> Self {
        Self { idx }
    }
    pub fn get_index(&self) -> usize {
        self.idx
    }
}

/// A handle to a constraint in a Solver.
#[derive(Copy, Clone, Default, PartialEq, PartialOrd, Eq, Ord, Hash, Debug)]
pub struct ConstraintId {
    idx: usize,
}

impl ConstraintId {
    pub fn new(idx: usize) -> Self {
        Self { idx }
    }
    pub fn get_index(&self) -> usize {
        self.idx
    }
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub desired: f64,
    pub weight: f64,
    /// The block that owns the variable.
    pub block: usize,
    /// The position of the variable relative to the block position.
    pub offset: f64,
}

/// The constraint right - left >= gap, or right - left == gap for
/// equalities.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub left: usize,
    pub right: usize,
    pub gap: f64,
    pub equality: bool,
    /// Set when the constraint is tight and holds two variables in the same
    /// block.
    pub active: bool,
    /// Set for inequalities that could not be satisfied together with the
    /// active constraints.
    pub unsatisfiable: bool,
    /// The Lagrange multiplier, valid for active constraints after the
    /// multipliers of the block are computed.
    pub lm: f64,
}

impl Constraint {
    /// \returns the variable at the other end of the constraint.
    pub fn other(&self, v: usize) -> usize {
        if v == self.left {
            self.right
        } else {
            self.left
        }
    }
}

/// A set of variables whose relative positions are fixed by active
/// constraints. The block sits at the weighted average of the desired
/// positions of its members, corrected by their offsets, which is the
/// position that minimizes the weighted squared displacement.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub vars: Vec<usize>,
    /// The sum of the weights of the members.
    pub weight: f64,
    /// The sum of weight * (desired - offset) of the members.
    pub wposn: f64,
}

impl Block {
    pub fn singleton(var: usize, desired: f64, weight: f64) -> Self {
        Self {
            vars: vec![var],
            weight,
            wposn: weight * desired,
        }
    }

    pub fn position(&self) -> f64 {
        if self.weight == 0. {
            return 0.;
        }
        self.wposn / self.weight
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn add(&mut self, idx: usize, var: &Variable) {
        self.vars.push(idx);
        self.weight += var.weight;
        self.wposn += var.weight * (var.desired - var.offset);
    }

    /// Recompute the sums from the member list.
    pub fn recompute(&mut self, vars: &[Variable]) {
        self.weight = 0.;
        self.wposn = 0.;
        for v in self.vars.iter() {
            let var = &vars[*v];
            self.weight += var.weight;
            self.wposn += var.weight * (var.desired - var.offset);
        }
    }

    pub fn clear(&mut self) {
        self.vars.clear();
        self.weight = 0.;
        self.wposn = 0.;
    }
}

#[test]
fn test_block_position() {
    let vars = vec![
        Variable {
            desired: 0.,
            weight: 1.,
            block: 0,
            offset: 0.,
        },
        Variable {
            desired: 1.,
            weight: 3.,
            block: 0,
            offset: 2.,
        },
    ];
    let mut b = Block::singleton(0, 0., 1.);
    b.add(1, &vars[1]);
    // (1 * 0 + 3 * (1 - 2)) / 4
    assert_eq!(b.position(), -0.75);
    b.recompute(&vars);
    assert_eq!(b.weight, 4.);
    assert_eq!(b.position(), -0.75);
}
