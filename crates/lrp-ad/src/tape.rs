//! Tape-based reverse-mode automatic differentiation.
//!
//! The forward pass records every operation as a node; one backward sweep then
//! yields the adjoint of the output with respect to **every** input. For the
//! stock-recruitment objective (4 parameters per stock plus hyperparameters)
//! this is one forward + one backward pass instead of one pass per parameter.
//!
//! Non-elementary functions get dedicated nodes with closed-form reverse rules
//! ([`Tape::lambert_w_log`], [`Tape::log1pexp`]).
//!
//! # Example
//! ```
//! use lrp_ad::tape::Tape;
//!
//! let mut tape = Tape::new();
//! let log_b = tape.var(-5.0);
//! let b = tape.exp(log_b);            // b = e^{log_b}
//! let bs = tape.mul_f64(b, 100.0);    // b * S with S = 100
//! tape.backward(bs);
//! assert!((tape.adjoint(log_b) - 100.0 * (-5.0_f64).exp()).abs() < 1e-12);
//! ```

use crate::lambert;

/// Handle to a node on the tape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Var(pub(crate) usize);

/// Operation recorded on the tape.
#[derive(Debug, Clone, Copy)]
enum Op {
    /// Input variable (leaf).
    Input,
    /// Constant (adjoint never propagated).
    Const,
    // Binary ops
    Add(usize, usize),
    Sub(usize, usize),
    Mul(usize, usize),
    Div(usize, usize),
    /// Max(a, b): gradient flows to the winner only.
    Max(usize, usize),
    // Unary ops
    Neg(usize),
    Ln(usize),
    Exp(usize),
    /// Stable `ln(1 + exp(a))`.
    Log1pExp(usize),
    /// `W(e^a)`; backward uses the closed form, not the solver iterations.
    LambertWLog(usize),
}

/// Node on the tape: value + operation that produced it.
#[derive(Debug, Clone)]
struct Node {
    val: f64,
    op: Op,
}

/// Reverse-mode AD tape.
///
/// Build a computation graph by calling methods (var, add, mul, ln, …),
/// then call [`backward`](Tape::backward) and read gradients with [`adjoint`](Tape::adjoint).
/// A tape can be re-run backward from different outputs without re-recording.
#[derive(Debug)]
pub struct Tape {
    nodes: Vec<Node>,
    adjoints: Vec<f64>,
}

impl Tape {
    /// Create an empty tape.
    pub fn new() -> Self {
        Self { nodes: Vec::new(), adjoints: Vec::new() }
    }

    /// Create a tape pre-allocated for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { nodes: Vec::with_capacity(capacity), adjoints: Vec::with_capacity(capacity) }
    }

    /// Number of nodes on the tape.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tape is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Clear the tape for reuse (avoids reallocation).
    #[inline]
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.adjoints.clear();
    }

    #[inline]
    fn push(&mut self, val: f64, op: Op) -> Var {
        let idx = self.nodes.len();
        self.nodes.push(Node { val, op });
        Var(idx)
    }

    // --- Leaf constructors ---

    /// Record an input variable.
    #[inline]
    pub fn var(&mut self, val: f64) -> Var {
        self.push(val, Op::Input)
    }

    /// Record a constant (gradient never flows through it).
    #[inline]
    pub fn constant(&mut self, val: f64) -> Var {
        self.push(val, Op::Const)
    }

    /// Primal value of a node.
    #[inline]
    pub fn val(&self, v: Var) -> f64 {
        self.nodes[v.0].val
    }

    // --- Binary operations ---

    /// `a + b`
    #[inline]
    pub fn add(&mut self, a: Var, b: Var) -> Var {
        let val = self.val(a) + self.val(b);
        self.push(val, Op::Add(a.0, b.0))
    }

    /// `a - b`
    #[inline]
    pub fn sub(&mut self, a: Var, b: Var) -> Var {
        let val = self.val(a) - self.val(b);
        self.push(val, Op::Sub(a.0, b.0))
    }

    /// `a * b`
    #[inline]
    pub fn mul(&mut self, a: Var, b: Var) -> Var {
        let val = self.val(a) * self.val(b);
        self.push(val, Op::Mul(a.0, b.0))
    }

    /// `a / b`
    #[inline]
    pub fn div(&mut self, a: Var, b: Var) -> Var {
        let val = self.val(a) / self.val(b);
        self.push(val, Op::Div(a.0, b.0))
    }

    /// `max(a, b)`: gradient flows to the winner.
    #[inline]
    pub fn max(&mut self, a: Var, b: Var) -> Var {
        let (va, vb) = (self.val(a), self.val(b));
        self.push(if va >= vb { va } else { vb }, Op::Max(a.0, b.0))
    }

    // --- Unary operations ---

    /// `-a`
    #[inline]
    pub fn neg(&mut self, a: Var) -> Var {
        let val = -self.val(a);
        self.push(val, Op::Neg(a.0))
    }

    /// `ln(a)`
    #[inline]
    pub fn ln(&mut self, a: Var) -> Var {
        let val = self.val(a).ln();
        self.push(val, Op::Ln(a.0))
    }

    /// `exp(a)`
    #[inline]
    pub fn exp(&mut self, a: Var) -> Var {
        let val = self.val(a).exp();
        self.push(val, Op::Exp(a.0))
    }

    /// Stable `ln(1 + exp(a))`.
    #[inline]
    pub fn log1pexp(&mut self, a: Var) -> Var {
        let x = self.val(a);
        let val = x.max(0.0) + (-x.abs()).exp().ln_1p();
        self.push(val, Op::Log1pExp(a.0))
    }

    /// `W(e^a)`, plus whether the solve converged.
    ///
    /// The node's reverse rule is `dW/da = W / (1 + W)`.
    pub fn lambert_w_log(&mut self, a: Var) -> (Var, bool) {
        let sol = lambert::solve_log(self.val(a));
        (self.push(sol.value, Op::LambertWLog(a.0)), sol.converged)
    }

    // --- Convenience: scalar helpers ---

    /// `a + scalar`
    #[inline]
    pub fn add_f64(&mut self, a: Var, s: f64) -> Var {
        let c = self.constant(s);
        self.add(a, c)
    }

    /// `scalar - a`
    #[inline]
    pub fn f64_sub(&mut self, s: f64, a: Var) -> Var {
        let c = self.constant(s);
        self.sub(c, a)
    }

    /// `a * scalar`
    #[inline]
    pub fn mul_f64(&mut self, a: Var, s: f64) -> Var {
        let c = self.constant(s);
        self.mul(a, c)
    }

    /// Sum of `terms` (a zero constant when empty).
    pub fn sum(&mut self, terms: &[Var]) -> Var {
        let mut acc = self.constant(0.0);
        for &t in terms {
            acc = self.add(acc, t);
        }
        acc
    }

    // --- Backward pass ---

    /// Run reverse-mode AD from output node `out`.
    ///
    /// After calling this, use [`adjoint`](Tape::adjoint) to read ∂out/∂x
    /// for any input `x`. Calling it again with another output overwrites
    /// the adjoints.
    pub fn backward(&mut self, out: Var) {
        let n = self.nodes.len();
        self.adjoints.resize(n, 0.0);
        self.adjoints.fill(0.0);
        self.adjoints[out.0] = 1.0;

        for i in (0..=out.0).rev() {
            let adj = self.adjoints[i];
            if adj == 0.0 {
                continue;
            }

            match self.nodes[i].op {
                Op::Input | Op::Const => {}
                Op::Add(a, b) => {
                    self.adjoints[a] += adj;
                    self.adjoints[b] += adj;
                }
                Op::Sub(a, b) => {
                    self.adjoints[a] += adj;
                    self.adjoints[b] -= adj;
                }
                Op::Mul(a, b) => {
                    let va = self.nodes[a].val;
                    let vb = self.nodes[b].val;
                    self.adjoints[a] += adj * vb;
                    self.adjoints[b] += adj * va;
                }
                Op::Div(a, b) => {
                    let va = self.nodes[a].val;
                    let vb = self.nodes[b].val;
                    self.adjoints[a] += adj / vb;
                    self.adjoints[b] -= adj * va / (vb * vb);
                }
                Op::Max(a, b) => {
                    if self.nodes[a].val >= self.nodes[b].val {
                        self.adjoints[a] += adj;
                    } else {
                        self.adjoints[b] += adj;
                    }
                }
                Op::Neg(a) => {
                    self.adjoints[a] -= adj;
                }
                Op::Ln(a) => {
                    self.adjoints[a] += adj / self.nodes[a].val;
                }
                Op::Exp(a) => {
                    self.adjoints[a] += adj * self.nodes[i].val;
                }
                Op::Log1pExp(a) => {
                    // d/da ln(1 + e^a) = sigmoid(a)
                    let x = self.nodes[a].val;
                    let e = (-x.abs()).exp();
                    let sig = if x >= 0.0 { 1.0 / (1.0 + e) } else { e / (1.0 + e) };
                    self.adjoints[a] += adj * sig;
                }
                Op::LambertWLog(a) => {
                    self.adjoints[a] += adj * lambert::derivative_log(self.nodes[i].val);
                }
            }
        }
    }

    /// Read ∂output/∂v after calling [`backward`](Tape::backward).
    #[inline]
    pub fn adjoint(&self, v: Var) -> f64 {
        self.adjoints.get(v.0).copied().unwrap_or(0.0)
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}
