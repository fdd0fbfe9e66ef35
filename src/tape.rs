//! Implementation of shared memory arena for the terms, aka a tape.
//! See https://rufflewind.com/2016-12-30/reverse-mode-automatic-differentiation
//!
//! Every arithmetic operation on a [`TapeTerm`] pushes a node onto the [`Tape`]
//! that records its value, the operation and the indices of its operands.
//! The tape owns every node, so terms are plain `Copy` handles that cannot
//! outlive it.

use std::cell::RefCell;

use log::{debug, trace};

use crate::{
    error::{GradError, Result},
    operation::{BinaryOp, OpTag, Operation},
    Scalar,
};

#[derive(Default, Debug)]
pub struct Tape<T = f64> {
    nodes: RefCell<Vec<TapeNode<T>>>,
}

#[derive(Clone, Debug)]
struct TapeNode<T> {
    name: String,
    value: TapeValue,
    data: T,
    grad: f64,
}

#[derive(Copy, Clone, Debug)]
enum TapeValue {
    Value,
    Identity(u32),
    Neg(u32),
    Add(u32, u32),
    Sub(u32, u32),
    Mul(u32, u32),
    Div(u32, u32),
}

impl TapeValue {
    fn binary(op: BinaryOp, lhs: u32, rhs: u32) -> Self {
        match op {
            BinaryOp::Add => Self::Add(lhs, rhs),
            BinaryOp::Sub => Self::Sub(lhs, rhs),
            BinaryOp::Mul => Self::Mul(lhs, rhs),
            BinaryOp::Div => Self::Div(lhs, rhs),
        }
    }

    fn tag(&self) -> OpTag {
        match self {
            Self::Value | Self::Identity(_) => OpTag::Identity,
            Self::Neg(_) => OpTag::Negate,
            Self::Add(..) => OpTag::Add,
            Self::Sub(..) => OpTag::Subtract,
            Self::Mul(..) => OpTag::Multiply,
            Self::Div(..) => OpTag::Divide,
        }
    }

    fn children(&self) -> Vec<u32> {
        match *self {
            Self::Value => vec![],
            Self::Identity(term) | Self::Neg(term) => vec![term],
            Self::Add(lhs, rhs)
            | Self::Sub(lhs, rhs)
            | Self::Mul(lhs, rhs)
            | Self::Div(lhs, rhs) => vec![lhs, rhs],
        }
    }
}

/// A handle to a node on a [`Tape`].
///
/// Terms are combined with the arithmetic operators, which record a new node on
/// the same tape and return its handle.
#[derive(Copy, Clone)]
pub struct TapeTerm<'a, T = f64> {
    tape: &'a Tape<T>,
    idx: u32,
}

impl<T: Scalar> Tape<T> {
    pub fn new() -> Self {
        Self {
            nodes: RefCell::new(vec![]),
        }
    }

    /// Creates a leaf node, i.e. an input variable.
    pub fn term<'a>(&'a self, name: impl Into<String>, init: T) -> TapeTerm<'a, T> {
        self.push(name.into(), TapeValue::Value, init)
    }

    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Resets the gradient of every node on the tape.
    pub fn zero_grad(&self) {
        let mut nodes = self.nodes.borrow_mut();
        debug!("zero_grad: clearing {} nodes", nodes.len());
        for node in nodes.iter_mut() {
            node.grad = 0.;
        }
    }

    fn push<'a>(&'a self, name: String, value: TapeValue, data: T) -> TapeTerm<'a, T> {
        let mut nodes = self.nodes.borrow_mut();
        let idx = nodes.len();
        nodes.push(TapeNode {
            name,
            value,
            data,
            grad: 0.,
        });
        TapeTerm {
            tape: self,
            idx: idx as u32,
        }
    }

    fn term0<'a>(&'a self, value: TapeValue, data: T) -> TapeTerm<'a, T> {
        let name = {
            let nodes = self.nodes.borrow();
            node_name(&nodes, value)
        };
        self.push(name, value, data)
    }
}

#[cfg(not(feature = "expr_name"))]
fn node_name<T>(nodes: &[TapeNode<T>], _value: TapeValue) -> String {
    format!("a{}", nodes.len())
}

#[cfg(feature = "expr_name")]
fn node_name<T>(nodes: &[TapeNode<T>], value: TapeValue) -> String {
    use TapeValue::*;
    let name = |idx: u32| &nodes[idx as usize].name;
    match value {
        Value => format!("a{}", nodes.len()),
        Identity(term) => name(term).clone(),
        Neg(term) => format!("-{}", name(term)),
        Add(lhs, rhs) | Sub(lhs, rhs) | Mul(lhs, rhs) | Div(lhs, rhs) => {
            format!("({} {} {})", name(lhs), value.tag().symbol(), name(rhs))
        }
    }
}

impl<'a, T: Scalar> std::ops::Add for TapeTerm<'a, T> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        self.binary(BinaryOp::Add, rhs)
    }
}

impl<'a, T: Scalar> std::ops::Sub for TapeTerm<'a, T> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        self.binary(BinaryOp::Sub, rhs)
    }
}

impl<'a, T: Scalar> std::ops::Mul for TapeTerm<'a, T> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        self.binary(BinaryOp::Mul, rhs)
    }
}

impl<'a, T: Scalar> std::ops::Div for TapeTerm<'a, T> {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output {
        self.binary(BinaryOp::Div, rhs)
    }
}

impl<'a, T: Scalar> std::ops::Neg for TapeTerm<'a, T> {
    type Output = Self;
    fn neg(self) -> Self::Output {
        let data = -self.value();
        self.tape.term0(TapeValue::Neg(self.idx), data)
    }
}

impl<'a, T: Scalar> std::fmt::Debug for TapeTerm<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nodes = self.tape.nodes.borrow();
        let node = &nodes[self.idx as usize];
        f.debug_struct("TapeTerm")
            .field("idx", &self.idx)
            .field("name", &node.name)
            .field("op", &node.value.tag())
            .field("data", &node.data)
            .field("grad", &node.grad)
            .finish()
    }
}

impl<'a, T: Scalar> TapeTerm<'a, T> {
    /// Records `self op rhs` for a tag chosen at runtime.
    ///
    /// Fails with [`GradError::InvalidOperation`] if the tag is not a binary
    /// operation or the operands live on different tapes. Nothing is recorded
    /// on failure.
    pub fn combine(self, rhs: Self, tag: OpTag) -> Result<Self> {
        if !std::ptr::eq(self.tape, rhs.tape) {
            return Err(GradError::invalid_operation(
                "operands belong to different tapes",
            ));
        }
        let data = Operation::new(tag).perform(self.value(), rhs.value())?;
        let op = BinaryOp::try_from(tag)?;
        Ok(self.tape.term0(TapeValue::binary(op, self.idx, rhs.idx), data))
    }

    /// Creates a pass-through node with a new name. Its value and derivative are
    /// those of `self`.
    pub fn identity(self, name: impl Into<String>) -> Self {
        let data = self.value();
        self.tape.push(name.into(), TapeValue::Identity(self.idx), data)
    }

    fn binary(self, op: BinaryOp, rhs: Self) -> Self {
        assert!(
            std::ptr::eq(self.tape, rhs.tape),
            "operands belong to different tapes"
        );
        let data = op.apply(self.value(), rhs.value());
        self.tape.term0(TapeValue::binary(op, self.idx, rhs.idx), data)
    }

    pub fn value(&self) -> T {
        self.tape.nodes.borrow()[self.idx as usize].data
    }

    pub fn grad(&self) -> f64 {
        self.tape.nodes.borrow()[self.idx as usize].grad
    }

    pub fn name(&self) -> String {
        self.tape.nodes.borrow()[self.idx as usize].name.clone()
    }

    pub fn op_tag(&self) -> OpTag {
        self.tape.nodes.borrow()[self.idx as usize].value.tag()
    }

    pub fn is_leaf(&self) -> bool {
        matches!(
            self.tape.nodes.borrow()[self.idx as usize].value,
            TapeValue::Value
        )
    }

    /// The operands this term was computed from, in order.
    pub fn children(&self) -> Vec<Self> {
        let value = self.tape.nodes.borrow()[self.idx as usize].value;
        value
            .children()
            .into_iter()
            .map(|idx| TapeTerm {
                tape: self.tape,
                idx,
            })
            .collect()
    }

    /// Propagates `grad` from this term down to every term it depends on,
    /// adding into their gradients.
    ///
    /// Gradients are never reset here, so calling this twice accumulates twice.
    /// Use [`TapeTerm::zero_grad`] or [`Tape::zero_grad`] between passes.
    /// If an error is returned, contributions already made by this call remain.
    pub fn backward(&self, grad: f64) -> Result<()> {
        let mut nodes = self.tape.nodes.borrow_mut();
        debug!(
            "backward: from {} with seed {grad}",
            nodes[self.idx as usize].name
        );
        backward(&mut nodes, self.idx, grad)
    }

    /// Resets the gradient of this term and every term it depends on.
    pub fn zero_grad(&self) {
        let mut nodes = self.tape.nodes.borrow_mut();
        debug!("zero_grad: from {}", nodes[self.idx as usize].name);
        clear_grad(&mut nodes, self.idx);
    }
}

fn data<T: Scalar>(nodes: &[TapeNode<T>], idx: u32) -> f64 {
    nodes[idx as usize].data.to_f64()
}

fn backward<T: Scalar>(nodes: &mut [TapeNode<T>], idx: u32, grad: f64) -> Result<()> {
    use TapeValue::*;
    let node = &mut nodes[idx as usize];
    node.grad += grad;
    trace!("backward({}): +{grad} = {}", node.name, node.grad);
    let value = node.value;
    match value {
        Value => Ok(()),
        Identity(term) => backward(nodes, term, grad),
        Neg(term) => backward(nodes, term, -grad),
        Add(lhs, rhs) => {
            backward(nodes, lhs, grad)?;
            backward(nodes, rhs, grad)
        }
        Sub(lhs, rhs) => {
            backward(nodes, lhs, grad)?;
            backward(nodes, rhs, -grad)
        }
        Mul(lhs, rhs) => {
            let (l, r) = (data(nodes, lhs), data(nodes, rhs));
            backward(nodes, lhs, grad * r)?;
            backward(nodes, rhs, grad * l)
        }
        Div(lhs, rhs) => {
            if nodes[rhs as usize].data.is_zero() {
                return Err(GradError::division_by_zero(
                    nodes[idx as usize].name.clone(),
                ));
            }
            let (l, r) = (data(nodes, lhs), data(nodes, rhs));
            backward(nodes, lhs, grad / r)?;
            backward(nodes, rhs, -grad * l / (r * r))
        }
    }
}

fn clear_grad<T>(nodes: &mut [TapeNode<T>], idx: u32) {
    nodes[idx as usize].grad = 0.;
    for child in nodes[idx as usize].value.children() {
        clear_grad(nodes, child);
    }
}
