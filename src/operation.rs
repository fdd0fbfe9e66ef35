//! Forward evaluation rules for the operations a node can record.

use std::fmt::Display;

use crate::{error::GradError, Scalar};

/// The kind of operation that produced a node from its children.
///
/// Leaves report [`OpTag::Identity`], as do pass-through nodes created by
/// [`TapeTerm::identity`](crate::TapeTerm::identity).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpTag {
    Identity,
    Add,
    Multiply,
    Subtract,
    Divide,
    Negate,
}

impl OpTag {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Identity => "id",
            Self::Add => "+",
            Self::Multiply => "*",
            Self::Subtract | Self::Negate => "-",
            Self::Divide => "/",
        }
    }
}

impl Display for OpTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Integer token codes: -1 identity, 0 add, 1 multiply, 2 subtract, 3 divide.
/// Negation has no code of its own.
impl TryFrom<i32> for OpTag {
    type Error = GradError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Ok(match code {
            -1 => Self::Identity,
            0 => Self::Add,
            1 => Self::Multiply,
            2 => Self::Subtract,
            3 => Self::Divide,
            _ => {
                return Err(GradError::invalid_operation(format!(
                    "unknown operation code {code}"
                )))
            }
        })
    }
}

/// The closed set of operations that combine two values.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Mul,
    Sub,
    Div,
}

impl BinaryOp {
    pub fn apply<T: Scalar>(&self, lhs: T, rhs: T) -> T {
        match self {
            Self::Add => lhs + rhs,
            Self::Mul => lhs * rhs,
            Self::Sub => lhs - rhs,
            Self::Div => lhs / rhs,
        }
    }
}

impl TryFrom<OpTag> for BinaryOp {
    type Error = GradError;

    fn try_from(tag: OpTag) -> Result<Self, Self::Error> {
        match tag {
            OpTag::Add => Ok(Self::Add),
            OpTag::Multiply => Ok(Self::Mul),
            OpTag::Subtract => Ok(Self::Sub),
            OpTag::Divide => Ok(Self::Div),
            OpTag::Identity | OpTag::Negate => Err(GradError::invalid_operation(format!(
                "{tag} is not a binary operation"
            ))),
        }
    }
}

/// Maps a tag to its evaluation rule.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Operation {
    tag: OpTag,
}

impl Default for Operation {
    fn default() -> Self {
        Self {
            tag: OpTag::Identity,
        }
    }
}

impl Operation {
    pub fn new(tag: OpTag) -> Self {
        Self { tag }
    }

    /// Evaluates `v1 op v2`. Fails with [`GradError::InvalidOperation`] unless the
    /// tag names one of the four binary operations.
    pub fn perform<T: Scalar>(&self, v1: T, v2: T) -> Result<T, GradError> {
        Ok(BinaryOp::try_from(self.tag)?.apply(v1, v2))
    }
}
