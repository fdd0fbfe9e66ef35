//! A minimal reverse-mode automatic differentiation kernel for scalars.
//!
//! Arithmetic on [`TapeTerm`]s records a graph on a [`Tape`]; calling
//! [`TapeTerm::backward`] on the output accumulates the derivative of that output
//! into every term it depends on.
//!
//! ```
//! use jojograd::Tape;
//!
//! let tape = Tape::new();
//! let a = tape.term("a", 10.);
//! let b = tape.term("b", 2.);
//! let c = a * b;
//! let d = c / b;
//! d.backward(1.).unwrap();
//! assert_eq!(c.grad(), 0.5);
//! assert_eq!(a.grad(), 1.);
//! ```

pub mod error;
pub mod operation;
mod scalar;
pub mod tape;

pub use error::GradError;
pub use operation::{BinaryOp, OpTag, Operation};
pub use scalar::Scalar;
pub use tape::{Tape, TapeTerm};

#[cfg(feature = "macro")]
pub use jojograd_macro::jojograd;
