//! Type inference and typed conversion for untyped JSON documents.
//!
//! Pipeline: decoded JSON → [`inference::infer`] → [`ir::Ty`] → [`convert::convert`] →
//! [`value::Val`] + [`diag::Diagnostics`]. [`outputs::project`] runs it per output of a
//! state document and splits the result into full and non-sensitive projections.
pub mod cli;
pub mod convert;
pub mod diag;
pub mod inference;
pub mod ir;
pub mod jq_exec;
pub mod outputs;
pub mod path_de;
pub mod value;

pub use convert::{convert, ConvertError};
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use inference::{infer, InferError};
pub use ir::{Ty, TypeSyntaxError};
pub use outputs::{project, Projection, ProjectionOptions, TypeSource};
pub use value::Val;
