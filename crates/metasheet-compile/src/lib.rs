//! Compiles field schemas into spreadsheet artifacts: a validation formula,
//! a matching plain-language description, and a default-fill formula.

#![deny(unsafe_code)]

pub mod comparison;
pub mod constraint;
pub mod datetime;
pub mod default;
pub mod describe;
pub mod error;
pub mod logic;
pub mod placeholder;
pub mod plan;
pub mod rollup;
pub mod types;

pub use crate::constraint::{CompiledConstraint, ConstraintCompiler, MAX_NESTING, OutputMode};
pub use crate::default::{compile_default, find_default};
pub use crate::describe::describe_field;
pub use crate::error::{CompileError, Result};
pub use crate::placeholder::{render_default, render_formula};
pub use crate::plan::{ValidationKind, ValidationRule, plan_validation};
pub use crate::rollup::roll_up_allowed;
pub use crate::types::{TypeCheck, resolve as resolve_type};
