//! mica_evaluator: Executes lowered mica programs.
//!
//! Each lowered body is a flat statement list. The evaluator walks it with
//! an instruction pointer and a label-to-index jump table built once per
//! body; expressions are evaluated recursively.

mod console;
mod error;
mod evaluator;

pub use console::{BufferedConsole, Console, StdConsole};
pub use error::EvaluateError;
pub use evaluator::{Evaluator, EvaluatorOptions, Variables};
