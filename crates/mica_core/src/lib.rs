//! mica_core: Source text primitives shared by every stage of the mica toolchain.
//!
//! Spans locate tokens, syntax nodes and diagnostics; the line map turns
//! span offsets into line/column pairs when diagnostics are rendered.

pub mod text;

pub use text::{LineAndColumn, LineMap, TextPos, TextSpan};
