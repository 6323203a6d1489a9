//! Shared position and metadata types for the matrixscript front end.
//!
//! Split out from `msl-parser` so a future code-generation or type-checking
//! crate can depend on the same `Span`/`AttrValue` types without pulling in
//! the parser itself -- mirrors how the teacher toolchain shares `Span`
//! between its lexer, parser, and type checker via `mesh-common`.

pub mod attr;
pub mod span;

pub use attr::AttrValue;
pub use span::Span;
