//! Public library API for the runtime reflection core of a compiled-language REPL.

/// Type registry, navigation parsing, live-memory evaluation, and session state.
pub mod repl;
