//! Error taxonomy for the trie/matcher build phase.
//!
//! Only one condition in the insert/build lifecycle is modeled as a
//! recoverable error rather than a plain bool/Option: inserting a pattern
//! that contains the reserved null symbol, which would otherwise silently
//! corrupt the double-array terminal-slot convention (see
//! [`crate::symbol::Symbol::NULL`]).

use thiserror::Error;

/// Errors that can occur while building a trie or matcher.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TrieError {
    /// A pattern contained the reserved null symbol (index 0), which the
    /// double-array trie uses as the end-of-key marker for terminal slots.
    #[error("pattern contains the reserved null symbol")]
    NullSymbolInPattern,
}
