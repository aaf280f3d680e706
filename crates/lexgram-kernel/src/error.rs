//! Error types for grammar registration and finalization.

/// Errors raised while registering grammar components or finalizing a build.
///
/// Every registration call validates before it mutates, so an `Err` always
/// leaves the builder exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrammarError {
    /// A symbol with the composed name already exists.
    #[error("duplicate symbol name: {0}")]
    DuplicateSymbol(String),

    /// A semantic with this name already exists.
    #[error("duplicate semantic name: {0}")]
    DuplicateSemantic(String),

    /// An entity category with this name already exists.
    #[error("duplicate entity category: {0}")]
    DuplicateEntityCategory(String),

    /// A symbol, semantic or category name is malformed.
    #[error("invalid name `{name}`: {reason}")]
    InvalidName { name: String, reason: String },

    /// A rule references a symbol that was never registered.
    #[error("unknown symbol reference: {0}")]
    UnknownSymbol(String),

    /// A semantic handle or name does not resolve.
    #[error("unknown semantic reference: {0}")]
    UnknownSemantic(String),

    /// A placeholder references an entity category that was never registered.
    #[error("unknown entity category: {0}")]
    UnknownEntityCategory(String),

    /// A nonterminal rule must expand to one or two symbols.
    #[error("rule on {symbol} has {len} right-hand-side symbols; expected {expected}")]
    RhsArity {
        symbol: String,
        len: usize,
        expected: &'static str,
    },

    /// A semantic declares impossible arity bounds.
    #[error("semantic {name} has invalid arity bounds {min}..={max}: {reason}")]
    InvalidArity {
        name: String,
        min: usize,
        max: usize,
        reason: &'static str,
    },

    /// A composed semantic received a child count outside its bounds.
    #[error("semantic {semantic} takes {min}..={max} arguments, got {count}")]
    ArityViolation {
        semantic: String,
        min: usize,
        max: usize,
        count: usize,
    },

    /// A `forbids_multiple` semantic appears twice at one composition level.
    #[error("semantic {0} may appear only once at the same composition level")]
    ForbiddenMultiple(String),

    /// An argument semantic was given children.
    #[error("semantic {0} is an argument and cannot take children")]
    ArgumentApplied(String),

    /// A cost is negative or not finite.
    #[error("invalid cost {cost} on {owner}")]
    InvalidCost { owner: String, cost: f64 },

    /// Only binary rules may be transposed.
    #[error("transposition cost on non-binary rule of {0}")]
    TranspositionOnNonBinary(String),

    /// Only lexical rules (terminals and term sequences) may be inserted.
    #[error("insertion cost on non-lexical rule of {0}")]
    InsertionOnNonLexical(String),

    /// A term-sequence symbol was given a rule that is not lexical.
    #[error("term sequence {0} accepts only terminal and term-sequence rules")]
    NonLexicalRule(String),

    /// A no-insertion index does not name a right-hand-side position.
    #[error("no-insertion index {index} out of range for rule of {symbol} with {len} positions")]
    NoInsertionIndex {
        symbol: String,
        index: usize,
        len: usize,
    },

    /// A semantic is attached in a way it can never be satisfied.
    #[error("invalid semantic attachment on {symbol}: {reason}")]
    InvalidAttachment { symbol: String, reason: String },

    /// A term-sequence rule references a symbol that is not a term sequence.
    #[error("{symbol} references {target}, which is not a term sequence")]
    NotATermSequence { symbol: String, target: String },

    /// A term sequence was declared without accepted terms.
    #[error("term sequence {0} has no accepted terms")]
    EmptyTermSequence(String),

    /// The start symbol derives nothing once unproductive rules are removed.
    #[error("start symbol {0} derives no complete expansion")]
    EmptyGrammar(String),

    /// Components unreachable from the start symbol (fatal unless quiet).
    #[error("unused grammar components: {}", .0.join(", "))]
    UnusedComponents(Vec<String>),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("I/O error: {0}")]
    Io(String),
}
