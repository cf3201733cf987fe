//! The unified error taxonomy for xmk.
//!
//! Every fatal condition the tool can hit — from a bad input file down to a
//! nonzero child exit code — is a variant of [`Error`]. There is no
//! recovery path anywhere in the crate: the first `Error` produced by any
//! component unwinds straight back to `main`, which prints one line and
//! exits 1.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("line {line}: {kind}")]
    Lexical { line: u32, kind: LexicalErrorKind },

    #[error("line {line}: {kind}")]
    Parse { line: u32, kind: ParseErrorKind },

    #[error("{0}")]
    Semantic(SemanticErrorKind),

    #[error("command `{command}` exited with status {code}")]
    ChildFailure { command: String, code: i32 },

    #[error("failed to spawn command `{command}`: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("target \"{0}\" is missing after its commands ran")]
    PostBuildMissing(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LexicalErrorKind {
    #[error("unterminated quoted word")]
    UnterminatedQuote,

    #[error("word exceeds 254 bytes")]
    WordTooLong,

    #[error("undefined symbol `${0}`")]
    UndefinedSymbol(String),

    #[error("malformed $(dep[...]) reference")]
    MalformedDepRef,

    #[error("dependency index {index} out of range (target has {available} dep(s))")]
    DepIndexOutOfRange { index: i64, available: usize },

    #[error("$(target...) macro used outside a target block")]
    TargetMacroOutsideScope,

    #[error("define `${0}` expands into itself (cyclic expansion)")]
    CyclicExpansion(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("nesting depth exceeds the maximum of 2")]
    NestingTooDeep,

    #[error("unexpected end of input while matching a recipe")]
    UnexpectedEof,
}

#[derive(Debug, thiserror::Error)]
pub enum SemanticErrorKind {
    #[error("no build target declared (missing `build` statement)")]
    NoBuildTarget,

    #[error("duplicate `build` statement (target already set to \"{0}\")")]
    DuplicateBuildTarget(String),

    #[error("duplicate target \"{0}\"")]
    DuplicateTarget(String),

    #[error("target \"{0}\" has no dependencies and no commands")]
    EmptyTarget(String),

    #[error("dependency \"{dep}\" of target \"{target}\" is neither a declared target nor an existing file")]
    UnresolvedDependency { target: String, dep: String },
}
