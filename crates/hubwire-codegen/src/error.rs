//! Error types for the generation pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type CodegenResult<T> = Result<T, CodegenError>;

/// Errors that can occur while extracting metadata or building models.
///
/// All of these are local to one declaration: the driver converts them to
/// diagnostics instead of aborting the pass.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// I/O error while reading sources or writing artifacts.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A source file failed to parse.
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// Two operations in one contract share a name.
    #[error("duplicate operation name in contract {contract}: {operation}")]
    DuplicateOperation { contract: String, operation: String },

    /// A marker attribute referenced a contract that is not in the
    /// compilation unit.
    #[error("contract not found: {name}")]
    ContractNotFound { name: String },

    /// Two traits in the compilation unit share the contract's simple name.
    #[error("ambiguous contract name: {name}")]
    AmbiguousContract { name: String },

    /// A marker attribute argument was not a bare type path.
    #[error("invalid marker on {declaration}: {message}")]
    InvalidMarker { declaration: String, message: String },

    /// An operation uses a type shape the generator cannot express.
    #[error("unsupported type in contract {contract}: {ty}")]
    UnsupportedType { contract: String, ty: String },
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn CodegenError___duplicate_operation___displays_contract_and_name() {
        let err = CodegenError::DuplicateOperation {
            contract: "ChatHub".to_string(),
            operation: "send_message".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "duplicate operation name in contract ChatHub: send_message"
        );
    }

    #[test]
    fn CodegenError___contract_not_found___displays_name() {
        let err = CodegenError::ContractNotFound { name: "ChatHub".to_string() };

        assert_eq!(err.to_string(), "contract not found: ChatHub");
    }

    #[test]
    fn CodegenError___parse___displays_path() {
        let err = CodegenError::Parse {
            path: "src/contracts.rs".to_string(),
            message: "expected identifier".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("src/contracts.rs"));
        assert!(msg.contains("expected identifier"));
    }

    #[test]
    fn CodegenError___unsupported_type___displays_type() {
        let err = CodegenError::UnsupportedType {
            contract: "ChatHub".to_string(),
            ty: "impl Trait".to_string(),
        };

        assert!(err.to_string().contains("impl Trait"));
    }
}
