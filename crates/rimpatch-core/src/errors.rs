use thiserror::Error;

/// Result type alias using PatchError
pub type Result<T> = std::result::Result<T, PatchError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, log assertions and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Parse-time
    MalformedPatch,
    UnknownOperation,
    InvalidQuery,
    InvalidVersion,
    XmlParse,

    // Apply-time
    QueryShape,
    MissingParent,
    MissingAttribute,
    DifferentRoots,

    // Composite
    Multiple,

    // Integration/IO
    Io,
    InvalidManifest,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::MalformedPatch => "ERR_MALFORMED_PATCH",
            ExErrorKind::UnknownOperation => "ERR_UNKNOWN_OPERATION",
            ExErrorKind::InvalidQuery => "ERR_INVALID_QUERY",
            ExErrorKind::InvalidVersion => "ERR_INVALID_VERSION",
            ExErrorKind::XmlParse => "ERR_XML_PARSE",
            ExErrorKind::QueryShape => "ERR_QUERY_SHAPE",
            ExErrorKind::MissingParent => "ERR_MISSING_PARENT",
            ExErrorKind::MissingAttribute => "ERR_MISSING_ATTRIBUTE",
            ExErrorKind::DifferentRoots => "ERR_DIFFERENT_ROOTS",
            ExErrorKind::Multiple => "ERR_MULTIPLE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::InvalidManifest => "ERR_INVALID_MANIFEST",
        }
    }

    /// Whether errors of this kind are detected before any mutation happens
    pub fn is_parse_time(&self) -> bool {
        matches!(
            self,
            ExErrorKind::MalformedPatch
                | ExErrorKind::UnknownOperation
                | ExErrorKind::InvalidQuery
                | ExErrorKind::InvalidVersion
                | ExErrorKind::XmlParse
        )
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling plus context
/// (operation, unit, file) for diagnostics.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    unit_id: Option<String>,
    file: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            unit_id: None,
            file: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add unit id context
    pub fn with_unit_id(mut self, id: impl Into<String>) -> Self {
        self.unit_id = Some(id.into());
        self
    }

    /// Add file context
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn unit_id(&self) -> Option<&str> {
        self.unit_id.as_deref()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(unit_id) = &self.unit_id {
            write!(f, " (unit: {})", unit_id)?;
        }
        if let Some(file) = &self.file {
            write!(f, " (file: {})", file)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for parsing and applying patch operations
///
/// Parse-time variants (`MalformedPatch`, `UnknownOperation`, `InvalidQuery`,
/// `InvalidVersion`, `XmlParse`) abort the containing file before anything is
/// applied. Apply-time variants abort the remainder of the current file but
/// leave earlier mutations in place.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchError {
    // ===== Parse-time =====
    /// A required sub-element is missing or an enumerated value is invalid
    #[error("Malformed patch: {reason}")]
    MalformedPatch { reason: String },

    /// The `Class` attribute names no known operation
    #[error("Unknown operation class: {class}")]
    UnknownOperation { class: String },

    /// The query string is outside the supported path subset
    #[error("Invalid query '{query}': {reason}")]
    InvalidQuery { query: String, reason: String },

    /// A version identifier could not be parsed
    #[error("Invalid version: {text}")]
    InvalidVersion { text: String },

    /// The XML text itself could not be parsed
    #[error("XML parse error: {reason}")]
    XmlParse { reason: String },

    // ===== Apply-time =====
    /// A query produced results of a kind the operation cannot handle
    #[error("Query '{query}' returned unexpected results: {reason}")]
    QueryShape { query: String, reason: String },

    /// A matched element has no parent element
    #[error("Parent not found for {query}")]
    MissingParent { query: String },

    /// A matched element does not carry the named attribute
    #[error("Attribute '{attribute}' not found on element matched by {query}")]
    MissingAttribute { query: String, attribute: String },

    /// A merged file's root tag differs from the working document's
    #[error("Root tags differ: {expected} != {found}")]
    DifferentRoots { expected: String, found: String },

    // ===== Composite =====
    /// Errors collected from several child results
    #[error("Patch operation sequence errors: {}", format_errors(.errors))]
    Multiple { errors: Vec<PatchError> },

    // ===== Integration =====
    /// Reading a file or directory failed
    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },
}

fn format_errors(errors: &[PatchError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl PatchError {
    /// Shorthand for a malformed-patch error
    pub fn malformed(reason: impl Into<String>) -> Self {
        PatchError::MalformedPatch {
            reason: reason.into(),
        }
    }

    /// Canonical kind of this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            PatchError::MalformedPatch { .. } => ExErrorKind::MalformedPatch,
            PatchError::UnknownOperation { .. } => ExErrorKind::UnknownOperation,
            PatchError::InvalidQuery { .. } => ExErrorKind::InvalidQuery,
            PatchError::InvalidVersion { .. } => ExErrorKind::InvalidVersion,
            PatchError::XmlParse { .. } => ExErrorKind::XmlParse,
            PatchError::QueryShape { .. } => ExErrorKind::QueryShape,
            PatchError::MissingParent { .. } => ExErrorKind::MissingParent,
            PatchError::MissingAttribute { .. } => ExErrorKind::MissingAttribute,
            PatchError::DifferentRoots { .. } => ExErrorKind::DifferentRoots,
            PatchError::Multiple { .. } => ExErrorKind::Multiple,
            PatchError::Io { .. } => ExErrorKind::Io,
        }
    }
}

/// Conversion from PatchError to ExError
impl From<PatchError> for ExError {
    fn from(err: PatchError) -> Self {
        let kind = err.kind();
        match err {
            PatchError::UnknownOperation { ref class } => ExError::new(kind)
                .with_op(class.clone())
                .with_message(err.to_string()),

            PatchError::InvalidQuery { ref query, .. }
            | PatchError::QueryShape { ref query, .. }
            | PatchError::MissingParent { ref query }
            | PatchError::MissingAttribute { ref query, .. } => ExError::new(kind)
                .with_op(format!("query {}", query))
                .with_message(err.to_string()),

            PatchError::Io { ref path, .. } => ExError::new(kind)
                .with_file(path.clone())
                .with_message(err.to_string()),

            PatchError::Multiple { errors } => {
                let message = format_errors(&errors);
                let mut ex = ExError::new(kind).with_message(message);
                if let Some(first) = errors.into_iter().next() {
                    ex = ex.with_source(first.into());
                }
                ex
            }

            other => ExError::new(kind).with_message(other.to_string()),
        }
    }
}

impl From<roxmltree::Error> for PatchError {
    fn from(err: roxmltree::Error) -> Self {
        PatchError::XmlParse {
            reason: err.to_string(),
        }
    }
}
