use serde::Serialize;

// ── Classification ────────────────────────────────────

/// Terminal failure classes of a gallery load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transport failure or a non-success response status.
    ConfigUnreachable,
    /// Body present but not valid JSON.
    ConfigMalformed,
    /// Parsed document has no usable `certificates` list.
    ConfigShapeInvalid,
    /// A single entry is missing a required field.
    EntryInvalid,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConfigUnreachable => "config_unreachable",
            Self::ConfigMalformed => "config_malformed",
            Self::ConfigShapeInvalid => "config_shape_invalid",
            Self::EntryInvalid => "entry_invalid",
        }
    }

    /// Whether this kind replaces the gallery with an error banner.
    /// Shape problems fall back to the empty state and entry problems
    /// only skip the entry.
    pub fn is_banner(&self) -> bool {
        matches!(self, Self::ConfigUnreachable | Self::ConfigMalformed)
    }

    /// Human-readable message shown inside the render target. Entry problems
    /// never reach the target, so they have none.
    pub fn user_message(&self, source_path: &str) -> Option<String> {
        match self {
            Self::ConfigUnreachable => Some(format!(
                "Certificate config file not found. Please ensure {} exists.",
                source_path
            )),
            Self::ConfigMalformed => {
                Some("Invalid JSON format in certificates config file.".to_string())
            }
            Self::ConfigShapeInvalid => Some(format!(
                "Please check if {} file exists and contains valid certificate data.",
                source_path
            )),
            Self::EntryInvalid => None,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ── Errors ────────────────────────────────────────────

/// A transport-level failure reported by a `DocumentFetcher`.
#[derive(Debug)]
pub struct FetchError(pub String);

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A classified load failure. Never escapes `CertificateGallery::load`.
#[derive(Debug)]
pub struct GalleryError {
    pub kind: ErrorKind,
    pub detail: String,
}

impl GalleryError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        GalleryError {
            kind,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for GalleryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

impl From<FetchError> for GalleryError {
    fn from(e: FetchError) -> Self {
        GalleryError::new(ErrorKind::ConfigUnreachable, e.0)
    }
}

/// Why a single certificate entry was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    NotAnObject,
    MissingField(&'static str),
}

impl std::fmt::Display for EntryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "entry is not an object"),
            Self::MissingField(field) => write!(f, "missing required field '{}'", field),
        }
    }
}
