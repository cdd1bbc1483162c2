//! Error type shared by the rendering pipeline.

use std::fmt;
use std::io;

/// Errors that can occur while turning a Markdown document into a PDF report.
///
/// The layout core itself never produces errors; every variant originates at a
/// boundary (file system, PDF backend, image decoding or PDF post-processing).
#[derive(Debug)]
pub enum ReportError {
    /// Reading the input or writing the output failed.
    Io(io::Error),
    /// The `genpdf` backend rejected a drawing or serialization request.
    Pdf(genpdf::error::Error),
    /// The rendered bytes could not be reopened or rewritten by `lopdf`.
    Document(lopdf::Error),
    /// The configured font family could not be located or loaded.
    Font {
        /// Human readable description of the lookup that failed.
        message: String,
        /// Underlying loader error, if any.
        source: Option<genpdf::error::Error>,
    },
    /// The logo image could not be decoded.
    Image(String),
    /// The PDF trailer has no catalog entry.
    MissingCatalog,
    /// The catalog entry is not a dictionary.
    InvalidCatalog,
    /// An outline entry refers to a page the rendered document does not have.
    MissingPage {
        /// Title of the heading whose destination is missing.
        title: String,
        /// The requested (1-indexed) page number.
        page_number: usize,
    },
}

impl ReportError {
    pub(crate) fn font(message: impl Into<String>, source: Option<genpdf::error::Error>) -> Self {
        Self::Font {
            message: message.into(),
            source,
        }
    }
}

impl From<io::Error> for ReportError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<genpdf::error::Error> for ReportError {
    fn from(err: genpdf::error::Error) -> Self {
        Self::Pdf(err)
    }
}

impl From<lopdf::Error> for ReportError {
    fn from(err: lopdf::Error) -> Self {
        Self::Document(err)
    }
}

impl From<image::ImageError> for ReportError {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err.to_string())
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Pdf(err) => write!(f, "PDF rendering failed: {err}"),
            Self::Document(err) => write!(f, "Failed to post-process PDF: {err}"),
            Self::Font { message, .. } => write!(f, "{message}"),
            Self::Image(message) => write!(f, "Failed to load logo image: {message}"),
            Self::MissingCatalog => write!(f, "PDF catalog entry is missing"),
            Self::InvalidCatalog => write!(f, "PDF catalog entry is not a dictionary"),
            Self::MissingPage { title, page_number } => write!(
                f,
                "Heading '{}' refers to missing page {} for bookmark destination",
                title, page_number
            ),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Pdf(err) => Some(err),
            Self::Document(err) => Some(err),
            Self::Font { source, .. } => source
                .as_ref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Self::Image(_)
            | Self::MissingCatalog
            | Self::InvalidCatalog
            | Self::MissingPage { .. } => None,
        }
    }
}
