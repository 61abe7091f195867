// ABOUTME: Error types for the darsy application
// ABOUTME: Groups failures into upstream, export and persistence classes for user-facing messages

use crate::lesson::Language;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LessonError {
    #[error("Failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to reach remote service: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("Generative API error: {0}")]
    UpstreamError(String),

    #[error("Malformed generative API response: {0}")]
    MalformedResponse(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Headless browser error: {message}")]
    BrowserError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Export tooling unavailable: {0}")]
    ExportUnavailable(String),

    #[error("PPTX generation error: {0}")]
    PptxError(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("Slide {index} is out of range (deck has {total} slides)")]
    SlideOutOfRange { index: usize, total: usize },

    #[error("Another {0} request is already in progress")]
    Busy(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

/// Broad failure classes used to pick the message shown next to the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Upstream,
    Export,
    Persistence,
    Input,
}

impl LessonError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LessonError::FetchError(_)
            | LessonError::UpstreamError(_)
            | LessonError::MalformedResponse(_)
            | LessonError::ConfigError(_) => ErrorCategory::Upstream,
            LessonError::BrowserError { .. }
            | LessonError::ExportUnavailable(_)
            | LessonError::PptxError(_)
            | LessonError::ImageError(_) => ErrorCategory::Export,
            LessonError::PersistenceError(_)
            | LessonError::SerializationError(_)
            | LessonError::FileReadError(_) => ErrorCategory::Persistence,
            LessonError::ValidationError(_)
            | LessonError::PathNotFoundError(_)
            | LessonError::SlideOutOfRange { .. }
            | LessonError::Busy(_)
            | LessonError::UnknownError(_) => ErrorCategory::Input,
        }
    }

    /// Short localized message suitable for display near the failed action.
    pub fn user_message(&self, language: Language) -> String {
        let text = match (self.category(), language) {
            (ErrorCategory::Upstream, Language::Ar) => {
                "تعذر الاتصال بخدمة الذكاء الاصطناعي. يرجى المحاولة مرة أخرى."
            }
            (ErrorCategory::Upstream, Language::En) => {
                "Could not reach the lesson generator. Please try again."
            }
            (ErrorCategory::Export, Language::Ar) => "عذراً، تعذر تصدير الملف.",
            (ErrorCategory::Export, Language::En) => "Sorry, the file could not be exported.",
            (ErrorCategory::Persistence, Language::Ar) => "تعذر حفظ البيانات أو قراءتها.",
            (ErrorCategory::Persistence, Language::En) => "Could not save or load your data.",
            (ErrorCategory::Input, Language::Ar) => "يرجى التحقق من المدخلات والمحاولة مرة أخرى.",
            (ErrorCategory::Input, Language::En) => "Please check your input and try again.",
        };
        text.to_string()
    }
}

impl From<anyhow::Error> for LessonError {
    fn from(err: anyhow::Error) -> Self {
        LessonError::UnknownError(err.to_string())
    }
}

impl From<zip::result::ZipError> for LessonError {
    fn from(err: zip::result::ZipError) -> Self {
        LessonError::PptxError(format!("ZIP operation failed: {}", err))
    }
}

impl From<image::ImageError> for LessonError {
    fn from(err: image::ImageError) -> Self {
        LessonError::ImageError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LessonError>;
