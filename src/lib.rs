// ABOUTME: Library module for the darsy program.
// ABOUTME: Lesson generation, slide presentation with annotations, quizzes and exports.

// Reexport modules
pub mod annotation;
pub mod app;
pub mod config;
pub mod errors;
pub mod generator;
pub mod html;
pub mod lesson;
pub mod pptx;
pub mod presenter;
pub mod quiz;
pub mod raster;
pub mod render;
pub mod resources;
pub mod slides;
pub mod store;
pub mod stroke;
pub mod utils;

// Reexport common types and functions
pub use annotation::{AnnotationLayer, PointerEvent, SurfaceBounds};
pub use app::{App, AppState, RequestTicket};
pub use config::Config;
pub use errors::{ErrorCategory, LessonError, Result};
pub use generator::{GeminiClient, GeneratorConfig, LessonGenerator};
pub use html::{generate_certificate_html, generate_lesson_html, write_html_to_file};
pub use lesson::{Language, Lesson, LessonRequest, QuizQuestion, SavedLesson, Section, Subject, Team};
pub use pptx::{export_pptx, PptxConfig};
pub use presenter::{Key, KeyOutcome, Presentation};
pub use quiz::{Certificate, QuizProgress, QuizSession, TeamRoster};
pub use raster::{parse_hex_color, Color, CompositeMode, Surface};
pub use render::{export_document, print_to_pdf, ExportOutcome, PrintConfig};
pub use resources::ImageResource;
pub use slides::{build_slides, Slide, SlideKind};
pub use store::{FileStore, KeyValueStore, LessonLibrary, MemoryStore};
pub use stroke::{stroke_outline, Stroke, StrokeOptions, StrokePoint, Tool};

#[cfg(test)]
mod tests;
