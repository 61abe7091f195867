// ABOUTME: Presentation mode controller for the darsy application
// ABOUTME: Tracks the current slide, keyboard navigation and the per-slide annotation layer

use crate::annotation::{AnnotationLayer, SurfaceBounds};
use crate::errors::{LessonError, Result};
use crate::lesson::{Language, Lesson};
use crate::slides::{build_slides, Slide};
use log::debug;

/// Keys presentation mode reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowRight,
    ArrowLeft,
    ArrowUp,
    ArrowDown,
    PageUp,
    PageDown,
    Space,
    Escape,
    Other(char),
}

/// Result of a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Moved(usize),
    /// Advance or retreat was requested at a boundary.
    Unchanged,
    Exit,
    Ignored,
}

/// Presentation of one lesson: its slides, the current position and the
/// annotation layer drawn over the current slide.
#[derive(Debug, Clone)]
pub struct Presentation {
    language: Language,
    slides: Vec<Slide>,
    current: usize,
    annotations: AnnotationLayer,
}

impl Presentation {
    pub fn new(lesson: &Lesson, bounds: SurfaceBounds) -> Self {
        Self {
            language: lesson.language,
            slides: build_slides(lesson),
            current: 0,
            annotations: AnnotationLayer::new(bounds),
        }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn total(&self) -> usize {
        self.slides.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_slide(&self) -> &Slide {
        &self.slides[self.current]
    }

    pub fn annotations(&self) -> &AnnotationLayer {
        &self.annotations
    }

    pub fn annotations_mut(&mut self) -> &mut AnnotationLayer {
        &mut self.annotations
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.total()
    }

    /// Localized "slide N of total".
    pub fn counter_label(&self) -> String {
        self.language.slide_counter(self.current + 1, self.total())
    }

    fn go_to(&mut self, index: usize) {
        self.annotations.clear();
        self.current = index;
        debug!("Showing slide {} of {}", index + 1, self.total());
    }

    /// Advance one slide. No-op on the last slide.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.go_to(self.current + 1);
        true
    }

    /// Go back one slide. No-op on the first slide.
    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.go_to(self.current - 1);
        true
    }

    pub fn jump_to(&mut self, index: usize) -> Result<()> {
        if index >= self.total() {
            return Err(LessonError::SlideOutOfRange {
                index,
                total: self.total(),
            });
        }
        self.go_to(index);
        Ok(())
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        let moved = match key {
            Key::ArrowRight | Key::ArrowDown | Key::PageDown | Key::Space => self.next(),
            Key::ArrowLeft | Key::ArrowUp | Key::PageUp => self.previous(),
            Key::Escape => return KeyOutcome::Exit,
            Key::Other(_) => return KeyOutcome::Ignored,
        };
        if moved {
            KeyOutcome::Moved(self.current)
        } else {
            KeyOutcome::Unchanged
        }
    }
}
