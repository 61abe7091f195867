// ABOUTME: Slide model for the darsy application
// ABOUTME: Derives the ordered presentation slide sequence from a lesson

use crate::lesson::{Language, Lesson, Section};

/// One renderable unit of presentation mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Slide {
    Title {
        title: String,
        emoji: String,
        teacher_info: Option<String>,
    },
    Introduction {
        text: String,
    },
    Section {
        section: Section,
        /// 0-based position within the lesson's sections.
        index: usize,
    },
    FunFact {
        text: String,
    },
    Objectives {
        items: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideKind {
    Title,
    Introduction,
    Section,
    FunFact,
    Objectives,
}

impl Slide {
    pub fn kind(&self) -> SlideKind {
        match self {
            Slide::Title { .. } => SlideKind::Title,
            Slide::Introduction { .. } => SlideKind::Introduction,
            Slide::Section { .. } => SlideKind::Section,
            Slide::FunFact { .. } => SlideKind::FunFact,
            Slide::Objectives { .. } => SlideKind::Objectives,
        }
    }

    /// Heading shown at the top of the slide, localized where it is a fixed label.
    pub fn heading(&self, language: Language) -> String {
        match self {
            Slide::Title { title, .. } => title.clone(),
            Slide::Introduction { .. } => language.introduction_label().to_string(),
            Slide::Section { section, index } => format!("{}. {}", index + 1, section.heading),
            Slide::FunFact { .. } => language.fun_fact_label().to_string(),
            Slide::Objectives { .. } => language.objectives_label().to_string(),
        }
    }
}

/// Build the slide sequence for a lesson.
///
/// Order is fixed: title, introduction, every section in lesson order, then the
/// fun fact and the objectives when the lesson has them.
pub fn build_slides(lesson: &Lesson) -> Vec<Slide> {
    let mut slides = Vec::with_capacity(lesson.sections.len() + 4);

    slides.push(Slide::Title {
        title: lesson.title.clone(),
        emoji: lesson.emoji.clone(),
        teacher_info: lesson.teacher_info_line(),
    });
    slides.push(Slide::Introduction {
        text: lesson.introduction.clone(),
    });

    slides.extend(
        lesson
            .sections
            .iter()
            .enumerate()
            .map(|(index, section)| Slide::Section {
                section: section.clone(),
                index,
            }),
    );

    if let Some(text) = lesson.fun_fact() {
        slides.push(Slide::FunFact {
            text: text.to_string(),
        });
    }

    let items = lesson.objective_items();
    if !items.is_empty() {
        slides.push(Slide::Objectives { items });
    }

    slides
}
