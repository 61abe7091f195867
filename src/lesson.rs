// ABOUTME: Lesson data model for the darsy application
// ABOUTME: Lessons, sections, quiz questions, saved lessons and localized labels

use crate::errors::{LessonError, Result};
use serde::{Deserialize, Serialize};

/// Lesson language. Affects text direction and labels only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ar,
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Ar => "ar",
            Language::En => "en",
        }
    }

    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Ar)
    }

    /// Value for the HTML `dir` attribute.
    pub fn direction(self) -> &'static str {
        if self.is_rtl() {
            "rtl"
        } else {
            "ltr"
        }
    }

    pub fn teacher_label(self) -> &'static str {
        match self {
            Language::Ar => "المعلم/ة",
            Language::En => "Teacher",
        }
    }

    pub fn class_label(self) -> &'static str {
        match self {
            Language::Ar => "الصف",
            Language::En => "Class",
        }
    }

    pub fn introduction_label(self) -> &'static str {
        match self {
            Language::Ar => "مقدمة",
            Language::En => "Introduction",
        }
    }

    pub fn fun_fact_label(self) -> &'static str {
        match self {
            Language::Ar => "هل تعلم؟ 💡",
            Language::En => "Fun Fact 💡",
        }
    }

    pub fn objectives_label(self) -> &'static str {
        match self {
            Language::Ar => "أهداف الدرس 🎯",
            Language::En => "Learning Objectives 🎯",
        }
    }

    /// "Slide N of total", with a 1-based `position`.
    pub fn slide_counter(self, position: usize, total: usize) -> String {
        match self {
            Language::Ar => format!("شريحة {} من {}", position, total),
            Language::En => format!("Slide {} of {}", position, total),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    #[default]
    General,
    Math,
    Reading,
}

/// What the lesson form collects before calling the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRequest {
    pub topic: String,
    #[serde(default)]
    pub subject: Subject,
    pub age_group: String,
    pub tone: String,
    /// Uploaded reference image as a `data:` URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub teacher_name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub language: Language,
}

impl LessonRequest {
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            subject: Subject::General,
            age_group: "6-8".to_string(),
            tone: "fun".to_string(),
            image: None,
            teacher_name: String::new(),
            class_name: String::new(),
            language: Language::Ar,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(LessonError::ValidationError(
                "Lesson topic must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn topic_label(&self) -> &'static str {
        match (self.subject, self.language) {
            (Subject::Math, Language::Ar) => "المفهوم الرياضي",
            (Subject::Math, Language::En) => "Math Concept",
            (Subject::Reading, Language::Ar) => "مهارة القراءة أو الحرف",
            (Subject::Reading, Language::En) => "Reading Skill / Letter",
            (Subject::General, Language::Ar) => "عنوان الدرس أو الموضوع",
            (Subject::General, Language::En) => "Lesson Topic",
        }
    }

    pub fn topic_placeholder(&self) -> &'static str {
        match (self.subject, self.language) {
            (Subject::Math, Language::Ar) => "مثال: جدول الضرب 5، الأشكال الهندسية، الجمع البسيط...",
            (Subject::Math, Language::En) => "Ex: Multiplication table, Shapes, Addition...",
            (Subject::Reading, Language::Ar) => {
                "مثال: حرف الألف، اللام الشمسية، قراءة كلمات ثلاثية..."
            }
            (Subject::Reading, Language::En) => "Ex: Letter A, Phonics, Sight words...",
            (Subject::General, Language::Ar) => "مثال: المجموعة الشمسية، حياة النحل، الألوان...",
            (Subject::General, Language::En) => "Ex: Solar System, Bees, Colors...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub heading: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Section {
    pub fn new(heading: &str, content: &str) -> Self {
        Self {
            heading: heading.to_string(),
            content: content.to_string(),
            visual_description: None,
            image_url: None,
        }
    }
}

/// Structured lesson content as returned by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub title: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fun_fact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_approved: Option<bool>,
    /// Markdown bullet points, one objective per line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectives: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    #[serde(default)]
    pub language: Language,
}

impl Lesson {
    pub fn new(title: &str, language: Language) -> Self {
        Self {
            title: title.to_string(),
            emoji: String::new(),
            introduction: String::new(),
            sections: Vec::new(),
            fun_fact: None,
            teacher_name: None,
            class_name: None,
            is_approved: None,
            objectives: None,
            review_notes: None,
            language,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(LessonError::ValidationError(
                "Lesson title must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Fun fact text, treating blank text as absent.
    pub fn fun_fact(&self) -> Option<&str> {
        non_blank(self.fun_fact.as_deref())
    }

    pub fn teacher_name(&self) -> Option<&str> {
        non_blank(self.teacher_name.as_deref())
    }

    pub fn class_name(&self) -> Option<&str> {
        non_blank(self.class_name.as_deref())
    }

    /// Objectives split into bullet items with list markers removed.
    pub fn objective_items(&self) -> Vec<String> {
        self.objectives
            .as_deref()
            .map(|text| {
                text.lines()
                    .map(strip_bullet)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// "Teacher: X | Class: Y" in the lesson language, if either is set.
    pub fn teacher_info_line(&self) -> Option<String> {
        let parts: Vec<String> = [
            self.teacher_name()
                .map(|name| format!("{}: {}", self.language.teacher_label(), name)),
            self.class_name()
                .map(|name| format!("{}: {}", self.language.class_label(), name)),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" | "))
        }
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim();
    for marker in ["- ", "* ", "• ", "•"] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return rest.trim();
        }
    }

    // Numbered items: "1." or "1)"
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim();
        }
    }
    trimmed
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    pub fn validate(&self) -> Result<()> {
        if self.options.is_empty() {
            return Err(LessonError::ValidationError(format!(
                "Question has no options: {}",
                self.question
            )));
        }
        if self.correct_answer_index >= self.options.len() {
            return Err(LessonError::ValidationError(format!(
                "Correct answer index {} out of range for {} options",
                self.correct_answer_index,
                self.options.len()
            )));
        }
        Ok(())
    }
}

/// A lesson stored in the local library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLesson {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub date: i64,
    pub data: Lesson,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_preview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub emoji: String,
    pub score: u32,
}
