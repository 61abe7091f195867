// ABOUTME: Application controller for the darsy application
// ABOUTME: Screen state, single-flight request guard, autosave and saved-lesson flows

use crate::annotation::SurfaceBounds;
use crate::errors::{LessonError, Result};
use crate::generator::LessonGenerator;
use crate::lesson::{Language, Lesson, LessonRequest, QuizQuestion, SavedLesson};
use crate::presenter::Presentation;
use crate::store::{KeyValueStore, LessonLibrary};
use log::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Idle,
    GeneratingLesson,
    LessonView,
    GeneratingQuiz,
    QuizView,
    SavedLessonsList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Lesson,
    Quiz,
}

/// Handle for an outstanding generative request. A result is applied only if
/// its ticket is still the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    id: u64,
    kind: RequestKind,
}

impl RequestTicket {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

/// Owns all view state: the current screen, lesson, quiz and error message.
pub struct App<S: KeyValueStore> {
    state: AppState,
    lesson: Option<Lesson>,
    quiz: Option<Vec<QuizQuestion>>,
    uploaded_image: Option<String>,
    error: Option<String>,
    autosaved: Option<Lesson>,
    library: LessonLibrary<S>,
    pending: Option<RequestTicket>,
    next_ticket: u64,
    language: Language,
}

impl<S: KeyValueStore> App<S> {
    /// Start the app, offering to restore an autosaved lesson if one exists.
    pub fn new(store: S) -> Self {
        let library = LessonLibrary::new(store);
        let autosaved = match library.load_autosave() {
            Ok(lesson) => lesson,
            Err(e) => {
                warn!("Failed to read autosaved lesson: {}", e);
                None
            }
        };
        if autosaved.is_some() {
            info!("Found an autosaved lesson");
        }

        Self {
            state: AppState::Idle,
            lesson: None,
            quiz: None,
            uploaded_image: None,
            error: None,
            autosaved,
            library,
            pending: None,
            next_ticket: 1,
            language: Language::Ar,
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn lesson(&self) -> Option<&Lesson> {
        self.lesson.as_ref()
    }

    pub fn quiz(&self) -> Option<&[QuizQuestion]> {
        self.quiz.as_deref()
    }

    pub fn uploaded_image(&self) -> Option<&str> {
        self.uploaded_image.as_deref()
    }

    /// Localized message for the last failed action.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn autosaved_lesson(&self) -> Option<&Lesson> {
        self.autosaved.as_ref()
    }

    pub fn library(&self) -> &LessonLibrary<S> {
        &self.library
    }

    /// Whether the triggering control should be disabled.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    fn language(&self) -> Language {
        self.lesson
            .as_ref()
            .map(|lesson| lesson.language)
            .unwrap_or(self.language)
    }

    fn report(&mut self, context: &str, err: &LessonError) {
        let language = self.language();
        self.report_in(context, err, language);
    }

    fn report_in(&mut self, context: &str, err: &LessonError, language: Language) {
        error!("{}: {}", context, err);
        self.error = Some(err.user_message(language));
    }

    fn issue_ticket(&mut self, kind: RequestKind) -> Result<RequestTicket> {
        if let Some(pending) = self.pending {
            let what = match pending.kind {
                RequestKind::Lesson => "lesson",
                RequestKind::Quiz => "quiz",
            };
            return Err(LessonError::Busy(what.to_string()));
        }
        let ticket = RequestTicket {
            id: self.next_ticket,
            kind,
        };
        self.next_ticket += 1;
        self.pending = Some(ticket);
        Ok(ticket)
    }

    /// Take the pending slot if `ticket` still owns it.
    fn settle(&mut self, ticket: RequestTicket) -> bool {
        if self.pending == Some(ticket) {
            self.pending = None;
            true
        } else {
            debug!("Discarding result of stale {:?} request {}", ticket.kind, ticket.id);
            false
        }
    }

    pub fn restore_autosave(&mut self) -> bool {
        match self.autosaved.take() {
            Some(lesson) => {
                info!("Restoring autosaved lesson {:?}", lesson.title);
                self.lesson = Some(lesson);
                self.state = AppState::LessonView;
                true
            }
            None => false,
        }
    }

    pub fn discard_autosave(&mut self) {
        self.autosaved = None;
        if let Err(e) = self.library.discard_autosave() {
            self.report("Failed to discard autosave", &e);
        }
    }

    pub fn begin_lesson(&mut self, request: &LessonRequest) -> Result<RequestTicket> {
        request.validate()?;
        let ticket = self.issue_ticket(RequestKind::Lesson)?;
        self.language = request.language;
        self.state = AppState::GeneratingLesson;
        self.error = None;
        self.uploaded_image = request.image.clone();
        info!("Generating lesson about {:?}", request.topic);
        Ok(ticket)
    }

    /// Apply a generated lesson. Returns whether the result was applied.
    pub fn complete_lesson(&mut self, ticket: RequestTicket, result: Result<Lesson>) -> bool {
        if !self.settle(ticket) {
            return false;
        }
        match result {
            Ok(lesson) => {
                self.lesson = Some(lesson);
                self.state = AppState::LessonView;
                self.autosave();
            }
            Err(e) => {
                // The request's language, not the lesson still on screen
                self.report_in("Lesson generation failed", &e, self.language);
                self.state = AppState::Idle;
            }
        }
        true
    }

    pub fn create_lesson<G: LessonGenerator + ?Sized>(
        &mut self,
        request: &LessonRequest,
        generator: &G,
    ) -> Result<()> {
        let ticket = self.begin_lesson(request)?;
        let result = generator.generate_lesson(request);
        self.complete_lesson(ticket, result);
        Ok(())
    }

    pub fn begin_quiz(&mut self) -> Result<RequestTicket> {
        if self.lesson.is_none() {
            return Err(LessonError::ValidationError(
                "No lesson to build a quiz from".to_string(),
            ));
        }
        let ticket = self.issue_ticket(RequestKind::Quiz)?;
        self.state = AppState::GeneratingQuiz;
        self.error = None;
        Ok(ticket)
    }

    /// Apply generated quiz questions. Returns whether the result was applied.
    pub fn complete_quiz(&mut self, ticket: RequestTicket, result: Result<Vec<QuizQuestion>>) -> bool {
        if !self.settle(ticket) {
            return false;
        }
        match result {
            Ok(questions) => {
                self.quiz = Some(questions);
                self.state = AppState::QuizView;
            }
            Err(e) => {
                self.report("Quiz generation failed", &e);
                self.state = AppState::LessonView;
            }
        }
        true
    }

    pub fn start_quiz<G: LessonGenerator + ?Sized>(&mut self, generator: &G) -> Result<()> {
        let ticket = self.begin_quiz()?;
        let result = match &self.lesson {
            Some(lesson) => generator.generate_quiz(lesson),
            None => return Ok(()),
        };
        self.complete_quiz(ticket, result);
        Ok(())
    }

    /// Replace the lesson after an edit and autosave it.
    pub fn update_lesson(&mut self, lesson: Lesson) {
        self.lesson = Some(lesson);
        self.autosave();
    }

    fn autosave(&mut self) {
        let result = match &self.lesson {
            Some(lesson) => self.library.autosave(lesson),
            None => return,
        };
        if let Err(e) = result {
            self.report("Autosave failed", &e);
        }
    }

    /// Store the current lesson in the library.
    pub fn save_lesson(&mut self) -> Option<SavedLesson> {
        let lesson = self.lesson.clone()?;
        match self.library.save(&lesson, self.uploaded_image.clone()) {
            Ok(saved) => Some(saved),
            Err(e) => {
                self.report("Saving lesson failed", &e);
                None
            }
        }
    }

    pub fn open_saved_lessons(&mut self) -> Vec<SavedLesson> {
        self.pending = None;
        self.state = AppState::SavedLessonsList;
        self.error = None;
        match self.library.list() {
            Ok(lessons) => lessons,
            Err(e) => {
                self.report("Failed to load saved lessons", &e);
                Vec::new()
            }
        }
    }

    pub fn select_saved_lesson(&mut self, id: &str) -> bool {
        match self.library.find(id) {
            Ok(Some(saved)) => {
                self.lesson = Some(saved.data);
                self.uploaded_image = saved.image_preview;
                self.state = AppState::LessonView;
                true
            }
            Ok(None) => {
                warn!("No saved lesson with id {}", id);
                false
            }
            Err(e) => {
                self.report("Failed to load saved lesson", &e);
                false
            }
        }
    }

    pub fn delete_saved_lesson(&mut self, id: &str) -> bool {
        match self.library.delete(id) {
            Ok(deleted) => deleted,
            Err(e) => {
                self.report("Failed to delete saved lesson", &e);
                false
            }
        }
    }

    /// Back to the start screen. Outstanding requests are detached and the
    /// autosave is cleared.
    pub fn reset(&mut self) {
        self.state = AppState::Idle;
        self.lesson = None;
        self.quiz = None;
        self.uploaded_image = None;
        self.error = None;
        self.pending = None;
        if let Err(e) = self.library.discard_autosave() {
            self.report("Failed to clear autosave", &e);
        }
    }

    /// Presentation mode for the current lesson.
    pub fn presentation(&self, bounds: SurfaceBounds) -> Option<Presentation> {
        self.lesson
            .as_ref()
            .map(|lesson| Presentation::new(lesson, bounds))
    }
}
