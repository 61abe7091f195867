// ABOUTME: Quiz session for the darsy application
// ABOUTME: Individual and team quiz play, scoring, rankings, certificates and share links

use crate::errors::{LessonError, Result};
use crate::lesson::{Language, QuizQuestion, Team};
use crate::utils;
use log::{debug, info};

/// Emoji handed out to teams in order of creation.
pub const TEAM_EMOJIS: [&str; 8] = ["🦋", "⭐️", "🍎", "🚀", "🌈", "💡", "👑", "☀️"];
pub const MIN_TEAMS: usize = 2;
pub const MAX_TEAMS: usize = 4;

/// Teams being set up before a team quiz starts.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRoster {
    teams: Vec<Team>,
    next_id: u32,
    language: Language,
}

impl TeamRoster {
    /// Roster with the two default teams.
    pub fn new(language: Language) -> Self {
        let (first, second) = match language {
            Language::Ar => ("فريق الفراشات", "فريق النجوم"),
            Language::En => ("Butterflies Team", "Stars Team"),
        };
        Self {
            teams: vec![
                Team {
                    id: 1,
                    name: first.to_string(),
                    emoji: TEAM_EMOJIS[0].to_string(),
                    score: 0,
                },
                Team {
                    id: 2,
                    name: second.to_string(),
                    emoji: TEAM_EMOJIS[1].to_string(),
                    score: 0,
                },
            ],
            next_id: 3,
            language,
        }
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn add_team(&mut self) -> Result<&Team> {
        if self.teams.len() >= MAX_TEAMS {
            return Err(LessonError::ValidationError(format!(
                "A quiz can have at most {} teams",
                MAX_TEAMS
            )));
        }
        let number = self.teams.len() + 1;
        let name = match self.language {
            Language::Ar => format!("الفريق {}", number),
            Language::En => format!("Team {}", number),
        };
        self.teams.push(Team {
            id: self.next_id,
            name,
            emoji: TEAM_EMOJIS[self.teams.len() % TEAM_EMOJIS.len()].to_string(),
            score: 0,
        });
        self.next_id += 1;
        Ok(&self.teams[self.teams.len() - 1])
    }

    pub fn remove_team(&mut self, id: u32) -> Result<()> {
        if self.teams.len() <= MIN_TEAMS {
            return Err(LessonError::ValidationError(format!(
                "A quiz needs at least {} teams",
                MIN_TEAMS
            )));
        }
        let before = self.teams.len();
        self.teams.retain(|team| team.id != id);
        if self.teams.len() == before {
            return Err(LessonError::ValidationError(format!("No team with id {}", id)));
        }
        Ok(())
    }

    pub fn rename(&mut self, id: u32, name: &str) -> Result<()> {
        let team = self
            .teams
            .iter_mut()
            .find(|team| team.id == id)
            .ok_or_else(|| LessonError::ValidationError(format!("No team with id {}", id)))?;
        team.name = name.to_string();
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.teams.iter().any(|team| team.name.trim().is_empty()) {
            return Err(LessonError::ValidationError(
                "Every team needs a name".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Players {
    Individual { student_name: String, score: u32 },
    Teams { teams: Vec<Team>, turn: usize },
}

/// Feedback after choosing an option.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_index: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizProgress {
    /// Moved on to the question with this index.
    Question(usize),
    Finished,
}

/// A quiz being played, one question at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    lesson_title: String,
    language: Language,
    players: Players,
    current: usize,
    selected: Option<usize>,
    finished: bool,
}

impl QuizSession {
    pub fn individual(
        questions: Vec<QuizQuestion>,
        lesson_title: &str,
        language: Language,
        student_name: &str,
    ) -> Result<Self> {
        if student_name.trim().is_empty() {
            return Err(LessonError::ValidationError(
                "Student name must not be empty".to_string(),
            ));
        }
        Self::start(
            questions,
            lesson_title,
            language,
            Players::Individual {
                student_name: student_name.trim().to_string(),
                score: 0,
            },
        )
    }

    pub fn team(
        questions: Vec<QuizQuestion>,
        lesson_title: &str,
        language: Language,
        roster: TeamRoster,
    ) -> Result<Self> {
        roster.validate()?;
        Self::start(
            questions,
            lesson_title,
            language,
            Players::Teams {
                teams: roster.teams,
                turn: 0,
            },
        )
    }

    fn start(
        questions: Vec<QuizQuestion>,
        lesson_title: &str,
        language: Language,
        players: Players,
    ) -> Result<Self> {
        if questions.is_empty() {
            return Err(LessonError::ValidationError(
                "A quiz needs at least one question".to_string(),
            ));
        }
        for question in &questions {
            question.validate()?;
        }
        info!("Starting quiz with {} questions", questions.len());
        Ok(Self {
            questions,
            lesson_title: lesson_title.to_string(),
            language,
            players,
            current: 0,
            selected: None,
            finished: false,
        })
    }

    pub fn current_question(&self) -> &QuizQuestion {
        &self.questions[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn selected_option(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_answered(&self) -> bool {
        self.selected.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Team whose turn it is, in team mode.
    pub fn current_team(&self) -> Option<&Team> {
        match &self.players {
            Players::Teams { teams, turn } => teams.get(*turn),
            Players::Individual { .. } => None,
        }
    }

    /// Individual score; in team mode the sum of all team scores.
    pub fn score(&self) -> u32 {
        match &self.players {
            Players::Individual { score, .. } => *score,
            Players::Teams { teams, .. } => teams.iter().map(|team| team.score).sum(),
        }
    }

    pub fn student_name(&self) -> Option<&str> {
        match &self.players {
            Players::Individual { student_name, .. } => Some(student_name),
            Players::Teams { .. } => None,
        }
    }

    /// Choose an option for the current question. Returns `None` if the
    /// question was already answered.
    pub fn answer(&mut self, option: usize) -> Result<Option<AnswerOutcome>> {
        if self.finished || self.is_answered() {
            return Ok(None);
        }
        let question = &self.questions[self.current];
        if option >= question.options.len() {
            return Err(LessonError::ValidationError(format!(
                "Option {} does not exist ({} options)",
                option,
                question.options.len()
            )));
        }

        let correct = option == question.correct_answer_index;
        let outcome = AnswerOutcome {
            correct,
            correct_index: question.correct_answer_index,
            explanation: question.explanation.clone(),
        };
        self.selected = Some(option);

        if correct {
            match &mut self.players {
                Players::Individual { score, .. } => *score += 1,
                Players::Teams { teams, turn } => {
                    teams[*turn].score += 1;
                    debug!("Team {} scored", teams[*turn].name);
                }
            }
        }
        Ok(Some(outcome))
    }

    /// Move to the next question, or finish after the last one.
    pub fn next(&mut self) -> Result<QuizProgress> {
        if self.finished {
            return Ok(QuizProgress::Finished);
        }
        if !self.is_answered() {
            return Err(LessonError::ValidationError(
                "Answer the current question first".to_string(),
            ));
        }
        if self.current + 1 >= self.questions.len() {
            self.finished = true;
            info!("Quiz finished with score {}", self.score());
            return Ok(QuizProgress::Finished);
        }

        self.current += 1;
        self.selected = None;
        if let Players::Teams { teams, turn } = &mut self.players {
            *turn = (*turn + 1) % teams.len();
        }
        Ok(QuizProgress::Question(self.current))
    }

    /// Teams ordered by score, highest first. Ties keep roster order.
    pub fn team_ranking(&self) -> Vec<Team> {
        match &self.players {
            Players::Teams { teams, .. } => {
                let mut ranking = teams.clone();
                ranking.sort_by(|a, b| b.score.cmp(&a.score));
                ranking
            }
            Players::Individual { .. } => Vec::new(),
        }
    }

    pub fn winner(&self) -> Option<Team> {
        self.team_ranking().into_iter().next()
    }

    /// Certificate for a finished individual quiz.
    pub fn certificate(&self, date: &str) -> Result<Certificate> {
        let Players::Individual {
            student_name,
            score,
        } = &self.players
        else {
            return Err(LessonError::ValidationError(
                "Certificates are only issued in individual mode".to_string(),
            ));
        };
        if !self.finished {
            return Err(LessonError::ValidationError(
                "The quiz is not finished yet".to_string(),
            ));
        }
        Ok(Certificate {
            student_name: student_name.clone(),
            lesson_title: self.lesson_title.clone(),
            score: *score,
            total: self.questions.len() as u32,
            date: date.to_string(),
            language: self.language,
        })
    }
}

/// Fixed wording on a certificate, per language.
pub struct CertificateLabels {
    pub heading: &'static str,
    pub awarded_to: &'static str,
    pub for_lesson: &'static str,
    pub score: &'static str,
}

/// Certificate of achievement for one student.
#[derive(Debug, Clone, PartialEq)]
pub struct Certificate {
    pub student_name: String,
    pub lesson_title: String,
    pub score: u32,
    pub total: u32,
    pub date: String,
    pub language: Language,
}

impl Certificate {
    pub fn labels(&self) -> CertificateLabels {
        match self.language {
            Language::Ar => CertificateLabels {
                heading: "شهادة شكر وتقدير",
                awarded_to: "تُمنح هذه الشهادة للبطل/ة",
                for_lesson: "لإتمام درس",
                score: "النتيجة",
            },
            Language::En => CertificateLabels {
                heading: "Certificate of Achievement",
                awarded_to: "This certificate is proudly awarded to",
                for_lesson: "for completing the lesson",
                score: "Score",
            },
        }
    }

    /// Zero to three stars, rounded from the score ratio. Scores above the
    /// total count as full marks.
    pub fn stars(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let total = u64::from(self.total);
        let score = u64::from(self.score.min(self.total));
        ((score * 6 + total) / (total * 2)) as u32
    }

    pub fn file_name(&self) -> String {
        let name = utils::file_stem_for(&self.student_name);
        match self.language {
            Language::Ar => format!("شهادة_{}.pdf", name),
            Language::En => format!("certificate_{}.pdf", name),
        }
    }

    fn share_message(&self) -> String {
        match self.language {
            Language::Ar => format!(
                "السلام عليكم،\nأشارككم إنجاز البطل/ة: {}\nفي درس: {}\nحيث حصل/ت على شهادة شكر وتقدير بنتيجة: {} من {} 🌟\n\n- منصة ديم التعليمية",
                self.student_name, self.lesson_title, self.score, self.total
            ),
            Language::En => format!(
                "Hello,\nSharing the achievement of our hero: {}\nin the lesson: {}\nwho earned a certificate with a score of {} out of {} 🌟",
                self.student_name, self.lesson_title, self.score, self.total
            ),
        }
    }

    pub fn whatsapp_url(&self) -> String {
        format!("https://wa.me/?text={}", encode_component(&self.share_message()))
    }

    pub fn mailto_url(&self) -> String {
        let (subject, body) = match self.language {
            Language::Ar => (
                format!("نتيجة الطالب: {} - درس {}", self.student_name, self.lesson_title),
                format!(
                    "السلام عليكم،\n\nأشارككم إنجاز البطل/ة: {}\nفي درس: {}\nالنتيجة: {} من {}\n\nيرجى الاطلاع على النتيجة.\n\nشكراً لكم.",
                    self.student_name, self.lesson_title, self.score, self.total
                ),
            ),
            Language::En => (
                format!("Student result: {} - {}", self.student_name, self.lesson_title),
                format!(
                    "Hello,\n\nSharing the achievement of: {}\nLesson: {}\nScore: {} out of {}\n\nThank you.",
                    self.student_name, self.lesson_title, self.score, self.total
                ),
            ),
        };
        format!(
            "mailto:?subject={}&body={}",
            encode_component(&subject),
            encode_component(&body)
        )
    }
}

/// Percent-encode a URL component, with spaces as `%20`.
fn encode_component(text: &str) -> String {
    // form_urlencoded emits a literal '+' only for spaces
    url::form_urlencoded::byte_serialize(text.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
