// ABOUTME: Generative-language API client for the darsy application
// ABOUTME: Builds lesson and quiz prompts, calls the API and parses structured replies

use crate::errors::{LessonError, Result};
use crate::lesson::{Language, Lesson, LessonRequest, QuizQuestion, Subject};
use crate::resources::decode_data_url;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, error, info};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Source of generated lessons and quizzes.
pub trait LessonGenerator {
    fn generate_lesson(&self, request: &LessonRequest) -> Result<Lesson>;
    fn generate_quiz(&self, lesson: &Lesson) -> Result<Vec<QuizQuestion>>;
}

/// Configuration for the generative API client
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout_ms: u64,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    config: GeneratorConfig,
}

impl GeminiClient {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| LessonError::ConfigError("GEMINI_API_KEY is not set".to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Send one prompt and return the text of the first candidate.
    fn generate(&self, parts: Vec<Part>) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content { role: "user", parts }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.8,
            },
        };

        info!("Calling generative API model {}", self.config.model);
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            error!("Generative API returned {}: {}", status, detail);
            return Err(LessonError::UpstreamError(format!(
                "HTTP {}: {}",
                status,
                detail.chars().take(200).collect::<String>()
            )));
        }

        let reply: GenerateResponse = response.json()?;
        let text: String = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LessonError::UpstreamError(
                "Empty response from generative API".to_string(),
            ));
        }
        debug!("Generative API replied with {} characters", text.len());
        Ok(text)
    }
}

impl LessonGenerator for GeminiClient {
    fn generate_lesson(&self, request: &LessonRequest) -> Result<Lesson> {
        request.validate()?;
        let mut parts = vec![Part {
            text: Some(lesson_prompt(request)),
            inline_data: None,
        }];

        if let Some(image) = &request.image {
            let (mime_type, data) = decode_data_url(image)?;
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type,
                    data: STANDARD.encode(data),
                }),
            });
        }

        let text = self.generate(parts)?;
        parse_lesson_payload(&text, request)
    }

    fn generate_quiz(&self, lesson: &Lesson) -> Result<Vec<QuizQuestion>> {
        let text = self.generate(vec![Part {
            text: Some(quiz_prompt(lesson)),
            inline_data: None,
        }])?;
        parse_quiz_payload(&text)
    }
}

fn language_name(language: Language) -> &'static str {
    match language {
        Language::Ar => "Arabic",
        Language::En => "English",
    }
}

/// Instructional prompt for a lesson request.
pub fn lesson_prompt(request: &LessonRequest) -> String {
    let focus = match request.subject {
        Subject::General => "a general knowledge lesson",
        Subject::Math => "a math lesson that explains the concept step by step with simple worked examples",
        Subject::Reading => "a reading and phonics lesson with example words and short sentences to read aloud",
    };
    let mut prompt = format!(
        "You are a creative primary school teacher. Write {focus} about \"{topic}\" for children aged {age}. \
Use a {tone} tone. Write everything in {language}.\n",
        focus = focus,
        topic = request.topic.trim(),
        age = request.age_group,
        tone = request.tone,
        language = language_name(request.language),
    );
    if request.image.is_some() {
        prompt.push_str("Use the attached image as inspiration for the lesson.\n");
    }
    prompt.push_str(
        "Reply with JSON only, using this shape:\n\
{\"title\": string, \"emoji\": string (one emoji), \"introduction\": string, \
\"sections\": [{\"heading\": string, \"content\": string, \"visualDescription\": string}] (3 to 5 sections), \
\"funFact\": string, \"objectives\": string (markdown bullet list, one objective per line)}\n",
    );
    prompt
}

/// Instructional prompt for a quiz about a lesson.
pub fn quiz_prompt(lesson: &Lesson) -> String {
    let mut material = format!("{}\n{}\n", lesson.title, lesson.introduction);
    for section in &lesson.sections {
        material.push_str(&format!("{}: {}\n", section.heading, section.content));
    }
    format!(
        "Write 5 multiple choice questions for children about the following lesson, in {language}. \
Each question has 4 options and exactly one correct answer, plus a short encouraging explanation.\n\
Reply with JSON only: an array of {{\"question\": string, \"options\": [string], \
\"correctAnswerIndex\": number, \"explanation\": string}}.\n\nLesson:\n{material}",
        language = language_name(lesson.language),
        material = material
    )
}

/// Remove a surrounding markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse a lesson reply and stamp it with the request's teacher, class and language.
pub fn parse_lesson_payload(text: &str, request: &LessonRequest) -> Result<Lesson> {
    let mut lesson: Lesson = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| LessonError::MalformedResponse(format!("lesson: {}", e)))?;

    lesson.language = request.language;
    if !request.teacher_name.trim().is_empty() {
        lesson.teacher_name = Some(request.teacher_name.trim().to_string());
    }
    if !request.class_name.trim().is_empty() {
        lesson.class_name = Some(request.class_name.trim().to_string());
    }
    lesson
        .validate()
        .map_err(|e| LessonError::MalformedResponse(e.to_string()))?;
    Ok(lesson)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuizPayload {
    List(Vec<QuizQuestion>),
    Wrapped { questions: Vec<QuizQuestion> },
}

/// Parse a quiz reply: either a bare array or `{"questions": [...]}`.
pub fn parse_quiz_payload(text: &str) -> Result<Vec<QuizQuestion>> {
    let payload: QuizPayload = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| LessonError::MalformedResponse(format!("quiz: {}", e)))?;
    let questions = match payload {
        QuizPayload::List(questions) | QuizPayload::Wrapped { questions } => questions,
    };

    if questions.is_empty() {
        return Err(LessonError::MalformedResponse(
            "quiz has no questions".to_string(),
        ));
    }
    for question in &questions {
        question
            .validate()
            .map_err(|e| LessonError::MalformedResponse(e.to_string()))?;
    }
    Ok(questions)
}
