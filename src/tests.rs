use super::*;
use crate::errors::ErrorCategory;
use crate::generator::{lesson_prompt, parse_lesson_payload, parse_quiz_payload, quiz_prompt};
use crate::resources::decode_data_url;
use crate::utils::file_stem_for;

fn sample_lesson() -> Lesson {
    let mut lesson = Lesson::new("The Solar System", Language::En);
    lesson.emoji = "🪐".to_string();
    lesson.introduction = "Let's explore space!".to_string();
    lesson.sections = vec![
        Section::new("The Sun", "A star at the centre."),
        Section::new("The Planets", "Eight planets orbit the Sun."),
    ];
    lesson
}

#[test]
fn test_objective_items_strip_bullets() {
    let mut lesson = sample_lesson();
    lesson.objectives = Some("- Name the planets\n* Describe the Sun\n\n• Compare sizes\n2) Draw an orbit\n3. Ask questions".to_string());

    assert_eq!(
        lesson.objective_items(),
        vec![
            "Name the planets",
            "Describe the Sun",
            "Compare sizes",
            "Draw an orbit",
            "Ask questions"
        ]
    );
}

#[test]
fn test_blank_optional_text_counts_as_absent() {
    let mut lesson = sample_lesson();
    lesson.fun_fact = Some("   ".to_string());
    lesson.objectives = Some("\n  \n".to_string());
    lesson.teacher_name = Some(" ".to_string());

    assert_eq!(lesson.fun_fact(), None);
    assert!(lesson.objective_items().is_empty());
    assert_eq!(lesson.teacher_info_line(), None);
}

#[test]
fn test_teacher_info_line_is_localized() {
    let mut lesson = sample_lesson();
    lesson.teacher_name = Some("Ms. Sarah".to_string());
    lesson.class_name = Some("1st Grade".to_string());
    assert_eq!(
        lesson.teacher_info_line().as_deref(),
        Some("Teacher: Ms. Sarah | Class: 1st Grade")
    );

    lesson.language = Language::Ar;
    lesson.teacher_name = None;
    assert_eq!(lesson.teacher_info_line().as_deref(), Some("الصف: 1st Grade"));
}

#[test]
fn test_lesson_json_uses_camel_case() {
    let json = r#"{
        "title": "Bees",
        "emoji": "🐝",
        "introduction": "Buzz!",
        "sections": [{"heading": "Hives", "content": "Bees live in hives.", "imageUrl": "hive.png"}],
        "funFact": "Bees dance.",
        "language": "en"
    }"#;
    let lesson: Lesson = serde_json::from_str(json).expect("lesson should parse");

    assert_eq!(lesson.sections[0].image_url.as_deref(), Some("hive.png"));
    assert_eq!(lesson.fun_fact(), Some("Bees dance."));
    assert_eq!(lesson.language, Language::En);
    assert!(lesson.objectives.is_none());
}

#[test]
fn test_language_direction_and_counter() {
    assert_eq!(Language::Ar.direction(), "rtl");
    assert_eq!(Language::En.direction(), "ltr");
    assert_eq!(Language::En.slide_counter(2, 5), "Slide 2 of 5");
    assert_eq!(Language::Ar.slide_counter(2, 5), "شريحة 2 من 5");
}

#[test]
fn test_request_validation_and_labels() {
    let mut request = LessonRequest::new("  ");
    assert!(request.validate().is_err());

    request.topic = "Shapes".to_string();
    request.subject = Subject::Math;
    request.language = Language::En;
    assert!(request.validate().is_ok());
    assert_eq!(request.topic_label(), "Math Concept");
}

#[test]
fn test_quiz_question_validation() {
    let question = QuizQuestion {
        question: "2 + 2?".to_string(),
        options: vec!["3".to_string(), "4".to_string()],
        correct_answer_index: 2,
        explanation: String::new(),
    };
    assert!(question.validate().is_err());
}

#[test]
fn test_slide_headings() {
    let slides = build_slides(&sample_lesson());
    assert_eq!(slides[0].heading(Language::En), "The Solar System");
    assert_eq!(slides[1].heading(Language::Ar), "مقدمة");
    assert_eq!(slides[3].heading(Language::En), "2. The Planets");
}

#[test]
fn test_parse_hex_color() {
    assert_eq!(parse_hex_color("#4CC9F0").unwrap(), Color::rgb(0x4C, 0xC9, 0xF0));
    assert_eq!(parse_hex_color("ff000080").unwrap().a, 0x80);
    assert!(parse_hex_color("#12345").is_err());
    assert!(parse_hex_color("#GGGGGG").is_err());
    assert_eq!(Color::rgb(1, 2, 3).to_string(), "#010203");
}

#[test]
fn test_color_serializes_as_hex() {
    let json = serde_json::to_string(&Color::rgb(0xEF, 0x44, 0x44)).unwrap();
    assert_eq!(json, "\"#EF4444\"");
    let color: Color = serde_json::from_str("\"#00ff00\"").unwrap();
    assert_eq!(color, Color::rgb(0, 255, 0));
}

#[test]
fn test_stroke_radius_follows_pressure() {
    let options = StrokeOptions::for_tool(Tool::Pen);
    assert!(options.radius(1.0) > options.radius(0.5));
    assert!(options.radius(0.5) > options.radius(0.0));
    assert_eq!(options.radius(0.5), 3.0);
    assert!(StrokeOptions::for_tool(Tool::Eraser).radius(0.5) > options.radius(0.5) * 4.0);
}

#[test]
fn test_single_point_outline_is_round_dot() {
    let options = StrokeOptions::for_tool(Tool::Pen);
    let outline = stroke_outline(&[StrokePoint::new(10.0, 10.0, 0.5)], &options);

    assert_eq!(outline.len(), 16);
    for (x, y) in outline {
        let distance = ((x - 10.0).powi(2) + (y - 10.0).powi(2)).sqrt();
        assert!((distance - 3.0).abs() < 1e-3);
    }
}

#[test]
fn test_outline_is_deterministic_and_bounded() {
    let points: Vec<StrokePoint> = (0..20)
        .map(|i| StrokePoint::new(10.0 + i as f32 * 4.0, 30.0 + (i % 3) as f32, 0.5))
        .collect();
    let options = StrokeOptions::for_tool(Tool::Pen);

    let first = stroke_outline(&points, &options);
    let second = stroke_outline(&points, &options);
    assert_eq!(first, second);
    assert!(first.len() > 4);

    let max_radius = options.radius(1.0);
    for (x, y) in &first {
        assert!(*x >= 10.0 - max_radius - 0.01 && *x <= 86.0 + max_radius + 0.01);
        assert!(*y >= 30.0 - max_radius - 0.01 && *y <= 32.0 + max_radius + 0.01);
    }
}

#[test]
fn test_empty_outline() {
    assert!(stroke_outline(&[], &StrokeOptions::for_tool(Tool::Pen)).is_empty());
}

#[test]
fn test_eraser_stroke_uses_placeholder_color() {
    let stroke = Stroke::begin(
        Tool::Eraser,
        Color::rgb(10, 200, 30),
        StrokePoint::new(0.0, 0.0, 0.5),
    );
    assert_eq!(stroke.color, crate::stroke::ERASER_PLACEHOLDER_COLOR);
}

#[test]
fn test_fill_polygon_square() {
    let mut surface = Surface::new(10, 10);
    let square = [(2.0, 2.0), (6.0, 2.0), (6.0, 6.0), (2.0, 6.0)];
    surface.fill_polygon(&square, Color::rgb(255, 0, 0), CompositeMode::SourceOver);

    assert_eq!(surface.painted_pixels(), 16);
    assert_eq!(surface.pixel(2, 2).unwrap().0, [255, 0, 0, 255]);
    assert_eq!(surface.pixel(6, 6).unwrap().0, [0, 0, 0, 0]);

    surface.fill_polygon(&square, Color::rgb(0, 0, 0), CompositeMode::DestinationOut);
    assert_eq!(surface.painted_pixels(), 0);
}

#[test]
fn test_fill_polygon_clips_to_surface() {
    let mut surface = Surface::new(4, 4);
    let big = [(-10.0, -10.0), (20.0, -10.0), (20.0, 20.0), (-10.0, 20.0)];
    surface.fill_polygon(&big, Color::rgb(0, 0, 255), CompositeMode::SourceOver);
    assert_eq!(surface.painted_pixels(), 16);
}

#[test]
fn test_translucent_paint_blends() {
    let mut surface = Surface::new(2, 2);
    let all = [(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)];
    surface.fill_polygon(&all, Color::rgb(255, 255, 255), CompositeMode::SourceOver);
    surface.fill_polygon(
        &all,
        Color { r: 0, g: 0, b: 0, a: 128 },
        CompositeMode::SourceOver,
    );
    let pixel = surface.pixel(0, 0).unwrap();
    assert_eq!(pixel[3], 255);
    assert!(pixel[0] > 120 && pixel[0] < 135);
}

#[test]
fn test_error_categories_and_messages() {
    let upstream = LessonError::UpstreamError("boom".to_string());
    assert_eq!(upstream.category(), ErrorCategory::Upstream);
    assert_eq!(
        upstream.user_message(Language::En),
        "Could not reach the lesson generator. Please try again."
    );

    let export = LessonError::ExportUnavailable("no browser".to_string());
    assert_eq!(export.category(), ErrorCategory::Export);

    let persistence = LessonError::PersistenceError("disk full".to_string());
    assert_eq!(persistence.category(), ErrorCategory::Persistence);
    assert_eq!(persistence.user_message(Language::Ar), "تعذر حفظ البيانات أو قراءتها.");
}

#[test]
fn test_input_errors_are_localized() {
    let err = decode_data_url("data:image/png;base64,@@@").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Input);
    assert_eq!(err.user_message(Language::Ar), "يرجى التحقق من المدخلات والمحاولة مرة أخرى.");
    assert_eq!(err.user_message(Language::En), "Please check your input and try again.");
    assert!(!err.user_message(Language::Ar).contains("base64"));
}

#[test]
fn test_anyhow_errors_convert() {
    let err: LessonError = anyhow::anyhow!("Failed to write output file: disk full").into();
    assert!(matches!(err, LessonError::UnknownError(_)));
    assert_eq!(err.to_string(), "Unknown error: Failed to write output file: disk full");
}

#[test]
fn test_config_defaults() {
    let config = Config::new();
    assert_eq!(config.model, "gemini-2.5-flash");
    assert!(config.api_key.is_none());

    let pptx = config.get_pptx_config(None);
    assert_eq!(pptx.aspect_ratio, "16:9");

    let print = config.get_print_config(true);
    assert!(print.landscape);

    let generator = config.get_generator_config(Some("other-model".to_string()));
    assert_eq!(generator.model, "other-model");
}

#[test]
fn test_gemini_client_requires_api_key() {
    let config = Config::new().get_generator_config(None);
    let err = GeminiClient::new(config).err().expect("missing key should fail");
    assert_eq!(err.category(), ErrorCategory::Upstream);
}

#[test]
fn test_parse_lesson_payload_with_code_fence() {
    let mut request = LessonRequest::new("Bees");
    request.teacher_name = "Ms. Sarah".to_string();
    request.language = Language::En;

    let text = "```json\n{\"title\": \"Bees\", \"emoji\": \"🐝\", \"introduction\": \"Buzz\", \"sections\": [], \"funFact\": \"Bees dance\"}\n```";
    let lesson = parse_lesson_payload(text, &request).expect("payload should parse");

    assert_eq!(lesson.title, "Bees");
    assert_eq!(lesson.teacher_name.as_deref(), Some("Ms. Sarah"));
    assert_eq!(lesson.class_name, None);
    assert_eq!(lesson.language, Language::En);
}

#[test]
fn test_parse_lesson_payload_rejects_garbage() {
    let request = LessonRequest::new("Bees");
    let err = parse_lesson_payload("not json", &request).unwrap_err();
    assert!(matches!(err, LessonError::MalformedResponse(_)));

    let err = parse_lesson_payload("{\"title\": \"  \"}", &request).unwrap_err();
    assert!(matches!(err, LessonError::MalformedResponse(_)));
}

#[test]
fn test_parse_quiz_payload_shapes() {
    let bare = r#"[{"question": "Q", "options": ["a", "b"], "correctAnswerIndex": 1, "explanation": "b"}]"#;
    assert_eq!(parse_quiz_payload(bare).unwrap().len(), 1);

    let wrapped = r#"{"questions": [{"question": "Q", "options": ["a"], "correctAnswerIndex": 0}]}"#;
    assert_eq!(parse_quiz_payload(wrapped).unwrap()[0].options, vec!["a"]);

    assert!(parse_quiz_payload("[]").is_err());
    let invalid = r#"[{"question": "Q", "options": ["a"], "correctAnswerIndex": 3}]"#;
    assert!(parse_quiz_payload(invalid).is_err());
}

#[test]
fn test_prompts_mention_request_details() {
    let mut request = LessonRequest::new("Fractions");
    request.subject = Subject::Math;
    request.age_group = "9-11".to_string();
    request.language = Language::Ar;

    let prompt = lesson_prompt(&request);
    assert!(prompt.contains("Fractions"));
    assert!(prompt.contains("9-11"));
    assert!(prompt.contains("Arabic"));
    assert!(prompt.contains("math lesson"));

    let prompt = quiz_prompt(&sample_lesson());
    assert!(prompt.contains("The Planets: Eight planets orbit the Sun."));
    assert!(prompt.contains("correctAnswerIndex"));
}

#[test]
fn test_decode_data_url() {
    let (mime, data) = decode_data_url("data:image/png;base64,aGVsbG8=").unwrap();
    assert_eq!(mime, "image/png");
    assert_eq!(data, b"hello");

    assert!(decode_data_url("data:text/plain,hello").is_err());
    assert!(decode_data_url("hello.png").is_err());
}

#[test]
fn test_image_resource_source() {
    use crate::resources::ImageSource;
    assert_eq!(ImageResource::new("https://example.com/a.png").source, ImageSource::Remote);
    assert_eq!(ImageResource::new("data:image/png;base64,AA==").source, ImageSource::Inline);
    assert_eq!(ImageResource::new("images/a.png").source, ImageSource::Local);
}

#[test]
fn test_file_stem_for() {
    assert_eq!(file_stem_for("Sara  Ali"), "Sara_Ali");
    assert_eq!(file_stem_for("a/b: c?"), "ab_c");
    assert_eq!(file_stem_for("   "), "lesson");
    assert_eq!(file_stem_for("درس النحل"), "درس_النحل");
}

#[test]
fn test_prepare_output_creates_parent() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let output = temp_dir.path().join("nested").join("deck").join("lesson.pptx");

    crate::utils::prepare_output(&output).unwrap();
    assert!(output.parent().unwrap().is_dir());
    assert!(!output.exists());

    // A bare file name has no parent to create
    assert!(crate::utils::prepare_output(std::path::Path::new("lesson.pptx")).is_ok());
}

#[test]
fn test_require_file_and_file_url() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let page = temp_dir.path().join("lesson page.html");

    assert!(matches!(
        crate::utils::require_file(&page),
        Err(LessonError::PathNotFoundError(_))
    ));
    std::fs::write(&page, "<html></html>").unwrap();
    crate::utils::require_file(&page).unwrap();
    assert!(matches!(
        crate::utils::require_file(temp_dir.path()),
        Err(LessonError::ValidationError(_))
    ));

    let url = crate::utils::file_url(&page).unwrap();
    assert!(url.starts_with("file:///"));
    assert!(url.ends_with("/lesson%20page.html"));
}
