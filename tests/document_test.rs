use darsy::{
    export_document, generate_certificate_html, generate_lesson_html, Certificate, ExportOutcome,
    Language, Lesson, PrintConfig, Section,
};
use std::fs;
use tempfile::TempDir;

fn lesson(language: Language) -> Lesson {
    let mut lesson = Lesson::new("Shapes & Colors", language);
    lesson.emoji = "🔺".to_string();
    lesson.introduction = "Shapes are **everywhere**.".to_string();
    let mut triangle = Section::new("Triangles", "A triangle has *three* sides.\n\n<script>alert(1)</script>");
    triangle.image_url = Some("https://example.com/triangle.png".to_string());
    triangle.visual_description = Some("A red triangle".to_string());
    lesson.sections = vec![triangle, Section::new("Circles", "Circles are round.")];
    lesson.fun_fact = Some("Honeycombs are hexagons.".to_string());
    lesson.objectives = Some("- Name shapes\n- Count sides".to_string());
    lesson.class_name = Some("Grade 1".to_string());
    lesson
}

fn certificate(language: Language) -> Certificate {
    Certificate {
        student_name: "Omar".to_string(),
        lesson_title: "Shapes".to_string(),
        score: 4,
        total: 5,
        date: "2024-05-01".to_string(),
        language,
    }
}

#[test]
fn test_lesson_html_structure() {
    let html = generate_lesson_html(&lesson(Language::En)).expect("Failed to generate HTML");

    assert!(html.contains(r#"<html lang="en" dir="ltr">"#));
    assert!(html.contains("<h1>Shapes &amp; Colors</h1>"));
    assert!(html.contains("<p class=\"info\">Class: Grade 1</p>"));
    assert!(html.contains("<strong>everywhere</strong>"));
    assert!(html.contains("<h2>1. Triangles</h2>"));
    assert!(html.contains("<h2>2. Circles</h2>"));
    assert!(html.contains("<em>three</em>"));
    assert!(html.contains(r#"<img src="https://example.com/triangle.png" alt="A red triangle">"#));
    assert!(html.contains("Fun Fact 💡"));
    assert!(html.contains("<li>Name shapes</li>"));
    assert!(html.contains("<li>Count sides</li>"));
}

#[test]
fn test_lesson_html_drops_raw_html() {
    let html = generate_lesson_html(&lesson(Language::En)).expect("Failed to generate HTML");
    assert!(!html.contains("<script>"));
}

#[test]
fn test_arabic_lesson_html_is_rtl() {
    let mut lesson = lesson(Language::Ar);
    lesson.fun_fact = None;
    lesson.objectives = None;
    let html = generate_lesson_html(&lesson).expect("Failed to generate HTML");

    assert!(html.contains(r#"<html lang="ar" dir="rtl">"#));
    assert!(html.contains("مقدمة"));
    assert!(!html.contains("هل تعلم"));
    assert!(!html.contains("<ul>"));
}

#[test]
fn test_certificate_html() {
    let html = generate_certificate_html(&certificate(Language::En)).expect("Failed to generate HTML");

    assert!(html.contains(r#"id="certificate-area""#));
    assert!(html.contains("Certificate of Achievement"));
    assert!(html.contains("Omar"));
    assert!(html.contains("Score: 4 / 5"));
    assert!(html.contains("⭐⭐"));
    assert!(html.contains("2024-05-01"));

    let mut blank = certificate(Language::Ar);
    blank.student_name = " ".to_string();
    assert!(generate_certificate_html(&blank).is_err());

    let mut inflated = certificate(Language::En);
    inflated.score = 10;
    inflated.total = 3;
    assert!(generate_certificate_html(&inflated).is_err());
}

#[test]
fn test_export_document_falls_back_to_printable_html() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("docs").join("lesson.pdf");
    let config = PrintConfig {
        browser_path: Some(
            temp_dir
                .path()
                .join("no-such-browser")
                .to_string_lossy()
                .to_string(),
        ),
        ..PrintConfig::default()
    };

    let html = generate_lesson_html(&lesson(Language::En)).unwrap();
    let outcome = export_document(&html, &output, &config).expect("Export should fall back");

    let html_path = temp_dir.path().join("docs").join("lesson.html");
    assert_eq!(outcome, ExportOutcome::PrintableHtml(html_path.clone()));
    assert!(!output.exists());
    assert_eq!(fs::read_to_string(html_path).unwrap(), html);
}

#[test]
#[ignore] // requires a Chrome or Chromium installation
fn test_export_document_prints_pdf() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("certificate.pdf");
    let config = PrintConfig {
        landscape: true,
        ..PrintConfig::default()
    };

    let html = generate_certificate_html(&certificate(Language::Ar)).unwrap();
    let outcome = export_document(&html, &output, &config).expect("Export failed");

    assert_eq!(outcome, ExportOutcome::Pdf(output.clone()));
    let bytes = fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
