// ABOUTME: HTML generation module for the darsy application
// ABOUTME: Builds printable lesson documents and quiz certificates

use crate::errors::{LessonError, Result};
use crate::lesson::Lesson;
use crate::quiz::Certificate;
use crate::utils;
use comrak::{markdown_to_html, ComrakOptions};
use log::info;
use quick_xml::escape::escape;
use std::fs;
use std::path::Path;

const DOCUMENT_CSS: &str = r#"
body { font-family: "Tajawal", "Segoe UI", Arial, sans-serif; color: #333; margin: 0; padding: 2rem; }
header { text-align: center; margin-bottom: 2rem; }
header .emoji { font-size: 4rem; }
header h1 { color: #7209B7; margin: 0.5rem 0; }
header .info { color: #666; }
section { margin-bottom: 2rem; page-break-inside: avoid; }
section h2 { color: #4CC9F0; }
section img { max-width: 100%; max-height: 60vh; display: block; margin: 1rem auto; }
.fun-fact { background: #FFFBEB; border: 2px solid #FCD34D; border-radius: 1rem; padding: 1rem 1.5rem; }
.fun-fact h2 { color: #D97706; }
.objectives { background: #F5F3FF; border-radius: 1rem; padding: 1rem 1.5rem; }
@media print {
  body { padding: 0; }
  .page-break { page-break-before: always; }
}
"#;

const CERTIFICATE_CSS: &str = r#"
@page { size: A4 landscape; margin: 0; }
body { font-family: "Tajawal", "Segoe UI", Arial, sans-serif; margin: 0; }
.certificate { box-sizing: border-box; width: 297mm; height: 210mm; padding: 20mm; border: 12px double #7209B7; text-align: center; background: #FFFDF5; }
.certificate h1 { color: #7209B7; font-size: 3rem; margin-bottom: 0.5rem; }
.certificate .name { color: #F72585; font-size: 2.5rem; font-weight: bold; margin: 1rem 0; }
.certificate .lesson { font-size: 1.5rem; }
.certificate .score { font-size: 1.75rem; color: #4CC9F0; margin-top: 1rem; }
.certificate .stars { font-size: 2.5rem; }
.certificate .date { color: #666; margin-top: 2rem; }
"#;

/// Render lesson markdown without passing raw HTML through.
fn render_markdown(markdown: &str) -> String {
    let options = ComrakOptions::default();
    markdown_to_html(markdown, &options)
}

fn document_head(title: &str, css: &str) -> String {
    let mut head = String::from("<head>\n<meta charset=\"UTF-8\">\n");
    head.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    head.push_str(&format!("<title>{}</title>\n", escape(title)));
    head.push_str(&format!("<style>{}</style>\n", css));
    head.push_str("</head>\n");
    head
}

/// Generate a printable HTML document for a lesson
pub fn generate_lesson_html(lesson: &Lesson) -> Result<String> {
    info!("Generating printable document for lesson {:?}", lesson.title);
    lesson.validate()?;

    let language = lesson.language;
    let mut html_doc = format!(
        "<!DOCTYPE html>\n<html lang=\"{}\" dir=\"{}\">\n",
        language.code(),
        language.direction()
    );
    html_doc.push_str(&document_head(&lesson.title, DOCUMENT_CSS));
    html_doc.push_str("<body>\n<header>\n");

    if !lesson.emoji.trim().is_empty() {
        html_doc.push_str(&format!("<div class=\"emoji\">{}</div>\n", escape(lesson.emoji.as_str())));
    }
    html_doc.push_str(&format!("<h1>{}</h1>\n", escape(lesson.title.as_str())));
    if let Some(info) = lesson.teacher_info_line() {
        html_doc.push_str(&format!("<p class=\"info\">{}</p>\n", escape(info.as_str())));
    }
    html_doc.push_str("</header>\n");

    if !lesson.introduction.trim().is_empty() {
        html_doc.push_str("<section class=\"introduction\">\n");
        html_doc.push_str(&format!("<h2>{}</h2>\n", language.introduction_label()));
        html_doc.push_str(&render_markdown(&lesson.introduction));
        html_doc.push_str("</section>\n");
    }

    for (index, section) in lesson.sections.iter().enumerate() {
        html_doc.push_str("<section>\n");
        html_doc.push_str(&format!(
            "<h2>{}. {}</h2>\n",
            index + 1,
            escape(section.heading.as_str())
        ));
        if let Some(url) = &section.image_url {
            let alt = section.visual_description.as_deref().unwrap_or(&section.heading);
            html_doc.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\">\n",
                escape(url.as_str()),
                escape(alt)
            ));
        }
        html_doc.push_str(&render_markdown(&section.content));
        html_doc.push_str("</section>\n");
    }

    if let Some(fun_fact) = lesson.fun_fact() {
        html_doc.push_str("<section class=\"fun-fact\">\n");
        html_doc.push_str(&format!("<h2>{}</h2>\n", language.fun_fact_label()));
        html_doc.push_str(&format!("<p>{}</p>\n", escape(fun_fact)));
        html_doc.push_str("</section>\n");
    }

    let objectives = lesson.objective_items();
    if !objectives.is_empty() {
        html_doc.push_str("<section class=\"objectives page-break\">\n");
        html_doc.push_str(&format!("<h2>{}</h2>\n<ul>\n", language.objectives_label()));
        for item in &objectives {
            html_doc.push_str(&format!("<li>{}</li>\n", escape(item.as_str())));
        }
        html_doc.push_str("</ul>\n</section>\n");
    }

    html_doc.push_str("</body>\n</html>");
    Ok(html_doc)
}

/// Generate a landscape certificate page for a finished quiz
pub fn generate_certificate_html(certificate: &Certificate) -> Result<String> {
    info!(
        "Generating certificate for {:?}",
        certificate.student_name
    );
    if certificate.student_name.trim().is_empty() {
        return Err(LessonError::ValidationError(
            "Certificate needs a student name".to_string(),
        ));
    }
    if certificate.score > certificate.total {
        return Err(LessonError::ValidationError(format!(
            "Score {} is higher than the total {}",
            certificate.score, certificate.total
        )));
    }

    let language = certificate.language;
    let labels = certificate.labels();

    let mut html_doc = format!(
        "<!DOCTYPE html>\n<html lang=\"{}\" dir=\"{}\">\n",
        language.code(),
        language.direction()
    );
    html_doc.push_str(&document_head(labels.heading, CERTIFICATE_CSS));
    html_doc.push_str("<body>\n<div class=\"certificate\" id=\"certificate-area\">\n");
    html_doc.push_str(&format!("<h1>{}</h1>\n", labels.heading));
    html_doc.push_str(&format!("<p>{}</p>\n", labels.awarded_to));
    html_doc.push_str(&format!(
        "<div class=\"name\">{}</div>\n",
        escape(certificate.student_name.as_str())
    ));
    html_doc.push_str(&format!(
        "<p class=\"lesson\">{} <strong>{}</strong></p>\n",
        labels.for_lesson,
        escape(certificate.lesson_title.as_str())
    ));
    html_doc.push_str(&format!(
        "<p class=\"score\">{}: {} / {}</p>\n",
        labels.score, certificate.score, certificate.total
    ));
    html_doc.push_str(&format!(
        "<div class=\"stars\">{}</div>\n",
        "⭐".repeat(certificate.stars() as usize)
    ));
    html_doc.push_str(&format!(
        "<p class=\"date\">{}</p>\n",
        escape(certificate.date.as_str())
    ));
    html_doc.push_str("</div>\n</body>\n</html>");
    Ok(html_doc)
}

/// Utility function to write HTML content to a file
pub fn write_html_to_file(html_content: &str, output_path: &Path) -> Result<()> {
    info!("Writing HTML to file: {:?}", output_path);
    utils::prepare_output(output_path)?;
    fs::write(output_path, html_content).map_err(LessonError::FileReadError)?;
    Ok(())
}
