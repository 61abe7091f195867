use darsy::{export_pptx, Language, Lesson, PptxConfig, Section};
use image::{ImageBuffer, Rgb};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;
use zip::ZipArchive;

fn run_command(args: &[&str]) -> Output {
    Command::new("cargo")
        .arg("run")
        .arg("--")
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn sample_lesson(language: Language) -> Lesson {
    let mut lesson = Lesson::new("Bees & <Flowers>", language);
    lesson.emoji = "🐝".to_string();
    lesson.introduction = "Bees visit flowers every day.".to_string();
    lesson.sections = vec![
        Section::new("Pollen", "Bees carry pollen from flower to flower."),
        Section::new("Honey", "Bees turn nectar into honey."),
        Section::new("The Hive", "Thousands of bees live together."),
    ];
    lesson.fun_fact = Some("Bees dance to share directions.".to_string());
    lesson.objectives = Some("- Explain pollination\n- Describe a hive".to_string());
    lesson.teacher_name = Some("Ms. Sarah".to_string());
    lesson
}

fn archive_entries(path: &Path) -> Vec<String> {
    let file = fs::File::open(path).expect("Failed to open PPTX file");
    let mut archive = ZipArchive::new(file).expect("Failed to read PPTX as ZIP");
    (0..archive.len())
        .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
        .collect()
}

fn read_entry(path: &Path, name: &str) -> String {
    let file = fs::File::open(path).expect("Failed to open PPTX file");
    let mut archive = ZipArchive::new(file).expect("Failed to read PPTX as ZIP");
    let mut entry = archive.by_name(name).expect("Missing archive entry");
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .expect("Failed to read archive entry");
    content
}

fn slide_files(entries: &[String]) -> Vec<&String> {
    entries
        .iter()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .collect()
}

#[test]
fn test_export_pptx_has_one_slide_per_lesson_slide() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output_path = temp_dir.path().join("lesson.pptx");

    export_pptx(&sample_lesson(Language::En), &output_path, &PptxConfig::default())
        .expect("PPTX export failed");

    assert!(output_path.exists(), "PPTX file was not created");
    let entries = archive_entries(&output_path);

    // title + introduction + 3 sections + fun fact + objectives
    assert_eq!(slide_files(&entries).len(), 7, "Expected seven slide XML files");
    for required in [
        "[Content_Types].xml",
        "_rels/.rels",
        "docProps/app.xml",
        "docProps/core.xml",
        "ppt/presentation.xml",
        "ppt/_rels/presentation.xml.rels",
        "ppt/slideMasters/slideMaster1.xml",
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        "ppt/slideLayouts/slideLayout1.xml",
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        "ppt/theme/theme1.xml",
    ] {
        assert!(entries.contains(&required.to_string()), "Missing {}", required);
    }

    // Every slide is tied to the layout
    for n in 1..=7 {
        let rels = read_entry(&output_path, &format!("ppt/slides/_rels/slide{}.xml.rels", n));
        assert!(rels.contains("../slideLayouts/slideLayout1.xml"), "slide {} has no layout", n);
    }

    let presentation = read_entry(&output_path, "ppt/presentation.xml");
    assert!(presentation.contains(r#"<p:sldMasterId id="2147483648" r:id="rId8"/>"#));
    let presentation_rels = read_entry(&output_path, "ppt/_rels/presentation.xml.rels");
    assert!(presentation_rels.contains(r#"Id="rId8""#));
    assert!(presentation_rels.contains("slideMasters/slideMaster1.xml"));
    assert!(presentation_rels.contains("theme/theme1.xml"));

    let content_types = read_entry(&output_path, "[Content_Types].xml");
    assert!(content_types.contains("/ppt/slideLayouts/slideLayout1.xml"));
    assert!(content_types.contains("presentationml.slideMaster+xml"));
}

#[test]
fn test_export_pptx_escapes_text() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output_path = temp_dir.path().join("lesson.pptx");

    export_pptx(&sample_lesson(Language::En), &output_path, &PptxConfig::default())
        .expect("PPTX export failed");

    let title_slide = read_entry(&output_path, "ppt/slides/slide1.xml");
    assert!(title_slide.contains("Bees &amp; &lt;Flowers&gt;"));
    assert!(!title_slide.contains("<Flowers>"));

    let core = read_entry(&output_path, "docProps/core.xml");
    assert!(core.contains("Ms. Sarah"));

    let section_slide = read_entry(&output_path, "ppt/slides/slide3.xml");
    assert!(section_slide.contains("1. Pollen"));
}

#[test]
fn test_export_pptx_marks_arabic_as_rtl() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let arabic_path = temp_dir.path().join("ar.pptx");
    let english_path = temp_dir.path().join("en.pptx");

    export_pptx(&sample_lesson(Language::Ar), &arabic_path, &PptxConfig::default())
        .expect("PPTX export failed");
    export_pptx(&sample_lesson(Language::En), &english_path, &PptxConfig::default())
        .expect("PPTX export failed");

    let presentation = read_entry(&arabic_path, "ppt/presentation.xml");
    assert!(presentation.contains(r#"rtl="1""#));
    let slide = read_entry(&arabic_path, "ppt/slides/slide2.xml");
    assert!(slide.contains(r#"rtl="1""#));
    assert!(slide.contains("مقدمة"));

    let presentation = read_entry(&english_path, "ppt/presentation.xml");
    assert!(!presentation.contains(r#"rtl="1""#));
}

#[test]
fn test_export_pptx_skips_optional_slides() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output_path = temp_dir.path().join("lesson.pptx");

    let mut lesson = sample_lesson(Language::En);
    lesson.fun_fact = None;
    lesson.objectives = None;
    export_pptx(&lesson, &output_path, &PptxConfig::default()).expect("PPTX export failed");

    let entries = archive_entries(&output_path);
    assert_eq!(slide_files(&entries).len(), 5);
}

#[test]
fn test_export_pptx_embeds_section_images() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let image_path = temp_dir.path().join("hive.png");
    let img = ImageBuffer::from_fn(40, 20, |_, _| Rgb([255u8, 200u8, 0u8]));
    img.save(&image_path).expect("Failed to save image");

    let mut lesson = sample_lesson(Language::En);
    lesson.sections[0].image_url = Some(image_path.to_string_lossy().to_string());
    lesson.sections[1].image_url = Some(temp_dir.path().join("missing.png").to_string_lossy().to_string());

    let output_path = temp_dir.path().join("lesson.pptx");
    export_pptx(&lesson, &output_path, &PptxConfig::default()).expect("PPTX export failed");

    let entries = archive_entries(&output_path);
    assert!(entries.contains(&"ppt/media/image3.png".to_string()));
    assert!(entries.contains(&"ppt/slides/_rels/slide3.xml.rels".to_string()));
    // A broken image reference is skipped, not fatal
    assert!(!entries.iter().any(|name| name.starts_with("ppt/media/image4")));

    let slide = read_entry(&output_path, "ppt/slides/slide3.xml");
    assert!(slide.contains(r#"r:embed="rId2""#));
    let rels = read_entry(&output_path, "ppt/slides/_rels/slide3.xml.rels");
    assert!(rels.contains(r#"Id="rId1""#) && rels.contains("../slideLayouts/slideLayout1.xml"));
    assert!(rels.contains(r#"Id="rId2""#) && rels.contains("../media/image3.png"));
}

#[test]
fn test_export_pptx_rejects_untitled_lesson() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output_path = temp_dir.path().join("lesson.pptx");

    let lesson = Lesson::new("  ", Language::En);
    assert!(export_pptx(&lesson, &output_path, &PptxConfig::default()).is_err());
    assert!(!output_path.exists());
}

#[test]
fn test_export_pptx_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let lesson_path = temp_dir.path().join("lesson.json");
    fs::write(
        &lesson_path,
        serde_json::to_string(&sample_lesson(Language::Ar)).expect("Failed to serialize lesson"),
    )
    .expect("Failed to write lesson");

    let output_path = temp_dir.path().join("out").join("lesson.pptx");

    let output = run_command(&[
        "export-pptx",
        "-l",
        lesson_path.to_str().unwrap(),
        "-o",
        output_path.to_str().unwrap(),
        "--aspect-ratio",
        "4:3",
    ]);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(output_path.exists(), "PPTX file was not created");

    let presentation = read_entry(&output_path, "ppt/presentation.xml");
    assert!(presentation.contains("6858000"), "Expected 4:3 slide size");
}
