// ABOUTME: Main entry point for the darsy program.
// ABOUTME: Provides CLI interface and executes commands from the library.

use clap::{Args, Parser, Subcommand};
use darsy::{
    AnnotationLayer, App, AppState, Config, FileStore, GeminiClient, KeyValueStore, Language,
    Lesson, LessonLibrary, LessonRequest, MemoryStore, Subject, SurfaceBounds,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a lesson from a topic
    Generate(GenerateArgs),

    /// Generate quiz questions for a lesson
    Quiz(QuizArgs),

    /// List the presentation slides of a lesson
    Slides(LessonArg),

    /// Export a lesson as a PowerPoint deck
    ExportPptx(ExportPptxArgs),

    /// Export a lesson as a printable document (PDF, or HTML when no browser is available)
    ExportDoc(ExportDocArgs),

    /// Create a quiz certificate
    Certificate(CertificateArgs),

    /// Replay a saved annotation stroke log onto a PNG
    Annotate(AnnotateArgs),

    /// Manage saved lessons
    #[command(subcommand)]
    Library(LibraryCommand),
}

#[derive(Args)]
struct GenerateArgs {
    /// Lesson topic
    #[arg(short, long)]
    topic: String,

    /// Subject: general, math or reading
    #[arg(long, default_value = "general", value_parser = parse_subject)]
    subject: Subject,

    /// Age group of the pupils
    #[arg(long, default_value = "6-8")]
    age_group: String,

    /// Tone of the lesson, e.g. fun, adventurous, scientific
    #[arg(long, default_value = "fun")]
    tone: String,

    #[arg(long, default_value = "")]
    teacher: String,

    #[arg(long, default_value = "")]
    class: String,

    /// Lesson language: ar or en
    #[arg(short, long, default_value = "ar", value_parser = parse_language)]
    language: Language,

    /// Reference image to inspire the lesson
    #[arg(long)]
    image: Option<PathBuf>,

    /// Model override
    #[arg(long)]
    model: Option<String>,

    /// Path to write the lesson JSON
    #[arg(short, long)]
    output: PathBuf,

    /// Also save the lesson to the library
    #[arg(long)]
    save: bool,
}

#[derive(Args)]
struct QuizArgs {
    /// Path to the lesson JSON
    #[arg(short, long)]
    lesson: PathBuf,

    /// Path to write the quiz JSON
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct LessonArg {
    /// Path to the lesson JSON
    #[arg(short, long)]
    lesson: PathBuf,
}

#[derive(Args)]
struct ExportPptxArgs {
    #[arg(short, long)]
    lesson: PathBuf,

    #[arg(short, long)]
    output: PathBuf,

    /// Aspect ratio: 16:9 or 4:3
    #[arg(long)]
    aspect_ratio: Option<String>,
}

#[derive(Args)]
struct ExportDocArgs {
    #[arg(short, long)]
    lesson: PathBuf,

    /// Path of the PDF to write
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct CertificateArgs {
    #[arg(long)]
    student: String,

    #[arg(long)]
    lesson_title: String,

    #[arg(long)]
    score: u32,

    #[arg(long)]
    total: u32,

    #[arg(short, long, default_value = "ar", value_parser = parse_language)]
    language: Language,

    /// Directory to write the certificate into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Args)]
struct AnnotateArgs {
    /// Stroke log JSON
    #[arg(short, long)]
    strokes: PathBuf,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Resize the surface to WIDTHxHEIGHT before saving
    #[arg(long, value_parser = parse_size)]
    resize: Option<(u32, u32)>,

    /// PNG file to write
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Subcommand)]
enum LibraryCommand {
    /// List saved lessons
    List,

    /// Write a saved lesson's JSON
    Show {
        id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a saved lesson
    Delete { id: String },
}

fn parse_language(value: &str) -> Result<Language, String> {
    match value.to_lowercase().as_str() {
        "ar" => Ok(Language::Ar),
        "en" => Ok(Language::En),
        other => Err(format!("unsupported language '{}', use ar or en", other)),
    }
}

fn parse_subject(value: &str) -> Result<Subject, String> {
    match value.to_lowercase().as_str() {
        "general" => Ok(Subject::General),
        "math" => Ok(Subject::Math),
        "reading" => Ok(Subject::Reading),
        other => Err(format!("unsupported subject '{}'", other)),
    }
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let w = w.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let h = h.trim().parse::<u32>().map_err(|e| e.to_string())?;
    Ok((w, h))
}

fn read_lesson(path: &Path) -> darsy::Result<Lesson> {
    darsy::utils::require_file(path)?;
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_json<T: serde::Serialize>(value: &T, path: &Path) -> darsy::Result<()> {
    darsy::utils::prepare_output(path)?;
    fs::write(path, serde_json::to_string_pretty(value)?)
        .map_err(|e| anyhow::anyhow!("Failed to write output file {:?}: {}", path, e))?;
    Ok(())
}

/// Run one lesson generation. Only a failed generation is an error; a lesson
/// that could not be autosaved or stored is still written out.
fn generate_lesson<S: KeyValueStore>(
    mut app: App<S>,
    request: &LessonRequest,
    client: &GeminiClient,
    args: &GenerateArgs,
) -> darsy::Result<()> {
    app.create_lesson(request, client)?;

    let lesson = match (app.state(), app.lesson()) {
        (AppState::LessonView, Some(lesson)) => lesson.clone(),
        _ => {
            let message = app.error().unwrap_or("Lesson generation failed");
            return Err(darsy::LessonError::UpstreamError(message.to_string()));
        }
    };
    if let Some(message) = app.error() {
        eprintln!("Warning: {}", message);
    }

    write_json(&lesson, &args.output)?;
    println!("Lesson generated successfully: {:?}", args.output);

    if args.save {
        match app.save_lesson() {
            Some(saved) => println!("Saved to library as {}", saved.id),
            None => eprintln!("Warning: {}", app.error().unwrap_or("Lesson was not saved")),
        }
    }
    Ok(())
}

fn run(command: &Commands, config: &Config) -> darsy::Result<()> {
    match command {
        Commands::Generate(args) => {
            println!("Executing generate command...");
            let image = args
                .image
                .as_deref()
                .map(darsy::resources::encode_data_url)
                .transpose()?;
            let request = LessonRequest {
                topic: args.topic.clone(),
                subject: args.subject,
                age_group: args.age_group.clone(),
                tone: args.tone.clone(),
                image,
                teacher_name: args.teacher.clone(),
                class_name: args.class.clone(),
                language: args.language,
            };

            let client = GeminiClient::new(config.get_generator_config(args.model.clone()))?;
            match FileStore::open(&config.store_dir) {
                Ok(store) => generate_lesson(App::new(store), &request, &client, args),
                Err(e) => {
                    eprintln!("Warning: {}", e.user_message(request.language));
                    log::warn!("Lesson library unavailable, continuing without it: {}", e);
                    generate_lesson(App::new(MemoryStore::new()), &request, &client, args)
                }
            }
        }
        Commands::Quiz(args) => {
            println!("Executing quiz command...");
            let lesson = read_lesson(&args.lesson)?;
            let client = GeminiClient::new(config.get_generator_config(None))?;
            let questions = darsy::LessonGenerator::generate_quiz(&client, &lesson)?;
            write_json(&questions, &args.output)?;
            println!("{} questions written to {:?}", questions.len(), args.output);
            Ok(())
        }
        Commands::Slides(args) => {
            let lesson = read_lesson(&args.lesson)?;
            let slides = darsy::build_slides(&lesson);
            for (i, slide) in slides.iter().enumerate() {
                println!(
                    "{}: [{:?}] {}",
                    lesson.language.slide_counter(i + 1, slides.len()),
                    slide.kind(),
                    slide.heading(lesson.language)
                );
            }
            Ok(())
        }
        Commands::ExportPptx(args) => {
            println!("Executing export-pptx command...");
            let lesson = read_lesson(&args.lesson)?;
            let pptx_config = config.get_pptx_config(args.aspect_ratio.clone());
            darsy::export_pptx(&lesson, &args.output, &pptx_config)?;
            println!("PPTX generated successfully: {:?}", args.output);
            Ok(())
        }
        Commands::ExportDoc(args) => {
            println!("Executing export-doc command...");
            let lesson = read_lesson(&args.lesson)?;
            let html = darsy::generate_lesson_html(&lesson)?;
            match darsy::export_document(&html, &args.output, &config.get_print_config(false))? {
                darsy::ExportOutcome::Pdf(path) => println!("PDF generated successfully: {:?}", path),
                darsy::ExportOutcome::PrintableHtml(path) => println!(
                    "PDF export is unavailable; print this document from a browser instead: {:?}",
                    path
                ),
            }
            Ok(())
        }
        Commands::Certificate(args) => {
            println!("Executing certificate command...");
            let certificate = darsy::Certificate {
                student_name: args.student.clone(),
                lesson_title: args.lesson_title.clone(),
                score: args.score,
                total: args.total,
                date: chrono::Local::now().format("%Y-%m-%d").to_string(),
                language: args.language,
            };
            let html = darsy::generate_certificate_html(&certificate)?;
            let output = args.output_dir.join(certificate.file_name());
            match darsy::export_document(&html, &output, &config.get_print_config(true))? {
                darsy::ExportOutcome::Pdf(path) => println!("Certificate written to {:?}", path),
                darsy::ExportOutcome::PrintableHtml(path) => {
                    println!("Certificate written as printable HTML: {:?}", path)
                }
            }
            println!("Share on WhatsApp: {}", certificate.whatsapp_url());
            println!("Share by mail: {}", certificate.mailto_url());
            Ok(())
        }
        Commands::Annotate(args) => {
            println!("Executing annotate command...");
            darsy::utils::require_file(&args.strokes)?;
            let log = fs::read_to_string(&args.strokes)?;
            let mut layer = AnnotationLayer::new(SurfaceBounds::sized(args.width, args.height));
            layer.load_stroke_log(&log)?;
            if let Some((width, height)) = args.resize {
                layer.resize(SurfaceBounds::sized(width, height));
            }
            darsy::utils::prepare_output(&args.output)?;
            layer
                .surface()
                .save_png(&args.output)
                .map_err(|e| anyhow::anyhow!("Failed to write output file {:?}: {}", args.output, e))?;
            println!(
                "Rendered {} strokes to {:?}",
                layer.strokes().len(),
                args.output
            );
            Ok(())
        }
        Commands::Library(command) => {
            let mut library = LessonLibrary::new(FileStore::open(&config.store_dir)?);
            match command {
                LibraryCommand::List => {
                    let lessons = library.list()?;
                    if lessons.is_empty() {
                        println!("No saved lessons.");
                    }
                    for saved in lessons {
                        let date = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(saved.date)
                            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_default();
                        println!("{}  {}  {} {}", saved.id, date, saved.data.emoji, saved.data.title);
                    }
                }
                LibraryCommand::Show { id, output } => {
                    let saved = library.find(id)?.ok_or_else(|| {
                        darsy::LessonError::ValidationError(format!("No saved lesson with id {}", id))
                    })?;
                    match output {
                        Some(path) => {
                            write_json(&saved.data, path)?;
                            println!("Lesson written to {:?}", path);
                        }
                        None => println!("{}", serde_json::to_string_pretty(&saved.data)?),
                    }
                }
                LibraryCommand::Delete { id } => {
                    if library.delete(id)? {
                        println!("Deleted {}", id);
                    } else {
                        println!("No saved lesson with id {}", id);
                    }
                }
            }
            Ok(())
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let config = Config::from_env();

    let result = match &cli.command {
        Some(command) => run(command, &config),
        None => {
            println!("No command specified. Use --help for usage information.");
            Ok(())
        }
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
