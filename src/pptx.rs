// ABOUTME: PPTX export module for the darsy application
// ABOUTME: Writes a lesson's slide sequence as a PowerPoint presentation

use crate::errors::{LessonError, Result};
use crate::lesson::{Language, Lesson};
use crate::resources::ImageResource;
use crate::slides::{build_slides, Slide};
use crate::utils;
use image::{GenericImageView, ImageFormat, ImageOutputFormat};
use log::{debug, info, warn};
use quick_xml::escape::escape;
use std::fs;
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use std::time::Duration;
use zip::{write::FileOptions, ZipWriter};

const KID_BLUE: &str = "4CC9F0";
const KID_PURPLE: &str = "7209B7";
const TEXT_DARK: &str = "333333";
const TEXT_MUTED: &str = "666666";
const FUN_FACT_AMBER: &str = "D97706";

/// Configuration for PPTX generation
pub struct PptxConfig {
    pub aspect_ratio: String, // "16:9" or "4:3"
    /// Timeout for fetching remote section images.
    pub timeout_ms: u64,
}

impl Default for PptxConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: "16:9".to_string(),
            timeout_ms: 30000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn attr(self) -> &'static str {
        match self {
            Align::Left => "l",
            Align::Center => "ctr",
            Align::Right => "r",
        }
    }

    fn content(language: Language) -> Self {
        if language.is_rtl() {
            Align::Right
        } else {
            Align::Left
        }
    }
}

/// Placement as fractions of the slide size.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

const fn frame(x: f64, y: f64, w: f64, h: f64) -> Frame {
    Frame { x, y, w, h }
}

struct TextBox {
    frame: Frame,
    text: String,
    size_pt: u32,
    bold: bool,
    color: &'static str,
    align: Align,
    anchor_top: bool,
}

/// A section image ready to be embedded.
struct SlideImage {
    data: Vec<u8>,
    extension: &'static str,
    width: u32,
    height: u32,
}

/// Slide geometry in EMU plus the lesson language.
struct Canvas {
    cx: i64,
    cy: i64,
    language: Language,
}

impl Canvas {
    fn emu(&self, frame: Frame) -> (i64, i64, i64, i64) {
        (
            (frame.x * self.cx as f64) as i64,
            (frame.y * self.cy as f64) as i64,
            (frame.w * self.cx as f64) as i64,
            (frame.h * self.cy as f64) as i64,
        )
    }

    fn text_shape(&self, id: usize, text_box: &TextBox) -> String {
        let (x, y, w, h) = self.emu(text_box.frame);
        let lang = match self.language {
            Language::Ar => "ar-SA",
            Language::En => "en-US",
        };
        let rtl = if self.language.is_rtl() { 1 } else { 0 };

        let paragraphs: String = text_box
            .text
            .lines()
            .map(|line| {
                format!(
                    r#"<a:p><a:pPr algn="{align}" rtl="{rtl}"/><a:r><a:rPr lang="{lang}" sz="{size}" b="{bold}" dirty="0"><a:solidFill><a:srgbClr val="{color}"/></a:solidFill></a:rPr><a:t>{text}</a:t></a:r></a:p>"#,
                    align = text_box.align.attr(),
                    rtl = rtl,
                    lang = lang,
                    size = text_box.size_pt * 100,
                    bold = if text_box.bold { 1 } else { 0 },
                    color = text_box.color,
                    text = escape(line),
                )
            })
            .collect();
        let paragraphs = if paragraphs.is_empty() {
            "<a:p/>".to_string()
        } else {
            paragraphs
        };

        format!(
            r#"            <p:sp>
                <p:nvSpPr>
                    <p:cNvPr id="{id}" name="Text {id}"/>
                    <p:cNvSpPr txBox="1"/>
                    <p:nvPr/>
                </p:nvSpPr>
                <p:spPr>
                    <a:xfrm>
                        <a:off x="{x}" y="{y}"/>
                        <a:ext cx="{w}" cy="{h}"/>
                    </a:xfrm>
                    <a:prstGeom prst="rect">
                        <a:avLst/>
                    </a:prstGeom>
                    <a:noFill/>
                </p:spPr>
                <p:txBody>
                    <a:bodyPr wrap="square" anchor="{anchor}">
                        <a:normAutofit/>
                    </a:bodyPr>
                    <a:lstStyle/>
                    {paragraphs}
                </p:txBody>
            </p:sp>
"#,
            anchor = if text_box.anchor_top { "t" } else { "ctr" },
        )
    }

    /// Picture scaled to fit inside `frame` keeping its aspect ratio.
    fn picture_shape(&self, id: usize, frame: Frame, image: &SlideImage) -> String {
        let (bx, by, bw, bh) = self.emu(frame);
        let scale = (bw as f64 / image.width.max(1) as f64).min(bh as f64 / image.height.max(1) as f64);
        let w = (image.width as f64 * scale) as i64;
        let h = (image.height as f64 * scale) as i64;
        let x = bx + (bw - w) / 2;
        let y = by + (bh - h) / 2;

        format!(
            r#"            <p:pic>
                <p:nvPicPr>
                    <p:cNvPr id="{id}" name="Image {id}"/>
                    <p:cNvPicPr>
                        <a:picLocks noChangeAspect="1"/>
                    </p:cNvPicPr>
                    <p:nvPr/>
                </p:nvPicPr>
                <p:blipFill>
                    <a:blip r:embed="rId2"/>
                    <a:stretch>
                        <a:fillRect/>
                    </a:stretch>
                </p:blipFill>
                <p:spPr>
                    <a:xfrm>
                        <a:off x="{x}" y="{y}"/>
                        <a:ext cx="{w}" cy="{h}"/>
                    </a:xfrm>
                    <a:prstGeom prst="rect">
                        <a:avLst/>
                    </a:prstGeom>
                </p:spPr>
            </p:pic>
"#
        )
    }
}

fn slide_background(slide: &Slide) -> &'static str {
    match slide {
        Slide::Title { .. } => "F0F9FF",
        Slide::FunFact { .. } => "FFFBEB",
        Slide::Objectives { .. } => "F5F3FF",
        Slide::Introduction { .. } | Slide::Section { .. } => "FFFFFF",
    }
}

/// Text boxes for a slide, following the lesson's language for alignment.
fn slide_text_boxes(slide: &Slide, language: Language, has_image: bool) -> Vec<TextBox> {
    let content_align = Align::content(language);
    let heading = slide.heading(language);

    match slide {
        Slide::Title {
            title,
            emoji,
            teacher_info,
        } => {
            let mut boxes = vec![
                TextBox {
                    frame: frame(0.0, 0.15, 1.0, 0.18),
                    text: emoji.clone(),
                    size_pt: 60,
                    bold: false,
                    color: TEXT_DARK,
                    align: Align::Center,
                    anchor_top: false,
                },
                TextBox {
                    frame: frame(0.0, 0.35, 1.0, 0.15),
                    text: title.clone(),
                    size_pt: 44,
                    bold: true,
                    color: KID_PURPLE,
                    align: Align::Center,
                    anchor_top: false,
                },
            ];
            if let Some(info) = teacher_info {
                boxes.push(TextBox {
                    frame: frame(0.0, 0.55, 1.0, 0.1),
                    text: info.clone(),
                    size_pt: 20,
                    bold: false,
                    color: TEXT_MUTED,
                    align: Align::Center,
                    anchor_top: false,
                });
            }
            boxes
        }
        Slide::Introduction { text } => vec![
            heading_box(heading, frame(0.05, 0.1, 0.9, 0.1), KID_BLUE, content_align),
            body_box(text.clone(), frame(0.05, 0.25, 0.9, 0.65), 24, content_align),
        ],
        Slide::Section { section, .. } => {
            if has_image {
                vec![
                    heading_box(heading, frame(0.52, 0.1, 0.43, 0.1), KID_BLUE, content_align),
                    body_box(
                        section.content.clone(),
                        frame(0.52, 0.25, 0.43, 0.65),
                        20,
                        content_align,
                    ),
                ]
            } else {
                vec![
                    heading_box(heading, frame(0.05, 0.1, 0.9, 0.1), KID_BLUE, content_align),
                    body_box(
                        section.content.clone(),
                        frame(0.05, 0.25, 0.9, 0.65),
                        24,
                        content_align,
                    ),
                ]
            }
        }
        Slide::FunFact { text } => vec![
            TextBox {
                frame: frame(0.0, 0.2, 1.0, 0.12),
                text: heading,
                size_pt: 36,
                bold: true,
                color: FUN_FACT_AMBER,
                align: Align::Center,
                anchor_top: false,
            },
            TextBox {
                frame: frame(0.05, 0.4, 0.9, 0.4),
                text: text.clone(),
                size_pt: 28,
                bold: false,
                color: TEXT_DARK,
                align: Align::Center,
                anchor_top: true,
            },
        ],
        Slide::Objectives { items } => vec![
            heading_box(heading, frame(0.05, 0.1, 0.9, 0.1), KID_PURPLE, content_align),
            body_box(
                items
                    .iter()
                    .map(|item| format!("• {}", item))
                    .collect::<Vec<_>>()
                    .join("\n"),
                frame(0.05, 0.25, 0.9, 0.65),
                24,
                content_align,
            ),
        ],
    }
}

fn heading_box(text: String, frame: Frame, color: &'static str, align: Align) -> TextBox {
    TextBox {
        frame,
        text,
        size_pt: 32,
        bold: true,
        color,
        align,
        anchor_top: false,
    }
}

fn body_box(text: String, frame: Frame, size_pt: u32, align: Align) -> TextBox {
    TextBox {
        frame,
        text,
        size_pt,
        bold: false,
        color: TEXT_DARK,
        align,
        anchor_top: true,
    }
}

/// Resolve and decode a section image. Failures are logged and the slide is
/// laid out without an image.
fn load_slide_image(reference: &str, timeout: Duration) -> Option<SlideImage> {
    let data = match ImageResource::new(reference).bytes(timeout) {
        Ok(data) => data,
        Err(e) => {
            warn!("Failed to load section image {}: {}", reference, e);
            return None;
        }
    };

    let decoded = match image::load_from_memory(&data) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("Failed to decode section image {}: {}", reference, e);
            return None;
        }
    };
    let (width, height) = decoded.dimensions();

    match image::guess_format(&data) {
        Ok(ImageFormat::Png) => Some(SlideImage {
            data,
            extension: "png",
            width,
            height,
        }),
        Ok(ImageFormat::Jpeg) => Some(SlideImage {
            data,
            extension: "jpeg",
            width,
            height,
        }),
        _ => {
            // Re-encode anything else as PNG
            let mut buffer = Cursor::new(Vec::new());
            if let Err(e) = decoded.write_to(&mut buffer, ImageOutputFormat::Png) {
                warn!("Failed to re-encode section image {}: {}", reference, e);
                return None;
            }
            Some(SlideImage {
                data: buffer.into_inner(),
                extension: "png",
                width,
                height,
            })
        }
    }
}

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const PACKAGE_RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const OFFICE_RELS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PML_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

/// Section pictures sit on the left, text on the right.
const IMAGE_FRAME: Frame = frame(0.05, 0.15, 0.45, 0.75);

fn write_part<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str, content: &[u8]) -> Result<()> {
    info!("Writing PPTX part {}", name);
    zip.start_file(name, FileOptions::default())?;
    zip.write_all(content)?;
    Ok(())
}

fn relationships(entries: impl Iterator<Item = (String, String, String)>) -> String {
    let mut xml = format!("{}\n<Relationships xmlns=\"{}\">\n", XML_DECL, PACKAGE_RELS_NS);
    for (id, kind, target) in entries {
        xml.push_str(&format!(
            "    <Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"/>\n",
            id, kind, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn content_types_xml(slide_count: usize) -> String {
    let mut xml = format!(
        "{}\n<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\n",
        XML_DECL
    );
    for (extension, mime) in [
        ("xml", "application/xml"),
        ("rels", "application/vnd.openxmlformats-package.relationships+xml"),
        ("png", "image/png"),
        ("jpeg", "image/jpeg"),
    ] {
        xml.push_str(&format!(
            "    <Default Extension=\"{}\" ContentType=\"{}\"/>\n",
            extension, mime
        ));
    }

    let fixed = [
        ("/ppt/presentation.xml".to_string(), "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"),
        ("/docProps/core.xml".to_string(), "application/vnd.openxmlformats-package.core-properties+xml"),
        ("/docProps/app.xml".to_string(), "application/vnd.openxmlformats-officedocument.extended-properties+xml"),
        ("/ppt/slideMasters/slideMaster1.xml".to_string(), "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"),
        ("/ppt/slideLayouts/slideLayout1.xml".to_string(), "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"),
        ("/ppt/theme/theme1.xml".to_string(), "application/vnd.openxmlformats-officedocument.theme+xml"),
    ];
    let slides = (1..=slide_count).map(|n| {
        (
            format!("/ppt/slides/slide{}.xml", n),
            "application/vnd.openxmlformats-officedocument.presentationml.slide+xml",
        )
    });
    for (part, mime) in fixed.into_iter().chain(slides) {
        xml.push_str(&format!(
            "    <Override PartName=\"{}\" ContentType=\"{}\"/>\n",
            part, mime
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn package_rels_xml() -> String {
    relationships(
        [
            (format!("{}/officeDocument", OFFICE_RELS), "ppt/presentation.xml"),
            (
                "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties".to_string(),
                "docProps/core.xml",
            ),
            (format!("{}/extended-properties", OFFICE_RELS), "docProps/app.xml"),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (kind, target))| (format!("rId{}", i + 1), kind, target.to_string())),
    )
}

fn app_props_xml(slide_count: usize) -> String {
    format!(
        "{}\n<Properties xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\">\n    <Application>darsy</Application>\n    <Slides>{}</Slides>\n</Properties>",
        XML_DECL, slide_count
    )
}

fn core_props_xml(lesson: &Lesson) -> String {
    let creator = lesson.teacher_name().unwrap_or("darsy");
    format!(
        r#"{decl}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <dc:title>{title}</dc:title>
    <dc:creator>{creator}</dc:creator>
    <dc:language>{language}</dc:language>
    <dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created>
</cp:coreProperties>"#,
        decl = XML_DECL,
        title = escape(lesson.title.as_str()),
        creator = escape(creator),
        language = lesson.language.code(),
        created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    )
}

fn presentation_rels_xml(slide_count: usize) -> String {
    let slides = (1..=slide_count).map(|n| {
        (
            format!("rId{}", n),
            format!("{}/slide", OFFICE_RELS),
            format!("slides/slide{}.xml", n),
        )
    });
    let shared = [
        ("slideMaster", "slideMasters/slideMaster1.xml"),
        ("theme", "theme/theme1.xml"),
    ]
    .into_iter()
    .enumerate()
    .map(move |(i, (kind, target))| {
        (
            format!("rId{}", slide_count + 1 + i),
            format!("{}/{}", OFFICE_RELS, kind),
            target.to_string(),
        )
    });
    relationships(slides.chain(shared))
}

fn presentation_xml(slide_count: usize, cx: i64, cy: i64, language: Language) -> String {
    let rtl = if language.is_rtl() { r#" rtl="1""# } else { "" };
    let slide_ids: String = (0..slide_count)
        .map(|i| format!("        <p:sldId id=\"{}\" r:id=\"rId{}\"/>\n", 256 + i, i + 1))
        .collect();
    format!(
        "{decl}\n<p:presentation xmlns:a=\"{dml}\" xmlns:r=\"{rels}\" xmlns:p=\"{pml}\"{rtl}>\n    <p:sldMasterIdLst>\n        <p:sldMasterId id=\"2147483648\" r:id=\"rId{master}\"/>\n    </p:sldMasterIdLst>\n    <p:sldIdLst>\n{slide_ids}    </p:sldIdLst>\n    <p:sldSz cx=\"{cx}\" cy=\"{cy}\"/>\n    <p:notesSz cx=\"{cy}\" cy=\"{cx}\"/>\n</p:presentation>",
        decl = XML_DECL,
        dml = DML_NS,
        rels = OFFICE_RELS,
        pml = PML_NS,
        rtl = rtl,
        master = slide_count + 1,
        slide_ids = slide_ids,
        cx = cx,
        cy = cy
    )
}

/// Every slide points at the shared layout as `rId1`; a section picture is `rId2`.
fn slide_rels_xml(media_name: Option<&str>) -> String {
    let layout = (
        "rId1".to_string(),
        format!("{}/slideLayout", OFFICE_RELS),
        "../slideLayouts/slideLayout1.xml".to_string(),
    );
    let image = media_name.map(|name| {
        (
            "rId2".to_string(),
            format!("{}/image", OFFICE_RELS),
            format!("../media/{}", name),
        )
    });
    relationships(std::iter::once(layout).chain(image))
}

const EMPTY_SHAPE_TREE: &str = r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree>"#;

fn slide_master_xml() -> String {
    format!(
        r#"{decl}
<p:sldMaster xmlns:a="{dml}" xmlns:r="{rels}" xmlns:p="{pml}">
    <p:cSld>{tree}</p:cSld>
    <p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
    <p:sldLayoutIdLst>
        <p:sldLayoutId id="2147483649" r:id="rId1"/>
    </p:sldLayoutIdLst>
    <p:txStyles><p:titleStyle/><p:bodyStyle/><p:otherStyle/></p:txStyles>
</p:sldMaster>"#,
        decl = XML_DECL,
        dml = DML_NS,
        rels = OFFICE_RELS,
        pml = PML_NS,
        tree = EMPTY_SHAPE_TREE
    )
}

fn slide_master_rels_xml() -> String {
    relationships(
        [
            ("slideLayout", "../slideLayouts/slideLayout1.xml"),
            ("theme", "../theme/theme1.xml"),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (kind, target))| {
            (
                format!("rId{}", i + 1),
                format!("{}/{}", OFFICE_RELS, kind),
                target.to_string(),
            )
        }),
    )
}

fn slide_layout_xml() -> String {
    format!(
        r#"{decl}
<p:sldLayout xmlns:a="{dml}" xmlns:r="{rels}" xmlns:p="{pml}" type="blank" preserve="1">
    <p:cSld name="Blank">{tree}</p:cSld>
    <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>"#,
        decl = XML_DECL,
        dml = DML_NS,
        rels = OFFICE_RELS,
        pml = PML_NS,
        tree = EMPTY_SHAPE_TREE
    )
}

fn slide_layout_rels_xml() -> String {
    relationships(std::iter::once((
        "rId1".to_string(),
        format!("{}/slideMaster", OFFICE_RELS),
        "../slideMasters/slideMaster1.xml".to_string(),
    )))
}

/// Theme colours follow the lesson palette.
fn theme_xml() -> String {
    let solid = |scheme: &str| format!(r#"<a:solidFill><a:schemeClr val="{}"/></a:solidFill>"#, scheme);
    let line = |width: u32| format!(r#"<a:ln w="{}">{}</a:ln>"#, width, solid("phClr"));
    let fonts = |face: &str| format!(r#"<a:latin typeface="{}"/><a:ea typeface=""/><a:cs typeface="Arial"/>"#, face);

    format!(
        r#"{decl}
<a:theme xmlns:a="{dml}" name="darsy">
    <a:themeElements>
        <a:clrScheme name="darsy">
            <a:dk1><a:srgbClr val="{dark}"/></a:dk1>
            <a:lt1><a:srgbClr val="FFFFFF"/></a:lt1>
            <a:dk2><a:srgbClr val="{purple}"/></a:dk2>
            <a:lt2><a:srgbClr val="F0F9FF"/></a:lt2>
            <a:accent1><a:srgbClr val="{blue}"/></a:accent1>
            <a:accent2><a:srgbClr val="{purple}"/></a:accent2>
            <a:accent3><a:srgbClr val="{amber}"/></a:accent3>
            <a:accent4><a:srgbClr val="F72585"/></a:accent4>
            <a:accent5><a:srgbClr val="4361EE"/></a:accent5>
            <a:accent6><a:srgbClr val="80ED99"/></a:accent6>
            <a:hlink><a:srgbClr val="4361EE"/></a:hlink>
            <a:folHlink><a:srgbClr val="{purple}"/></a:folHlink>
        </a:clrScheme>
        <a:fontScheme name="darsy">
            <a:majorFont>{major}</a:majorFont>
            <a:minorFont>{minor}</a:minorFont>
        </a:fontScheme>
        <a:fmtScheme name="darsy">
            <a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst>
            <a:lnStyleLst>{thin}{medium}{thick}</a:lnStyleLst>
            <a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>
            <a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst>
        </a:fmtScheme>
    </a:themeElements>
</a:theme>"#,
        decl = XML_DECL,
        dml = DML_NS,
        dark = TEXT_DARK,
        purple = KID_PURPLE,
        blue = KID_BLUE,
        amber = FUN_FACT_AMBER,
        major = fonts("Arial Rounded MT Bold"),
        minor = fonts("Arial"),
        fill = solid("phClr"),
        thin = line(6350),
        medium = line(12700),
        thick = line(19050)
    )
}

fn slide_xml(background: &str, shapes: &str) -> String {
    format!(
        r#"{decl}
<p:sld xmlns:a="{dml}" xmlns:r="{rels}" xmlns:p="{pml}">
    <p:cSld>
        <p:bg>
            <p:bgPr>
                <a:solidFill><a:srgbClr val="{background}"/></a:solidFill>
                <a:effectLst/>
            </p:bgPr>
        </p:bg>
        <p:spTree>
            <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
            <p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>
{shapes}        </p:spTree>
    </p:cSld>
    <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sld>"#,
        decl = XML_DECL,
        dml = DML_NS,
        rels = OFFICE_RELS,
        pml = PML_NS,
        background = background,
        shapes = shapes
    )
}

/// Generate a PPTX presentation with one slide per lesson slide
pub fn export_pptx(lesson: &Lesson, output_file: &Path, config: &PptxConfig) -> Result<()> {
    info!("Generating PPTX for lesson {:?}", lesson.title);
    lesson.validate()?;

    utils::prepare_output(output_file)?;

    let slides = build_slides(lesson);
    info!("Lesson has {} slides", slides.len());

    // Set slide dimensions based on aspect ratio
    let (cx, cy) = match config.aspect_ratio.as_str() {
        "16:9" => (9144000, 5143500),
        "4:3" => (9144000, 6858000),
        _ => {
            warn!(
                "Unsupported aspect ratio: {}. Using 16:9 instead.",
                config.aspect_ratio
            );
            (9144000, 5143500)
        }
    };
    let canvas = Canvas {
        cx,
        cy,
        language: lesson.language,
    };

    let timeout = Duration::from_millis(config.timeout_ms);
    let images: Vec<Option<SlideImage>> = slides
        .iter()
        .map(|slide| match slide {
            Slide::Section { section, .. } => section
                .image_url
                .as_deref()
                .and_then(|url| load_slide_image(url, timeout)),
            _ => None,
        })
        .collect();

    let file = fs::File::create(output_file).map_err(LessonError::FileReadError)?;
    let mut zip = ZipWriter::new(file);

    write_part(&mut zip, "[Content_Types].xml", content_types_xml(slides.len()).as_bytes())?;
    write_part(&mut zip, "_rels/.rels", package_rels_xml().as_bytes())?;
    write_part(&mut zip, "docProps/app.xml", app_props_xml(slides.len()).as_bytes())?;
    write_part(&mut zip, "docProps/core.xml", core_props_xml(lesson).as_bytes())?;
    write_part(
        &mut zip,
        "ppt/_rels/presentation.xml.rels",
        presentation_rels_xml(slides.len()).as_bytes(),
    )?;
    write_part(
        &mut zip,
        "ppt/presentation.xml",
        presentation_xml(slides.len(), cx, cy, lesson.language).as_bytes(),
    )?;
    write_part(&mut zip, "ppt/theme/theme1.xml", theme_xml().as_bytes())?;
    write_part(&mut zip, "ppt/slideMasters/slideMaster1.xml", slide_master_xml().as_bytes())?;
    write_part(
        &mut zip,
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        slide_master_rels_xml().as_bytes(),
    )?;
    write_part(&mut zip, "ppt/slideLayouts/slideLayout1.xml", slide_layout_xml().as_bytes())?;
    write_part(
        &mut zip,
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        slide_layout_rels_xml().as_bytes(),
    )?;

    for (i, (slide, slide_image)) in slides.iter().zip(images.iter()).enumerate() {
        let slide_num = i + 1;
        debug!("Laying out slide {}: {:?}", slide_num, slide.kind());

        let mut shapes = String::new();
        let mut next_id = 2;

        let media_name = slide_image
            .as_ref()
            .map(|image| format!("image{}.{}", slide_num, image.extension));
        if let (Some(slide_image), Some(media_name)) = (slide_image, &media_name) {
            write_part(&mut zip, &format!("ppt/media/{}", media_name), &slide_image.data)?;
            shapes.push_str(&canvas.picture_shape(next_id, IMAGE_FRAME, slide_image));
            next_id += 1;
        }
        write_part(
            &mut zip,
            &format!("ppt/slides/_rels/slide{}.xml.rels", slide_num),
            slide_rels_xml(media_name.as_deref()).as_bytes(),
        )?;

        for text_box in slide_text_boxes(slide, lesson.language, slide_image.is_some()) {
            shapes.push_str(&canvas.text_shape(next_id, &text_box));
            next_id += 1;
        }

        write_part(
            &mut zip,
            &format!("ppt/slides/slide{}.xml", slide_num),
            slide_xml(slide_background(slide), &shapes).as_bytes(),
        )?;
    }

    zip.finish()?;
    info!("PPTX file created at {:?}", output_file);
    Ok(())
}
