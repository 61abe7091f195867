// ABOUTME: Raster drawing surface for freehand annotations
// ABOUTME: Fills stroke outlines into an RGBA image with paint and erase compositing

use crate::errors::{LessonError, Result};
use image::{Rgba, RgbaImage};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// RGBA ink color, serialized as `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::rgb(0, 0, 0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for Color {
    type Error = LessonError;

    fn try_from(value: String) -> Result<Self> {
        parse_hex_color(&value)
    }
}

/// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
pub fn parse_hex_color(text: &str) -> Result<Color> {
    let hex = text.trim().trim_start_matches('#');
    let invalid = || LessonError::ValidationError(format!("Invalid color: {}", text));

    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());

    Ok(Color {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
        a: if hex.len() == 8 { channel(6)? } else { 255 },
    })
}

/// How a filled outline combines with pixels already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeMode {
    /// Paint the color over existing pixels.
    SourceOver,
    /// Remove existing pixels where the shape covers them.
    DestinationOut,
}

/// Resizable RGBA drawing surface. Starts fully transparent.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    image: RgbaImage,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = TRANSPARENT;
        }
    }

    /// Reallocate at a new size. Existing contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::new(width, height);
    }

    /// Overwrite this surface with another of the same size.
    pub fn copy_from(&mut self, other: &Surface) {
        self.image.clone_from(&other.image);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x < self.width() && y < self.height() {
            Some(*self.image.get_pixel(x, y))
        } else {
            None
        }
    }

    /// Number of pixels with non-zero alpha.
    pub fn painted_pixels(&self) -> usize {
        self.image.pixels().filter(|p| p[3] != 0).count()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        info!("Saving annotation surface to {:?}", path);
        self.image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    /// Fill a closed polygon with the non-zero winding rule.
    ///
    /// A pixel is covered when its centre lies inside the polygon, so the
    /// result depends only on the outline and not on the surface size.
    pub fn fill_polygon(&mut self, outline: &[(f32, f32)], color: Color, mode: CompositeMode) {
        let (width, height) = (self.width(), self.height());
        if outline.len() < 3 || width == 0 || height == 0 {
            return;
        }

        let (min_y, max_y) = outline
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &(_, y)| {
                (lo.min(y), hi.max(y))
            });
        let last_row = (max_y - 0.5).floor();
        if !last_row.is_finite() || last_row < 0.0 {
            return;
        }
        let first_row = (min_y - 0.5).ceil().max(0.0) as u32;
        let last_row = (last_row as u32).min(height - 1);

        let mut crossings: Vec<(f32, i32)> = Vec::new();
        for y in first_row..=last_row {
            let cy = y as f32 + 0.5;
            crossings.clear();

            for (i, &(ax, ay)) in outline.iter().enumerate() {
                let (bx, by) = outline[(i + 1) % outline.len()];
                let winding = if ay <= cy && by > cy {
                    1
                } else if by <= cy && ay > cy {
                    -1
                } else {
                    continue;
                };
                let x = ax + (cy - ay) / (by - ay) * (bx - ax);
                crossings.push((x, winding));
            }
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            for k in 0..crossings.len().saturating_sub(1) {
                winding += crossings[k].1;
                if winding == 0 {
                    continue;
                }
                let start = (crossings[k].0 - 0.5).ceil().max(0.0) as u32;
                let end = ((crossings[k + 1].0 - 0.5).ceil().max(0.0) as u32).min(width);
                for x in start..end {
                    let pixel = self.image.get_pixel_mut(x, y);
                    *pixel = composite(*pixel, color, mode);
                }
            }
        }
    }
}

fn composite(dst: Rgba<u8>, src: Color, mode: CompositeMode) -> Rgba<u8> {
    let sa = src.a as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;

    match mode {
        CompositeMode::SourceOver => {
            if src.a == 255 {
                return src.to_rgba();
            }
            let out_a = sa + da * (1.0 - sa);
            if out_a <= 0.0 {
                return TRANSPARENT;
            }
            let blend = |s: u8, d: u8| {
                ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a).round() as u8
            };
            Rgba([
                blend(src.r, dst[0]),
                blend(src.g, dst[1]),
                blend(src.b, dst[2]),
                (out_a * 255.0).round() as u8,
            ])
        }
        CompositeMode::DestinationOut => {
            let out_a = (da * (1.0 - sa) * 255.0).round() as u8;
            if out_a == 0 {
                TRANSPARENT
            } else {
                Rgba([dst[0], dst[1], dst[2], out_a])
            }
        }
    }
}
