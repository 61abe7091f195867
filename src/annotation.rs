// ABOUTME: Freehand annotation layer for presentation mode
// ABOUTME: Captures pointer input into strokes and composites them onto a resizable surface

use crate::errors::Result;
use crate::raster::{Color, CompositeMode, Surface};
use crate::stroke::{Stroke, StrokePoint, Tool};
use log::debug;

/// Bit set in `PointerEvent::buttons` while the primary button is held.
pub const PRIMARY_BUTTON: u32 = 1;

/// Pressure reported for devices without pressure sensing.
const DEFAULT_PRESSURE: f32 = 0.5;

/// Screen-space placement and pixel size of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceBounds {
    pub left: f32,
    pub top: f32,
    pub width: u32,
    pub height: u32,
}

impl SurfaceBounds {
    pub fn new(left: f32, top: f32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Bounds anchored at the screen origin.
    pub fn sized(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }
}

/// Pointer input in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub client_x: f32,
    pub client_y: f32,
    pub pressure: f32,
    pub buttons: u32,
}

impl PointerEvent {
    /// Event with the primary button held and default pressure.
    pub fn pressed(client_x: f32, client_y: f32) -> Self {
        Self {
            client_x,
            client_y,
            pressure: DEFAULT_PRESSURE,
            buttons: PRIMARY_BUTTON,
        }
    }

    /// Event with no buttons held.
    pub fn hover(client_x: f32, client_y: f32) -> Self {
        Self {
            client_x,
            client_y,
            pressure: 0.0,
            buttons: 0,
        }
    }

    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = pressure;
        self
    }

    fn primary_held(&self) -> bool {
        self.buttons & PRIMARY_BUTTON != 0
    }
}

#[derive(Debug, Clone, PartialEq)]
enum DrawState {
    Idle,
    Drawing(Stroke),
}

/// Transient drawing layer overlaid on the current slide.
///
/// Committed strokes are kept as a vector log so the raster can be rebuilt
/// whenever the surface is resized. The raster of committed strokes is cached
/// separately so that an in-progress stroke can be re-rendered on its own.
#[derive(Debug, Clone)]
pub struct AnnotationLayer {
    bounds: SurfaceBounds,
    tool: Tool,
    color: Color,
    strokes: Vec<Stroke>,
    state: DrawState,
    committed: Surface,
    surface: Surface,
}

impl AnnotationLayer {
    pub fn new(bounds: SurfaceBounds) -> Self {
        Self {
            bounds,
            tool: Tool::Pen,
            color: Color::rgb(0xEF, 0x44, 0x44),
            strokes: Vec::new(),
            state: DrawState::Idle,
            committed: Surface::new(bounds.width, bounds.height),
            surface: Surface::new(bounds.width, bounds.height),
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Applies to the next stroke; a stroke in progress keeps its tool.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn bounds(&self) -> SurfaceBounds {
        self.bounds
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing(_))
    }

    /// The visible raster: committed strokes plus any stroke in progress.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    fn to_local(&self, event: &PointerEvent) -> StrokePoint {
        let pressure = if event.pressure > 0.0 {
            event.pressure.min(1.0)
        } else {
            DEFAULT_PRESSURE
        };
        StrokePoint::new(
            event.client_x - self.bounds.left,
            event.client_y - self.bounds.top,
            pressure,
        )
    }

    pub fn pointer_down(&mut self, event: PointerEvent) {
        if self.is_drawing() {
            self.commit();
        }
        let stroke = Stroke::begin(self.tool, self.color, self.to_local(&event));
        self.state = DrawState::Drawing(stroke);
        self.render_live();
    }

    /// Returns whether a point was appended.
    pub fn pointer_move(&mut self, event: PointerEvent) -> bool {
        if !event.primary_held() {
            return false;
        }
        let point = self.to_local(&event);
        match &mut self.state {
            DrawState::Drawing(stroke) => stroke.push(point),
            DrawState::Idle => return false,
        }
        self.render_live();
        true
    }

    pub fn pointer_up(&mut self) {
        self.commit();
    }

    /// Losing pointer capture finishes the stroke the same way as releasing.
    pub fn lost_pointer_capture(&mut self) {
        self.commit();
    }

    fn commit(&mut self) {
        let DrawState::Drawing(stroke) = std::mem::replace(&mut self.state, DrawState::Idle)
        else {
            return;
        };
        paint(&mut self.committed, &stroke);
        self.surface.copy_from(&self.committed);
        debug!(
            "Committed {:?} stroke with {} points ({} total)",
            stroke.tool,
            stroke.points.len(),
            self.strokes.len() + 1
        );
        self.strokes.push(stroke);
    }

    fn render_live(&mut self) {
        self.surface.copy_from(&self.committed);
        if let DrawState::Drawing(stroke) = &self.state {
            paint(&mut self.surface, stroke);
        }
    }

    /// Repaint every committed stroke in commit order.
    pub fn redraw(&mut self) {
        self.committed.clear();
        for stroke in &self.strokes {
            paint(&mut self.committed, stroke);
        }
        self.render_live();
    }

    /// Raster contents do not survive a resize, so they are rebuilt from the log.
    pub fn resize(&mut self, bounds: SurfaceBounds) {
        debug!(
            "Resizing annotation surface to {}x{}",
            bounds.width, bounds.height
        );
        self.bounds = bounds;
        self.committed.resize(bounds.width, bounds.height);
        self.surface.resize(bounds.width, bounds.height);
        self.redraw();
    }

    /// Drop all strokes, including one in progress, and blank the raster.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.state = DrawState::Idle;
        self.committed.clear();
        self.surface.clear();
    }

    pub fn stroke_log_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.strokes)?)
    }

    /// Replace the committed strokes with a saved log and repaint.
    pub fn load_stroke_log(&mut self, json: &str) -> Result<()> {
        let strokes: Vec<Stroke> = serde_json::from_str(json)?;
        self.state = DrawState::Idle;
        self.strokes = strokes;
        self.redraw();
        Ok(())
    }
}

fn paint(surface: &mut Surface, stroke: &Stroke) {
    let mode = match stroke.tool {
        Tool::Pen => CompositeMode::SourceOver,
        Tool::Eraser => CompositeMode::DestinationOut,
    };
    surface.fill_polygon(&stroke.outline(), stroke.color, mode);
}
