//! Drawing surfaces faces issue their commands against

mod canvas_surface;

pub use canvas_surface::CanvasSurface;

use crate::models::style::StrokeStyle;
use serde::Serialize;

/// Minimal 2D drawing API a face needs: primitives plus a save/restore
/// transform stack with rotation about a pivot.
pub trait Surface {
    /// Push the current transform
    fn save(&mut self);

    /// Pop the transform pushed by the matching `save`
    fn restore(&mut self) -> Result<(), String>;

    /// Rotate clockwise by `degrees` about (`px`, `py`)
    fn rotate(&mut self, degrees: f32, px: f32, py: f32);

    fn draw_line(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        style: &StrokeStyle,
    ) -> Result<(), String>;

    fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, style: &StrokeStyle)
        -> Result<(), String>;

    /// Draw `text` horizontally centered on `x` with its baseline at `y`
    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &StrokeStyle)
        -> Result<(), String>;
}

/// One recorded surface call
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Save,
    Restore,
    Rotate {
        degrees: f32,
        px: f32,
        py: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        style: StrokeStyle,
    },
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        style: StrokeStyle,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        style: StrokeStyle,
    },
}

impl DrawCommand {
    pub fn style(&self) -> Option<&StrokeStyle> {
        match self {
            DrawCommand::Line { style, .. }
            | DrawCommand::Circle { style, .. }
            | DrawCommand::Text { style, .. } => Some(style),
            _ => None,
        }
    }
}

/// Surface that only records what was asked of it
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    depth: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(&self.commands).map_err(|e| e.to_string())
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.depth += 1;
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) -> Result<(), String> {
        if self.depth == 0 {
            return Err("restore called without a matching save".to_string());
        }
        self.depth -= 1;
        self.commands.push(DrawCommand::Restore);
        Ok(())
    }

    fn rotate(&mut self, degrees: f32, px: f32, py: f32) {
        self.commands.push(DrawCommand::Rotate { degrees, px, py });
    }

    fn draw_line(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        style: &StrokeStyle,
    ) -> Result<(), String> {
        self.commands.push(DrawCommand::Line {
            x1,
            y1,
            x2,
            y2,
            style: *style,
        });
        Ok(())
    }

    fn draw_circle(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        style: &StrokeStyle,
    ) -> Result<(), String> {
        self.commands.push(DrawCommand::Circle {
            cx,
            cy,
            radius,
            style: *style,
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        style: &StrokeStyle,
    ) -> Result<(), String> {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            style: *style,
        });
        Ok(())
    }
}
