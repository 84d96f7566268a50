//! Content-stream command interpretation.
//!
//! Each incoming [`Command`] is processed atomically: state sub-commands
//! mutate the graphics-state stack, draw commands append operator text to
//! the page content stream.

use log::warn;

use crate::document::Document;
use crate::graphics::{Color, Font, GraphicsState, LineJoin, Stroke, Transform};
use crate::path::Path;
use crate::serializer::{EOL, format_number, string_literal};
use crate::xobject::ImageHandle;
use crate::{Error, Result};

/// A drawing command consumed by [`Document::handle`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Batch of state changes, flushed as a restore/save operator pair
    /// reflecting every non-default state attribute.
    Group(Vec<StateCommand>),
    /// Stroke the outline of a shape.
    DrawShape(Path),
    /// Fill the interior of a shape.
    FillShape(Path),
    /// Show a text run at a baseline position.
    DrawString { text: String, x: f64, y: f64 },
    /// Draw a registered raster into the given rectangle.
    DrawImage {
        image: ImageHandle,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

/// State-changing sub-command, consumed only inside a [`Command::Group`].
/// Mutates the graphics state; never emits output directly.
#[derive(Debug, Clone, PartialEq)]
pub enum StateCommand {
    SetHint { key: String, value: String },
    SetBackground(Color),
    SetColor(Color),
    SetPaint(Color),
    SetStroke(Stroke),
    SetFont(Font),
    SetClip(Option<Path>),
    /// Replace the transform wholesale. The format has no primitive for
    /// this; requesting it fails fast.
    SetTransform(Transform),
    /// Post-multiply the given matrix onto the current transform.
    ConcatTransform(Transform),
    /// Clone the top of the state stack.
    Push,
    /// Discard the top of the state stack.
    Pop,
}

impl Document {
    /// Process one drawing command, appending operators to the page content.
    pub fn handle(&mut self, command: Command) -> Result<()> {
        let output = match command {
            Command::Group(commands) => {
                self.apply_state_commands(commands)?;
                let first = !self.transformed;
                let block = self.state_block(first);
                self.transformed = true;
                block
            }
            Command::DrawShape(path) => format!("{} S", path.encode()),
            Command::FillShape(path) => format!("{} f", path.encode()),
            Command::DrawString { text, x, y } => text_block(&text, x, y),
            Command::DrawImage {
                image,
                x,
                y,
                width,
                height,
            } => {
                let object_id = self.image_object(image)?;
                let name = self.resources.image_name(object_id);
                image_block(&name, x, y, width, height)
            }
        };
        self.append_content(&output);
        Ok(())
    }

    fn apply_state_commands(&mut self, commands: Vec<StateCommand>) -> Result<()> {
        // Fail fast before touching the stack, so a rejected batch leaves no
        // partial state behind.
        if commands.iter().any(|c| matches!(c, StateCommand::SetTransform(_))) {
            return Err(Error::Unsupported(
                "the format has no means of setting the transformation matrix",
            ));
        }
        for command in commands {
            match command {
                StateCommand::SetHint { key, value } => {
                    self.state_mut().hints.insert(key, value);
                }
                StateCommand::SetBackground(color) => self.state_mut().background = color,
                StateCommand::SetColor(color) => self.state_mut().color = color,
                StateCommand::SetPaint(color) => self.state_mut().paint = Some(color),
                StateCommand::SetStroke(stroke) => self.state_mut().stroke = stroke,
                StateCommand::SetFont(font) => self.state_mut().font = font,
                StateCommand::SetClip(clip) => self.state_mut().clip = clip,
                StateCommand::SetTransform(_) => {
                    return Err(Error::Unsupported(
                        "the format has no means of setting the transformation matrix",
                    ));
                }
                StateCommand::ConcatTransform(transform) => {
                    self.state_mut().transform.concatenate(&transform);
                }
                StateCommand::Push => {
                    let top = self.state().clone();
                    self.states.push(top);
                }
                StateCommand::Pop => {
                    if self.states.len() > 1 {
                        self.states.pop();
                    } else {
                        warn!("state restore without matching save; keeping page state");
                    }
                }
            }
        }
        Ok(())
    }

    /// Close the previous graphics context (unless this is the first group)
    /// and open a new one reflecting every non-default state attribute.
    fn state_block(&mut self, first: bool) -> String {
        let state = self.state().clone();
        let default = GraphicsState::default();
        let mut out = String::new();

        if !first {
            out.push('Q');
            out.push_str(EOL);
        }
        out.push('q');
        out.push_str(EOL);

        if state.color != default.color {
            if state.color.alpha() != default.color.alpha() {
                let name = self.resources.transparency_name(state.color.alpha());
                out.push('/');
                out.push_str(&name);
                out.push_str(" gs");
                out.push_str(EOL);
            }
            out.push_str(&color_operators(&state.color));
            out.push_str(EOL);
        }
        if state.transform != default.transform {
            out.push_str(&transform_operator(&state.transform));
            out.push_str(EOL);
        }
        if state.stroke != default.stroke {
            out.push_str(&stroke_operators(&state.stroke));
        }
        if let Some(clip) = &state.clip {
            out.push_str(&clip.encode());
            out.push_str(" W n");
            out.push_str(EOL);
        }
        if state.font != default.font {
            let name = self.resources.font_name(&state.font);
            out.push('/');
            out.push_str(&name);
            out.push(' ');
            out.push_str(&format_number(state.font.size));
            out.push_str(" Tf");
            out.push_str(EOL);
        }

        while out.ends_with(EOL) {
            out.truncate(out.len() - EOL.len());
        }
        out
    }
}

/// Color operators, setting fill and stroke color together.
pub(crate) fn color_operators(color: &Color) -> String {
    match *color {
        Color::Cmyk { c, m, y, k, .. } => {
            let (c, m, y, k) = (
                format_number(c),
                format_number(m),
                format_number(y),
                format_number(k),
            );
            format!("{c} {m} {y} {k} k {c} {m} {y} {k} K")
        }
        Color::Rgb { r, g, b, .. } => {
            let (r, g, b) = (
                format_number(f64::from(r) / 255.0),
                format_number(f64::from(g) / 255.0),
                format_number(f64::from(b) / 255.0),
            );
            format!("{r} {g} {b} rg {r} {g} {b} RG")
        }
    }
}

/// Stroke operators, one line per attribute differing from the default.
pub(crate) fn stroke_operators(stroke: &Stroke) -> String {
    let default = Stroke::default();
    let mut out = String::new();
    if stroke.line_width != default.line_width {
        out.push_str(&format_number(stroke.line_width));
        out.push_str(" w");
        out.push_str(EOL);
    }
    if stroke.join == LineJoin::Miter && stroke.miter_limit != default.miter_limit {
        out.push_str(&format_number(stroke.miter_limit));
        out.push_str(" M");
        out.push_str(EOL);
    }
    if stroke.join != default.join {
        out.push_str(itoa::Buffer::new().format(stroke.join.operand()));
        out.push_str(" j");
        out.push_str(EOL);
    }
    if stroke.cap != default.cap {
        out.push_str(itoa::Buffer::new().format(stroke.cap.operand()));
        out.push_str(" J");
        out.push_str(EOL);
    }
    if stroke.dash != default.dash {
        match &stroke.dash {
            Some(dash) if !dash.array.is_empty() => {
                let array = dash
                    .array
                    .iter()
                    .map(|v| format_number(*v))
                    .collect::<Vec<String>>()
                    .join(" ");
                out.push('[');
                out.push_str(&array);
                out.push_str("] ");
                out.push_str(&format_number(dash.phase));
                out.push_str(" d");
                out.push_str(EOL);
            }
            // Dashing removed: an explicit reset, distinct from "never set".
            _ => {
                out.push_str("[] 0 d");
                out.push_str(EOL);
            }
        }
    }
    out
}

pub(crate) fn transform_operator(transform: &Transform) -> String {
    let coefficients = transform
        .matrix
        .iter()
        .map(|v| format_number(*v))
        .collect::<Vec<String>>()
        .join(" ");
    format!("{coefficients} cm")
}

/// Show a text run: save, flip the y axis back, show, restore.
fn text_block(text: &str, x: f64, y: f64) -> String {
    format!(
        "q 1 0 0 -1 {} {} cm BT {} Tj ET Q",
        format_number(x),
        format_number(y),
        string_literal(text)
    )
}

/// Draw an image XObject: save, scale-translate into place, flip the y axis,
/// draw, restore.
fn image_block(name: &str, x: f64, y: f64, width: f64, height: f64) -> String {
    format!(
        "q {} 0 0 {} {} {} cm 1 0 0 -1 0 1 cm /{} Do Q",
        format_number(width),
        format_number(height),
        format_number(x),
        format_number(y),
        name
    )
}
