//! Render an ordered stream of 2D vector drawing commands — shapes, text
//! runs, images and graphics-state changes — into a single-page PDF
//! document.
//!
//! ```no_run
//! use vecpdf::{Color, Command, Document, PageSize, Path, StateCommand};
//!
//! let mut doc = Document::new(PageSize::A4);
//! doc.handle(Command::Group(vec![StateCommand::SetColor(Color::rgb(200, 0, 0))]))?;
//! doc.handle(Command::FillShape(
//!     Path::new().move_to(10.0, 10.0).line_to(100.0, 10.0).line_to(55.0, 80.0).close(),
//! ))?;
//! doc.save("triangle.pdf")?;
//! # Ok::<(), vecpdf::Error>(())
//! ```

mod content;
mod document;
mod error;
mod filters;
mod graphics;
mod object;
mod path;
mod payload;
mod resources;
mod serializer;
mod writer;
mod xobject;
mod xref;

pub use content::{Command, StateCommand};
pub use document::{Document, MM_TO_UNITS, PageSize};
pub use error::{Error, Result};
pub use filters::Filter;
pub use graphics::{Color, Dash, Font, GraphicsState, LineCap, LineJoin, Stroke, Transform};
pub use object::{Dictionary, Object, ObjectId, PdfObject};
pub use path::{Path, Segment};
pub use payload::{BytesPayload, Payload};
pub use resources::Resources;
pub use serializer::{format_number, serialize};
pub use xobject::ImageHandle;
pub use xref::{Xref, XrefEntry};
