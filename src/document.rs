//! Single-page document assembly and lifecycle.

use std::collections::HashMap;

use image::DynamicImage;

use crate::dictionary;
use crate::filters::Filter;
use crate::graphics::GraphicsState;
use crate::object::{Dictionary, Object, ObjectId, PdfObject};
use crate::payload::{BytesPayload, Payload};
use crate::resources::Resources;
use crate::serializer::{format_number, latin1_bytes};
use crate::Result;
use crate::xobject::ImageHandle;

/// Conversion factor from millimetres to 1/72-inch units.
pub const MM_TO_UNITS: f64 = 72.0 / 25.4;

/// Physical page extent and origin offset, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        x: 0.0,
        y: 0.0,
        width: 210.0,
        height: 297.0,
    };

    pub fn new(width: f64, height: f64) -> PageSize {
        PageSize {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    pub fn with_origin(x: f64, y: f64, width: f64, height: f64) -> PageSize {
        PageSize { x, y, width, height }
    }
}

/// A single-page document under construction.
///
/// Drawing commands are fed through [`Document::handle`]; the finished file
/// is produced by [`Document::save`] or [`Document::save_to`].
pub struct Document {
    /// Objects in allocation order; object number = index + 1.
    objects: Vec<PdfObject>,
    page_size: PageSize,
    pub(crate) compressed: bool,
    catalog: ObjectId,
    pub(crate) contents: ObjectId,
    pub(crate) resources: Resources,
    /// Graphics-state stack. Never empty; the bottom element is the page's
    /// initial state.
    pub(crate) states: Vec<GraphicsState>,
    /// Whether any group has opened a graphics context yet.
    pub(crate) transformed: bool,
    closed: bool,
    pub(crate) images: Vec<DynamicImage>,
    pub(crate) image_objects: HashMap<ImageHandle, ObjectId>,
}

impl Document {
    /// Create a document with stream compression enabled.
    pub fn new(page_size: PageSize) -> Document {
        Document::with_compression(page_size, true)
    }

    /// Create a document, choosing whether stream objects declare and apply
    /// the compression filter.
    pub fn with_compression(page_size: PageSize, compressed: bool) -> Document {
        let mut document = Document {
            objects: Vec::new(),
            page_size,
            compressed,
            catalog: (0, 0),
            contents: (0, 0),
            resources: Resources::new((0, 0)),
            states: vec![GraphicsState::default()],
            transformed: false,
            closed: false,
            images: Vec::new(),
            image_objects: HashMap::new(),
        };
        document.init_page();
        document
    }

    /// Allocate the next object number and append to the object list.
    pub fn add_object(&mut self, dict: Dictionary, payload: Option<Payload>) -> ObjectId {
        let id = (self.objects.len() as u32 + 1, 0);
        self.objects.push(PdfObject { id, dict, payload });
        id
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&PdfObject> {
        self.objects.get((id.0 as usize).checked_sub(1)?)
    }

    pub fn objects(&self) -> &[PdfObject] {
        &self.objects
    }

    pub fn catalog(&self) -> ObjectId {
        self.catalog
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> &mut PdfObject {
        &mut self.objects[(id.0 - 1) as usize]
    }

    /// Build the fixed Catalog → Pages → Page chain, the content stream with
    /// its length object, the resource table, and the initial page content.
    fn init_page(&mut self) {
        let catalog = self.add_object(dictionary! { "Type" => "Catalog" }, None);
        self.catalog = catalog;

        let pages = self.add_object(
            dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 1,
            },
            None,
        );
        self.object_mut(catalog).dict.set("Pages", pages);

        let media_box = [
            self.page_size.x,
            self.page_size.y,
            self.page_size.width,
            self.page_size.height,
        ]
        .into_iter()
        .map(|mm| Object::Real(mm * MM_TO_UNITS))
        .collect::<Vec<Object>>();
        let page = self.add_object(
            dictionary! {
                "Type" => "Page",
                "Parent" => pages,
                "MediaBox" => media_box,
            },
            None,
        );
        if let Some(Object::Array(kids)) = self.object_mut(pages).dict.get_mut("Kids") {
            kids.push(page.into());
        }

        let mut contents_payload = BytesPayload::new(true);
        if self.compressed {
            contents_payload.add_filter(Filter::FlateEncode);
        }
        let contents = self.add_object(Dictionary::new(), Some(Payload::Bytes(contents_payload)));
        self.contents = contents;
        self.object_mut(page).dict.set("Contents", contents);
        if self.compressed {
            self.object_mut(contents)
                .dict
                .set("Filter", vec![Object::from(Filter::FlateEncode.decode_name())]);
        }

        // Initial content: save, default color, then the base matrix mapping
        // millimetres to units with the vertical axis flipped.
        let state = GraphicsState::default();
        let height = self.page_size.height * MM_TO_UNITS;
        self.append_content("q");
        self.append_content(&crate::content::color_operators(&state.color));
        self.append_content(&format!(
            "{} 0 0 {} 0 {} cm",
            format_number(MM_TO_UNITS),
            format_number(-MM_TO_UNITS),
            format_number(height)
        ));

        let length = self.add_object(Dictionary::new(), Some(Payload::size_of(contents)));
        self.object_mut(contents).dict.set("Length", length);

        let resources_id = self.add_object(Dictionary::new(), None);
        self.resources = Resources::new(resources_id);
        self.object_mut(page).dict.set("Resources", resources_id);

        let font = state.font.clone();
        let font_name = self.resources.font_name(&font);
        self.append_content(&format!("/{} {} Tf", font_name, format_number(font.size)));
    }

    pub(crate) fn state(&self) -> &GraphicsState {
        &self.states[self.states.len() - 1]
    }

    pub(crate) fn state_mut(&mut self) -> &mut GraphicsState {
        let top = self.states.len() - 1;
        &mut self.states[top]
    }

    /// Append one line of operator text to the page content stream.
    ///
    /// Text that cannot be represented in the output encoding degrades to an
    /// empty line instead of corrupting the stream.
    pub(crate) fn append_content(&mut self, text: &str) {
        let bytes = latin1_bytes(text).unwrap_or_default();
        let contents = self.contents;
        if let Some(Payload::Bytes(payload)) = &mut self.object_mut(contents).payload {
            payload.write(&bytes);
            payload.write(b"\n");
        }
    }

    /// Balance open graphics contexts, materialize the resource dictionary
    /// and finalize the content payload. Idempotent; called automatically by
    /// `save`/`save_to`.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.append_content("Q");
        if self.transformed {
            self.append_content("Q");
        }

        let resources_dict = self.resources.to_dictionary();
        let resources_id = self.resources.id();
        self.object_mut(resources_id).dict = resources_dict;

        for object in &mut self.objects {
            if let Some(Payload::Bytes(payload)) = &mut object.payload {
                payload.close()?;
            }
        }
        self.closed = true;
        Ok(())
    }

    /// Byte length of a closed payload, for `/Length` resolution.
    pub(crate) fn payload_len(&self, id: ObjectId) -> usize {
        match self.get_object(id).and_then(|object| object.payload.as_ref()) {
            Some(Payload::Bytes(payload)) => payload.bytes().len(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_tree_is_a_fixed_chain() {
        let doc = Document::new(PageSize::A4);
        let catalog = doc.get_object(doc.catalog()).unwrap();
        let pages = catalog.dict.get("Pages").and_then(Object::as_reference).unwrap();
        let page_kids = doc.get_object(pages).unwrap().dict.get("Kids").and_then(Object::as_array).unwrap();
        assert_eq!(page_kids.len(), 1);
        let page = page_kids[0].as_reference().unwrap();
        let page_dict = &doc.get_object(page).unwrap().dict;
        assert_eq!(page_dict.get("Parent").and_then(Object::as_reference), Some(pages));
        assert!(page_dict.has("Contents"));
        assert!(page_dict.has("Resources"));
    }

    #[test]
    fn media_box_converts_millimetres() {
        let doc = Document::new(PageSize::A4);
        let page = doc.get_object((3, 0)).unwrap();
        let media_box = page.dict.get("MediaBox").and_then(Object::as_array).unwrap();
        let values = media_box.iter().map(|v| v.as_f64().unwrap()).collect::<Vec<_>>();
        let expected = [0.0, 0.0, 210.0 * 72.0 / 25.4, 297.0 * 72.0 / 25.4];
        for (value, want) in values.iter().zip(expected) {
            assert!((value - want).abs() < 1e-9);
        }
    }

    #[test]
    fn object_numbers_are_monotonic_from_one() {
        let mut doc = Document::new(PageSize::new(100.0, 100.0));
        let next = doc.add_object(Dictionary::new(), None);
        assert_eq!(next.0 as usize, doc.objects().len());
        for (index, object) in doc.objects().iter().enumerate() {
            assert_eq!(object.id, (index as u32 + 1, 0));
        }
    }

    #[test]
    fn close_is_idempotent() {
        let mut doc = Document::with_compression(PageSize::A4, false);
        doc.close().unwrap();
        let first_len = doc.payload_len(doc.contents);
        doc.close().unwrap();
        assert_eq!(doc.payload_len(doc.contents), first_len);
    }
}
