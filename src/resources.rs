//! Resource naming: stable short names for fonts, embedded images and
//! transparency values, for reuse within content streams.

use indexmap::IndexMap;

use crate::dictionary;
use crate::graphics::Font;
use crate::object::{Dictionary, Object, ObjectId};

const PREFIX_FONT: &str = "Fnt";
const PREFIX_IMAGE: &str = "Img";
const PREFIX_TRANSPARENCY: &str = "Trp";

/// Document-local resource table backing the page's `/Resources` dictionary.
///
/// Names are assigned on first use and reused thereafter.
pub struct Resources {
    id: ObjectId,
    fonts: IndexMap<String, String>,
    images: IndexMap<ObjectId, String>,
    transparencies: IndexMap<u8, String>,
}

impl Resources {
    pub fn new(id: ObjectId) -> Resources {
        Resources {
            id,
            fonts: IndexMap::new(),
            images: IndexMap::new(),
            transparencies: IndexMap::new(),
        }
    }

    /// Object id of the backing dictionary object.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Look up or create the resource name for a font.
    pub fn font_name(&mut self, font: &Font) -> String {
        if let Some(name) = self.fonts.get(&font.base_font) {
            return name.clone();
        }
        let name = format!("{}{}", PREFIX_FONT, self.fonts.len());
        self.fonts.insert(font.base_font.clone(), name.clone());
        name
    }

    /// Look up or create the resource name for an embedded image object.
    pub fn image_name(&mut self, image: ObjectId) -> String {
        if let Some(name) = self.images.get(&image) {
            return name.clone();
        }
        let name = format!("{}{}", PREFIX_IMAGE, self.images.len());
        self.images.insert(image, name.clone());
        name
    }

    /// Look up or create the graphics-state resource name for an alpha value.
    pub fn transparency_name(&mut self, alpha: u8) -> String {
        if let Some(name) = self.transparencies.get(&alpha) {
            return name.clone();
        }
        let name = format!("{}{}", PREFIX_TRANSPARENCY, self.transparencies.len());
        self.transparencies.insert(alpha, name.clone());
        name
    }

    /// Materialize the `/Resources` dictionary from the names handed out so
    /// far.
    pub fn to_dictionary(&self) -> Dictionary {
        let proc_set = ["PDF", "Text", "ImageB", "ImageC", "ImageI"]
            .into_iter()
            .map(Object::from)
            .collect::<Vec<Object>>();
        let mut dict = dictionary! {
            "ProcSet" => proc_set,
        };
        if !self.fonts.is_empty() {
            let mut fonts = Dictionary::new();
            for (base_font, name) in &self.fonts {
                fonts.set(
                    name.clone(),
                    dictionary! {
                        "Type" => "Font",
                        "Subtype" => "Type1",
                        "Encoding" => "WinAnsiEncoding",
                        "BaseFont" => base_font.clone(),
                    },
                );
            }
            dict.set("Font", fonts);
        }
        if !self.images.is_empty() {
            let mut xobjects = Dictionary::new();
            for (&id, name) in &self.images {
                xobjects.set(name.clone(), id);
            }
            dict.set("XObject", xobjects);
        }
        if !self.transparencies.is_empty() {
            let mut states = Dictionary::new();
            for (&alpha, name) in &self.transparencies {
                let a = f64::from(alpha) / 255.0;
                states.set(
                    name.clone(),
                    dictionary! {
                        "Type" => "ExtGState",
                        "ca" => a,
                        "CA" => a,
                    },
                );
            }
            dict.set("ExtGState", states);
        }
        dict
    }
}
