//! Embedding raster images as image XObjects.

use image::{DynamicImage, GenericImageView};

use crate::Result;
use crate::dictionary;
use crate::document::Document;
use crate::filters::Filter;
use crate::object::{Object, ObjectId};
use crate::payload::{BytesPayload, Payload};

/// Stable handle to a raster registered with [`Document::add_image`].
///
/// Drawing the same handle repeatedly reuses one embedded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub(crate) usize);

impl Document {
    /// Register a raster for later drawing.
    pub fn add_image(&mut self, image: DynamicImage) -> ImageHandle {
        self.images.push(image);
        ImageHandle(self.images.len() - 1)
    }

    /// Look up or create the embedded object for a registered raster.
    pub(crate) fn image_object(&mut self, handle: ImageHandle) -> Result<ObjectId> {
        if let Some(&id) = self.image_objects.get(&handle) {
            return Ok(id);
        }
        let id = self.embed_image(handle)?;
        self.image_objects.insert(handle, id);
        Ok(id)
    }

    fn embed_image(&mut self, handle: ImageHandle) -> Result<ObjectId> {
        let image = &self.images[handle.0];
        let (width, height) = image.dimensions();

        // One band for grayscale sources, three for everything else; the
        // alpha channel is stripped and handled separately.
        let grayscale = matches!(
            image.color(),
            image::ColorType::L8 | image::ColorType::La8 | image::ColorType::L16 | image::ColorType::La16
        );
        let (color_space, samples) = if grayscale {
            ("DeviceGray", image.to_luma8().into_raw())
        } else {
            ("DeviceRGB", image.to_rgb8().into_raw())
        };
        let alpha = if image.color().has_alpha() {
            Some(image.to_rgba8().pixels().map(|pixel| pixel.0[3]).collect::<Vec<u8>>())
        } else {
            None
        };

        let image_id = self.add_sample_object(color_space, width, height, 8, &samples)?;

        if let Some(alpha) = alpha {
            if alpha.iter().all(|&a| a == 255) {
                // Fully opaque: no mask object at all.
            } else if alpha.iter().all(|&a| a == 0 || a == 255) {
                let mask_id = self.add_bitmask_object(width, height, &alpha)?;
                self.object_mut(image_id).dict.set("Mask", mask_id);
            } else {
                let mask_id = self.add_sample_object("DeviceGray", width, height, 8, &alpha)?;
                self.object_mut(image_id).dict.set("SMask", mask_id);
            }
        }

        Ok(image_id)
    }

    /// Embed interleaved 8-bit samples as an image object.
    fn add_sample_object(
        &mut self,
        color_space: &str,
        width: u32,
        height: u32,
        bits_per_component: i64,
        samples: &[u8],
    ) -> Result<ObjectId> {
        let (mut payload, filters) = self.image_payload();
        payload.write(samples);
        let length = payload.len()? as i64;

        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => color_space,
            "BitsPerComponent" => bits_per_component,
            "Length" => length,
            "Filter" => filters,
        };
        Ok(self.add_object(dict, Some(Payload::Bytes(payload))))
    }

    /// Embed a strictly binary alpha channel as a 1-bit stencil mask. A set
    /// bit marks a fully transparent pixel, masking it out.
    fn add_bitmask_object(&mut self, width: u32, height: u32, alpha: &[u8]) -> Result<ObjectId> {
        let row_bytes = (width as usize).div_ceil(8);
        let mut packed = vec![0u8; row_bytes * height as usize];
        for y in 0..height as usize {
            for x in 0..width as usize {
                if alpha[y * width as usize + x] == 0 {
                    packed[y * row_bytes + x / 8] |= 0x80 >> (x % 8);
                }
            }
        }

        let (mut payload, filters) = self.image_payload();
        payload.write(&packed);
        let length = payload.len()? as i64;

        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "BitsPerComponent" => 1i64,
            "ImageMask" => true,
            "Length" => length,
            "Filter" => filters,
        };
        Ok(self.add_object(dict, Some(Payload::Bytes(payload))))
    }

    fn image_payload(&self) -> (BytesPayload, Vec<Object>) {
        let mut payload = BytesPayload::new(true);
        let mut filters = Vec::new();
        if self.compressed {
            payload.add_filter(Filter::FlateEncode);
            filters.push(Object::from(Filter::FlateEncode.decode_name()));
        }
        (payload, filters)
    }
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Rgba, RgbaImage};

    use super::*;
    use crate::document::PageSize;

    fn rgba_image(alphas: &[u8]) -> DynamicImage {
        let image = RgbaImage::from_fn(2, 2, |x, y| {
            Rgba([10, 20, 30, alphas[(y * 2 + x) as usize]])
        });
        DynamicImage::ImageRgba8(image)
    }

    #[test]
    fn opaque_alpha_produces_no_mask() {
        let mut doc = Document::with_compression(PageSize::A4, false);
        let handle = doc.add_image(rgba_image(&[255, 255, 255, 255]));
        let id = doc.image_object(handle).unwrap();
        let dict = &doc.get_object(id).unwrap().dict;
        assert!(!dict.has("Mask"));
        assert!(!dict.has("SMask"));
    }

    #[test]
    fn partial_alpha_produces_a_soft_mask() {
        let mut doc = Document::with_compression(PageSize::A4, false);
        let handle = doc.add_image(rgba_image(&[255, 128, 0, 255]));
        let id = doc.image_object(handle).unwrap();
        let dict = &doc.get_object(id).unwrap().dict;
        assert!(!dict.has("Mask"));
        let mask = dict.get("SMask").and_then(Object::as_reference).unwrap();
        let mask_dict = &doc.get_object(mask).unwrap().dict;
        assert_eq!(mask_dict.get("ColorSpace").and_then(Object::as_name), Some("DeviceGray"));
        assert!(!mask_dict.has("ImageMask"));
    }

    #[test]
    fn binary_alpha_produces_a_stencil_mask() {
        let mut doc = Document::with_compression(PageSize::A4, false);
        let handle = doc.add_image(rgba_image(&[255, 0, 0, 255]));
        let id = doc.image_object(handle).unwrap();
        let dict = &doc.get_object(id).unwrap().dict;
        assert!(!dict.has("SMask"));
        let mask = dict.get("Mask").and_then(Object::as_reference).unwrap();
        let mask_dict = &doc.get_object(mask).unwrap().dict;
        assert_eq!(mask_dict.get("ImageMask"), Some(&Object::Boolean(true)));
        assert_eq!(mask_dict.get("BitsPerComponent"), Some(&Object::Integer(1)));
        assert!(!mask_dict.has("ColorSpace"));
    }

    #[test]
    fn grayscale_sources_use_one_band() {
        let mut doc = Document::with_compression(PageSize::A4, false);
        let gray = GrayImage::from_raw(2, 1, vec![0, 255]).unwrap();
        let handle = doc.add_image(DynamicImage::ImageLuma8(gray));
        let id = doc.image_object(handle).unwrap();
        let dict = &doc.get_object(id).unwrap().dict;
        assert_eq!(dict.get("ColorSpace").and_then(Object::as_name), Some("DeviceGray"));
        assert_eq!(dict.get("Length"), Some(&Object::Integer(2)));
    }

    #[test]
    fn images_are_memoized_by_handle() {
        let mut doc = Document::with_compression(PageSize::A4, false);
        let handle = doc.add_image(rgba_image(&[255, 255, 255, 255]));
        let first = doc.image_object(handle).unwrap();
        let count = doc.objects().len();
        let second = doc.image_object(handle).unwrap();
        assert_eq!(first, second);
        assert_eq!(doc.objects().len(), count);
    }
}
