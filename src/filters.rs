//! Stream filters: reversible byte transforms applied to payloads before
//! they are written out.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;

use crate::Result;

/// A single stage in a payload's filter chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// zlib/deflate compression, decoded by `/FlateDecode`.
    FlateEncode,
}

impl Filter {
    /// The decode filter name declared in the stream dictionary.
    pub fn decode_name(self) -> &'static str {
        match self {
            Filter::FlateEncode => "FlateDecode",
        }
    }

    pub(crate) fn encode(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Filter::FlateEncode => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
                encoder.write_all(data)?;
                Ok(encoder.finish()?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn flate_roundtrip() {
        let data = b"q\n0 0 0 rg 0 0 0 RG\n2.834645669291339 0 0 -2.834645669291339 0 841 cm\n";
        let encoded = Filter::FlateEncode.encode(data).unwrap();
        let mut decoded = Vec::new();
        flate2::read::ZlibDecoder::new(encoded.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, data);
    }
}
