//! Byte payloads attached to document objects.

use crate::Result;
use crate::filters::Filter;
use crate::object::ObjectId;

/// Payload of a document object.
#[derive(Debug, Clone)]
pub enum Payload {
    /// An appendable byte buffer, optionally run through a filter chain
    /// before being read back.
    Bytes(BytesPayload),
    /// Renders the decimal byte length of another object's closed payload.
    /// Created once, never written to; used for `/Length` entries.
    Size { target: ObjectId },
}

impl Payload {
    pub fn size_of(target: ObjectId) -> Payload {
        Payload::Size { target }
    }
}

/// Raw bytes plus the ordered filter chain to run them through.
///
/// Writing appends to the raw bytes. Closing runs the filter chain once and
/// caches the result; a second close is a no-op. The payload must be closed
/// before its bytes or length are read.
#[derive(Debug, Clone)]
pub struct BytesPayload {
    data: Vec<u8>,
    filters: Vec<Filter>,
    is_stream: bool,
    closed: Option<Vec<u8>>,
}

impl BytesPayload {
    pub fn new(is_stream: bool) -> BytesPayload {
        BytesPayload {
            data: Vec::new(),
            filters: Vec::new(),
            is_stream,
            closed: None,
        }
    }

    /// Append a filter stage; applies to all bytes, including those already
    /// written.
    pub fn add_filter(&mut self, filter: Filter) {
        debug_assert!(self.closed.is_none(), "filter added after close");
        self.filters.push(filter);
    }

    pub fn write(&mut self, bytes: &[u8]) {
        debug_assert!(self.closed.is_none(), "payload written after close");
        self.data.extend_from_slice(bytes);
    }

    /// Run the filter chain and cache the result. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if self.closed.is_some() {
            return Ok(());
        }
        let mut out = self.data.clone();
        for filter in &self.filters {
            out = filter.encode(&out)?;
        }
        self.closed = Some(out);
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_some()
    }

    pub fn is_stream(&self) -> bool {
        self.is_stream
    }

    /// The filtered bytes after close; the raw bytes before.
    pub fn bytes(&self) -> &[u8] {
        self.closed.as_deref().unwrap_or(&self.data)
    }

    /// Closes the payload on first use, then reports the filtered length.
    pub fn len(&mut self) -> Result<usize> {
        self.close()?;
        Ok(self.bytes().len())
    }

    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn close_is_idempotent() {
        let mut payload = BytesPayload::new(true);
        payload.add_filter(Filter::FlateEncode);
        payload.write(b"0 0 m 10 10 l h");
        payload.close().unwrap();
        let first = payload.bytes().to_vec();
        payload.close().unwrap();
        assert_eq!(payload.bytes(), first.as_slice());
    }

    #[test]
    fn filter_chain_runs_on_close() {
        let mut payload = BytesPayload::new(true);
        payload.add_filter(Filter::FlateEncode);
        payload.write(b"hello ");
        payload.write(b"streams");
        assert_eq!(payload.len().unwrap(), payload.bytes().len());

        let mut decoded = Vec::new();
        flate2::read::ZlibDecoder::new(payload.bytes())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, b"hello streams");
    }

    #[test]
    fn unfiltered_payload_passes_through() {
        let mut payload = BytesPayload::new(false);
        payload.write(b"595");
        payload.close().unwrap();
        assert_eq!(payload.bytes(), b"595");
        assert!(!payload.is_stream());
    }
}
