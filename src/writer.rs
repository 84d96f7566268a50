//! File serialization: header, object blocks, cross-reference table,
//! trailer and footer, with byte-exact offset accounting.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::Result;
use crate::dictionary;
use crate::document::Document;
use crate::object::PdfObject;
use crate::payload::Payload;
use crate::serializer::serialize_dictionary;
use crate::xref::{Xref, XrefEntry};

const HEADER: &str = "%PDF-1.4";
const FOOTER: &str = "%%EOF";

impl Document {
    /// Save the document to the specified file path.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<File> {
        let mut file = BufWriter::new(File::create(path)?);
        self.save_internal(&mut file)?;
        Ok(file.into_inner().map_err(std::io::Error::from)?)
    }

    /// Save the document to an arbitrary target.
    pub fn save_to<W: Write>(&mut self, target: &mut W) -> Result<()> {
        self.save_internal(target)
    }

    fn save_internal<W: Write>(&mut self, target: &mut W) -> Result<()> {
        self.close()?;

        let mut target = CountingWrite {
            inner: target,
            bytes_written: 0,
        };
        let mut xref = Xref::new(self.objects().len());

        writeln!(target, "{}", HEADER)?;

        for index in 0..self.objects().len() {
            let object = &self.objects()[index];
            let offset = target.bytes_written as u32;
            xref.insert(
                object.id.0,
                XrefEntry {
                    offset,
                    generation: object.id.1,
                },
            );
            let (bytes, is_stream) = self.payload_bytes(object);
            write_indirect_object(&mut target, object, bytes.as_deref(), is_stream)?;
        }

        let xref_start = target.bytes_written;
        write_xref(&mut target, &xref)?;

        let trailer = dictionary! {
            "Size" => self.objects().len() as i64 + 1,
            "Root" => self.catalog(),
        };
        writeln!(target, "trailer")?;
        writeln!(target, "{}", serialize_dictionary(&trailer))?;
        writeln!(target, "startxref")?;
        writeln!(target, "{}", xref_start)?;
        writeln!(target, "{}", FOOTER)?;

        debug!(
            "wrote {} objects, xref at offset {}",
            self.objects().len(),
            xref_start
        );
        Ok(())
    }

    /// Resolve an object's payload to the bytes that go into the file.
    fn payload_bytes<'a>(&'a self, object: &'a PdfObject) -> (Option<Cow<'a, [u8]>>, bool) {
        match &object.payload {
            None => (None, false),
            Some(Payload::Bytes(payload)) => (Some(Cow::Borrowed(payload.bytes())), payload.is_stream()),
            Some(Payload::Size { target }) => {
                let length = self.payload_len(*target);
                (Some(Cow::Owned(length.to_string().into_bytes())), false)
            }
        }
    }
}

fn write_indirect_object<W: Write>(
    file: &mut CountingWrite<&mut W>,
    object: &PdfObject,
    payload: Option<&[u8]>,
    is_stream: bool,
) -> Result<()> {
    writeln!(file, "{} {} obj", object.id.0, object.id.1)?;
    if !object.dict.is_empty() {
        file.write_all(serialize_dictionary(&object.dict).as_bytes())?;
        writeln!(file)?;
    }
    if let Some(bytes) = payload {
        // An empty payload is written without its stream markers; the length
        // accounting relies on this.
        if !bytes.is_empty() {
            if is_stream {
                writeln!(file, "stream")?;
            }
            file.write_all(bytes)?;
            if is_stream {
                write!(file, "endstream")?;
            }
            writeln!(file)?;
        }
    }
    writeln!(file, "endobj")?;
    Ok(())
}

fn write_xref<W: Write>(file: &mut CountingWrite<&mut W>, xref: &Xref) -> Result<()> {
    writeln!(file, "xref")?;
    writeln!(file, "0 {}", xref.size)?;

    // Each entry is exactly 20 bytes: 10-digit offset, 5-digit generation,
    // the entry kind, a space, and the line terminator.
    writeln!(file, "{:>010} {:>05} f ", 0, 65535)?;
    for entry in xref.entries.values() {
        writeln!(file, "{:>010} {:>05} n ", entry.offset, entry.generation)?;
    }
    Ok(())
}

pub struct CountingWrite<W: Write> {
    inner: W,
    bytes_written: usize,
}

impl<W: Write> Write for CountingWrite<W> {
    #[inline]
    fn write(&mut self, buffer: &[u8]) -> std::io::Result<usize> {
        let result = self.inner.write(buffer);
        if let Ok(bytes) = result {
            self.bytes_written += bytes;
        }
        result
    }

    #[inline]
    fn write_all(&mut self, buffer: &[u8]) -> std::io::Result<()> {
        self.bytes_written += buffer.len();
        // If this returns `Err` we can’t know how many bytes were actually
        // written (if any) but that doesn’t matter since the whole document
        // is aborted anyway.
        self.inner.write_all(buffer)
    }

    #[inline]
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
