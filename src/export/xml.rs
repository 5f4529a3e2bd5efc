//! Per-table XML content descriptors.
//!
//! One XML document per table records, for each row, either a cell's inline
//! payload or a file reference to its externalized content. Descriptors are
//! emitted in row-then-column order with no buffering beyond the current
//! element, so table size never affects memory use.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::write::{ContainerSink, ContentDigest};

use super::error::ExportError;
use super::types::CellDescriptor;

/// Namespace of table content documents.
pub const CONTENT_XMLNS: &str = "http://www.rowpack.org/xmlns/content/1.0";

/// Content document format version.
const CONTENT_VERSION: &str = "1.0";

/// Streaming writer for one table's content-descriptor XML.
pub struct TableXmlWriter {
    writer: Writer<Box<dyn ContainerSink>>,
}

impl TableXmlWriter {
    /// Start a table document on the given sink, writing the XML declaration
    /// and the `<table>` root element.
    pub fn new(
        sink: Box<dyn ContainerSink>,
        pretty: bool,
        schema_name: &str,
        table_name: &str,
    ) -> Result<Self, ExportError> {
        let mut writer = if pretty {
            Writer::new_with_indent(sink, b' ', 2)
        } else {
            Writer::new(sink)
        };

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("table");
        root.push_attribute(("xmlns", CONTENT_XMLNS));
        root.push_attribute(("version", CONTENT_VERSION));
        root.push_attribute(("schema", schema_name));
        root.push_attribute(("name", table_name));
        writer.write_event(Event::Start(root))?;

        Ok(Self { writer })
    }

    /// Open a `<row>` element.
    pub fn begin_row(&mut self) -> Result<(), ExportError> {
        self.writer.write_event(Event::Start(BytesStart::new("row")))?;
        Ok(())
    }

    /// Emit one cell descriptor. NULL descriptors produce no element.
    pub fn write_cell(
        &mut self,
        column_index: usize,
        descriptor: &CellDescriptor,
    ) -> Result<(), ExportError> {
        let tag = format!("c{column_index}");
        match descriptor {
            CellDescriptor::Null => {}
            CellDescriptor::Inline(text) => {
                self.writer
                    .write_event(Event::Start(BytesStart::new(tag.as_str())))?;
                self.writer.write_event(Event::Text(BytesText::new(text)))?;
                self.writer
                    .write_event(Event::End(BytesEnd::new(tag.as_str())))?;
            }
            CellDescriptor::Lob {
                file,
                length,
                digest,
            } => {
                let length_attr = length.to_string();
                let digest_attr = digest.as_ref().map(ToString::to_string);

                let mut element = BytesStart::new(tag.as_str());
                element.push_attribute(("file", file.as_str()));
                element.push_attribute(("length", length_attr.as_str()));
                if let Some(digest) = &digest_attr {
                    element.push_attribute(("messageDigest", digest.as_str()));
                }
                self.writer.write_event(Event::Empty(element))?;
            }
        }
        Ok(())
    }

    /// Close the current `<row>` element.
    pub fn end_row(&mut self) -> Result<(), ExportError> {
        self.writer.write_event(Event::End(BytesEnd::new("row")))?;
        Ok(())
    }

    /// Close the document and finish the underlying sink.
    pub fn finish(mut self) -> Result<Option<ContentDigest>, ExportError> {
        self.writer
            .write_event(Event::End(BytesEnd::new("table")))?;
        let sink = self.writer.into_inner();
        Ok(sink.finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::WriteError;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// Sink that surrenders its bytes into a shared buffer on finish.
    struct BufferSink {
        buffer: Vec<u8>,
        out: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferSink {
        fn pair() -> (Box<Self>, Arc<Mutex<Vec<u8>>>) {
            let out = Arc::new(Mutex::new(Vec::new()));
            (
                Box::new(Self {
                    buffer: Vec::new(),
                    out: Arc::clone(&out),
                }),
                out,
            )
        }
    }

    impl Write for BufferSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.buffer.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl ContainerSink for BufferSink {
        fn finish(self: Box<Self>) -> Result<Option<ContentDigest>, WriteError> {
            self.out.lock().unwrap().extend_from_slice(&self.buffer);
            Ok(None)
        }
    }

    fn render(pretty: bool, descriptors: &[(usize, CellDescriptor)]) -> String {
        let (sink, out) = BufferSink::pair();
        let mut xml = TableXmlWriter::new(sink, pretty, "hr", "personnel").unwrap();
        xml.begin_row().unwrap();
        for (index, descriptor) in descriptors {
            xml.write_cell(*index, descriptor).unwrap();
        }
        xml.end_row().unwrap();
        xml.finish().unwrap();
        let bytes = out.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_inline_and_null_cells() {
        let rendered = render(
            false,
            &[
                (1, CellDescriptor::Inline("Ada Lovelace".to_string())),
                (2, CellDescriptor::Null),
                (3, CellDescriptor::Inline("a < b & c".to_string())),
            ],
        );

        assert!(rendered.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(rendered.contains("<c1>Ada Lovelace</c1>"));
        assert!(!rendered.contains("<c2"));
        assert!(rendered.contains("<c3>a &lt; b &amp; c</c3>"));
        assert!(rendered.ends_with("</table>"));
    }

    #[test]
    fn test_lob_reference_attributes() {
        use crate::write::DigestAlgorithm;

        let rendered = render(
            false,
            &[(
                2,
                CellDescriptor::Lob {
                    file: "../out-lobs-0001/content/schema0/table0/lob2/record1.bin".to_string(),
                    length: 614_400,
                    digest: Some(ContentDigest {
                        algorithm: DigestAlgorithm::Sha256,
                        hex: "AB12".to_string(),
                    }),
                },
            )],
        );

        assert!(rendered.contains(
            "<c2 file=\"../out-lobs-0001/content/schema0/table0/lob2/record1.bin\" \
             length=\"614400\" messageDigest=\"SHA-256AB12\"/>"
        ));
    }

    #[test]
    fn test_lob_reference_without_digest_omits_attribute() {
        let rendered = render(
            false,
            &[(
                1,
                CellDescriptor::Lob {
                    file: "../x/record1.bin".to_string(),
                    length: 10,
                    digest: None,
                },
            )],
        );
        assert!(!rendered.contains("messageDigest"));
    }

    #[test]
    fn test_pretty_output_indents_rows() {
        let rendered = render(true, &[(1, CellDescriptor::Inline("x".to_string()))]);
        assert!(rendered.contains("\n  <row>"));
        assert!(rendered.contains("\n    <c1>x</c1>"));
    }
}
