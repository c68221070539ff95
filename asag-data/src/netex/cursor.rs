//! Single-pass cursor over a NeTEx document.

use std::io::BufRead;

use asag_core::{EntityKind, NetexEntity};
use quick_xml::{Reader, events::Event};

use super::decode::decode_entity;
use super::element::XmlElement;
use super::error::ParseError;

/// Lazily yields recognised entities in document order.
///
/// `StopPlace`, `Parking` and `TariffZone` elements are decoded wherever
/// they appear, whether in a site frame under the root or nested in a
/// composite frame. Everything else is skipped without being built. After
/// the first error the cursor is exhausted.
///
/// # Examples
///
/// ```
/// use asag_data::netex::NetexCursor;
///
/// let xml = r#"<PublicationDelivery><dataObjects><SiteFrame><tariffZones>
///     <TariffZone id="NSR:TariffZone:1"><Name>Zone 1</Name></TariffZone>
/// </tariffZones></SiteFrame></dataObjects></PublicationDelivery>"#;
///
/// let entities: Vec<_> = NetexCursor::new(xml.as_bytes()).collect::<Result<_, _>>()?;
/// assert_eq!(entities.len(), 1);
/// assert_eq!(entities[0].zone().id, "NSR:TariffZone:1");
/// # Ok::<(), asag_data::netex::ParseError>(())
/// ```
pub struct NetexCursor<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
    finished: bool,
}

impl<R: BufRead> std::fmt::Debug for NetexCursor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetexCursor")
            .field("position", &self.reader.buffer_position())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<R: BufRead> NetexCursor<R> {
    /// Wrap a buffered byte source.
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            buffer: Vec::new(),
            finished: false,
        }
    }

    fn next_recognised(&mut self) -> Result<Option<NetexEntity>, ParseError> {
        loop {
            self.buffer.clear();
            let (kind, root, has_children) = {
                let event = self
                    .reader
                    .read_event_into(&mut self.buffer)
                    .map_err(|source| xml_error(&self.reader, source))?;
                match event {
                    Event::Start(ref start) | Event::Empty(ref start) => {
                        let Some(kind) =
                            EntityKind::from_element_name(start.local_name().as_ref())
                        else {
                            continue;
                        };
                        let root = XmlElement::from_start(start)
                            .map_err(|source| xml_error(&self.reader, source))?;
                        (kind, root, matches!(event, Event::Start(_)))
                    }
                    Event::Eof => return Ok(None),
                    _ => continue,
                }
            };
            let element = if has_children {
                self.read_subtree(kind, root)?
            } else {
                root
            };
            return decode_entity(kind, &element).map(Some);
        }
    }

    /// Materialise the rest of a recognised element, up to its end tag.
    fn read_subtree(
        &mut self,
        kind: EntityKind,
        root: XmlElement,
    ) -> Result<XmlElement, ParseError> {
        let mut stack = vec![root];
        loop {
            self.buffer.clear();
            let event = match self.reader.read_event_into(&mut self.buffer) {
                Ok(event) => event,
                Err(source) => return Err(xml_error(&self.reader, source)),
            };
            match event {
                Event::Start(ref start) => {
                    let child = XmlElement::from_start(start);
                    match child {
                        Ok(child) => stack.push(child),
                        Err(source) => return Err(xml_error(&self.reader, source)),
                    }
                }
                Event::Empty(ref start) => {
                    let child = XmlElement::from_start(start);
                    match (child, stack.last_mut()) {
                        (Ok(child), Some(parent)) => parent.push_child(child),
                        (Ok(_), None) => return Err(ParseError::UnexpectedEof { kind }),
                        (Err(source), _) => return Err(xml_error(&self.reader, source)),
                    }
                }
                Event::Text(ref text) => {
                    if let Some(current) = stack.last_mut()
                        && let Err(source) = current.push_text(text)
                    {
                        return Err(xml_error(&self.reader, source));
                    }
                }
                Event::CData(ref cdata) => {
                    if let Some(current) = stack.last_mut() {
                        current.push_cdata(cdata);
                    }
                }
                Event::End(_) => {
                    let Some(done) = stack.pop() else {
                        return Err(ParseError::UnexpectedEof { kind });
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.push_child(done),
                        None => return Ok(done),
                    }
                }
                Event::Eof => return Err(ParseError::UnexpectedEof { kind }),
                _ => {}
            }
        }
    }
}

fn xml_error<R>(reader: &Reader<R>, source: quick_xml::Error) -> ParseError {
    ParseError::Xml {
        position: reader.buffer_position(),
        source,
    }
}

impl<R: BufRead> Iterator for NetexCursor<R> {
    type Item = Result<NetexEntity, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_recognised() {
            Ok(Some(entity)) => Some(Ok(entity)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for NetexCursor<R> {}
