//! In-memory XML element tree.
//!
//! Elements are stored in a flat arena in document (pre-)order, so every
//! element's descendants occupy the contiguous range `index + 1..end`. Tag and
//! attribute lookups are linear scans of that range.

use crate::domain::ports::DocumentNode;
use crate::utils::error::{ProblemsError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone)]
struct ElementData {
    name: String,
    attributes: Vec<(String, String)>,
    parent: Option<usize>,
    end: usize,
}

#[derive(Debug, Clone)]
pub struct XmlDocument {
    elements: Vec<ElementData>,
}

impl XmlDocument {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut elements: Vec<ElementData> = Vec::new();
        let mut open: Vec<usize> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => {
                    let index = push_element(&mut elements, e, open.last().copied())?;
                    open.push(index);
                }
                Event::Empty(ref e) => {
                    let index = push_element(&mut elements, e, open.last().copied())?;
                    elements[index].end = index + 1;
                }
                Event::End(_) => {
                    if let Some(index) = open.pop() {
                        elements[index].end = elements.len();
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !open.is_empty() {
            return Err(ProblemsError::MalformedDocument {
                message: format!("{} element(s) left unclosed", open.len()),
            });
        }
        if elements.is_empty() {
            return Err(ProblemsError::MalformedDocument {
                message: "document has no root element".to_string(),
            });
        }

        tracing::debug!("Parsed XML document with {} elements", elements.len());
        Ok(Self { elements })
    }

    pub fn root(&self) -> XmlElement<'_> {
        XmlElement {
            doc: self,
            index: 0,
        }
    }
}

fn push_element(
    elements: &mut Vec<ElementData>,
    start: &BytesStart<'_>,
    parent: Option<usize>,
) -> Result<usize> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    let index = elements.len();
    elements.push(ElementData {
        name,
        attributes,
        parent,
        end: index + 1,
    });
    Ok(index)
}

/// A borrowed handle to one element of an [`XmlDocument`].
#[derive(Debug, Clone, Copy)]
pub struct XmlElement<'a> {
    doc: &'a XmlDocument,
    index: usize,
}

impl<'a> XmlElement<'a> {
    pub fn name(&self) -> &'a str {
        &self.data().name
    }

    pub fn parent(&self) -> Option<XmlElement<'a>> {
        self.data().parent.map(|index| self.at(index))
    }

    fn data(&self) -> &'a ElementData {
        &self.doc.elements[self.index]
    }

    fn at(&self, index: usize) -> XmlElement<'a> {
        XmlElement {
            doc: self.doc,
            index,
        }
    }

    fn descendants(&self) -> impl Iterator<Item = XmlElement<'a>> + 'a {
        let doc = self.doc;
        (self.index + 1..self.data().end).map(move |index| XmlElement { doc, index })
    }
}

impl PartialEq for XmlElement<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.index == other.index
    }
}

impl<'a> DocumentNode for XmlElement<'a> {
    fn template(&self, template_id: &str) -> Option<Self> {
        self.descendants()
            .find(|el| el.name() == "templateId" && el.attr("root") == Some(template_id))
            .and_then(|el| el.parent())
    }

    fn find_all(&self, tag: &str) -> Vec<Self> {
        self.descendants().filter(|el| el.name() == tag).collect()
    }

    fn find(&self, tag: &str) -> Option<Self> {
        self.descendants().find(|el| el.name() == tag)
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.data()
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}
