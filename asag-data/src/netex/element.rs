//! Minimal owned element tree for recognised NeTEx subtrees.
//!
//! Only subtrees rooted at a recognised element are materialised. Names are
//! stored without namespace prefixes.

use quick_xml::events::{BytesCData, BytesStart, BytesText};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    pub(crate) fn from_start(start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }

    pub(crate) fn push_text(&mut self, text: &BytesText<'_>) -> Result<(), quick_xml::Error> {
        self.text.push_str(&text.unescape()?);
        Ok(())
    }

    pub(crate) fn push_cdata(&mut self, cdata: &BytesCData<'_>) {
        self.text.push_str(&String::from_utf8_lossy(cdata.as_ref()));
    }

    pub(crate) fn push_child(&mut self, child: Self) {
        self.children.push(child);
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn children(&self) -> &[Self] {
        &self.children
    }

    pub(crate) fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.name == name)
    }

    pub(crate) fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Follow a chain of child names.
    pub(crate) fn descend(&self, path: &[&str]) -> Option<&Self> {
        path.iter()
            .try_fold(self, |element, name| element.child(name))
    }

    /// Trimmed text content; `None` when blank.
    pub(crate) fn text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    pub(crate) fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(Self::text)
    }
}
