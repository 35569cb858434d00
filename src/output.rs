//! Per-render output collections.
//!
//! A [`ParserOutput`] is the scratch store that parser functions write to
//! while a page is being parsed. An [`OutputPage`] collects what the page
//! output hooks add to the document head. Both are created fresh for every
//! render and owned by the caller.

use crate::title::Title;
use core::fmt::{self, Write as _};
use indexmap::IndexMap;

/// Metadata recorded by parser functions during a single render.
///
/// Every slot can be written at most once; later writes are ignored.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ParserOutput {
    /// The DB key of the Open Graph image file.
    meta_image: Option<String>,
    /// The Open Graph title.
    meta_title: Option<String>,
    /// The Open Graph description, already transformed.
    meta_desc: Option<String>,
}

impl ParserOutput {
    /// The DB key of the recorded image, if any.
    pub fn meta_image(&self) -> Option<&str> {
        self.meta_image.as_deref()
    }

    /// The recorded title, if any.
    pub fn meta_title(&self) -> Option<&str> {
        self.meta_title.as_deref()
    }

    /// The recorded description, if any.
    pub fn meta_desc(&self) -> Option<&str> {
        self.meta_desc.as_deref()
    }

    /// Records the image DB key, unless one was already recorded. Returns
    /// true if the value was stored.
    pub fn set_meta_image(&mut self, value: String) -> bool {
        set_once(&mut self.meta_image, value)
    }

    /// Records the title, unless one was already recorded. Returns true if
    /// the value was stored.
    pub fn set_meta_title(&mut self, value: String) -> bool {
        set_once(&mut self.meta_title, value)
    }

    /// Records the description, unless one was already recorded. Returns true
    /// if the value was stored.
    pub fn set_meta_desc(&mut self, value: String) -> bool {
        set_once(&mut self.meta_desc, value)
    }
}

/// Stores `value` in `slot` if the slot is empty.
fn set_once(slot: &mut Option<String>, value: String) -> bool {
    if slot.is_some() {
        false
    } else {
        *slot = Some(value);
        true
    }
}

/// The output of a page render, as seen by page output hooks.
#[derive(Debug)]
pub struct OutputPage {
    /// Named HTML fragments to insert into the document head, in insertion
    /// order.
    head_items: IndexMap<String, String>,
    /// The title of the rendered page.
    title: Title,
    /// XML namespace declarations for the document root.
    xml_namespaces: IndexMap<String, String>,
}

impl OutputPage {
    /// Creates a new empty output for the page `title`.
    pub fn new(title: Title) -> Self {
        Self {
            head_items: <_>::default(),
            title,
            xml_namespaces: <_>::default(),
        }
    }

    /// Adds or replaces the head item with the given name. A replaced item
    /// keeps its original position.
    pub fn add_head_item(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.head_items.insert(name.into(), value.into());
    }

    /// Declares an XML namespace on the document root.
    pub fn add_xml_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.xml_namespaces.insert(prefix.into(), uri.into());
    }

    /// The head item with the given name, if any.
    pub fn head_item(&self, name: &str) -> Option<&str> {
        self.head_items.get(name).map(String::as_str)
    }

    /// All head items, in insertion order.
    pub fn head_items(&self) -> impl Iterator<Item = (&str, &str)> {
        self.head_items
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// The title of the rendered page.
    pub fn title(&self) -> &Title {
        &self.title
    }

    /// All XML namespace declarations, in insertion order.
    pub fn xml_namespaces(&self) -> &IndexMap<String, String> {
        &self.xml_namespaces
    }

    /// Writes all head items to `f`, in insertion order.
    pub fn write_head<W: fmt::Write + ?Sized>(&self, f: &mut W) -> Result<(), fmt::Error> {
        for item in self.head_items.values() {
            f.write_str(item)?;
        }
        Ok(())
    }
}

/// Serialises a void HTML element with the given attributes. Attribute
/// values are escaped.
pub fn element(name: &str, attributes: &[(&str, &str)]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write!(out, "<{name}")?;
    for (key, value) in attributes {
        write!(
            out,
            r#" {key}="{}""#,
            html_escape::encode_double_quoted_attribute(value)
        )?;
    }
    out.push('>');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_write_wins() {
        let mut output = ParserOutput::default();
        assert!(output.set_meta_title("One".into()));
        assert!(!output.set_meta_title("Two".into()));
        assert_eq!(output.meta_title(), Some("One"));
        assert_eq!(output.meta_image(), None);
        assert_eq!(output.meta_desc(), None);
    }

    #[test]
    fn empty_value_still_counts() {
        let mut output = ParserOutput::default();
        assert!(output.set_meta_desc(String::new()));
        assert!(!output.set_meta_desc("Later".into()));
        assert_eq!(output.meta_desc(), Some(""));
    }

    #[test]
    fn head_items_keep_position() {
        let mut out = OutputPage::new(Title::new_from_text("Test", None).unwrap());
        out.add_head_item("a", "1");
        out.add_head_item("b", "2");
        out.add_head_item("a", "3");
        assert_eq!(out.head_items().collect::<Vec<_>>(), [("a", "3"), ("b", "2")]);

        let mut head = String::new();
        out.write_head(&mut head).unwrap();
        assert_eq!(head, "32");
    }

    #[test]
    fn element_escaping() {
        assert_eq!(
            element("meta", &[("property", "og:title"), ("content", r#"A "b" & <c>"#)]).unwrap(),
            r#"<meta property="og:title" content="A &quot;b&quot; &amp; &lt;c&gt;">"#
        );
    }
}
