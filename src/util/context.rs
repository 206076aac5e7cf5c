use std::borrow::Cow;

use quick_xml::events::{BytesDecl, BytesEnd, BytesText, Event};
use quick_xml::Writer;

use crate::util::allocate::IdAllocator;
use crate::util::helper::{format_number, start_tag, Attributes};
use crate::{ExportError, Result};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// Where a document currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    NoPage,
    PageOpen,
    AllPagesClosed,
}

/// One page of the output: a markup document of its own.
pub struct Page {
    writer: Writer<Vec<u8>>,
    pub width: f32,
    pub height: f32,
    open: bool,
}

impl Page {
    /// Start a new page and write its root element.
    fn new(width: f32, height: f32) -> Result<Self> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 1);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = Attributes::new();
        root.insert("width", format_number(width));
        root.insert("height", format_number(height));
        root.insert("version", "1.1".to_string());
        root.insert("xmlns", SVG_NAMESPACE.to_string());
        root.insert("xmlns:xlink", XLINK_NAMESPACE.to_string());
        writer.write_event(Event::Start(start_tag("svg", &root)))?;

        Ok(Self { writer, width, height, open: true })
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open an element that will contain children.
    pub fn begin(&mut self, name: &str, attributes: &Attributes) -> Result<()> {
        self.writer.write_event(Event::Start(start_tag(name, attributes)))?;
        Ok(())
    }

    pub fn end(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Write an element without children.
    pub fn empty(&mut self, name: &str, attributes: &Attributes) -> Result<()> {
        self.writer.write_event(Event::Empty(start_tag(name, attributes)))?;
        Ok(())
    }

    /// Write an element that only contains text.
    pub fn text(&mut self, name: &str, attributes: &Attributes, text: &str) -> Result<()> {
        self.begin(name, attributes)?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// Close the root element. Closing twice does nothing.
    fn close(&mut self) -> Result<()> {
        if self.open {
            self.end("svg")?;
            self.open = false;
        }
        Ok(())
    }

    /// The markup written so far.
    pub fn markup(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.writer.get_ref())
    }
}

/// All pages of one document and the identifiers handed out for it.
pub struct Context {
    pages: Vec<Page>,
    ids: IdAllocator,
}

impl Context {
    pub fn new(ids: IdAllocator) -> Self {
        Self { pages: Vec::new(), ids }
    }

    pub fn alloc_id(&mut self) -> String {
        self.ids.alloc_id()
    }

    pub fn state(&self) -> DocumentState {
        match self.pages.last() {
            None => DocumentState::NoPage,
            Some(page) if page.is_open() => DocumentState::PageOpen,
            Some(_) => DocumentState::AllPagesClosed,
        }
    }

    /// Close the current page (if any) and open a new one.
    pub fn new_page(&mut self, width: f32, height: f32) -> Result<&mut Page> {
        self.close()?;
        self.pages.push(Page::new(width, height)?);
        log::debug!("opened page {} ({}x{})", self.pages.len(), width, height);
        self.current_page()
    }

    /// The page drawing operations write into.
    pub fn current_page(&mut self) -> Result<&mut Page> {
        let count = self.pages.len();
        match self.pages.last_mut() {
            None => Err(ExportError::NoPage),
            Some(page) if !page.is_open() => Err(ExportError::PageClosed(count)),
            Some(page) => Ok(page),
        }
    }

    /// Close the root element of the current page.
    pub fn close(&mut self) -> Result<()> {
        if let Some(page) = self.pages.last_mut() {
            page.close()?;
        }
        Ok(())
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }
}
