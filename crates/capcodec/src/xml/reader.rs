//! Token source for the XML engine.
//!
//! Wraps `quick-xml`'s namespace-aware reader and reduces its events to the
//! four shapes the engine cares about. Names are flattened, namespace
//! declarations are dropped and entity references are resolved into text.
use alloc::{
    borrow::Cow,
    format,
    rc::Rc,
    string::{String, ToString},
    vec::Vec,
};
use core::cell::Cell;
use std::io::{self, BufRead, Read};

use quick_xml::{
    escape::{resolve_predefined_entity, unescape},
    events::Event,
    name::{QName, ResolveResult},
    reader::NsReader,
};

use crate::error::{Error, Position, Result};

/// An attribute with its flattened name and unescaped value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Attr {
    pub(crate) name: String,
    pub(crate) value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Start { name: String, attrs: Vec<Attr> },
    End { name: String },
    Text(String),
    Eof,
}

/// Counts lines and columns of everything the parser consumes.
#[derive(Debug)]
pub(crate) struct Tracked<R> {
    inner: R,
    cursor: Rc<Cell<Position>>,
}

fn advance(cursor: &Cell<Position>, consumed: &[u8]) {
    let mut pos = cursor.get();
    pos.offset += consumed.len();
    for &b in consumed {
        if b == b'\n' {
            pos.line += 1;
            pos.column = 1;
        } else if b & 0xC0 != 0x80 {
            pos.column += 1;
        }
    }
    cursor.set(pos);
}

impl<R: Read> Read for Tracked<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        advance(&self.cursor, &buf[..n]);
        Ok(n)
    }
}

impl<R: BufRead> BufRead for Tracked<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        // The buffer is already filled, so this does no I/O.
        if let Ok(buf) = self.inner.fill_buf() {
            advance(&self.cursor, &buf[..amt.min(buf.len())]);
        }
        self.inner.consume(amt);
    }
}

pub(crate) struct TokenReader<R> {
    reader: NsReader<Tracked<R>>,
    cursor: Rc<Cell<Position>>,
    buf: Vec<u8>,
}

impl<R: BufRead> TokenReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        let cursor = Rc::new(Cell::new(Position::default()));
        let mut reader = NsReader::from_reader(Tracked {
            inner,
            cursor: Rc::clone(&cursor),
        });
        // No trimming here: references split one run of text into several
        // events, so the engine trims whole runs.
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.check_end_names = false;
        Self {
            reader,
            cursor,
            buf: Vec::new(),
        }
    }

    /// Position just past the last token read.
    pub(crate) fn position(&self) -> Position {
        self.cursor.get()
    }

    pub(crate) fn next_token(&mut self) -> Result<Token> {
        loop {
            self.buf.clear();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|err| syntax(self.cursor.get(), err))?;
            let token = match event {
                Event::Start(e) => {
                    let name = element_name(&self.reader, e.name(), self.cursor.get())?;
                    let mut attrs = Vec::new();
                    for attr in e.attributes().with_checks(false) {
                        let attr = attr.map_err(|err| syntax(self.cursor.get(), err))?;
                        let key = attr.key.as_ref();
                        if key == b"xmlns" || key.starts_with(b"xmlns:") {
                            continue;
                        }
                        let (ns, local) = self.reader.resolver().resolve_attribute(attr.key);
                        let name = flatten(ns, local.as_ref(), self.cursor.get())?;
                        let raw = utf8(&attr.value, self.cursor.get())?;
                        let value = unescape(raw)
                            .map_err(|err| syntax(self.cursor.get(), err))?
                            .into_owned();
                        attrs.push(Attr { name, value });
                    }
                    Token::Start { name, attrs }
                }
                Event::End(e) => Token::End {
                    name: element_name(&self.reader, e.name(), self.cursor.get())?,
                },
                Event::Text(e) => {
                    let text = utf8(&e, self.cursor.get())?;
                    if text.is_empty() {
                        continue;
                    }
                    Token::Text(text.to_string())
                }
                Event::CData(e) => {
                    let text = utf8(&e, self.cursor.get())?;
                    Token::Text(text.to_string())
                }
                Event::GeneralRef(e) => {
                    let name = utf8(&e, self.cursor.get())?;
                    Token::Text(resolve_reference(name, self.cursor.get())?.into_owned())
                }
                Event::Eof => Token::Eof,
                // Declarations, comments, processing instructions and doctypes
                // carry no values.
                _ => continue,
            };
            return Ok(token);
        }
    }
}

fn element_name<R>(reader: &NsReader<R>, name: QName<'_>, at: Position) -> Result<String> {
    let (ns, local) = reader.resolver().resolve_element(name);
    flatten(ns, local.as_ref(), at)
}

/// Reduces a resolved name to `"{namespace} {local}"`, or `local` when no
/// namespace is bound. An undeclared prefix stands in for its namespace.
fn flatten(ns: ResolveResult<'_>, local: &[u8], at: Position) -> Result<String> {
    let local = utf8(local, at)?;
    match ns {
        ResolveResult::Bound(ns) => Ok(format!("{} {local}", utf8(ns.as_ref(), at)?)),
        ResolveResult::Unbound => Ok(local.to_string()),
        ResolveResult::Unknown(prefix) => Ok(format!("{} {local}", utf8(&prefix, at)?)),
    }
}

fn resolve_reference(name: &str, at: Position) -> Result<Cow<'static, str>> {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        return parsed
            .and_then(char::from_u32)
            .map(|c| Cow::Owned(c.to_string()))
            .ok_or_else(|| syntax(at, format!("invalid character reference &{name};")));
    }
    resolve_predefined_entity(name)
        .map(Cow::Borrowed)
        .ok_or_else(|| syntax(at, format!("unknown entity &{name};")))
}

fn utf8(bytes: &[u8], at: Position) -> Result<&str> {
    core::str::from_utf8(bytes).map_err(|err| syntax(at, err))
}

fn syntax(position: Position, err: impl ToString) -> Error {
    Error::Syntax {
        message: err.to_string(),
        position,
    }
}
