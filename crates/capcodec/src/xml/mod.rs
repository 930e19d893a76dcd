//! Streaming XML decoding and encoding.
//!
//! [`XmlDecoder`] maps elements onto aggregates: attributes and child
//! elements of an element are offered to the destination's
//! [`FieldDecoder`](crate::FieldDecoder) under their flattened names
//! (`"{namespace} {local}"`, or just `local`), attributes first. Child
//! elements fall back to [`ElementDecoder`](crate::ElementDecoder) when the
//! destination has no field capability, so repeated elements fill a `Vec`.
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use capcodec::xml::Document;
//!
//! let mut doc: Document<BTreeMap<String, String>> = Document::default();
//! capcodec::xml::from_str(r#"<user id="7"><name>Ada</name></user>"#, &mut doc).unwrap();
//! assert_eq!(doc.name.as_deref(), Some("user"));
//! assert_eq!(doc.root["id"], "7");
//! assert_eq!(doc.root["name"], "Ada");
//! ```
mod document;
mod encoder;
mod reader;

use alloc::{boxed::Box, string::String, vec::Vec};
use std::io::BufRead;

pub use document::Document;
pub use encoder::{XmlEncoder, to_string};
use reader::{Attr, Token, TokenReader};
use tracing::{debug, trace};

use crate::{
    codec::{Codec, Decoder},
    decode::{accepts_text, append_text, decode_text_value},
    error::{Error, Position, Result},
    once::Once,
    options::DecoderOptions,
    resolve::{Resolver, resolve},
};

#[derive(Debug, Default)]
struct Frame {
    /// `None` for the document level.
    name: Option<String>,
    attrs: Vec<Attr>,
    children: usize,
}

/// Text read inside one element.
///
/// Without trimming, fragments go straight to an appending destination or
/// into `leaf`. With trimming, consecutive fragments are joined into `run`
/// and trimmed as a whole when markup ends the run.
struct Content {
    trim: bool,
    appends: bool,
    /// Text for a leaf destination; `None` for aggregates.
    leaf: Option<String>,
    run: String,
}

impl Content {
    fn push(&mut self, v: &mut dyn Codec, fragment: &str) -> Result<()> {
        if self.trim {
            self.run.push_str(fragment);
            Ok(())
        } else {
            self.emit(v, fragment)
        }
    }

    fn flush(&mut self, v: &mut dyn Codec) -> Result<()> {
        let run = core::mem::take(&mut self.run);
        match run.trim() {
            "" => Ok(()),
            text => self.emit(v, text),
        }
    }

    fn emit(&mut self, v: &mut dyn Codec, text: &str) -> Result<()> {
        if self.appends {
            append_text(v, text.as_bytes())?;
        } else if let Some(leaf) = &mut self.leaf {
            leaf.push_str(text);
        }
        Ok(())
    }
}

/// Decodes XML from any buffered reader.
///
/// The decoder keeps a stack of open elements. A `decode` call consumes the
/// remainder of the innermost open element (or, at document level, the rest
/// of the input), so calling it once on a [`Document`] reads the whole
/// document.
pub struct XmlDecoder<R> {
    reader: TokenReader<R>,
    options: DecoderOptions,
    resolvers: Vec<Box<dyn Resolver>>,
    frames: Vec<Frame>,
    pending: Option<String>,
}

impl<R: BufRead> XmlDecoder<R> {
    /// Creates a decoder over `reader` with default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, DecoderOptions::default())
    }

    /// Creates a decoder over `reader`.
    pub fn with_options(reader: R, options: DecoderOptions) -> Self {
        Self {
            reader: TokenReader::new(reader),
            options,
            resolvers: Vec::new(),
            frames: alloc::vec![Frame::default()],
            pending: None,
        }
    }

    /// Appends `resolver` to the resolver chain.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// Position just past the last token read.
    pub fn position(&self) -> Position {
        self.reader.position()
    }

    fn frame(&mut self) -> &mut Frame {
        self.frames
            .last_mut()
            .expect("the document frame is never popped")
    }

    fn decode_attributes(&mut self, v: &mut dyn Codec) -> Result<()> {
        let attrs = core::mem::take(&mut self.frame().attrs);
        let Some(fd) = v.as_field_decoder() else {
            if !attrs.is_empty() {
                debug!(count = attrs.len(), "no field capability, dropping attributes");
            }
            return Ok(());
        };
        for (index, attr) in attrs.into_iter().enumerate() {
            self.pending = Some(attr.value);
            let mut once = Once::new(&mut *self);
            let result = fd.decode_field(&mut once, index, &attr.name);
            let settled = once.settle(result);
            self.pending = None;
            if !settled? {
                trace!(name = %attr.name, "attribute not consumed");
            }
        }
        Ok(())
    }

    fn decode_children(&mut self, v: &mut dyn Codec) -> Result<()> {
        let aggregate = v.as_field_decoder().is_some() || v.as_element_decoder().is_some();
        let mut content = Content {
            trim: self.options.trim_text,
            appends: accepts_text(v),
            leaf: (!aggregate).then(String::new),
            run: String::new(),
        };
        loop {
            let token = self.reader.next_token()?;
            if let Token::Text(fragment) = &token {
                content.push(v, fragment)?;
                continue;
            }
            content.flush(v)?;
            match token {
                Token::Start { name, attrs } => self.decode_element(v, name, attrs)?,
                Token::End { name } => {
                    return self.close(v, name, content.leaf.as_deref().unwrap_or_default());
                }
                Token::Eof if self.frames.len() == 1 => {
                    trace!("end of input");
                    return Ok(());
                }
                Token::Eof => {
                    return Err(Error::UnexpectedEof {
                        position: self.position(),
                    });
                }
                Token::Text(_) => {}
            }
        }
    }

    fn close(&mut self, v: &mut dyn Codec, name: String, text: &str) -> Result<()> {
        let position = self.position();
        let frame = self.frame();
        if frame.name.as_deref() != Some(name.as_str()) {
            return Err(Error::MismatchedEndTag {
                found: name,
                expected: frame.name.clone().unwrap_or_default(),
                line: position.line,
                column: position.column,
            });
        }
        if frame.children == 0 && !text.is_empty() && !decode_text_value(v, text)? {
            return Err(Error::NotSupported { kind: "text" });
        }
        Ok(())
    }

    fn decode_element(&mut self, v: &mut dyn Codec, name: String, attrs: Vec<Attr>) -> Result<()> {
        let parent = self.frame();
        let index = parent.children;
        parent.children += 1;
        self.options
            .check_depth(self.frames.len() - 1, || self.reader.position())?;
        trace!(name = %name, index, "start element");
        self.frames.push(Frame {
            name: Some(name),
            attrs,
            children: 0,
        });
        let result = self.dispatch_element(v, index);
        self.frames.pop();
        result
    }

    fn dispatch_element(&mut self, v: &mut dyn Codec, index: usize) -> Result<()> {
        let name = self.frame().name.clone().unwrap_or_default();
        let consumed = if let Some(fd) = v.as_field_decoder() {
            let mut once = Once::new(&mut *self);
            let result = fd.decode_field(&mut once, index, &name);
            once.settle(result)?
        } else if let Some(ed) = v.as_element_decoder() {
            let mut once = Once::new(&mut *self);
            let result = ed.decode_element(&mut once, index, &name);
            once.settle(result)?
        } else {
            false
        };
        if !consumed {
            debug!(name = %name, "skipping unconsumed element");
            self.skip()?;
        }
        Ok(())
    }
}

impl<R: BufRead> Decoder for XmlDecoder<R> {
    fn decode(&mut self, v: &mut dyn Codec) -> Result<()> {
        let mut resolved = resolve(v, &self.resolvers);
        let v = resolved.codec_mut();
        if let Some(value) = self.pending.take() {
            return if decode_text_value(v, &value)? {
                Ok(())
            } else {
                Err(Error::NotSupported { kind: "attribute" })
            };
        }
        self.decode_attributes(v)?;
        self.decode_children(v)
    }
}

/// Decodes the XML document in `input` into `v`.
///
/// `v` is decoded at document level, so it usually is a [`Document`].
///
/// # Errors
///
/// Returns the first syntax, structural, capability or parse error.
pub fn from_str(input: &str, v: &mut dyn Codec) -> Result<()> {
    XmlDecoder::new(input.as_bytes()).decode(v)
}

/// Decodes the XML document read from `reader` into `v`.
///
/// # Errors
///
/// As [`from_str`]; I/O failures are reported as [`Error::Syntax`].
pub fn from_reader<R: BufRead>(reader: R, v: &mut dyn Codec) -> Result<()> {
    XmlDecoder::new(reader).decode(v)
}
