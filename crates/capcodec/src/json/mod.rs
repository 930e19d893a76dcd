//! Streaming JSON decoding and encoding.
//!
//! [`JsonDecoder`] walks a document token by token and drives the
//! destination's capabilities; no intermediate tree is built. Members that the
//! destination does not consume are skipped.
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! let mut scores: BTreeMap<String, Vec<u32>> = BTreeMap::new();
//! capcodec::json::from_str(r#"{"ada": [3, 5], "bob": []}"#, &mut scores).unwrap();
//! assert_eq!(scores["ada"], [3, 5]);
//! assert_eq!(capcodec::json::to_string(&scores).unwrap(), r#"{"ada":[3,5],"bob":[]}"#);
//! ```
mod encoder;
mod lexer;

use alloc::{boxed::Box, vec::Vec};

pub use encoder::{JsonEncoder, to_string};
use lexer::{Lexer, Token};
use tracing::{debug, trace};

use crate::{
    Discard,
    codec::{Codec, Decoder},
    decode::{Primitive, decode_required},
    error::{Error, Position, Result},
    once::Once,
    options::DecoderOptions,
    resolve::{Resolver, resolve},
};

/// Decodes JSON values from an in-memory document.
///
/// Each [`decode`](Decoder::decode) call reads one value, so a document of
/// concatenated or newline-delimited values is read by calling it repeatedly
/// until [`at_end`](JsonDecoder::at_end) returns `true`. At the end of the
/// input `decode` returns `Ok(())` without touching the destination.
pub struct JsonDecoder<'a> {
    lexer: Lexer<'a>,
    options: DecoderOptions,
    resolvers: Vec<Box<dyn Resolver>>,
    depth: usize,
}

impl<'a> JsonDecoder<'a> {
    /// Creates a decoder over `input` with default options.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self::with_options(input, DecoderOptions::default())
    }

    /// Creates a decoder over `input`.
    #[must_use]
    pub fn with_options(input: &'a str, options: DecoderOptions) -> Self {
        Self {
            lexer: Lexer::new(input),
            options,
            resolvers: Vec::new(),
            depth: 0,
        }
    }

    /// Creates a decoder over UTF-8 encoded `input`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] pointing at the first invalid byte if
    /// `input` is not UTF-8.
    pub fn from_slice(input: &'a [u8]) -> Result<Self> {
        let input = core::str::from_utf8(input).map_err(|err| Error::Syntax {
            message: "invalid UTF-8".into(),
            position: Position::locate(input, err.valid_up_to()),
        })?;
        Ok(Self::new(input))
    }

    /// Appends `resolver` to the resolver chain. Resolvers are consulted in
    /// the order they were added.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// Reports whether the current array or object has another member.
    pub fn more(&mut self) -> bool {
        self.lexer.more()
    }

    /// Reports whether only whitespace remains in the input.
    pub fn at_end(&mut self) -> bool {
        self.lexer.at_end()
    }

    /// Position of the start of the last token read.
    #[must_use]
    pub fn position(&self) -> Position {
        self.lexer.position()
    }

    /// Checks that nothing but whitespace follows the values decoded so far.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] if input remains.
    pub fn end(&mut self) -> Result<()> {
        if self.lexer.at_end() {
            return Ok(());
        }
        let _ = self.lexer.next_token()?;
        Err(Error::Syntax {
            message: "trailing characters".into(),
            position: self.lexer.position(),
        })
    }

    fn decode_token(&mut self, v: &mut dyn Codec, token: Token<'a>) -> Result<()> {
        match token {
            Token::Null => decode_required(v, Primitive::Nil),
            Token::Bool(b) => decode_required(v, Primitive::Bool(b)),
            Token::Number(n) => decode_required(v, Primitive::Number(n)),
            Token::String(s) => decode_required(v, Primitive::String(&s)),
            Token::BeginObject => self.nested(|this| this.decode_object(v)),
            Token::BeginArray => self.nested(|this| this.decode_array(v)),
            Token::EndObject | Token::EndArray | Token::Eof => Err(self.unexpected(&token, "value")),
        }
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        self.options.check_depth(self.depth, || self.lexer.position())?;
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn decode_object(&mut self, v: &mut dyn Codec) -> Result<()> {
        let mut fields = v.as_field_decoder();
        if let Some(fd) = fields.as_deref_mut() {
            fd.begin_fields()?;
        } else {
            debug!(position = %self.lexer.position(), "no field capability, skipping object");
        }
        let mut index = 0;
        loop {
            match self.lexer.next_token()? {
                Token::EndObject => return Ok(()),
                Token::String(key) => {
                    let consumed = match fields.as_deref_mut() {
                        Some(fd) => {
                            let mut once = Once::new(self);
                            let result = fd.decode_field(&mut once, index, &key);
                            once.settle(result)?
                        }
                        None => false,
                    };
                    if !consumed {
                        trace!(key = %key, "skipping unconsumed field");
                        self.skip()?;
                    }
                    index += 1;
                }
                other => return Err(self.unexpected(&other, "string key or '}'")),
            }
        }
    }

    fn decode_array(&mut self, v: &mut dyn Codec) -> Result<()> {
        let mut elements = v.as_element_decoder();
        if let Some(ed) = elements.as_deref_mut() {
            ed.begin_elements()?;
        } else {
            debug!(position = %self.lexer.position(), "no element capability, skipping array");
        }
        let mut index = 0;
        while self.lexer.more() {
            let consumed = match elements.as_deref_mut() {
                Some(ed) => {
                    let mut once = Once::new(self);
                    let result = ed.decode_element(&mut once, index, "");
                    once.settle(result)?
                }
                None => false,
            };
            if !consumed {
                self.skip()?;
            }
            index += 1;
        }
        match self.lexer.next_token()? {
            Token::EndArray => Ok(()),
            other => Err(self.unexpected(&other, "',' or ']'")),
        }
    }

    fn unexpected(&self, token: &Token<'_>, expected: &'static str) -> Error {
        Error::UnexpectedToken {
            found: token.describe(),
            expected,
            position: self.lexer.position(),
        }
    }
}

impl Decoder for JsonDecoder<'_> {
    fn decode(&mut self, v: &mut dyn Codec) -> Result<()> {
        let token = self.lexer.next_token()?;
        if token == Token::Eof && self.depth == 0 {
            trace!("end of input");
            return Ok(());
        }
        let mut resolved = resolve(v, &self.resolvers);
        self.decode_token(resolved.codec_mut(), token)
    }

    fn skip(&mut self) -> Result<()> {
        let token = self.lexer.next_token()?;
        self.decode_token(&mut Discard, token)
    }
}

/// Decodes the single JSON value in `input` into `v`.
///
/// Empty input leaves `v` untouched.
///
/// # Errors
///
/// Returns the first syntax, structural, capability or parse error, or
/// [`Error::Syntax`] if anything but whitespace follows the value.
pub fn from_str(input: &str, v: &mut dyn Codec) -> Result<()> {
    let mut dec = JsonDecoder::new(input);
    dec.decode(v)?;
    dec.end()
}

/// Like [`from_str`], for UTF-8 encoded bytes.
///
/// # Errors
///
/// As [`from_str`]; invalid UTF-8 is an [`Error::Syntax`].
pub fn from_slice(input: &[u8], v: &mut dyn Codec) -> Result<()> {
    let mut dec = JsonDecoder::from_slice(input)?;
    dec.decode(v)?;
    dec.end()
}
