//! Pull lexer for in-memory JSON documents.
//!
//! The lexer tracks just enough nesting to consume `,` and `:` itself, so the
//! engine only sees value and bracket tokens. Closing brackets are reported by
//! kind without checking them against the open container; the engine does
//! that and reports the mismatch.
use alloc::{
    borrow::Cow,
    format,
    string::{String, ToString},
    vec::Vec,
};

use crate::error::{Error, Position, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token<'a> {
    Null,
    Bool(bool),
    Number(&'a str),
    String(Cow<'a, str>),
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Eof,
}

impl Token<'_> {
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Null => "null".to_string(),
            Token::Bool(b) => b.to_string(),
            Token::Number(n) => format!("number {n}"),
            Token::String(s) => format!("string {s:?}"),
            Token::BeginObject => "'{'".to_string(),
            Token::EndObject => "'}'".to_string(),
            Token::BeginArray => "'['".to_string(),
            Token::EndArray => "']'".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

/// What the grammar allows next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// A value: at the top level, after `:`, or after `,` in an array.
    Value,
    /// The first member of a container, or its closing bracket.
    FirstMember,
    /// `,` or a closing bracket after a member.
    Separator,
    /// `:` after an object key.
    Colon,
}

#[derive(Debug)]
pub(crate) struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    token_start: usize,
    stack: Vec<Container>,
    expect: Expect,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            token_start: 0,
            stack: Vec::new(),
            expect: Expect::Value,
        }
    }

    /// Position of the start of the last token read.
    pub(crate) fn position(&self) -> Position {
        Position::locate(self.input.as_bytes(), self.token_start)
    }

    /// Reports whether the current container has another member, i.e. the
    /// next token is not a closing bracket and input remains.
    pub(crate) fn more(&mut self) -> bool {
        self.skip_whitespace();
        !matches!(self.peek(), None | Some(b'}' | b']'))
    }

    /// Reports whether only whitespace remains.
    pub(crate) fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.pos == self.input.len()
    }

    pub(crate) fn next_token(&mut self) -> Result<Token<'a>> {
        self.skip_whitespace();
        self.token_start = self.pos;
        match self.expect {
            Expect::Value => self.value(),
            Expect::Colon => match self.peek() {
                Some(b':') => {
                    self.advance_to_next_token();
                    self.value()
                }
                None => Err(self.eof()),
                Some(_) => Err(self.invalid_char()),
            },
            Expect::FirstMember => match self.peek() {
                Some(b'}' | b']') => Ok(self.close()),
                _ => self.member(),
            },
            Expect::Separator => match self.peek() {
                Some(b',') => {
                    self.advance_to_next_token();
                    self.member()
                }
                Some(b'}' | b']') => Ok(self.close()),
                None => Err(self.eof()),
                Some(_) => Err(self.invalid_char()),
            },
        }
    }

    fn advance_to_next_token(&mut self) {
        self.pos += 1;
        self.skip_whitespace();
        self.token_start = self.pos;
    }

    fn member(&mut self) -> Result<Token<'a>> {
        if self.stack.last() != Some(&Container::Object) {
            return self.value();
        }
        match self.peek() {
            Some(b'"') => {
                let key = self.string()?;
                self.expect = Expect::Colon;
                Ok(Token::String(key))
            }
            None => Err(self.eof()),
            Some(_) => Err(self.invalid_char()),
        }
    }

    fn value(&mut self) -> Result<Token<'a>> {
        let Some(c) = self.peek() else {
            return if self.stack.is_empty() {
                Ok(Token::Eof)
            } else {
                Err(self.eof())
            };
        };
        let token = match c {
            b'{' => return Ok(self.open(Container::Object)),
            b'[' => return Ok(self.open(Container::Array)),
            b'"' => Token::String(self.string()?),
            b't' => {
                self.literal("true")?;
                Token::Bool(true)
            }
            b'f' => {
                self.literal("false")?;
                Token::Bool(false)
            }
            b'n' => {
                self.literal("null")?;
                Token::Null
            }
            b'-' | b'0'..=b'9' => Token::Number(self.number()?),
            b'}' | b']' => {
                return Err(Error::UnexpectedToken {
                    found: format!("'{}'", c as char),
                    expected: "value",
                    position: self.position(),
                });
            }
            _ => return Err(self.invalid_char()),
        };
        self.after_value();
        Ok(token)
    }

    fn open(&mut self, container: Container) -> Token<'a> {
        self.pos += 1;
        self.stack.push(container);
        self.expect = Expect::FirstMember;
        match container {
            Container::Object => Token::BeginObject,
            Container::Array => Token::BeginArray,
        }
    }

    fn close(&mut self) -> Token<'a> {
        let c = self.input.as_bytes()[self.pos];
        self.pos += 1;
        self.stack.pop();
        self.after_value();
        if c == b'}' {
            Token::EndObject
        } else {
            Token::EndArray
        }
    }

    fn after_value(&mut self) {
        self.expect = if self.stack.is_empty() {
            Expect::Value
        } else {
            Expect::Separator
        };
    }

    fn literal(&mut self, word: &'static str) -> Result<()> {
        if self.input[self.pos..].starts_with(word) {
            self.pos += word.len();
            return Ok(());
        }
        // Point at the first byte that differs.
        let matched = self.input.as_bytes()[self.pos..]
            .iter()
            .zip(word.as_bytes())
            .take_while(|(a, b)| a == b)
            .count();
        self.pos += matched;
        if self.pos == self.input.len() {
            Err(self.eof())
        } else {
            Err(self.invalid_char())
        }
    }

    fn number(&mut self) -> Result<&'a str> {
        let start = self.pos;
        self.eat(b'-');
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                if matches!(self.peek(), Some(b'0'..=b'9')) {
                    return Err(self.syntax("leading zero in number"));
                }
            }
            Some(b'1'..=b'9') => {
                self.digits();
            }
            None => return Err(self.eof()),
            Some(_) => return Err(self.invalid_char()),
        }
        if self.eat(b'.') && !self.digits() {
            return Err(self.expected_digit());
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if !self.digits() {
                return Err(self.expected_digit());
            }
        }
        Ok(&self.input[start..self.pos])
    }

    fn expected_digit(&self) -> Error {
        if self.pos == self.input.len() {
            self.eof()
        } else {
            self.invalid_char()
        }
    }

    fn digits(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn string(&mut self) -> Result<Cow<'a, str>> {
        let bytes = self.input.as_bytes();
        self.pos += 1;
        let start = self.pos;
        // Borrow when there are no escapes.
        loop {
            match bytes.get(self.pos) {
                None => return Err(self.eof()),
                Some(b'"') => {
                    let s = &self.input[start..self.pos];
                    self.pos += 1;
                    return Ok(Cow::Borrowed(s));
                }
                Some(b'\\') => break,
                Some(&b) if b < 0x20 => return Err(self.invalid_char()),
                Some(_) => self.pos += 1,
            }
        }
        let mut out = String::from(&self.input[start..self.pos]);
        loop {
            match bytes.get(self.pos) {
                None => return Err(self.eof()),
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(Cow::Owned(out));
                }
                Some(b'\\') => {
                    self.pos += 1;
                    let c = self.escape()?;
                    out.push(c);
                }
                Some(&b) if b < 0x20 => return Err(self.invalid_char()),
                Some(_) => {
                    let run = self.pos;
                    while let Some(&b) = bytes.get(self.pos) {
                        if b == b'"' || b == b'\\' || b < 0x20 {
                            break;
                        }
                        self.pos += 1;
                    }
                    out.push_str(&self.input[run..self.pos]);
                }
            }
        }
    }

    fn escape(&mut self) -> Result<char> {
        let Some(c) = self.peek() else {
            return Err(self.eof());
        };
        let decoded = match c {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{0008}',
            b'f' => '\u{000C}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                self.pos += 1;
                return self.unicode_escape();
            }
            _ => return Err(self.invalid_char()),
        };
        self.pos += 1;
        Ok(decoded)
    }

    fn unicode_escape(&mut self) -> Result<char> {
        let high = self.hex4()?;
        let code = if (0xD800..0xDC00).contains(&high) {
            if !self.input[self.pos..].starts_with("\\u") {
                return Err(self.invalid_escape(high));
            }
            self.pos += 2;
            let low = self.hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(self.invalid_escape(low));
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };
        char::from_u32(code).ok_or_else(|| self.invalid_escape(code))
    }

    fn hex4(&mut self) -> Result<u32> {
        for _ in 0..4 {
            match self.peek() {
                Some(b) if b.is_ascii_hexdigit() => self.pos += 1,
                None => return Err(self.eof()),
                Some(_) => return Err(self.invalid_char()),
            }
        }
        let digits = &self.input[self.pos - 4..self.pos];
        u32::from_str_radix(digits, 16).map_err(|err| self.syntax(err))
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    // ------------------------------------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------------------------------------

    fn here(&self) -> Position {
        Position::locate(self.input.as_bytes(), self.pos)
    }

    fn syntax(&self, message: impl ToString) -> Error {
        Error::Syntax {
            message: message.to_string(),
            position: self.here(),
        }
    }

    fn invalid_char(&self) -> Error {
        match self.input[self.pos..].chars().next() {
            Some(c) => self.syntax(format!("invalid character {c:?}")),
            None => self.eof(),
        }
    }

    fn invalid_escape(&self, code: u32) -> Error {
        self.syntax(format!("invalid unicode escape sequence \\u{code:04X}"))
    }

    fn eof(&self) -> Error {
        Error::UnexpectedEof {
            position: self.here(),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn tokens(input: &str) -> Result<Vec<Token<'_>>> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token()?;
            if token == Token::Eof {
                return Ok(out);
            }
            out.push(token);
        }
    }

    #[test]
    fn separators_are_consumed() {
        assert_eq!(
            tokens(r#" {"a" : [1, -2.5e3, true], "b": null} "#).unwrap(),
            vec![
                Token::BeginObject,
                Token::String("a".into()),
                Token::BeginArray,
                Token::Number("1"),
                Token::Number("-2.5e3"),
                Token::Bool(true),
                Token::EndArray,
                Token::String("b".into()),
                Token::Null,
                Token::EndObject,
            ]
        );
    }

    #[test]
    fn strings_borrow_unless_escaped() {
        let mut lexer = Lexer::new(r#"["plain", "a\"bé😀"]"#);
        lexer.next_token().unwrap();
        assert!(matches!(lexer.next_token().unwrap(), Token::String(Cow::Borrowed("plain"))));
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::String(Cow::Owned("a\"bé😀".to_string()))
        );
    }

    #[test]
    fn concatenated_values() {
        assert_eq!(
            tokens("1 2\n[]").unwrap(),
            vec![Token::Number("1"), Token::Number("2"), Token::BeginArray, Token::EndArray]
        );
    }

    #[test]
    fn mismatched_closer_is_reported_by_kind() {
        assert_eq!(
            tokens("[1}").unwrap(),
            vec![Token::BeginArray, Token::Number("1"), Token::EndObject]
        );
    }

    #[test]
    fn errors_carry_positions() {
        let err = tokens("[1,\n  x]").unwrap_err();
        assert_eq!(
            err,
            Error::Syntax {
                message: "invalid character 'x'".to_string(),
                position: Position {
                    offset: 6,
                    line: 2,
                    column: 3
                },
            }
        );
        assert!(matches!(tokens("{\"a\":"), Err(Error::UnexpectedEof { .. })));
        assert!(matches!(tokens("[1,]"), Err(Error::UnexpectedToken { expected: "value", .. })));
        assert!(matches!(tokens("01"), Err(Error::Syntax { .. })));
        assert!(matches!(tokens(r#""\ud800""#), Err(Error::Syntax { .. })));
    }

    #[test]
    fn more_stops_at_closers() {
        let mut lexer = Lexer::new("[ 1 ]");
        lexer.next_token().unwrap();
        assert!(lexer.more());
        lexer.next_token().unwrap();
        assert!(!lexer.more());
        assert_eq!(lexer.next_token().unwrap(), Token::EndArray);
        assert!(lexer.at_end());
    }
}
