//! Argument text → tuple of literal values.
//!
//! Accepted literals: integers, floats, single/double/triple-quoted strings,
//! lists, tuples, dicts with string or number keys, `True`, `False`, `None`.
//! A top-level comma sequence is a tuple. Tuples and lists both become JSON
//! arrays.

use serde_json::{Map, Number, Value};

/// Convert raw argument text into the argument tuple.
///
/// One pair of surrounding matching quotes is stripped first and text with a
/// line break is re-wrapped in triple quotes; the result is then evaluated
/// once. Never fails: text that is not a literal is kept verbatim (after
/// stripping) as a single string argument.
pub fn parse_action_args(raw: &str) -> Vec<Value> {
    let stripped = strip_matching_quotes(raw.trim());
    if stripped.is_empty() {
        return Vec::new();
    }

    let candidate = if stripped.contains('\n') {
        format!("\"\"\"{stripped}\"\"\"")
    } else {
        stripped.to_string()
    };

    match eval_literal(&candidate) {
        Ok(value) => expand(value),
        Err(_) => vec![Value::String(stripped.to_string())],
    }
}

fn expand(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

fn strip_matching_quotes(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &text[1..text.len() - 1];
        }
    }
    text
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralError {
    pub offset: usize,
    pub message: &'static str,
}

/// Evaluate `text` as a single literal expression.
pub fn eval_literal(text: &str) -> Result<Value, LiteralError> {
    let mut parser = LiteralParser { src: text, pos: 0 };
    parser.parse_top()
}

struct LiteralParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    fn parse_top(&mut self) -> Result<Value, LiteralError> {
        self.skip_ws();
        let first = self.parse_value()?;
        self.skip_ws();
        if self.at_end() {
            return Ok(first);
        }
        if self.peek() != Some(',') {
            return Err(self.error("unexpected trailing input"));
        }

        let mut items = vec![first];
        loop {
            self.bump(); // ','
            self.skip_ws();
            if self.at_end() {
                break;
            }
            items.push(self.parse_value()?);
            self.skip_ws();
            if self.at_end() {
                break;
            }
            if self.peek() != Some(',') {
                return Err(self.error("expected ','"));
            }
        }
        Ok(Value::Array(items))
    }

    fn parse_value(&mut self) -> Result<Value, LiteralError> {
        self.skip_ws();
        match self.peek() {
            Some('"') | Some('\'') => self.parse_strings(),
            Some('[') => {
                self.bump();
                self.parse_sequence(']')
            }
            Some('(') => self.parse_paren(),
            Some('{') => self.parse_dict(),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => {
                self.parse_number()
            }
            Some(c) if c.is_ascii_alphabetic() => self.parse_keyword(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// Items up to `close`; the opening bracket is already consumed.
    fn parse_sequence(&mut self, close: char) -> Result<Value, LiteralError> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Ok(Value::Array(items));
            }
            items.push(self.parse_value()?);
            self.skip_ws();
            if self.eat(close) {
                return Ok(Value::Array(items));
            }
            if !self.eat(',') {
                return Err(self.error("expected ',' in sequence"));
            }
        }
    }

    fn parse_paren(&mut self) -> Result<Value, LiteralError> {
        self.bump(); // '('
        self.skip_ws();
        if self.eat(')') {
            return Ok(Value::Array(Vec::new()));
        }
        let first = self.parse_value()?;
        self.skip_ws();
        if self.eat(')') {
            // Grouping, not a tuple.
            return Ok(first);
        }
        if !self.eat(',') {
            return Err(self.error("expected ',' or ')'"));
        }
        match self.parse_sequence(')')? {
            Value::Array(mut rest) => {
                rest.insert(0, first);
                Ok(Value::Array(rest))
            }
            other => Ok(other),
        }
    }

    fn parse_dict(&mut self) -> Result<Value, LiteralError> {
        self.bump(); // '{'
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            let key = match self.parse_value()? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => if b { "True" } else { "False" }.to_string(),
                _ => return Err(self.error("unsupported dict key")),
            };
            self.skip_ws();
            if !self.eat(':') {
                return Err(self.error("expected ':' in dict"));
            }
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_ws();
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            if !self.eat(',') {
                return Err(self.error("expected ',' in dict"));
            }
        }
    }

    fn parse_keyword(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }
        match &self.src[start..self.pos] {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::Null),
            _ => Err(LiteralError {
                offset: start,
                message: "names are not literals",
            }),
        }
    }

    fn parse_number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.bump();
        }
        let int_digits = self.eat_digits();
        let mut is_float = false;
        let mut frac_digits = 0;
        if self.peek() == Some('.') {
            self.bump();
            is_float = true;
            frac_digits = self.eat_digits();
        }
        if int_digits == 0 && frac_digits == 0 {
            return Err(self.error("expected digits"));
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            self.bump();
            if matches!(self.peek(), Some('-') | Some('+')) {
                self.bump();
            }
            if self.eat_digits() == 0 {
                return Err(self.error("expected exponent digits"));
            }
            is_float = true;
        }

        let text = self.src[start..self.pos].trim_start_matches('+');
        if !is_float {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::Number(i.into()));
            }
            if let Ok(u) = text.parse::<u64>() {
                return Ok(Value::Number(u.into()));
            }
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or(LiteralError {
                offset: start,
                message: "invalid number",
            })
    }

    /// One string literal, plus any adjacent ones (`'a' 'b'` is `'ab'`).
    fn parse_strings(&mut self) -> Result<Value, LiteralError> {
        let mut out = self.parse_string()?;
        loop {
            let save = self.pos;
            self.skip_ws();
            if matches!(self.peek(), Some('"') | Some('\'')) {
                out.push_str(&self.parse_string()?);
            } else {
                self.pos = save;
                return Ok(Value::String(out));
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, LiteralError> {
        let start = self.pos;
        let quote = self.bump().ok_or(self.error("expected quote"))?;
        let triple = self.src[self.pos..].starts_with(&format!("{quote}{quote}"));
        if triple {
            self.pos += 2 * quote.len_utf8();
        }

        let mut out = String::new();
        loop {
            let c = self.bump().ok_or(LiteralError {
                offset: start,
                message: "unterminated string",
            })?;
            match c {
                '\\' => self.parse_escape(&mut out)?,
                c if c == quote => {
                    if !triple {
                        return Ok(out);
                    }
                    let closing = format!("{quote}{quote}");
                    if self.src[self.pos..].starts_with(&closing) {
                        self.pos += closing.len();
                        return Ok(out);
                    }
                    out.push(c);
                }
                '\n' if !triple => {
                    return Err(LiteralError {
                        offset: start,
                        message: "line break in single-quoted string",
                    })
                }
                c => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let Some(c) = self.bump() else {
            return Err(self.error("dangling escape"));
        };
        match c {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0' => out.push('\0'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            'x' => out.push(self.parse_hex_escape(2)?),
            'u' => out.push(self.parse_hex_escape(4)?),
            'U' => out.push(self.parse_hex_escape(8)?),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn parse_hex_escape(&mut self, len: usize) -> Result<char, LiteralError> {
        let end = self.pos + len;
        let hex = self
            .src
            .get(self.pos..end)
            .ok_or(self.error("truncated escape"))?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| self.error("invalid hex escape"))?;
        let c = char::from_u32(code).ok_or(self.error("invalid code point"))?;
        self.pos = end;
        Ok(c)
    }

    fn eat_digits(&mut self) -> usize {
        let mut n = 0;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || (c == '_' && n > 0)) {
            self.bump();
            n += 1;
        }
        n
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn error(&self, message: &'static str) -> LiteralError {
        LiteralError {
            offset: self.pos,
            message,
        }
    }
}
