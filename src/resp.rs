//! A simplified RESP dialect: single-line requests, a restricted set of
//! reply types. Not the full binary-safe Redis wire protocol — there is
//! no length-prefixed bulk-string request framing, and every reply line
//! ends in `\r\n`.

/// A reply value sendable back to a client.
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// `+text\r\n`
    SimpleString(String),
    /// `-text\r\n`. The error message typically starts with an error code
    /// such as `ERR` or `WRONGTYPE`.
    Error(String),
    /// `:n\r\n`
    Integer(i64),
    /// `$-1\r\n`, the only bulk-reply shape this dialect emits: a typed
    /// null, used where a scalar read found nothing.
    NullBulk,
    /// `*N\r\n` followed by N simple-string lines.
    Array(Vec<String>),
}

impl RespValue {
    pub fn serialize(&self) -> String {
        match self {
            RespValue::SimpleString(s) => format!("+{}\r\n", s),
            RespValue::Error(msg) => format!("-{}\r\n", msg),
            RespValue::Integer(i) => format!(":{}\r\n", i),
            RespValue::NullBulk => "$-1\r\n".to_string(),
            RespValue::Array(items) => {
                let mut out = format!("*{}\r\n", items.len());
                for item in items {
                    out.push_str(&format!("+{}\r\n", item));
                }
                out
            }
        }
    }
}

/// Split one request line into `[command, args...]`.
///
/// Tokenization is whitespace-delimited, except that a `"`-delimited run
/// is taken as a single token verbatim (no escape processing inside the
/// quotes). An unterminated quoted token is a syntax error. Leading and
/// trailing whitespace is ignored; a blank line yields an empty vector.
pub fn tokenize_line(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        if chars.peek() == Some(&'"') {
            chars.next();
            let mut token = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '"' {
                    closed = true;
                    break;
                }
                token.push(c);
            }
            if !closed {
                return Err("unterminated quoted argument".to_string());
            }
            tokens.push(token);
        } else {
            let mut token = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
            tokens.push(token);
        }
    }

    Ok(tokens)
}

/// Strip a single trailing `\r\n` or `\n` from `line`, if present.
pub fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_simple_string() {
        assert_eq!(RespValue::SimpleString("OK".into()).serialize(), "+OK\r\n");
    }

    #[test]
    fn serialize_error() {
        assert_eq!(
            RespValue::Error("ERR boom".into()).serialize(),
            "-ERR boom\r\n"
        );
    }

    #[test]
    fn serialize_integer() {
        assert_eq!(RespValue::Integer(-7).serialize(), ":-7\r\n");
    }

    #[test]
    fn serialize_null_bulk() {
        assert_eq!(RespValue::NullBulk.serialize(), "$-1\r\n");
    }

    #[test]
    fn serialize_array() {
        let val = RespValue::Array(vec!["a".into(), "b".into()]);
        assert_eq!(val.serialize(), "*2\r\n+a\r\n+b\r\n");
    }

    #[test]
    fn tokenize_plain_whitespace() {
        assert_eq!(
            tokenize_line("SET  key   value").unwrap(),
            vec!["SET", "key", "value"]
        );
    }

    #[test]
    fn tokenize_quoted_argument_preserves_spaces() {
        assert_eq!(
            tokenize_line(r#"SET key "hello world""#).unwrap(),
            vec!["SET", "key", "hello world"]
        );
    }

    #[test]
    fn tokenize_unterminated_quote_is_error() {
        assert!(tokenize_line(r#"SET key "oops"#).is_err());
    }

    #[test]
    fn tokenize_blank_line_is_empty() {
        assert_eq!(tokenize_line("   ").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn strip_crlf_and_lf() {
        assert_eq!(strip_line_ending("PING\r\n"), "PING");
        assert_eq!(strip_line_ending("PING\n"), "PING");
        assert_eq!(strip_line_ending("PING"), "PING");
    }
}
