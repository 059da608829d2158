//! C-style escape decoding for MI constants.
//!
//! The debugger quotes stream text and const values with C escape
//! sequences. Decoding is deferred until a caller asks for the readable
//! form, so a malformed escape never fails the parse that carried it.

use crate::error::EscapeError;

/// Decode the C-style escapes in the raw text of an MI constant.
///
/// Supported sequences: `\a \b \e \f \n \r \t \v \\ \' \" \?`,
/// three-digit octal `\NNN`, `\uXXXX` and `\UXXXXXXXX`.
pub fn decode(raw: &str) -> Result<String, EscapeError> {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '\\' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let escape = *chars.get(i + 1).ok_or(EscapeError::Truncated)?;
        match escape {
            'a' => {
                out.push('\u{07}');
                i += 2;
            }
            'b' => {
                out.push('\u{08}');
                i += 2;
            }
            'e' => {
                out.push('\u{1b}');
                i += 2;
            }
            'f' => {
                out.push('\u{0c}');
                i += 2;
            }
            'n' => {
                out.push('\n');
                i += 2;
            }
            'r' => {
                out.push('\r');
                i += 2;
            }
            't' => {
                out.push('\t');
                i += 2;
            }
            'v' => {
                out.push('\u{0b}');
                i += 2;
            }
            '\\' | '\'' | '"' | '?' => {
                out.push(escape);
                i += 2;
            }
            '0'..='7' => {
                let value = digit_run(&chars, i + 1, 3, 8, "octal")?;
                out.push(scalar(value)?);
                i += 4;
            }
            'u' => {
                let value = digit_run(&chars, i + 2, 4, 16, "hex")?;
                out.push(scalar(value)?);
                i += 6;
            }
            'U' => {
                let value = digit_run(&chars, i + 2, 8, 16, "hex")?;
                out.push(scalar(value)?);
                i += 10;
            }
            other => return Err(EscapeError::UnknownEscape(other)),
        }
    }

    Ok(out)
}

/// Read exactly `len` digits of the given radix starting at `start`.
fn digit_run(
    chars: &[char],
    start: usize,
    len: usize,
    radix: u32,
    kind: &'static str,
) -> Result<u32, EscapeError> {
    if start + len > chars.len() {
        return Err(EscapeError::Truncated);
    }
    let run = &chars[start..start + len];
    let mut value = 0u32;
    for &c in run {
        let digit = c.to_digit(radix).ok_or_else(|| EscapeError::BadDigits {
            kind,
            text: run.iter().collect(),
        })?;
        value = value * radix + digit;
    }
    Ok(value)
}

fn scalar(value: u32) -> Result<char, EscapeError> {
    char::from_u32(value).ok_or(EscapeError::InvalidChar(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_plain_text_passes_through() {
        assert_eq!(decode("hello world").unwrap(), "hello world");
    }

    #[test]
    fn escape_newline() {
        assert_eq!(decode("a\\nb").unwrap(), "a\nb");
    }

    #[test]
    fn escape_single_characters() {
        assert_eq!(decode("\\a\\b\\e\\f\\r\\t\\v").unwrap(), "\u{07}\u{08}\u{1b}\u{0c}\r\t\u{0b}");
        assert_eq!(decode("\\\\\\'\\\"\\?").unwrap(), "\\'\"?");
    }

    #[test]
    fn escape_octal() {
        // \101 is 'A'.
        assert_eq!(decode("\\101").unwrap(), "A");
        assert_eq!(decode("x\\060y").unwrap(), "x0y");
    }

    #[test]
    fn escape_unicode_short() {
        assert_eq!(decode("\\u0416").unwrap(), "\u{0416}");
    }

    #[test]
    fn escape_unicode_long() {
        assert_eq!(decode("\\U0001F600").unwrap(), "\u{1F600}");
    }

    #[test]
    fn escape_unknown_fails() {
        assert_eq!(decode("\\q").unwrap_err(), EscapeError::UnknownEscape('q'));
    }

    #[test]
    fn escape_trailing_backslash_fails() {
        assert_eq!(decode("abc\\").unwrap_err(), EscapeError::Truncated);
    }

    #[test]
    fn escape_short_octal_run_fails() {
        assert_eq!(decode("\\10").unwrap_err(), EscapeError::Truncated);
    }

    #[test]
    fn escape_bad_octal_digit_fails() {
        let err = decode("\\089").unwrap_err();
        assert!(matches!(err, EscapeError::BadDigits { kind: "octal", .. }));
    }

    #[test]
    fn escape_bad_hex_digit_fails() {
        let err = decode("\\u12zz").unwrap_err();
        assert!(matches!(err, EscapeError::BadDigits { kind: "hex", .. }));
    }

    #[test]
    fn escape_surrogate_fails() {
        assert_eq!(decode("\\ud800").unwrap_err(), EscapeError::InvalidChar(0xD800));
    }

    #[test]
    fn escape_mixed_content() {
        assert_eq!(decode("line\\tone\\nline\\ttwo").unwrap(), "line\tone\nline\ttwo");
    }
}
