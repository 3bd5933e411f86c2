use crate::{ParseError, Properties};

/// Parse properties text.
///
/// Each logical line is one `key=value` entry. Blank lines and lines starting
/// with `#` or `!` are skipped, and a line ending in an unescaped backslash
/// continues onto the next one. Leading whitespace of the value is dropped;
/// trailing whitespace is kept as written.
///
/// # Errors
/// Returns [`ParseError`] for the first entry that has no `=`, has an empty
/// key, or contains a malformed `\u` escape. Nothing is returned for the
/// entries that parsed before it.
pub fn parse(text: &str) -> Result<Properties, ParseError> {
    let mut props = Properties::new();
    let mut lines = physical_lines(text).enumerate();

    while let Some((index, raw)) = lines.next() {
        let line = index + 1;
        let first = raw.trim_start_matches(is_blank);
        if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
            continue;
        }

        let mut logical = first.to_string();
        while continues(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                None => break,
            }
        }

        let (key, value) = split_entry(&logical, line)?;
        props.insert(key, value);
    }

    Ok(props)
}

const fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Split on `\n`, `\r\n` and lone `\r`.
fn physical_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let current = rest?;
        match current.find(['\n', '\r']) {
            Some(end) => {
                let skip = if current[end..].starts_with("\r\n") { 2 } else { 1 };
                rest = Some(&current[end + skip..]);
                Some(&current[..end])
            }
            None => {
                rest = None;
                // A trailing terminator does not open another line.
                (!current.is_empty()).then_some(current)
            }
        }
    })
}

/// An odd run of trailing backslashes escapes the line break.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(logical: &str, line: usize) -> Result<(String, String), ParseError> {
    let mut escaped = false;
    let mut separator = None;
    for (i, c) in logical.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' {
            separator = Some(i);
            break;
        }
    }
    let separator = separator.ok_or(ParseError::MissingSeparator { line })?;

    let key = unescape(&logical[..separator], line, true)?;
    if key.is_empty() {
        return Err(ParseError::EmptyKey { line });
    }
    let value = unescape(
        logical[separator + 1..].trim_start_matches(is_blank),
        line,
        false,
    )?;

    Ok((key, value))
}

/// Resolve escapes. With `trim_end`, unescaped trailing blanks are dropped
/// while escaped ones survive.
fn unescape(raw: &str, line: usize, trim_end: bool) -> Result<String, ParseError> {
    let mut out = String::with_capacity(raw.len());
    let mut kept = 0;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            if !is_blank(c) {
                kept = out.len();
            }
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => out.push(unicode_escape(&mut chars, line)?),
            Some(other) => out.push(other),
            None => {}
        }
        kept = out.len();
    }

    if trim_end {
        out.truncate(kept);
    }
    Ok(out)
}

fn unicode_escape(chars: &mut std::str::Chars<'_>, line: usize) -> Result<char, ParseError> {
    let err = ParseError::InvalidUnicodeEscape { line };
    let high = hex_unit(chars).ok_or(err.clone())?;
    if !(0xD800..0xDC00).contains(&high) {
        return char::from_u32(u32::from(high)).ok_or(err);
    }

    // Supplementary characters arrive as a `\uD8xx\uDCxx` surrogate pair.
    if chars.next() != Some('\\') || chars.next() != Some('u') {
        return Err(err);
    }
    let low = hex_unit(chars).ok_or(err.clone())?;
    char::decode_utf16([high, low])
        .next()
        .and_then(Result::ok)
        .ok_or(err)
}

fn hex_unit(chars: &mut std::str::Chars<'_>) -> Option<u16> {
    let mut unit = 0u16;
    for _ in 0..4 {
        let digit = chars.next()?.to_digit(16)?;
        unit = unit * 16 + u16::try_from(digit).ok()?;
    }
    Some(unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_keystore_file() {
        let props = parse(
            "storeFile=release.jks\nstorePassword=abc123\nkeyAlias=upload\nkeyPassword=abc123",
        )
        .unwrap();

        assert_eq!(props.len(), 4);
        assert_eq!(props.get("storeFile"), Some("release.jks"));
        assert_eq!(props.get("storePassword"), Some("abc123"));
        assert_eq!(props.get("keyAlias"), Some("upload"));
        assert_eq!(props.get("keyPassword"), Some("abc123"));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let props = parse("# comment\n! also a comment\n\n   \t\nkey=value\n").unwrap();
        assert_eq!(props.iter().collect::<Vec<_>>(), [("key", "value")]);
    }

    #[test]
    fn handles_all_line_terminators() {
        let props = parse("a=1\r\nb=2\rc=3\n").unwrap();
        assert_eq!(props.get("a"), Some("1"));
        assert_eq!(props.get("b"), Some("2"));
        assert_eq!(props.get("c"), Some("3"));
    }

    #[test]
    fn trims_around_separator_but_keeps_trailing_value_space() {
        let props = parse("  keyAlias  =   upload  \n").unwrap();
        assert_eq!(props.get("keyAlias"), Some("upload  "));
    }

    #[test]
    fn value_may_contain_separator() {
        let props = parse("storePassword=a=b=c").unwrap();
        assert_eq!(props.get("storePassword"), Some("a=b=c"));
    }

    #[test]
    fn empty_value_is_allowed() {
        let props = parse("keyPassword=").unwrap();
        assert_eq!(props.get("keyPassword"), Some(""));
    }

    #[test]
    fn last_duplicate_wins() {
        let props = parse("keyAlias=first\nkeyAlias=second\n").unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("keyAlias"), Some("second"));
    }

    #[test]
    fn joins_continuation_lines() {
        let props = parse("storeFile=/very/long/\\\n    path/release.jks\nkeyAlias=upload").unwrap();
        assert_eq!(props.get("storeFile"), Some("/very/long/path/release.jks"));
        assert_eq!(props.get("keyAlias"), Some("upload"));
    }

    #[test]
    fn escaped_backslash_does_not_continue() {
        let props = parse("storeFile=C:\\\\keys\\\\\nkeyAlias=upload").unwrap();
        assert_eq!(props.get("storeFile"), Some("C:\\keys\\"));
        assert_eq!(props.get("keyAlias"), Some("upload"));
    }

    #[test]
    fn continuation_at_end_of_input() {
        let props = parse("keyAlias=upload\\").unwrap();
        assert_eq!(props.get("keyAlias"), Some("upload"));
    }

    #[test]
    fn resolves_escapes() {
        let props = parse("a\\=b\\ c=tab\\there\\u00e9\\uD83D\\uDD11\nd=\\ x\\q").unwrap();
        assert_eq!(props.get("a=b c"), Some("tab\there\u{e9}\u{1F511}"));
        assert_eq!(props.get("d"), Some(" xq"));
    }

    #[test]
    fn escaped_trailing_space_in_key_survives() {
        let props = parse("key\\  =v").unwrap();
        assert_eq!(props.get("key "), Some("v"));
    }

    #[test]
    fn rejects_line_without_separator() {
        assert_eq!(
            parse("storeFile=release.jks\nstorePassword abc123\n"),
            Err(ParseError::MissingSeparator { line: 2 })
        );
    }

    #[test]
    fn escaped_separator_is_not_a_separator() {
        assert_eq!(
            parse("only\\=escaped"),
            Err(ParseError::MissingSeparator { line: 1 })
        );
    }

    #[test]
    fn rejects_empty_key() {
        assert_eq!(parse("\n  =value"), Err(ParseError::EmptyKey { line: 2 }));
    }

    #[test]
    fn rejects_bad_unicode_escapes() {
        for text in ["a=\\u12", "a=\\uZZZZ", "a=\\uD83D", "a=\\uD83Dx", "a=\\uDD11"] {
            assert_eq!(
                parse(text),
                Err(ParseError::InvalidUnicodeEscape { line: 1 }),
                "{text:?}"
            );
        }
    }

    #[test]
    fn error_line_is_start_of_continued_entry() {
        assert_eq!(
            parse("a=1\nbroken\\\nstill broken"),
            Err(ParseError::MissingSeparator { line: 2 })
        );
    }
}
