use std::fmt::{self, Write};

pub(crate) fn write_entry(f: &mut impl Write, key: &str, value: &str) -> fmt::Result {
    for c in key.chars() {
        match c {
            ' ' => f.write_str("\\ ")?,
            '=' | ':' | '#' | '!' => {
                f.write_char('\\')?;
                f.write_char(c)?;
            }
            _ => write_common(f, c)?,
        }
    }
    f.write_char('=')?;
    for (i, c) in value.chars().enumerate() {
        match c {
            // Only leading blanks would be eaten by the reader.
            ' ' if i == 0 => f.write_str("\\ ")?,
            _ => write_common(f, c)?,
        }
    }
    f.write_char('\n')
}

fn write_common(f: &mut impl Write, c: char) -> fmt::Result {
    match c {
        '\\' => f.write_str("\\\\"),
        '\n' => f.write_str("\\n"),
        '\r' => f.write_str("\\r"),
        '\t' => f.write_str("\\t"),
        '\x0c' => f.write_str("\\f"),
        // Readers decode ISO-8859-1, so anything outside printable ASCII
        // goes out as UTF-16 `\uXXXX` units.
        ' '..='~' => f.write_char(c),
        _ => {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(f, "\\u{unit:04X}")?;
            }
            Ok(())
        }
    }
}
