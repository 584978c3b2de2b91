//! Strips embedded rich-text markup from note fields. Input that does not
//! look like markup passes through unchanged.

/// Destination groups whose content never reaches the plain text.
const SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "info",
    "pict",
    "header",
    "footer",
];

pub fn strip(text: &str) -> String {
    if !text.starts_with("{\\rtf") {
        return text.to_string();
    }

    let bytes = text.as_bytes();
    let mut out = String::new();
    let mut pos = 0;
    // Depth below which output is suppressed; usize::MAX = not suppressed.
    let mut depth: usize = 0;
    let mut skip_below = usize::MAX;

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => {
                depth += 1;
                pos += 1;
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth < skip_below {
                    skip_below = usize::MAX;
                }
                pos += 1;
            }
            b'\\' => {
                pos += 1;
                if pos >= bytes.len() {
                    break;
                }
                match bytes[pos] {
                    b'\\' | b'{' | b'}' => {
                        if skip_below == usize::MAX {
                            out.push(bytes[pos] as char);
                        }
                        pos += 1;
                    }
                    b'\'' => {
                        // Hex escape \'hh
                        let hex: String = text
                            .get(pos + 1..pos + 3)
                            .unwrap_or_default()
                            .to_string();
                        if let Ok(code) = u8::from_str_radix(&hex, 16) {
                            if skip_below == usize::MAX {
                                out.push(code as char);
                            }
                        }
                        pos += 3;
                    }
                    _ => {
                        let word_start = pos;
                        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
                            pos += 1;
                        }
                        let word = &text[word_start..pos];
                        // Optional signed numeric parameter.
                        if pos < bytes.len() && (bytes[pos] == b'-' || bytes[pos].is_ascii_digit()) {
                            pos += 1;
                            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                                pos += 1;
                            }
                        }
                        // A single space after a control word is part of it.
                        if pos < bytes.len() && bytes[pos] == b' ' {
                            pos += 1;
                        }
                        if SKIPPED_DESTINATIONS.contains(&word) {
                            skip_below = skip_below.min(depth);
                        } else if skip_below == usize::MAX {
                            match word {
                                "par" | "line" => out.push('\n'),
                                "tab" => out.push('\t'),
                                _ => {}
                            }
                        }
                    }
                }
            }
            b'\r' | b'\n' => {
                pos += 1;
            }
            c => {
                if skip_below == usize::MAX {
                    out.push(c as char);
                }
                pos += 1;
            }
        }
    }

    out.trim().to_string()
}
