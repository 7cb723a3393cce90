//! Minimal HTML entity decoding for scraped text fragments.
//!
//! The site only ever emits a handful of named entities plus numeric escapes
//! in titles and descriptions, so a single tolerant pass is enough. Anything
//! unrecognized is passed through verbatim.

/// Decodes named and numeric HTML entities in `input`.
///
/// Runs in a single pass, so double-escaped text like `&amp;amp;` decodes to
/// `&amp;` rather than `&`.
pub fn decode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        // Entities are short. If no ';' shows up close by, this '&' is literal.
        let semi = rest[1..].find(';').map(|i| i + 1);
        match semi {
            Some(end) if end <= 10 => match decode_entity(&rest[1..end]) {
                Some(ch) => {
                    out.push(ch);
                    rest = &rest[end + 1..];
                }
                None => {
                    out.push('&');
                    rest = &rest[1..];
                }
            },
            _ => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}
