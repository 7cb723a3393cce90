//! Filename normalization for downloaded tracks.
//!
//! The site hands out filenames that range from pristine to garbage: HTML
//! entities, embedded upload UUIDs, underscore soup, characters that no
//! filesystem wants. [`normalize`] runs a fixed washing pipeline over whatever
//! name we got (Content-Disposition header or page title) and always produces
//! a usable, portable filename.
use once_cell::sync::Lazy;
use regex::Regex;

use super::extract::entities;

/// Upload asset ids embedded in served filenames: a six-digit prefix glued to
/// a hex UUID.
static UUID_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d{6}-[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}")
        .unwrap()
});

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static HYPHEN_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-\s*").unwrap());

static SPACE_BEFORE_EXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+(\.[^.]+)$").unwrap());

static INVALID_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());

static CONTROL_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\x00-\x1f\x7f]").unwrap());

/// Cleans `raw_filename` into a portable filename.
///
/// When the raw name washes out to nothing, `fallback_title` (the title shown
/// on the board page) is substituted and cleaned in turn. With no title either,
/// the canonical `audio_<id>.mp3` name is returned as-is.
pub fn normalize(raw_filename: &str, fallback_id: &str, fallback_title: &str) -> String {
    let decoded = entities::decode(raw_filename);
    let stripped = UUID_TOKEN.replace_all(&decoded, "");

    // A name that washed out entirely (or kept only its extension) gets
    // replaced before the cosmetic steps run.
    let trimmed = stripped.trim();
    let mut cleaned = if trimmed.is_empty() || trimmed.starts_with('.') {
        let title = fallback_title.trim();
        if title.is_empty() {
            return format!("audio_{}.mp3", fallback_id);
        }
        format!("{}.mp3", title)
    } else {
        stripped.into_owned()
    };

    cleaned = cleaned.replace('_', " ");
    cleaned = cleaned.replace("--", "-");
    cleaned = WHITESPACE_RUN.replace_all(&cleaned, " ").into_owned();
    cleaned = HYPHEN_RUN.replace_all(&cleaned, " - ").into_owned();
    cleaned = SPACE_BEFORE_EXT.replace_all(&cleaned, "${1}").into_owned();
    cleaned = cleaned.trim().to_string();

    cleaned = INVALID_CHARS.replace_all(&cleaned, "-").into_owned();
    cleaned = CONTROL_CHARS.replace_all(&cleaned, "").into_owned();

    let (stem, ext) = split_extension(&cleaned);
    let mut stem = stem.trim_end_matches(['.', ' ']).to_string();

    if is_all_lowercase(&stem) || is_all_uppercase(&stem) {
        stem = title_case(&stem);
    }

    if is_reserved_device(&stem.to_uppercase()) {
        stem.insert(0, '_');
    }

    let rebuilt = format!("{}{}", stem, ext);
    if rebuilt.is_empty() || rebuilt == ".mp3" {
        return format!("audio_{}.mp3", fallback_id);
    }
    rebuilt
}

/// Splits a bare filename into stem and extension. Leading dots belong to the
/// stem, so `.mp3` alone has no extension.
fn split_extension(name: &str) -> (&str, &str) {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(pos) => name.split_at(leading + pos),
        None => (name, ""),
    }
}

fn is_all_lowercase(s: &str) -> bool {
    s.chars().any(|c| c.is_alphabetic()) && !s.chars().any(|c| c.is_uppercase())
}

fn is_all_uppercase(s: &str) -> bool {
    s.chars().any(|c| c.is_alphabetic()) && !s.chars().any(|c| c.is_lowercase())
}

/// Uppercases every letter that follows a non-letter, lowercases the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// Device names Windows refuses to use as filenames, extension or not.
fn is_reserved_device(stem_upper: &str) -> bool {
    if matches!(stem_upper, "CON" | "PRN" | "AUX" | "NUL") {
        return true;
    }
    match stem_upper
        .strip_prefix("COM")
        .or_else(|| stem_upper.strip_prefix("LPT"))
    {
        Some(digit) => matches!(digit.as_bytes(), [b'1'..=b'9']),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn empty_name_and_title_uses_canonical_fallback() {
        assert_eq!(normalize("", "412233", ""), "audio_412233.mp3");
        assert_eq!(normalize("   ", "412233", "  "), "audio_412233.mp3");
    }

    #[test]
    fn empty_name_falls_back_to_page_title() {
        assert_eq!(normalize("", "42", "parrot noises"), "Parrot Noises.mp3");
        assert_eq!(normalize("", "42", " Movie Quotes "), "Movie Quotes.mp3");
    }

    #[test]
    fn uuid_token_is_stripped() {
        assert_eq!(
            normalize("227896-abcdef12-3456-7890-abcd-ef1234567890.mp3", "7", ""),
            "audio_7.mp3"
        );
        assert_eq!(
            normalize(
                "227896-ABCDEF12-3456-7890-ABCD-EF1234567890.mp3",
                "7",
                "air horn"
            ),
            "Air Horn.mp3"
        );
    }

    #[test]
    fn title_casing_applies_to_single_case_names() {
        assert_eq!(normalize("HELLO WORLD.mp3", "1", ""), "Hello World.mp3");
        assert_eq!(normalize("hello world.mp3", "1", ""), "Hello World.mp3");
        assert_eq!(normalize("Hello World.mp3", "1", ""), "Hello World.mp3");
        assert_eq!(normalize("hELLo WoRLD.mp3", "1", ""), "hELLo WoRLD.mp3");
    }

    #[test]
    fn punctuation_washing() {
        assert_eq!(
            normalize("cool_sound--loud.mp3", "1", ""),
            "Cool Sound - Loud.mp3"
        );
        assert_eq!(normalize("track   .mp3", "1", ""), "Track.mp3");
        assert_eq!(normalize("a  -  b.mp3", "1", ""), "A - B.mp3");
    }

    #[test]
    fn invalid_and_control_characters() {
        assert_eq!(normalize("what?.mp3", "1", ""), "What-.mp3");
        assert_eq!(normalize("a/b\\c.mp3", "1", ""), "A-B-C.mp3");
        assert_eq!(normalize("ab\u{1}c.mp3", "1", ""), "Abc.mp3");
    }

    #[test]
    fn entities_are_decoded() {
        // Title casing treats the apostrophe as a word boundary.
        assert_eq!(normalize("it&#039;s a trap.mp3", "1", ""), "It'S A Trap.mp3");
        assert_eq!(normalize("Tom &amp; Jerry.mp3", "1", ""), "Tom & Jerry.mp3");
    }

    #[test]
    fn reserved_device_names_get_prefixed() {
        assert_eq!(normalize("con.mp3", "1", ""), "_Con.mp3");
        assert_eq!(normalize("com3.mp3", "1", ""), "_Com3.mp3");
        assert_eq!(normalize("LPT9.mp3", "1", ""), "_Lpt9.mp3");
        assert_eq!(normalize("console.mp3", "1", ""), "Console.mp3");
        assert_eq!(normalize("com33.mp3", "1", ""), "Com33.mp3");
    }

    #[test]
    fn trailing_dots_stripped_from_stem() {
        assert_eq!(normalize("name..mp3", "1", ""), "Name.mp3");
    }

    #[test]
    fn normalization_is_idempotent() {
        let words = [
            "alpha", "Bravo", "CHARLIE", "delta", "Echo", "fox", "golf", "HOTEL",
        ];
        let seps = [" ", "-", "_", " - "];
        let mut rng = StdRng::seed_from_u64(0xB0A7);

        for _ in 0..512 {
            let segments = rng.gen_range(1..=4);
            let mut raw = String::new();
            for i in 0..segments {
                if i > 0 {
                    raw.push_str(seps[rng.gen_range(0..seps.len())]);
                }
                raw.push_str(words[rng.gen_range(0..words.len())]);
            }
            raw.push_str(".mp3");

            let once = normalize(&raw, "42", "");
            let twice = normalize(&once, "42", "");
            assert_eq!(once, twice, "raw: {raw:?}");
            assert!(!once.is_empty());
            assert!(!once.starts_with('/'));
        }
    }

    #[test]
    fn normalized_names_are_always_safe() {
        let pool: Vec<char> = "abcXYZ09 _-.<>:\"/\\|?*\u{1}\u{1f}\u{7f}&;#".chars().collect();
        let mut rng = StdRng::seed_from_u64(0x5AFE);

        for _ in 0..512 {
            let len = rng.gen_range(0..24);
            let raw: String = (0..len).map(|_| pool[rng.gen_range(0..pool.len())]).collect();

            let name = normalize(&raw, "42", "");
            assert!(!name.is_empty(), "raw: {raw:?}");
            assert!(
                !name.contains(['<', '>', ':', '"', '/', '\\', '|', '?', '*']),
                "raw: {raw:?} name: {name:?}"
            );
            assert!(
                !name.chars().any(|c| c.is_control()),
                "raw: {raw:?} name: {name:?}"
            );
            let (stem, _) = split_extension(&name);
            assert!(!is_reserved_device(&stem.to_uppercase()), "name: {name:?}");
        }
    }
}
