//! HTML character reference decoding.
//!
//! Only needed where Markdown does not interpret entities itself: code
//! spans, code blocks and URLs. Unknown references are left untouched.

use std::borrow::Cow;

use memchr::memchr;

/// Look up a named character reference, given without `&` and `;`.
pub fn lookup_entity(name: &str) -> Option<&'static str> {
    let s = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{00A0}",

        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",

        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "hellip" => "\u{2026}",
        "bull" => "\u{2022}",
        "middot" => "\u{00B7}",
        "laquo" => "\u{00AB}",
        "raquo" => "\u{00BB}",

        "copy" => "\u{00A9}",
        "reg" => "\u{00AE}",
        "trade" => "\u{2122}",
        "times" => "\u{00D7}",
        "divide" => "\u{00F7}",
        "plusmn" => "\u{00B1}",
        "deg" => "\u{00B0}",
        "sect" => "\u{00A7}",
        "para" => "\u{00B6}",
        "euro" => "\u{20AC}",
        "pound" => "\u{00A3}",
        "yen" => "\u{00A5}",
        "cent" => "\u{00A2}",

        "larr" => "\u{2190}",
        "rarr" => "\u{2192}",
        "uarr" => "\u{2191}",
        "darr" => "\u{2193}",
        "harr" => "\u{2194}",
        _ => return None,
    };
    Some(s)
}

fn decode_numeric(body: &str) -> Option<char> {
    let code = match body.strip_prefix(&['x', 'X'][..]) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => body.parse::<u32>().ok()?,
    };
    match code {
        0 => Some('\u{FFFD}'),
        _ => char::from_u32(code),
    }
}

/// Decode `&name;`, `&#NN;` and `&#xHH;` references.
///
/// Borrows the input when it contains no `&`.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if memchr(b'&', text.as_bytes()).is_none() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        // References longer than this are not worth a lookup.
        let semi = tail.find(';').filter(|&i| i > 0 && i <= 32);

        let decoded = semi.and_then(|i| {
            let body = &tail[..i];
            let value = match body.strip_prefix('#') {
                Some(numeric) => decode_numeric(numeric).map(String::from),
                None => lookup_entity(body).map(String::from),
            };
            value.map(|v| (v, i + 1))
        });

        match decoded {
            Some((value, consumed)) => {
                out.push_str(&value);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_entities_borrows() {
        assert!(matches!(decode_entities("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_named() {
        assert_eq!(decode_entities("a &lt;b&gt; &amp; c"), "a <b> & c");
        assert_eq!(decode_entities("&copy; 2007"), "\u{00A9} 2007");
    }

    #[test]
    fn test_numeric() {
        assert_eq!(decode_entities("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(decode_entities("&#0;"), "\u{FFFD}");
    }

    #[test]
    fn test_unknown_left_alone() {
        assert_eq!(decode_entities("&bogus; & &;"), "&bogus; & &;");
        assert_eq!(decode_entities("AT&T"), "AT&T");
        assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
    }
}
