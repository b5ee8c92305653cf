use std::borrow::Cow;

/// Removes everything that looks like an HTML tag and decodes character
/// references, for consumers storing content under
/// [`CleanMode::StripHtml`](crate::feed::CleanMode).
///
/// - Tag runs `<...>` are dropped, including across newlines; a `<` with
///   no closing `>` is kept literally.
/// - Numeric character references (`&#8217;`, `&#x3042;`) and the XML
///   builtins plus `&nbsp;` are decoded; unknown named entities are kept
///   literally rather than guessed at.
/// - The result is trimmed.
///
/// Returns `Cow::Borrowed` when the input contains no markup, no entities
/// and no surrounding whitespace (common case for plain-text feeds).
pub fn html_clean(s: &str) -> Cow<'_, str> {
    let trimmed = s.trim();
    if !trimmed.contains('<') && !trimmed.contains('&') {
        return Cow::Borrowed(trimmed);
    }

    let mut out = String::with_capacity(trimmed.len());
    let bytes = trimmed.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'<' => {
                // Drop through the matching '>'; unterminated tags stay.
                match trimmed[i..].find('>') {
                    Some(end) => i += end + 1,
                    None => {
                        out.push_str(&trimmed[i..]);
                        break;
                    }
                }
            }
            b'&' => match parse_entity(&trimmed[i..]) {
                Some((c, len)) => {
                    out.push(c);
                    i += len;
                }
                None => {
                    out.push('&');
                    i += 1;
                }
            },
            _ => {
                // Batch-copy the run up to the next '<' or '&'.
                let start = i;
                while i < bytes.len() && bytes[i] != b'<' && bytes[i] != b'&' {
                    i += 1;
                }
                out.push_str(&trimmed[start..i]);
            }
        }
    }

    Cow::Owned(out.trim().to_string())
}

/// Decodes one character reference at the start of `s`, returning the
/// character and the byte length consumed (through the `;`).
fn parse_entity(s: &str) -> Option<(char, usize)> {
    let semi = s.find(';').filter(|&p| p > 1 && p <= 32)?;
    let name = &s[1..semi];
    let len = semi + 1;

    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00a0}',
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?
        }
    };
    Some((c, len))
}
