//! Escaping helpers for serialized documents and filter text

const CHAR_PI_OPEN: &str = "<?char ";
const CHAR_PI_CLOSE: &str = "?>";

fn is_restricted(c: char) -> bool {
    matches!(u32::from(c), 1..=8 | 11..=31 | 127..=132 | 134..=159)
}

/// Replace characters XML cannot carry by `<?char N?>` markers
pub fn xml_escape_restricted(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if is_restricted(c) {
            out.push_str(&format!("<?char {}?>", u32::from(c)));
        } else {
            out.push(c);
        }
    }
    out
}

/// Inverse of [`xml_escape_restricted`]
pub fn xml_unescape_restricted(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find(CHAR_PI_OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + CHAR_PI_OPEN.len()..];
        let decoded = after.find(CHAR_PI_CLOSE).and_then(|end| {
            after[..end]
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &after[end + CHAR_PI_CLOSE.len()..];
            }
            None => {
                out.push_str(CHAR_PI_OPEN);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Double every single quote
pub fn urn_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        out.push(c);
        if c == '\'' {
            out.push('\'');
        }
    }
    out
}

/// Inverse of [`urn_escape`]; an unpaired quote is dropped
pub fn urn_unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_quote = false;
    for c in input.chars() {
        if c == '\'' {
            if pending_quote {
                out.push(c);
                pending_quote = false;
            } else {
                pending_quote = true;
            }
        } else {
            pending_quote = false;
            out.push(c);
        }
    }
    out
}
