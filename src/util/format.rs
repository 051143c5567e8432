/// Escapes a string constant for a `string@` operand.
///
/// Characters with code points 0 through 32, the backslash and `#` are written
/// as a backslash followed by their three digit decimal code. Everything else,
/// including non-ASCII characters, is copied unchanged.
///
/// ## Example
/// ```
/// use ifj23c::util::format::escape_string;
///
/// assert_eq!(escape_string("a b"), "a\\032b");
/// assert_eq!(escape_string("#\\\n"), "\\035\\092\\010");
/// assert_eq!(escape_string("žluťoučký"), "žluťoučký");
/// ```
#[must_use]
pub fn escape_string(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());

    for c in raw.chars() {
        match c {
            '\u{0}'..='\u{20}' | '\\' | '#' => {
                escaped.push_str(&format!("\\{:03}", u32::from(c)));
            },
            _ => escaped.push(c),
        }
    }

    escaped
}

/// Formats a double the way C's `printf("%a")` does.
///
/// The target machine reads float constants in this exact hexadecimal form,
/// so decimal formatting would lose precision.
///
/// ## Example
/// ```
/// use ifj23c::util::format::hex_float;
///
/// assert_eq!(hex_float(1.5), "0x1.8p+0");
/// assert_eq!(hex_float(2.0), "0x1p+1");
/// assert_eq!(hex_float(0.1), "0x1.999999999999ap-4");
/// assert_eq!(hex_float(-0.0), "-0x0p+0");
/// ```
#[must_use]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_possible_truncation)]
pub fn hex_float(value: f64) -> String {
    let sign = if value.is_sign_negative() { "-" } else { "" };

    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return format!("{sign}inf");
    }

    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let mantissa = bits & 0x000f_ffff_ffff_ffff;

    if biased == 0 && mantissa == 0 {
        return format!("{sign}0x0p+0");
    }

    // Subnormals keep a zero lead digit and the minimum exponent.
    let (lead, exponent) = if biased == 0 { (0, -1022) } else { (1, biased - 1023) };

    let mut digits = format!("{mantissa:013x}");
    while digits.ends_with('0') {
        digits.pop();
    }

    if digits.is_empty() {
        format!("{sign}0x{lead}p{exponent:+}")
    } else {
        format!("{sign}0x{lead}.{digits}p{exponent:+}")
    }
}
