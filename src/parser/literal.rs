//! Decoding of literal token text

use num_bigint::BigInt;
use num_traits::Num;

/// Split off a `0x`/`0o`/`0b` prefix, defaulting to decimal
fn radix_of(text: &str) -> (u32, &str) {
    match text.get(..2) {
        Some("0x" | "0X") => (16, &text[2..]),
        Some("0o" | "0O") => (8, &text[2..]),
        Some("0b" | "0B") => (2, &text[2..]),
        _ => (10, text),
    }
}

fn without_separators(text: &str) -> String {
    text.chars().filter(|&c| c != '_').collect()
}

/// Contents of a quoted string token with escapes resolved. Unknown
/// escapes stand for the escaped character itself.
pub(crate) fn unescape(token: &str) -> String {
    let inner = token
        .get(1..token.len().saturating_sub(1))
        .unwrap_or_default();
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else { break };
        let decoded = match escaped {
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'b' => Some('\u{8}'),
            'f' => Some('\u{c}'),
            'v' => Some('\u{b}'),
            '0' => Some('\0'),
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
            }
            'u' if chars.peek() == Some(&'{') => {
                chars.next();
                let hex: String = chars.by_ref().take_while(|&c| c != '}').collect();
                u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
            }
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
            }
            // Line continuation
            '\n' => None,
            other => Some(other),
        };
        out.extend(decoded);
    }
    out
}

/// Value of a number token, or `None` for a malformed spelling like `0x`
pub(crate) fn number(token: &str) -> Option<f64> {
    let clean = without_separators(token);
    match radix_of(&clean) {
        (10, decimal) => lexical_core::parse::<f64>(decimal.as_bytes()).ok(),
        (_, "") => None,
        (radix, digits) => digits
            .chars()
            .try_fold(0.0f64, |acc, c| c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))),
    }
}

/// Decimal digits of a bigint token such as `0x1Fn` or `42n`
pub(crate) fn bigint(token: &str) -> Option<String> {
    let clean = without_separators(token.strip_suffix('n').unwrap_or(token));
    let (radix, digits) = radix_of(&clean);
    BigInt::from_str_radix(digits, radix).ok().map(|n| n.to_string())
}
