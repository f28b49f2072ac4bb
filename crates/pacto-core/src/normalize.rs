//! Channel-address normalization.
//!
//! Twilio delivers WhatsApp senders as `whatsapp:+5511999999999`, users type
//! numbers with spaces and punctuation, and the store keys on a single
//! canonical form. `normalize_address` is that form's only producer.

/// Canonicalize a messaging-channel address.
///
/// Strips the `whatsapp:` URI prefix, drops spaces, dashes, dots, and
/// parentheses, and keeps one leading `+` followed by digits only.
/// Idempotent: normalizing an already-normalized address is a no-op.
/// Inputs with no digits at all pass through trimmed, so foreign sender
/// ids still key consistently.
pub fn normalize_address(raw: &str) -> String {
    let s = raw.trim();
    let s = s.strip_prefix("whatsapp:").unwrap_or(s);

    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '+' && out.is_empty() {
            out.push('+');
        } else if c.is_ascii_digit() {
            out.push(c);
        }
    }

    if out.is_empty() || out == "+" {
        s.to_string()
    } else {
        out
    }
}
