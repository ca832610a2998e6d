//! Bidirectional codec for the foreign framework's operator-name encoding.
//!
//! The foreign framework stores operator characters in test names as
//! `$`-escapes (`"a + b"` becomes `"a $plus b"`). A test may therefore be
//! referred to by either form, so test-identity matching always checks the
//! raw name and its decoded counterpart. Decoding leaves unknown `$`
//! sequences untouched, which means literal dollar signs survive a round
//! trip through [`decode`].

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Operator characters and their escape names.
const OP_NAMES: &[(char, &str)] = &[
    ('~', "tilde"),
    ('=', "eq"),
    ('<', "less"),
    ('>', "greater"),
    ('!', "bang"),
    ('#', "hash"),
    ('%', "percent"),
    ('^', "up"),
    ('&', "amp"),
    ('|', "bar"),
    ('*', "times"),
    ('/', "div"),
    ('+', "plus"),
    ('-', "minus"),
    (':', "colon"),
    ('\\', "bslash"),
    ('?', "qmark"),
    ('@', "at"),
];

static ENCODE_TABLE: Lazy<HashMap<char, &'static str>> =
    Lazy::new(|| OP_NAMES.iter().copied().collect());

/// Escape names ordered longest-first so prefix escapes never shadow longer ones.
static DECODE_TABLE: Lazy<Vec<(&'static str, char)>> = Lazy::new(|| {
    let mut table: Vec<(&'static str, char)> =
        OP_NAMES.iter().map(|&(ch, name)| (name, ch)).collect();
    table.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    table
});

/// Encodes operator characters in `name` into their `$`-escaped form.
pub fn encode(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        match ENCODE_TABLE.get(&ch) {
            Some(op) => {
                out.push('$');
                out.push_str(op);
            }
            None => out.push(ch),
        }
    }
    out
}

/// Decodes `$`-escaped operator names back to their raw characters.
///
/// Unknown escapes are kept verbatim.
pub fn decode(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut index = 0;
    while index < name.len() {
        let rest = &name[index..];
        if rest.starts_with('$') {
            if let Some(&(op, ch)) = DECODE_TABLE.iter().find(|(op, _)| rest[1..].starts_with(op)) {
                out.push(ch);
                index += 1 + op.len();
                continue;
            }
        }
        match rest.chars().next() {
            Some(ch) => {
                out.push(ch);
                index += ch.len_utf8();
            }
            None => break,
        }
    }
    out
}
