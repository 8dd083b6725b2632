//! Tag slug derivation.
//!
//! Slugs are lowercase ASCII words joined by single hyphens. Underscores are
//! word characters and survive inside a slug. Accented Latin letters are
//! folded to their base letter so names decoded from Latin-1 CSV files still
//! produce readable slugs; anything else outside `[a-z0-9_]` acts as a
//! separator or is dropped.

/// Maximum stored slug length (matches the `tags.slug` column).
pub const MAX_SLUG_LEN: usize = 60;

/// Derive a URL-safe slug from a tag name.
///
/// ```rust
/// use contacts_server::store::slug::slugify;
///
/// assert_eq!(slugify("Clientes VIP"), "clientes-vip");
/// assert_eq!(slugify("  Año_2024 "), "ano_2024");
/// assert_eq!(slugify("¿Qué?"), "que");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for ch in name.chars() {
        let mut buf = [0u8; 4];
        let folded = if ch.is_ascii_alphanumeric() || ch == '_' {
            Some(&*ch.to_ascii_lowercase().encode_utf8(&mut buf))
        } else {
            fold_latin1(ch)
        };

        if let Some(folded) = folded {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push_str(folded);
        } else if ch.is_whitespace() || ch == '-' {
            pending_separator = true;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    slug.trim_matches(is_edge_separator).to_string()
}

fn is_edge_separator(ch: char) -> bool {
    ch == '-' || ch == '_'
}

/// Fold an accented Latin-1 letter to lowercase ASCII.
fn fold_latin1(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'À'..='Å' | 'à'..='å' => "a",
        'Æ' | 'æ' => "ae",
        'Ç' | 'ç' => "c",
        'È'..='Ë' | 'è'..='ë' => "e",
        'Ì'..='Ï' | 'ì'..='ï' => "i",
        'Ð' | 'ð' => "d",
        'Ñ' | 'ñ' => "n",
        'Ò'..='Ö' | 'Ø' | 'ò'..='ö' | 'ø' => "o",
        'Ù'..='Ü' | 'ù'..='ü' => "u",
        'Ý' | 'ý' | 'ÿ' => "y",
        'Þ' | 'þ' => "th",
        'ß' => "ss",
        _ => return None,
    };

    Some(folded)
}
