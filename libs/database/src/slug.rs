//! URL slugs for catalog entities.
//!
//! Slugs are lowercase ASCII words joined by `-`. Common Latin accents are
//! folded (`é` -> `e`) and anything else outside `[a-z0-9]` acts as a
//! separator.

/// Slug for `input`; empty when it holds no usable characters.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        let folded = fold_accent(ch);
        match folded {
            Some(c) if c.is_ascii_alphanumeric() => {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c);
            }
            Some('\'') | Some('\u{2019}') => {}
            _ => pending_dash = true,
        }
    }

    slug
}

/// `base`, then `base-2`, `base-3`, ... for the n-th attempt (0-based).
pub fn candidate(base: &str, attempt: u32) -> String {
    match attempt {
        0 => base.to_string(),
        n => format!("{}-{}", base, n + 1),
    }
}

fn fold_accent(c: char) -> Option<char> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'œ' => 'o',
        'æ' => 'a',
        c if c.is_ascii() => c,
        _ => return None,
    };
    Some(folded)
}
