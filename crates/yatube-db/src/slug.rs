use crate::validation::SLUG_MAX_LEN;

fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        'і' => "i",
        'ї' => "yi",
        'є' => "ye",
        'ґ' => "g",
        _ => return None,
    };
    Some(latin)
}

/// Derive a URL slug from a free-form title.
///
/// Cyrillic is transliterated, everything is lowercased, characters outside
/// `[a-z0-9_-]` and whitespace are dropped, and runs of whitespace or hyphens
/// become a single `-`. The result is cut to [`SLUG_MAX_LEN`]. May be empty
/// when the title has nothing slug-worthy in it.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        let piece = match transliterate(c) {
            Some(latin) => latin,
            None if c.is_ascii_alphanumeric() || c == '_' => {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(c);
                continue;
            }
            None if c == '-' || c.is_whitespace() => {
                pending_dash = true;
                continue;
            }
            None => continue,
        };
        if piece.is_empty() {
            continue;
        }
        if pending_dash && !out.is_empty() {
            out.push('-');
        }
        pending_dash = false;
        out.push_str(piece);
    }

    let trimmed = out.trim_matches(|c| c == '-' || c == '_');
    let mut slug: String = trimmed.chars().take(SLUG_MAX_LEN).collect();
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transliterates_cyrillic_title() {
        assert_eq!(slugify("Тестовая группа"), "testovaya-gruppa");
        assert_eq!(slugify("Щука и ёж"), "schuka-i-yozh");
    }

    #[test]
    fn collapses_separators_and_drops_punctuation() {
        assert_eq!(slugify("  Hello,   World -- again!  "), "hello-world-again");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
    }

    #[test]
    fn truncates_to_max_len() {
        let slug = slugify(&"Очень длинное название ".repeat(10));
        assert!(slug.len() <= SLUG_MAX_LEN);
        assert!(!slug.ends_with('-'));
        assert!(slug.starts_with("ochen-dlinnoe-nazvanie"));
    }

    #[test]
    fn nothing_to_keep() {
        assert_eq!(slugify("!!! ???"), "");
        assert_eq!(slugify("ъ"), "");
    }
}
