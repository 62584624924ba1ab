//! Soundex variants
//!
//! - [`soundex`]: the original rule set. Vowels, `H`, `W` and `Y` separate
//!   repeated codes; any unknown character after the first rejects the word.
//! - [`american_soundex`]: the common American variation. `H`, `W` and `Y`
//!   do not separate codes, leading non-letters are skipped, and keys may be
//!   longer than four characters.

/// Classic code of an uppercase character: `'0'` for separators,
/// `None` for characters outside the table.
fn classic_code(c: char) -> Option<char> {
    let code = match c {
        'A' | 'E' | 'I' | 'O' | 'U' | 'Y' | 'H' | 'W' => '0',
        'B' | 'P' | 'F' | 'V' => '1',
        'C' | 'S' | 'K' | 'G' | 'J' | 'Q' | 'X' | 'Z' => '2',
        'D' | 'T' => '3',
        'L' => '4',
        'M' | 'N' => '5',
        'R' => '6',
        _ => return None,
    };
    Some(code)
}

/// Four-character classic soundex key.
///
/// The first character is kept as-is (even a digit or punctuation); every
/// later character must be an ASCII letter or the word has no key.
///
/// ```
/// use fuzzdex_engine::search::phonetic::soundex;
///
/// assert_eq!(soundex("robert").as_deref(), Some("R163"));
/// assert_eq!(soundex("too-much"), None);
/// ```
pub fn soundex(word: &str) -> Option<String> {
    let upper: Vec<char> = word.to_uppercase().chars().collect();
    let (&first, rest) = upper.split_first()?;
    let mut key = String::from(first);
    let mut last_code = classic_code(first);
    for &c in rest {
        if key.chars().count() == 4 {
            return Some(key);
        }
        match classic_code(c)? {
            '0' => last_code = None,
            code if Some(code) != last_code => {
                key.push(code);
                last_code = Some(code);
            }
            _ => {}
        }
    }
    while key.chars().count() < 4 {
        key.push('0');
    }
    Some(key)
}

/// American code of a lowercase ASCII letter: `'0'` for vowels, `None` for
/// `h`, `w`, `y` and everything outside `a..=z`.
fn american_code(c: char) -> Option<char> {
    let code = match c {
        'a' | 'e' | 'i' | 'o' | 'u' => '0',
        'b' | 'f' | 'p' | 'v' => '1',
        'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => '2',
        'd' | 't' => '3',
        'l' => '4',
        'm' | 'n' => '5',
        'r' => '6',
        _ => return None,
    };
    Some(code)
}

/// American soundex key of up to `max_len` characters, padded to four.
///
/// Starts at the first alphabetic character; `None` when there is none.
///
/// ```
/// use fuzzdex_engine::search::phonetic::american_soundex;
///
/// assert_eq!(american_soundex("ashcraft", 64).as_deref(), Some("A2613"));
/// assert_eq!(american_soundex("1norm", 64).as_deref(), Some("N650"));
/// ```
pub fn american_soundex(word: &str, max_len: usize) -> Option<String> {
    let mut chars = word.chars().skip_while(|c| !c.is_alphabetic());
    let first = chars.next()?;
    let mut key: String = first.to_uppercase().collect();
    if max_len <= 1 {
        return Some(key);
    }
    let mut last_code = american_code(first);
    for c in chars {
        let Some(code) = american_code(c) else {
            continue;
        };
        if Some(code) == last_code {
            continue;
        }
        if code != '0' {
            key.push(code);
        }
        if key.chars().count() >= max_len {
            return Some(key);
        }
        last_code = Some(code);
    }
    while key.chars().count() < 4 {
        key.push('0');
    }
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Classic ===

    #[test]
    fn test_soundex_basics() {
        assert_eq!(soundex("norm").as_deref(), Some("N650"));
        assert_eq!(soundex("s").as_deref(), Some("S000"));
        assert_eq!(soundex("sh").as_deref(), Some("S000"));
        assert_eq!(soundex("reallylongword").as_deref(), Some("R445"));
        assert_eq!(soundex("").as_deref(), None);
    }

    #[test]
    fn test_soundex_standard_cases() {
        assert_eq!(soundex("robert").as_deref(), Some("R163"));
        assert_eq!(soundex("rupert").as_deref(), Some("R163"));
        assert_eq!(soundex("rubin").as_deref(), Some("R150"));
        assert_eq!(soundex("ashcraft").as_deref(), Some("A226"));
        assert_eq!(soundex("ashcroft").as_deref(), Some("A226"));
        assert_eq!(soundex("tymczak").as_deref(), Some("T522"));
        assert_eq!(soundex("pfister").as_deref(), Some("P236"));
    }

    #[test]
    fn test_soundex_rejects_inner_non_letters() {
        assert_eq!(soundex("tymczäk").as_deref(), None);
        assert_eq!(soundex("too-much").as_deref(), None);
        assert_eq!(soundex("can't").as_deref(), None);
        assert_eq!(soundex("no2r45m").as_deref(), None);
        assert_eq!(soundex("1234").as_deref(), None);
        assert_eq!(soundex("noﾃrm").as_deref(), None);
    }

    #[test]
    fn test_soundex_keeps_odd_first_char() {
        assert_eq!(soundex("-toomuch").as_deref(), Some("-352"));
        assert_eq!(soundex("'cant").as_deref(), Some("'253"));
        assert_eq!(soundex("1norm").as_deref(), Some("1565"));
        assert_eq!(soundex("ﾃnorm").as_deref(), Some("ﾃ565"));
    }

    // === American ===

    #[test]
    fn test_american_basics() {
        assert_eq!(american_soundex("norm", 64).as_deref(), Some("N650"));
        assert_eq!(american_soundex("s", 64).as_deref(), Some("S000"));
        assert_eq!(american_soundex("", 64), None);
        assert_eq!(american_soundex("1234", 64), None);
    }

    #[test]
    fn test_american_long_keys() {
        assert_eq!(american_soundex("reallylongword", 64).as_deref(), Some("R45263"));
        assert_eq!(american_soundex("reallylongword", 5).as_deref(), Some("R4526"));
        assert_eq!(american_soundex("reallylongword", 4).as_deref(), Some("R452"));
        assert_eq!(american_soundex("reallylongword", 1).as_deref(), Some("R"));
    }

    #[test]
    fn test_american_standard_cases() {
        assert_eq!(american_soundex("robert", 64).as_deref(), Some("R163"));
        assert_eq!(american_soundex("rupert", 64).as_deref(), Some("R163"));
        assert_eq!(american_soundex("ashcraft", 64).as_deref(), Some("A2613"));
        assert_eq!(american_soundex("tymczak", 64).as_deref(), Some("T522"));
        assert_eq!(american_soundex("pfister", 64).as_deref(), Some("P236"));
    }

    #[test]
    fn test_american_unicode_tolerance() {
        assert_eq!(american_soundex("tymczäk", 64).as_deref(), Some("T520"));
        assert_eq!(american_soundex("1norm", 64).as_deref(), Some("N650"));
        assert_eq!(american_soundex("-toomuch", 64).as_deref(), Some("T520"));
        assert_eq!(american_soundex("ärm", 64).as_deref(), Some("Ä650"));
    }
}
