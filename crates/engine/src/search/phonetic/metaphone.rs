//! Metaphone
//!
//! Lawrence Philips' original rule set, applied as ordered rewrite passes
//! over the lowercase ASCII letters of a word. Each pass scans left to right
//! and replaces non-overlapping matches; replaced output is uppercase, so later
//! passes never re-match it as a source letter.

const VOWELS: &[u8] = b"aeiou";

fn is_vowel(c: Option<u8>) -> bool {
    c.map_or(false, |c| VOWELS.contains(&c))
}

/// Metaphone key of `word`, or an empty string when it has no ASCII letters.
///
/// ```
/// use fuzzdex_engine::search::phonetic::metaphone;
///
/// assert_eq!(metaphone("thing"), "0NK");
/// assert_eq!(metaphone("knight"), "NT");
/// ```
pub fn metaphone(word: &str) -> String {
    let mut s: Vec<u8> = word
        .bytes()
        .map(|b| b.to_ascii_lowercase())
        .filter(u8::is_ascii_lowercase)
        .collect();

    s = collapse_doubles(&s);
    s = replace_prefix(&s, &["ae"], "E");
    s = replace_prefix(&s, &["gn", "kn", "pn"], "N");
    s = replace_prefix(&s, &["wr"], "R");
    s = replace_prefix(&s, &["x"], "S");
    s = replace_prefix(&s, &["wh"], "W");
    if s.ends_with(b"mb") {
        s.truncate(s.len() - 2);
        s.push(b'M');
    }
    s = rewrite(&s, |s, i| (i > 0 && s[i..].starts_with(b"sch")).then_some((3, b"SK".to_vec())));
    s = rewrite(&s, |s, i| s[i..].starts_with(b"th").then_some((2, b"0".to_vec())));
    s = rewrite(&s, |s, i| {
        let rest = &s[i..];
        if rest.starts_with(b"tch") {
            Some((3, b"X".to_vec()))
        } else if rest.starts_with(b"ch") || rest.starts_with(b"sh") {
            Some((2, b"X".to_vec()))
        } else {
            None
        }
    });
    s = rewrite(&s, |s, i| s[i..].starts_with(b"cia").then_some((1, b"X".to_vec())));
    s = rewrite(&s, |s, i| {
        let hit = matches!(s[i], b's' | b't')
            && s.get(i + 1) == Some(&b'i')
            && matches!(s.get(i + 2), Some(b'a' | b'o'));
        hit.then_some((1, b"X".to_vec()))
    });
    s = rewrite(&s, |s, i| {
        let soft = |c: Option<&u8>| matches!(c, Some(b'i' | b'e' | b'y'));
        if s[i..].starts_with(b"sc") && soft(s.get(i + 2)) {
            Some((2, b"S".to_vec()))
        } else if s[i] == b'c' && soft(s.get(i + 1)) {
            Some((1, b"S".to_vec()))
        } else {
            None
        }
    });
    s = rewrite(&s, |s, i| match s[i] {
        b'c' if s.get(i + 1) == Some(&b'k') => Some((2, b"K".to_vec())),
        b'c' | b'q' => Some((1, b"K".to_vec())),
        _ => None,
    });
    s = rewrite(&s, |s, i| {
        let hit = s[i..].starts_with(b"dg") && matches!(s.get(i + 2), Some(b'i' | b'e' | b'y'));
        hit.then_some((2, b"J".to_vec()))
    });
    s = rewrite(&s, |s, i| (s[i] == b'd').then_some((1, b"T".to_vec())));
    s = rewrite(&s, |s, i| {
        let hit = s[i] == b'g'
            && s.get(i + 1) == Some(&b'h')
            && s.get(i + 2).map_or(false, |c| !VOWELS.contains(c));
        hit.then_some((1, Vec::new()))
    });
    s = rewrite(&s, |s, i| {
        if s[i..].starts_with(b"gned") {
            Some((4, b"N".to_vec()))
        } else if s[i..].starts_with(b"gn") {
            Some((2, b"N".to_vec()))
        } else {
            None
        }
    });
    s = rewrite(&s, |s, i| {
        let soft = |c: Option<&u8>| matches!(c, Some(b'i' | b'e' | b'y'));
        if s[i] != b'g' && s.get(i + 1) == Some(&b'g') && soft(s.get(i + 2)) {
            Some((2, vec![s[i], b'J']))
        } else if i == 0 && s[0] == b'g' && soft(s.get(1)) {
            Some((1, b"J".to_vec()))
        } else {
            None
        }
    });
    s = rewrite(&s, |s, i| {
        if s[i] != b'g' {
            return None;
        }
        let run = s[i..].iter().take_while(|&&c| c == b'g').count();
        Some((run, b"K".to_vec()))
    });
    s = rewrite(&s, |s, i| s[i..].starts_with(b"ph").then_some((2, b"F".to_vec())));
    s = rewrite(&s, |s, i| {
        let hit = is_vowel(Some(s[i]))
            && s.get(i + 1) == Some(&b'h')
            && !is_vowel(s.get(i + 2).copied());
        hit.then_some((2, vec![s[i]]))
    });
    s = rewrite(&s, |s, i| {
        let hit = matches!(s[i], b'w' | b'y') && !is_vowel(s.get(i + 1).copied());
        hit.then_some((1, Vec::new()))
    });
    s = rewrite(&s, |s, i| match s[i] {
        b'z' => Some((1, b"S".to_vec())),
        b'v' => Some((1, b"F".to_vec())),
        _ => None,
    });
    let mut out: Vec<u8> = s
        .iter()
        .enumerate()
        .filter(|&(i, c)| i == 0 || !VOWELS.contains(c))
        .map(|(_, &c)| c)
        .collect();
    out.make_ascii_uppercase();
    String::from_utf8(out).unwrap_or_default()
}

/// Drop repeats of any consonant except `g`.
fn collapse_doubles(s: &[u8]) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::with_capacity(s.len());
    for &c in s {
        let repeat = out.last() == Some(&c) && c != b'g' && !VOWELS.contains(&c);
        if !repeat {
            out.push(c);
        }
    }
    out
}

fn replace_prefix(s: &[u8], prefixes: &[&str], with: &str) -> Vec<u8> {
    match prefixes.iter().find(|p| s.starts_with(p.as_bytes())) {
        Some(p) => [with.as_bytes(), &s[p.len()..]].concat(),
        None => s.to_vec(),
    }
}

/// One rewrite pass. `rule` inspects the untouched input at each position
/// and returns how many bytes it consumes and what to emit instead.
fn rewrite<F>(s: &[u8], rule: F) -> Vec<u8>
where
    F: Fn(&[u8], usize) -> Option<(usize, Vec<u8>)>,
{
    let mut out = Vec::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        match rule(s, i) {
            Some((consumed, emit)) => {
                out.extend_from_slice(&emit);
                i += consumed.max(1);
            }
            None => {
                out.push(s[i]);
                i += 1;
            }
        }
    }
    out
}
