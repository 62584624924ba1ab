//! Porter stemmer
//!
//! Porter, M.F. "An algorithm for suffix stripping." Program 14.3 (1980): 130-137,
//! in the form of the reference implementation: one byte buffer, an end
//! offset `k` and a stem offset `j` set by the last successful [`Stemmer::ends`].
//!
//! Only lowercase ASCII is stemmed. Anything else, and words of one or two
//! letters, come back unchanged.

/// Stem a word.
///
/// # Examples
///
/// ```
/// use fuzzdex_engine::search::stemmer::stem;
///
/// assert_eq!(stem("running"), "run");
/// assert_eq!(stem("caresses"), "caress");
/// assert_eq!(stem("generalization"), "gener");
/// ```
pub fn stem(word: &str) -> String {
    if word.len() <= 2 || !word.bytes().all(|b| b.is_ascii_lowercase()) {
        return word.to_string();
    }
    let mut s = Stemmer::new(word);
    s.step1ab();
    if s.k > 1 {
        s.step1c();
        s.step2();
        s.step3();
        s.step4();
        s.step5();
    }
    s.finish()
}

/// Stem a term and cap it at `max_len` characters (the stored key).
pub fn stem_key(term: &str, max_len: usize) -> String {
    let stemmed = stem(term);
    match stemmed.char_indices().nth(max_len) {
        Some((idx, _)) => stemmed[..idx].to_string(),
        None => stemmed,
    }
}

struct Stemmer {
    b: Vec<u8>,
    /// Length of the word as currently stemmed
    k: usize,
    /// Length of the stem before the suffix last matched by `ends`
    j: usize,
}

impl Stemmer {
    fn new(word: &str) -> Self {
        let b = word.as_bytes().to_vec();
        let k = b.len();
        Stemmer { b, k, j: 0 }
    }

    fn finish(mut self) -> String {
        self.b.truncate(self.k);
        // Only ASCII bytes were ever written.
        String::from_utf8(self.b).unwrap_or_default()
    }

    fn cons(&self, i: usize) -> bool {
        match self.b[i] {
            b'a' | b'e' | b'i' | b'o' | b'u' => false,
            b'y' => i == 0 || !self.cons(i - 1),
            _ => true,
        }
    }

    /// Number of VC sequences in `b[..j]`
    fn m(&self) -> usize {
        let mut n = 0;
        let mut i = 0;
        while i < self.j && self.cons(i) {
            i += 1;
        }
        loop {
            while i < self.j && !self.cons(i) {
                i += 1;
            }
            if i >= self.j {
                return n;
            }
            while i < self.j && self.cons(i) {
                i += 1;
            }
            n += 1;
        }
    }

    fn vowel_in_stem(&self) -> bool {
        (0..self.j).any(|i| !self.cons(i))
    }

    /// `b[i-1..=i]` is a double consonant
    fn double_c(&self, i: usize) -> bool {
        i >= 1 && self.b[i] == self.b[i - 1] && self.cons(i)
    }

    /// `b[i-2..=i]` is consonant-vowel-consonant and `b[i]` is not w, x or y
    fn cvc(&self, i: usize) -> bool {
        if i < 2 || !self.cons(i) || self.cons(i - 1) || !self.cons(i - 2) {
            return false;
        }
        !matches!(self.b[i], b'w' | b'x' | b'y')
    }

    fn ends(&mut self, s: &str) -> bool {
        let s = s.as_bytes();
        if s.len() > self.k || &self.b[self.k - s.len()..self.k] != s {
            return false;
        }
        self.j = self.k - s.len();
        true
    }

    fn set_to(&mut self, s: &str) {
        self.b.truncate(self.j);
        self.b.extend_from_slice(s.as_bytes());
        self.k = self.j + s.len();
    }

    fn r(&mut self, s: &str) {
        if self.m() > 0 {
            self.set_to(s);
        }
    }

    fn last(&self) -> u8 {
        self.b[self.k - 1]
    }

    fn penultimate(&self) -> Option<u8> {
        (self.k >= 2).then(|| self.b[self.k - 2])
    }

    /// Replace the first matching suffix, if its stem has m > 0
    fn replace_first(&mut self, rules: &[(&str, &str)]) {
        for (suffix, replacement) in rules {
            if self.ends(suffix) {
                self.r(replacement);
                return;
            }
        }
    }

    /// Plurals, -ed and -ing
    fn step1ab(&mut self) {
        if self.last() == b's' {
            if self.ends("sses") {
                self.k -= 2;
            } else if self.ends("ies") {
                self.set_to("i");
            } else if self.penultimate() != Some(b's') {
                self.k -= 1;
            }
        }
        if self.ends("eed") {
            if self.m() > 0 {
                self.k -= 1;
            }
        } else if (self.ends("ed") || self.ends("ing")) && self.vowel_in_stem() {
            self.k = self.j;
            if self.ends("at") {
                self.set_to("ate");
            } else if self.ends("bl") {
                self.set_to("ble");
            } else if self.ends("iz") {
                self.set_to("ize");
            } else if self.double_c(self.k - 1) {
                self.k -= 1;
                if matches!(self.last(), b'l' | b's' | b'z') {
                    self.k += 1;
                }
            } else {
                self.j = self.k;
                if self.m() == 1 && self.cvc(self.k - 1) {
                    self.set_to("e");
                }
            }
        }
    }

    /// Terminal y to i when the stem has a vowel
    fn step1c(&mut self) {
        if self.ends("y") && self.vowel_in_stem() {
            let k = self.k;
            self.b[k - 1] = b'i';
        }
    }

    /// Double suffixes to single ones
    fn step2(&mut self) {
        let rules: &[(&str, &str)] = match self.penultimate() {
            Some(b'a') => &[("ational", "ate"), ("tional", "tion")],
            Some(b'c') => &[("enci", "ence"), ("anci", "ance")],
            Some(b'e') => &[("izer", "ize")],
            Some(b'l') => &[
                ("bli", "ble"),
                ("alli", "al"),
                ("entli", "ent"),
                ("eli", "e"),
                ("ousli", "ous"),
            ],
            Some(b'o') => &[("ization", "ize"), ("ation", "ate"), ("ator", "ate")],
            Some(b's') => &[
                ("alism", "al"),
                ("iveness", "ive"),
                ("fulness", "ful"),
                ("ousness", "ous"),
            ],
            Some(b't') => &[("aliti", "al"), ("iviti", "ive"), ("biliti", "ble")],
            Some(b'g') => &[("logi", "log")],
            _ => &[],
        };
        self.replace_first(rules);
    }

    /// -ic-, -full, -ness etc.
    fn step3(&mut self) {
        let rules: &[(&str, &str)] = match self.last() {
            b'e' => &[("icate", "ic"), ("ative", ""), ("alize", "al")],
            b'i' => &[("iciti", "ic")],
            b'l' => &[("ical", "ic"), ("ful", "")],
            b's' => &[("ness", "")],
            _ => &[],
        };
        self.replace_first(rules);
    }

    /// Drop -ant, -ence etc. when m > 1
    fn step4(&mut self) {
        let suffixes: &[&str] = match self.penultimate() {
            Some(b'a') => &["al"],
            Some(b'c') => &["ance", "ence"],
            Some(b'e') => &["er"],
            Some(b'i') => &["ic"],
            Some(b'l') => &["able", "ible"],
            Some(b'n') => &["ant", "ement", "ment", "ent"],
            Some(b'o') => {
                let ion = self.ends("ion") && self.j >= 1 && matches!(self.b[self.j - 1], b's' | b't');
                if !ion && !self.ends("ou") {
                    return;
                }
                &[]
            }
            Some(b's') => &["ism"],
            Some(b't') => &["ate", "iti"],
            Some(b'u') => &["ous"],
            Some(b'v') => &["ive"],
            Some(b'z') => &["ize"],
            _ => return,
        };
        if !suffixes.is_empty() && !suffixes.iter().any(|s| self.ends(s)) {
            return;
        }
        if self.m() > 1 {
            self.k = self.j;
        }
    }

    /// Final -e and -ll
    fn step5(&mut self) {
        self.j = self.k;
        if self.last() == b'e' {
            let a = self.m();
            let cvc = self.k >= 2 && self.cvc(self.k - 2);
            if a > 1 || (a == 1 && !cvc) {
                self.k -= 1;
            }
        }
        if self.last() == b'l' && self.double_c(self.k - 1) && self.m() > 1 {
            self.k -= 1;
        }
    }
}

// ==========================================================================
// Tests
// ==========================================================================
