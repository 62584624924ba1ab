//! Double Metaphone
//!
//! Lawrence Philips' 2000 algorithm. Produces a primary key and an optional
//! alternate key for words with more than one plausible pronunciation
//! (Germanic, Slavic, Spanish, Italian and similar origins).

/// Primary and alternate Double Metaphone keys, each at most `max_len`
/// characters. The alternate is `None` when it equals the primary.
///
/// ```
/// use fuzzdex_engine::search::phonetic::double_metaphone;
///
/// assert_eq!(double_metaphone("smith", 4), ("SM0".to_string(), Some("XMT".to_string())));
/// assert_eq!(double_metaphone("thing", 4), ("0NK".to_string(), Some("TNK".to_string())));
/// ```
pub fn double_metaphone(word: &str, max_len: usize) -> (String, Option<String>) {
    let mut encoder = Encoder::new(word, max_len);
    encoder.run();
    let primary: String = encoder.primary.chars().take(max_len).collect();
    let secondary: String = encoder.secondary.chars().take(max_len).collect();
    if secondary == primary {
        (primary, None)
    } else {
        (primary, Some(secondary))
    }
}

struct Encoder {
    chars: Vec<char>,
    length: isize,
    last: isize,
    max_len: usize,
    slavo_germanic: bool,
    primary: String,
    secondary: String,
}

impl Encoder {
    fn new(word: &str, max_len: usize) -> Self {
        let chars: Vec<char> = word.to_uppercase().chars().collect();
        let length = chars.len() as isize;
        let upper: String = chars.iter().collect();
        let slavo_germanic = upper.contains('W')
            || upper.contains('K')
            || upper.contains("CZ")
            || upper.contains("WITZ");
        Encoder {
            chars,
            length,
            last: length - 1,
            max_len,
            slavo_germanic,
            primary: String::new(),
            secondary: String::new(),
        }
    }

    /// Character at `pos`; a space past either end.
    fn at(&self, pos: isize) -> char {
        if pos < 0 {
            return ' ';
        }
        self.chars.get(pos as usize).copied().unwrap_or(' ')
    }

    fn is_vowel(&self, pos: isize) -> bool {
        matches!(self.at(pos), 'A' | 'E' | 'I' | 'O' | 'U' | 'Y')
    }

    /// Does the text at `start` match any of `options` (all the same length)?
    /// Runs past the end compare against trailing spaces.
    fn string_at(&self, start: isize, options: &[&str]) -> bool {
        if start < 0 {
            return false;
        }
        options.iter().any(|option| {
            option
                .chars()
                .enumerate()
                .all(|(offset, c)| self.at(start + offset as isize) == c)
        })
    }

    fn add(&mut self, key: &str) {
        self.primary.push_str(key);
        self.secondary.push_str(key);
    }

    fn add2(&mut self, primary: &str, secondary: &str) {
        self.primary.push_str(primary);
        self.secondary.push_str(secondary);
    }

    fn full(&self) -> bool {
        self.primary.len() >= self.max_len && self.secondary.len() >= self.max_len
    }

    fn run(&mut self) {
        let mut current: isize = 0;
        if self.string_at(0, &["GN", "KN", "PN", "WR", "PS"]) {
            current += 1;
        }
        if self.at(0) == 'X' {
            self.add("S");
            current += 1;
        }
        while current < self.length && !self.full() {
            current = match self.at(current) {
                'A' | 'E' | 'I' | 'O' | 'U' | 'Y' => {
                    if current == 0 {
                        self.add("A");
                    }
                    current + 1
                }
                'B' => {
                    self.add("P");
                    current + if self.at(current + 1) == 'B' { 2 } else { 1 }
                }
                'Ç' => {
                    self.add("S");
                    current + 1
                }
                'C' => self.encode_c(current),
                'D' => self.encode_d(current),
                'F' => {
                    self.add("F");
                    current + if self.at(current + 1) == 'F' { 2 } else { 1 }
                }
                'G' => self.encode_g(current),
                'H' => {
                    if (current == 0 || self.is_vowel(current - 1)) && self.is_vowel(current + 1) {
                        self.add("H");
                        current + 2
                    } else {
                        current + 1
                    }
                }
                'J' => self.encode_j(current),
                'K' => {
                    self.add("K");
                    current + if self.at(current + 1) == 'K' { 2 } else { 1 }
                }
                'L' => self.encode_l(current),
                'M' => {
                    self.add("M");
                    let umb = self.string_at(current - 1, &["UMB"])
                        && (current + 1 == self.last || self.string_at(current + 2, &["ER"]));
                    current + if umb || self.at(current + 1) == 'M' { 2 } else { 1 }
                }
                'N' => {
                    self.add("N");
                    current + if self.at(current + 1) == 'N' { 2 } else { 1 }
                }
                'Ñ' => {
                    self.add("N");
                    current + 1
                }
                'P' => {
                    if self.at(current + 1) == 'H' {
                        self.add("F");
                        current + 2
                    } else {
                        self.add("P");
                        current + if self.string_at(current + 1, &["P", "B"]) { 2 } else { 1 }
                    }
                }
                'Q' => {
                    self.add("K");
                    current + if self.at(current + 1) == 'Q' { 2 } else { 1 }
                }
                'R' => {
                    if current == self.last
                        && !self.slavo_germanic
                        && self.string_at(current - 2, &["IE"])
                        && !self.string_at(current - 4, &["ME", "MA"])
                    {
                        self.add2("", "R");
                    } else {
                        self.add("R");
                    }
                    current + if self.at(current + 1) == 'R' { 2 } else { 1 }
                }
                'S' => self.encode_s(current),
                'T' => self.encode_t(current),
                'V' => {
                    self.add("F");
                    current + if self.at(current + 1) == 'V' { 2 } else { 1 }
                }
                'W' => self.encode_w(current),
                'X' => {
                    let french = current == self.last
                        && (self.string_at(current - 3, &["IAU", "EAU"])
                            || self.string_at(current - 2, &["AU", "OU"]));
                    if !french {
                        self.add("KS");
                    }
                    current + if self.string_at(current + 1, &["C", "X"]) { 2 } else { 1 }
                }
                'Z' => self.encode_z(current),
                _ => current + 1,
            };
        }
    }

    fn germanic(&self) -> bool {
        self.string_at(0, &["VAN ", "VON "]) || self.string_at(0, &["SCH"])
    }

    fn encode_c(&mut self, current: isize) -> isize {
        if current > 1
            && !self.is_vowel(current - 2)
            && self.string_at(current - 1, &["ACH"])
            && self.at(current + 2) != 'I'
            && (self.at(current + 2) != 'E' || self.string_at(current - 2, &["BACHER", "MACHER"]))
        {
            self.add("K");
            return current + 2;
        }
        if current == 0 && self.string_at(current, &["CAESAR"]) {
            self.add("S");
            return current + 2;
        }
        if self.string_at(current, &["CHIA"]) {
            self.add("K");
            return current + 2;
        }
        if self.string_at(current, &["CH"]) {
            if current > 0 && self.string_at(current, &["CHAE"]) {
                self.add2("K", "X");
                return current + 2;
            }
            if current == 0
                && (self.string_at(current + 1, &["HARAC", "HARIS"])
                    || self.string_at(current + 1, &["HOR", "HYM", "HIA", "HEM"]))
                && !self.string_at(0, &["CHORE"])
            {
                self.add("K");
                return current + 2;
            }
            let hard = self.germanic()
                || self.string_at(current - 2, &["ORCHES", "ARCHIT", "ORCHID"])
                || self.string_at(current + 2, &["T", "S"])
                || ((current == 0 || self.string_at(current - 1, &["A", "O", "U", "E"]))
                    && self.string_at(
                        current + 2,
                        &["L", "R", "N", "M", "B", "H", "F", "V", "W", " "],
                    ));
            if hard {
                self.add("K");
            } else if current > 0 {
                if self.string_at(0, &["MC"]) {
                    self.add("K");
                } else {
                    self.add2("X", "K");
                }
            } else {
                self.add("X");
            }
            return current + 2;
        }
        if self.string_at(current, &["CZ"]) && !self.string_at(current - 2, &["WICZ"]) {
            self.add2("S", "X");
            return current + 2;
        }
        if self.string_at(current + 1, &["CIA"]) {
            self.add("X");
            return current + 3;
        }
        if self.string_at(current, &["CC"]) && !(current == 1 && self.at(0) == 'M') {
            if self.string_at(current + 2, &["I", "E", "H"]) && !self.string_at(current + 2, &["HU"]) {
                if (current == 1 && self.at(current - 1) == 'A')
                    || self.string_at(current - 1, &["UCCEE", "UCCES"])
                {
                    self.add("KS");
                } else {
                    self.add("X");
                }
                return current + 3;
            }
            self.add("K");
            return current + 2;
        }
        if self.string_at(current, &["CK", "CG", "CQ"]) {
            self.add("K");
            return current + 2;
        }
        if self.string_at(current, &["CI", "CE", "CY"]) {
            if self.string_at(current, &["CIO", "CIE", "CIA"]) {
                self.add2("S", "X");
            } else {
                self.add("S");
            }
            return current + 2;
        }
        self.add("K");
        if self.string_at(current + 1, &[" C", " Q", " G"]) {
            current + 3
        } else if self.string_at(current + 1, &["C", "K", "Q"])
            && !self.string_at(current + 1, &["CE", "CI"])
        {
            current + 2
        } else {
            current + 1
        }
    }

    fn encode_d(&mut self, current: isize) -> isize {
        if self.string_at(current, &["DG"]) {
            if self.string_at(current + 2, &["I", "E", "Y"]) {
                self.add("J");
                return current + 3;
            }
            self.add("TK");
            return current + 2;
        }
        self.add("T");
        if self.string_at(current, &["DT", "DD"]) {
            current + 2
        } else {
            current + 1
        }
    }

    fn encode_g(&mut self, current: isize) -> isize {
        if self.at(current + 1) == 'H' {
            if current > 0 && !self.is_vowel(current - 1) {
                self.add("K");
                return current + 2;
            }
            if current == 0 {
                if self.at(current + 2) == 'I' {
                    self.add("J");
                } else {
                    self.add("K");
                }
                return current + 2;
            }
            let silent = (current > 1 && self.string_at(current - 2, &["B", "H", "D"]))
                || (current > 2 && self.string_at(current - 3, &["B", "H", "D"]))
                || (current > 3 && self.string_at(current - 4, &["B", "H"]));
            if !silent {
                if current > 2
                    && self.at(current - 1) == 'U'
                    && self.string_at(current - 3, &["C", "G", "L", "R", "T"])
                {
                    self.add("F");
                } else if current > 0 && self.at(current - 1) != 'I' {
                    self.add("K");
                }
            }
            return current + 2;
        }
        if self.at(current + 1) == 'N' {
            if current == 1 && self.is_vowel(0) && !self.slavo_germanic {
                self.add2("KN", "N");
            } else if !self.string_at(current + 2, &["EY"])
                && self.at(current + 1) != 'Y'
                && !self.slavo_germanic
            {
                self.add2("N", "KN");
            } else {
                self.add("KN");
            }
            return current + 2;
        }
        if self.string_at(current + 1, &["LI"]) && !self.slavo_germanic {
            self.add2("KL", "L");
            return current + 2;
        }
        if current == 0
            && (self.at(current + 1) == 'Y'
                || self.string_at(
                    current + 1,
                    &["ES", "EP", "EB", "EL", "EY", "IB", "IL", "IN", "IE", "EI", "ER"],
                ))
        {
            self.add2("K", "J");
            return current + 2;
        }
        if (self.string_at(current + 1, &["ER"]) || self.at(current + 1) == 'Y')
            && !self.string_at(0, &["DANGER", "RANGER", "MANGER"])
            && !self.string_at(current - 1, &["E", "I"])
            && !self.string_at(current - 1, &["RGY", "OGY"])
        {
            self.add2("K", "J");
            return current + 2;
        }
        if self.string_at(current + 1, &["E", "I", "Y"])
            || self.string_at(current - 1, &["AGGI", "OGGI"])
        {
            if self.germanic() || self.string_at(current + 1, &["ET"]) {
                self.add("K");
            } else if self.string_at(current + 1, &["IER "]) {
                self.add("J");
            } else {
                self.add2("J", "K");
            }
            return current + 2;
        }
        self.add("K");
        current + if self.at(current + 1) == 'G' { 2 } else { 1 }
    }

    fn encode_j(&mut self, current: isize) -> isize {
        if self.string_at(current, &["JOSE"]) || self.string_at(0, &["SAN "]) {
            if (current == 0 && self.at(current + 4) == ' ') || self.string_at(0, &["SAN "]) {
                self.add("H");
            } else {
                self.add2("J", "H");
            }
            return current + 1;
        }
        if current == 0 {
            self.add2("J", "A");
        } else if self.is_vowel(current - 1)
            && !self.slavo_germanic
            && matches!(self.at(current + 1), 'A' | 'O')
        {
            self.add2("J", "H");
        } else if current == self.last {
            self.add2("J", "");
        } else if !self.string_at(current + 1, &["L", "T", "K", "S", "N", "M", "B", "Z"])
            && !self.string_at(current - 1, &["S", "K", "L"])
        {
            self.add("J");
        }
        current + if self.at(current + 1) == 'J' { 2 } else { 1 }
    }

    fn encode_l(&mut self, current: isize) -> isize {
        if self.at(current + 1) == 'L' {
            let spanish = (current == self.length - 3
                && self.string_at(current - 1, &["ILLO", "ILLA", "ALLE"]))
                || ((self.string_at(self.last - 1, &["AS", "OS"])
                    || self.string_at(self.last, &["A", "O"]))
                    && self.string_at(current - 1, &["ALLE"]));
            if spanish {
                self.add2("L", "");
            } else {
                self.add("L");
            }
            return current + 2;
        }
        self.add("L");
        current + 1
    }

    fn encode_s(&mut self, current: isize) -> isize {
        if self.string_at(current - 1, &["ISL", "YSL"]) {
            return current + 1;
        }
        if current == 0 && self.string_at(current, &["SUGAR"]) {
            self.add2("X", "S");
            return current + 1;
        }
        if self.string_at(current, &["SH"]) {
            if self.string_at(current + 1, &["HEIM", "HOEK", "HOLM", "HOLZ"]) {
                self.add("S");
            } else {
                self.add("X");
            }
            return current + 2;
        }
        if self.string_at(current, &["SIO", "SIA"]) || self.string_at(current, &["SIAN"]) {
            if self.slavo_germanic {
                self.add("S");
            } else {
                self.add2("S", "X");
            }
            return current + 3;
        }
        if (current == 0 && self.string_at(current + 1, &["M", "N", "L", "W"]))
            || self.string_at(current + 1, &["Z"])
        {
            self.add2("S", "X");
            return current + if self.string_at(current + 1, &["Z"]) { 2 } else { 1 };
        }
        if self.string_at(current, &["SC"]) {
            if self.at(current + 2) == 'H' {
                if self.string_at(current + 3, &["OO", "ER", "EN", "UY", "ED", "EM"]) {
                    if self.string_at(current + 3, &["ER", "EN"]) {
                        self.add2("X", "SK");
                    } else {
                        self.add("SK");
                    }
                } else if current == 0 && !self.is_vowel(3) && self.at(3) != 'W' {
                    self.add2("X", "S");
                } else {
                    self.add("X");
                }
                return current + 3;
            }
            if self.string_at(current + 2, &["I", "E", "Y"]) {
                self.add("S");
            } else {
                self.add("SK");
            }
            return current + 3;
        }
        if current == self.last && self.string_at(current - 2, &["AI", "OI"]) {
            self.add2("", "S");
        } else {
            self.add("S");
        }
        current + if self.string_at(current + 1, &["S", "Z"]) { 2 } else { 1 }
    }

    fn encode_t(&mut self, current: isize) -> isize {
        if self.string_at(current, &["TION"]) || self.string_at(current, &["TIA", "TCH"]) {
            self.add("X");
            return current + 3;
        }
        if self.string_at(current, &["TH"]) || self.string_at(current, &["TTH"]) {
            if self.string_at(current + 2, &["OM", "AM"]) || self.germanic() {
                self.add("T");
            } else {
                self.add2("0", "T");
            }
            return current + 2;
        }
        self.add("T");
        current + if self.string_at(current + 1, &["T", "D"]) { 2 } else { 1 }
    }

    fn encode_w(&mut self, current: isize) -> isize {
        if self.string_at(current, &["WR"]) {
            self.add("R");
            return current + 2;
        }
        if current == 0 && (self.is_vowel(current + 1) || self.string_at(current, &["WH"])) {
            if self.is_vowel(current + 1) {
                self.add2("A", "F");
            } else {
                self.add("A");
            }
        }
        if (current == self.last && self.is_vowel(current - 1))
            || self.string_at(current - 1, &["EWSKI", "EWSKY", "OWSKI", "OWSKY"])
            || self.string_at(0, &["SCH"])
        {
            self.add2("", "F");
            return current + 1;
        }
        if self.string_at(current, &["WICZ", "WITZ"]) {
            self.add2("TS", "FX");
            return current + 4;
        }
        current + 1
    }

    fn encode_z(&mut self, current: isize) -> isize {
        if self.at(current + 1) == 'H' {
            self.add("J");
            return current + 2;
        }
        if self.string_at(current + 1, &["ZO", "ZI", "ZA"])
            || (self.slavo_germanic && current > 0 && self.at(current - 1) != 'T')
        {
            self.add2("S", "TS");
        } else {
            self.add("S");
        }
        current + if self.at(current + 1) == 'Z' { 2 } else { 1 }
    }
}
