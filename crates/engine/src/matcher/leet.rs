//! Leet-speak expansion
//!
//! Every character of a term is replaced by each of its substitutes (the
//! character itself first), producing every combination. The table only
//! covers lowercase letters and digits since nothing else reaches the index.

/// Upper bound on combinations produced for one term
pub const MAX_EXPANSIONS: usize = 4096;

/// Substitutes for one character, excluding the character itself
pub fn substitutes(c: char) -> &'static [&'static str] {
    match c {
        '1' => &["i", "l", "t"],
        '2' => &["z"],
        '3' => &["e"],
        '4' => &["a", "h"],
        '5' => &["s"],
        '6' => &["b", "g"],
        '7' => &["l", "t", "z"],
        '8' => &["b"],
        '9' => &["g", "q"],
        '0' => &["d", "o", "q"],
        'a' => &["4"],
        'b' => &["8", "6", "13", "l3"],
        'd' => &["0", "c1", "cl"],
        'e' => &["3"],
        'g' => &["6", "9"],
        'h' => &["4"],
        'i' => &["1"],
        'l' => &["1", "7"],
        'm' => &["nn"],
        'o' => &["0"],
        'q' => &["0", "9"],
        'r' => &["12", "l2"],
        's' => &["5", "z"],
        't' => &["7", "1"],
        'w' => &["uu", "vv"],
        'z' => &["2", "7"],
        _ => &[],
    }
}

/// Every spelling of `term` reachable through the substitution table,
/// starting with `term` itself, at most `cap` of them.
///
/// ```
/// use fuzzdex_engine::matcher::leet::expansions;
///
/// let all = expansions("h1", 16);
/// assert_eq!(all[0], "h1");
/// assert!(all.contains(&"hi".to_string()));
/// assert!(all.contains(&"4l".to_string()));
/// ```
pub fn expansions(term: &str, cap: usize) -> Vec<String> {
    let options: Vec<Vec<String>> = term
        .chars()
        .map(|c| {
            std::iter::once(c.to_string())
                .chain(substitutes(c).iter().map(|s| s.to_string()))
                .collect()
        })
        .collect();
    if options.is_empty() || cap == 0 {
        return Vec::new();
    }

    // Odometer over the option lists, first position turning fastest
    let mut counters = vec![0usize; options.len()];
    let mut out = Vec::new();
    loop {
        let spelling: String = counters
            .iter()
            .zip(&options)
            .map(|(&n, opts)| opts[n].as_str())
            .collect();
        out.push(spelling);
        if out.len() >= cap {
            return out;
        }
        let mut pos = 0;
        loop {
            counters[pos] += 1;
            if counters[pos] < options[pos].len() {
                break;
            }
            counters[pos] = 0;
            pos += 1;
            if pos == options.len() {
                return out;
            }
        }
    }
}
