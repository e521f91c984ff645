//! Ratcliff/Obershelp string similarity.
//!
//! The ratio is `2 * M / T`, where `T` is the combined length of both strings
//! and `M` is the number of characters covered by the matching blocks found by
//! repeatedly taking the longest common block and recursing on the unmatched
//! text to its left and right.

/// Similarity ratio in `0.0..=1.0` (1.0 means identical)
///
/// Two empty strings are considered identical.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matched_chars(&a, &b) as f64 / total as f64
}

/// Total length of all matching blocks between `a` and `b`
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;

        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`
///
/// Returns `(i, j, size)`. Among equally long blocks the one starting
/// earliest in `a` wins, then the one starting earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    if alo >= ahi || blo >= bhi {
        return (best_i, best_j, best_size);
    }

    // run[x + 1] = length of the common run ending at a[i], b[blo + x]
    let width = bhi - blo;
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let run = if a[i] == b[j] { prev[j - blo] + 1 } else { 0 };
            curr[j - blo + 1] = run;
            if run > best_size {
                best_i = i + 1 - run;
                best_j = j + 1 - run;
                best_size = run;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (best_i, best_j, best_size)
}
