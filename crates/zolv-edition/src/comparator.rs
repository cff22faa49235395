//! Segment-wise version comparison

use std::cmp::Ordering;

/// Compare two version (or release) strings the way rpm does.
///
/// Both strings are split into alternating runs of digits and letters; any
/// other character only separates runs. Numeric runs compare by value, alpha
/// runs lexically, and a numeric run is always newer than an alpha run. A
/// tilde sorts before everything, including the end of the string, so
/// `1.0~rc1` is older than `1.0`.
///
/// Returns `Ordering::Greater` if `a` is newer than `b`.
pub fn compare_segments(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let one = a.as_bytes();
    let two = b.as_bytes();
    let (mut i, mut j) = (0usize, 0usize);

    loop {
        while i < one.len() && !one[i].is_ascii_alphanumeric() && one[i] != b'~' {
            i += 1;
        }
        while j < two.len() && !two[j].is_ascii_alphanumeric() && two[j] != b'~' {
            j += 1;
        }

        let one_tilde = i < one.len() && one[i] == b'~';
        let two_tilde = j < two.len() && two[j] == b'~';
        if one_tilde || two_tilde {
            if !one_tilde {
                return Ordering::Greater;
            }
            if !two_tilde {
                return Ordering::Less;
            }
            i += 1;
            j += 1;
            continue;
        }

        if i >= one.len() || j >= two.len() {
            break;
        }

        let numeric = one[i].is_ascii_digit();
        let take = |s: &[u8], mut k: usize| {
            let start = k;
            while k < s.len() && (if numeric { s[k].is_ascii_digit() } else { s[k].is_ascii_alphabetic() }) {
                k += 1;
            }
            (start, k)
        };

        let (s1, e1) = take(one, i);
        let (s2, e2) = take(two, j);
        i = e1;
        j = e2;

        if s2 == e2 {
            // Segment types differ: numbers are newer than letters
            return if numeric { Ordering::Greater } else { Ordering::Less };
        }

        let seg1 = &one[s1..e1];
        let seg2 = &two[s2..e2];

        let result = if numeric {
            let seg1 = trim_leading_zeros(seg1);
            let seg2 = trim_leading_zeros(seg2);
            seg1.len().cmp(&seg2.len()).then_with(|| seg1.cmp(seg2))
        } else {
            seg1.cmp(seg2)
        };

        if result != Ordering::Equal {
            return result;
        }
    }

    match (i >= one.len(), j >= two.len()) {
        (true, true) => Ordering::Equal,
        (false, _) => Ordering::Greater,
        (true, false) => Ordering::Less,
    }
}

fn trim_leading_zeros(s: &[u8]) -> &[u8] {
    let zeros = s.iter().take_while(|&&c| c == b'0').count();
    &s[zeros..]
}
