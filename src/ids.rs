use chrono::Utc;
use rand::Rng;

const SUFFIX_LEN: usize = 5;
const AUTHOR_SEGMENT_LEN: usize = 10;

/// Id for a root aggregate: `<author>-<base36 millis>-<random>`.
///
/// The author segment is lowercased and every character outside `[a-z0-9]`
/// becomes a hyphen, so the id is always safe to use in a URL path.
pub fn generate_id(author: &str) -> String {
    let author = if author.trim().is_empty() {
        "anonymous"
    } else {
        author
    };

    let safe_author: String = author
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .take(AUTHOR_SEGMENT_LEN)
        .collect();

    format!(
        "{}-{}-{}",
        safe_author,
        to_base36(now_millis()),
        random_suffix(SUFFIX_LEN)
    )
}

/// Id for an owned child record such as a comment or milestone.
pub fn prefixed_id(prefix: &str) -> String {
    format!("{}-{}-{}", prefix, now_millis(), random_suffix(SUFFIX_LEN))
}

/// Member ids are derived from the display name so that logging in twice
/// with the same name lands on the same record.
pub fn member_id(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn now_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        let d = (n % 36) as u32;
        digits.push(std::char::from_digit(d, 36).unwrap_or('0'));
        n /= 36;
    }
    digits.iter().rev().collect()
}

fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| std::char::from_digit(rng.gen_range(0..36), 36).unwrap_or('0'))
        .collect()
}
