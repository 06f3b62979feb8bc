//! Education component: compares degree levels on a fixed hierarchy.

use tracing::debug;

/// Degree keywords and their level. Abbreviations must appear as a whole token;
/// the longer words also match as a prefix ("bachelor's", "masters").
const DEGREE_LEVELS: &[(&str, u8)] = &[
    ("phd", 4),
    ("doctorate", 4),
    ("master", 3),
    ("mba", 3),
    ("msc", 3),
    ("meng", 3),
    ("m.sc", 3),
    ("m.eng", 3),
    ("bachelor", 2),
    ("undergraduate", 2),
    ("bs", 2),
    ("bsc", 2),
    ("ba", 2),
    ("beng", 2),
    ("b.s", 2),
    ("b.sc", 2),
    ("b.a", 2),
    ("b.eng", 2),
    ("associate", 1),
    ("diploma", 1),
    ("certificate", 1),
];

/// Keywords at least this long match as a token prefix.
const PREFIX_MIN_LEN: usize = 6;

const NOT_REQUIRED: &[&str] = &["none", "none specified", "n/a", "not specified"];

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '.'))
        .map(|token| token.trim_matches('.'))
        .filter(|token| !token.is_empty())
}

/// Highest degree level mentioned in `text`, 0 when none is recognised.
pub fn degree_level(text: &str) -> u8 {
    let lowered = text.to_lowercase();
    tokens(&lowered)
        .flat_map(|token| {
            DEGREE_LEVELS.iter().filter_map(move |(keyword, level)| {
                let hit = token == *keyword
                    || (keyword.len() >= PREFIX_MIN_LEN && token.starts_with(keyword));
                hit.then_some(*level)
            })
        })
        .max()
        .unwrap_or(0)
}

pub fn education_match(required: Option<&str>, cv_education: &[String]) -> f64 {
    let required = match required.map(str::trim) {
        Some(r) if !r.is_empty() && !NOT_REQUIRED.contains(&r.to_lowercase().as_str()) => r,
        _ => {
            debug!("  JD education not specified");
            return 0.5;
        }
    };

    if cv_education.is_empty() {
        debug!("  CV education empty");
        return 0.0;
    }

    let jd_level = degree_level(required);
    if jd_level == 0 {
        debug!("  JD education '{required}' has no recognised degree level");
        return 0.5;
    }

    let cv_level = cv_education
        .iter()
        .map(|entry| degree_level(entry))
        .max()
        .unwrap_or(0);
    debug!("  Education levels: JD {jd_level}, CV {cv_level}");

    if cv_level >= jd_level {
        1.0
    } else {
        0.0
    }
}
