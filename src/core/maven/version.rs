// ─── Artifact Versions ───
// Maven-flavoured version ordering for embedded jars.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::core::error::{JarJarError, JarJarResult};

/// Rank of the release (empty) qualifier. Qualifiers below it sort before
/// the plain release, qualifiers above it after.
const RELEASE_RANK: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Item {
    Number(u64),
    /// Digits beyond `u64`, leading zeros stripped.
    BigNumber(String),
    Qualifier(String),
}

fn qualifier_rank(q: &str) -> u8 {
    match q {
        "alpha" => 0,
        "beta" => 1,
        "milestone" => 2,
        "rc" => 3,
        "snapshot" => 4,
        "" => RELEASE_RANK,
        "sp" => 6,
        _ => 7,
    }
}

fn canonical_qualifier(raw: &str) -> String {
    let lower = raw.to_ascii_lowercase();
    match lower.as_str() {
        "a" => "alpha".to_string(),
        "b" => "beta".to_string(),
        "m" => "milestone".to_string(),
        "cr" => "rc".to_string(),
        "ga" | "final" | "release" => String::new(),
        _ => lower,
    }
}

fn compare_qualifiers(a: &str, b: &str) -> Ordering {
    qualifier_rank(a)
        .cmp(&qualifier_rank(b))
        .then_with(|| a.cmp(b))
}

/// Compare one item against the implicit padding of a shorter version.
fn compare_to_padding(item: &Item) -> Ordering {
    match item {
        Item::Number(0) => Ordering::Equal,
        Item::Number(_) | Item::BigNumber(_) => Ordering::Greater,
        Item::Qualifier(q) => qualifier_rank(q).cmp(&RELEASE_RANK),
    }
}

fn compare_items(a: &Item, b: &Item) -> Ordering {
    match (a, b) {
        (Item::Number(x), Item::Number(y)) => x.cmp(y),
        (Item::Number(_), Item::BigNumber(_)) => Ordering::Less,
        (Item::BigNumber(_), Item::Number(_)) => Ordering::Greater,
        (Item::BigNumber(x), Item::BigNumber(y)) => x.len().cmp(&y.len()).then_with(|| x.cmp(y)),
        (Item::Number(_) | Item::BigNumber(_), Item::Qualifier(_)) => Ordering::Greater,
        (Item::Qualifier(_), Item::Number(_) | Item::BigNumber(_)) => Ordering::Less,
        (Item::Qualifier(x), Item::Qualifier(y)) => compare_qualifiers(x, y),
    }
}

fn push_token(token: &mut String, is_digit: bool, items: &mut Vec<Item>) {
    if token.is_empty() {
        return;
    }
    let item = if is_digit {
        match token.parse::<u64>() {
            Ok(n) => Item::Number(n),
            // Only overflow can fail here: the token is all ASCII digits.
            Err(_) => Item::BigNumber(token.trim_start_matches('0').to_string()),
        }
    } else {
        Item::Qualifier(canonical_qualifier(token))
    };
    items.push(item);
    token.clear();
}

/// Splits on separators and on every digit/non-digit transition.
fn tokenize(raw: &str) -> Vec<Item> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut current_is_digit = false;

    for c in raw.chars() {
        if matches!(c, '.' | '-' | '_' | '+') {
            push_token(&mut current, current_is_digit, &mut items);
            continue;
        }
        let is_digit = c.is_ascii_digit();
        if !current.is_empty() && is_digit != current_is_digit {
            push_token(&mut current, current_is_digit, &mut items);
        }
        current_is_digit = is_digit;
        current.push(c);
    }
    push_token(&mut current, current_is_digit, &mut items);

    items
}

/// Drops release qualifiers and the trailing zeros of every numeric run that
/// ends at a qualifier or at the end, so `1.0-final` == `1` and
/// `1.0-alpha` == `1-alpha`.
fn normalize(items: Vec<Item>) -> Vec<Item> {
    fn flush(run: &mut Vec<Item>, out: &mut Vec<Item>) {
        while matches!(run.last(), Some(Item::Number(0))) {
            run.pop();
        }
        out.append(run);
    }

    let mut out = Vec::with_capacity(items.len());
    let mut run = Vec::new();
    for item in items {
        match item {
            Item::Qualifier(ref q) if q.is_empty() => {}
            Item::Number(_) | Item::BigNumber(_) => run.push(item),
            Item::Qualifier(_) => {
                flush(&mut run, &mut out);
                out.push(item);
            }
        }
    }
    flush(&mut run, &mut out);
    out
}

/// A totally ordered artifact version such as `1.20.4`, `2.0-rc1` or
/// `3.1.0-SNAPSHOT`.
///
/// Numeric segments compare numerically and trailing zero segments are
/// insignificant. Known qualifiers order as
/// `alpha < beta < milestone < rc < snapshot < release < sp`; unknown
/// qualifiers sort after `sp`, lexically among themselves.
#[derive(Debug, Clone)]
pub struct ArtifactVersion {
    raw: String,
    items: Vec<Item>,
}

impl ArtifactVersion {
    pub fn parse(raw: &str) -> JarJarResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(JarJarError::InvalidVersion(raw.to_string()));
        }
        let items = normalize(tokenize(trimmed));
        Ok(Self {
            raw: trimmed.to_string(),
            items,
        })
    }

    /// The version exactly as it was written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Ord for ArtifactVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.items.len().max(other.items.len());
        for idx in 0..len {
            let ord = match (self.items.get(idx), other.items.get(idx)) {
                (Some(a), Some(b)) => compare_items(a, b),
                (Some(a), None) => compare_to_padding(a),
                (None, Some(b)) => compare_to_padding(b).reverse(),
                (None, None) => Ordering::Equal,
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for ArtifactVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ArtifactVersion {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for ArtifactVersion {}

impl Hash for ArtifactVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.items.hash(state);
    }
}

impl FromStr for ArtifactVersion {
    type Err = JarJarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ArtifactVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for ArtifactVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for ArtifactVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
