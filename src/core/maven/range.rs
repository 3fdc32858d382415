// ─── Version Ranges ───
// Maven range syntax: `[1.0,2.0)`, `[1.0]`, `(,1.0],[1.2,)` or a bare `1.0`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::version::ArtifactVersion;
use crate::core::error::{JarJarError, JarJarResult};

/// One end of a restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: ArtifactVersion,
    pub inclusive: bool,
}

/// A single contiguous interval; `None` bounds are open-ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

impl Restriction {
    /// The interval containing every version.
    pub fn everything() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    pub fn contains(&self, version: &ArtifactVersion) -> bool {
        let above_lower = match &self.lower {
            None => true,
            Some(b) if b.inclusive => version >= &b.version,
            Some(b) => version > &b.version,
        };
        let below_upper = match &self.upper {
            None => true,
            Some(b) if b.inclusive => version <= &b.version,
            Some(b) => version < &b.version,
        };
        above_lower && below_upper
    }

    pub fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Some(lo), Some(hi)) => {
                lo.version > hi.version
                    || (lo.version == hi.version && !(lo.inclusive && hi.inclusive))
            }
            _ => false,
        }
    }

    /// The overlap of two intervals, or `None` when they are disjoint.
    pub fn intersect(&self, other: &Restriction) -> Option<Restriction> {
        let lower = match (&self.lower, &other.lower) {
            (None, b) | (b, None) => b.clone(),
            (Some(a), Some(b)) => Some(if a.version > b.version {
                a.clone()
            } else if b.version > a.version {
                b.clone()
            } else {
                Bound {
                    version: a.version.clone(),
                    inclusive: a.inclusive && b.inclusive,
                }
            }),
        };
        let upper = match (&self.upper, &other.upper) {
            (None, b) | (b, None) => b.clone(),
            (Some(a), Some(b)) => Some(if a.version < b.version {
                a.clone()
            } else if b.version < a.version {
                b.clone()
            } else {
                Bound {
                    version: a.version.clone(),
                    inclusive: a.inclusive && b.inclusive,
                }
            }),
        };

        let restriction = Restriction { lower, upper };
        (!restriction.is_empty()).then_some(restriction)
    }

    fn is_exact(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Some(lo), Some(hi)) => lo.inclusive && hi.inclusive && lo.version == hi.version,
            _ => false,
        }
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exact() {
            if let Some(lo) = &self.lower {
                return write!(f, "[{}]", lo.version);
            }
        }
        match &self.lower {
            Some(b) => write!(f, "{}{}", if b.inclusive { '[' } else { '(' }, b.version)?,
            None => f.write_str("(")?,
        }
        f.write_str(",")?;
        match &self.upper {
            Some(b) => write!(f, "{}{}", b.version, if b.inclusive { ']' } else { ')' }),
            None => f.write_str(")"),
        }
    }
}

/// A constraint over [`ArtifactVersion`]: a union of restrictions, plus the
/// recommended version when the range was written as a bare version.
///
/// A bare version such as `1.0` does not constrain anything; it only states
/// a preference, so it contains every version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    recommended: Option<ArtifactVersion>,
    restrictions: Vec<Restriction>,
}

impl VersionRange {
    /// A range matching any version.
    pub fn unbounded() -> Self {
        Self {
            recommended: None,
            restrictions: vec![Restriction::everything()],
        }
    }

    pub fn parse(raw: &str) -> JarJarResult<Self> {
        let trimmed = raw.trim();
        let invalid = |reason: &str| JarJarError::InvalidVersionRange {
            range: raw.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("empty range"));
        }

        if !trimmed.starts_with('[') && !trimmed.starts_with('(') {
            return Ok(Self {
                recommended: Some(ArtifactVersion::parse(trimmed)?),
                restrictions: vec![Restriction::everything()],
            });
        }

        let mut restrictions = Vec::new();
        let mut rest = trimmed;
        loop {
            let close = rest
                .find(|c: char| c == ']' || c == ')')
                .ok_or_else(|| invalid("unterminated restriction"))?;
            restrictions.push(parse_restriction(&rest[..=close], &invalid)?);

            rest = rest[close + 1..].trim_start();
            if rest.is_empty() {
                break;
            }
            rest = rest
                .strip_prefix(',')
                .ok_or_else(|| invalid("expected ',' between restrictions"))?
                .trim_start();
            if !rest.starts_with('[') && !rest.starts_with('(') {
                return Err(invalid("expected '[' or '(' after ','"));
            }
        }

        Ok(Self {
            recommended: None,
            restrictions,
        })
    }

    pub fn contains(&self, version: &ArtifactVersion) -> bool {
        self.restrictions.iter().any(|r| r.contains(version))
    }

    /// True when no version can satisfy this range.
    pub fn is_empty(&self) -> bool {
        self.restrictions.is_empty()
    }

    pub fn is_unbounded(&self) -> bool {
        self.restrictions
            .iter()
            .any(|r| r.lower.is_none() && r.upper.is_none())
    }

    pub fn recommended(&self) -> Option<&ArtifactVersion> {
        self.recommended.as_ref()
    }

    pub fn restrictions(&self) -> &[Restriction] {
        &self.restrictions
    }

    /// The set of versions both ranges accept.
    ///
    /// A recommended version survives when the result still contains it,
    /// preferring `self`'s over `other`'s.
    pub fn intersect(&self, other: &VersionRange) -> VersionRange {
        let restrictions: Vec<Restriction> = self
            .restrictions
            .iter()
            .flat_map(|a| other.restrictions.iter().filter_map(move |b| a.intersect(b)))
            .collect();

        let recommended = [self.recommended.as_ref(), other.recommended.as_ref()]
            .into_iter()
            .flatten()
            .find(|v| restrictions.iter().any(|r| r.contains(v)))
            .cloned();

        VersionRange {
            recommended,
            restrictions,
        }
    }

    pub fn intersects(&self, other: &VersionRange) -> bool {
        !self.intersect(other).is_empty()
    }
}

fn parse_restriction(
    text: &str,
    invalid: &dyn Fn(&str) -> JarJarError,
) -> JarJarResult<Restriction> {
    let lower_inclusive = text.starts_with('[');
    let upper_inclusive = text.ends_with(']');
    let inner = text[1..text.len() - 1].trim();

    let bound = |raw: &str, inclusive: bool| -> JarJarResult<Option<Bound>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        Ok(Some(Bound {
            version: ArtifactVersion::parse(raw)?,
            inclusive,
        }))
    };

    let restriction = match inner.split_once(',') {
        None => {
            if !lower_inclusive || !upper_inclusive || inner.is_empty() {
                return Err(invalid("single version must be written as [x]"));
            }
            let version = ArtifactVersion::parse(inner)?;
            Restriction {
                lower: Some(Bound {
                    version: version.clone(),
                    inclusive: true,
                }),
                upper: Some(Bound {
                    version,
                    inclusive: true,
                }),
            }
        }
        Some((lo, hi)) => {
            if hi.contains(',') {
                return Err(invalid("too many bounds in restriction"));
            }
            Restriction {
                lower: bound(lo, lower_inclusive)?,
                upper: bound(hi, upper_inclusive)?,
            }
        }
    };

    if restriction.is_empty() {
        return Err(invalid("lower bound is above upper bound"));
    }
    Ok(restriction)
}

impl FromStr for VersionRange {
    type Err = JarJarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(recommended) = &self.recommended {
            if self.restrictions.len() == 1 && self.is_unbounded() {
                return write!(f, "{}", recommended);
            }
        }
        if self.restrictions.is_empty() {
            return f.write_str("<empty>");
        }
        for (idx, restriction) in self.restrictions.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", restriction)?;
        }
        Ok(())
    }
}

impl Serialize for VersionRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
