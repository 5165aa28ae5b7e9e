//! Technology stack preference by country and organisation size.
//!
//! Pairs every language a respondent used with every web framework they
//! used, then finds the most and least common pairing per
//! (country, organisation size) group.

use crate::models::{Field, FieldValue, SurveyRecord};
use crate::pipeline::{explode, group_by, largest_integer, top_k, Mean, Pipeline};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Countries the analysis is restricted to by default.
pub const DEFAULT_COUNTRIES: [&str; 5] = [
    "United States of America",
    "India",
    "Canada",
    "Australia",
    "United Kingdom of Great Britain and Northern Ireland",
];

/// Organisation size bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum OrgSizeBucket {
    Small,
    Medium,
    Large,
    #[serde(rename = "Very Large")]
    VeryLarge,
    Unknown,
}

impl fmt::Display for OrgSizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrgSizeBucket::Small => write!(f, "Small"),
            OrgSizeBucket::Medium => write!(f, "Medium"),
            OrgSizeBucket::Large => write!(f, "Large"),
            OrgSizeBucket::VeryLarge => write!(f, "Very Large"),
            OrgSizeBucket::Unknown => write!(f, "Unknown"),
        }
    }
}

impl OrgSizeBucket {
    /// Bucket an employee count. Sizes strictly between 1000 and 10000
    /// fall through to `Unknown`.
    pub fn from_size(size: f64) -> Self {
        if size <= 10.0 {
            OrgSizeBucket::Small
        } else if size <= 100.0 {
            OrgSizeBucket::Medium
        } else if size <= 1000.0 {
            OrgSizeBucket::Large
        } else if size >= 10000.0 {
            OrgSizeBucket::VeryLarge
        } else {
            OrgSizeBucket::Unknown
        }
    }

    /// Bucket a survey answer. Text answers such as "100 to 499 employees"
    /// use the largest number they mention.
    pub fn from_field(field: &Field) -> Self {
        let size = match field.value() {
            Some(FieldValue::Number(n)) => Some(*n),
            Some(FieldValue::Text(text)) => largest_integer(text).map(|n| n as f64),
            None => None,
        };
        size.filter(|s| !s.is_nan())
            .map_or(OrgSizeBucket::Unknown, Self::from_size)
    }
}

/// Occurrence statistics of one language;framework pairing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackCount {
    pub technology_stack: String,
    pub count: u64,
    /// Mean `CompTotal` of the rows behind this pairing.
    pub comp_total: Option<f64>,
    pub comp_freq: String,
}

/// Stack preference within one (country, organisation size) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TechStackGroup {
    pub country: String,
    pub org_size: OrgSizeBucket,
    pub total_developers: u64,
    pub dominant_stack: StackCount,
    pub least_dominant_stack: StackCount,
    /// Every pairing seen in the group, most common first.
    #[serde(skip)]
    pub technology_stacks: Vec<StackCount>,
}

/// The tech-stack preference pipeline.
#[derive(Debug, Clone)]
pub struct TechStackPreference {
    pub countries: Vec<String>,
    pub top_k: usize,
}

impl Default for TechStackPreference {
    fn default() -> Self {
        Self {
            countries: DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect(),
            top_k: 5,
        }
    }
}

struct StackRow<'a> {
    country: &'a str,
    org_size: OrgSizeBucket,
    stack: String,
    comp_freq: &'a str,
    comp_total: Option<f64>,
}

#[derive(Default)]
struct StackAccumulator {
    count: u64,
    comp_total: Mean,
}

#[derive(Default)]
struct GroupAccumulator {
    stacks: Vec<StackCount>,
    total: u64,
}

impl TechStackPreference {
    fn matches(&self, record: &SurveyRecord) -> bool {
        record.language_have_worked_with.is_present()
            && record.webframe_have_worked_with.is_present()
            && record.comp_total.is_present()
            && record.comp_freq.is("Yearly")
            && record
                .country
                .as_text()
                .is_some_and(|c| self.countries.iter().any(|allowed| allowed == c))
    }

    fn rows<'a>(&self, record: &'a SurveyRecord) -> Vec<StackRow<'a>> {
        let (Some(country), Some(languages), Some(frameworks), Some(comp_freq)) = (
            record.country.as_text(),
            record.language_have_worked_with.as_text(),
            record.webframe_have_worked_with.as_text(),
            record.comp_freq.as_text(),
        ) else {
            return Vec::new();
        };

        let org_size = OrgSizeBucket::from_field(&record.org_size);
        let comp_total = record.comp_total.as_f64();

        explode(languages)
            .flat_map(|language| {
                explode(frameworks).map(move |framework| StackRow {
                    country,
                    org_size,
                    stack: format!("{};{}", language, framework),
                    comp_freq,
                    comp_total,
                })
            })
            .collect()
    }
}

impl Pipeline for TechStackPreference {
    type Output = TechStackGroup;

    fn name(&self) -> &'static str {
        "tech-stack"
    }

    fn execute(&self, records: &[SurveyRecord]) -> Vec<TechStackGroup> {
        let rows: Vec<StackRow<'_>> = records
            .iter()
            .filter(|r| self.matches(r))
            .flat_map(|r| self.rows(r))
            .collect();
        debug!("tech-stack: {} exploded rows", rows.len());

        let per_stack = group_by(
            rows,
            |row| {
                (
                    row.country.to_string(),
                    row.org_size,
                    row.stack.clone(),
                    row.comp_freq.to_string(),
                )
            },
            |acc: &mut StackAccumulator, row| {
                acc.count += 1;
                acc.comp_total.push(row.comp_total);
            },
        );

        let per_group = group_by(
            per_stack,
            |((country, org_size, _, _), _)| (country.clone(), *org_size),
            |acc: &mut GroupAccumulator, ((_, _, stack, comp_freq), stats)| {
                acc.total += stats.count;
                acc.stacks.push(StackCount {
                    technology_stack: stack,
                    count: stats.count,
                    comp_total: stats.comp_total.value(),
                    comp_freq,
                });
            },
        );

        let groups: Vec<TechStackGroup> = per_group
            .into_iter()
            .filter_map(|((country, org_size), mut acc)| {
                // Strict greater-than: the first pairing reaching the max wins.
                let dominant = acc
                    .stacks
                    .iter()
                    .fold(None::<&StackCount>, |best, s| match best {
                        Some(b) if s.count <= b.count => Some(b),
                        _ => Some(s),
                    })?
                    .clone();

                acc.stacks.sort_by(|a, b| {
                    b.count
                        .cmp(&a.count)
                        .then_with(|| a.technology_stack.cmp(&b.technology_stack))
                });
                let least = acc.stacks.last()?.clone();

                Some(TechStackGroup {
                    country,
                    org_size,
                    total_developers: acc.total,
                    dominant_stack: dominant,
                    least_dominant_stack: least,
                    technology_stacks: acc.stacks,
                })
            })
            .collect();

        top_k(groups, self.top_k, |a, b| {
            b.total_developers.cmp(&a.total_developers)
        })
    }
}
