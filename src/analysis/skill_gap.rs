//! Language skills of employed versus job-seeking self-taught developers.
//!
//! Two sub-pipelines run over the same snapshot and are returned together
//! as a single result document.

use crate::models::SurveyRecord;
use crate::pipeline::{contains_any, explode, group_by, top_k, Pipeline};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

const DEVELOPER_BRANCHES: [&str; 2] = [
    "I am a developer by profession",
    "I used to be a developer by profession, but no longer am",
];

/// `LearnCode` answers that mark formal or certified learning.
const FORMAL_LEARNING: [&str; 3] = [
    "Coding Bootcamp",
    "School",
    "Online Courses or Certification",
];

pub const EMPLOYED: &str = "Employed, full-time";
pub const SEEKING_WORK: &str = "Not employed, but looking for work";

/// Employed developers sharing employment, org size, education and country.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmployedGroup {
    pub employment: Option<String>,
    pub org_size: Option<String>,
    pub ed_level: Option<String>,
    pub country: Option<String>,
    /// Exploded (respondent, language) rows.
    pub count: u64,
    /// Distinct languages, sorted.
    pub language_have_worked_with: Vec<String>,
}

/// Job seekers sharing education level and country.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UnemployedGroup {
    pub ed_level: Option<String>,
    pub country: Option<String>,
    pub count: u64,
    pub language_have_worked_with: Vec<String>,
}

/// Both sides of the comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGapReport {
    pub employed_developers: Vec<EmployedGroup>,
    pub unemployed_developers: Vec<UnemployedGroup>,
    /// Languages used by the employed groups but by none of the job-seeker
    /// groups.
    pub unemployed_skills_lack: Vec<String>,
}

/// The employed-vs-unemployed skill gap pipeline.
#[derive(Debug, Clone)]
pub struct SkillGap {
    pub top_k: usize,
}

impl Default for SkillGap {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[derive(Default)]
struct LanguageAccumulator {
    count: u64,
    languages: BTreeSet<String>,
}

impl LanguageAccumulator {
    fn add(&mut self, language: &str) {
        self.count += 1;
        self.languages.insert(language.to_string());
    }
}

/// Filter shared by both sides: self-taught developers with known languages.
fn self_taught_developer(record: &SurveyRecord) -> bool {
    record.main_branch.is_one_of(&DEVELOPER_BRANCHES)
        && record
            .learn_code
            .as_text()
            .is_some_and(|learned| !contains_any(learned, &FORMAL_LEARNING))
        && record.language_have_worked_with.is_present()
}

/// One row per (respondent, language) for the given employment status.
fn language_rows<'a>(
    records: &'a [SurveyRecord],
    employment: &'a str,
) -> impl Iterator<Item = (&'a SurveyRecord, &'a str)> {
    records
        .iter()
        .filter(move |r| self_taught_developer(r) && r.employment.is(employment))
        .flat_map(|r| {
            r.language_have_worked_with
                .as_text()
                .into_iter()
                .flat_map(explode)
                .map(move |language| (r, language))
        })
}

impl SkillGap {
    fn employed(&self, records: &[SurveyRecord]) -> Vec<EmployedGroup> {
        let groups = group_by(
            language_rows(records, EMPLOYED),
            |(r, _)| {
                (
                    r.employment.to_key(),
                    r.org_size.to_key(),
                    r.ed_level.to_key(),
                    r.country.to_key(),
                )
            },
            |acc: &mut LanguageAccumulator, (_, language)| acc.add(language),
        );

        let results = groups
            .into_iter()
            .map(
                |((employment, org_size, ed_level, country), acc)| EmployedGroup {
                    employment,
                    org_size,
                    ed_level,
                    country,
                    count: acc.count,
                    language_have_worked_with: acc.languages.into_iter().collect(),
                },
            )
            .collect();

        top_k(results, self.top_k, |a: &EmployedGroup, b| {
            b.count.cmp(&a.count)
        })
    }

    fn unemployed(&self, records: &[SurveyRecord]) -> Vec<UnemployedGroup> {
        let groups = group_by(
            language_rows(records, SEEKING_WORK),
            |(r, _)| (r.ed_level.to_key(), r.country.to_key()),
            |acc: &mut LanguageAccumulator, (_, language)| acc.add(language),
        );

        let results = groups
            .into_iter()
            .map(|((ed_level, country), acc)| UnemployedGroup {
                ed_level,
                country,
                count: acc.count,
                language_have_worked_with: acc.languages.into_iter().collect(),
            })
            .collect();

        top_k(results, self.top_k, |a: &UnemployedGroup, b| {
            b.count.cmp(&a.count)
        })
    }
}

impl Pipeline for SkillGap {
    type Output = SkillGapReport;

    fn name(&self) -> &'static str {
        "skill-gap"
    }

    fn execute(&self, records: &[SurveyRecord]) -> Vec<SkillGapReport> {
        let employed_developers = self.employed(records);
        let unemployed_developers = self.unemployed(records);
        debug!(
            "skill-gap: {} employed groups, {} unemployed groups",
            employed_developers.len(),
            unemployed_developers.len()
        );

        let seeker_languages: BTreeSet<&str> = unemployed_developers
            .iter()
            .flat_map(|g| g.language_have_worked_with.iter().map(String::as_str))
            .collect();
        let unemployed_skills_lack: Vec<String> = employed_developers
            .iter()
            .flat_map(|g| g.language_have_worked_with.iter().map(String::as_str))
            .filter(|language| !seeker_languages.contains(language))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        vec![SkillGapReport {
            employed_developers,
            unemployed_developers,
            unemployed_skills_lack,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn developer(employment: &str, learn: &str, languages: &str, country: &str) -> SurveyRecord {
        serde_json::from_value(json!({
            "MainBranch": "I am a developer by profession",
            "LearnCode": learn,
            "Employment": employment,
            "LanguageHaveWorkedWith": languages,
            "Country": country,
            "EdLevel": "Something else",
            "OrgSize": "20 to 99 employees",
        }))
        .unwrap()
    }

    #[test]
    fn test_fan_out_returns_one_document() {
        let records = vec![
            developer(EMPLOYED, "Books / Physical media", "Rust;Go", "India"),
            developer(EMPLOYED, "Other online resources (e.g., videos, blogs, forum)", "Rust;C", "India"),
            developer(SEEKING_WORK, "Books / Physical media", "Go;Python", "India"),
        ];

        let reports = SkillGap::default().execute(&records);
        assert_eq!(reports.len(), 1);

        let report = &reports[0];
        assert_eq!(report.employed_developers.len(), 1);
        let employed = &report.employed_developers[0];
        assert_eq!(employed.count, 4);
        assert_eq!(employed.language_have_worked_with, vec!["C", "Go", "Rust"]);
        assert_eq!(employed.org_size.as_deref(), Some("20 to 99 employees"));

        assert_eq!(report.unemployed_developers.len(), 1);
        assert_eq!(report.unemployed_developers[0].count, 2);

        assert_eq!(report.unemployed_skills_lack, vec!["C", "Rust"]);
    }

    #[test]
    fn test_excludes_formal_learning() {
        let records = vec![
            developer(EMPLOYED, "Coding Bootcamp;Books / Physical media", "Rust", "India"),
            developer(EMPLOYED, "School (i.e., University, College, etc)", "Rust", "India"),
            developer(SEEKING_WORK, "Online Courses or Certification", "Rust", "India"),
            developer(EMPLOYED, "NA", "Rust", "India"),
        ];

        let report = &SkillGap::default().execute(&records)[0];
        assert!(report.employed_developers.is_empty());
        assert!(report.unemployed_developers.is_empty());
    }

    #[test]
    fn test_part_time_excluded() {
        let records = vec![developer(
            "Employed, part-time",
            "Books / Physical media",
            "Rust",
            "India",
        )];

        let report = &SkillGap::default().execute(&records)[0];
        assert!(report.employed_developers.is_empty());
    }

    #[test]
    fn test_sorted_by_count_and_limited() {
        let countries = ["A", "B", "C", "D", "E", "F"];
        let records: Vec<_> = countries
            .iter()
            .enumerate()
            .map(|(i, country)| {
                let languages = vec!["L"; i + 1]
                    .iter()
                    .enumerate()
                    .map(|(j, l)| format!("{}{}", l, j))
                    .collect::<Vec<_>>()
                    .join(";");
                developer(EMPLOYED, "Books / Physical media", &languages, country)
            })
            .collect();

        let report = &SkillGap::default().execute(&records)[0];
        let counts: Vec<u64> = report.employed_developers.iter().map(|g| g.count).collect();
        assert_eq!(counts, vec![6, 5, 4, 3, 2]);
    }

    #[test]
    fn test_serialized_keys() {
        let report = SkillGapReport::default();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"employedDevelopers\""));
        assert!(json.contains("\"unemployedDevelopers\""));
        assert!(json.contains("\"unemployedSkillsLack\""));
    }
}
