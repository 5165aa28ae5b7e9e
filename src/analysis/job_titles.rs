//! Most common languages per job title.

use crate::models::SurveyRecord;
use crate::pipeline::{explode, group_by, Mean, Pipeline};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

const FULL_TIME: &str = "Employed, full-time";

/// How many respondents with a given title used a language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageCount {
    #[serde(rename = "Language")]
    pub language: String,
    pub count: u64,
}

/// Language affinity of one job title.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobTitleLanguages {
    pub job_title: String,
    /// Mean of the per-language experience means.
    pub years_of_exp: Option<f64>,
    /// Mean of the per-language compensation means.
    pub compensation: Option<f64>,
    /// Most used languages, highest count first.
    pub top_languages: Vec<LanguageCount>,
}

/// The job-title / language affinity pipeline.
#[derive(Debug, Clone)]
pub struct JobTitleAffinity {
    pub top_k: usize,
}

impl Default for JobTitleAffinity {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[derive(Default)]
struct PairAccumulator {
    count: u64,
    years_exp: Mean,
    compensation: Mean,
}

#[derive(Default)]
struct TitleAccumulator {
    languages: Vec<LanguageCount>,
    years_exp: Mean,
    compensation: Mean,
}

impl JobTitleAffinity {
    fn matches(&self, record: &SurveyRecord) -> bool {
        record.dev_type.is_present()
            && record.language_have_worked_with.is_present()
            && record.years_code_pro.is_present()
            && record.converted_comp_yearly.is_present()
            && record.employment.is(FULL_TIME)
    }
}

impl Pipeline for JobTitleAffinity {
    type Output = JobTitleLanguages;

    fn name(&self) -> &'static str {
        "job-titles"
    }

    fn execute(&self, records: &[SurveyRecord]) -> Vec<JobTitleLanguages> {
        let rows = records
            .iter()
            .filter(|r| self.matches(r))
            .flat_map(|r| {
                let titles = r.dev_type.as_text().unwrap_or_default();
                let languages = r.language_have_worked_with.as_text().unwrap_or_default();
                explode(titles).flat_map(move |title| {
                    explode(languages).map(move |language| (title, language, r))
                })
            });

        let per_pair = group_by(
            rows,
            |(title, language, _)| (title.to_string(), language.to_string()),
            |acc: &mut PairAccumulator, (_, _, record)| {
                acc.count += 1;
                acc.years_exp.push(record.years_code_pro.as_f64());
                acc.compensation.push(record.converted_comp_yearly.as_f64());
            },
        );
        debug!("job-titles: {} (title, language) pairs", per_pair.len());

        let mut pairs: Vec<_> = per_pair.into_iter().collect();
        pairs.sort_by(|((title_a, lang_a), a), ((title_b, lang_b), b)| {
            title_a
                .cmp(title_b)
                .then_with(|| b.count.cmp(&a.count))
                .then_with(|| lang_a.cmp(lang_b))
        });

        let mut per_title: BTreeMap<String, TitleAccumulator> = BTreeMap::new();
        for ((title, language), stats) in pairs {
            let acc = per_title.entry(title).or_default();
            acc.languages.push(LanguageCount {
                language,
                count: stats.count,
            });
            acc.years_exp.push(stats.years_exp.value());
            acc.compensation.push(stats.compensation.value());
        }

        per_title
            .into_iter()
            .map(|(job_title, mut acc)| {
                acc.languages.truncate(self.top_k);
                JobTitleLanguages {
                    job_title,
                    years_of_exp: acc.years_exp.value(),
                    compensation: acc.compensation.value(),
                    top_languages: acc.languages,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn employee(titles: &str, languages: &str, years: &str, comp: f64) -> SurveyRecord {
        serde_json::from_value(json!({
            "DevType": titles,
            "LanguageHaveWorkedWith": languages,
            "YearsCodePro": years,
            "ConvertedCompYearly": comp,
            "Employment": FULL_TIME,
        }))
        .unwrap()
    }

    #[test]
    fn test_languages_per_title() {
        let records = vec![
            employee("Developer, back-end;Data scientist", "Python;SQL", "10", 100000.0),
            employee("Developer, back-end", "Python;Go", "2", 60000.0),
        ];

        let titles = JobTitleAffinity::default().execute(&records);
        assert_eq!(titles.len(), 2);

        let data = &titles[0];
        assert_eq!(data.job_title, "Data scientist");
        assert_eq!(data.top_languages.len(), 2);
        assert_eq!(data.years_of_exp, Some(10.0));

        let backend = &titles[1];
        assert_eq!(backend.job_title, "Developer, back-end");
        assert_eq!(
            backend.top_languages[0],
            LanguageCount {
                language: "Python".to_string(),
                count: 2
            }
        );
        // Per-language means: Go 2, Python 6, SQL 10.
        assert_eq!(backend.years_of_exp, Some(6.0));
        assert_eq!(backend.compensation, Some(80000.0));
    }

    #[test]
    fn test_top_languages_bounded_and_sorted() {
        let languages = "A;B;C;D;E;F;G";
        let mut records = vec![employee("Developer, full-stack", languages, "5", 1.0)];
        records.push(employee("Developer, full-stack", "G;F", "5", 1.0));
        records.push(employee("Developer, full-stack", "G", "5", 1.0));

        let titles = JobTitleAffinity::default().execute(&records);
        let top = &titles[0].top_languages;

        assert_eq!(top.len(), 5);
        assert_eq!(top[0].language, "G");
        assert_eq!(top[1].language, "F");
        for pair in top.windows(2) {
            assert!(pair[0].count >= pair[1].count);
        }
    }

    #[test]
    fn test_requires_full_time_and_known_fields() {
        let mut part_time = employee("Developer, back-end", "Rust", "3", 1.0);
        part_time.employment = crate::models::Field::text("Employed, part-time");
        let mut unknown_years = employee("Developer, back-end", "Rust", "3", 1.0);
        unknown_years.years_code_pro = crate::models::Field::text("NA");

        assert!(JobTitleAffinity::default()
            .execute(&[part_time, unknown_years])
            .is_empty());
    }
}
