//! Mental-health impact by gender and ethnicity.
//!
//! Compares respondents who report a mental-health condition with those
//! who report none, among heavy coders with strong purchase influence.

use crate::models::SurveyRecord;
use crate::pipeline::{
    contains_any, descending_f64, element_count, explode, group_by, percentage, top_k, Pipeline,
};
use serde::Serialize;
use tracing::debug;

/// Answers that identify free-text or refused responses.
const EXCLUDED_IDENTITIES: [&str; 2] = ["Or, in your own words:", "Prefer not to say"];

/// `MentalHealth` answer meaning no condition was reported.
pub const NO_CONDITION: &str = "None of the above";

/// `PurchaseInfluence` answer counted as high influence.
pub const HIGH_INFLUENCE: &str = "I have a great deal of influence";

/// Rows with more coding activities than this count as heavy coders.
const ACTIVITY_THRESHOLD: usize = 2;

/// Mental-health figures for one (gender, ethnicity) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MentalHealthGroup {
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Ethnicity")]
    pub ethnicity: String,
    pub total_respondents: u64,
    /// Largest number of coding activities reported in the group. An
    /// unanswered `CodingActivities` counts as one.
    pub coding_activities_count: usize,
    pub percentage_mental_health_issues: f64,
    pub percentage_likely_mental_health_issues: f64,
}

/// The mental-health impact pipeline.
#[derive(Debug, Clone)]
pub struct MentalHealthImpact {
    pub top_k: usize,
}

impl Default for MentalHealthImpact {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

struct IdentityRow<'a> {
    gender: &'a str,
    ethnicity: &'a str,
    record: &'a SurveyRecord,
}

#[derive(Default)]
struct IdentityAccumulator {
    total: u64,
    max_activities: usize,
    reported: u64,
    likely: u64,
}

fn identity_answer(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !contains_any(v, &EXCLUDED_IDENTITIES))
}

impl MentalHealthImpact {
    fn rows<'a>(&self, record: &'a SurveyRecord) -> Vec<IdentityRow<'a>> {
        if !record.mental_health.is_present() {
            return Vec::new();
        }
        let (Some(genders), Some(ethnicities)) = (
            identity_answer(record.gender.as_text()),
            identity_answer(record.ethnicity.as_text()),
        ) else {
            return Vec::new();
        };

        explode(genders)
            .flat_map(|gender| {
                explode(ethnicities).map(move |ethnicity| IdentityRow {
                    gender,
                    ethnicity,
                    record,
                })
            })
            .collect()
    }
}

impl Pipeline for MentalHealthImpact {
    type Output = MentalHealthGroup;

    fn name(&self) -> &'static str {
        "mental-health"
    }

    fn execute(&self, records: &[SurveyRecord]) -> Vec<MentalHealthGroup> {
        let rows: Vec<IdentityRow<'_>> = records.iter().flat_map(|r| self.rows(r)).collect();
        debug!("mental-health: {} exploded rows", rows.len());

        let groups = group_by(
            rows,
            |row| (row.gender.to_string(), row.ethnicity.to_string()),
            |acc: &mut IdentityAccumulator, row| {
                let record = row.record;
                let activities = element_count(record.coding_activities.as_text());
                let influential = record
                    .purchase_influence
                    .as_text()
                    .is_some_and(|p| explode(p).any(|answer| answer == HIGH_INFLUENCE));
                let heavy = activities > ACTIVITY_THRESHOLD && influential;

                acc.total += 1;
                acc.max_activities = acc.max_activities.max(activities);
                if heavy && record.mental_health.is(NO_CONDITION) {
                    acc.likely += 1;
                } else if heavy {
                    acc.reported += 1;
                }
            },
        );

        let results: Vec<MentalHealthGroup> = groups
            .into_iter()
            .map(|((gender, ethnicity), acc)| MentalHealthGroup {
                gender,
                ethnicity,
                total_respondents: acc.total,
                coding_activities_count: acc.max_activities,
                percentage_mental_health_issues: percentage(acc.reported, acc.total),
                percentage_likely_mental_health_issues: percentage(acc.likely, acc.total),
            })
            .collect();

        top_k(results, self.top_k, |a, b| {
            descending_f64(
                a.percentage_likely_mental_health_issues,
                b.percentage_likely_mental_health_issues,
            )
        })
    }
}
