//! Remote-work impact on compensation by age group.

use crate::models::SurveyRecord;
use crate::pipeline::{first_integer, group_by, Mean, Pipeline};
use serde::Serialize;
use tracing::debug;

pub const FULLY_REMOTE: &str = "Fully remote";
pub const HYBRID: &str = "Hybrid (some remote, some in-person)";

const PROFESSIONAL: &str = "I am a developer by profession";
const FULL_TIME: &str = "Employed, full-time";

/// Age bucket derived from the free-text `Age` answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AgeGroup {
    #[serde(rename = "Under 25")]
    Under25,
    #[serde(rename = "25-35")]
    From25To35,
    #[serde(rename = "35-45")]
    From35To45,
    #[serde(rename = "45-55")]
    From45To55,
    #[serde(rename = "55+")]
    Over55,
}

impl AgeGroup {
    /// Buckets in ascending age order.
    pub const ALL: [AgeGroup; 5] = [
        AgeGroup::Under25,
        AgeGroup::From25To35,
        AgeGroup::From35To45,
        AgeGroup::From45To55,
        AgeGroup::Over55,
    ];

    pub fn from_age(age: u64) -> Self {
        match age {
            0..=24 => AgeGroup::Under25,
            25..=34 => AgeGroup::From25To35,
            35..=44 => AgeGroup::From35To45,
            45..=54 => AgeGroup::From45To55,
            _ => AgeGroup::Over55,
        }
    }

    /// Bucket a free-text answer like "25-34 years old" by its first number.
    pub fn from_answer(answer: &str) -> Option<Self> {
        first_integer(answer).map(Self::from_age)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Under25 => "Under 25",
            AgeGroup::From25To35 => "25-35",
            AgeGroup::From35To45 => "35-45",
            AgeGroup::From45To55 => "45-55",
            AgeGroup::Over55 => "55+",
        }
    }
}

/// Compensation and experience for one (age group, remote status) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteWorkGroup {
    pub age: AgeGroup,
    pub remote_work: String,
    pub avg_compensation: Option<f64>,
    pub avg_years_exp: Option<f64>,
    pub count: u64,
}

/// The remote-work impact pipeline.
#[derive(Debug, Clone, Default)]
pub struct RemoteWorkImpact;

#[derive(Default)]
struct RemoteAccumulator {
    compensation: Mean,
    years_exp: Mean,
    count: u64,
}

impl RemoteWorkImpact {
    fn matches(&self, record: &SurveyRecord) -> bool {
        record.main_branch.is(PROFESSIONAL)
            && record.employment.is(FULL_TIME)
            && record.remote_work.is_one_of(&[FULLY_REMOTE, HYBRID])
            && record.years_code_pro.is_present()
            && record.converted_comp_yearly.is_present()
    }
}

impl Pipeline for RemoteWorkImpact {
    type Output = RemoteWorkGroup;

    fn name(&self) -> &'static str {
        "remote-work"
    }

    fn execute(&self, records: &[SurveyRecord]) -> Vec<RemoteWorkGroup> {
        let mut unbucketed = 0usize;
        let rows: Vec<(AgeGroup, &SurveyRecord)> = records
            .iter()
            .filter(|r| self.matches(r))
            .map(|r| {
                let bucket = r.age.as_str().and_then(|age| AgeGroup::from_answer(&age));
                if bucket.is_none() {
                    unbucketed += 1;
                }
                (bucket.unwrap_or(AgeGroup::Under25), r)
            })
            .collect();
        if unbucketed > 0 {
            debug!(
                "remote-work: {} records without a numeric age counted as {}",
                unbucketed,
                AgeGroup::Under25.label()
            );
        }

        // Keys order by (Age label, RemoteWork), both ascending.
        let groups = group_by(
            rows,
            |(age, record)| {
                (
                    age.label(),
                    *age,
                    record.remote_work.to_key().unwrap_or_default(),
                )
            },
            |acc: &mut RemoteAccumulator, (_, record)| {
                acc.compensation.push(record.converted_comp_yearly.as_f64());
                acc.years_exp.push(record.years_code_pro.as_f64());
                acc.count += 1;
            },
        );

        groups
            .into_iter()
            .map(|((_, age, remote_work), acc)| RemoteWorkGroup {
                age,
                remote_work,
                avg_compensation: acc.compensation.value(),
                avg_years_exp: acc.years_exp.value(),
                count: acc.count,
            })
            .collect()
    }
}
