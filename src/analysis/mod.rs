//! Survey analyses.
//!
//! Each analysis is a stateless [`Pipeline`](crate::pipeline::Pipeline)
//! run against a loaded [`Collection`].

pub mod job_titles;
pub mod mental_health;
pub mod remote_work;
pub mod skill_gap;
pub mod tech_stack;

pub use job_titles::{JobTitleAffinity, JobTitleLanguages, LanguageCount};
pub use mental_health::{MentalHealthGroup, MentalHealthImpact};
pub use remote_work::{AgeGroup, RemoteWorkGroup, RemoteWorkImpact};
pub use skill_gap::{EmployedGroup, SkillGap, SkillGapReport, UnemployedGroup};
pub use tech_stack::{OrgSizeBucket, StackCount, TechStackGroup, TechStackPreference};

use crate::config::AnalysisConfig;
use crate::source::Collection;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// The analyses this tool knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    /// Dominant language;framework stacks by country and org size
    TechStack,
    /// Reported and likely mental-health issues by gender and ethnicity
    MentalHealth,
    /// Compensation by age group and remote-work status
    RemoteWork,
    /// Languages of employed vs job-seeking self-taught developers
    SkillGap,
    /// Most common languages per job title
    JobTitles,
}

impl AnalysisKind {
    /// Every analysis, in report order.
    pub const ALL: [AnalysisKind; 5] = [
        AnalysisKind::MentalHealth,
        AnalysisKind::TechStack,
        AnalysisKind::SkillGap,
        AnalysisKind::RemoteWork,
        AnalysisKind::JobTitles,
    ];

    /// Section heading used by the renderers.
    pub fn title(&self) -> &'static str {
        match self {
            AnalysisKind::TechStack => "Tech Stack Preference",
            AnalysisKind::MentalHealth => "Mental Health Issues by Gender and Ethnicity",
            AnalysisKind::RemoteWork => {
                "Average Compensation by Age Group and Remote Work Preference"
            }
            AnalysisKind::SkillGap => "Employed vs Unemployed Self-Taught Developers",
            AnalysisKind::JobTitles => "Most Common Languages by Job Title",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisKind::TechStack => write!(f, "tech-stack"),
            AnalysisKind::MentalHealth => write!(f, "mental-health"),
            AnalysisKind::RemoteWork => write!(f, "remote-work"),
            AnalysisKind::SkillGap => write!(f, "skill-gap"),
            AnalysisKind::JobTitles => write!(f, "job-titles"),
        }
    }
}

/// Result documents of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "analysis", content = "results", rename_all = "kebab-case")]
pub enum AnalysisOutput {
    TechStack(Vec<TechStackGroup>),
    MentalHealth(Vec<MentalHealthGroup>),
    RemoteWork(Vec<RemoteWorkGroup>),
    SkillGap(SkillGapReport),
    JobTitles(Vec<JobTitleLanguages>),
}

impl AnalysisOutput {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisOutput::TechStack(_) => AnalysisKind::TechStack,
            AnalysisOutput::MentalHealth(_) => AnalysisKind::MentalHealth,
            AnalysisOutput::RemoteWork(_) => AnalysisKind::RemoteWork,
            AnalysisOutput::SkillGap(_) => AnalysisKind::SkillGap,
            AnalysisOutput::JobTitles(_) => AnalysisKind::JobTitles,
        }
    }

    /// Number of result documents (groups) produced.
    pub fn len(&self) -> usize {
        match self {
            AnalysisOutput::TechStack(v) => v.len(),
            AnalysisOutput::MentalHealth(v) => v.len(),
            AnalysisOutput::RemoteWork(v) => v.len(),
            AnalysisOutput::SkillGap(r) => {
                r.employed_developers.len() + r.unemployed_developers.len()
            }
            AnalysisOutput::JobTitles(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run one analysis against the collection.
pub fn run(kind: AnalysisKind, collection: &Collection, config: &AnalysisConfig) -> AnalysisOutput {
    info!("Running {} analysis over {} records", kind, collection.count());

    let output = match kind {
        AnalysisKind::TechStack => {
            let pipeline = TechStackPreference {
                countries: config.countries.clone(),
                top_k: config.top_k,
            };
            AnalysisOutput::TechStack(collection.aggregate(&pipeline).collect())
        }
        AnalysisKind::MentalHealth => {
            let pipeline = MentalHealthImpact {
                top_k: config.top_k,
            };
            AnalysisOutput::MentalHealth(collection.aggregate(&pipeline).collect())
        }
        AnalysisKind::RemoteWork => {
            AnalysisOutput::RemoteWork(collection.aggregate(&RemoteWorkImpact).collect())
        }
        AnalysisKind::SkillGap => {
            let pipeline = SkillGap {
                top_k: config.top_k,
            };
            AnalysisOutput::SkillGap(collection.aggregate(&pipeline).next().unwrap_or_default())
        }
        AnalysisKind::JobTitles => {
            let pipeline = JobTitleAffinity {
                top_k: config.top_k,
            };
            AnalysisOutput::JobTitles(collection.aggregate(&pipeline).collect())
        }
    };

    info!("{} analysis produced {} groups", kind, output.len());
    output
}
