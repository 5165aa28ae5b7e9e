//! Report generation.
//!
//! Turns analysis results into text (tables and bar charts), Markdown or
//! JSON.

use super::chart::{BarChart, Series};
use super::table::TextTable;
use crate::analysis::{
    AgeGroup, AnalysisOutput, EmployedGroup, JobTitleLanguages, MentalHealthGroup,
    RemoteWorkGroup, SkillGapReport, TechStackGroup, UnemployedGroup,
};
use crate::analysis::remote_work::{FULLY_REMOTE, HYBRID};
use crate::config::ReportConfig;
use crate::models::{Report, ReportMetadata};
use anyhow::Result;

/// Languages listed per skill-gap row before truncating.
const MAX_LISTED_LANGUAGES: usize = 5;

/// Characters of the gender answer kept in chart labels.
const GENDER_LABEL_CHARS: usize = 5;

const LONG_UK: &str = "United Kingdom of Great Britain and Northern Ireland";

fn display_country(country: &str) -> &str {
    if country == LONG_UK {
        "United Kingdom"
    } else {
        country
    }
}

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

fn optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

/// Join languages, keeping the first five and marking the cut with `...`.
fn language_list(languages: &[String]) -> String {
    let mut listed: Vec<String> = languages
        .iter()
        .take(MAX_LISTED_LANGUAGES)
        .cloned()
        .collect();
    if languages.len() > MAX_LISTED_LANGUAGES {
        if let Some(last) = listed.last_mut() {
            last.push_str("...");
        }
    }
    listed.join(", ")
}

fn tech_stack_table(groups: &[TechStackGroup]) -> TextTable {
    let mut table = TextTable::new([
        "Country",
        "Org Size",
        "Total Dev",
        "Distinct Stacks",
        "Dominant Technology Stack",
        "Dominant Count",
        "Dominant CompTotal",
        "Least Dominant Technology Stack",
        "Least Dominant Count",
        "Least Dominant CompTotal",
    ]);

    for group in groups {
        table.add_row([
            display_country(&group.country).to_string(),
            group.org_size.to_string(),
            group.total_developers.to_string(),
            group.technology_stacks.len().to_string(),
            group.dominant_stack.technology_stack.clone(),
            group.dominant_stack.count.to_string(),
            number(group.dominant_stack.comp_total),
            group.least_dominant_stack.technology_stack.clone(),
            group.least_dominant_stack.count.to_string(),
            number(group.least_dominant_stack.comp_total),
        ]);
    }
    table
}

fn mental_health_table(groups: &[MentalHealthGroup]) -> TextTable {
    let mut table = TextTable::new([
        "Gender",
        "Ethnicity",
        "Respondents",
        "Max Coding Activities",
        "Mental Health Issues %",
        "Likely Mental Health Issues %",
    ]);

    for group in groups {
        table.add_row([
            group.gender.clone(),
            group.ethnicity.clone(),
            group.total_respondents.to_string(),
            group.coding_activities_count.to_string(),
            format!("{:.2}", group.percentage_mental_health_issues),
            format!("{:.2}", group.percentage_likely_mental_health_issues),
        ]);
    }
    table
}

fn mental_health_chart(groups: &[MentalHealthGroup], width: usize) -> String {
    let labels: Vec<String> = groups
        .iter()
        .map(|g| {
            let gender: String = g.gender.chars().take(GENDER_LABEL_CHARS).collect();
            format!("{} / {}", g.ethnicity, gender)
        })
        .collect();

    let reported = BarChart::new("Mental Health Issues", labels.clone(), width)
        .labels("Ethnicity", "Percentage")
        .series(
            Series::new(
                "Reported",
                groups
                    .iter()
                    .map(|g| Some(g.percentage_mental_health_issues))
                    .collect(),
            )
            .with_annotations(
                groups
                    .iter()
                    .map(|g| Some(format!("respondents: {}", g.total_respondents)))
                    .collect(),
            ),
        );

    let likely = BarChart::new("Likely Mental Health Issues", labels, width)
        .labels("Ethnicity", "Percentage")
        .series(
            Series::new(
                "Likely",
                groups
                    .iter()
                    .map(|g| Some(g.percentage_likely_mental_health_issues))
                    .collect(),
            )
            .with_annotations(
                groups
                    .iter()
                    .map(|g| Some(format!("coding activities: {}", g.coding_activities_count)))
                    .collect(),
            ),
        );

    format!("{}\n{}", reported.render(), likely.render())
}

fn remote_work_table(groups: &[RemoteWorkGroup]) -> TextTable {
    let mut table = TextTable::new([
        "Age",
        "Remote Work",
        "Avg Compensation",
        "Avg Years Exp",
        "Count",
    ]);

    for group in groups {
        table.add_row([
            group.age.label().to_string(),
            group.remote_work.clone(),
            number(group.avg_compensation),
            number(group.avg_years_exp),
            group.count.to_string(),
        ]);
    }
    table
}

fn remote_work_chart(groups: &[RemoteWorkGroup], width: usize) -> String {
    let present: Vec<AgeGroup> = AgeGroup::ALL
        .into_iter()
        .filter(|age| groups.iter().any(|g| g.age == *age))
        .collect();

    let series_for = |status: &str, name: &str| {
        let lookup = |age: &AgeGroup| {
            groups
                .iter()
                .find(|g| g.age == *age && g.remote_work == status)
        };
        Series::new(
            name,
            present
                .iter()
                .map(|age| lookup(age).and_then(|g| g.avg_compensation))
                .collect(),
        )
        .with_annotations(
            present
                .iter()
                .map(|age| lookup(age).map(|g| format!("n={}", g.count)))
                .collect(),
        )
    };

    BarChart::new(
        "Average Compensation by Age group and Remote Work preference",
        present.iter().map(|age| age.label().to_string()).collect(),
        width,
    )
    .labels("Age groups", "Average Compensation")
    .series(series_for(FULLY_REMOTE, "Fully remote"))
    .series(series_for(HYBRID, "Hybrid"))
    .render()
}

fn employed_table(groups: &[EmployedGroup]) -> TextTable {
    let mut table = TextTable::new([
        "Employment",
        "OrgSize",
        "EdLevel",
        "Country",
        "LanguageHaveWorkedWith",
        "Count",
    ]);

    for group in groups {
        table.add_row([
            optional(&group.employment),
            optional(&group.org_size),
            optional(&group.ed_level),
            optional(&group.country),
            language_list(&group.language_have_worked_with),
            group.count.to_string(),
        ]);
    }
    table
}

fn unemployed_table(groups: &[UnemployedGroup]) -> TextTable {
    let mut table = TextTable::new(["EdLevel", "Country", "LanguageHaveWorkedWith", "Count"]);

    for group in groups {
        table.add_row([
            optional(&group.ed_level),
            optional(&group.country),
            language_list(&group.language_have_worked_with),
            group.count.to_string(),
        ]);
    }
    table
}

fn skills_lack_line(report: &SkillGapReport) -> String {
    if report.unemployed_skills_lack.is_empty() {
        "Languages only employed developers use: none".to_string()
    } else {
        format!(
            "Languages only employed developers use: {}",
            report.unemployed_skills_lack.join(", ")
        )
    }
}

fn job_titles_table(titles: &[JobTitleLanguages]) -> TextTable {
    let mut table = TextTable::new(["Job Title", "Years of Exp", "Compensation", "Top Languages"]);

    for title in titles {
        let languages = title
            .top_languages
            .iter()
            .map(|l| format!("{} ({})", l.language, l.count))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row([
            title.job_title.clone(),
            number(title.years_of_exp),
            number(title.compensation),
            languages,
        ]);
    }
    table
}

fn text_or_empty(table: &TextTable) -> String {
    if table.is_empty() {
        "No results.\n".to_string()
    } else {
        table.render()
    }
}

fn markdown_or_empty(table: &TextTable) -> String {
    if table.is_empty() {
        "No results.\n".to_string()
    } else {
        table.to_markdown()
    }
}

/// Render one analysis as text tables or charts.
pub fn render_section_text(output: &AnalysisOutput, config: &ReportConfig) -> String {
    match output {
        AnalysisOutput::TechStack(groups) => text_or_empty(&tech_stack_table(groups)),
        AnalysisOutput::MentalHealth(groups) => mental_health_chart(groups, config.chart_width),
        AnalysisOutput::RemoteWork(groups) => remote_work_chart(groups, config.chart_width),
        AnalysisOutput::SkillGap(report) => format!(
            "Employed Developers:\n\n{}\nUnemployed Developers:\n\n{}\n{}\n",
            text_or_empty(&employed_table(&report.employed_developers)),
            text_or_empty(&unemployed_table(&report.unemployed_developers)),
            skills_lack_line(report)
        ),
        AnalysisOutput::JobTitles(titles) => text_or_empty(&job_titles_table(titles)),
    }
}

/// Render one analysis as Markdown tables.
pub fn render_section_markdown(output: &AnalysisOutput) -> String {
    match output {
        AnalysisOutput::TechStack(groups) => markdown_or_empty(&tech_stack_table(groups)),
        AnalysisOutput::MentalHealth(groups) => markdown_or_empty(&mental_health_table(groups)),
        AnalysisOutput::RemoteWork(groups) => markdown_or_empty(&remote_work_table(groups)),
        AnalysisOutput::SkillGap(report) => format!(
            "### Employed Developers\n\n{}\n### Unemployed Developers\n\n{}\n{}\n",
            markdown_or_empty(&employed_table(&report.employed_developers)),
            markdown_or_empty(&unemployed_table(&report.unemployed_developers)),
            skills_lack_line(report)
        ),
        AnalysisOutput::JobTitles(titles) => markdown_or_empty(&job_titles_table(titles)),
    }
}

/// Generate the plain-text report.
pub fn generate_text_report(report: &Report, config: &ReportConfig) -> String {
    let mut output = String::new();

    for section in &report.sections {
        output.push_str(&format!("{}\n\n", section.kind().title()));
        output.push_str(&render_section_text(section, config));
        output.push('\n');
    }

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Collection:** `{}.{}`\n",
        metadata.database, metadata.collection
    ));
    section.push_str(&format!("- **Records:** {}\n", metadata.record_count));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Survey Analysis Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));

    for section in &report.sections {
        output.push_str(&format!("## {}\n\n", section.kind().title()));
        output.push_str(&render_section_markdown(section));
        output.push('\n');
    }

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{LanguageCount, OrgSizeBucket, StackCount};
    use chrono::Utc;

    fn stack(name: &str, count: u64) -> StackCount {
        StackCount {
            technology_stack: name.to_string(),
            count,
            comp_total: Some(1000.0),
            comp_freq: "Yearly".to_string(),
        }
    }

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            source: "./data".to_string(),
            database: "StackOverflow2022".to_string(),
            collection: "surveyresult".to_string(),
            record_count: 3,
            generated_at: Utc::now(),
            duration_seconds: 0.5,
        }
    }

    #[test]
    fn test_tech_stack_shortens_uk() {
        let groups = vec![TechStackGroup {
            country: LONG_UK.to_string(),
            org_size: OrgSizeBucket::Small,
            total_developers: 3,
            dominant_stack: stack("Rust;Axum", 2),
            least_dominant_stack: stack("Go;Gin", 1),
            technology_stacks: vec![stack("Rust;Axum", 2), stack("Go;Gin", 1)],
        }];

        let rendered = tech_stack_table(&groups).render();
        assert!(rendered.contains("| United Kingdom "));
        assert!(!rendered.contains("Northern Ireland"));
        assert!(rendered.contains("1000.00"));
        assert!(rendered.contains("| Distinct Stacks |"));
        assert!(rendered.contains("| 2               |"));
    }

    #[test]
    fn test_language_list_truncation() {
        let languages: Vec<String> = ["A", "B", "C", "D", "E", "F", "G"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(language_list(&languages), "A, B, C, D, E...");
        assert_eq!(language_list(&languages[..2]), "A, B");
    }

    #[test]
    fn test_mental_health_chart_labels() {
        let groups = vec![MentalHealthGroup {
            gender: "Non-binary, genderqueer, or gender non-conforming".to_string(),
            ethnicity: "White".to_string(),
            total_respondents: 10,
            coding_activities_count: 4,
            percentage_mental_health_issues: 20.0,
            percentage_likely_mental_health_issues: 30.0,
        }];

        let rendered = mental_health_chart(&groups, 10);
        assert!(rendered.contains("White / Non-b"));
        assert!(rendered.contains("respondents: 10"));
        assert!(rendered.contains("coding activities: 4"));
    }

    #[test]
    fn test_remote_work_chart_aligns_series() {
        let groups = vec![
            RemoteWorkGroup {
                age: AgeGroup::From25To35,
                remote_work: FULLY_REMOTE.to_string(),
                avg_compensation: Some(90000.0),
                avg_years_exp: Some(5.0),
                count: 2,
            },
            RemoteWorkGroup {
                age: AgeGroup::Under25,
                remote_work: HYBRID.to_string(),
                avg_compensation: Some(45000.0),
                avg_years_exp: Some(1.0),
                count: 1,
            },
        ];

        let rendered = remote_work_chart(&groups, 20);
        let under = rendered.find("Under 25").unwrap();
        let mid = rendered.find("25-35 ").unwrap();
        assert!(under < mid);
        assert!(rendered.contains("90000.00 (n=2)"));
        assert!(rendered.contains("45000.00 (n=1)"));
    }

    #[test]
    fn test_empty_sections() {
        let report = Report {
            metadata: metadata(),
            sections: vec![
                AnalysisOutput::TechStack(Vec::new()),
                AnalysisOutput::MentalHealth(Vec::new()),
                AnalysisOutput::SkillGap(SkillGapReport::default()),
            ],
        };

        let text = generate_text_report(&report, &ReportConfig::default());
        assert!(text.contains("No results."));

        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("# Survey Analysis Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("### Employed Developers"));
    }

    #[test]
    fn test_job_titles_text() {
        let report = Report {
            metadata: metadata(),
            sections: vec![AnalysisOutput::JobTitles(vec![JobTitleLanguages {
                job_title: "Developer, back-end".to_string(),
                years_of_exp: Some(6.0),
                compensation: None,
                top_languages: vec![
                    LanguageCount {
                        language: "Python".to_string(),
                        count: 2,
                    },
                    LanguageCount {
                        language: "Go".to_string(),
                        count: 1,
                    },
                ],
            }])],
        };

        let text = generate_text_report(&report, &ReportConfig::default());
        assert!(text.contains("Most Common Languages by Job Title"));
        assert!(text.contains("Python (2), Go (1)"));
        assert!(text.contains("| -"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = Report {
            metadata: metadata(),
            sections: vec![AnalysisOutput::SkillGap(SkillGapReport::default())],
        };

        let json = generate_json_report(&report).unwrap();
        assert!(json.contains("\"record_count\": 3"));
        assert!(json.contains("\"analysis\": \"skill-gap\""));
        assert!(json.contains("\"employedDevelopers\""));
    }
}
