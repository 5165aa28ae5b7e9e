//! Horizontal text bar charts.

const BAR_GLYPHS: [char; 4] = ['█', '▒', '░', '▓'];

/// One bar per category, drawn with a shared glyph.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
    /// Optional text printed after each bar's value.
    pub annotations: Vec<Option<String>>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
            annotations: Vec::new(),
        }
    }

    pub fn with_annotations(mut self, annotations: Vec<Option<String>>) -> Self {
        self.annotations = annotations;
        self
    }
}

/// A grouped horizontal bar chart.
#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: String,
    pub category_label: String,
    pub value_label: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    /// Characters used by the longest bar.
    pub width: usize,
}

impl BarChart {
    pub fn new(title: impl Into<String>, categories: Vec<String>, width: usize) -> Self {
        Self {
            title: title.into(),
            category_label: String::new(),
            value_label: String::new(),
            categories,
            series: Vec::new(),
            width,
        }
    }

    pub fn labels(mut self, category: impl Into<String>, value: impl Into<String>) -> Self {
        self.category_label = category.into();
        self.value_label = value.into();
        self
    }

    pub fn series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().flatten())
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max)
    }

    fn bar_length(&self, value: f64, max: f64) -> usize {
        if max <= 0.0 || !value.is_finite() || value <= 0.0 {
            return 0;
        }
        ((value / max) * self.width as f64).round() as usize
    }

    pub fn render(&self) -> String {
        let mut output = String::new();
        output.push_str(&self.title);
        output.push('\n');
        output.push_str(&"=".repeat(self.title.chars().count()));
        output.push('\n');

        if self.categories.is_empty() {
            output.push_str("No results.\n");
            return output;
        }

        if self.series.len() > 1 {
            let legend: Vec<String> = self
                .series
                .iter()
                .zip(BAR_GLYPHS.iter().cycle())
                .map(|(s, glyph)| format!("{} {}", glyph, s.name))
                .collect();
            output.push_str(&format!("Legend: {}\n", legend.join("   ")));
        }

        let max = self.max_value();
        output.push_str(&format!(
            "{} vs {} (scale 0 - {:.2})\n\n",
            self.category_label, self.value_label, max
        ));

        let label_width = self
            .categories
            .iter()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(0);

        for (index, category) in self.categories.iter().enumerate() {
            for (position, (series, glyph)) in
                self.series.iter().zip(BAR_GLYPHS.iter().cycle()).enumerate()
            {
                let label = if position == 0 { category.as_str() } else { "" };
                let padding = label_width - label.chars().count();
                output.push_str(label);
                output.push_str(&" ".repeat(padding));
                output.push_str(" | ");

                match series.values.get(index).copied().flatten() {
                    Some(value) => {
                        let bar = glyph.to_string().repeat(self.bar_length(value, max));
                        output.push_str(&bar);
                        if !bar.is_empty() {
                            output.push(' ');
                        }
                        output.push_str(&format!("{:.2}", value));
                    }
                    None => output.push_str("n/a"),
                }

                if let Some(Some(note)) = series.annotations.get(index) {
                    output.push_str(&format!(" ({})", note));
                }
                output.push('\n');
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_series() {
        let chart = BarChart::new("Percentages", vec!["A".into(), "Bb".into()], 10)
            .labels("Group", "Percentage")
            .series(
                Series::new("pct", vec![Some(50.0), Some(25.0)])
                    .with_annotations(vec![Some("n=4".into()), None]),
            );

        let rendered = chart.render();
        assert!(rendered.contains("A  | ██████████ 50.00 (n=4)\n"));
        assert!(rendered.contains("Bb | █████ 25.00\n"));
        assert!(!rendered.contains("Legend"));
    }

    #[test]
    fn test_grouped_series_with_legend() {
        let chart = BarChart::new("Pay", vec!["Under 25".into()], 4)
            .series(Series::new("Fully remote", vec![Some(100.0)]))
            .series(Series::new("Hybrid", vec![None]));

        let rendered = chart.render();
        assert!(rendered.contains("Legend: █ Fully remote   ▒ Hybrid"));
        assert!(rendered.contains("Under 25 | ████ 100.00\n"));
        assert!(rendered.contains("         | n/a\n"));
    }

    #[test]
    fn test_zero_and_negative_values() {
        let chart = BarChart::new("Zeros", vec!["x".into(), "y".into()], 8)
            .series(Series::new("s", vec![Some(0.0), Some(-3.0)]));

        let rendered = chart.render();
        assert!(rendered.contains("x | 0.00\n"));
        assert!(rendered.contains("y | -3.00\n"));
    }

    #[test]
    fn test_empty_chart() {
        let chart = BarChart::new("Nothing", Vec::new(), 8);
        assert!(chart.render().contains("No results."));
    }
}
