use super::*;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(super) struct AcademicPeriod {
    pub(super) year: String,
    pub(super) semester: String,
}

impl AcademicPeriod {
    pub(super) fn fallback() -> Self {
        Self {
            year: FALLBACK_CATEGORY.to_string(),
            semester: FALLBACK_CATEGORY.to_string(),
        }
    }
}

/// Parses `2025年度前期`-style course start strings.
pub(super) struct PeriodParser {
    year: Regex,
    period: Regex,
}

impl PeriodParser {
    pub(super) fn new() -> Result<Self> {
        let year = Regex::new(r"^(\d+)年度").context("failed to compile academic-year regex")?;
        let period = Regex::new(r"^(\d+)年度(前期|後期)")
            .context("failed to compile academic-period regex")?;

        Ok(Self { year, period })
    }

    pub(super) fn year(&self, course_start: &str) -> Option<String> {
        self.year
            .captures(course_start)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub(super) fn record_year(&self, record: &CourseRecord) -> Option<String> {
        self.year(record.course_start_text())
    }

    pub(super) fn period(&self, course_start: &str) -> AcademicPeriod {
        let Some(captures) = self.period.captures(course_start) else {
            return AcademicPeriod::fallback();
        };

        match (captures.get(1), captures.get(2)) {
            (Some(year), Some(semester)) => AcademicPeriod {
                year: year.as_str().to_string(),
                semester: semester.as_str().to_string(),
            },
            _ => AcademicPeriod::fallback(),
        }
    }
}
