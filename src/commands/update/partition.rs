use super::*;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(super) struct Category {
    pub(super) campus: String,
    pub(super) level: String,
}

impl Category {
    fn new(campus: &str, level: &str) -> Self {
        Self {
            campus: campus.to_string(),
            level: level.to_string(),
        }
    }
}

/// Static department lookups: sub-code aliases and the campus/level table.
#[derive(Debug, Clone)]
pub(super) struct DepartmentTables {
    aliases: BTreeMap<String, String>,
    campuses: BTreeMap<String, Category>,
}

#[derive(Debug, Deserialize)]
struct DepartmentTablesFile {
    aliases: Option<BTreeMap<String, String>>,
    campuses: Option<BTreeMap<String, (String, String)>>,
}

impl Default for DepartmentTables {
    fn default() -> Self {
        let aliases = [
            ("ESE5", "ES"),
            ("ESE6", "ES"),
            ("ESE7", "ES"),
            ("HSH1", "HS"),
            ("HSH2", "HS"),
            ("HSH5", "HS"),
            ("HSH6", "HS"),
        ]
        .into_iter()
        .map(|(code, parent)| (code.to_string(), parent.to_string()))
        .collect();

        let campuses = [
            ("CS", "hachioji", "university"),
            ("MS", "hachioji", "university"),
            ("BT", "hachioji", "university"),
            ("ES", "hachioji", "university"),
            ("X1", "hachioji", "university"),
            ("GF", "hachioji", "graduate"),
            ("DS", "kamata", "university"),
            ("HS", "kamata", "university"),
            ("X3", "kamata", "university"),
            ("GH", "kamata", "graduate"),
        ]
        .into_iter()
        .map(|(code, campus, level)| (code.to_string(), Category::new(campus, level)))
        .collect();

        Self { aliases, campuses }
    }
}

impl DepartmentTables {
    /// Loads overrides from a JSON file; a missing key keeps the built-in table.
    pub(super) fn load(path: Option<&Path>) -> Result<Self> {
        let mut tables = Self::default();
        let Some(path) = path else {
            return Ok(tables);
        };

        let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let file: DepartmentTablesFile = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        if let Some(aliases) = file.aliases {
            tables.aliases = aliases;
        }
        if let Some(campuses) = file.campuses {
            tables.campuses = campuses
                .into_iter()
                .map(|(code, (campus, level))| (code, Category { campus, level }))
                .collect();
        }

        info!(
            path = %path.display(),
            aliases = tables.aliases.len(),
            campuses = tables.campuses.len(),
            "loaded department tables"
        );

        Ok(tables)
    }

    /// Collapses a sub-code onto its parent; canonical codes map to themselves.
    pub(super) fn canonical_code(&self, code: &str) -> String {
        self.aliases
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    pub(super) fn category(&self, code: &str) -> Category {
        self.campuses
            .get(code)
            .cloned()
            .unwrap_or_else(|| Category::new(FALLBACK_CATEGORY, FALLBACK_CATEGORY))
    }

    /// Canonical department for an archive member, or `None` when the path has
    /// no `<code>/<file>` tail after the marker or the code is not a plain
    /// directory name.
    pub(super) fn department_for_path(&self, member_path: &str) -> Option<String> {
        let tail = member_path.split(MEMBER_PATH_MARKER).nth(1)?;
        let mut parts = tail.split('/');
        let code = parts.next()?;
        parts.next()?;

        if !is_plain_segment(code) {
            return None;
        }

        let canonical = self.canonical_code(code);
        is_plain_segment(&canonical).then_some(canonical)
    }
}

fn is_plain_segment(code: &str) -> bool {
    !code.is_empty() && code != "." && code != ".." && !code.contains(['\\', ':'])
}

pub(super) fn is_index_member(member_path: &str) -> bool {
    member_path.contains(MEMBER_PATH_MARKER) && member_path.ends_with(".json")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn canonical_code_is_idempotent() {
        let tables = DepartmentTables::default();
        assert_eq!(tables.canonical_code("CS"), "CS");
        assert_eq!(tables.canonical_code("ES"), "ES");
        assert_eq!(tables.canonical_code("ESE6"), "ES");
        assert_eq!(tables.canonical_code("HSH2"), "HS");
        let once = tables.canonical_code("HSH5");
        assert_eq!(tables.canonical_code(&once), once);
    }

    #[test]
    fn unknown_department_falls_back_to_other() {
        let tables = DepartmentTables::default();
        assert_eq!(tables.category("ZZ"), Category::new("other", "other"));
        assert_eq!(tables.category("GH"), Category::new("kamata", "graduate"));
    }

    #[test]
    fn department_for_path_uses_segment_after_marker() {
        let tables = DepartmentTables::default();
        assert_eq!(
            tables
                .department_for_path("repo-main/api/v1/CS/CS1001.json")
                .as_deref(),
            Some("CS")
        );
        assert_eq!(
            tables
                .department_for_path("repo-main/api/v1/ESE7/E01.json")
                .as_deref(),
            Some("ES")
        );
        assert_eq!(
            tables
                .department_for_path("repo-main/api/v1/all/X.json")
                .as_deref(),
            Some("all")
        );
        assert_eq!(tables.department_for_path("repo-main/api/v1/index.json"), None);
        assert_eq!(tables.department_for_path("repo-main/docs/CS/x.json"), None);
    }

    #[test]
    fn department_for_path_rejects_relative_and_empty_segments() {
        let tables = DepartmentTables::default();
        assert_eq!(tables.department_for_path("repo-main/api/v1/./D1.json"), None);
        assert_eq!(tables.department_for_path("repo-main/api/v1/../D1.json"), None);
        assert_eq!(tables.department_for_path("repo-main/api/v1//D1.json"), None);
        assert_eq!(tables.department_for_path("repo-main/api/v1/C:\\x/D1.json"), None);
    }

    #[test]
    fn index_member_filter_requires_marker_and_json() {
        assert!(is_index_member("r/api/v1/CS/a.json"));
        assert!(!is_index_member("r/api/v1/CS/"));
        assert!(!is_index_member("r/api/v2/CS/a.json"));
    }

    #[test]
    fn load_overrides_only_given_tables() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "campuses": {{ "CS": ["tokyo", "university"] }} }}"#)
            .expect("write overrides");

        let tables = DepartmentTables::load(Some(file.path())).expect("overrides load");
        assert_eq!(tables.category("CS"), Category::new("tokyo", "university"));
        assert_eq!(tables.category("GF"), Category::new("other", "other"));
        assert_eq!(tables.canonical_code("ESE5"), "ES");
    }
}
