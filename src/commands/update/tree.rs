use super::*;

/// Every file derived from one department's merged records, keyed by path
/// relative to the department directory.
#[derive(Debug)]
pub(super) struct DepartmentTree<'a> {
    pub(super) files: BTreeMap<PathBuf, Vec<&'a CourseRecord>>,
    pub(super) summary: DepartmentSummary,
}

pub(super) fn plan_department_tree<'a>(
    code: &str,
    records: &'a [CourseRecord],
    parser: &PeriodParser,
) -> DepartmentTree<'a> {
    let mut files: BTreeMap<PathBuf, Vec<&'a CourseRecord>> = BTreeMap::new();
    let mut intensities = BTreeSet::new();

    files.insert(
        PathBuf::from(DEPARTMENT_STATE_FILE),
        records.iter().collect(),
    );

    for record in records {
        let period = parser.period(record.course_start_text());
        let semester_dir = Path::new(&period.year).join(&period.semester);

        files
            .entry(semester_dir.join("all.json"))
            .or_default()
            .push(record);

        let grades: BTreeSet<String> = record
            .grade_tokens()
            .iter()
            .map(|grade| avoid_reserved(sanitize_token(grade), "all"))
            .collect();
        for grade in grades {
            files
                .entry(semester_dir.join(format!("{grade}.json")))
                .or_default()
                .push(record);
        }

        let intensity_key = match record.intensity() {
            Some(value) => {
                intensities.insert(value.to_string());
                avoid_reserved(sanitize_token(value), FALLBACK_CATEGORY)
            }
            None => FALLBACK_CATEGORY.to_string(),
        };
        files
            .entry(Path::new(INTENSITY_DIR).join(format!("{intensity_key}.json")))
            .or_default()
            .push(record);
    }

    DepartmentTree {
        files,
        summary: DepartmentSummary {
            code: code.to_string(),
            count: records.len(),
            regular_or_intensive: intensities.into_iter().collect(),
        },
    }
}

pub(super) fn write_department_tree(dept_dir: &Path, tree: &DepartmentTree<'_>) -> Result<()> {
    ensure_directory(dept_dir)?;
    clear_derived_outputs(dept_dir)?;

    for (relative, records) in &tree.files {
        write_json_pretty(&dept_dir.join(relative), records)?;
    }

    debug!(
        dir = %dept_dir.display(),
        files = tree.files.len(),
        "wrote department tree"
    );

    Ok(())
}

/// Removes per-period and per-classifier subdirectories left by earlier runs.
/// Files directly under the department directory are left in place.
fn clear_derived_outputs(dept_dir: &Path) -> Result<()> {
    let entries = fs::read_dir(dept_dir)
        .with_context(|| format!("failed to read {}", dept_dir.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", dept_dir.display()))?;
        let path = entry.path();

        if entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_dir()
        {
            fs::remove_dir_all(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
    }

    Ok(())
}

/// File-name-safe form of a grouping value.
pub(super) fn sanitize_token(value: &str) -> String {
    let replaced = value.trim().replace(['/', '\\'], "_");
    if replaced.is_empty() {
        return FALLBACK_CATEGORY.to_string();
    }
    if replaced == "." || replaced == ".." {
        return replaced.replace('.', "_");
    }

    replaced
}

/// Keeps a value-derived file stem from colliding with a fixed file name.
fn avoid_reserved(token: String, reserved: &str) -> String {
    if token == reserved {
        format!("{token}_")
    } else {
        token
    }
}
