use chrono::Utc;

use super::*;

/// Where one run reads persisted state from and writes its outputs to.
#[derive(Debug, Clone)]
pub(super) struct OutputLayout {
    pub(super) api_root: PathBuf,
    pub(super) index_path: PathBuf,
}

impl OutputLayout {
    pub(super) fn from_args(args: &UpdateArgs) -> Self {
        Self {
            api_root: args.output_root.join(&args.api_dir),
            index_path: args.output_root.join(&args.index_file),
        }
    }

    pub(super) fn department_dir(&self, category: &Category, code: &str) -> PathBuf {
        self.api_root
            .join(&category.campus)
            .join(&category.level)
            .join(code)
    }
}

#[derive(Debug)]
pub(super) struct IndexReport {
    pub(super) member_count: usize,
    pub(super) indexed_count: usize,
    pub(super) skipped_count: usize,
    pub(super) latest_year: Option<String>,
    pub(super) years: Vec<String>,
    pub(super) total_records: usize,
    pub(super) departments: Vec<DepartmentRunStats>,
}

pub fn run(args: UpdateArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("update-{}", utc_compact_string(started_ts));

    let layout = OutputLayout::from_args(&args);
    let tables = DepartmentTables::load(args.department_tables.as_deref())?;
    let source = ArchiveSource::from_args(&args);

    info!(
        run_id = %run_id,
        source = %source.describe(),
        api_root = %layout.api_root.display(),
        dry_run = args.dry_run,
        "starting update"
    );

    let archive = source.load()?;
    let report = build_index(&archive, &layout, &tables, args.progress_every, args.dry_run)?;

    if let Some(manifest_path) = &args.run_manifest {
        let manifest = UpdateRunManifest {
            manifest_version: 1,
            run_id,
            started_at,
            finished_at: now_utc_string(),
            source: source.describe(),
            archive_sha256: sha256_bytes(&archive),
            member_count: report.member_count,
            indexed_count: report.indexed_count,
            skipped_count: report.skipped_count,
            latest_year: report.latest_year.clone(),
            years: report.years.clone(),
            total_records: report.total_records,
            departments: report.departments.clone(),
        };

        if args.dry_run {
            info!(path = %manifest_path.display(), "dry-run: run manifest not written");
        } else {
            write_json_pretty(manifest_path, &manifest)?;
            info!(path = %manifest_path.display(), "wrote run manifest");
        }
    }

    info!(
        total_records = report.total_records,
        departments = report.departments.len(),
        skipped = report.skipped_count,
        "update completed"
    );

    Ok(())
}

/// Scans the archive, merges every department against its persisted state and
/// writes the department trees followed by the combined index and metadata.
pub(super) fn build_index(
    archive: &[u8],
    layout: &OutputLayout,
    tables: &DepartmentTables,
    progress_every: usize,
    dry_run: bool,
) -> Result<IndexReport> {
    let normalizer = CourseNormalizer::new()?;
    let parser = PeriodParser::new()?;

    let mut scan = scan_archive(archive, tables, &normalizer, progress_every)?;
    let pool = scan.take_full_corpus_pool();

    let years = observed_years(&pool, &parser);
    let latest_year = latest_year(&years);
    info!(
        latest_year = latest_year.as_deref().unwrap_or("none"),
        years = ?years,
        pool = pool.len(),
        "computed latest-year watermark"
    );

    let mut combined: Vec<CourseRecord> = Vec::new();
    let mut metadata = DepartmentMetadata::new();
    let mut departments = Vec::with_capacity(scan.buckets.len());

    for (code, fresh) in std::mem::take(&mut scan.buckets) {
        let category = tables.category(&code);
        let dept_dir = layout.department_dir(&category, &code);
        let existing = load_department_state(&dept_dir)?;

        let outcome = merge_department(existing, fresh, latest_year.as_deref(), &parser);
        match outcome.mode {
            MergeMode::Initial => info!(
                department = %code,
                total = outcome.records.len(),
                "department merged (initial)"
            ),
            mode => info!(
                department = %code,
                old = outcome.old_kept,
                new = outcome.fresh_taken,
                total = outcome.records.len(),
                mode = mode.as_str(),
                "department merged"
            ),
        }

        let summary = {
            let tree = plan_department_tree(&code, &outcome.records, &parser);
            if !dry_run {
                write_department_tree(&dept_dir, &tree)?;
            }
            tree.summary
        };

        departments.push(DepartmentRunStats {
            code: code.clone(),
            campus: category.campus.clone(),
            level: category.level.clone(),
            mode: outcome.mode,
            old_kept: outcome.old_kept,
            fresh_taken: outcome.fresh_taken,
            total: outcome.records.len(),
        });
        metadata
            .entry(category.campus)
            .or_default()
            .entry(category.level)
            .or_default()
            .push(summary);
        combined.extend(outcome.records);
    }

    if dry_run {
        info!(
            total_records = combined.len(),
            "dry-run: combined index and metadata not written"
        );
    } else {
        write_json_pretty(&layout.index_path, &combined)?;
        write_json_pretty(&layout.api_root.join(DEPARTMENT_STATE_FILE), &combined)?;
        write_json_pretty(&layout.api_root.join(METADATA_FILE), &metadata)?;
        info!(
            index = %layout.index_path.display(),
            total_records = combined.len(),
            "wrote combined index and metadata"
        );
    }

    Ok(IndexReport {
        member_count: scan.member_count,
        indexed_count: scan.indexed_count,
        skipped_count: scan.skipped_count,
        latest_year,
        years: years.into_iter().collect(),
        total_records: combined.len(),
        departments,
    })
}

/// Persisted records for a department; absent state is empty, unreadable
/// state is an error so it is never silently replaced.
fn load_department_state(dept_dir: &Path) -> Result<Vec<CourseRecord>> {
    let path = dept_dir.join(DEPARTMENT_STATE_FILE);
    let existing: Option<Vec<CourseRecord>> = read_json_if_exists(&path)?;

    Ok(existing.unwrap_or_default())
}
