use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::{DepartmentMetadata, UpdateRunManifest};
use crate::util::read_json_if_exists;

pub fn run(args: StatusArgs) -> Result<()> {
    let api_root = args.output_root.join(&args.api_dir);
    let metadata_path = api_root.join("departments.json");

    info!(api_root = %api_root.display(), "status requested");

    match read_json_if_exists::<DepartmentMetadata>(&metadata_path)? {
        Some(metadata) => log_metadata(&metadata),
        None => warn!(path = %metadata_path.display(), "department metadata missing"),
    }

    if let Some(manifest_path) = &args.run_manifest {
        log_run_manifest(manifest_path)?;
    }

    Ok(())
}

fn log_metadata(metadata: &DepartmentMetadata) {
    let mut total_records = 0usize;
    let mut total_departments = 0usize;

    for (campus, levels) in metadata {
        for (level, departments) in levels {
            let records: usize = departments.iter().map(|dept| dept.count).sum();
            let codes = departments
                .iter()
                .map(|dept| dept.code.as_str())
                .collect::<Vec<&str>>()
                .join(",");

            info!(
                campus = %campus,
                level = %level,
                departments = departments.len(),
                records,
                codes = %codes,
                "department group"
            );

            total_records += records;
            total_departments += departments.len();
        }
    }

    info!(
        departments = total_departments,
        records = total_records,
        "loaded department metadata"
    );
}

fn log_run_manifest(path: &Path) -> Result<()> {
    let Some(manifest) = read_json_if_exists::<UpdateRunManifest>(path)? else {
        warn!(path = %path.display(), "run manifest missing");
        return Ok(());
    };

    info!(
        run_id = %manifest.run_id,
        started_at = %manifest.started_at,
        finished_at = %manifest.finished_at,
        source = %manifest.source,
        archive_sha256 = %manifest.archive_sha256,
        latest_year = manifest.latest_year.as_deref().unwrap_or("none"),
        members = manifest.member_count,
        indexed = manifest.indexed_count,
        skipped = manifest.skipped_count,
        total_records = manifest.total_records,
        "loaded run manifest"
    );

    for dept in &manifest.departments {
        info!(
            department = %dept.code,
            campus = %dept.campus,
            level = %dept.level,
            mode = dept.mode.as_str(),
            old = dept.old_kept,
            new = dept.fresh_taken,
            total = dept.total,
            "department run"
        );
    }

    Ok(())
}
