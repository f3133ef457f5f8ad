use super::*;

#[derive(Debug, thiserror::Error)]
pub(super) enum SkipReason {
    #[error("no department segment after the api/v1 marker")]
    Unattributed,
    #[error("failed to read archive member: {0}")]
    Unreadable(String),
    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("document is not a json object")]
    NotAnObject,
}

#[derive(Debug)]
pub(super) enum MemberOutcome {
    Indexed {
        department: String,
        record: Box<CourseRecord>,
    },
    Skipped {
        path: String,
        reason: SkipReason,
    },
}

/// Records grouped by canonical department, `all` pool included.
#[derive(Debug, Default)]
pub(super) struct ArchiveScan {
    pub(super) member_count: usize,
    pub(super) indexed_count: usize,
    pub(super) skipped_count: usize,
    pub(super) buckets: BTreeMap<String, Vec<CourseRecord>>,
}

impl ArchiveScan {
    fn absorb(&mut self, outcome: MemberOutcome) {
        match outcome {
            MemberOutcome::Indexed { department, record } => {
                self.indexed_count += 1;
                self.buckets.entry(department).or_default().push(*record);
            }
            MemberOutcome::Skipped { path, reason } => {
                self.skipped_count += 1;
                match &reason {
                    SkipReason::Unattributed => debug!(path = %path, "skipped unattributed member"),
                    _ => warn!(path = %path, reason = %reason, "skipped member"),
                }
            }
        }
    }

    /// Splits off the full-corpus pool; the remaining buckets are real departments.
    pub(super) fn take_full_corpus_pool(&mut self) -> Vec<CourseRecord> {
        self.buckets.remove(FULL_CORPUS_POOL).unwrap_or_default()
    }
}

pub(super) fn scan_archive(
    bytes: &[u8],
    tables: &DepartmentTables,
    normalizer: &CourseNormalizer,
    progress_every: usize,
) -> Result<ArchiveScan> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("failed to open source archive")?;

    let members: Vec<String> = archive
        .file_names()
        .filter(|name| is_index_member(name))
        .map(ToOwned::to_owned)
        .collect();

    info!(members = members.len(), "processing archive members");

    let mut scan = ArchiveScan {
        member_count: members.len(),
        ..ArchiveScan::default()
    };

    for (index, path) in members.into_iter().enumerate() {
        let outcome = match tables.department_for_path(&path) {
            None => MemberOutcome::Skipped {
                path,
                reason: SkipReason::Unattributed,
            },
            Some(department) => match read_member(&mut archive, &path) {
                Ok(raw) => decode_member(path, department, &raw, normalizer),
                Err(reason) => MemberOutcome::Skipped { path, reason },
            },
        };
        scan.absorb(outcome);

        let processed = index + 1;
        if progress_every > 0 && processed % progress_every == 0 {
            info!(processed, total = scan.member_count, "progress");
        }
    }

    Ok(scan)
}

fn read_member(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    path: &str,
) -> std::result::Result<Vec<u8>, SkipReason> {
    let mut file = archive
        .by_name(path)
        .map_err(|err| SkipReason::Unreadable(err.to_string()))?;

    let mut raw = Vec::new();
    file.read_to_end(&mut raw)
        .map_err(|err| SkipReason::Unreadable(err.to_string()))?;

    Ok(raw)
}

pub(super) fn decode_member(
    path: String,
    department: String,
    raw: &[u8],
    normalizer: &CourseNormalizer,
) -> MemberOutcome {
    let document = match serde_json::from_slice::<Value>(raw) {
        Ok(document) => document,
        Err(err) => {
            return MemberOutcome::Skipped {
                path,
                reason: SkipReason::from(err),
            };
        }
    };

    let Value::Object(fields) = document else {
        return MemberOutcome::Skipped {
            path,
            reason: SkipReason::NotAnObject,
        };
    };

    MemberOutcome::Indexed {
        department,
        record: Box::new(normalizer.normalize(&RawCourse::new(fields))),
    }
}
