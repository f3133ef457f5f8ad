use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cli::UpdateArgs;
use crate::model::{
    CourseRecord, DepartmentMetadata, DepartmentRunStats, DepartmentSummary, MergeMode, RawCourse,
    SearchTime, UpdateRunManifest,
};
use crate::util::{
    ensure_directory, now_utc_string, read_json_if_exists, sha256_bytes, utc_compact_string,
    write_json_pretty,
};

/// Member paths must contain this segment; the department code follows it.
const MEMBER_PATH_MARKER: &str = "/api/v1/";
/// Department code holding the full corpus rather than a real department.
const FULL_CORPUS_POOL: &str = "all";
const FALLBACK_CATEGORY: &str = "other";
const DEPARTMENT_STATE_FILE: &str = "all.json";
const METADATA_FILE: &str = "departments.json";
const INTENSITY_DIR: &str = "regularOrIntensive";

mod archive;
mod fetch;
mod merge;
mod normalize;
mod partition;
mod period;
mod run;
mod tree;

pub use run::run;

use archive::*;
use fetch::*;
use merge::*;
use normalize::*;
use partition::*;
use period::*;
use tree::*;
