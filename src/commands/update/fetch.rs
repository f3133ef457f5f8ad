use super::*;

#[derive(Debug, Clone)]
pub(super) enum ArchiveSource {
    Remote {
        url: String,
        token: Option<String>,
        timeout: Duration,
    },
    Local(PathBuf),
}

impl ArchiveSource {
    pub(super) fn from_args(args: &UpdateArgs) -> Self {
        match &args.archive_path {
            Some(path) => Self::Local(path.clone()),
            None => Self::Remote {
                url: args.source_url.clone(),
                token: args
                    .token
                    .as_deref()
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(ToOwned::to_owned),
                timeout: Duration::from_secs(args.timeout_secs),
            },
        }
    }

    pub(super) fn describe(&self) -> String {
        match self {
            Self::Remote { url, .. } => url.clone(),
            Self::Local(path) => path.display().to_string(),
        }
    }

    /// Whole archive in memory. Any failure here aborts the run before writes.
    pub(super) fn load(&self) -> Result<Vec<u8>> {
        match self {
            Self::Local(path) => {
                let bytes = fs::read(path)
                    .with_context(|| format!("failed to read archive {}", path.display()))?;
                info!(path = %path.display(), bytes = bytes.len(), "loaded local archive");
                Ok(bytes)
            }
            Self::Remote {
                url,
                token,
                timeout,
            } => download(url, token.as_deref(), *timeout),
        }
    }
}

fn download(url: &str, token: Option<&str>, timeout: Duration) -> Result<Vec<u8>> {
    info!(url = %url, authenticated = token.is_some(), "downloading archive");

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into();

    let mut request = agent.get(url);
    if let Some(token) = token {
        request = request.header("Authorization", format!("Bearer {token}"));
    }

    let response = request
        .call()
        .with_context(|| format!("failed to download {url}"))?;

    let mut bytes = Vec::new();
    response
        .into_body()
        .into_reader()
        .read_to_end(&mut bytes)
        .with_context(|| format!("failed to read response body from {url}"))?;

    info!(bytes = bytes.len(), "downloaded archive");
    Ok(bytes)
}
