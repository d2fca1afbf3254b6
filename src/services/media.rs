//! Picture URL resolution

use crate::config::MediaConfig;

/// Maps stored picture references to servable URLs
#[derive(Clone)]
pub struct MediaService {
    url_prefix: String,
}

impl MediaService {
    pub fn new(config: MediaConfig) -> Self {
        let mut url_prefix = config.url_prefix;
        if !url_prefix.ends_with('/') {
            url_prefix.push('/');
        }
        Self { url_prefix }
    }

    /// URL under which the stored reference is served. References that are
    /// already absolute URLs are returned unchanged.
    pub fn picture_url(&self, reference: &str) -> String {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return reference.to_string();
        }
        format!("{}{}", self.url_prefix, reference.trim_start_matches('/'))
    }

    /// Path the media directory is mounted at, when the prefix is local
    pub fn mount_path(&self) -> Option<&str> {
        let path = self.url_prefix.trim_end_matches('/');
        if path.starts_with('/') && path.len() > 1 {
            Some(path)
        } else {
            None
        }
    }
}
