//! Business logic services

pub mod catalog;
pub mod media;

use crate::{config::MediaConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub media: media::MediaService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, media_config: MediaConfig) -> Self {
        let media = media::MediaService::new(media_config);
        Self {
            catalog: catalog::CatalogService::new(repository, media.clone()),
            media,
        }
    }
}
