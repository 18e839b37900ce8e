//! Catalog store: topics, barriers, and concepts backed by YAML files
//!
//! The whole catalog is cached in memory and swapped wholesale on reload.
//! Read handlers serve the cache; write handlers re-read the backing file
//! fresh from disk, persist, then update the cache entry in place. External
//! edits are picked up by the watcher (see `watcher`), which calls
//! [`CatalogStore::reload`] once the files have settled.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ciit_common::config::DataFolders;
use ciit_common::ids;
use ciit_common::model::{Barrier, Concept, Topic};
use ciit_common::{Error, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Accepted image MIME types for concept uploads.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Maximum accepted image payload: 5 MiB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Document shape of `topics.yaml`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct TopicsDoc {
    #[serde(default)]
    topics: Vec<Topic>,
}

/// Document shape of `barriers.yaml`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct BarriersDoc {
    #[serde(default)]
    barriers: Vec<Barrier>,
}

#[derive(Debug, Default)]
struct CatalogCache {
    topics: Vec<Topic>,
    barriers: Vec<Barrier>,
    concepts: Vec<Concept>,
}

/// In-memory catalog with YAML persistence.
#[derive(Clone)]
pub struct CatalogStore {
    folders: DataFolders,
    cache: Arc<RwLock<CatalogCache>>,
}

impl CatalogStore {
    pub fn new(folders: DataFolders) -> Self {
        Self {
            folders,
            cache: Arc::new(RwLock::new(CatalogCache::default())),
        }
    }

    pub fn folders(&self) -> &DataFolders {
        &self.folders
    }

    /// Paths the watcher fingerprints for change detection.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        vec![
            self.folders.topics_file(),
            self.folders.barriers_file(),
            self.folders.concepts_dir(),
        ]
    }

    /// Read every backing file and swap the cache wholesale.
    ///
    /// Unparsable individual files are logged and skipped so one bad edit
    /// never takes the rest of the catalog down. A missing topics or
    /// barriers file loads as an empty list.
    pub async fn reload(&self) -> Result<()> {
        let topics = load_topics(&self.folders.topics_file()).await;
        let barriers = load_barriers(&self.folders.barriers_file()).await;
        let concepts = load_concepts(&self.folders.concepts_dir()).await?;

        info!(
            "Catalog loaded: {} topics, {} barriers, {} concepts",
            topics.len(),
            barriers.len(),
            concepts.len()
        );

        let mut cache = self.cache.write().await;
        *cache = CatalogCache {
            topics,
            barriers,
            concepts,
        };
        Ok(())
    }

    /// Cached topic list, order as loaded from file.
    pub async fn topics(&self) -> Vec<Topic> {
        self.cache.read().await.topics.clone()
    }

    /// Cached barrier list, order as loaded from file.
    pub async fn barriers(&self) -> Vec<Barrier> {
        self.cache.read().await.barriers.clone()
    }

    /// Cached concept list, order as loaded from the concepts directory.
    pub async fn concepts(&self) -> Vec<Concept> {
        self.cache.read().await.concepts.clone()
    }

    /// Overwrite one concept's topic-id list, preserving every other field.
    ///
    /// Reads the backing record fresh from storage rather than the cache so
    /// a concurrent external edit is not silently reverted wholesale.
    pub async fn replace_concept_topics(
        &self,
        concept_id: &str,
        topic_ids: Vec<String>,
    ) -> Result<Concept> {
        let path = self.concept_path(concept_id)?;
        let mut concept = read_concept_file(&path, concept_id).await?;
        concept.topics = topic_ids;
        self.persist_concept(&path, &concept).await?;
        Ok(concept)
    }

    /// Replace an entire concept record. The stored id is forced to match
    /// `concept_id` even when the payload disagrees.
    pub async fn replace_concept(&self, concept_id: &str, mut record: Concept) -> Result<Concept> {
        let path = self.concept_path(concept_id)?;
        if !path_exists(&path).await {
            return Err(Error::NotFound(format!("Concept not found: {concept_id}")));
        }
        record.id = concept_id.to_string();
        self.persist_concept(&path, &record).await?;
        Ok(record)
    }

    /// Append a brand-new concept record. The id is derived from the name
    /// when the payload carries none; an already-taken id is refused rather
    /// than silently overwritten.
    pub async fn create_concept(&self, mut record: Concept) -> Result<Concept> {
        if record.id.is_empty() {
            record.id = ids::slugify(&record.name);
        }
        if record.id.is_empty() {
            return Err(Error::InvalidInput(
                "Concept name yields an empty id".to_string(),
            ));
        }
        let path = self.concept_path(&record.id)?;
        if path_exists(&path).await {
            return Err(Error::Conflict(format!(
                "Concept already exists: {}",
                record.id
            )));
        }
        self.persist_concept(&path, &record).await?;
        Ok(record)
    }

    /// Store an uploaded image under `images/<conceptId>.<ext>` and point
    /// the concept's `image` field at it.
    ///
    /// Returns the stored filename together with the updated concept.
    pub async fn set_concept_image(
        &self,
        concept_id: &str,
        data: &[u8],
        mime_type: &str,
        original_filename: Option<&str>,
    ) -> Result<(String, Concept)> {
        if !ALLOWED_IMAGE_TYPES.contains(&mime_type) {
            return Err(Error::InvalidInput(
                "Invalid file type. Only JPEG, PNG, GIF, and WebP are allowed.".to_string(),
            ));
        }
        if data.len() > MAX_IMAGE_BYTES {
            return Err(Error::InvalidInput(format!(
                "Image exceeds the {} MiB limit",
                MAX_IMAGE_BYTES / (1024 * 1024)
            )));
        }

        let path = self.concept_path(concept_id)?;
        let mut concept = read_concept_file(&path, concept_id).await?;

        let ext = image_extension(mime_type, original_filename);
        let filename = format!("{concept_id}.{ext}");
        fs::write(self.folders.images_dir().join(&filename), data).await?;

        concept.image = filename.clone();
        self.persist_concept(&path, &concept).await?;
        Ok((filename, concept))
    }

    fn concept_path(&self, concept_id: &str) -> Result<PathBuf> {
        if !ids::is_safe_id(concept_id) {
            return Err(Error::InvalidInput(format!(
                "Invalid concept id: {concept_id}"
            )));
        }
        Ok(self.folders.concepts_dir().join(format!("{concept_id}.yaml")))
    }

    /// Write the record to disk, then mirror it into the cache. The watcher
    /// will observe the write too; its follow-up reload is idempotent.
    async fn persist_concept(&self, path: &Path, concept: &Concept) -> Result<()> {
        let yaml = serde_yaml::to_string(concept)?;
        fs::write(path, yaml).await?;

        let mut cache = self.cache.write().await;
        match cache.concepts.iter_mut().find(|c| c.id == concept.id) {
            Some(entry) => *entry = concept.clone(),
            None => cache.concepts.push(concept.clone()),
        }
        Ok(())
    }
}

async fn path_exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

async fn read_concept_file(path: &Path, concept_id: &str) -> Result<Concept> {
    if !path_exists(path).await {
        return Err(Error::NotFound(format!("Concept not found: {concept_id}")));
    }
    let content = fs::read_to_string(path).await?;
    Ok(serde_yaml::from_str(&content)?)
}

async fn load_topics(path: &Path) -> Vec<Topic> {
    match fs::read_to_string(path).await {
        Ok(content) => match serde_yaml::from_str::<TopicsDoc>(&content) {
            Ok(doc) => doc.topics,
            Err(err) => {
                error!("Error loading topics from {}: {err}", path.display());
                Vec::new()
            }
        },
        Err(err) => {
            error!("Error reading {}: {err}", path.display());
            Vec::new()
        }
    }
}

async fn load_barriers(path: &Path) -> Vec<Barrier> {
    if !path_exists(path).await {
        // The barriers flow is optional; older catalogs have no barriers file.
        return Vec::new();
    }
    match fs::read_to_string(path).await {
        Ok(content) => match serde_yaml::from_str::<BarriersDoc>(&content) {
            Ok(doc) => doc.barriers,
            Err(err) => {
                error!("Error loading barriers from {}: {err}", path.display());
                Vec::new()
            }
        },
        Err(err) => {
            error!("Error reading {}: {err}", path.display());
            Vec::new()
        }
    }
}

async fn load_concepts(dir: &Path) -> Result<Vec<Concept>> {
    let mut concepts = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("yaml") {
            paths.push(path);
        }
    }
    // Directory enumeration order is OS-arbitrary; sort by filename so the
    // served order is stable across reloads.
    paths.sort();

    for path in paths {
        match fs::read_to_string(&path).await {
            Ok(content) => match serde_yaml::from_str::<Concept>(&content) {
                Ok(concept) => concepts.push(concept),
                Err(err) => error!("Error loading concept {}: {err}", path.display()),
            },
            Err(err) => error!("Error reading {}: {err}", path.display()),
        }
    }
    Ok(concepts)
}

/// Extension for the stored image file: taken from the uploaded filename
/// when it has one, otherwise derived from the MIME subtype.
fn image_extension(mime_type: &str, original_filename: Option<&str>) -> String {
    if let Some(name) = original_filename {
        if let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) {
            if !ext.is_empty() {
                return ext.to_ascii_lowercase();
            }
        }
    }
    match mime_type {
        "image/jpeg" => "jpg".to_string(),
        other => other.trim_start_matches("image/").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extension_prefers_filename() {
        assert_eq!(image_extension("image/png", Some("photo.PNG")), "png");
        assert_eq!(image_extension("image/jpeg", Some("shot.jpeg")), "jpeg");
        assert_eq!(image_extension("image/jpeg", Some("noext")), "jpg");
        assert_eq!(image_extension("image/webp", None), "webp");
    }

    fn store() -> (tempfile::TempDir, CatalogStore) {
        let dir = tempfile::tempdir().unwrap();
        let folders = DataFolders::new(dir.path());
        folders.ensure_directories().unwrap();
        (dir, CatalogStore::new(folders))
    }

    #[tokio::test]
    async fn reload_skips_unparsable_files() {
        let (_dir, store) = store();
        let folders = store.folders().clone();
        std::fs::write(
            folders.concepts_dir().join("good.yaml"),
            "id: good\nname: Good\n",
        )
        .unwrap();
        std::fs::write(folders.concepts_dir().join("bad.yaml"), ": not yaml [").unwrap();

        store.reload().await.unwrap();
        let concepts = store.concepts().await;
        assert_eq!(concepts.len(), 1);
        assert_eq!(concepts[0].id, "good");

        // Missing topics and barriers files load as empty lists
        assert!(store.topics().await.is_empty());
        assert!(store.barriers().await.is_empty());
    }

    #[tokio::test]
    async fn create_then_replace_concept() {
        let (_dir, store) = store();
        store.reload().await.unwrap();

        let created = store
            .create_concept(Concept {
                name: "Acme Fund".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.id, "acme-fund");

        // Same derived id again is refused
        let err = store
            .create_concept(Concept {
                name: "Acme Fund".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let updated = store
            .replace_concept_topics("acme-fund", vec!["solar".into()])
            .await
            .unwrap();
        assert_eq!(updated.topics, vec!["solar".to_string()]);
        assert_eq!(updated.name, "Acme Fund");

        // The cache reflects the write without a reload
        let cached = store.concepts().await;
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].topics, vec!["solar".to_string()]);
    }

    #[tokio::test]
    async fn nameless_concept_is_rejected() {
        let (_dir, store) = store();
        let err = store
            .create_concept(Concept::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
