use crate::entities::StoredFile;
use crate::errors::DomainError;
use chrono::Utc;
use rand::Rng;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

/// Upload ceiling: 10 MiB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "ppt", "pptx", "txt", "jpg", "jpeg", "png", "gif", "mp4", "avi", "mov",
    "mp3", "wav",
];

pub const FILE_TYPE_NOT_ALLOWED: &str =
    "File type not allowed. Please upload PDF, Office documents, images, videos, or audio files.";

pub const FILE_MISSING_ON_DISK: &str = "File not found on disk";

/// Owns the upload directory: admission checks, unique naming, and blob I/O.
///
/// Names are unique at generation time; that is the only guard against two
/// requests writing the same path.
#[derive(Debug, Clone)]
pub struct AttachmentService {
    upload_dir: PathBuf,
    max_bytes: usize,
}

fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((base, ext)) if !ext.is_empty() => (base, Some(ext)),
        _ => (name, None),
    }
}

/// Last path component of a client-supplied name.
fn client_file_name(original: &str) -> &str {
    original
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(original)
}

/// Create `path` and hand it to `write`. A failed write removes the partial file.
async fn write_blob<F, Fut>(path: &Path, write: F) -> Result<(), DomainError>
where
    F: FnOnce(fs::File) -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    let file = fs::File::create(path).await?;
    if let Err(e) = write(file).await {
        if let Err(cleanup) = fs::remove_file(path).await {
            error!("Error deleting partial upload {}: {}", path.display(), cleanup);
        }
        return Err(e.into());
    }
    Ok(())
}

impl AttachmentService {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub async fn ensure_upload_dir(&self) -> Result<(), DomainError> {
        fs::create_dir_all(&self.upload_dir).await?;
        Ok(())
    }

    /// Rejects names whose extension is outside [`ALLOWED_EXTENSIONS`].
    pub fn check_file_name(&self, original_name: &str) -> Result<(), DomainError> {
        let (_, ext) = split_extension(client_file_name(original_name));
        match ext {
            Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) => Ok(()),
            _ => Err(DomainError::UploadRejected(FILE_TYPE_NOT_ALLOWED.to_string())),
        }
    }

    pub fn check_size(&self, len: usize) -> Result<(), DomainError> {
        if len > self.max_bytes {
            return Err(DomainError::UploadRejected(format!(
                "File too large. Maximum size is {} bytes",
                self.max_bytes
            )));
        }
        Ok(())
    }

    /// `<base>-<unix micros>-<random><.ext>`, keeping the original extension.
    pub fn generate_file_name(original_name: &str) -> String {
        let name = client_file_name(original_name);
        let (base, ext) = split_extension(name);
        let base: String = base
            .chars()
            .map(|c| if c == '"' || c.is_control() { '_' } else { c })
            .collect();
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        let stamp = Utc::now().timestamp_micros();
        match ext {
            Some(ext) => format!("{}-{}-{}.{}", base, stamp, suffix, ext),
            None => format!("{}-{}-{}", base, stamp, suffix),
        }
    }

    /// MIME type implied by the extension, for parts that arrive untyped.
    pub fn mime_for(file_name: &str) -> String {
        mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .to_string()
    }

    /// Path of a stored blob. `None` unless `file_name` is one plain component.
    pub fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        let candidate = Path::new(file_name);
        let is_plain = !file_name.is_empty()
            && file_name != "."
            && file_name != ".."
            && !file_name.contains(['/', '\\'])
            && candidate.file_name().map(|n| n == candidate.as_os_str()) == Some(true);
        is_plain.then(|| self.upload_dir.join(file_name))
    }

    /// Admit and persist one upload. Nothing is written if a check fails.
    pub async fn store(
        &self,
        original_name: &str,
        declared_type: Option<&str>,
        content: &[u8],
    ) -> Result<StoredFile, DomainError> {
        self.check_file_name(original_name)?;
        self.check_size(content.len())?;
        self.ensure_upload_dir().await?;

        let file_name = Self::generate_file_name(original_name);
        let path = self.upload_dir.join(&file_name);

        write_blob(&path, |mut file| async move {
            file.write_all(content).await?;
            file.sync_all().await
        })
        .await?;
        debug!("Stored upload {} ({} bytes)", file_name, content.len());

        let file_type = match declared_type.filter(|t| !t.is_empty()) {
            Some(declared) => declared.to_string(),
            None => Self::mime_for(original_name),
        };

        Ok(StoredFile {
            original_name: original_name.to_string(),
            file_size: content.len() as i64,
            file_type,
            file_path: path.to_string_lossy().into_owned(),
            file_name,
        })
    }

    pub async fn exists(&self, file_name: &str) -> bool {
        match self.resolve(file_name) {
            Some(path) => fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false),
            None => false,
        }
    }

    /// Open a stored blob for streaming, returning the handle and its length.
    pub async fn open(&self, file_name: &str) -> Result<(fs::File, u64), DomainError> {
        let path = self
            .resolve(file_name)
            .ok_or_else(|| DomainError::MissingFile(FILE_MISSING_ON_DISK.to_string()))?;
        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DomainError::MissingFile(FILE_MISSING_ON_DISK.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let len = file.metadata().await?.len();
        Ok((file, len))
    }

    pub async fn remove(&self, file_name: &str) -> Result<(), DomainError> {
        let path = self
            .resolve(file_name)
            .ok_or_else(|| DomainError::MissingFile(FILE_MISSING_ON_DISK.to_string()))?;
        fs::remove_file(&path).await?;
        debug!("Removed upload {}", file_name);
        Ok(())
    }

    /// Best-effort removal of an orphaned upload. Failures are only logged.
    pub async fn discard(&self, file_name: &str) {
        if let Err(e) = self.remove(file_name).await {
            error!("Error deleting uploaded file {}: {}", file_name, e);
        }
    }
}
