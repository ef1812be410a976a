use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl CapturedImage {
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        CapturedImage {
            file_name: "attendance.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureResult {
    Captured(CapturedImage),
    Cancelled,
}

/// The camera.
pub trait ImageCapture {
    async fn request_permission(&self) -> Permission;
    async fn capture(&self) -> Result<CaptureResult>;
}

/// Uses an image file already on disk as the "photo". Permission is denied
/// unless the path is a regular file that can be opened for reading; an
/// empty file is a cancelled capture.
#[derive(Debug, Clone)]
pub struct FileCapture {
    path: PathBuf,
}

impl FileCapture {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileCapture { path: path.as_ref().to_path_buf() }
    }

    fn content_type(&self) -> &'static str {
        match self.path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref() {
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            _ => "image/jpeg",
        }
    }
}

impl ImageCapture for FileCapture {
    async fn request_permission(&self) -> Permission {
        let file = match tokio::fs::File::open(&self.path).await {
            Ok(file) => file,
            Err(_) => return Permission::Denied,
        };
        match file.metadata().await {
            Ok(meta) if meta.is_file() => Permission::Granted,
            _ => Permission::Denied,
        }
    }

    async fn capture(&self) -> Result<CaptureResult> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CaptureResult::Cancelled),
            Err(e) => return Err(e.into()),
        };
        if bytes.is_empty() {
            return Ok(CaptureResult::Cancelled);
        }
        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("attendance.jpg")
            .to_string();
        Ok(CaptureResult::Captured(CapturedImage {
            file_name,
            content_type: self.content_type().to_string(),
            bytes,
        }))
    }
}
