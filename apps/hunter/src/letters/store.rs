use std::path::PathBuf;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use chrono::Utc;
use tracing::info;

use crate::letters::LetterError;

/// Persists generated letters and reports where they ended up.
#[async_trait]
pub trait LetterStore: Send + Sync {
    async fn save(&self, company: &str, title: &str, text: &str) -> Result<String, LetterError>;
}

/// `<company-slug>-<YYYYmmddHHMMSS>.txt`
pub fn letter_file_name(company: &str) -> String {
    format!(
        "{}-{}.txt",
        slugify(company),
        Utc::now().format("%Y%m%d%H%M%S")
    )
}

/// Lowercase ASCII alphanumerics separated by single dashes.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "company".to_string()
    } else {
        slug
    }
}

fn letter_body(title: &str, text: &str) -> String {
    format!("Re: {title}\n\n{text}\n")
}

/// Writes letters as text files under a directory.
pub struct FsLetterStore {
    dir: PathBuf,
}

impl FsLetterStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl LetterStore for FsLetterStore {
    async fn save(&self, company: &str, title: &str, text: &str) -> Result<String, LetterError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let mut path = self.dir.join(letter_file_name(company));
        // two letters for one company within the same second
        let mut n = 1;
        while tokio::fs::try_exists(&path).await? {
            n += 1;
            let stem = letter_file_name(company).trim_end_matches(".txt").to_string();
            path = self.dir.join(format!("{stem}-{n}.txt"));
        }

        tokio::fs::write(&path, letter_body(title, text)).await?;
        Ok(path.display().to_string())
    }
}

/// Uploads letters to an S3-compatible bucket (AWS or MinIO).
pub struct S3LetterStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3LetterStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl LetterStore for S3LetterStore {
    async fn save(&self, company: &str, title: &str, text: &str) -> Result<String, LetterError> {
        let key = format!("cover-letters/{}", letter_file_name(company));

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("text/plain; charset=utf-8")
            .body(ByteStream::from(letter_body(title, text).into_bytes()))
            .send()
            .await
            .map_err(|e| LetterError::S3(e.to_string()))?;

        info!("Uploaded cover letter to s3://{}/{}", self.bucket, key);
        Ok(format!("s3://{}/{}", self.bucket, key))
    }
}
