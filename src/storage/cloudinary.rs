//! Cloudinary upload/destroy client. Requests are signed with SHA-256 over
//! the sorted parameter string plus the API secret, per Cloudinary's signed
//! upload protocol (`signature_algorithm=sha256`).

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::StorageConfig;

use super::{ObjectStorage, StorageError, StoredObject};

pub struct CloudinaryStorage {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    pub fn is_configured(config: &StorageConfig) -> bool {
        !config.cloud_name.is_empty()
            && !config.api_key.is_empty()
            && !config.api_secret.is_empty()
    }

    /// Hex SHA-256 of the sorted `key=value` pairs joined with `&`, with the
    /// API secret appended.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
        sorted.sort_by_key(|(k, _)| *k);

        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl ObjectStorage for CloudinaryStorage {
    async fn upload(
        &self,
        folder: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError> {
        let timestamp = Utc::now().timestamp().to_string();
        let public_id = format!("{}-{}", Uuid::new_v4(), sanitize(filename));

        let signature = self.sign(&[
            ("folder", folder),
            ("public_id", &public_id),
            ("signature_algorithm", "sha256"),
            ("timestamp", &timestamp),
        ]);

        let form = reqwest::multipart::Form::new()
            .part("file", reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string()))
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("public_id", public_id)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/auto/upload",
            self.cloud_name
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Upstream(format!(
                "upload failed with {}: {}",
                status, body
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| StorageError::Upstream(e.to_string()))?;

        let secure_url = body
            .get("secure_url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| StorageError::Upstream("upload response missing secure_url".into()))?;
        let key = body
            .get("public_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| StorageError::Upstream("upload response missing public_id".into()))?;

        Ok(StoredObject {
            url: secure_url.to_string(),
            key: key.to_string(),
        })
    }

    async fn destroy(&self, key: &str) -> Result<(), StorageError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("public_id", key),
            ("signature_algorithm", "sha256"),
            ("timestamp", &timestamp),
        ]);

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/destroy",
            self.cloud_name
        );

        let response = self
            .client
            .post(&url)
            .form(&[
                ("public_id", key),
                ("api_key", self.api_key.as_str()),
                ("timestamp", timestamp.as_str()),
                ("signature_algorithm", "sha256"),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StorageError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StorageError::Upstream(format!(
                "destroy failed with {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Keep only characters Cloudinary accepts in a public id segment.
fn sanitize(filename: &str) -> String {
    filename
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CloudinaryStorage {
        CloudinaryStorage {
            client: reqwest::Client::new(),
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
        }
    }

    #[test]
    fn signature_is_deterministic_and_sorted() {
        let c = client();
        let a = c.sign(&[("timestamp", "1"), ("folder", "f")]);
        let b = c.sign(&[("folder", "f"), ("timestamp", "1")]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn sanitize_strips_path_separators() {
        assert_eq!(sanitize("../etc/passwd"), ".._etc_passwd");
        assert_eq!(sanitize("pay slip.pdf"), "pay_slip.pdf");
    }
}
