//! Image-hosting client.
//!
//! Uploaded product images live on an external hosting service; the catalog
//! only stores `{url, public_id}` pairs. The service is reached through the
//! `ImageHost` trait so handlers never talk HTTP directly.

use std::sync::Arc;

use storefront_types::{Result, anyhow};

use crate::entity::product::ProductImage;

#[async_trait::async_trait]
pub trait ImageHost: Send + Sync {
    /// Uploads one image and returns its hosted reference.
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<ProductImage>;

    /// Releases a hosted image. Deleting an unknown id is the host's
    /// concern, not ours.
    async fn delete(&self, public_id: &str) -> Result<()>;
}

pub type DynImageHost = Arc<dyn ImageHost>;

/// Uploads a batch. There is no retry: on the first failure the images
/// already stored are deleted again before the error propagates, so a
/// partial batch never leaks hosted assets.
pub async fn upload_all(
    host: &DynImageHost,
    files: Vec<(String, Vec<u8>)>,
) -> Result<Vec<ProductImage>> {
    let mut uploaded = Vec::with_capacity(files.len());

    for (filename, bytes) in files {
        match host.upload(&filename, bytes).await {
            Ok(image) => uploaded.push(image),
            Err(err) => {
                for image in &uploaded {
                    if let Err(cleanup_err) = host.delete(&image.public_id).await {
                        tracing::warn!(
                            public_id = %image.public_id,
                            "failed to roll back uploaded image: {}",
                            cleanup_err
                        );
                    }
                }
                return Err(err);
            }
        }
    }

    Ok(uploaded)
}

#[derive(Debug, Clone)]
pub struct ImageHostSettings {
    pub base_url: String,
    pub api_key: String,
    /// Folder/namespace on the hosting side
    pub folder: String,
}

/// HTTP implementation against the configured hosting service.
pub struct HttpImageHost {
    settings: ImageHostSettings,
    client: reqwest::Client,
}

impl HttpImageHost {
    pub fn new(settings: ImageHostSettings) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(serde::Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[async_trait::async_trait]
impl ImageHost for HttpImageHost {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<ProductImage> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .text("folder", self.settings.folder.clone())
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/upload", self.settings.base_url))
            .bearer_auth(&self.settings.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "image upload failed with status {}",
                response.status()
            ));
        }

        let body: UploadResponse = response.json().await?;
        Ok(ProductImage {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/images/{}", self.settings.base_url, public_id))
            .bearer_auth(&self.settings.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "image delete failed with status {}",
                response.status()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// In-memory host that can be told to fail on the nth upload.
    struct FlakyHost {
        fail_on: usize,
        uploads: Mutex<usize>,
        deleted: Mutex<Vec<String>>,
    }

    impl FlakyHost {
        fn failing_on(n: usize) -> Self {
            Self {
                fail_on: n,
                uploads: Mutex::new(0),
                deleted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl ImageHost for FlakyHost {
        async fn upload(&self, filename: &str, _bytes: Vec<u8>) -> Result<ProductImage> {
            let mut uploads = self.uploads.lock().unwrap();
            *uploads += 1;
            if *uploads == self.fail_on {
                return Err(anyhow!("host unavailable"));
            }
            Ok(ProductImage {
                url: format!("https://img.example.com/{filename}"),
                public_id: format!("id-{filename}"),
            })
        }

        async fn delete(&self, public_id: &str) -> Result<()> {
            self.deleted.lock().unwrap().push(public_id.to_string());
            Ok(())
        }
    }

    fn batch(names: &[&str]) -> Vec<(String, Vec<u8>)> {
        names
            .iter()
            .map(|n| (n.to_string(), vec![0u8; 4]))
            .collect()
    }

    #[tokio::test]
    async fn full_batch_uploads_in_order() {
        let host: DynImageHost = Arc::new(FlakyHost::failing_on(usize::MAX));

        let images = upload_all(&host, batch(&["a.png", "b.png"])).await.unwrap();

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].public_id, "id-a.png");
        assert_eq!(images[1].public_id, "id-b.png");
    }

    #[tokio::test]
    async fn partial_failure_rolls_back_already_uploaded_images() {
        let flaky = Arc::new(FlakyHost::failing_on(3));
        let host: DynImageHost = flaky.clone();

        let result = upload_all(&host, batch(&["a.png", "b.png", "c.png"])).await;

        assert!(result.is_err());
        let deleted = flaky.deleted.lock().unwrap().clone();
        assert_eq!(deleted, vec!["id-a.png".to_string(), "id-b.png".to_string()]);
    }
}
