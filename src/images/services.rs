use anyhow::Context;
use bytes::Bytes;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::storage::StorageClient;

/// Image attached to a recipe form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub body: Bytes,
    pub content_type: String,
}

pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

/// Object key for a recipe image: namespaced by owner, made unique by the
/// upload time in milliseconds.
pub fn recipe_image_key(owner: Uuid, at: OffsetDateTime, content_type: &str) -> String {
    let millis = at.unix_timestamp_nanos() / 1_000_000;
    let ext = ext_from_mime(content_type).unwrap_or("bin");
    format!("{}/{}.{}", owner, millis, ext)
}

/// Stores the image and returns its public URL.
pub async fn upload_recipe_image(
    storage: &dyn StorageClient,
    owner: Uuid,
    image: ImageUpload,
) -> anyhow::Result<String> {
    let key = recipe_image_key(owner, OffsetDateTime::now_utc(), &image.content_type);
    storage
        .put_object(&key, image.body, &image.content_type)
        .await
        .with_context(|| format!("upload recipe image {}", key))?;
    tracing::debug!(%owner, %key, "recipe image uploaded");
    Ok(storage.public_url(&key))
}
