use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use uuid::Uuid;

use crate::core::config::Settings;
use crate::db::models::StoredFileRef;

/// Object-store client for instructor files and theory attachments.
/// Disabled (None) when credentials are absent so local development works
/// without a bucket; file endpoints answer 503 in that case.
#[derive(Debug, Clone)]
pub(crate) struct StorageService {
    client: Client,
    bucket: String,
    endpoint: String,
}

impl StorageService {
    pub(crate) async fn from_settings(settings: &Settings) -> anyhow::Result<Option<Self>> {
        if settings.s3().access_key.is_empty() || settings.s3().secret_key.is_empty() {
            return Ok(None);
        }

        let creds = Credentials::new(
            settings.s3().access_key.clone(),
            settings.s3().secret_key.clone(),
            None,
            None,
            "codetrack-files",
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(settings.s3().endpoint.clone())
            .region(aws_config::Region::new(settings.s3().region.clone()))
            .credentials_provider(creds)
            .load()
            .await;

        let client = Client::new(&config);

        Ok(Some(Self {
            client,
            bucket: settings.s3().bucket.clone(),
            endpoint: settings.s3().endpoint.trim_end_matches('/').to_string(),
        }))
    }

    pub(crate) async fn upload_bytes(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> anyhow::Result<StoredFileRef> {
        let public_id = format!("{}_{}", Uuid::new_v4(), sanitize_file_name(file_name));
        let key = object_key(&public_id);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await?;

        let url = format!("{}/{}/{}", self.endpoint, self.bucket, key);

        Ok(StoredFileRef { public_id, file_name: file_name.to_string(), url })
    }

    pub(crate) async fn delete_objects(&self, public_ids: &[String]) -> anyhow::Result<()> {
        for public_id in public_ids {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(object_key(public_id))
                .send()
                .await?;
        }

        Ok(())
    }
}

/// Files with an extension live under raw/, extensionless ids under
/// images/. The same rule runs on upload and delete so keys always line
/// up with the stored public id.
fn object_key(public_id: &str) -> String {
    if public_id.contains('.') {
        format!("raw/{public_id}")
    } else {
        format!("images/{public_id}")
    }
}

fn sanitize_file_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
