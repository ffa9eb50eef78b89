use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder, Response,
    multipart::{Form, Part},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{ContentId, ContentStore, StorageError, UploadFile};

const SPACE_HEADER: &str = "x-space-did";

#[derive(Clone, Debug)]
pub struct StorageSettings {
    /// Base URL of the upload bridge.
    pub endpoint: String,
    /// Named space selected on first use; the bridge default otherwise.
    pub space_name: Option<String>,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl StorageSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            space_name: None,
            token: None,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Space {
    pub did: String,
    #[serde(default)]
    pub name: Option<String>,
}

pub fn select_space<'a>(spaces: &'a [Space], name: &str) -> Option<&'a Space> {
    spaces
        .iter()
        .find(|space| space.name.as_deref() == Some(name))
}

#[derive(Deserialize)]
struct UploadResponse {
    cid: String,
}

/// Client for an HTTP upload bridge in front of the storage network.
#[derive(Clone, Debug)]
pub struct HttpContentStore {
    client: Client,
    endpoint: String,
    token: Option<String>,
    space: Option<Space>,
}

impl HttpContentStore {
    pub async fn connect(settings: StorageSettings) -> Result<Self, StorageError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        let mut store = Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            token: settings.token,
            space: None,
        };

        if let Some(name) = settings.space_name.as_deref() {
            let spaces = store.list_spaces().await?;
            match select_space(&spaces, name) {
                Some(space) => {
                    info!(space = name, did = %space.did, "storage space selected");
                    store.space = Some(space.clone());
                }
                None => warn!(space = name, "storage space not found; using bridge default"),
            }
        }
        Ok(store)
    }

    pub fn space(&self) -> Option<&Space> {
        self.space.as_ref()
    }

    async fn list_spaces(&self) -> Result<Vec<Space>, StorageError> {
        let request = self.client.get(format!("{}/spaces", self.endpoint));
        let response = check_status(self.authorize(request).send().await?).await?;
        Ok(response.json().await?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn upload(&self, file: UploadFile) -> Result<ContentId, StorageError> {
        let size = file.bytes.len();
        let mut part =
            Part::stream_with_length(file.bytes, size as u64).file_name(file.file_name.clone());
        if let Some(mime) = file.content_type.as_deref() {
            part = part.mime_str(mime)?;
        }
        let mut request = self
            .authorize(self.client.post(format!("{}/upload", self.endpoint)))
            .multipart(Form::new().part("file", part));
        if let Some(space) = &self.space {
            request = request.header(SPACE_HEADER, &space.did);
        }

        let response = check_status(request.send().await?).await?;
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|err| StorageError::InvalidResponse(err.to_string()))?;
        let cid = ContentId::parse(body.cid)?;
        info!(file = %file.file_name, size, %cid, "file stored");
        Ok(cid)
    }
}

async fn check_status(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Rejected {
        status: status.as_u16(),
        body,
    })
}
