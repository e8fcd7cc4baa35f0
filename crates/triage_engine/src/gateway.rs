use std::path::Path;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use triage_logging::triage_debug;
use url::Url;

use crate::wire::{
    decode, encode, DefinitionsBody, FailuresBody, ReportBody, SaveReportBody, SavedReportBody,
    SavedReportDetailBody, UploadBody,
};
use crate::{
    FailureKind, FailureRecord, GatewayError, ReportReply, ReportRoute, SavedReport,
    SavedReportDetail, UploadReply, UploadRequest,
};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Small bookkeeping calls: definitions, start, failures, history.
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
    pub fast_report_timeout: Duration,
    /// Generated reports may be produced by a model on the backend.
    pub generated_report_timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(120),
            fast_report_timeout: Duration::from_secs(30),
            generated_report_timeout: Duration::from_secs(120),
        }
    }
}

impl BackendSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        let mut base = Url::parse(&self.base_url)
            .map_err(|err| GatewayError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|err| GatewayError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

/// Request/response contract of the analysis backend.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadReply, GatewayError>;

    async fn submit_definitions(&self, definitions: &[(String, String)])
        -> Result<(), GatewayError>;

    async fn start_analysis(&self) -> Result<(), GatewayError>;

    async fn fetch_report(&self, route: &ReportRoute) -> Result<ReportReply, GatewayError>;

    async fn failures(&self) -> Result<Vec<FailureRecord>, GatewayError>;

    async fn save_viewing_event(&self, analysis_type: &str) -> Result<(), GatewayError>;

    async fn saved_reports(&self) -> Result<Vec<SavedReport>, GatewayError>;

    /// `GET /reports/{id}`; an unknown id is `HttpStatus(404)`.
    async fn saved_report(&self, id: &str) -> Result<SavedReportDetail, GatewayError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestGateway {
    settings: BackendSettings,
    client: reqwest::Client,
}

impl ReqwestGateway {
    pub fn new(settings: BackendSettings) -> Result<Self, GatewayError> {
        // Validate early so a bad base URL fails at startup, not on first use.
        settings.endpoint("")?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| GatewayError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<Vec<u8>, GatewayError> {
        let response = request.timeout(timeout).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(body.to_vec())
    }

    async fn post_json(&self, path: &str, body: Vec<u8>) -> Result<Vec<u8>, GatewayError> {
        let url = self.settings.endpoint(path)?;
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        self.send(request, self.settings.request_timeout).await
    }

    async fn get(&self, url: Url, timeout: Duration) -> Result<Vec<u8>, GatewayError> {
        self.send(self.client.get(url), timeout).await
    }
}

#[async_trait::async_trait]
impl Gateway for ReqwestGateway {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadReply, GatewayError> {
        let url = self.settings.endpoint("upload")?;
        let bytes = tokio::fs::read(&request.path).await.map_err(|err| {
            GatewayError::new(
                FailureKind::LocalFile,
                format!("{}: {err}", request.path.display()),
            )
        })?;
        triage_debug!(
            "Uploading {} ({} bytes)",
            request.path.display(),
            bytes.len()
        );

        let file = Part::bytes(bytes).file_name(upload_file_name(&request.path));
        let mut form = Form::new().part("file", file);
        if let Some(machine_name) = &request.machine_name {
            form = form.text("machine_name", machine_name.clone());
        }

        let body = self
            .send(
                self.client.post(url).multipart(form),
                self.settings.upload_timeout,
            )
            .await?;
        decode::<UploadBody>(&body).map(UploadReply::from)
    }

    async fn submit_definitions(
        &self,
        definitions: &[(String, String)],
    ) -> Result<(), GatewayError> {
        let body = encode(&DefinitionsBody::new(definitions))?;
        self.post_json("settings/acronyms", body).await.map(|_| ())
    }

    async fn start_analysis(&self) -> Result<(), GatewayError> {
        let url = self.settings.endpoint("analysis/start")?;
        self.send(self.client.post(url), self.settings.request_timeout)
            .await
            .map(|_| ())
    }

    async fn fetch_report(&self, route: &ReportRoute) -> Result<ReportReply, GatewayError> {
        let (url, timeout) = match route {
            ReportRoute::Fast => (
                self.settings.endpoint("analysis/fast_failure")?,
                self.settings.fast_report_timeout,
            ),
            ReportRoute::Generated { report_type } => {
                let mut url = self.settings.endpoint("analysis/report")?;
                url.query_pairs_mut().append_pair("type", report_type);
                (url, self.settings.generated_report_timeout)
            }
        };
        let body = self.get(url, timeout).await?;
        decode::<ReportBody>(&body).map(ReportReply::from)
    }

    async fn failures(&self) -> Result<Vec<FailureRecord>, GatewayError> {
        let url = self.settings.endpoint("failures")?;
        let body = self.get(url, self.settings.request_timeout).await?;
        decode::<FailuresBody>(&body).map(FailuresBody::into_records)
    }

    async fn save_viewing_event(&self, analysis_type: &str) -> Result<(), GatewayError> {
        let body = encode(&SaveReportBody { analysis_type })?;
        self.post_json("reports/save", body).await.map(|_| ())
    }

    async fn saved_reports(&self) -> Result<Vec<SavedReport>, GatewayError> {
        let url = self.settings.endpoint("reports")?;
        let body = self.get(url, self.settings.request_timeout).await?;
        let reports = decode::<Vec<SavedReportBody>>(&body)?;
        Ok(reports.into_iter().map(SavedReport::from).collect())
    }

    async fn saved_report(&self, id: &str) -> Result<SavedReportDetail, GatewayError> {
        let mut url = self.settings.endpoint("reports")?;
        url.path_segments_mut()
            .map_err(|()| {
                GatewayError::new(FailureKind::InvalidUrl, "base url cannot carry a path")
            })?
            .push(id);
        let body = self.get(url, self.settings.request_timeout).await?;
        decode::<SavedReportDetailBody>(&body).map(|detail| detail.into_detail(id))
    }
}

fn upload_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.csv".to_string())
}

fn map_reqwest_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        return GatewayError::new(FailureKind::Timeout, err.to_string());
    }
    GatewayError::new(FailureKind::Network, err.to_string())
}
