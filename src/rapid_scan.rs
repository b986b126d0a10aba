//! Rapid scans: chunked BDIO upload followed by result polling.
//!
//! A rapid scan runs in three steps:
//!
//! 1. [`HubClient::start_rapid_scan`] posts the BDIO header document and
//!    receives the upload endpoint in `Location`.
//! 2. [`HubClient::upload_bdio_chunks`] PUTs each chunk with
//!    `X-BD-MODE: append` and `X-BD-DOCUMENT-COUNT: n`, then PUTs an empty
//!    body with `X-BD-MODE: finish`.
//! 3. [`HubClient::poll_rapid_scan_results`] polls `<endpoint>/full-result`
//!    until the server has results, then drains the remaining pages.
//!
//! The mode headers are passed per call and never stored on the client, so
//! concurrent scans on clones of one client do not interfere.

use std::future::Future;
use std::time::Duration;

use reqwest::header::HeaderMap;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::client::{header_pair, HubClient};
use crate::error::{HubError, Result, ResultExt};
use crate::mime::{RAPID_SCAN_REQUEST, RAPID_SCAN_RESULTS};
use crate::models::RapidScanResult;
use crate::pagination::ListOptions;

/// Path that rapid scans are started at.
pub const DEVELOPER_SCANS_PATH: &str = "/api/developer-scans";
/// Suffix of the results resource under an upload endpoint.
pub const FULL_RESULT_PATH: &str = "/full-result";

/// Upload mode header: `append` while sending chunks, `finish` at the end.
pub const MODE_HEADER: &str = "X-BD-MODE";
/// Number of chunks in the upload.
pub const DOCUMENT_COUNT_HEADER: &str = "X-BD-DOCUMENT-COUNT";

const MODE_APPEND: &str = "append";
const MODE_FINISH: &str = "finish";

/// Timing of the result poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before the first attempt and between attempts.
    pub interval: Duration,
    /// Give up after this long.
    pub timeout: Duration,
    /// Items per result page.
    pub page_limit: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(300),
            page_limit: crate::pagination::DEFAULT_LIMIT,
        }
    }
}

impl PollConfig {
    #[must_use]
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(HubError::RequestConstruction(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if self.page_limit == 0 {
            return Err(HubError::RequestConstruction(
                "result page limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl HubClient {
    /// Start a rapid scan with the BDIO header document.
    ///
    /// Returns the upload endpoint for [`upload_bdio_chunks`](Self::upload_bdio_chunks).
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers 201 with a `Location`.
    #[tracing::instrument(skip(self, header))]
    pub async fn start_rapid_scan(&self, header: &str) -> Result<String> {
        let location = self
            .post_string(
                &self.api_url(DEVELOPER_SCANS_PATH),
                header.to_string(),
                RAPID_SCAN_REQUEST,
                201,
            )
            .await
            .context("error kicking off a rapid scan")?;
        location.ok_or_else(|| HubError::MissingHeader("Location".to_string()))
    }

    /// Upload the BDIO chunks in order, then mark the upload finished.
    ///
    /// Stops at the first chunk the server does not accept with 202; later
    /// chunks and the finish request are not sent.
    ///
    /// # Errors
    ///
    /// Returns the first failed upload, annotated with its position.
    #[tracing::instrument(skip(self, chunks), fields(count = chunks.len()))]
    pub async fn upload_bdio_chunks<S>(&self, endpoint: &str, chunks: &[S]) -> Result<()>
    where
        S: AsRef<str> + Sync,
    {
        let count = chunks.len();
        let mut extra = HeaderMap::new();
        let (mode, append) = header_pair(MODE_HEADER, MODE_APPEND)?;
        let (count_name, count_value) = header_pair(DOCUMENT_COUNT_HEADER, &count.to_string())?;
        extra.insert(mode.clone(), append);
        extra.insert(count_name, count_value);

        for (i, chunk) in chunks.iter().enumerate() {
            self.put_string(endpoint, chunk.as_ref().to_string(), RAPID_SCAN_REQUEST, 202, &extra)
                .await
                .with_context(|| format!("error uploading bdio chunk {} of {count}", i + 1))?;
            tracing::trace!(chunk = i + 1, count, "uploaded bdio chunk");
        }

        let (_, finish) = header_pair(MODE_HEADER, MODE_FINISH)?;
        extra.insert(mode, finish);
        self.put_string(endpoint, String::new(), RAPID_SCAN_REQUEST, 202, &extra)
            .await
            .context("error finishing bdio upload")
    }

    /// Poll for the results of a rapid scan.
    ///
    /// The first attempt is made one `interval` after the call; attempts
    /// that get a non-200 status or an empty body are retried on the next
    /// tick. Once results arrive, every remaining page is fetched and
    /// appended to the first.
    ///
    /// # Errors
    ///
    /// - [`HubError::RequestConstruction`] for a zero interval or page limit.
    /// - [`HubError::PollTimeout`] if no results arrive within `timeout`.
    /// - [`HubError::PollCancelled`] if `cancel` fires first.
    /// - A 401 or 403 from any attempt, without waiting for the timeout.
    /// - Any transport or decode error from an attempt or a later page.
    #[tracing::instrument(skip(self, config, cancel))]
    pub async fn poll_rapid_scan_results(
        &self,
        endpoint: &str,
        config: &PollConfig,
        cancel: &CancellationToken,
    ) -> Result<RapidScanResult> {
        config.validate()?;

        let results_url = format!("{}{FULL_RESULT_PATH}", endpoint.trim_end_matches('/'));
        let options = ListOptions::default()
            .with_limit(config.page_limit)
            .with_offset(0);

        let first = {
            let results_url = results_url.as_str();
            let options = &options;
            poll_until_ready(endpoint, config, cancel, move || self.poll_once(results_url, options)).await?
        };

        self.drain_result_pages(&results_url, options, first, cancel, endpoint)
            .await
    }

    /// Start a rapid scan, upload the chunks and wait for the results.
    ///
    /// # Errors
    ///
    /// Returns the first error from any step.
    pub async fn rapid_scan<S>(
        &self,
        header: &str,
        chunks: &[S],
        config: &PollConfig,
        cancel: &CancellationToken,
    ) -> Result<RapidScanResult>
    where
        S: AsRef<str> + Sync,
    {
        let endpoint = self.start_rapid_scan(header).await?;
        self.upload_bdio_chunks(&endpoint, chunks).await?;
        self.poll_rapid_scan_results(&endpoint, config, cancel).await
    }

    /// One poll attempt; `None` means the results are not ready yet.
    async fn poll_once(&self, results_url: &str, options: &ListOptions) -> Result<Option<RapidScanResult>> {
        let page_url = self.page_url(results_url, options)?;
        let body = match self
            .get_string(&page_url, &[200], Some(RAPID_SCAN_RESULTS))
            .await
        {
            Ok((_, body)) => body,
            Err(e) if e.is_unauthorized() => return Err(e.context("error reading rapid scan result")),
            Err(e) if matches!(e.root(), HubError::UnexpectedStatus { .. }) => return Ok(None),
            Err(e) => return Err(e.context("error reading rapid scan result")),
        };

        if body.trim().is_empty() {
            return Ok(None);
        }

        let result: RapidScanResult =
            serde_json::from_str(&body).context("error parsing rapid scan result")?;
        Ok(Some(result))
    }

    async fn drain_result_pages(
        &self,
        results_url: &str,
        mut options: ListOptions,
        mut result: RapidScanResult,
        cancel: &CancellationToken,
        endpoint: &str,
    ) -> Result<RapidScanResult> {
        while (result.items.len() as u64) < result.total_count {
            if cancel.is_cancelled() {
                return Err(poll_cancelled(endpoint));
            }

            options.next_page();
            let page: RapidScanResult = self
                .get_page(results_url, &options)
                .await
                .context("error reading rapid scan result page")?;
            if page.is_empty() {
                break;
            }
            result.items.extend(page.items);
        }

        tracing::debug!(
            items = result.items.len(),
            total = result.total_count,
            "rapid scan results complete"
        );
        Ok(result)
    }
}

/// Call `attempt` once per `interval`, starting one interval from now, until
/// it yields a value. Cancellation and the deadline are checked both while
/// waiting for a tick and while an attempt is in flight.
async fn poll_until_ready<T, F, Fut>(
    endpoint: &str,
    config: &PollConfig,
    cancel: &CancellationToken,
    mut attempt: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = tokio::time::sleep(config.timeout);
    tokio::pin!(deadline);

    let mut ticker = tokio::time::interval_at(Instant::now() + config.interval, config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut attempts = 0u32;
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(poll_cancelled(endpoint)),
            () = &mut deadline => return Err(poll_timed_out(endpoint, config, attempts)),
            _ = ticker.tick() => {}
        }

        attempts += 1;
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(poll_cancelled(endpoint)),
            () = &mut deadline => return Err(poll_timed_out(endpoint, config, attempts)),
            outcome = attempt() => outcome?,
        };

        match outcome {
            Some(value) => return Ok(value),
            None => tracing::debug!(attempt = attempts, "rapid scan results not ready"),
        }
    }
}

fn poll_timed_out(endpoint: &str, config: &PollConfig, attempts: u32) -> HubError {
    tracing::warn!(endpoint, attempts, "rapid scan poll timed out");
    HubError::PollTimeout {
        endpoint: endpoint.to_string(),
        timeout: config.timeout,
    }
}

fn poll_cancelled(endpoint: &str) -> HubError {
    tracing::debug!(endpoint, "rapid scan poll cancelled");
    HubError::PollCancelled {
        endpoint: endpoint.to_string(),
    }
}
