use futures::future;
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    future::Future,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tokio::fs;
use tracing::{debug, error, warn};

use crate::config::{MAX_CONCURRENCY, MIN_CONCURRENCY};
use crate::error::{Error, Result};

/// Some tile servers refuse requests without a browser user agent.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_7_5) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/29.0.1547.76 Safari/537.36";

pub const DEFAULT_ATTEMPTS: u8 = 3;

/// Providers answer failures with an HTML page instead of an image; the
/// marker is looked for in this many leading bytes of the body.
const HTML_SNIFF_LEN: usize = 20;

const ZERO_DURATION: Duration = Duration::from_secs(0);

/// Bytes of one tile, or the reason its slot stayed empty.
pub type TileResult = Result<Vec<u8>>;

/// A tile to fetch and where to cache it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FetchTask {
    pub url: String,
    pub cache_path: Option<PathBuf>,
}

impl FetchTask {
    pub fn new(url: impl Into<String>, cache_path: Option<PathBuf>) -> Self {
        Self {
            url: url.into(),
            cache_path,
        }
    }
}

/// Performs the HTTP GET for a single tile.
///
/// Abstracted so the fetch pipeline can run against a fake server in tests.
pub trait TileClient: Send + Sync + 'static {
    /// Fetches the body at `url`. A transport error or a non-success status
    /// is an `Err`.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// [`TileClient`] backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct ReqwestTileClient {
    client: reqwest::Client,
}

impl ReqwestTileClient {
    /// Creates a client sending the browser user agent, with a per-request
    /// timeout. Pass the zero duration to disable the timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if timeout > ZERO_DURATION {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl TileClient for ReqwestTileClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;

        Ok(body.to_vec())
    }
}

/// Downloads tiles with a fixed pool of workers, using each task's cache path
/// as a read-through/write-through disk cache.
pub struct TileFetcher<C> {
    client: Arc<C>,
    concurrency: usize,
    attempts: u8,
    progress: ProgressBar,
}

impl<C: TileClient> TileFetcher<C> {
    /// Fails with `InvalidArgument` unless `concurrency` is within 1 to 20.
    pub fn new(client: Arc<C>, concurrency: u8) -> Result<Self> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(Error::invalid(format!(
                "concurrency must be between {} and {}, got {}",
                MIN_CONCURRENCY, MAX_CONCURRENCY, concurrency
            )));
        }

        Ok(Self {
            client,
            concurrency: concurrency as usize,
            attempts: DEFAULT_ATTEMPTS,
            progress: ProgressBar::hidden(),
        })
    }

    /// Sets how many times a tile is requested before giving up on it.
    pub fn with_attempts(mut self, attempts: u8) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Draws a progress bar on stderr while fetching.
    pub fn with_progress_bar(mut self) -> Self {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:60.cyan/blue} {pos:>7}/{len:7} ETA: {eta} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        self.progress = pb;
        self
    }

    /// Fetches all tasks and returns one result per task, in task order.
    ///
    /// Task `i` is handled by worker `i % concurrency`; every worker runs to
    /// completion before this returns. A tile that fails all attempts only
    /// marks its own slot with `DownloadFailed`.
    pub async fn fetch(&self, tasks: Vec<FetchTask>) -> Vec<TileResult> {
        let len = tasks.len();
        let tasks = Arc::new(tasks);
        self.progress.set_length(len as u64);

        let workers = (0..self.concurrency.min(len)).map(|worker| {
            let client = Arc::clone(&self.client);
            let tasks = Arc::clone(&tasks);
            let progress = self.progress.clone();
            let (stride, attempts) = (self.concurrency, self.attempts);

            tokio::spawn(async move {
                let mut done = Vec::with_capacity(tasks.len() / stride + 1);
                for (index, task) in tasks.iter().enumerate().skip(worker).step_by(stride) {
                    let res = fetch_tile(client.as_ref(), task, attempts).await;
                    progress.inc(1);
                    done.push((index, res));
                }
                done
            })
        });

        let mut slots: Vec<Option<TileResult>> = (0..len).map(|_| None).collect();
        for joined in future::join_all(workers).await {
            match joined {
                Ok(done) => {
                    for (index, res) in done {
                        slots[index] = Some(res);
                    }
                }
                Err(e) => error!(error = %e, "download worker died"),
            }
        }

        self.progress.finish_and_clear();

        slots
            .into_iter()
            .zip(tasks.iter())
            .map(|(slot, task)| {
                slot.unwrap_or_else(|| {
                    Err(Error::DownloadFailed {
                        url: task.url.clone(),
                    })
                })
            })
            .collect()
    }
}

/// Fetches a single tile, serving it from the cache if present.
async fn fetch_tile<C: TileClient>(client: &C, task: &FetchTask, attempts: u8) -> TileResult {
    let mut cache_path = task.cache_path.as_deref();

    if let Some(path) = cache_path {
        if fs::try_exists(path).await.unwrap_or(false) {
            debug!(path = %path.display(), "tile served from cache");
            return fs::read(path).await.map_err(|e| Error::io(path, e));
        }

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                warn!(
                    path = %parent.display(),
                    error = %e,
                    "failed creating cache directory, tile won't be cached"
                );
                cache_path = None;
            }
        }
    }

    debug!(url = %task.url, "downloading tile");

    for attempt in 1..=attempts {
        match client.get(&task.url).await {
            Ok(body) if looks_like_html(&body) => {
                warn!(url = %task.url, attempt, "server answered with an error page");
            }
            Ok(body) => {
                if let Some(path) = cache_path {
                    write_cache(path, &body).await;
                }

                debug!(url = %task.url, attempt, bytes = body.len(), "downloaded tile");
                return Ok(body);
            }
            Err(e) => {
                warn!(url = %task.url, attempt, error = %e, "tile request failed");
            }
        }
    }

    error!(url = %task.url, attempts, "giving up on tile");
    Err(Error::DownloadFailed {
        url: task.url.clone(),
    })
}

/// Stores a tile through a temporary sibling file so that an interrupted
/// write never leaves a partial tile at `path`.
async fn write_cache(path: &Path, body: &[u8]) {
    let tmp = temp_path(path);

    let res = match fs::write(&tmp, body).await {
        Ok(()) => fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };

    if let Err(e) = res {
        warn!(path = %path.display(), error = %e, "failed caching tile");
        let _ = fs::remove_file(&tmp).await;
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn looks_like_html(body: &[u8]) -> bool {
    let head = &body[..body.len().min(HTML_SNIFF_LEN)];
    String::from_utf8_lossy(head)
        .to_ascii_lowercase()
        .contains("html")
}
