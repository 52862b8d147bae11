use std::time::Duration;

use grounded_search_model::{ProbeError, RedirectProbe};
use reqwest::header::{self, HeaderMap};
use reqwest::{Client, ClientBuilder, StatusCode, Url, redirect};

/// A [`RedirectProbe`] that sends a single `HEAD` request per URL.
///
/// The underlying client never follows redirects and applies a fixed
/// timeout to every probe. Cloning the probe is cheap and clones share
/// their connection pool.
#[derive(Clone, Debug)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// Creates a probe with a default transport.
    #[inline]
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        Self::with_client_builder(Client::builder(), timeout)
    }

    /// Creates a probe on top of a caller-configured transport.
    ///
    /// Proxy, TLS and pool settings of `builder` are kept as they are,
    /// while its redirect policy and timeout are overridden.
    pub fn with_client_builder(
        builder: ClientBuilder,
        timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let client = builder
            .redirect(redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|err| {
                ProbeError::transport()
                    .with_reason(format!("failed to build probe client: {err}"))
            })?;
        Ok(Self { client })
    }
}

impl RedirectProbe for HttpProbe {
    fn probe(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<String, ProbeError>> + Send + 'static
    {
        let url = url.to_owned();
        let resp_fut = self.client.head(&url).send();

        async move {
            let resp = match resp_fut.await {
                Ok(resp) => resp,
                Err(err) if err.is_timeout() => {
                    return Err(ProbeError::timeout().with_reason(format!("{err}")));
                }
                Err(err) => {
                    return Err(ProbeError::transport().with_reason(format!("{err}")));
                }
            };
            Ok(redirect_target(url, resp.status(), resp.headers()))
        }
    }
}

/// Picks the URL a response points to.
///
/// Only the first hop is examined. An absolute `Location` is returned
/// verbatim. A relative one is joined against the probed URL, so the
/// result differs from the literal header value. A redirect without a
/// `Location`, or with one that can't be joined, resolves to the probed
/// URL itself.
fn redirect_target(url: String, status: StatusCode, headers: &HeaderMap) -> String {
    if !status.is_redirection() {
        return url;
    }

    let Some(location) = headers
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
    else {
        debug!("{status} without a location header: {url}");
        return url;
    };

    if Url::parse(location).is_ok() {
        return location.to_owned();
    }
    // Relative locations are resolved against the probed URL.
    match Url::parse(&url).and_then(|base| base.join(location)) {
        Ok(joined) => joined.into(),
        Err(err) => {
            debug!("unusable location {location:?} from {url}: {err}");
            url
        }
    }
}
