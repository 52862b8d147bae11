use std::time::Duration;

use grounded_search_model::{
    ErrorKind, GenerationProvider, GenerationRequest, GroundedResponse,
    ProbeError, RedirectProbe,
};
use grounded_search_resolver::deadline::instant_after;
use grounded_search_resolver::{HttpProbe, Resolver, ResolverConfig};
use tokio::time::{Instant, timeout_at};
use tracing::Instrument;

use crate::Error;

/// The timeout of a request when the caller supplies no deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

type ProbeFactory<R> = Box<dyn FnOnce(&ResolverConfig) -> Result<R, ProbeError>>;

/// Builder for [`Client`].
pub struct ClientBuilder<P, R = HttpProbe> {
    provider: P,
    request_timeout: Duration,
    redirection: bool,
    resolver_config: ResolverConfig,
    make_probe: ProbeFactory<R>,
}

impl<P: GenerationProvider> ClientBuilder<P> {
    /// Creates a builder with the given provider.
    ///
    /// Unless another probe is set, source URLs are resolved over HTTP
    /// with a default transport.
    pub fn with_provider(provider: P) -> Self {
        Self {
            provider,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            redirection: true,
            resolver_config: ResolverConfig::default(),
            make_probe: Box::new(|config: &ResolverConfig| {
                HttpProbe::new(config.probe_timeout())
            }),
        }
    }
}

impl<P, R> ClientBuilder<P, R>
where
    P: GenerationProvider,
    R: RedirectProbe,
{
    /// Sets the timeout of requests without a caller deadline.
    ///
    /// A zero duration disables the timeout.
    #[inline]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Keeps the source URLs as the provider reported them.
    #[inline]
    pub fn with_no_redirection(mut self) -> Self {
        self.redirection = false;
        self
    }

    /// Sets the configuration of the redirect resolver.
    #[inline]
    pub fn with_resolver_config(mut self, config: ResolverConfig) -> Self {
        self.resolver_config = config;
        self
    }

    /// Sets the probe used to resolve source URLs.
    pub fn with_probe<Q: RedirectProbe>(self, probe: Q) -> ClientBuilder<P, Q> {
        ClientBuilder {
            provider: self.provider,
            request_timeout: self.request_timeout,
            redirection: self.redirection,
            resolver_config: self.resolver_config,
            make_probe: Box::new(move |_: &ResolverConfig| Ok(probe)),
        }
    }

    /// Resolves source URLs over HTTP on top of a caller-configured
    /// transport.
    ///
    /// Proxy, TLS and pool settings of `builder` are kept, while the probe
    /// timeout comes from the resolver configuration.
    pub fn with_probe_client_builder(
        self,
        builder: reqwest::ClientBuilder,
    ) -> ClientBuilder<P, HttpProbe> {
        ClientBuilder {
            provider: self.provider,
            request_timeout: self.request_timeout,
            redirection: self.redirection,
            resolver_config: self.resolver_config,
            make_probe: Box::new(move |config: &ResolverConfig| {
                HttpProbe::with_client_builder(builder, config.probe_timeout())
            }),
        }
    }

    /// Builds the client.
    ///
    /// Fails only when the redirect probe can't be created.
    pub fn build(self) -> Result<Client<P, R>, Error> {
        let resolver = if self.redirection {
            let probe = (self.make_probe)(&self.resolver_config)?;
            Some(Resolver::new(probe, self.resolver_config))
        } else {
            None
        };
        Ok(Client {
            provider: self.provider,
            resolver,
            request_timeout: (!self.request_timeout.is_zero())
                .then_some(self.request_timeout),
        })
    }
}

/// A grounded generation client.
#[derive(Clone, Debug)]
pub struct Client<P, R = HttpProbe> {
    provider: P,
    resolver: Option<Resolver<R>>,
    request_timeout: Option<Duration>,
}

impl<P, R> Client<P, R>
where
    P: GenerationProvider,
    R: RedirectProbe,
{
    /// Sends `query` with the provider's defaults.
    pub async fn generate_grounded_content(
        &self,
        query: &str,
    ) -> Result<GroundedResponse, Error> {
        if query.is_empty() {
            return Err(Error::new(
                "query cannot be empty",
                ErrorKind::InvalidParameter,
            ));
        }
        self.generate(&GenerationRequest::new(query)).await
    }

    /// Sends a request, bounded by the configured request timeout.
    #[inline]
    pub async fn generate(
        &self,
        req: &GenerationRequest,
    ) -> Result<GroundedResponse, Error> {
        self.run(req, None).await
    }

    /// Sends a request that must complete before `deadline`.
    ///
    /// The configured request timeout doesn't apply, and source URLs are
    /// resolved within the same deadline.
    #[inline]
    pub async fn generate_with_deadline(
        &self,
        req: &GenerationRequest,
        deadline: Instant,
    ) -> Result<GroundedResponse, Error> {
        self.run(req, Some(deadline)).await
    }

    async fn run(
        &self,
        req: &GenerationRequest,
        deadline: Option<Instant>,
    ) -> Result<GroundedResponse, Error> {
        if req.prompt.is_empty() {
            return Err(Error::new(
                "prompt cannot be empty",
                ErrorKind::InvalidParameter,
            ));
        }

        let deadline = deadline.or_else(|| {
            self.request_timeout.map(|t| instant_after(Instant::now(), t))
        });
        let generation = self
            .provider
            .generate(req)
            .instrument(debug_span!("generate"));
        let result = match deadline {
            Some(deadline) => timeout_at(deadline, generation)
                .await
                .map_err(|_| {
                    Error::new("request timed out", ErrorKind::Timeout)
                })?,
            None => generation.await,
        };
        let mut resp = result.map_err(Error::from_provider)?;
        debug!(
            "generated {} chars with {} attributions",
            resp.generated_text.len(),
            resp.attributions.len()
        );

        if let Some(resolver) = &self.resolver {
            resolver.resolve_all(deadline, &mut resp.attributions).await;
        }
        Ok(resp)
    }
}
