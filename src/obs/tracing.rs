// self
use crate::{_prelude::*, policy::HttpMethod};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by the request pipeline.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the API suffix, method, and step-up decision.
	pub fn new(api: &str, method: HttpMethod, step_up: bool) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("mtls_auth_client.call", api, method = method.as_str(), step_up);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (api, method, step_up);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}
