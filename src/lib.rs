//! Mutually-authenticated client for step-up protected auth servers. Typed token, revocation,
//! audit, and provider-access calls are funneled through one normalized request pipeline.
//!
//! Every typed operation on [`client::AuthClient`] shapes a request descriptor and hands it to
//! [`client::AuthClient::call`], which classifies the endpoint against the injected
//! [`policy::SecuredEndpoints`] table, attaches the step-up headers when required, dispatches
//! over the configured [`http::AuthTransport`], and normalizes the outcome into a
//! [`client::NormalizedResponse`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod client;
pub mod error;
pub mod http;
pub mod obs;
pub mod policy;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, BTreeSet},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, temp_env as _, tracing_subscriber as _};
