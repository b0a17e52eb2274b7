//! Bridge-level error types shared across flows, providers, and stores.

// self
use crate::{_prelude::*, auth::UserId};

/// Bridge-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical bridge error exposed by public APIs.
///
/// Every variant maps onto exactly one [`FaultClass`]; see [`Error::fault_class`].
#[derive(Debug, ThisError)]
pub enum Error {
	/// The key-value medium could not be reached or rejected the command.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// The provider redirected back with an OAuth `error` parameter.
	#[error("{error}")]
	ProviderRejected {
		/// Raw `error` value supplied by the provider.
		error: String,
	},
	/// A required request parameter was absent or empty.
	#[error("{message}")]
	MissingInput {
		/// Name of the missing parameter.
		parameter: &'static str,
		/// Human-readable explanation returned to the caller.
		message: &'static str,
	},
	/// Token endpoint answered successfully but omitted `x_user_id`.
	#[error("No x_user_id in token response")]
	MissingIdentity,
	/// Authorization code exchange failed.
	#[error("Token exchange failed: {0}")]
	Exchange(#[source] UpstreamError),
	/// Member registration failed with something other than a conflict.
	#[error("User registration failed: {0}")]
	Registration(#[source] UpstreamError),
	/// Physical information request failed.
	#[error("Physical info fetch failed: {0}")]
	Fetch(#[source] UpstreamError),
	/// No access token is stored for the requested user.
	#[error("No access token found for user {user_id}")]
	NotAuthorized {
		/// User whose token lookup came back empty.
		user_id: UserId,
	},
}
impl Error {
	/// Missing `code` query parameter on the authorization callback.
	pub const fn missing_code() -> Self {
		Self::MissingInput { parameter: "code", message: "No authorization code received" }
	}

	/// Missing `userId` query parameter on the physical information request.
	pub const fn missing_user_id() -> Self {
		Self::MissingInput {
			parameter: "userId",
			message: "User ID is required (e.g., /user/physical-info?userId=123)",
		}
	}

	/// Classifies the error as caller-caused or downstream-caused.
	pub fn fault_class(&self) -> FaultClass {
		match self {
			Self::ProviderRejected { .. } | Self::MissingInput { .. } | Self::NotAuthorized { .. } =>
				FaultClass::Client,
			Self::Storage(_)
			| Self::Config(_)
			| Self::MissingIdentity
			| Self::Exchange(_)
			| Self::Registration(_)
			| Self::Fetch(_) => FaultClass::Server,
		}
	}

	/// HTTP status code that represents this error to callers.
	pub fn status_code(&self) -> u16 {
		self.fault_class().status_code()
	}

	/// Upstream failure details, when the error came from a provider call.
	pub fn upstream(&self) -> Option<&UpstreamError> {
		match self {
			Self::Exchange(upstream) | Self::Registration(upstream) | Self::Fetch(upstream) =>
				Some(upstream),
			_ => None,
		}
	}
}

/// Response class an [`Error`] maps onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultClass {
	/// Malformed or missing input, or the provider refused the authorization.
	Client,
	/// A downstream dependency failed.
	Server,
}
impl FaultClass {
	/// HTTP status code used for the class.
	pub const fn status_code(self) -> u16 {
		match self {
			FaultClass::Client => 400,
			FaultClass::Server => 500,
		}
	}
}

/// Failure of a single provider call, carrying enough detail to diagnose it.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Provider answered with a non-success status.
	#[error("{status} - {body}")]
	Status {
		/// HTTP status code returned by the provider.
		status: u16,
		/// Raw response body (lossy UTF-8).
		body: String,
	},
	/// Provider answered successfully but the body could not be decoded.
	#[error("{status} - response body could not be decoded: {source}")]
	Decode {
		/// HTTP status code returned by the provider.
		status: u16,
		/// Parsing failure, with the failing path when one is known.
		#[source]
		source: BoxError,
	},
	/// Request never produced a response.
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl UpstreamError {
	/// HTTP status code returned by the provider, if a response was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } | Self::Decode { status, .. } => Some(*status),
			Self::Transport(_) => None,
		}
	}
}

/// Configuration and validation failures raised while wiring the bridge.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Client identifier is empty.
	#[error("Client identifier cannot be empty.")]
	EmptyClientId,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, request construction).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure (including timeouts).
	#[error("Network error occurred while calling the provider: {source}")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// HTTP request could not be constructed.
	#[error("HTTP request could not be constructed: {0}")]
	Request(#[from] oauth2::http::Error),
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider: {0}")]
	Io(#[from] std::io::Error),
	/// Transport failure reported only as a message.
	#[error("HTTP client error occurred while calling the provider: {message}")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Returns `true` when the transport gave up waiting for the provider.
	#[cfg(feature = "reqwest")]
	pub fn is_timeout(&self) -> bool {
		match self {
			Self::Network { source } =>
				source.downcast_ref::<ReqwestError>().is_some_and(ReqwestError::is_timeout),
			_ => false,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
