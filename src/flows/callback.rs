//! Authorization callback: exchange the code, store the token, register the user.
//!
//! The callback runs strictly in order:
//!
//! ```text
//! ReceivedCallback -> Exchanged -> Stored -> Registered -> Done
//!        |               |          |
//!  ExchangeFailed   StoreFailed  RegisterFailed
//! ```
//!
//! Each step is attempted once. A failed registration leaves the stored token in place; the next
//! successful callback for the same user overwrites it.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, TokenGrant, UserId},
	flows::{Bridge, RegistrationOutcome},
	http::ProviderHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::TokenKey,
};

/// Query parameters the provider redirects back with.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CallbackParams {
	/// One-time authorization code.
	pub code: Option<String>,
	/// OAuth error reported by the provider instead of a code.
	pub error: Option<String>,
	/// Opaque state echoed back from the authorization request.
	pub state: Option<String>,
}
impl CallbackParams {
	/// Parameters carrying only an authorization code.
	pub fn with_code(code: impl Into<String>) -> Self {
		Self { code: Some(code.into()), ..Default::default() }
	}
}

/// Result of a completed callback.
#[derive(Clone, Debug)]
pub struct AuthorizationOutcome {
	/// User the token was issued to.
	pub user_id: UserId,
	/// Issued access token, now persisted in the store.
	pub access_token: AccessToken,
	/// Lifetime the token was stored with.
	pub expires_in: Option<Duration>,
	/// Whether the user was newly registered or already known.
	pub registration: RegistrationOutcome,
	/// State echoed by the provider, unvalidated.
	pub state: Option<String>,
}

/// Stages of the authorization callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallbackStage {
	/// Callback accepted with a code.
	ReceivedCallback,
	/// Code exchanged for a token.
	Exchanged,
	/// Token persisted.
	Stored,
	/// User registered (or already known).
	Registered,
	/// Flow finished successfully.
	Done,
	/// Code exchange failed or returned no identity.
	ExchangeFailed,
	/// Token could not be persisted.
	StoreFailed,
	/// Registration failed.
	RegisterFailed,
}
impl CallbackStage {
	/// Returns a stable label suitable for span or log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::ReceivedCallback => "received_callback",
			Self::Exchanged => "exchanged",
			Self::Stored => "stored",
			Self::Registered => "registered",
			Self::Done => "done",
			Self::ExchangeFailed => "exchange_failed",
			Self::StoreFailed => "store_failed",
			Self::RegisterFailed => "register_failed",
		}
	}

	/// Next stage on success; terminal stages stay put.
	pub const fn next(self) -> Self {
		match self {
			Self::ReceivedCallback => Self::Exchanged,
			Self::Exchanged => Self::Stored,
			Self::Stored => Self::Registered,
			Self::Registered | Self::Done => Self::Done,
			Self::ExchangeFailed | Self::StoreFailed | Self::RegisterFailed => self,
		}
	}

	/// Error exit taken when the step leaving this stage fails.
	pub const fn failure(self) -> Self {
		match self {
			Self::ReceivedCallback => Self::ExchangeFailed,
			Self::Exchanged => Self::StoreFailed,
			Self::Stored => Self::RegisterFailed,
			_ => self,
		}
	}

	/// Returns `true` once no further transition is possible.
	pub const fn is_terminal(self) -> bool {
		matches!(self, Self::Done | Self::ExchangeFailed | Self::StoreFailed | Self::RegisterFailed)
	}
}
impl Display for CallbackStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Tracks the current stage and reports every transition on the flow span.
struct StageCursor<'a> {
	span: &'a FlowSpan,
	stage: CallbackStage,
}
impl<'a> StageCursor<'a> {
	fn new(span: &'a FlowSpan) -> Self {
		Self { span, stage: CallbackStage::ReceivedCallback }
	}

	fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
		let to = if result.is_ok() { self.stage.next() } else { self.stage.failure() };

		self.span.transition(self.stage.as_str(), to.as_str());
		self.stage = to;

		result
	}
}

impl<C> Bridge<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Handles the provider's redirect back to the application.
	///
	/// A provider `error` wins over everything else and yields [`Error::ProviderRejected`]; a
	/// missing or empty `code` yields the missing-code [`Error::MissingInput`]. Otherwise the
	/// code is exchanged, the token stored under `polar_access_token:<user_id>` with the
	/// provider's `expires_in` as TTL, and the user registered. Nothing is retried and the stored
	/// token is not removed when registration fails.
	pub async fn complete_authorization(
		&self,
		params: CallbackParams,
	) -> Result<AuthorizationOutcome> {
		const KIND: FlowKind = FlowKind::AuthorizationCallback;

		let span = FlowSpan::new(KIND, "complete_authorization");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.run_callback(&span, params)).await;

		obs::record_flow_result(KIND, &result);

		result
	}

	async fn run_callback(
		&self,
		span: &FlowSpan,
		params: CallbackParams,
	) -> Result<AuthorizationOutcome> {
		let CallbackParams { code, error, state } = params;

		if let Some(error) = error.filter(|error| !error.is_empty()) {
			return Err(Error::ProviderRejected { error });
		}

		let code = code.filter(|code| !code.is_empty()).ok_or_else(Error::missing_code)?;
		let mut cursor = StageCursor::new(span);
		let grant = cursor.settle(self.exchanger().exchange_code(&code).await)?;
		let TokenGrant { access_token, user_id, expires_in } = grant;

		span.record_user(&user_id);

		cursor.settle(
			self.store
				.set(&TokenKey::for_user(&user_id), access_token.expose(), expires_in)
				.await
				.map_err(Error::from),
		)?;

		let registration =
			cursor.settle(self.registrar().register(&access_token, &user_id).await)?;

		cursor.settle(Ok(()))?;

		Ok(AuthorizationOutcome { user_id, access_token, expires_in, registration, state })
	}
}
