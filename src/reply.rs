//! Uniform success/error results handed to the HTTP surface.

// self
use crate::{
	_prelude::*,
	flows::{AuthorizationOutcome, PhysicalInfo},
};

/// What a route answers with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
	/// `302 Found` to the given location.
	Redirect(Url),
	/// Plain-text body with a status code.
	Text {
		/// HTTP status code.
		status: u16,
		/// Response body.
		body: String,
	},
}
impl Reply {
	/// 302 status used for redirects.
	pub const REDIRECT_STATUS: u16 = 302;

	/// `Success! User <id> registered. Access Token: <token>`.
	pub fn authorized(outcome: &AuthorizationOutcome) -> Self {
		Self::ok(format!(
			"Success! User {} registered. Access Token: {}",
			outcome.user_id,
			outcome.access_token.expose()
		))
	}

	/// `Physical Info for user <id>: <raw json>`.
	pub fn physical_info(info: &PhysicalInfo) -> Self {
		Self::ok(format!("Physical Info for user {}: {}", info.user_id, info.as_json()))
	}

	/// Maps an error onto its status code and message.
	///
	/// Missing input and missing tokens are reported verbatim; every other failure is prefixed
	/// with `Error: `.
	pub fn failure(err: &Error) -> Self {
		let body = match err {
			Error::MissingInput { .. } | Error::NotAuthorized { .. } => err.to_string(),
			_ => format!("Error: {err}"),
		};

		Self::Text { status: err.status_code(), body }
	}

	/// Builds the success reply with `on_ok`, or the failure reply.
	pub fn from_result<T>(result: Result<T>, on_ok: impl FnOnce(&T) -> Self) -> Self {
		match result {
			Ok(value) => on_ok(&value),
			Err(e) => Self::failure(&e),
		}
	}

	/// HTTP status code of the reply.
	pub fn status(&self) -> u16 {
		match self {
			Self::Redirect(_) => Self::REDIRECT_STATUS,
			Self::Text { status, .. } => *status,
		}
	}

	fn ok(body: String) -> Self {
		Self::Text { status: 200, body }
	}
}
