//! Provider descriptor data structures and helpers shared by all flows.

/// Builder API for assembling provider descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, auth::UserId};

/// Polar Flow authorization endpoint.
pub const POLAR_AUTHORIZATION_ENDPOINT: &str = "https://flow.polar.com/oauth2/authorization";
/// Polar token endpoint.
pub const POLAR_TOKEN_ENDPOINT: &str = "https://polarremote.com/v2/oauth2/token";
/// Polar AccessLink users endpoint (registration and per-user resources).
pub const POLAR_USERS_ENDPOINT: &str = "https://www.polaraccesslink.com/v3/users";

const PHYSICAL_INFORMATION_SEGMENT: &str = "physical-information";

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint the end user is redirected to.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// Users endpoint; registration posts here and per-user resources hang below it.
	pub users: Url,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
}
impl ProviderDescriptor {
	/// Creates a new builder with no endpoints set.
	pub fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new()
	}

	/// Descriptor for the production Polar AccessLink deployment.
	pub fn polar() -> Result<Self, ProviderDescriptorError> {
		Self::builder()
			.authorization_endpoint(parse_endpoint("authorization", POLAR_AUTHORIZATION_ENDPOINT)?)
			.token_endpoint(parse_endpoint("token", POLAR_TOKEN_ENDPOINT)?)
			.users_endpoint(parse_endpoint("users", POLAR_USERS_ENDPOINT)?)
			.build()
	}

	/// Endpoint that registers a member with the provider.
	pub fn registration_url(&self) -> &Url {
		&self.endpoints.users
	}

	/// `<users>/<user_id>/physical-information`, with the user id kept as one opaque segment.
	pub fn physical_information_url(&self, user_id: &UserId) -> Result<Url, ProviderDescriptorError> {
		let mut url = self.endpoints.users.clone();

		url.path_segments_mut()
			.map_err(|_| ProviderDescriptorError::CannotBeABase {
				endpoint: "users",
				url: self.endpoints.users.to_string(),
			})?
			.pop_if_empty()
			.push(user_id.as_str())
			.push(PHYSICAL_INFORMATION_SEGMENT);

		Ok(url)
	}
}
