//! Authentication endpoint: MPIN + TOTP login.

use crate::client::AngelClient;
use crate::error::Result;
use crate::headers::BrokerHeaders;
use crate::outcome::UpstreamOutcome;
use crate::types::auth::{LoginFields, LoginRequest};

impl AngelClient {
    /// Log in with client code, MPIN and a TOTP code.
    ///
    /// On success the outcome's `data` holds the session tokens
    /// (`jwtToken`, `refreshToken`, `feedToken`). The request carries no
    /// bearer token.
    ///
    /// **Endpoint:** `POST /rest/auth/angelbroking/user/v1/loginByMpin`
    pub async fn login_by_mpin(&self, fields: &LoginFields) -> Result<UpstreamOutcome> {
        tracing::info!(
            api_key_len = fields.api_key.len(),
            client_id = %fields.client_id,
            mpin_len = fields.mpin.len(),
            totp_len = fields.totp.len(),
            "loginByMpin attempt"
        );

        let headers = BrokerHeaders::new(&fields.api_key, None);
        self.post_raw(self.login_url(), &headers, &LoginRequest::from(fields))
            .await
    }
}
