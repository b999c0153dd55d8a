//! Market Quote endpoint: LTP snapshot.

use crate::client::AngelClient;
use crate::error::Result;
use crate::headers::BrokerHeaders;
use crate::outcome::UpstreamOutcome;
use crate::types::market_quote::{LtpRequest, QuoteFields};

impl AngelClient {
    /// Retrieve the last traded price of one instrument, authenticated with
    /// the session's JWT.
    ///
    /// **Endpoint:** `POST /rest/secure/angelbroking/order/v1/getLTP`
    pub async fn get_ltp(&self, fields: &QuoteFields) -> Result<UpstreamOutcome> {
        tracing::info!(
            exchange = %fields.exchange,
            tradingsymbol = %fields.tradingsymbol,
            symboltoken = %fields.symboltoken,
            "getLTP attempt"
        );

        let headers = BrokerHeaders::new(&fields.api_key, Some(&fields.jwt_token));
        self.post_raw(self.ltp_url(), &headers, &LtpRequest::from(fields))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::POST;
    use serde_json::json;

    #[tokio::test]
    async fn posts_instrument_with_bearer_token() {
        let server = httpmock::MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rest/secure/angelbroking/order/v1/getLTP")
                    .header("authorization", "Bearer jwt-9")
                    .header("x-privatekey", "key-1")
                    .json_body(json!({
                        "exchange": "NSE",
                        "tradingsymbol": "SBIN-EQ",
                        "symboltoken": "3045"
                    }));
                then.status(200).body(r#"{"status":true,"data":{"ltp":2847.65}}"#);
            })
            .await;

        let client = AngelClient::with_base_url(&server.base_url()).unwrap();
        let fields = QuoteFields {
            api_key: "key-1".into(),
            jwt_token: "jwt-9".into(),
            exchange: "NSE".into(),
            tradingsymbol: "SBIN-EQ".into(),
            symboltoken: "3045".into(),
        };
        let outcome = client.get_ltp(&fields).await.unwrap();

        assert_eq!(
            outcome,
            UpstreamOutcome::Success {
                message: "OK".into(),
                data: json!({"ltp": 2847.65}),
            }
        );
        mock.assert_async().await;
    }
}
