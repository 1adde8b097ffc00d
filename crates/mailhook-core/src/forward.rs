//! Posting encoded forms to callback URLs.

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::redirect::Policy;

use crate::error::{Error, Result};
use crate::form::EncodedForm;

/// HTTP client wrapper that POSTs encoded forms to callbacks.
///
/// Redirects are never followed: a 3xx answer counts as accepted and
/// the redirect target is ignored.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    /// Builds the underlying HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()?;
        Ok(Self { client })
    }

    /// POSTs the form to `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the endpoint
    /// answers outside the 2xx/3xx classes.
    pub async fn forward(&self, url: &str, form: EncodedForm) -> Result<()> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, &form.content_type)
            .header(CONTENT_LENGTH, form.body.len())
            .body(form.body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status.is_redirection() {
            Ok(())
        } else {
            Err(Error::UnexpectedStatus(status.as_u16()))
        }
    }
}
