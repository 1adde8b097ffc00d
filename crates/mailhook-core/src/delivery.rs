//! The gateway's [`MessageDelivery`] implementation.

use std::sync::Arc;

use mailhook_smtp::{Address, Error as SmtpError, MessageDelivery, Transaction};

use crate::form::encode;
use crate::forward::Forwarder;
use crate::record::MailRecord;
use crate::route::RouteTable;

/// Routes accepted recipients to callback URLs and turns committed
/// messages into webhook POSTs.
///
/// Commit spawns the forward onto the ambient tokio runtime, so the
/// SMTP session can acknowledge the message without waiting for the
/// callback. Forward failures are logged and otherwise dropped.
#[derive(Clone)]
pub struct WebhookDelivery {
    routes: Arc<RouteTable>,
    forwarder: Arc<Forwarder>,
}

impl WebhookDelivery {
    /// Creates a delivery backed by the given route table and client.
    #[must_use]
    pub fn new(routes: Arc<RouteTable>, forwarder: Arc<Forwarder>) -> Self {
        Self { routes, forwarder }
    }
}

impl MessageDelivery for WebhookDelivery {
    fn validate_recipient(
        &self,
        recipient: &Address,
    ) -> mailhook_smtp::Result<Box<dyn Transaction>> {
        let domain = recipient.domain();
        match self.routes.resolve(domain) {
            Some(url) => {
                tracing::debug!(recipient = recipient.as_str(), url, "recipient accepted");
                Ok(Box::new(WebhookTransaction {
                    url: url.to_string(),
                    lines: Vec::new(),
                    forwarder: Arc::clone(&self.forwarder),
                }))
            }
            None => Err(SmtpError::UnknownRecipient(recipient.as_str().to_string())),
        }
    }
}

/// Accumulates one message destined for one callback URL.
struct WebhookTransaction {
    url: String,
    lines: Vec<String>,
    forwarder: Arc<Forwarder>,
}

impl Transaction for WebhookTransaction {
    fn append_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn commit(self: Box<Self>) {
        let Self {
            url,
            lines,
            forwarder,
        } = *self;

        let raw = lines.join("\n");
        let record = MailRecord::extract(&raw);

        let mut fields = record.fields();
        fields.push(("_url", url.as_str()));
        let encoded = encode(&fields, &record.attachments);
        drop(fields);

        let size = encoded.len();
        tracing::info!(url, size, "forwarding message");

        tokio::spawn(async move {
            if let Err(error) = forwarder.forward(&url, encoded).await {
                tracing::warn!(url, %error, "webhook delivery failed");
            }
        });
    }

    fn abort(self: Box<Self>) {
        tracing::debug!(url = self.url, lines = self.lines.len(), "message discarded");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn delivery(table: RouteTable) -> WebhookDelivery {
        WebhookDelivery::new(Arc::new(table), Arc::new(Forwarder::new().unwrap()))
    }

    #[tokio::test]
    async fn test_routed_recipient_accepted() {
        let mut table = RouteTable::new();
        table.insert("hooks.test", "http://127.0.0.1:1/cb");
        let delivery = delivery(table);

        let recipient = Address::new("user@hooks.test").unwrap();
        assert!(delivery.validate_recipient(&recipient).is_ok());
    }

    #[tokio::test]
    async fn test_unrouted_recipient_rejected() {
        let delivery = delivery(RouteTable::new());

        let recipient = Address::new("user@nowhere.test").unwrap();
        let err = delivery.validate_recipient(&recipient).unwrap_err();
        assert!(matches!(err, SmtpError::UnknownRecipient(ref who) if who == "user@nowhere.test"));
    }

    #[tokio::test]
    async fn test_wildcard_accepts_any_domain() {
        let delivery = delivery(RouteTable::with_wildcard("http://127.0.0.1:1/cb"));

        let recipient = Address::new("anyone@any.test").unwrap();
        assert!(delivery.validate_recipient(&recipient).is_ok());
    }

    #[tokio::test]
    async fn test_commit_never_panics_on_dead_endpoint() {
        // Commit spawns the forward and returns; the failed POST is
        // logged on the spawned task.
        let delivery = delivery(RouteTable::with_wildcard("http://127.0.0.1:1/cb"));
        let mut txn = delivery
            .validate_recipient(&Address::new("user@any.test").unwrap())
            .unwrap();
        txn.append_line("Subject: x");
        txn.append_line("");
        txn.append_line("hello");
        txn.commit();
        tokio::task::yield_now().await;
    }
}
