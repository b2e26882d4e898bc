use crate::client::OutboundClient;
use crate::common;
use crate::error::ProxyError;
use crate::message::{Code, MessageType, Transaction};
use crate::sanitize::SanitizePolicy;
use crate::uri::{ResolvedTarget, resolve};
use log::{debug, warn};
use std::sync::Arc;

/// Forward-proxy path: the client names the true origin in a Proxy-Uri
/// option and this proxy performs the round trip on its behalf.
pub struct ForwardProxy {
    client: Arc<dyn OutboundClient>,
    policy: SanitizePolicy,
}

impl ForwardProxy {
    pub fn new(client: Arc<dyn OutboundClient>) -> ForwardProxy {
        ForwardProxy { client, policy: SanitizePolicy::default() }
    }

    pub fn with_policy(mut self, policy: SanitizePolicy) -> ForwardProxy {
        self.policy = policy;
        self
    }

    /// Process one proxied transaction. Always leaves the transaction
    /// with a complete response; client-input failures become a 4.00
    /// Reset without any outbound call.
    pub async fn handle_request(&self, transaction: &mut Transaction) {
        common::prime_response(transaction);
        if let Err(e) = self.process_request(transaction).await {
            warn!("forward proxy rejected request: {}", e);
            transaction.response.code = Code::BAD_REQUEST;
            transaction.response.mtype = MessageType::Reset;
        }
    }

    async fn process_request(&self, transaction: &mut Transaction) -> Result<(), ProxyError> {
        let target = self.extract_target(transaction)?;
        debug!(
            "forwarding {} to {}:{}{}",
            transaction.request, target.host, target.port, target.path
        );

        let outbound = common::build_outbound(
            &transaction.request,
            &self.policy,
            &target.path,
            target.endpoint(),
        );

        // Exactly one round trip; retries are the client's business.
        match self.client.send(&target.endpoint(), outbound).await {
            Some(response) => {
                debug!("backend {} answered {}", target.endpoint(), response);
                common::absorb_response(&mut transaction.response, response);
            }
            None => {
                warn!("no response from {}", target.endpoint());
                transaction.response.code = Code::SERVICE_UNAVAILABLE;
            }
        }
        Ok(())
    }

    fn extract_target(&self, transaction: &Transaction) -> Result<ResolvedTarget, ProxyError> {
        let uri = transaction
            .request
            .options
            .proxy_uri()
            .ok_or(ProxyError::MissingProxyTarget)?;
        resolve(&uri)
    }
}
