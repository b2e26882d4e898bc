use crate::client::OutboundClient;
use crate::common;
use crate::config::{BridgeConfig, DEFAULT_DISCOVERY_PATH};
use crate::message::{Code, Transaction};
use crate::resource::{Resource, ResourceTree, longest_prefix};
use crate::sanitize::SanitizePolicy;
use crate::uri::normalize_path;
use async_trait::async_trait;
use log::{debug, error, info};
use std::sync::Arc;

/// Responds to requests for the well-known discovery path. Invoked
/// only when no resource shadows that path in the tree.
#[async_trait]
pub trait DiscoveryHandler: Send + Sync {
    async fn discover(&self, transaction: &mut Transaction);
}

/// Reverse-proxy path: inbound paths are resolved against the local
/// resource tree and replayed against the remote each matched resource
/// is bound to. Backend Created/Deleted results grow and shrink the
/// tree as a side effect.
pub struct ReverseProxy {
    tree: Arc<dyn ResourceTree>,
    client: Arc<dyn OutboundClient>,
    discovery: Arc<dyn DiscoveryHandler>,
    policy: SanitizePolicy,
    discovery_path: String,
}

impl ReverseProxy {
    pub fn new(
        tree: Arc<dyn ResourceTree>,
        client: Arc<dyn OutboundClient>,
        discovery: Arc<dyn DiscoveryHandler>,
    ) -> ReverseProxy {
        ReverseProxy {
            tree,
            client,
            discovery,
            policy: SanitizePolicy::default(),
            discovery_path: DEFAULT_DISCOVERY_PATH.to_string(),
        }
    }

    pub fn with_policy(mut self, policy: SanitizePolicy) -> ReverseProxy {
        self.policy = policy;
        self
    }

    pub fn with_config(mut self, config: &BridgeConfig) -> ReverseProxy {
        self.policy = config.sanitize_policy();
        self.discovery_path = config.discovery_path.clone();
        self
    }

    /// Process one transaction addressed to the proxy's own namespace.
    /// Always leaves the transaction with a complete response.
    pub async fn handle_request(&self, transaction: &mut Transaction) {
        common::prime_response(transaction);
        let path = normalize_path(&transaction.request.options.uri_path());

        if path == self.discovery_path && self.tree.exact_lookup(&path).is_none() {
            debug!("delegating {} to the discovery responder", path);
            self.discovery.discover(transaction).await;
            return;
        }

        // A POST may name a child that does not exist yet; route it to
        // the most specific registered ancestor instead.
        let mut is_new = false;
        let mut lookup = path.clone();
        if transaction.request.code == Code::POST {
            lookup = longest_prefix(&self.tree.prefix_matches(&path))
                .unwrap_or_else(|| "/".to_string());
            is_new = lookup != path;
            if is_new {
                debug!("POST {} routed to mount {}", path, lookup);
            }
        }

        let resource = match self.tree.exact_lookup(&lookup) {
            Some(resource) if lookup != "/" => resource,
            _ => {
                debug!("no resource registered for {}", path);
                transaction.response.code = Code::NOT_FOUND;
                return;
            }
        };

        self.forward(transaction, &path, &lookup, resource, is_new).await;
    }

    async fn forward(
        &self,
        transaction: &mut Transaction,
        path: &str,
        mount: &str,
        resource: Resource,
        is_new: bool,
    ) {
        let outbound = common::build_outbound(
            &transaction.request,
            &self.policy,
            &downstream_path(path, mount, &resource),
            resource.remote.clone(),
        );
        debug!("forwarding {} to {} for {}", transaction.request, resource.remote, mount);

        let Some(response) = self.client.send(&resource.remote, outbound).await else {
            // The client contract promises a response for a matched
            // forward; still terminate the transaction cleanly.
            error!("outbound client yielded no response for {}", resource.remote);
            transaction.response.code = Code::SERVICE_UNAVAILABLE;
            return;
        };
        common::absorb_response(&mut transaction.response, response);

        if transaction.response.code == Code::CREATED {
            self.register_created(transaction, mount, &resource, is_new);
        }
        if transaction.response.code == Code::DELETED {
            info!("backend deleted {}, dropping it from the tree", path);
            self.tree.remove(path);
        }
    }

    /// Rewrite the backend Location into the proxy's namespace and,
    /// when the request minted a genuinely new child, register it.
    fn register_created(
        &self,
        transaction: &mut Transaction,
        mount: &str,
        resource: &Resource,
        is_new: bool,
    ) {
        let Some(location) = transaction.response.options.location_path() else {
            return;
        };
        let rewritten = format!("{}/{}", mount.trim_end_matches('/'), location);
        transaction.response.options.set_location_path(&rewritten);

        if is_new {
            info!("registering virtual resource {} -> {}", rewritten, resource.remote);
            self.tree
                .insert(&rewritten, Resource::virtual_child(resource.remote.clone(), location));
        }
    }
}

/// Path sent downstream: the suffix of the inbound path below the
/// mount point, behind the virtual resource's backend-side path when
/// it has one.
fn downstream_path(path: &str, mount: &str, resource: &Resource) -> String {
    let suffix = path.strip_prefix(mount).unwrap_or(path);
    match &resource.remote_path {
        Some(remote_path) => normalize_path(&format!("{}{}", remote_path, suffix)),
        None => normalize_path(suffix),
    }
}
