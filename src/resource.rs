use crate::message::Endpoint;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// A locally-registered resource. Statically-configured mounts bind a
/// subtree of the local namespace to a backend; virtual resources are
/// minted by the reverse path when a backend reports Created and
/// removed again when it reports Deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Backend this resource proxies for.
    pub remote: Endpoint,
    /// Path of the resource on the backend itself, recorded from the
    /// Location a Created response carried. Absent for static mounts,
    /// whose backend paths are just the suffix below the mount point.
    pub remote_path: Option<String>,
    pub visible: bool,
    pub observable: bool,
    pub allow_children: bool,
}

impl Resource {
    /// A statically-configured mount point.
    pub fn mount(remote: Endpoint) -> Resource {
        Resource {
            remote,
            remote_path: None,
            visible: true,
            observable: false,
            allow_children: true,
        }
    }

    /// A proxy-created child, bound to the same remote as its parent
    /// mount. The remote binding is immutable from here on.
    pub fn virtual_child(remote: Endpoint, remote_path: impl Into<String>) -> Resource {
        Resource {
            remote,
            remote_path: Some(remote_path.into()),
            visible: true,
            observable: false,
            allow_children: true,
        }
    }
}

/// Path-keyed store of registered resources. Injected into the reverse
/// path so ordering and concurrency are test-controllable; enumeration
/// order must be deterministic.
pub trait ResourceTree: Send + Sync {
    fn exact_lookup(&self, path: &str) -> Option<Resource>;

    /// Every registered path that is a segment-prefix of `path`, in the
    /// tree's (deterministic) enumeration order.
    fn prefix_matches(&self, path: &str) -> Vec<String>;

    fn insert(&self, path: &str, resource: Resource);

    fn remove(&self, path: &str);
}

/// In-memory reference tree. The ordered map gives lexicographic
/// enumeration; the lock gives concurrent reads with last-writer-wins
/// writes, which is all the forwarding layer asks for.
#[derive(Debug, Default)]
pub struct MemoryTree {
    entries: RwLock<BTreeMap<String, Resource>>,
}

impl MemoryTree {
    pub fn new() -> MemoryTree {
        MemoryTree::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

impl ResourceTree for MemoryTree {
    fn exact_lookup(&self, path: &str) -> Option<Resource> {
        self.entries.read().unwrap().get(path).cloned()
    }

    fn prefix_matches(&self, path: &str) -> Vec<String> {
        self.entries
            .read()
            .unwrap()
            .keys()
            .filter(|p| is_path_prefix(p, path))
            .cloned()
            .collect()
    }

    fn insert(&self, path: &str, resource: Resource) {
        self.entries.write().unwrap().insert(path.to_string(), resource);
    }

    fn remove(&self, path: &str) {
        self.entries.write().unwrap().remove(path);
    }
}

/// Segment-aware prefix test: `/a` covers `/a` and `/a/b`, never `/ab`.
fn is_path_prefix(prefix: &str, path: &str) -> bool {
    if prefix == "/" || prefix == path {
        return true;
    }
    path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

/// Pick the most specific match: longest wins, equal lengths fall back
/// to whichever enumerates first (lexicographically smallest for an
/// ordered tree).
pub fn longest_prefix(matches: &[String]) -> Option<String> {
    let mut best: Option<&String> = None;
    for candidate in matches {
        if best.is_none_or(|b| candidate.len() > b.len()) {
            best = Some(candidate);
        }
    }
    best.cloned()
}
