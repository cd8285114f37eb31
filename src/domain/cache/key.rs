//! Cache key derivation

use std::fmt;

use crate::domain::record::{sha256_hex, FilterSpec, PageRequest, RecordId};

const SIGNATURE_LEN: usize = 32;

/// Narrows a key to one identifier, alias or page inside a scope
#[derive(Debug, Clone, PartialEq)]
pub enum Discriminator {
    Id(RecordId),
    /// A set of identifiers; order and duplicates do not change the key
    Ids(Vec<RecordId>),
    /// An alias, already hashed by the record service
    Alias(String),
    Page(PageRequest),
    PageMeta(PageRequest),
    /// Marker written once a scope has been initialized
    Populated,
}

impl Discriminator {
    fn postfix(&self) -> String {
        match self {
            Self::Id(RecordId::Int(n)) => format!("_id_{}", n),
            Self::Id(RecordId::Text(s)) => format!("_id_s{}", short_hash(s)),
            Self::Ids(ids) => {
                let mut sorted = ids.clone();
                sorted.sort();
                sorted.dedup();

                let joined = sorted
                    .iter()
                    .map(id_token)
                    .collect::<Vec<_>>()
                    .join(",");

                format!("_ids_{}", short_hash(&joined))
            }
            Self::Alias(hashed) => format!("_alias_{}", hashed),
            Self::Page(page) => format!("_page_{}_{}", page.number, page.size),
            Self::PageMeta(page) => format!("_pagemeta_{}_{}", page.number, page.size),
            Self::Populated => "_populated".to_string(),
        }
    }
}

/// Integers render bare, text renders as a JSON string literal
fn id_token(id: &RecordId) -> String {
    match id {
        RecordId::Int(n) => n.to_string(),
        RecordId::Text(s) => serde_json::Value::String(s.clone()).to_string(),
    }
}

fn short_hash(value: &str) -> String {
    sha256_hex(value)[..SIGNATURE_LEN].to_string()
}

/// Builds cache keys for one scope
///
/// Keys look like `<namespace><store>[<discriminator>]:<signature>`, where
/// the signature is a SHA-256 prefix of the canonical filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKeyBuilder {
    namespace: String,
    store: String,
}

impl CacheKeyBuilder {
    pub fn new(namespace: impl Into<String>, store: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            store: store.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn store(&self) -> &str {
        &self.store
    }

    /// Namespace and store prefix shared by every key of the scope
    pub fn prefix(&self) -> String {
        format!("{}{}", self.namespace, self.store)
    }

    /// Scope holding the alias index of this scope
    pub fn alias_scope(&self) -> Self {
        Self {
            namespace: self.namespace.clone(),
            store: format!("alias_{}", self.store),
        }
    }

    pub fn build(&self, discriminator: Option<&Discriminator>, filter: &FilterSpec) -> String {
        let postfix = discriminator.map(Discriminator::postfix).unwrap_or_default();

        format!(
            "{}{}:{}",
            self.prefix(),
            postfix,
            Self::signature(filter)
        )
    }

    pub fn populated_key(&self) -> String {
        self.build(Some(&Discriminator::Populated), &FilterSpec::new())
    }

    /// Stable signature of a filter
    pub fn signature(filter: &FilterSpec) -> String {
        short_hash(&filter.canonical())
    }
}

impl fmt::Display for CacheKeyBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}
