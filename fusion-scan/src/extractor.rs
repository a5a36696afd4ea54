//! Remote d-scan extraction
//!
//! Turns a scan link found in a message into ship entities. Failures never
//! reach the caller: a scan that cannot be fetched or parsed contributes
//! nothing.

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use fusion_core::{ScanSettings, SystemEntity, Token};

use crate::{create_scan_client, fetch_scan, find_scan_link, ScanError, ScanLink, ScannedShip};

/// Normalizes ship names from scans to canonical ship type names
pub trait ShipTypeResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Extracts additional entities from the tokens of a message
#[async_trait]
pub trait ScanExtractor: Send + Sync {
    async fn extract(&self, tokens: &[Token]) -> Vec<SystemEntity>;
}

/// Extractor that never finds anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoScan;

#[async_trait]
impl ScanExtractor for NoScan {
    async fn extract(&self, _tokens: &[Token]) -> Vec<SystemEntity> {
        Vec::new()
    }
}

/// Case-insensitive resolver over a fixed list of ship type names
#[derive(Debug, Default, Clone)]
pub struct ShipTypeList {
    by_lowercase: HashMap<String, String>,
}

impl ShipTypeList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let by_lowercase = names
            .into_iter()
            .map(|name| {
                let name: String = name.into();
                (name.to_lowercase(), name)
            })
            .collect();
        Self { by_lowercase }
    }

    /// Load one ship type name per line, ignoring blanks and `#` comments
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        ))
    }

    pub fn len(&self) -> usize {
        self.by_lowercase.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_lowercase.is_empty()
    }
}

impl ShipTypeResolver for ShipTypeList {
    fn resolve(&self, name: &str) -> Option<String> {
        self.by_lowercase.get(&name.trim().to_lowercase()).cloned()
    }
}

/// Extracts ships from adashboard and dscan.info links
pub struct RemoteDscanExtractor {
    client: Client,
    settings: ScanSettings,
    resolver: Arc<dyn ShipTypeResolver>,
}

impl RemoteDscanExtractor {
    pub fn new(settings: ScanSettings, resolver: Arc<dyn ShipTypeResolver>) -> Result<Self, ScanError> {
        Ok(Self {
            client: create_scan_client(&settings)?,
            settings,
            resolver,
        })
    }

    /// Fetch a link and resolve its ships, logging and swallowing failures
    pub async fn extract_link(&self, link: &ScanLink) -> Vec<SystemEntity> {
        match fetch_scan(&self.client, link, &self.settings).await {
            Ok(ships) => {
                let entities = self.resolve_ships(ships);
                info!("Extracted {} ship types from {} scan", entities.len(), link.service());
                entities
            }
            Err(e) => {
                warn!("Failed to extract {} scan: {}", link.service(), e);
                Vec::new()
            }
        }
    }

    fn resolve_ships(&self, ships: Vec<ScannedShip>) -> Vec<SystemEntity> {
        ships
            .into_iter()
            .filter_map(|ship| match self.resolver.resolve(&ship.name) {
                Some(name) => Some(SystemEntity::ship(&name, ship.count)),
                None => {
                    debug!("Unknown ship type on scan: {}", ship.name);
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl ScanExtractor for RemoteDscanExtractor {
    async fn extract(&self, tokens: &[Token]) -> Vec<SystemEntity> {
        match find_scan_link(tokens) {
            Some(link) => self.extract_link(&link).await,
            None => Vec::new(),
        }
    }
}
