use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;
use serde::de::DeserializeOwned;

use crate::models::Post;

/// Reads a JSON document fetched by one of the ingestion jobs.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Loads a snapshot of posts (a JSON array) and rejects malformed entries.
pub fn load_posts(path: &Path) -> Result<Vec<Post>> {
    let posts: Vec<Post> = load_json(path)?;
    validate_posts(&posts)?;
    info!("loaded {} posts from {}", posts.len(), path.display());
    Ok(posts)
}

pub fn validate_posts(posts: &[Post]) -> Result<()> {
    let mut keys = HashSet::new();
    for post in posts {
        post.validate()?;
        if !keys.insert(post.key.as_str()) {
            bail!("duplicate post key {}", post.key);
        }
    }
    Ok(())
}
