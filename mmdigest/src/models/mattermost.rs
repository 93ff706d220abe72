use serde::Deserialize;

/// Subset of the post returned by `POST /api/v4/posts`.
#[derive(Debug, Deserialize)]
pub struct MattermostPost {
    pub id: String,
}
