use cropdash_core::models::{Artifact, ARTIFACTS};
use cropdash_core::ports::RemoteClient;
use futures::future::join_all;

/// Shown in place of a document that could not be fetched
pub const ARTIFACT_PLACEHOLDER: &str = "Failed to load document.";

/// One report as displayed
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactText {
    pub artifact: Artifact,
    pub content: String,
    /// False when `content` is the placeholder
    pub loaded: bool,
}

/// Best-effort loader for the static training reports
pub struct ArtifactLoader<C> {
    client: C,
}

impl<C: RemoteClient> ArtifactLoader<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Fetch one report, degrading to the placeholder on any failure
    pub async fn load(&self, artifact: Artifact) -> ArtifactText {
        match self.client.fetch_artifact(artifact.file).await {
            Ok(content) => ArtifactText {
                artifact,
                content,
                loaded: true,
            },
            Err(e) => {
                tracing::warn!(file = artifact.file, error = %e, "Artifact unavailable");
                ArtifactText {
                    artifact,
                    content: ARTIFACT_PLACEHOLDER.to_string(),
                    loaded: false,
                }
            }
        }
    }

    /// Fetch every known report concurrently, in display order
    pub async fn load_all(&self) -> Vec<ArtifactText> {
        let texts = join_all(ARTIFACTS.into_iter().map(|artifact| self.load(artifact))).await;
        tracing::debug!(
            loaded = texts.iter().filter(|t| t.loaded).count(),
            total = texts.len(),
            "Artifacts loaded"
        );
        texts
    }
}
