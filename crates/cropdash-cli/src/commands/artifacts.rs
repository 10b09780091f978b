//! Artifacts command implementation

use super::CommandContext;
use crate::output_types::ArtifactOutput;
use anyhow::Result;
use cropdash_orchestration::ArtifactLoader;

pub async fn execute(ctx: &CommandContext) -> Result<()> {
    let texts = ArtifactLoader::new(ctx.client.clone()).load_all().await;

    if ctx.output.is_json() {
        let outputs: Vec<ArtifactOutput> = texts
            .into_iter()
            .map(|t| ArtifactOutput {
                title: t.artifact.title.to_string(),
                file: t.artifact.file.to_string(),
                loaded: t.loaded,
                content: t.content,
            })
            .collect();
        return ctx.output.result(outputs);
    }

    for text in &texts {
        ctx.output.section(format!("{} ({})", text.artifact.title, text.artifact.file));
        if text.loaded {
            ctx.output.text(text.content.trim_end());
        } else {
            ctx.output.warning(&text.content);
        }
    }

    let missing = texts.iter().filter(|t| !t.loaded).count();
    if missing > 0 {
        ctx.output.warning(format!("{} of {} reports unavailable", missing, texts.len()));
    }

    Ok(())
}
