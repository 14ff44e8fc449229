//! Layout session files: everything needed to lay out one corpus.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use unispring_core::{
    AttractReport, AttractorConfig, BufferId, Corpus, CorpusConfig, Exit, RegionSpec, RelaxConfig, Relaxation, Track,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub track: Track,
    pub region: RegionSpec,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub relax: RelaxConfig,
    /// Optional attractor pass run after relaxation.
    #[serde(default)]
    pub attractors: Option<AttractorConfig>,
}

impl Session {
    pub fn load(path: &Path) -> Result<Session> {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing session {}", path.display()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BufferLayout {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOutput {
    pub build: String,
    pub steps: usize,
    pub retriangulations: usize,
    pub exit: Exit,
    pub l0: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attract: Option<AttractReport>,
    pub buffers: BTreeMap<BufferId, BufferLayout>,
    pub track: Track,
}

impl LayoutOutput {
    pub fn new(
        build: &str,
        relaxation: &Relaxation,
        attract: Option<AttractReport>,
        corpus: &Corpus,
        track: Track,
    ) -> Result<LayoutOutput> {
        let buffers = corpus
            .buffers()
            .iter()
            .map(|b| -> Result<(BufferId, BufferLayout)> {
                let (x, y) = corpus.buffer_positions(b.id)?;
                Ok((b.id, BufferLayout { x, y }))
            })
            .collect::<Result<_>>()?;
        Ok(LayoutOutput {
            build: build.to_string(),
            steps: relaxation.steps,
            retriangulations: relaxation.retriangulations,
            exit: relaxation.exit,
            l0: relaxation.l0,
            attract,
            buffers,
            track,
        })
    }
}
