use std::collections::BTreeSet;

use render_quality::{PipelineStage, RenderSink, RenderWrite, RepresentationId, SinkError};
use tracing::trace;

/// Headless renderer stand-in that logs every write at `trace`.
#[derive(Debug, Default)]
pub(crate) struct TracingSink {
    missing_stages: BTreeSet<PipelineStage>,
    visible: BTreeSet<RepresentationId>,
    write_count: u64,
}

impl TracingSink {
    pub(crate) fn new(post_stage: bool) -> Self {
        let mut sink = Self::default();
        if !post_stage {
            sink.missing_stages.insert(PipelineStage::PostComposer);
        }
        sink
    }

    pub(crate) fn write_count(&self) -> u64 {
        self.write_count
    }

    pub(crate) fn visible_count(&self) -> usize {
        self.visible.len()
    }
}

impl RenderSink for TracingSink {
    fn write(&mut self, write: RenderWrite) -> Result<(), SinkError> {
        if let Some(stage) = write.required_stage() {
            if self.missing_stages.contains(&stage) {
                return Err(SinkError::MissingStage(stage));
            }
        }
        trace!(field = %write.field(), write = ?write, "render_write");
        self.write_count = self.write_count.saturating_add(1);
        Ok(())
    }

    fn set_representation_visible(
        &mut self,
        representation: RepresentationId,
        visible: bool,
    ) -> Result<(), SinkError> {
        trace!(representation = representation.0, visible, "representation_visibility");
        if visible {
            self.visible.insert(representation);
        } else {
            self.visible.remove(&representation);
        }
        Ok(())
    }
}
