use tracing::{debug, info, warn};

use crate::settings::{GraphicsConfig, QualityPreset, SettingField};

use super::appliers::{ApplierTable, ApplyContext};
use super::sink::RenderSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileKind {
    Initial,
    PresetApplied(QualityPreset),
    Diff,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub kind: ReconcileKind,
    pub applied: Vec<SettingField>,
}

impl ReconcileReport {
    fn unchanged() -> Self {
        Self {
            kind: ReconcileKind::Unchanged,
            applied: Vec::new(),
        }
    }

    pub fn preset_applied(&self) -> Option<QualityPreset> {
        match self.kind {
            ReconcileKind::PresetApplied(preset) => Some(preset),
            _ => None,
        }
    }
}

/// Applies a config to the sink, touching only the fields that changed since
/// the previous pass.
#[derive(Debug, Default)]
pub struct QualityReconciler {
    appliers: ApplierTable,
    previous: Option<GraphicsConfig>,
}

impl QualityReconciler {
    pub fn new(context: ApplyContext) -> Self {
        Self {
            appliers: ApplierTable::new(context),
            previous: None,
        }
    }

    pub fn previous(&self) -> Option<&GraphicsConfig> {
        self.previous.as_ref()
    }

    pub fn apply_context(&self) -> &ApplyContext {
        self.appliers.context()
    }

    /// A new context changes derived parameters, so the next pass re-applies
    /// every field.
    pub fn set_apply_context(&mut self, context: ApplyContext) {
        self.appliers.set_context(context);
        self.invalidate();
    }

    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    pub fn reconcile<S: RenderSink + ?Sized>(
        &mut self,
        config: &mut GraphicsConfig,
        sink: &mut S,
    ) -> ReconcileReport {
        let Some(previous) = self.previous else {
            return self.initial_pass(config, sink);
        };

        if config.preset != previous.preset && config.preset.is_named() {
            return self.preset_pass(config, sink);
        }

        let mut applied = Vec::new();
        for field in SettingField::ALL {
            if config.differs_in(&previous, field) {
                self.appliers.apply(field, config, sink);
                applied.push(field);
            }
        }

        if applied.is_empty() {
            self.previous = Some(*config);
            return ReconcileReport::unchanged();
        }

        if config.preset.is_named() && !config.matches_preset(config.preset) {
            debug!(preset = %config.preset, "edited_preset_relabelled_custom");
            config.preset = QualityPreset::Custom;
        }
        self.previous = Some(*config);
        ReconcileReport {
            kind: ReconcileKind::Diff,
            applied,
        }
    }

    fn initial_pass<S: RenderSink + ?Sized>(
        &mut self,
        config: &mut GraphicsConfig,
        sink: &mut S,
    ) -> ReconcileReport {
        if config.preset.is_named() && !config.matches_preset(config.preset) {
            warn!(preset = %config.preset, "stored_preset_diverges_relabelled_custom");
            config.preset = QualityPreset::Custom;
        }

        self.appliers.apply_all(config, sink);
        self.previous = Some(*config);
        info!(preset = %config.preset, "quality_initial_apply");
        ReconcileReport {
            kind: ReconcileKind::Initial,
            applied: SettingField::ALL.to_vec(),
        }
    }

    fn preset_pass<S: RenderSink + ?Sized>(
        &mut self,
        config: &mut GraphicsConfig,
        sink: &mut S,
    ) -> ReconcileReport {
        let preset = config.preset;
        if let Some(table) = GraphicsConfig::for_preset(preset) {
            *config = table;
        }

        self.appliers.reset_state();
        self.appliers.apply_all(config, sink);
        self.previous = Some(*config);
        info!(preset = %preset, "quality_preset_applied");
        ReconcileReport {
            kind: ReconcileKind::PresetApplied(preset),
            applied: SettingField::ALL.to_vec(),
        }
    }
}
