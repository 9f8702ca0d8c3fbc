use super::config::{
    AntiAliasing, BackgroundDetail, FogEffect, FrameRateLimit, GraphicsConfig, LightingQuality,
    ObjectDetail, PostProcessing, QualityPreset, RenderPrecision, ShadowQuality, TextureQuality,
    ViewDistance,
};

impl Default for GraphicsConfig {
    fn default() -> Self {
        high_tier()
    }
}

impl GraphicsConfig {
    /// Full field set of a named tier; `None` for `custom`.
    pub fn for_preset(preset: QualityPreset) -> Option<Self> {
        match preset {
            QualityPreset::Low => Some(low_tier()),
            QualityPreset::Medium => Some(medium_tier()),
            QualityPreset::High => Some(high_tier()),
            QualityPreset::Ultra => Some(ultra_tier()),
            QualityPreset::Custom => None,
        }
    }

    pub fn matches_preset(&self, preset: QualityPreset) -> bool {
        Self::for_preset(preset).is_some_and(|table| self.same_fields_as(&table))
    }

    pub fn detect_preset(&self) -> QualityPreset {
        QualityPreset::NAMED
            .into_iter()
            .find(|preset| self.matches_preset(*preset))
            .unwrap_or(QualityPreset::Custom)
    }
}

fn low_tier() -> GraphicsConfig {
    GraphicsConfig {
        preset: QualityPreset::Low,
        resolution_scale: 0.75,
        shadow_quality: ShadowQuality::Off,
        anti_aliasing: AntiAliasing::Off,
        post_processing: PostProcessing::Off,
        view_distance: ViewDistance::Near,
        lighting_quality: LightingQuality::Low,
        fog_effect: FogEffect::Simple,
        render_precision: RenderPrecision::Medium,
        particle_density: 0.3,
        frame_rate_limit: FrameRateLimit::Capped(30),
        object_detail: ObjectDetail::Low,
        ui_animations: false,
        texture_quality: TextureQuality::Low,
        background_detail: BackgroundDetail::Low,
    }
}

fn medium_tier() -> GraphicsConfig {
    GraphicsConfig {
        preset: QualityPreset::Medium,
        resolution_scale: 1.0,
        shadow_quality: ShadowQuality::Low,
        anti_aliasing: AntiAliasing::Fxaa,
        post_processing: PostProcessing::Low,
        view_distance: ViewDistance::Medium,
        lighting_quality: LightingQuality::Medium,
        fog_effect: FogEffect::Standard,
        render_precision: RenderPrecision::High,
        particle_density: 0.6,
        frame_rate_limit: FrameRateLimit::Capped(60),
        object_detail: ObjectDetail::Medium,
        ui_animations: true,
        texture_quality: TextureQuality::Medium,
        background_detail: BackgroundDetail::Medium,
    }
}

fn high_tier() -> GraphicsConfig {
    GraphicsConfig {
        preset: QualityPreset::High,
        resolution_scale: 1.0,
        shadow_quality: ShadowQuality::High,
        anti_aliasing: AntiAliasing::Msaa4x,
        post_processing: PostProcessing::Medium,
        view_distance: ViewDistance::Far,
        lighting_quality: LightingQuality::High,
        fog_effect: FogEffect::Standard,
        render_precision: RenderPrecision::High,
        particle_density: 1.0,
        frame_rate_limit: FrameRateLimit::Capped(60),
        object_detail: ObjectDetail::High,
        ui_animations: true,
        texture_quality: TextureQuality::High,
        background_detail: BackgroundDetail::High,
    }
}

fn ultra_tier() -> GraphicsConfig {
    GraphicsConfig {
        preset: QualityPreset::Ultra,
        resolution_scale: 1.5,
        shadow_quality: ShadowQuality::Ultra,
        anti_aliasing: AntiAliasing::Msaa8x,
        post_processing: PostProcessing::High,
        view_distance: ViewDistance::Unlimited,
        lighting_quality: LightingQuality::Ultra,
        fog_effect: FogEffect::High,
        render_precision: RenderPrecision::High,
        particle_density: 1.0,
        frame_rate_limit: FrameRateLimit::Unlimited,
        object_detail: ObjectDetail::Ultra,
        ui_animations: true,
        texture_quality: TextureQuality::Ultra,
        background_detail: BackgroundDetail::High,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_tables_carry_their_own_label() {
        for preset in QualityPreset::NAMED {
            let table = GraphicsConfig::for_preset(preset).expect("named tier");
            assert_eq!(table.preset, preset);
        }
    }

    #[test]
    fn custom_has_no_table() {
        assert!(GraphicsConfig::for_preset(QualityPreset::Custom).is_none());
        assert!(!GraphicsConfig::default().matches_preset(QualityPreset::Custom));
    }

    #[test]
    fn named_tiers_are_pairwise_distinct() {
        for (index, a) in QualityPreset::NAMED.iter().enumerate() {
            for b in &QualityPreset::NAMED[index + 1..] {
                let left = GraphicsConfig::for_preset(*a).expect("tier");
                let right = GraphicsConfig::for_preset(*b).expect("tier");
                assert!(!left.same_fields_as(&right), "{a} and {b} share a table");
            }
        }
    }

    #[test]
    fn detect_preset_ignores_the_label() {
        let mut config = GraphicsConfig::for_preset(QualityPreset::Low).expect("tier");
        config.preset = QualityPreset::Custom;
        assert_eq!(config.detect_preset(), QualityPreset::Low);

        config.ui_animations = true;
        assert_eq!(config.detect_preset(), QualityPreset::Custom);
    }

    #[test]
    fn default_config_is_the_high_tier() {
        let config = GraphicsConfig::default();
        assert_eq!(config.preset, QualityPreset::High);
        assert!(config.matches_preset(QualityPreset::High));
    }
}
