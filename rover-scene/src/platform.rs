/// Rendering backend the scene is projected onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderTarget {
    #[default]
    Native,
    Web,
    Headless,
}

impl RenderTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            RenderTarget::Native => "native",
            RenderTarget::Web => "web",
            RenderTarget::Headless => "headless",
        }
    }
}

/// Platform context shared by every node created through a factory.
///
/// Also stored in Lua app_data so script-side helpers can read it.
#[derive(Debug, Clone)]
pub struct PlatformContext {
    target: RenderTarget,
    pixel_density: f32,
}

impl PlatformContext {
    pub fn new(target: RenderTarget) -> Self {
        Self {
            target,
            pixel_density: 1.0,
        }
    }

    pub fn with_pixel_density(mut self, density: f32) -> Self {
        if density.is_finite() && density > 0.0 {
            self.pixel_density = density;
        }
        self
    }

    pub fn target(&self) -> RenderTarget {
        self.target
    }

    pub fn pixel_density(&self) -> f32 {
        self.pixel_density
    }

    /// Convert logical units to device pixels
    pub fn to_pixels(&self, logical: f64) -> f64 {
        logical * self.pixel_density as f64
    }
}

impl Default for PlatformContext {
    fn default() -> Self {
        Self::new(RenderTarget::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context() {
        let ctx = PlatformContext::default();
        assert_eq!(ctx.target(), RenderTarget::Native);
        assert_eq!(ctx.pixel_density(), 1.0);
    }

    #[test]
    fn test_pixel_density_rejects_invalid() {
        let ctx = PlatformContext::new(RenderTarget::Web).with_pixel_density(0.0);
        assert_eq!(ctx.pixel_density(), 1.0);

        let ctx = ctx.with_pixel_density(f32::NAN);
        assert_eq!(ctx.pixel_density(), 1.0);

        let ctx = ctx.with_pixel_density(2.0);
        assert_eq!(ctx.to_pixels(10.0), 20.0);
    }
}
