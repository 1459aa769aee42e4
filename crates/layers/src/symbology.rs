/// Colour of the placeholder line drawn while a route is being computed.
pub const ROUTE_DOWNLOADING_COLOR: u32 = 0x9933_79FF;
/// Dash pattern (on, off) of the placeholder line.
pub const ROUTE_DOWNLOADING_DASH: [f32; 2] = [3.0, 12.0];
/// Colour of routes the backend could not compute.
pub const ROUTE_NOT_VALID_COLOR: u32 = 0xFFFF_0000;

/// Stroke definition for a route line.
///
/// Colours are packed ARGB, the way route colour preferences are stored.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LineStyle {
    pub color: u32,
    pub stroke_width: u32,
    pub dash: Option<[f32; 2]>,
}

impl LineStyle {
    pub const fn solid(color: u32, stroke_width: u32) -> Self {
        Self {
            color,
            stroke_width,
            dash: None,
        }
    }

    pub const fn downloading(stroke_width: u32) -> Self {
        Self {
            color: ROUTE_DOWNLOADING_COLOR,
            stroke_width,
            dash: Some(ROUTE_DOWNLOADING_DASH),
        }
    }

    pub const fn not_valid(stroke_width: u32) -> Self {
        Self::solid(ROUTE_NOT_VALID_COLOR, stroke_width)
    }

    pub fn is_dashed(&self) -> bool {
        self.dash.is_some()
    }

    /// Colour as normalized `[r, g, b, a]`.
    pub fn rgba(&self) -> [f32; 4] {
        let channel = |shift: u32| ((self.color >> shift) & 0xFF) as f32 / 255.0;
        [channel(16), channel(8), channel(0), channel(24)]
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self::solid(0xFF00_0000, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::LineStyle;

    #[test]
    fn rgba_unpacks_argb() {
        let style = LineStyle::not_valid(4);
        assert_eq!(style.rgba(), [1.0, 0.0, 0.0, 1.0]);
        assert!(!style.is_dashed());
    }

    #[test]
    fn downloading_is_dashed_and_translucent() {
        let style = LineStyle::downloading(4);
        assert!(style.is_dashed());
        assert!(style.rgba()[3] < 1.0);
        assert_eq!(style.stroke_width, 4);
    }
}
