//! Adam7 interlacing: seven-pass sub-image projection.

/// Interlace method recorded in IHDR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interlace {
    /// Single pass over the full image.
    #[default]
    None,
    /// Seven Adam7 passes with decreasing stride.
    Adam7,
}

/// One interlace pass: starting offsets and steps in both axes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pass {
    pub x_start: u32,
    pub y_start: u32,
    pub x_step: u32,
    pub y_step: u32,
}

/// The seven Adam7 passes, in transmission order.
pub(crate) const ADAM7_PASSES: [Pass; 7] = [
    Pass { x_start: 0, y_start: 0, x_step: 8, y_step: 8 },
    Pass { x_start: 4, y_start: 0, x_step: 8, y_step: 8 },
    Pass { x_start: 0, y_start: 4, x_step: 4, y_step: 8 },
    Pass { x_start: 2, y_start: 0, x_step: 4, y_step: 4 },
    Pass { x_start: 0, y_start: 2, x_step: 2, y_step: 4 },
    Pass { x_start: 1, y_start: 0, x_step: 2, y_step: 2 },
    Pass { x_start: 0, y_start: 1, x_step: 1, y_step: 2 },
];

/// The single full-image pass used when interlacing is off.
pub(crate) const FULL_IMAGE_PASS: Pass = Pass {
    x_start: 0,
    y_start: 0,
    x_step: 1,
    y_step: 1,
};

impl Pass {
    /// Width and height of this pass's sub-image; zero when the pass
    /// selects no columns or rows.
    pub(crate) fn dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let w = if width > self.x_start {
            (width - self.x_start).div_ceil(self.x_step)
        } else {
            0
        };
        let h = if height > self.y_start {
            (height - self.y_start).div_ceil(self.y_step)
        } else {
            0
        };
        (w, h)
    }

    /// Gather the selected pixels into a dense sub-image, `pixel_bytes`
    /// bytes per pixel, rows concatenated top to bottom.
    pub(crate) fn extract(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        pixel_bytes: usize,
    ) -> Vec<u8> {
        let (pass_w, pass_h) = self.dimensions(width, height);
        let mut out = Vec::with_capacity(pass_w as usize * pass_h as usize * pixel_bytes);

        let mut y = self.y_start;
        while y < height {
            let row_base = y as usize * width as usize * pixel_bytes;
            let mut x = self.x_start;
            while x < width {
                let offset = row_base + x as usize * pixel_bytes;
                out.extend_from_slice(&pixels[offset..offset + pixel_bytes]);
                x += self.x_step;
            }
            y += self.y_step;
        }

        out
    }
}
