use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Linear interpolation towards `other`, each channel rounded to the
    /// nearest integer.
    pub fn blend(self, other: Rgb, ratio: f64) -> Rgb {
        let mix = |a: u8, b: u8| {
            let v = a as f64 + (b as f64 - a as f64) * ratio;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl FromStr for Rgb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ConfigError::Colour(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(bad)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(bad());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Straight-alpha RGBA bitmap used for blitting.
#[derive(Clone, Debug)]
pub struct Sprite {
    width: u32,
    height: u32,
    pixels: Vec<(Rgb, f64)>,
}

impl Sprite {
    pub fn new(width: u32, height: u32) -> Self {
        Sprite { width, height, pixels: vec![(Rgb::BLACK, 0.0); (width * height) as usize] }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> (Rgb, f64) {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Composites a disc over the sprite, sampling pixel centres.
    pub fn paint_disc(&mut self, cx: f64, cy: f64, radius: f64, colour: Rgb, opacity: f64) {
        for y in 0..self.height {
            for x in 0..self.width {
                if !inside_circle(x, y, cx, cy, radius) {
                    continue;
                }
                let idx = (y * self.width + x) as usize;
                let (under, alpha) = self.pixels[idx];
                let out_alpha = opacity + alpha * (1.0 - opacity);
                let colour = if out_alpha <= 0.0 {
                    colour
                } else {
                    under.blend(colour, opacity / out_alpha)
                };
                self.pixels[idx] = (colour, out_alpha);
            }
        }
    }

    /// The food glyph: a red apple disc with a soft highlight, drawn on a
    /// 100x100 box.
    pub fn food() -> Self {
        let mut sprite = Sprite::new(100, 100);
        sprite.paint_disc(50.0, 50.0, 40.0, Rgb::new(0xff, 0x6b, 0x6b), 1.0);
        sprite.paint_disc(50.0, 50.0, 35.0, Rgb::new(0xff, 0x87, 0x87), 1.0);
        sprite.paint_disc(30.0, 30.0, 8.0, Rgb::WHITE, 0.6);
        sprite
    }
}

/// A 2D drawing target addressed in (fractional) pixels.
pub trait Surface {
    fn size(&self) -> (u32, u32);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, colour: Rgb);
    /// Fills a full circle.
    fn fill_arc(&mut self, cx: f64, cy: f64, radius: f64, colour: Rgb);
    /// Draws `sprite` scaled into the `w` x `h` box at `(x, y)`.
    fn blit(&mut self, sprite: &Sprite, x: f64, y: f64, w: f64, h: f64);
}

fn inside_circle(px: u32, py: u32, cx: f64, cy: f64, radius: f64) -> bool {
    let dx = px as f64 + 0.5 - cx;
    let dy = py as f64 + 0.5 - cy;
    dx * dx + dy * dy <= radius * radius
}

/// In-memory RGB raster. A pixel is painted when its centre falls inside the
/// shape.
#[derive(Clone, Debug)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        PixelCanvas { width, height, pixels: vec![Rgb::BLACK; (width * height) as usize] }
    }

    /// Changes the pixel size. Content is discarded; callers repaint.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            *self = PixelCanvas::new(width, height);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Clamps a pixel-centre span `[start, end)` to `[0, limit)`.
    fn span(start: f64, end: f64, limit: u32) -> std::ops::Range<u32> {
        let lo = (start - 0.5).ceil().max(0.0);
        let hi = (end - 0.5).ceil().min(limit as f64);
        if hi <= lo {
            0..0
        } else {
            lo as u32..hi as u32
        }
    }
}

impl Surface for PixelCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, colour: Rgb) {
        for py in Self::span(y, y + h, self.height) {
            for px in Self::span(x, x + w, self.width) {
                self.pixels[(py * self.width + px) as usize] = colour;
            }
        }
    }

    fn fill_arc(&mut self, cx: f64, cy: f64, radius: f64, colour: Rgb) {
        for py in Self::span(cy - radius, cy + radius, self.height) {
            for px in Self::span(cx - radius, cx + radius, self.width) {
                if inside_circle(px, py, cx, cy, radius) {
                    self.pixels[(py * self.width + px) as usize] = colour;
                }
            }
        }
    }

    fn blit(&mut self, sprite: &Sprite, x: f64, y: f64, w: f64, h: f64) {
        if w <= 0.0 || h <= 0.0 || sprite.width() == 0 || sprite.height() == 0 {
            return;
        }
        for py in Self::span(y, y + h, self.height) {
            for px in Self::span(x, x + w, self.width) {
                let u = ((px as f64 + 0.5 - x) / w * sprite.width() as f64) as u32;
                let v = ((py as f64 + 0.5 - y) / h * sprite.height() as f64) as u32;
                let (colour, alpha) = sprite.pixel(u.min(sprite.width() - 1), v.min(sprite.height() - 1));
                if alpha <= 0.0 {
                    continue;
                }
                let idx = (py * self.width + px) as usize;
                self.pixels[idx] = self.pixels[idx].blend(colour, alpha);
            }
        }
    }
}
