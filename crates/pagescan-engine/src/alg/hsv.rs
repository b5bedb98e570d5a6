// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Integer HSV conversion. Hue is in whole degrees (-1 for achromatic colours),
// saturation and value are 0..=255. Conversions go through 16-bit intermediate
// precision so that RGB -> HSV -> RGB with an unchanged value is lossless for
// grays and stable for colours.

use image::Rgb;

const USHRT_MAX: f64 = 65535.0;

/// A colour in hue/saturation/value form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    /// Degrees in 0..360, or -1 when the colour has no hue (a gray).
    pub hue: i32,
    pub saturation: i32,
    pub value: i32,
}

/// HSV value (brightness) of a pixel: its largest channel.
#[inline]
pub fn value(pixel: Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    r.max(g).max(b)
}

/// Plain integer average of the three channels.
#[inline]
pub fn average(pixel: Rgb<u8>) -> i32 {
    let [r, g, b] = pixel.0;
    (r as i32 + g as i32 + b as i32) / 3
}

impl Hsv {
    pub fn from_rgb(pixel: Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0.map(|c| c as f64 / 255.0);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let value16 = (max * USHRT_MAX).round() as i32;
        if delta == 0.0 {
            return Self {
                hue: -1,
                saturation: 0,
                value: value16 >> 8,
            };
        }

        let saturation16 = (delta / max * USHRT_MAX).round() as i32;
        let mut hue = if r == max {
            (g - b) / delta
        } else if g == max {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };
        hue *= 60.0;
        if hue < 0.0 {
            hue += 360.0;
        }
        let hue100 = (hue * 100.0).round() as i32;

        Self {
            hue: hue100 / 100,
            saturation: saturation16 >> 8,
            value: value16 >> 8,
        }
    }

    /// Same colour with a different value.
    pub fn with_value(self, value: i32) -> Self {
        Self { value, ..self }
    }

    pub fn to_rgb(self) -> Rgb<u8> {
        let value16 = self.value.clamp(0, 255) * 0x101;
        let saturation16 = self.saturation.clamp(0, 255) * 0x101;

        if saturation16 == 0 || self.hue < 0 {
            let v = (value16 >> 8) as u8;
            return Rgb([v, v, v]);
        }

        let hue100 = (self.hue % 360) * 100;
        let h = hue100 as f64 / 6000.0;
        let s = saturation16 as f64 / USHRT_MAX;
        let v = value16 as f64 / USHRT_MAX;

        let sector = h as i32;
        let f = h - sector as f64;
        let p = v * (1.0 - s);

        let (r, g, b) = if sector & 1 == 1 {
            let q = v * (1.0 - s * f);
            match sector {
                1 => (q, v, p),
                3 => (p, q, v),
                _ => (v, p, q),
            }
        } else {
            let t = v * (1.0 - s * (1.0 - f));
            match sector {
                0 => (v, t, p),
                2 => (p, v, t),
                _ => (t, p, v),
            }
        };

        let channel = |c: f64| (((c * USHRT_MAX).round() as i32) >> 8).clamp(0, 255) as u8;
        Rgb([channel(r), channel(g), channel(b)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_and_average() {
        assert_eq!(value(Rgb([10, 200, 30])), 200);
        assert_eq!(average(Rgb([10, 200, 30])), 80);
        assert_eq!(average(Rgb([255, 255, 254])), 254);
    }

    #[test]
    fn gray_has_no_hue() {
        let hsv = Hsv::from_rgb(Rgb([90, 90, 90]));
        assert_eq!(hsv, Hsv { hue: -1, saturation: 0, value: 90 });
        assert_eq!(hsv.to_rgb(), Rgb([90, 90, 90]));
        assert_eq!(hsv.with_value(200).to_rgb(), Rgb([200, 200, 200]));
    }

    #[test]
    fn primaries_convert_both_ways() {
        let red = Hsv::from_rgb(Rgb([255, 0, 0]));
        assert_eq!(red, Hsv { hue: 0, saturation: 255, value: 255 });
        assert_eq!(red.to_rgb(), Rgb([255, 0, 0]));

        let green = Hsv::from_rgb(Rgb([0, 255, 0]));
        assert_eq!(green.hue, 120);
        assert_eq!(green.to_rgb(), Rgb([0, 255, 0]));

        let blue = Hsv::from_rgb(Rgb([0, 0, 255]));
        assert_eq!(blue.hue, 240);
        assert_eq!(blue.to_rgb(), Rgb([0, 0, 255]));
    }

    #[test]
    fn lowering_value_keeps_hue_family() {
        let orange = Hsv::from_rgb(Rgb([240, 120, 0]));
        let darker = orange.with_value(120).to_rgb();
        let [r, g, b] = darker.0;
        assert_eq!(r, 120);
        assert!(g < r && b <= g);
    }
}
