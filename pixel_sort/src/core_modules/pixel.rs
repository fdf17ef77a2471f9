// THEORY (1D Pixel Heuristics):
// The `Pixel` module is the most fundamental unit of the sorting engine. It is a
// "dumb" value type for a single RGBA pixel plus the single-pixel heuristics the
// engine thresholds and sorts on. Nothing here knows about neighbors: grouping
// pixels into lines and runs belongs to the segmenter.
//
// Heuristic families (all single-pixel, all on the raw 0..255 channel scale):
// - Brightness: Rec. 709 luma, 0.2126 R + 0.7152 G + 0.0722 B, range [0, 255]
// - Saturation (HSV): chroma / max channel, range [0, 1], 0 for pure black
// - Hue: angle on the color wheel in degrees [0, 360), 0 for grays
//
// Pixels are `Copy`; buffers own the mutable storage. Anything the engine writes
// back goes through `opaque()` so alpha ends up at 255.

pub mod pixel {
    pub type Byte = u8;
    pub type Channel = Byte;
    pub type Brightness = f32;
    pub type Hue = f32;
    pub type Saturation = f32;
    pub type Chroma = Channel;

    pub const CHANNELS: usize = 4;
    pub const OPAQUE: Channel = 255;

    /// A single RGBA pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha (transparency) channel value (0-255).
        pub alpha: Channel,
    }

    impl Pixel {
        pub const WHITE: Pixel = Pixel::new(255, 255, 255, OPAQUE);
        pub const BLACK: Pixel = Pixel::new(0, 0, 0, OPAQUE);

        pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }

        /// An opaque pixel from RGB.
        pub const fn rgb(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel::new(red, green, blue, OPAQUE)
        }

        /// An opaque gray pixel, handy for building luma fixtures.
        pub const fn gray(level: Channel) -> Self {
            Pixel::rgb(level, level, level)
        }

        /// The same color with alpha forced to 255.
        pub const fn opaque(self) -> Self {
            Pixel {
                alpha: OPAQUE,
                ..self
            }
        }

        #[inline]
        fn max_channel(&self) -> Channel {
            self.red.max(self.green.max(self.blue))
        }

        #[inline]
        fn min_channel(&self) -> Channel {
            self.red.min(self.green.min(self.blue))
        }

        /// =================================Heuristics==================================

        /// Perceived brightness (Rec. 709 luma) in [0, 255].
        pub fn brightness(&self) -> Brightness {
            0.2126 * self.red as f32 + 0.7152 * self.green as f32 + 0.0722 * self.blue as f32
        }

        /// Chroma (C): max(R,G,B) - min(R,G,B).
        pub fn chroma(&self) -> Chroma {
            self.max_channel() - self.min_channel()
        }

        /// HSV saturation in [0, 1]. Black is defined as 0 rather than a division by zero.
        pub fn saturation(&self) -> Saturation {
            let maximum_channel = self.max_channel();
            if maximum_channel == 0 {
                return 0.0;
            }
            self.chroma() as f32 / maximum_channel as f32
        }

        /// Hue angle in degrees [0, 360).
        ///
        /// - Branches on the dominant channel; red wraps through `mod 6`.
        /// - Grays (zero chroma) report 0.
        pub fn hue(&self) -> Hue {
            let maximum_channel = self.max_channel();
            let chroma = self.chroma();
            if chroma == 0 {
                return 0.0;
            }

            let delta = chroma as f32;
            let (red, green, blue) = (self.red as f32, self.green as f32, self.blue as f32);

            let mut hue_degrees = if maximum_channel == self.red {
                60.0 * ((green - blue) / delta).rem_euclid(6.0)
            } else if maximum_channel == self.green {
                60.0 * ((blue - red) / delta + 2.0)
            } else {
                60.0 * ((red - green) / delta + 4.0)
            };
            if hue_degrees < 0.0 {
                hue_degrees += 360.0;
            }
            hue_degrees
        }

        /// Linear blend toward `target` by `amount` in [0, 1] on RGB; alpha ends opaque.
        pub fn lerp(&self, target: &Pixel, amount: f32) -> Pixel {
            let blend = |from: Channel, to: Channel| -> Channel {
                let value = from as f32 + (to as f32 - from as f32) * amount;
                value.round().clamp(0.0, 255.0) as Channel
            };
            Pixel::rgb(
                blend(self.red, target.red),
                blend(self.green, target.green),
                blend(self.blue, target.blue),
            )
        }
    }

    impl From<[Byte; CHANNELS]> for Pixel {
        fn from(bytes: [Byte; CHANNELS]) -> Self {
            Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
        }
    }

    impl From<Pixel> for [Byte; CHANNELS] {
        fn from(pixel: Pixel) -> Self {
            [pixel.red, pixel.green, pixel.blue, pixel.alpha]
        }
    }

    impl From<image::Rgba<u8>> for Pixel {
        fn from(rgba: image::Rgba<u8>) -> Self {
            Pixel::from(rgba.0)
        }
    }

    impl From<Pixel> for image::Rgba<u8> {
        fn from(pixel: Pixel) -> Self {
            image::Rgba(pixel.into())
        }
    }
}
