//! Embedded textures.

/// Maximum length of a format hint, in bytes.
pub const MAX_FORMAT_HINT_LEN: usize = 8;

/// One texel, stored in BGRA byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Texel {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

impl Texel {
    pub const fn new(b: u8, g: u8, r: u8, a: u8) -> Self {
        Self { b, g, r, a }
    }
}

/// A texture whose pixel data lives inside the scene file.
///
/// With `height == 0` the texture is compressed: `width` is the size of the
/// encoded file in bytes and `texels` packs those bytes four at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Texture {
    /// Short hint such as `png`, `jpg` or `rgba8888`.
    pub format_hint: String,
    pub width: u32,
    pub height: u32,
    pub texels: Vec<Texel>,
}

impl Texture {
    /// Uncompressed texture from raw texels.
    pub fn new(width: u32, height: u32, texels: Vec<Texel>) -> Self {
        Self {
            format_hint: "rgba8888".to_string(),
            width,
            height,
            texels,
        }
    }

    /// Compressed texture holding an encoded image file.
    pub fn compressed(format_hint: &str, bytes: &[u8]) -> Self {
        let texels = bytes
            .chunks(4)
            .map(|chunk| {
                let mut packed = [0u8; 4];
                packed[..chunk.len()].copy_from_slice(chunk);
                Texel::new(packed[0], packed[1], packed[2], packed[3])
            })
            .collect();

        let mut hint = format_hint.to_ascii_lowercase();
        hint.truncate(MAX_FORMAT_HINT_LEN);

        Self {
            format_hint: hint,
            width: bytes.len() as u32,
            height: 0,
            texels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compressed_packing() {
        let texture = Texture::compressed("PNG", &[1, 2, 3, 4, 5]);
        assert_eq!(texture.height, 0);
        assert_eq!(texture.width, 5);
        assert_eq!(texture.format_hint, "png");
        assert_eq!(texture.texels, vec![Texel::new(1, 2, 3, 4), Texel::new(5, 0, 0, 0)]);
    }
}
