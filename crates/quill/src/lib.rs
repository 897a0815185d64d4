mod graphics;

pub use quill_core::*;

pub use self::graphics::TextGraphics;

pub mod text {
    pub use quill_core::text::*;
    #[cfg(feature = "rustybuzz")]
    pub use quill_rustybuzz::RustybuzzShaper;
    #[cfg(feature = "freetype")]
    pub use quill_freetype::FreetypeRasterizer;
    #[cfg(feature = "image")]
    pub use quill_image::EmbeddedImageRasterizer;
    #[cfg(feature = "zeno")]
    pub use quill_zeno::ZenoRasterizer;

    #[derive(Debug, Default)]
    pub struct DefaultTextShaper {
        #[cfg(feature = "rustybuzz")]
        inner: quill_rustybuzz::RustybuzzShaper,
        #[cfg(not(feature = "rustybuzz"))]
        inner: CmapTextShaper,
    }

    impl DefaultTextShaper {
        pub fn new() -> DefaultTextShaper {
            DefaultTextShaper::default()
        }
    }

    impl TextShaper for DefaultTextShaper {
        fn shape(
            &mut self,
            font_face: &FontFace,
            text: &str,
            size: f32,
            buf: &mut Vec<ShapedGlyph>,
        ) {
            self.inner.shape(font_face, text, size, buf);
        }
    }
}
