mod match_u8 {
    extern crate magic_tree;

    ///Image tests
    #[test]
    fn image_gif() {
        assert!(magic_tree::match_u8("image/gif", include_bytes!("image/gif")));
    }
    #[test]
    fn image_png() {
        assert!(magic_tree::match_u8("image/png", include_bytes!("image/png")));
    }
    #[test]
    fn image_jpeg() {
        assert!(magic_tree::match_u8("image/jpeg", include_bytes!("image/jpeg")));
    }
    #[test]
    fn image_bmp() {
        assert!(magic_tree::match_u8("image/bmp", include_bytes!("image/bmp")));
    }
    #[test]
    fn image_tiff() {
        assert!(magic_tree::match_u8("image/tiff", include_bytes!("image/tiff")));
    }
    #[test]
    fn image_x_portable_bitmap() {
        assert!(magic_tree::match_u8("image/x-portable-bitmap", include_bytes!("image/x-portable-bitmap")));
    }
    #[test]
    fn image_svg() {
        assert!(magic_tree::match_u8("image/svg+xml", include_bytes!("image/svg+xml")));
    }

    /// Archive, document and executable tests
    #[test]
    fn application_zip() {
        assert!(magic_tree::match_u8("application/zip", include_bytes!("application/zip")));
    }
    #[test]
    fn application_gzip() {
        assert!(magic_tree::match_u8("application/gzip", include_bytes!("application/gzip")));
    }
    #[test]
    fn application_pdf() {
        assert!(magic_tree::match_u8("application/pdf", include_bytes!("application/pdf")));
    }
    #[test]
    fn application_x_tar() {
        assert!(magic_tree::match_u8("application/x-tar", include_bytes!("application/x-tar")));
    }
    #[test]
    fn application_x_executable() {
        assert!(magic_tree::match_u8("application/x-executable", include_bytes!("application/x-executable")));
    }
    #[test]
    fn application_x_sharedlib() {
        assert!(magic_tree::match_u8("application/x-sharedlib", include_bytes!("application/x-sharedlib")));
    }

    /// Audio tests
    #[test]
    fn audio_mpeg() {
        assert!(magic_tree::match_u8("audio/mpeg", include_bytes!("audio/mpeg")));
    }
    #[test]
    fn audio_x_wav() {
        assert!(magic_tree::match_u8("audio/x-wav", include_bytes!("audio/x-wav")));
    }

    /// Text tests
    #[test]
    fn text_html() {
        assert!(magic_tree::match_u8("text/html", include_bytes!("text/html")));
    }

    /// Negative tests
    #[test]
    fn gif_is_not_png() {
        assert!(!magic_tree::match_u8("image/png", include_bytes!("image/gif")));
    }
    #[test]
    fn unknown_mime_never_matches() {
        assert!(!magic_tree::match_u8("application/x-nonsense", include_bytes!("image/gif")));
    }
    #[test]
    // The ELF rule chain for a shared object still passes through the
    // executable tag, so both types are reported.
    fn sharedlib_is_also_executable() {
        assert!(magic_tree::match_u8("application/x-executable", include_bytes!("application/x-sharedlib")));
    }

}
