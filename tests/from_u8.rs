mod from_u8 {

    extern crate magic_tree;

    ///Image tests
    #[test]
    fn image_gif() {
        assert_eq!(
            magic_tree::from_u8(include_bytes!("image/gif")),
            Some("image/gif".to_string())
        );
    }
    #[test]
    fn image_png() {
        assert_eq!(
            magic_tree::from_u8(include_bytes!("image/png")),
            Some("image/png".to_string())
        );
    }
    #[test]
    fn image_jpeg() {
        assert_eq!(
            magic_tree::from_u8(include_bytes!("image/jpeg")),
            Some("image/jpeg".to_string())
        );
    }
    #[test]
    fn image_bmp() {
        assert_eq!(
            magic_tree::from_u8(include_bytes!("image/bmp")),
            Some("image/bmp".to_string())
        );
    }
    #[test]
    fn image_tiff() {
        assert_eq!(
            magic_tree::from_u8(include_bytes!("image/tiff")),
            Some("image/tiff".to_string())
        );
    }
    #[test]
    fn image_x_portable_bitmap() {
        assert_eq!(
            magic_tree::from_u8(include_bytes!("image/x-portable-bitmap")),
            Some("image/x-portable-bitmap".to_string())
        );
    }
    #[test]
    fn image_svg() {
        assert_eq!(
            magic_tree::from_u8(include_bytes!("image/svg+xml")),
            Some("image/svg+xml".to_string())
        );
    }

    /// Archive, document and executable tests
    #[test]
    fn application_zip() {
        assert_eq!(
            magic_tree::from_u8(include_bytes!("application/zip")),
            Some("application/zip".to_string())
        );
    }
    #[test]
    fn application_gzip() {
        assert_eq!(
            magic_tree::from_u8(include_bytes!("application/gzip")),
            Some("application/gzip".to_string())
        );
    }
    #[test]
    fn application_pdf() {
        assert_eq!(
            magic_tree::from_u8(include_bytes!("application/pdf")),
            Some("application/pdf".to_string())
        );
    }
    #[test]
    fn application_x_tar() {
        assert_eq!(
            magic_tree::from_u8(include_bytes!("application/x-tar")),
            Some("application/x-tar".to_string())
        );
    }
    #[test]
    fn application_x_executable() {
        assert_eq!(
            magic_tree::from_u8(include_bytes!("application/x-executable")),
            Some("application/x-executable".to_string())
        );
    }
    #[test]
    fn application_x_sharedlib() {
        assert_eq!(
            magic_tree::from_u8(include_bytes!("application/x-sharedlib")),
            Some("application/x-sharedlib".to_string())
        );
    }

    /// Audio tests
    #[test]
    fn audio_mpeg() {
        assert_eq!(
            magic_tree::from_u8(include_bytes!("audio/mpeg")),
            Some("audio/mpeg".to_string())
        );
    }
    #[test]
    fn audio_x_wav() {
        assert_eq!(
            magic_tree::from_u8(include_bytes!("audio/x-wav")),
            Some("audio/x-wav".to_string())
        );
    }

    /// Text tests
    #[test]
    fn text_html() {
        assert_eq!(
            magic_tree::from_u8(include_bytes!("text/html")),
            Some("text/html".to_string())
        );
    }
    #[test]
    fn text_plain_is_unknown() {
        assert_eq!(magic_tree::from_u8(include_bytes!("text/plain")), None);
    }
    #[test]
    fn empty_input_is_unknown() {
        assert_eq!(magic_tree::from_u8(b""), None);
    }

}
