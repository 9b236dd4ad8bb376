mod magdir {

    extern crate magic_tree;

    use std::path::Path;
    use magic_tree::{Magdir, MagicError};

    fn magdir() -> Magdir {
        Magdir::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/magdir"))
    }

    #[test]
    fn files_are_sorted_and_flat() {
        let names: Vec<String> = magdir().files().unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["10-images", "20-broken", "30-compress"]);
    }

    #[test]
    fn open_one_source() {
        let rules = magdir().open("10-images").unwrap();
        let best = rules.best(include_bytes!("image/gif")).unwrap().unwrap();
        assert_eq!(best.mime_type(), Some("image/gif"));
        assert_eq!(best.full_message(), "GIF image data version 89a");
        assert!(rules.best(include_bytes!("application/gzip")).unwrap().is_none());
    }

    #[test]
    fn open_is_strict() {
        match magdir().open("20-broken") {
            Err(MagicError::Rule { origin, line, .. }) => {
                assert_eq!(origin, "20-broken");
                assert_eq!(line, 3);
            },
            other => panic!("unexpected {:?}", other.map(|r| r.len())),
        }
        match magdir().open("99-missing") {
            Err(MagicError::NoSuchSource(name)) => assert_eq!(name, "99-missing"),
            other => panic!("unexpected {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn rules_skip_broken_sources() {
        let rules = magdir().rules().unwrap();
        assert_eq!(rules.supported(), vec!["application/gzip", "image/gif", "image/png"]);
        assert!(rules.matches(b"BZh91AY&SY").unwrap().is_empty());
        assert!(rules.matches(b"NOPE").unwrap().is_empty());

        let gzip = rules.matches(include_bytes!("application/gzip")).unwrap();
        assert_eq!(gzip.len(), 1);
        assert_eq!(gzip[0].full_message(), "gzip compressed data deflated");
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(Magdir::new("this/dir/does/not/exist").rules().is_err());
    }

}
