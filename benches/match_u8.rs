#[macro_use]
extern crate bencher;
extern crate magic_tree;
use bencher::Bencher;

///Image benchmarks
fn image_gif(b: &mut Bencher) {
    b.iter(|| magic_tree::match_u8("image/gif", include_bytes!("../tests/image/gif")));
}
fn image_png(b: &mut Bencher) {
    b.iter(|| magic_tree::match_u8("image/png", include_bytes!("../tests/image/png")));
}

/// Archive tests
fn application_zip(b: &mut Bencher) {
    b.iter(|| magic_tree::match_u8("application/zip", include_bytes!("../tests/application/zip")));
}

/// Goes through `use` and an indirect offset
fn audio_mpeg(b: &mut Bencher) {
    b.iter(|| magic_tree::match_u8("audio/mpeg", include_bytes!("../tests/audio/mpeg")));
}

/// Text tests, every regex and search rule runs
fn text_plain(b: &mut Bencher) {
    b.iter(|| magic_tree::match_u8("text/plain", include_bytes!("../tests/text/plain")));
}

benchmark_group!(benches, image_gif, image_png, application_zip, audio_mpeg, text_plain);
benchmark_main!(benches);
