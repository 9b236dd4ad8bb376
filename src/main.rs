use std::io::prelude::*;
use std::path::{Path, PathBuf};

use clap::{App, Arg};
use log::{debug, warn};
use tabwriter::TabWriter;
use walkdir::WalkDir;

use magic_tree::{read_bytes, Magdir, RuleSet, SCAN_LEN};

struct Opts {
    all: bool,
    matching: Option<String>,
}

/// One output line per file, or one per result with `--all`.
fn describe(rules: &RuleSet, path: &Path, opts: &Opts) -> Vec<String> {
    let name = path.display();

    let bytes = match read_bytes(path, SCAN_LEN) {
        Ok(b) => b,
        Err(e) => return vec![format!("{}:\tcannot open ({})\n", name, e)],
    };

    if let Some(ref wanted) = opts.matching {
        return match rules.best(&bytes) {
            Ok(Some(ref best)) if best.mime_type() == Some(wanted.as_str()) => vec![format!("{}\n", name)],
            Ok(_) => Vec::new(),
            Err(e) => vec![format!("{}:\terror: {}\n", name, e)],
        };
    }

    if opts.all {
        return match rules.matches(&bytes) {
            Ok(results) if results.is_empty() => vec![format!("{}:\t-\tdata\n", name)],
            Ok(results) => results
                .iter()
                .map(|r| format!("{}:\t{}\t{}\n", name, r.mime_type().unwrap_or("-"), r.full_message()))
                .collect(),
            Err(e) => vec![format!("{}:\terror: {}\n", name, e)],
        };
    }

    match rules.best(&bytes) {
        Ok(Some(best)) => vec![format!("{}:\t{}\t{}\n", name, best.mime_type().unwrap_or("-"), best.full_message())],
        Ok(None) => vec![format!("{}:\tapplication/octet-stream\tdata\n", name)],
        Err(e) => vec![format!("{}:\terror: {}\n", name, e)],
    }
}

fn collect_files(args: &[&str], recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::<PathBuf>::new();

    for arg in args {
        let path = Path::new(arg);
        if !path.is_dir() {
            files.push(path.to_path_buf());
            continue;
        }
        if !recursive {
            warn!("{} is a directory, use -r to descend", arg);
            continue;
        }
        for entry in WalkDir::new(path).sort_by_file_name() {
            match entry {
                Ok(e) if e.file_type().is_file() => files.push(e.into_path()),
                Ok(_) => {},
                Err(e) => warn!("{}", e),
            }
        }
    }

    files
}

fn main() {
    env_logger::init();

    let args = App::new("tmagic")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Determines the MIME type of a file by walking magic rules")
        .arg(Arg::with_name("file")
            .required(true)
            .multiple(true)
            .index(1)
            .help("List of files to get information about"))
        .arg(Arg::with_name("recursive")
            .short("r")
            .long("recursive")
            .help("Descend into directories"))
        .arg(Arg::with_name("magic")
            .long("magic")
            .takes_value(true)
            .value_name("DIR")
            .help("Use every magic file in DIR instead of the bundled rules"))
        .arg(Arg::with_name("all")
            .long("all")
            .help("Print every matching rule chain, not only the best"))
        .arg(Arg::with_name("match")
            .long("match")
            .takes_value(true)
            .value_name("MIME")
            .help("Only print the paths of files whose best type is MIME"))
        .arg(Arg::with_name("ugly")
            .long("ugly")
            .help("Print tab separated output without aligning columns"))
        .get_matches();

    let loaded: RuleSet;
    let rules: &RuleSet = match args.value_of("magic") {
        Some(dir) => {
            loaded = match Magdir::new(dir).rules() {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("tmagic: {}: {}", dir, e);
                    std::process::exit(1);
                }
            };
            &loaded
        },
        None => magic_tree::magic::builtin::rules(),
    };
    debug!("{} rules loaded", rules.len());

    let opts = Opts {
        all: args.is_present("all"),
        matching: args.value_of("match").map(String::from),
    };

    let inputs: Vec<&str> = args.values_of("file").map(|v| v.collect()).unwrap_or_default();
    let files = collect_files(&inputs, args.is_present("recursive"));

    let mut lines = vec![Vec::<String>::new(); files.len()];
    let mut pool = scoped_threadpool::Pool::new(num_cpus::get() as u32);
    pool.scoped(|scope| {
        for (file, out) in files.iter().zip(lines.iter_mut()) {
            let opts = &opts;
            scope.execute(move || {
                *out = describe(rules, file, opts);
            });
        }
    });

    let stdout = std::io::stdout();
    let result = if args.is_present("ugly") {
        let mut w = stdout.lock();
        lines.iter().flatten().try_for_each(|l| w.write_all(l.as_bytes()))
    } else {
        let mut tw = TabWriter::new(stdout.lock());
        lines.iter().flatten()
            .try_for_each(|l| tw.write_all(l.as_bytes()))
            .and_then(|_| tw.flush())
    };
    if let Err(e) = result {
        eprintln!("tmagic: {}", e);
        std::process::exit(1);
    }
}
