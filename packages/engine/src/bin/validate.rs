use std::path::Path;
use std::process;

use eligibility_engine::{LevelCatalog, RuleNode};

const USAGE: &str = "Usage: validate [--levels <catalog.yaml>] <tree1.yaml> [tree2.yaml ...]";

/// Split `--levels <path>` off the argument list.
fn parse_args(args: Vec<String>) -> Result<(Option<String>, Vec<String>), String> {
    let mut levels = None;
    let mut files = Vec::new();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        if arg == "--levels" {
            match iter.next() {
                Some(path) => levels = Some(path),
                None => return Err("--levels requires a path".to_string()),
            }
        } else {
            files.push(arg);
        }
    }

    Ok((levels, files))
}

fn load_catalog(path: &str) -> Result<LevelCatalog, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?;
    LevelCatalog::from_yaml_str(&content).map_err(|e| format!("invalid catalog {path}: {e}"))
}

fn main() {
    let (levels, files) = match parse_args(std::env::args().skip(1).collect()) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            process::exit(1);
        }
    };

    if files.is_empty() {
        eprintln!("{USAGE}");
        process::exit(1);
    }

    let catalog = match levels.as_deref().map(load_catalog).transpose() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("FATAL: {e}");
            process::exit(2);
        }
    };
    let mut failed = false;

    for arg in &files {
        let path = Path::new(arg);

        // Step 1: serde deserialization check (catches type/structure errors)
        let tree = match RuleNode::from_yaml_file(path) {
            Ok(tree) => tree,
            Err(e) => {
                eprintln!("FAIL: {}: serde: {e}", path.display());
                failed = true;
                continue;
            }
        };

        // Step 2: structural validation
        let issues = tree.validate(catalog.as_ref());
        if issues.is_empty() {
            eprintln!(
                "OK: {} ({} nodes, disciplines: {})",
                path.display(),
                tree.node_count(),
                tree.disciplines().join(", ")
            );
        } else {
            eprintln!("FAIL: {}: {} structural issue(s)", path.display(), issues.len());
            for issue in &issues {
                eprintln!("  - {issue}");
            }
            failed = true;
        }
    }

    if failed {
        process::exit(1);
    }
}
