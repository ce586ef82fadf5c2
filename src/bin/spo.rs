//! Driver binary: load a rule file, apply one rule to the host graph and
//! write dot/CSV artifacts for the before and after states.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use pushout::{apply_pushout, render, LabeledGraph, RewriteOutcome, RuleProgram};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Rule-definition file: host graph first, then left/right pairs.
    file: PathBuf,

    /// 1-based index of the rule to apply.
    #[arg(short, long)]
    #[arg(default_value_t = 1)]
    rule: usize,

    /// Directory for dot and CSV artifacts.
    #[arg(short, long)]
    #[arg(default_value = "out")]
    out_dir: PathBuf,

    /// Also export the selected rule's left and right sides.
    #[arg(long)]
    dump_rule: bool,
}

fn export(graph: &LabeledGraph<String>, dir: &Path, stem: &str) {
    fs::write(dir.join(format!("{stem}.gv")), render::dot_string(graph))
        .expect("could not write dot file");
    let nodes =
        fs::File::create(dir.join(format!("{stem}_nodes.csv"))).expect("could not create file");
    render::write_node_csv(graph, nodes).expect("could not write node table");
    let edges =
        fs::File::create(dir.join(format!("{stem}_edges.csv"))).expect("could not create file");
    render::write_edge_csv(graph, edges).expect("could not write edge table");
}

fn main() -> ExitCode {
    let args = Args::parse();

    let program = match RuleProgram::load_file(&args.file) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let Some(rule) = args.rule.checked_sub(1).and_then(|i| program.rules.get(i)) else {
        eprintln!(
            "error: no rule {} (the file defines {})",
            args.rule,
            program.rules.len()
        );
        return ExitCode::FAILURE;
    };

    fs::create_dir_all(&args.out_dir).expect("could not create output directory");
    export(&program.host, &args.out_dir, "host_before");
    if args.dump_rule {
        export(rule.left(), &args.out_dir, "rule_left");
        export(rule.right(), &args.out_dir, "rule_right");
    }

    let mut host = program.host.clone();
    match apply_pushout(rule, &mut host) {
        RewriteOutcome::Applied(report) => {
            println!("applied rule {}", args.rule);
            for label in &report.deleted_nodes {
                println!("  deleted node {label}");
            }
            for label in &report.added_nodes {
                println!("  added node {label}");
            }
            for (a, b) in &report.removed_edges {
                println!("  removed edge {a} -- {b}");
            }
            for (a, b) in &report.added_edges {
                println!("  added edge {a} -- {b}");
            }
            if report.is_noop() {
                println!("  (no changes)");
            }
        }
        RewriteOutcome::NoMatch(failure) => {
            println!("rule {} does not match: {failure}", args.rule);
            println!("the host graph is unchanged");
        }
    }
    export(&host, &args.out_dir, "host_after");

    ExitCode::SUCCESS
}
