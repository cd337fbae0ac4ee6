use std::{env, fs};

use tether::{
    config::EngineConfig,
    eval::evaluate_locally,
    graph::{collect_free_vars, node::Node},
    memo::{content_hash, to_hex},
    stack::Stack,
};

fn main() {
    env_logger::init();

    let mut args: Vec<String> = env::args().collect();
    let no_local_eval = args.iter().any(|arg| arg == "--no-local-eval");
    let show_type = args.iter().any(|arg| arg == "--types");
    if no_local_eval {
        args.retain(|arg| arg != "--no-local-eval");
    }
    if show_type {
        args.retain(|arg| arg != "--types");
    }

    let mut config = EngineConfig::from_env();
    if no_local_eval {
        config = config.with_local_eval(false);
    }

    if args.len() < 2 {
        print_help();
        return;
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => {
            print_help();
        }
        "eval" => {
            if args.len() < 3 {
                eprintln!("Usage: tether eval <graph.json>");
                return;
            }
            eval_file(&args[2], &config, show_type);
        }
        "free-vars" => {
            if args.len() < 3 {
                eprintln!("Usage: tether free-vars <graph.json>");
                return;
            }
            free_vars_file(&args[2]);
        }
        "hash" => {
            if args.len() < 3 {
                eprintln!("Usage: tether hash <graph.json>");
                return;
            }
            hash_file(&args[2]);
        }
        "fmt" => {
            if args.len() < 3 {
                eprintln!("Usage: tether fmt <graph.json>");
                return;
            }
            fmt_file(&args[2], show_type);
        }
        other => {
            eprintln!("Error: unknown command `{}`", other);
            print_help();
            std::process::exit(2);
        }
    }
}

fn print_help() {
    println!(
        "\
Tether CLI

Usage:
  tether eval <graph.json>
  tether free-vars <graph.json>
  tether hash <graph.json>
  tether fmt <graph.json>

Flags:
  --no-local-eval    Skip client-side reduction in `eval`
  --types            Append the declared type to printed nodes
  -h, --help         Show this help message

Environment:
  TETHER_LOCAL_EVAL      Enable client-side reduction (default: true)
  TETHER_EACH_PREFETCH   Rows prefetched before a list length is known (default: 10)
  RUST_LOG               Log filter, e.g. `tether=debug`
"
    );
}

fn read_node(path: &str) -> Node {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            std::process::exit(1);
        }
    };
    match serde_json::from_str(&source) {
        Ok(node) => node,
        Err(e) => {
            eprintln!("Error parsing {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn print_node(node: &Node, show_type: bool) {
    if show_type {
        println!("{:?}", node);
    } else {
        println!("{}", node);
    }
}

fn eval_file(path: &str, config: &EngineConfig, show_type: bool) {
    let node = read_node(path);
    let result = if config.local_eval {
        evaluate_locally(&node, &Stack::empty())
    } else {
        node
    };
    print_node(&result, show_type);

    let free_vars = collect_free_vars(&result);
    if !free_vars.is_empty() {
        eprintln!("warning: unresolved variables: {}", free_vars.join(", "));
    }
}

fn free_vars_file(path: &str) {
    let node = read_node(path);
    for var in collect_free_vars(&node) {
        println!("{}", var);
    }
}

fn hash_file(path: &str) {
    let node = read_node(path);
    println!("{}", to_hex(&content_hash(&node)));
}

fn fmt_file(path: &str, show_type: bool) {
    print_node(&read_node(path), show_type);
}
