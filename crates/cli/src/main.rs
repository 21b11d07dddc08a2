//! vectormark CLI — run a benchmark sweep from the command line.
//!
//! A backend is included in the sweep iff its connection parameters
//! are given: `--pg-dbname`/`--pg-user` for PGVector, `--milvus-url`
//! for Milvus, `--qdrant-url` for QDrant. With `--baseline` the run
//! goes against the in-process brute-force backend instead.

use std::process;

use clap::{Arg, ArgAction, ArgMatches, Command};

use vectormark_adapters::{MilvusParams, PgParams, QdrantParams};
use vectormark_runner::{RunConfig, Runner, DEFAULT_COLLECTION};

fn build_cli() -> Command {
    Command::new("vectormark")
        .about("Benchmark vector database backends against a common workload")
        .arg(
            Arg::new("train")
                .long("train")
                .value_name("CSV")
                .required(true)
                .help("Training dataset (header row + numeric columns, one vector per row)"),
        )
        .arg(
            Arg::new("test")
                .long("test")
                .value_name("CSV")
                .required(true)
                .help("Held-out test dataset; must match the training dimension"),
        )
        .arg(
            Arg::new("rounds")
                .long("rounds")
                .value_name("N")
                .default_value("1")
                .help("Rounds per (index type, metric) grid cell"),
        )
        .arg(
            Arg::new("collection")
                .long("collection")
                .value_name("NAME")
                .default_value(DEFAULT_COLLECTION)
                .help("Name of the scratch collection"),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .value_name("PATH")
                .default_value("./result/result.json")
                .help("Report destination (overwritten atomically)"),
        )
        .arg(
            Arg::new("pg-dbname")
                .long("pg-dbname")
                .value_name("DBNAME")
                .help("PGVector database name"),
        )
        .arg(
            Arg::new("pg-user")
                .long("pg-user")
                .value_name("USER")
                .help("PGVector user"),
        )
        .arg(
            Arg::new("pg-password")
                .long("pg-password")
                .value_name("PASSWORD")
                .help("PGVector password"),
        )
        .arg(
            Arg::new("pg-host")
                .long("pg-host")
                .value_name("HOST")
                .default_value("localhost")
                .help("PGVector host"),
        )
        .arg(
            Arg::new("pg-port")
                .long("pg-port")
                .value_name("PORT")
                .default_value("5432")
                .help("PGVector port"),
        )
        .arg(
            Arg::new("milvus-url")
                .long("milvus-url")
                .value_name("URL")
                .help("Milvus RESTful endpoint, e.g. http://localhost:19530"),
        )
        .arg(
            Arg::new("qdrant-url")
                .long("qdrant-url")
                .value_name("URL")
                .help("QDrant REST endpoint, e.g. http://localhost:6333"),
        )
        .arg(
            Arg::new("baseline")
                .long("baseline")
                .action(ArgAction::SetTrue)
                .help("Sweep the in-process brute-force backend instead of any product"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
}

fn matches_to_config(matches: &ArgMatches) -> Result<RunConfig, String> {
    let rounds: usize = matches
        .get_one::<String>("rounds")
        .expect("has default")
        .parse()
        .map_err(|_| "rounds must be a non-negative integer".to_string())?;
    let pg_port: u16 = matches
        .get_one::<String>("pg-port")
        .expect("has default")
        .parse()
        .map_err(|_| "pg-port must be a port number".to_string())?;

    let mut config = RunConfig::new(
        matches.get_one::<String>("train").expect("required"),
        matches.get_one::<String>("test").expect("required"),
        matches.get_one::<String>("out").expect("has default"),
    );
    config.rounds = rounds;
    config.collection_name = matches
        .get_one::<String>("collection")
        .expect("has default")
        .clone();

    let pg_dbname = matches.get_one::<String>("pg-dbname").cloned();
    let pg_user = matches.get_one::<String>("pg-user").cloned();
    if pg_dbname.is_some() || pg_user.is_some() {
        config.pgvector = Some(PgParams {
            dbname: pg_dbname.unwrap_or_default(),
            user: pg_user.unwrap_or_default(),
            password: matches
                .get_one::<String>("pg-password")
                .cloned()
                .unwrap_or_default(),
            host: matches.get_one::<String>("pg-host").expect("has default").clone(),
            port: pg_port,
        });
    }
    if let Some(url) = matches.get_one::<String>("milvus-url") {
        config.milvus = Some(MilvusParams { url: url.clone() });
    }
    if let Some(url) = matches.get_one::<String>("qdrant-url") {
        config.qdrant = Some(QdrantParams { url: url.clone() });
    }
    Ok(config)
}

fn main() {
    let matches = build_cli().get_matches();

    let level = if matches.get_flag("verbose") {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = match matches_to_config(&matches) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(2);
        }
    };

    let baseline = matches.get_flag("baseline");
    if !baseline && config.enabled_backends().is_empty() {
        eprintln!(
            "no backend enabled; pass --qdrant-url, --milvus-url or --pg-dbname/--pg-user \
             (or --baseline for the in-process reference)"
        );
        process::exit(2);
    }

    let destination = config.destination.clone();
    let runner = Runner::new(config);
    let outcome = if baseline {
        runner.run_baseline()
    } else {
        runner.run()
    };

    match outcome {
        Ok(report) => {
            println!(
                "benchmarked {} backend(s); report written to {}",
                report.len(),
                destination.display()
            );
        }
        Err(e) => {
            eprintln!("benchmark failed: {}", e);
            process::exit(1);
        }
    }
}
