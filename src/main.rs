use ccs_annotate::{Config, Pipeline, Result, SystemToolchain};
use std::path::PathBuf;
use std::process::exit;
use std::time::Instant;

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn usage(program: &str) {
    eprintln!(
        "Usage: {} -i <reads.fastq[.gz]> -e <max_ee> -g <host.fasta> -p <primers.fasta> [options]",
        program
    );
    eprintln!("\nRequired:");
    eprintln!("  -i <file>   Barcoded reads with ccs pass counts");
    eprintln!("  -e <float>  Expected-error threshold for downstream filtering");
    eprintln!("  -g <file>   Host genome fasta");
    eprintln!("  -p <file>   Combined primer fasta");
    eprintln!("\nOptions:");
    eprintln!("  -c <file>        Chimera database (accepted, unused by this stage)");
    eprintln!("  -t <file>        Taxonomy database (accepted, unused by this stage)");
    eprintln!("  -l <file>        Lineage reference fasta (accepted, unused by this stage)");
    eprintln!("  --workdir <dir>  Directory for intermediate artifacts (default: .)");
    eprintln!("  --threads <n>    Thread count handed to the aligner (default: 15)");
    eprintln!("  --primer-parser <exe>  Secondary primer-output parser executable");
}

fn parse_config(args: &[String]) -> Option<(Config, usize, PathBuf)> {
    let reads = flag_value(args, "-i")?;
    let max_ee = flag_value(args, "-e")?.parse::<f64>().ok()?;
    let host_reference = flag_value(args, "-g")?;
    let primer_file = flag_value(args, "-p")?;

    let config = Config {
        reads: PathBuf::from(reads),
        max_ee,
        host_reference: PathBuf::from(host_reference),
        primer_file: PathBuf::from(primer_file),
        chimera_db: flag_value(args, "-c").map(PathBuf::from),
        taxonomy_db: flag_value(args, "-t").map(PathBuf::from),
        lineage_reference: flag_value(args, "-l").map(PathBuf::from),
        work_dir: flag_value(args, "--workdir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let threads = flag_value(args, "--threads")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(15);
    let primer_parser = flag_value(args, "--primer-parser")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("primer_matching"));

    Some((config, threads, primer_parser))
}

fn run(config: &Config, threads: usize, primer_parser: PathBuf) -> Result<()> {
    let tools = SystemToolchain::new(threads, primer_parser);
    let start = Instant::now();

    let summary = Pipeline::new(config, &tools).run()?;
    summary.print_summary();

    println!(
        "\nProcessing time: {:.3} seconds",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let Some((config, threads, primer_parser)) = parse_config(&args[1..]) else {
        usage(&args[0]);
        exit(2);
    };

    if let Err(e) = run(&config, threads, primer_parser) {
        eprintln!("Error: {}", e);
        exit(1);
    }
}
