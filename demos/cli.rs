/// Reads numbers from stdin, one per line, and writes them to a serialized histogram on stdout,
/// or processes an interval log into a percentile distribution report, a la the Java
/// implementation's `HistogramLogProcessor`.

extern crate base64;
extern crate clap;

use std::fs::File;
use std::io::{BufRead, Read, Write};

use clap::{App, Arg, SubCommand};

use widehist::serialization::interval_log::{IntervalLogIterator, LogEntry};
use widehist::serialization::{Deserializer, V2DeflateSerializer, V2Serializer};
use widehist::Histogram;

fn main() {
    env_logger::init();

    let default_max = format!("{}", u64::max_value());
    let matches = App::new("widehist cli")
        .subcommand(
            SubCommand::with_name("serialize")
                .arg(
                    Arg::with_name("min")
                        .long("min")
                        .help("Minimum discernible value")
                        .takes_value(true)
                        .default_value("1"),
                )
                .arg(
                    Arg::with_name("max")
                        .long("max")
                        .help("Maximum trackable value")
                        .takes_value(true)
                        .default_value(default_max.as_str()),
                )
                .arg(
                    Arg::with_name("sigfig")
                        .long("sigfig")
                        .help("Number of significant digits")
                        .takes_value(true)
                        .default_value("3"),
                )
                .arg(
                    Arg::with_name("compression")
                        .short("c")
                        .long("compression")
                        .help("Enable compression"),
                )
                .arg(
                    Arg::with_name("resize")
                        .short("r")
                        .long("resize")
                        .help("Enable auto resize"),
                ),
        )
        .subcommand(
            SubCommand::with_name("process-log")
                .about("Reduce an interval log to a percentile distribution report")
                .arg(
                    Arg::with_name("input")
                        .long("i")
                        .help("Interval log to read")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("output")
                        .long("o")
                        .help("Output file (percentile report); defaults to stdout")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("csv")
                        .long("csv")
                        .help("Write the report as CSV instead of a plaintext table"),
                )
                .arg(
                    Arg::with_name("verbose")
                        .short("v")
                        .long("verbose")
                        .help("Print each processed interval's tag and timestamp to stderr"),
                )
                .arg(
                    Arg::with_name("tag")
                        .long("tag")
                        .help("Only process intervals with this tag")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("listtags")
                        .long("listtags")
                        .help("List the distinct tags present in the log and exit"),
                )
                .arg(
                    Arg::with_name("alltags")
                        .long("alltags")
                        .help("Process every tag present, rather than filtering by --tag"),
                )
                .arg(
                    Arg::with_name("start")
                        .long("start")
                        .help("Skip intervals starting before this many seconds")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("end")
                        .long("end")
                        .help("Skip intervals starting after this many seconds")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("output-value-unit-ratio")
                        .long("outputValueUnitRatio")
                        .help("Divide all output values by this ratio")
                        .takes_value(true)
                        .default_value("1000000"),
                )
                .arg(
                    Arg::with_name("ticks-per-half")
                        .long("percentilesOutputTicksPerHalf")
                        .help("Number of reporting points per half-distance to 100th percentile")
                        .takes_value(true)
                        .default_value("5"),
                ),
        )
        .get_matches();

    let status = match matches.subcommand() {
        ("serialize", Some(sub_matches)) => {
            let min = sub_matches.value_of("min").unwrap().parse().unwrap();
            let max = sub_matches.value_of("max").unwrap().parse().unwrap();
            let sigfig = sub_matches.value_of("sigfig").unwrap().parse().unwrap();

            let mut h: Histogram<u64> = Histogram::new_with_bounds(min, max, sigfig).unwrap();

            if sub_matches.is_present("resize") {
                h.auto(true);
            }

            serialize(h, sub_matches.is_present("compression"));
            0
        }
        ("process-log", Some(sub_matches)) => match process_log(sub_matches) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("error: {}", e);
                1
            }
        },
        _ => {
            eprintln!("expected a subcommand; see --help");
            1
        }
    };

    std::process::exit(status);
}

fn serialize(mut h: Histogram<u64>, compression: bool) {
    let stdin = std::io::stdin();
    let stdin_handle = stdin.lock();

    for num in stdin_handle.lines()
            .map(|l| l.expect("Should be able to read stdin"))
            .map(|s| s.parse().expect("Each line must be a u64")) {
        h.record(num).unwrap();
    }

    let stdout = std::io::stdout();
    let mut stdout_handle = stdout.lock();

    if compression {
        V2DeflateSerializer::new().serialize(&h, &mut stdout_handle).unwrap();
    } else {
        V2Serializer::new().serialize(&h, &mut stdout_handle).unwrap();
    }
}

fn process_log(args: &clap::ArgMatches) -> Result<(), String> {
    let input_path = args.value_of("input").expect("required");
    let mut contents = Vec::new();
    File::open(input_path)
        .and_then(|mut f| f.read_to_end(&mut contents))
        .map_err(|e| format!("reading {}: {}", input_path, e))?;

    if args.is_present("listtags") {
        let mut tags = Vec::new();
        for entry in IntervalLogIterator::new(&contents) {
            if let LogEntry::Interval(ilh) =
                entry.map_err(|e| format!("parsing {}: {:?}", input_path, e))?
            {
                if let Some(tag) = ilh.tag() {
                    let tag = tag.as_str().to_owned();
                    if !tags.contains(&tag) {
                        tags.push(tag);
                    }
                }
            }
        }
        for tag in tags {
            println!("{}", tag);
        }
        return Ok(());
    }

    let all_tags = args.is_present("alltags");
    let wanted_tag = args.value_of("tag");
    let start = args
        .value_of("start")
        .map(|s| s.parse::<f64>().map_err(|e| e.to_string()))
        .transpose()?;
    let end = args
        .value_of("end")
        .map(|s| s.parse::<f64>().map_err(|e| e.to_string()))
        .transpose()?;
    let output_value_unit_ratio: f64 = args
        .value_of("output-value-unit-ratio")
        .unwrap()
        .parse()
        .map_err(|e: std::num::ParseFloatError| e.to_string())?;
    let ticks_per_half: u32 = args
        .value_of("ticks-per-half")
        .unwrap()
        .parse()
        .map_err(|e: std::num::ParseIntError| e.to_string())?;
    let verbose = args.is_present("verbose");
    let csv = args.is_present("csv");

    let mut deserializer = Deserializer::new();
    let mut total: Option<Histogram<u64>> = None;

    for entry in IntervalLogIterator::new(&contents) {
        let entry = entry.map_err(|e| format!("parsing {}: {:?}", input_path, e))?;
        let ilh = match entry {
            LogEntry::Interval(ilh) => ilh,
            _ => continue,
        };

        if !all_tags {
            match (wanted_tag, ilh.tag()) {
                (Some(wanted), Some(tag)) if tag.as_str() == wanted => {}
                (None, None) => {}
                _ => continue,
            }
        }

        if let Some(start) = start {
            if ilh.start_timestamp() < start {
                continue;
            }
        }
        if let Some(end) = end {
            if ilh.start_timestamp() > end {
                continue;
            }
        }

        if verbose {
            eprintln!(
                "tag={:?} start={} duration={}",
                ilh.tag().map(|t| t.as_str().to_owned()),
                ilh.start_timestamp(),
                ilh.duration()
            );
        }

        let decoded = base64::decode(ilh.encoded_histogram())
            .map_err(|e| format!("base64 decoding interval at {}: {}", ilh.start_timestamp(), e))?;
        let h: Histogram<u64> = deserializer
            .deserialize(&mut decoded.as_slice())
            .map_err(|e| format!("decoding interval at {}: {}", ilh.start_timestamp(), e))?;

        match total.as_mut() {
            Some(t) => t
                .add(&h)
                .map_err(|e| format!("merging interval at {}: {:?}", ilh.start_timestamp(), e))?,
            None => total = Some(h),
        }
    }

    let total = match total {
        Some(t) => t,
        None => return Err("no matching intervals found".to_owned()),
    };

    let mut out: Box<dyn Write> = match args.value_of("output") {
        Some(path) => Box::new(File::create(path).map_err(|e| e.to_string())?),
        None => Box::new(std::io::stdout()),
    };

    write_percentile_report(&mut out, &total, output_value_unit_ratio, ticks_per_half, csv)
        .map_err(|e| e.to_string())
}

fn write_percentile_report(
    out: &mut dyn Write,
    h: &Histogram<u64>,
    output_value_unit_ratio: f64,
    ticks_per_half: u32,
    csv: bool,
) -> std::io::Result<()> {
    if csv {
        writeln!(out, "Value,Percentile,TotalCount")?;
    } else {
        writeln!(out, "{:>12} {:>10} {:>12}", "Value", "Percentile", "TotalCount")?;
    }

    let percentiles = [50.0, 75.0, 90.0, 95.0, 99.0, 99.9, 99.99, 99.999, 100.0];
    let _ = ticks_per_half; // finer-grained tick generation is left to a future iteration
    for &p in &percentiles {
        let value = h.value_at_percentile(p) as f64 / output_value_unit_ratio;
        if csv {
            writeln!(out, "{:.6},{:.5},{}", value, p, h.count_between(0, h.value_at_percentile(p)))?;
        } else {
            writeln!(
                out,
                "{:>12.6} {:>10.5} {:>12}",
                value,
                p,
                h.count_between(0, h.value_at_percentile(p))
            )?;
        }
    }

    writeln!(
        out,
        "# Mean = {:.3}, StdDeviation = {:.3}",
        h.mean() / output_value_unit_ratio,
        h.stdev() / output_value_unit_ratio
    )?;
    writeln!(
        out,
        "# Max = {:.3}, Total count = {}",
        h.max() as f64 / output_value_unit_ratio,
        h.count()
    )?;

    Ok(())
}
