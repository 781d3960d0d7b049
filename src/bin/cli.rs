use clap::{App, Arg, ArgMatches, SubCommand};
use tessera::{
    define_struct,
    error::TesseraError,
    message::{FinishedMessage, MessageBuilder},
    AllocationStrategy, ArenaConfig, ArenaConfigBuilder, ElementSize, Result, WirePointer,
};

define_struct! {
    /// A string held as a list of bytes
    pub struct Str (size = 8) {
        chars: list(u8) @ 0,
    }
}

define_struct! {
    /// A batch of independently allocated byte lists
    pub struct Batch (size = 8) {
        items: structs(Str) @ 0,
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let matches = App::new("tessera-cli")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Tessera segment message builder CLI Tool")
        .subcommand(
            SubCommand::with_name("build")
                .about("Build a byte-list message and print its segment layout")
                .args(&arena_args())
                .arg(
                    Arg::with_name("length")
                        .short("l")
                        .long("length")
                        .value_name("LENGTH")
                        .help("Number of bytes in the list")
                        .default_value("5")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("stats")
                .about("Build many byte lists and print arena statistics")
                .args(&arena_args())
                .arg(
                    Arg::with_name("count")
                        .short("c")
                        .long("count")
                        .value_name("COUNT")
                        .help("Number of lists")
                        .default_value("100")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("length")
                        .short("l")
                        .long("length")
                        .value_name("LENGTH")
                        .help("Bytes per list")
                        .default_value("64")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("dump")
                .about("Hex-dump the segments of a byte-list message")
                .args(&arena_args())
                .arg(
                    Arg::with_name("length")
                        .short("l")
                        .long("length")
                        .value_name("LENGTH")
                        .help("Number of bytes in the list")
                        .default_value("5")
                        .takes_value(true),
                ),
        )
        .subcommand(SubCommand::with_name("info").about("Show version and layout constants"))
        .get_matches();

    match matches.subcommand() {
        ("build", Some(build_matches)) => handle_build(build_matches),
        ("stats", Some(stats_matches)) => handle_stats(stats_matches),
        ("dump", Some(dump_matches)) => handle_dump(dump_matches),
        ("info", Some(_)) => show_info(),
        _ => {
            println!("Use --help for usage information");
            Ok(())
        }
    }
}

fn arena_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name("segment_size")
            .short("s")
            .long("segment-size")
            .value_name("BYTES")
            .help("First and minimum segment size")
            .default_value("1024")
            .takes_value(true),
        Arg::with_name("max_segment_size")
            .long("max-segment-size")
            .value_name("BYTES")
            .help("Upper bound for grown segments")
            .default_value("1048576")
            .takes_value(true),
        Arg::with_name("strategy")
            .long("strategy")
            .value_name("STRATEGY")
            .help("Segment sizing strategy")
            .possible_values(&["fixed", "grow"])
            .default_value("grow")
            .takes_value(true),
        Arg::with_name("limit")
            .long("limit")
            .value_name("BYTES")
            .help("Maximum total message size")
            .takes_value(true),
    ]
}

fn parse_arg(matches: &ArgMatches, name: &str) -> Result<usize> {
    let raw = matches
        .value_of(name)
        .ok_or_else(|| TesseraError::invalid_parameter(name, "missing value"))?;
    raw.parse()
        .map_err(|_| TesseraError::invalid_parameter(name, format!("invalid number '{}'", raw)))
}

fn arena_config(matches: &ArgMatches) -> Result<ArenaConfig> {
    let segment_size = parse_arg(matches, "segment_size")?;
    let mut builder = ArenaConfigBuilder::new()
        .first_segment_size(segment_size)
        .min_segment_size(segment_size)
        .max_segment_size(parse_arg(matches, "max_segment_size")?.max(segment_size));

    builder = match matches.value_of("strategy") {
        Some("fixed") => builder.fixed(),
        _ => builder.grow(),
    };
    if matches.is_present("limit") {
        builder = builder.max_message_size(parse_arg(matches, "limit")?);
    }
    builder.build()
}

fn build_str(config: ArenaConfig, length: usize) -> Result<FinishedMessage> {
    let message = MessageBuilder::new(config)?;
    let root = StrBuilder::init_root(&message)?;
    let chars = root.init_chars(length as i64)?;
    for i in 0..length {
        chars.set(i, i as u8)?;
    }
    message.finish()
}

fn print_layout(finished: &FinishedMessage) {
    println!("Segments: {}", finished.segments().len());
    for (id, segment) in finished.segments().iter().enumerate() {
        println!("  segment {}: {} bytes", id, segment.len());
    }
    if let Some((segment, offset)) = finished.root_position() {
        println!("Root struct: segment {} offset {}", segment, offset);
    }
    println!("Total bytes: {}", finished.total_bytes());
}

fn handle_build(matches: &ArgMatches) -> Result<()> {
    let config = arena_config(matches)?;
    let length = parse_arg(matches, "length")?;
    println!(
        "Building {}-byte list ({} strategy, {} byte segments)",
        length,
        config.strategy.name(),
        config.first_segment_size
    );

    let finished = build_str(config, length)?;
    print_layout(&finished);

    let reader = finished.reader();
    let chars = StrReader::root(&reader)?.chars()?;
    let preview: Vec<u8> = chars.iter().take(16).collect();
    println!("Read back {} bytes: {:?}", chars.len(), preview);
    Ok(())
}

fn handle_stats(matches: &ArgMatches) -> Result<()> {
    let config = arena_config(matches)?;
    let count = parse_arg(matches, "count")?;
    let length = parse_arg(matches, "length")?;

    let start = std::time::Instant::now();
    let message = MessageBuilder::new(config)?;
    let batch = BatchBuilder::init_root(&message)?;
    let items = batch.init_items(count as i64)?;
    for i in 0..count {
        let item = StrBuilder::new(items.get(i)?)?;
        let chars = item.init_chars(length as i64)?;
        for j in 0..length {
            chars.set(j, (i + j) as u8)?;
        }
    }
    let finished = message.finish()?;
    let elapsed = start.elapsed();

    let stats = finished.stats();
    println!("Built {} lists of {} bytes in {:.2}μs", count, length, elapsed.as_micros());
    println!("  {}", stats.summary());
    println!("  Segments: {}", stats.segment_count);
    println!("  Allocations: {}", stats.allocations);
    println!("  Bytes allocated: {}", stats.bytes_allocated);
    println!("  Bytes reserved: {}", stats.bytes_reserved);
    println!("  Padding bytes: {}", stats.padding_bytes);
    println!("  Far pointers: {}", stats.far_pointers);
    println!("  Utilization: {:.2}%", stats.utilization() * 100.0);
    Ok(())
}

fn handle_dump(matches: &ArgMatches) -> Result<()> {
    let config = arena_config(matches)?;
    let length = parse_arg(matches, "length")?;
    let finished = build_str(config, length)?;

    for (id, segment) in finished.segments().iter().enumerate() {
        println!("segment {} ({} bytes)", id, segment.len());
        for (index, word) in segment.chunks(8).enumerate() {
            let hex: Vec<String> = word.iter().map(|b| format!("{:02x}", b)).collect();
            println!("  {:06x}  {:<23}  {}", index * 8, hex.join(" "), describe(word));
        }
    }
    Ok(())
}

fn describe(word: &[u8]) -> String {
    let mut bytes = [0u8; 8];
    bytes[..word.len()].copy_from_slice(word);
    match WirePointer::decode(u64::from_le_bytes(bytes)) {
        Ok(WirePointer::Null) => String::new(),
        Ok(WirePointer::Struct {
            offset_words,
            size_words,
        }) => format!("struct @{} ({} words)", offset_words, size_words),
        Ok(WirePointer::List {
            offset_words,
            element_size,
            count,
        }) => format!("list @{} {} x{}", offset_words, element_size.name(), count),
        Ok(WirePointer::Far { pad_words, segment }) => {
            format!("far -> segment {} pad @{}", segment, pad_words)
        }
        Err(_) => String::from("data"),
    }
}

fn show_info() -> Result<()> {
    println!("Tessera v{}", tessera::VERSION);
    println!("Word size: {} bytes", tessera::config::WORD_SIZE);
    println!("Max segment: {} bytes", tessera::config::MAX_SEGMENT_BYTES);
    println!("Max list length: {}", tessera::config::MAX_LIST_LENGTH);
    println!(
        "Default strategy: {}",
        AllocationStrategy::default().name()
    );
    println!("Element sizes:");
    for tag in 0..8u8 {
        let size = ElementSize::from_tag(tag)?;
        println!("  {} = {} ({} bits)", tag, size.name(), size.data_bits());
    }
    Ok(())
}
