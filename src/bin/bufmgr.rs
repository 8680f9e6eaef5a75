use bufmgr::buffer::{BufferManager, PolicyKind};
use bufmgr::config::Config;
use bufmgr::error::Result;
use bufmgr::trace;

fn main() -> Result<()> {
    let args = clap::command!()
        .about("Replay a page access trace against the buffer manager")
        .arg(
            clap::Arg::new("config")
                .short('c')
                .long("config")
                .help("Configuration file path")
                .default_value(""),
        )
        .arg(
            clap::Arg::new("policy")
                .short('p')
                .long("policy")
                .help("Replacement policy: lru, clock or random"),
        )
        .arg(
            clap::Arg::new("pool-size")
                .short('n')
                .long("pool-size")
                .help("Number of frames in the buffer pool")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(clap::Arg::new("trace").required(true).help("Trace file, one `op,page_id` per line"))
        .get_matches();

    let mut cfg = Config::new(args.get_one::<String>("config").map(String::as_str).unwrap_or(""))?;
    if let Some(policy) = args.get_one::<String>("policy") {
        cfg.policy = policy.parse::<PolicyKind>()?;
    }
    if let Some(&pool_size) = args.get_one::<usize>("pool-size") {
        cfg.pool_size = pool_size;
    }
    env_logger::Builder::new().parse_filters(&cfg.log_level).parse_default_env().try_init()?;

    let requests = match args.get_one::<String>("trace") {
        Some(path) => trace::load(path)?,
        None => vec![],
    };
    let mut bm = BufferManager::from_config(&cfg)?;
    if let Some(max_page_id) = requests.iter().map(|r| r.page_id).max() {
        trace::prepare(&mut bm, max_page_id)?;
    }
    let stats = trace::replay(&mut bm, &requests)?;
    bm.close()?;

    println!("Policy: {}", cfg.policy);
    println!("{}", stats);
    Ok(())
}
