//! 打印某一天的 DNS 查询，排除反向解析和组播/广播流量
//!
//! 用法: cargo run --example dns_day -- [YYYY-MM-DD] [zeek 日志目录]

use log::LevelFilter;
use std::collections::BTreeMap;
use std::error::Error;
use zeek_log_parser::ParserConfig;
use zeek_log_parser::mapper::dns::dns_for_day;
use zeek_log_parser::tools::is_multicast_or_broadcast;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let day = args.next().unwrap_or_else(|| "2020-06-15".to_string());
    let config = match args.next() {
        Some(dir) => ParserConfig::with_zeek_dir(dir),
        None => ParserConfig::default(),
    };

    println!("=== {} ({}) ===", day, config.day_dir(&day).display());

    let entries = match dns_for_day(&day, &config) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("✗ 解析失败: {}", e);
            return Err(e.into());
        }
    };

    let mut per_query: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in &entries {
        if entry.is_rdns_lookup() || is_multicast_or_broadcast(&entry.id.resp_h) {
            continue;
        }
        println!("{}", entry);
        *per_query.entry(entry.query.as_str()).or_default() += 1;
    }

    println!("\n✓ 共 {} 条查询，{} 个不同域名", entries.len(), per_query.len());
    for (query, count) in per_query.iter().take(10) {
        println!("  {:>6}  {}", count, query);
    }
    Ok(())
}
