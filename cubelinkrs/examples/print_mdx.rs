use std::{env, fs, path::PathBuf};

use cubelink::{CubeQuery, MdxQueryBuilder};

fn usage() {
    eprintln!("Usage: print_mdx <query_json>");
    eprintln!("Example: cargo run --example print_mdx -- demos/queries/sales_by_country.json");
}

fn main() -> anyhow::Result<()> {
    let mut args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        usage();
        std::process::exit(1);
    }

    cubelink::init_tracing();

    let query_path = PathBuf::from(args.remove(0));
    let query_str = fs::read_to_string(query_path)?;
    let query: CubeQuery = serde_json::from_str(&query_str)?;

    let built = MdxQueryBuilder::new(&query).build_select()?;
    println!("{}", built.statement);
    Ok(())
}
