use clap::Parser;
use illumination::Args;

fn main() -> anyhow::Result<()> {
    illumination::run(Args::parse())
}
