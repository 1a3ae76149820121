fn main() -> anyhow::Result<()> {
    roadkill::cli::run_cli()
}
