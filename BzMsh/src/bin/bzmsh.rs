fn main() -> anyhow::Result<()> {
    bzmsh::cli::run_cli()
}
