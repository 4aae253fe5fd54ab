fn main() -> anyhow::Result<()> {
    crewboard_lib::run()
}
