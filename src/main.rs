fn main() -> anyhow::Result<()> {
    smartsession_lib::run()
}
