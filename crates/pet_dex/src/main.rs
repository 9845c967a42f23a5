fn main() -> anyhow::Result<()> {
    pet_dex::run()
}
